//! # Dashboard Repository
//!
//! One aggregate query set for the admin dashboard: counts, paid revenue,
//! recent documents, and the trailing 12-month revenue series.
//!
//! Month and year scoping is done with ISO-8601 text bounds on
//! `created_at`; the overdue count reuses the invoice repository's shared
//! predicate so the dashboard can never drift from the list filter.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use atelier_core::{Client, ContactRequest, ContactStatus, Invoice, InvoiceStatus, Quote, QuoteStatus};

use crate::error::{DbError, DbResult};
use crate::repository::invoice::OVERDUE_PREDICATE;

/// Headline counters and revenue figures.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_clients: i64,
    pub total_quotes: i64,
    pub total_invoices: i64,
    /// Quotes sent and awaiting a decision.
    pub pending_quotes: i64,
    pub overdue_invoices: i64,
    pub new_contact_requests: i64,
    /// Sum of paid invoice totals for the current month.
    pub monthly_revenue_cents: i64,
    /// Sum of paid invoice totals for the current year.
    pub yearly_revenue_cents: i64,
}

/// One point of the trailing revenue series.
#[derive(Debug, Clone, Serialize)]
pub struct RevenuePoint {
    /// Display label, e.g. "Aug 2026".
    pub month: String,
    pub revenue_cents: i64,
}

/// A recent quote with its client.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteWithClient {
    pub quote: Quote,
    pub client: Client,
}

/// A recent invoice with its client.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceWithClient {
    pub invoice: Invoice,
    pub client: Client,
}

/// Everything the dashboard endpoint returns.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub stats: DashboardStats,
    pub recent_quotes: Vec<QuoteWithClient>,
    pub recent_invoices: Vec<InvoiceWithClient>,
    pub recent_contacts: Vec<ContactRequest>,
    /// Twelve points, oldest month first, current month last.
    pub monthly_revenue: Vec<RevenuePoint>,
}

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// First day of the month `offset` months before (year, month).
fn shift_month(year: i32, month: u32, offset: i32) -> (i32, u32) {
    let total = year * 12 + month as i32 - 1 - offset;
    (total.div_euclid(12), (total.rem_euclid(12) + 1) as u32)
}

/// ISO text bound "YYYY-MM-01" for range comparisons against stored
/// timestamps.
fn month_bound(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}-01")
}

#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
}

impl DashboardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DashboardRepository { pool }
    }

    /// Builds the full dashboard aggregate as of `today`.
    pub async fn overview(&self, today: NaiveDate) -> DbResult<DashboardData> {
        debug!(%today, "building dashboard overview");

        let year = today.year();
        let month = today.month();

        let total_clients = self.count("SELECT COUNT(*) FROM clients").await?;
        let total_quotes = self.count("SELECT COUNT(*) FROM quotes").await?;
        let total_invoices = self.count("SELECT COUNT(*) FROM invoices").await?;

        let pending_quotes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotes WHERE status = ?")
            .bind(QuoteStatus::Sent)
            .fetch_one(&self.pool)
            .await?;

        let overdue_invoices: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM invoices WHERE {OVERDUE_PREDICATE} ?"))
                .bind(today)
                .fetch_one(&self.pool)
                .await?;

        let new_contact_requests: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM contact_requests WHERE status = ?")
                .bind(ContactStatus::New)
                .fetch_one(&self.pool)
                .await?;

        let (next_year, next_month) = shift_month(year, month, -1);
        let monthly_revenue_cents = self
            .paid_revenue(&month_bound(year, month), &month_bound(next_year, next_month))
            .await?;
        let yearly_revenue_cents = self
            .paid_revenue(&month_bound(year, 1), &month_bound(year + 1, 1))
            .await?;

        let stats = DashboardStats {
            total_clients,
            total_quotes,
            total_invoices,
            pending_quotes,
            overdue_invoices,
            new_contact_requests,
            monthly_revenue_cents,
            yearly_revenue_cents,
        };

        let recent_quotes = self.recent_quotes().await?;
        let recent_invoices = self.recent_invoices().await?;

        let recent_contacts: Vec<ContactRequest> =
            sqlx::query_as("SELECT * FROM contact_requests ORDER BY created_at DESC LIMIT 5")
                .fetch_all(&self.pool)
                .await?;

        // trailing 12 months, oldest first
        let mut monthly_revenue = Vec::with_capacity(12);
        for back in (0..12).rev() {
            let (y, m) = shift_month(year, month, back);
            let (ny, nm) = shift_month(y, m, -1);
            let revenue_cents = self
                .paid_revenue(&month_bound(y, m), &month_bound(ny, nm))
                .await?;
            monthly_revenue.push(RevenuePoint {
                month: format!("{} {}", MONTH_LABELS[(m - 1) as usize], y),
                revenue_cents,
            });
        }

        Ok(DashboardData {
            stats,
            recent_quotes,
            recent_invoices,
            recent_contacts,
            monthly_revenue,
        })
    }

    async fn count(&self, sql: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(sql).fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Paid-invoice revenue for `lower <= created_at < upper`.
    async fn paid_revenue(&self, lower: &str, upper: &str) -> DbResult<i64> {
        let revenue: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_cents), 0) FROM invoices \
             WHERE status = ? AND created_at >= ? AND created_at < ?",
        )
        .bind(InvoiceStatus::Paid)
        .bind(lower)
        .bind(upper)
        .fetch_one(&self.pool)
        .await?;

        Ok(revenue)
    }

    async fn recent_quotes(&self) -> DbResult<Vec<QuoteWithClient>> {
        let quotes: Vec<Quote> =
            sqlx::query_as("SELECT * FROM quotes ORDER BY created_at DESC LIMIT 5")
                .fetch_all(&self.pool)
                .await?;

        let mut out = Vec::with_capacity(quotes.len());
        for quote in quotes {
            let client = self.client_for(&quote.client_id).await?;
            out.push(QuoteWithClient { quote, client });
        }
        Ok(out)
    }

    async fn recent_invoices(&self) -> DbResult<Vec<InvoiceWithClient>> {
        let invoices: Vec<Invoice> =
            sqlx::query_as("SELECT * FROM invoices ORDER BY created_at DESC LIMIT 5")
                .fetch_all(&self.pool)
                .await?;

        let mut out = Vec::with_capacity(invoices.len());
        for invoice in invoices {
            let client = self.client_for(&invoice.client_id).await?;
            out.push(InvoiceWithClient { invoice, client });
        }
        Ok(out)
    }

    async fn client_for(&self, client_id: &str) -> DbResult<Client> {
        let client: Option<Client> = sqlx::query_as("SELECT * FROM clients WHERE id = ?")
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await?;

        client.ok_or_else(|| DbError::not_found("Client", client_id))
    }
}
