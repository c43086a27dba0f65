//! Admin dashboard handler.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use atelier_core::{Client, ContactRequest};
use atelier_db::repository::dashboard::DashboardData;

use crate::error::ApiError;
use crate::handlers::{money_str, InvoiceSummaryDto, QuoteSummaryDto};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardStatsDto {
    pub total_clients: i64,
    pub total_quotes: i64,
    pub total_invoices: i64,
    pub pending_quotes: i64,
    pub overdue_invoices: i64,
    pub new_contact_requests: i64,
    pub monthly_revenue: String,
    pub yearly_revenue: String,
}

#[derive(Debug, Serialize)]
pub struct RevenuePointDto {
    pub month: String,
    pub revenue: String,
}

#[derive(Debug, Serialize)]
pub struct RecentQuoteDto {
    #[serde(flatten)]
    pub quote: QuoteSummaryDto,
    pub client: Client,
}

#[derive(Debug, Serialize)]
pub struct RecentInvoiceDto {
    #[serde(flatten)]
    pub invoice: InvoiceSummaryDto,
    pub client: Client,
}

#[derive(Debug, Serialize)]
pub struct DashboardDto {
    pub stats: DashboardStatsDto,
    pub recent_quotes: Vec<RecentQuoteDto>,
    pub recent_invoices: Vec<RecentInvoiceDto>,
    pub recent_contacts: Vec<ContactRequest>,
    pub monthly_revenue: Vec<RevenuePointDto>,
}

/// `GET /admin/dashboard` - counts, revenue, recent activity, and the
/// trailing 12-month revenue series (oldest month first).
pub async fn index(State(state): State<AppState>) -> Result<Json<DashboardDto>, ApiError> {
    let today = Utc::now().date_naive();
    let data: DashboardData = state.db.dashboard().overview(today).await?;

    let stats = DashboardStatsDto {
        total_clients: data.stats.total_clients,
        total_quotes: data.stats.total_quotes,
        total_invoices: data.stats.total_invoices,
        pending_quotes: data.stats.pending_quotes,
        overdue_invoices: data.stats.overdue_invoices,
        new_contact_requests: data.stats.new_contact_requests,
        monthly_revenue: money_str(data.stats.monthly_revenue_cents),
        yearly_revenue: money_str(data.stats.yearly_revenue_cents),
    };

    Ok(Json(DashboardDto {
        stats,
        recent_quotes: data
            .recent_quotes
            .into_iter()
            .map(|entry| RecentQuoteDto {
                quote: entry.quote.into(),
                client: entry.client,
            })
            .collect(),
        recent_invoices: data
            .recent_invoices
            .into_iter()
            .map(|entry| RecentInvoiceDto {
                invoice: InvoiceSummaryDto::from_invoice(entry.invoice, today),
                client: entry.client,
            })
            .collect(),
        recent_contacts: data.recent_contacts,
        monthly_revenue: data
            .monthly_revenue
            .into_iter()
            .map(|point| RevenuePointDto {
                month: point.month,
                revenue: money_str(point.revenue_cents),
            })
            .collect(),
    }))
}
