//! # Invoice Repository
//!
//! Invoice lifecycle: direct creation, derivation from a quote, full
//! updates, payment marking.
//!
//! ## Derivation
//! `create_from_quote` copies the quote's totals, tax rate, and items
//! verbatim - nothing is recomputed, so the invoice preserves the quote's
//! historical tax rate even if the company settings changed since.
//!
//! ## Overdue
//! Never stored as authoritative state. [`OVERDUE_PREDICATE`] is the SQL
//! twin of [`atelier_core::types::is_overdue`] and is shared by the list
//! filter and the dashboard count.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use atelier_core::numbering::DocumentKind;
use atelier_core::totals::{self, DocumentTotals, NewLineItem};
use atelier_core::{Client, Invoice, InvoiceItem, InvoiceStatus, Quote, TaxRate};

use crate::error::{DbError, DbResult};
use crate::repository::{
    allocate_number, insert_line_items, page_offset, Page, NUMBER_ALLOC_ATTEMPTS, PER_PAGE,
};

/// SQL twin of the pure overdue predicate: `status != paid AND due_date <
/// today`. Callers append the `today` bind right after.
pub(crate) const OVERDUE_PREDICATE: &str = "status != 'paid' AND due_date <";

/// Validated input for creating an invoice directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvoice {
    pub client_id: String,
    pub quote_id: Option<String>,
    pub due_date: NaiveDate,
    pub payment_terms: Option<String>,
    pub tax_rate: TaxRate,
    pub items: Vec<NewLineItem>,
}

/// Validated input for fully replacing an invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceUpdate {
    pub client_id: String,
    pub quote_id: Option<String>,
    pub status: InvoiceStatus,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub payment_terms: Option<String>,
    pub tax_rate: TaxRate,
    pub items: Vec<NewLineItem>,
}

/// List filters for the invoice index.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub client_id: Option<String>,
    /// Keep only invoices that are overdue as of "today".
    pub overdue: bool,
    /// Matches the client's company/contact name or the invoice number.
    pub search: Option<String>,
}

/// An invoice with its client, ordered items, and originating quote.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDetail {
    pub invoice: Invoice,
    pub client: Client,
    pub items: Vec<InvoiceItem>,
    pub quote: Option<Quote>,
}

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Creates an invoice from scratch: totals computed from the items,
    /// `FAC-YYYY-NNNN` number allocated, invoice plus items persisted
    /// atomically. Retries on a number collision.
    pub async fn create(&self, new: NewInvoice, now: DateTime<Utc>) -> DbResult<InvoiceDetail> {
        let totals = totals::compute(&new.items, new.tax_rate);

        let mut attempt = 1;
        loop {
            let mut tx = self.pool.begin().await?;

            let client_exists: Option<i64> =
                sqlx::query_scalar("SELECT 1 FROM clients WHERE id = ?")
                    .bind(&new.client_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if client_exists.is_none() {
                return Err(DbError::not_found("Client", &new.client_id));
            }

            let number = allocate_number(&mut tx, DocumentKind::Invoice, now).await?;
            let invoice_id = Uuid::new_v4().to_string();

            match Self::insert_invoice_row(
                &mut tx,
                &invoice_id,
                &number,
                &new.client_id,
                new.quote_id.as_deref(),
                new.due_date,
                new.tax_rate,
                totals,
                new.payment_terms.as_deref(),
                now,
            )
            .await
            {
                Ok(()) => {}
                Err(e)
                    if e.is_unique_violation_on("invoice_number")
                        && attempt < NUMBER_ALLOC_ATTEMPTS =>
                {
                    warn!(number = %number, attempt, "invoice number taken, retrying allocation");
                    drop(tx);
                    attempt += 1;
                    continue;
                }
                Err(e) => return Err(e),
            }

            insert_line_items(
                &mut tx,
                "invoice_items",
                "invoice_id",
                &invoice_id,
                &new.items,
                now,
            )
            .await?;
            tx.commit().await?;

            info!(id = %invoice_id, number = %number, total_cents = totals.total.cents(), "invoice created");
            return self.get(&invoice_id).await;
        }
    }

    /// Derives an invoice from a quote, copying subtotal, tax rate, tax
    /// amount, total, and every item verbatim. One transaction.
    pub async fn create_from_quote(
        &self,
        quote_id: &str,
        due_date: NaiveDate,
        payment_terms: Option<String>,
        now: DateTime<Utc>,
    ) -> DbResult<InvoiceDetail> {
        let mut attempt = 1;
        loop {
            let mut tx = self.pool.begin().await?;

            let quote: Option<Quote> = sqlx::query_as("SELECT * FROM quotes WHERE id = ?")
                .bind(quote_id)
                .fetch_optional(&mut *tx)
                .await?;
            let quote = quote.ok_or_else(|| DbError::not_found("Quote", quote_id))?;

            let quote_items: Vec<atelier_core::QuoteItem> =
                sqlx::query_as("SELECT * FROM quote_items WHERE quote_id = ? ORDER BY position")
                    .bind(quote_id)
                    .fetch_all(&mut *tx)
                    .await?;

            let number = allocate_number(&mut tx, DocumentKind::Invoice, now).await?;
            let invoice_id = Uuid::new_v4().to_string();

            let totals = DocumentTotals {
                subtotal: quote.subtotal(),
                tax_amount: quote.tax_amount(),
                total: quote.total(),
            };

            match Self::insert_invoice_row(
                &mut tx,
                &invoice_id,
                &number,
                &quote.client_id,
                Some(quote_id),
                due_date,
                quote.tax_rate(),
                totals,
                payment_terms.as_deref(),
                now,
            )
            .await
            {
                Ok(()) => {}
                Err(e)
                    if e.is_unique_violation_on("invoice_number")
                        && attempt < NUMBER_ALLOC_ATTEMPTS =>
                {
                    warn!(number = %number, attempt, "invoice number taken, retrying allocation");
                    drop(tx);
                    attempt += 1;
                    continue;
                }
                Err(e) => return Err(e),
            }

            // copy the item rows as-is, stored totals included
            for item in &quote_items {
                sqlx::query(
                    r#"
                    INSERT INTO invoice_items (
                        id, invoice_id, service_name, description,
                        quantity_hundredths, unit_price_cents, total_price_cents,
                        position, created_at
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(Uuid::new_v4().to_string())
                .bind(&invoice_id)
                .bind(&item.service_name)
                .bind(&item.description)
                .bind(item.quantity_hundredths)
                .bind(item.unit_price_cents)
                .bind(item.total_price_cents)
                .bind(item.position)
                .bind(now)
                .execute(&mut *tx)
                .await?;
            }

            tx.commit().await?;

            info!(id = %invoice_id, number = %number, quote_id = %quote_id, "invoice derived from quote");
            return self.get(&invoice_id).await;
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn insert_invoice_row(
        conn: &mut SqliteConnection,
        id: &str,
        number: &str,
        client_id: &str,
        quote_id: Option<&str>,
        due_date: NaiveDate,
        tax_rate: TaxRate,
        totals: DocumentTotals,
        payment_terms: Option<&str>,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, invoice_number, quote_id, client_id, status,
                due_date, paid_date,
                subtotal_cents, tax_rate_bps, tax_amount_cents, total_cents,
                payment_terms, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(number)
        .bind(quote_id)
        .bind(client_id)
        .bind(InvoiceStatus::Draft)
        .bind(due_date)
        .bind(Option::<NaiveDate>::None)
        .bind(totals.subtotal.cents())
        .bind(tax_rate.bps())
        .bind(totals.tax_amount.cents())
        .bind(totals.total.cents())
        .bind(payment_terms)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Fully replaces an invoice; totals are recomputed from the new item
    /// set and the old items are discarded wholesale.
    pub async fn update(
        &self,
        id: &str,
        update: InvoiceUpdate,
        now: DateTime<Utc>,
    ) -> DbResult<InvoiceDetail> {
        let totals = totals::compute(&update.items, update.tax_rate);

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE invoices SET
                client_id = ?, quote_id = ?, status = ?, due_date = ?,
                paid_date = ?, subtotal_cents = ?, tax_rate_bps = ?,
                tax_amount_cents = ?, total_cents = ?, payment_terms = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.client_id)
        .bind(&update.quote_id)
        .bind(update.status)
        .bind(update.due_date)
        .bind(update.paid_date)
        .bind(totals.subtotal.cents())
        .bind(update.tax_rate.bps())
        .bind(totals.tax_amount.cents())
        .bind(totals.total.cents())
        .bind(&update.payment_terms)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }

        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        insert_line_items(&mut tx, "invoice_items", "invoice_id", id, &update.items, now).await?;
        tx.commit().await?;

        debug!(id = %id, "invoice updated");
        self.get(id).await
    }

    /// Marks an invoice paid with the given date. Idempotent: repeating
    /// the call with the same date changes nothing further. The paid date
    /// is recorded as given, without cross-checking other dates.
    pub async fn mark_paid(
        &self,
        id: &str,
        paid_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> DbResult<InvoiceDetail> {
        let result =
            sqlx::query("UPDATE invoices SET status = ?, paid_date = ?, updated_at = ? WHERE id = ?")
                .bind(InvoiceStatus::Paid)
                .bind(paid_date)
                .bind(now)
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }

        info!(id = %id, paid_date = %paid_date, "invoice marked paid");
        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }

        info!(id = %id, "invoice deleted");
        Ok(())
    }

    /// Loads the full detail: invoice, client, ordered items, and the
    /// originating quote when the link survives.
    pub async fn get(&self, id: &str) -> DbResult<InvoiceDetail> {
        let invoice: Option<Invoice> = sqlx::query_as("SELECT * FROM invoices WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let invoice = invoice.ok_or_else(|| DbError::not_found("Invoice", id))?;

        let client = self.client_for(&invoice.client_id).await?;
        let items = self.items_for(id).await?;

        let quote: Option<Quote> = match &invoice.quote_id {
            Some(quote_id) => {
                sqlx::query_as("SELECT * FROM quotes WHERE id = ?")
                    .bind(quote_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => None,
        };

        Ok(InvoiceDetail {
            invoice,
            client,
            items,
            quote,
        })
    }

    /// Lists invoices newest first, filtered and paginated. `today` feeds
    /// the overdue filter.
    pub async fn list(
        &self,
        filter: &InvoiceFilter,
        today: NaiveDate,
        page: u32,
    ) -> DbResult<Page<InvoiceDetail>> {
        debug!(?filter, page, "listing invoices");

        let mut count_qb = QueryBuilder::new(
            "SELECT COUNT(*) FROM invoices i JOIN clients c ON c.id = i.client_id WHERE 1=1",
        );
        Self::push_filters(&mut count_qb, filter, today);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::new(
            "SELECT i.* FROM invoices i JOIN clients c ON c.id = i.client_id WHERE 1=1",
        );
        Self::push_filters(&mut qb, filter, today);
        qb.push(" ORDER BY i.created_at DESC LIMIT ")
            .push_bind(i64::from(PER_PAGE))
            .push(" OFFSET ")
            .push_bind(page_offset(page));

        let invoices: Vec<Invoice> = qb.build_query_as().fetch_all(&self.pool).await?;

        let mut items = Vec::with_capacity(invoices.len());
        for invoice in invoices {
            let client = self.client_for(&invoice.client_id).await?;
            let invoice_items = self.items_for(&invoice.id).await?;
            let quote: Option<Quote> = match &invoice.quote_id {
                Some(quote_id) => {
                    sqlx::query_as("SELECT * FROM quotes WHERE id = ?")
                        .bind(quote_id)
                        .fetch_optional(&self.pool)
                        .await?
                }
                None => None,
            };
            items.push(InvoiceDetail {
                invoice,
                client,
                items: invoice_items,
                quote,
            });
        }

        Ok(Page {
            items,
            total,
            page: page.max(1),
            per_page: PER_PAGE,
        })
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &InvoiceFilter, today: NaiveDate) {
        if let Some(status) = filter.status {
            qb.push(" AND i.status = ").push_bind(status);
        }
        if let Some(client_id) = &filter.client_id {
            qb.push(" AND i.client_id = ").push_bind(client_id.clone());
        }
        if filter.overdue {
            qb.push(" AND i.")
                .push(OVERDUE_PREDICATE)
                .push(" ")
                .push_bind(today);
        }
        if let Some(search) = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let pattern = format!("%{search}%");
            qb.push(" AND (c.company_name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR c.contact_name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR i.invoice_number LIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }

    async fn client_for(&self, client_id: &str) -> DbResult<Client> {
        let client: Option<Client> = sqlx::query_as("SELECT * FROM clients WHERE id = ?")
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await?;

        client.ok_or_else(|| DbError::not_found("Client", client_id))
    }

    async fn items_for(&self, invoice_id: &str) -> DbResult<Vec<InvoiceItem>> {
        let items: Vec<InvoiceItem> =
            sqlx::query_as("SELECT * FROM invoice_items WHERE invoice_id = ? ORDER BY position")
                .bind(invoice_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::client::ClientInput;
    use crate::repository::quote::NewQuote;
    use atelier_core::types::is_overdue;
    use atelier_core::{Money, Quantity};
    use chrono::TimeZone;

    fn ts(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    async fn seed_client(db: &Database, email: &str) -> String {
        db.clients()
            .insert(
                ClientInput {
                    company_name: None,
                    contact_name: "Jeanne Martin".to_string(),
                    email: email.to_string(),
                    phone: None,
                    address: None,
                    city: None,
                    postal_code: None,
                    country: None,
                    project_type: None,
                    budget_range: None,
                    source: None,
                    notes: None,
                },
                ts(2026, 1, 10),
            )
            .await
            .unwrap()
            .id
    }

    fn line(service: &str, qty: i64, price: i64) -> NewLineItem {
        NewLineItem {
            service_name: service.to_string(),
            description: None,
            quantity: Quantity::from_hundredths(qty),
            unit_price: Money::from_cents(price),
        }
    }

    fn new_invoice(client_id: &str, items: Vec<NewLineItem>) -> NewInvoice {
        NewInvoice {
            client_id: client_id.to_string(),
            quote_id: None,
            due_date: date(2026, 9, 30),
            payment_terms: Some("Paiement à 30 jours".to_string()),
            tax_rate: TaxRate::from_bps(2000),
            items,
        }
    }

    #[tokio::test]
    async fn test_create_allocates_fac_numbers() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client_id = seed_client(&db, "jeanne@example.fr").await;
        let repo = db.invoices();

        let first = repo
            .create(new_invoice(&client_id, vec![line("Conception", 100, 10000)]), ts(2026, 2, 1))
            .await
            .unwrap();
        assert_eq!(first.invoice.invoice_number, "FAC-2026-0001");
        assert_eq!(first.invoice.status, InvoiceStatus::Draft);

        let second = repo
            .create(new_invoice(&client_id, vec![line("Suivi", 100, 5000)]), ts(2026, 2, 2))
            .await
            .unwrap();
        assert_eq!(second.invoice.invoice_number, "FAC-2026-0002");
    }

    #[tokio::test]
    async fn test_quote_and_invoice_sequences_are_independent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client_id = seed_client(&db, "jeanne@example.fr").await;

        db.quotes()
            .create(
                NewQuote {
                    client_id: client_id.clone(),
                    valid_until: date(2026, 12, 31),
                    notes: None,
                    terms_conditions: None,
                    tax_rate: TaxRate::from_bps(2000),
                    items: vec![line("Conception", 100, 10000)],
                },
                ts(2026, 2, 1),
            )
            .await
            .unwrap();

        let invoice = db
            .invoices()
            .create(new_invoice(&client_id, vec![line("Conception", 100, 10000)]), ts(2026, 2, 2))
            .await
            .unwrap();

        // the quote did not advance the invoice sequence
        assert_eq!(invoice.invoice.invoice_number, "FAC-2026-0001");
    }

    #[tokio::test]
    async fn test_create_from_quote_copies_everything_verbatim() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client_id = seed_client(&db, "jeanne@example.fr").await;

        // quote frozen at a 20% rate
        let quote = db
            .quotes()
            .create(
                NewQuote {
                    client_id: client_id.clone(),
                    valid_until: date(2026, 12, 31),
                    notes: None,
                    terms_conditions: None,
                    tax_rate: TaxRate::from_bps(2000),
                    items: vec![
                        line("Conception", 200, 10000),
                        line("Suivi de chantier", 100, 5000),
                    ],
                },
                ts(2026, 2, 1),
            )
            .await
            .unwrap();

        let derived = db
            .invoices()
            .create_from_quote(&quote.quote.id, date(2026, 9, 30), None, ts(2026, 3, 1))
            .await
            .unwrap();

        // totals byte-identical to the quote's, tax rate included
        assert_eq!(derived.invoice.subtotal_cents, quote.quote.subtotal_cents);
        assert_eq!(derived.invoice.tax_rate_bps, quote.quote.tax_rate_bps);
        assert_eq!(derived.invoice.tax_amount_cents, quote.quote.tax_amount_cents);
        assert_eq!(derived.invoice.total_cents, quote.quote.total_cents);
        assert_eq!(derived.invoice.quote_id.as_deref(), Some(quote.quote.id.as_str()));
        assert_eq!(derived.invoice.status, InvoiceStatus::Draft);

        assert_eq!(derived.items.len(), quote.items.len());
        for (inv_item, q_item) in derived.items.iter().zip(quote.items.iter()) {
            assert_eq!(inv_item.service_name, q_item.service_name);
            assert_eq!(inv_item.quantity_hundredths, q_item.quantity_hundredths);
            assert_eq!(inv_item.unit_price_cents, q_item.unit_price_cents);
            assert_eq!(inv_item.total_price_cents, q_item.total_price_cents);
            assert_eq!(inv_item.position, q_item.position);
        }

        // the quote detail now exposes the derived invoice
        let reloaded = db.quotes().get(&quote.quote.id).await.unwrap();
        assert_eq!(
            reloaded.invoice.map(|i| i.id),
            Some(derived.invoice.id.clone())
        );
    }

    #[tokio::test]
    async fn test_mark_paid_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client_id = seed_client(&db, "jeanne@example.fr").await;
        let repo = db.invoices();

        let created = repo
            .create(new_invoice(&client_id, vec![line("Conception", 100, 10000)]), ts(2026, 2, 1))
            .await
            .unwrap();

        let paid = repo
            .mark_paid(&created.invoice.id, date(2026, 3, 15), ts(2026, 3, 15))
            .await
            .unwrap();
        assert_eq!(paid.invoice.status, InvoiceStatus::Paid);
        assert_eq!(paid.invoice.paid_date, Some(date(2026, 3, 15)));

        let paid_again = repo
            .mark_paid(&created.invoice.id, date(2026, 3, 15), ts(2026, 3, 16))
            .await
            .unwrap();
        assert_eq!(paid_again.invoice.status, InvoiceStatus::Paid);
        assert_eq!(paid_again.invoice.paid_date, Some(date(2026, 3, 15)));
    }

    #[tokio::test]
    async fn test_overdue_filter_matches_pure_predicate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client_id = seed_client(&db, "jeanne@example.fr").await;
        let repo = db.invoices();
        let today = date(2026, 8, 4);

        // sent, due last month -> overdue
        let mut overdue_input = new_invoice(&client_id, vec![line("Conception", 100, 10000)]);
        overdue_input.due_date = date(2026, 7, 1);
        let late = repo.create(overdue_input, ts(2026, 6, 1)).await.unwrap();

        // paid, same past due date -> not overdue
        let mut paid_input = new_invoice(&client_id, vec![line("Suivi", 100, 5000)]);
        paid_input.due_date = date(2026, 7, 1);
        let settled = repo.create(paid_input, ts(2026, 6, 2)).await.unwrap();
        repo.mark_paid(&settled.invoice.id, date(2026, 6, 20), ts(2026, 6, 20))
            .await
            .unwrap();

        // due in the future -> not overdue
        repo.create(new_invoice(&client_id, vec![line("Mobilier", 100, 2000)]), ts(2026, 6, 3))
            .await
            .unwrap();

        let filtered = repo
            .list(
                &InvoiceFilter {
                    overdue: true,
                    ..InvoiceFilter::default()
                },
                today,
                1,
            )
            .await
            .unwrap();

        assert_eq!(filtered.total, 1);
        assert_eq!(filtered.items[0].invoice.id, late.invoice.id);

        // the SQL filter and the pure predicate agree on every row
        let all = repo.list(&InvoiceFilter::default(), today, 1).await.unwrap();
        for detail in &all.items {
            let expected = is_overdue(detail.invoice.status, detail.invoice.due_date, today);
            let in_filtered = filtered.items.iter().any(|d| d.invoice.id == detail.invoice.id);
            assert_eq!(expected, in_filtered);
        }
    }

    #[tokio::test]
    async fn test_quote_delete_nulls_invoice_back_reference() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client_id = seed_client(&db, "jeanne@example.fr").await;

        let quote = db
            .quotes()
            .create(
                NewQuote {
                    client_id: client_id.clone(),
                    valid_until: date(2026, 12, 31),
                    notes: None,
                    terms_conditions: None,
                    tax_rate: TaxRate::from_bps(2000),
                    items: vec![line("Conception", 100, 10000)],
                },
                ts(2026, 2, 1),
            )
            .await
            .unwrap();

        let derived = db
            .invoices()
            .create_from_quote(&quote.quote.id, date(2026, 9, 30), None, ts(2026, 3, 1))
            .await
            .unwrap();

        db.quotes().delete(&quote.quote.id).await.unwrap();

        let reloaded = db.invoices().get(&derived.invoice.id).await.unwrap();
        assert!(reloaded.invoice.quote_id.is_none());
        assert!(reloaded.quote.is_none());
        // amounts survive the unlink
        assert_eq!(reloaded.invoice.total_cents, derived.invoice.total_cents);
    }

    #[tokio::test]
    async fn test_update_replaces_items_and_recomputes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client_id = seed_client(&db, "jeanne@example.fr").await;
        let repo = db.invoices();

        let created = repo
            .create(new_invoice(&client_id, vec![line("Conception", 100, 10000)]), ts(2026, 2, 1))
            .await
            .unwrap();

        let updated = repo
            .update(
                &created.invoice.id,
                InvoiceUpdate {
                    client_id: client_id.clone(),
                    quote_id: None,
                    status: InvoiceStatus::Sent,
                    due_date: date(2026, 10, 31),
                    paid_date: None,
                    payment_terms: None,
                    tax_rate: TaxRate::from_bps(1000),
                    items: vec![line("Mobilier sur mesure", 200, 30000)],
                },
                ts(2026, 2, 10),
            )
            .await
            .unwrap();

        assert_eq!(updated.items.len(), 1);
        assert_eq!(updated.invoice.subtotal_cents, 60000);
        assert_eq!(updated.invoice.tax_rate_bps, 1000);
        assert_eq!(updated.invoice.tax_amount_cents, 6000);
        assert_eq!(updated.invoice.total_cents, 66000);
        assert_eq!(updated.invoice.status, InvoiceStatus::Sent);
    }
}
