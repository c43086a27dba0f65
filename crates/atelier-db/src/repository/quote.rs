//! # Quote Repository
//!
//! Quote lifecycle: creation with number allocation, full-replace updates,
//! status changes, deletion.
//!
//! ## Lifecycle
//! ```text
//! create()         -> totals computed, number allocated, quote + items
//!                     inserted in ONE transaction
//! update()         -> totals recomputed, ALL items replaced
//!                     (delete-then-insert), one transaction
//! update_status()  -> status only, nothing recomputed
//! delete()         -> items cascade; a derived invoice keeps existing
//!                     with quote_id = NULL
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use atelier_core::numbering::DocumentKind;
use atelier_core::totals::{self, DocumentTotals, NewLineItem};
use atelier_core::{Client, Invoice, Quote, QuoteItem, QuoteStatus, TaxRate};

use crate::error::{DbError, DbResult};
use crate::repository::{
    allocate_number, insert_line_items, page_offset, Page, NUMBER_ALLOC_ATTEMPTS, PER_PAGE,
};

/// Validated input for creating a quote. The tax rate comes from the
/// current company settings and is frozen into the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuote {
    pub client_id: String,
    pub valid_until: NaiveDate,
    pub notes: Option<String>,
    pub terms_conditions: Option<String>,
    pub tax_rate: TaxRate,
    pub items: Vec<NewLineItem>,
}

/// Validated input for fully replacing a quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteUpdate {
    pub client_id: String,
    pub status: QuoteStatus,
    pub valid_until: NaiveDate,
    pub notes: Option<String>,
    pub terms_conditions: Option<String>,
    pub tax_rate: TaxRate,
    pub items: Vec<NewLineItem>,
}

/// List filters for the quote index.
#[derive(Debug, Clone, Default)]
pub struct QuoteFilter {
    pub status: Option<QuoteStatus>,
    pub client_id: Option<String>,
    /// Matches the client's company/contact name or the quote number.
    pub search: Option<String>,
}

/// A quote with its client and ordered items. `invoice` is the derived
/// invoice back-reference, loaded on the detail view only.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteDetail {
    pub quote: Quote,
    pub client: Client,
    pub items: Vec<QuoteItem>,
    pub invoice: Option<Invoice>,
}

/// Repository for quote database operations.
#[derive(Debug, Clone)]
pub struct QuoteRepository {
    pool: SqlitePool,
}

impl QuoteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        QuoteRepository { pool }
    }

    /// Creates a quote: allocates the next `DEV-YYYY-NNNN` number, computes
    /// totals from the items at the given tax rate, and persists quote plus
    /// items atomically. Retries on a number collision (UNIQUE column).
    pub async fn create(&self, new: NewQuote, now: DateTime<Utc>) -> DbResult<QuoteDetail> {
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

            let number = allocate_number(&mut tx, DocumentKind::Quote, now).await?;
            let quote_id = Uuid::new_v4().to_string();

            match Self::insert_quote_row(&mut tx, &quote_id, &number, &new, totals, now).await {
                Ok(()) => {}
                Err(e)
                    if e.is_unique_violation_on("quote_number")
                        && attempt < NUMBER_ALLOC_ATTEMPTS =>
                {
                    warn!(number = %number, attempt, "quote number taken, retrying allocation");
                    drop(tx);
                    attempt += 1;
                    continue;
                }
                Err(e) => return Err(e),
            }

            insert_line_items(&mut tx, "quote_items", "quote_id", &quote_id, &new.items, now)
                .await?;
            tx.commit().await?;

            info!(id = %quote_id, number = %number, total_cents = totals.total.cents(), "quote created");
            return self.get(&quote_id).await;
        }
    }

    async fn insert_quote_row(
        conn: &mut SqliteConnection,
        id: &str,
        number: &str,
        new: &NewQuote,
        totals: DocumentTotals,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO quotes (
                id, quote_number, client_id, status, valid_until,
                subtotal_cents, tax_rate_bps, tax_amount_cents, total_cents,
                notes, terms_conditions, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(number)
        .bind(&new.client_id)
        .bind(QuoteStatus::Draft)
        .bind(new.valid_until)
        .bind(totals.subtotal.cents())
        .bind(new.tax_rate.bps())
        .bind(totals.tax_amount.cents())
        .bind(totals.total.cents())
        .bind(&new.notes)
        .bind(&new.terms_conditions)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Fully replaces a quote: parent fields and totals are rewritten from
    /// the new item set, and the old items are discarded wholesale - never
    /// merged. One transaction; any failure leaves the quote untouched.
    pub async fn update(
        &self,
        id: &str,
        update: QuoteUpdate,
        now: DateTime<Utc>,
    ) -> DbResult<QuoteDetail> {
        let totals = totals::compute(&update.items, update.tax_rate);

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE quotes SET
                client_id = ?, status = ?, valid_until = ?,
                subtotal_cents = ?, tax_rate_bps = ?, tax_amount_cents = ?,
                total_cents = ?, notes = ?, terms_conditions = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.client_id)
        .bind(update.status)
        .bind(update.valid_until)
        .bind(totals.subtotal.cents())
        .bind(update.tax_rate.bps())
        .bind(totals.tax_amount.cents())
        .bind(totals.total.cents())
        .bind(&update.notes)
        .bind(&update.terms_conditions)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Quote", id));
        }

        sqlx::query("DELETE FROM quote_items WHERE quote_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        insert_line_items(&mut tx, "quote_items", "quote_id", id, &update.items, now).await?;
        tx.commit().await?;

        debug!(id = %id, "quote updated");
        self.get(id).await
    }

    /// Sets the status only; amounts and items are untouched.
    pub async fn update_status(
        &self,
        id: &str,
        status: QuoteStatus,
        now: DateTime<Utc>,
    ) -> DbResult<QuoteDetail> {
        let result = sqlx::query("UPDATE quotes SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Quote", id));
        }

        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM quotes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Quote", id));
        }

        info!(id = %id, "quote deleted");
        Ok(())
    }

    /// Loads the full detail: quote, client, ordered items, and the
    /// derived invoice if one exists.
    pub async fn get(&self, id: &str) -> DbResult<QuoteDetail> {
        let quote: Option<Quote> = sqlx::query_as("SELECT * FROM quotes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let quote = quote.ok_or_else(|| DbError::not_found("Quote", id))?;

        let client = self.client_for(&quote.client_id).await?;
        let items = self.items_for(id).await?;

        let invoice: Option<Invoice> = sqlx::query_as(
            "SELECT * FROM invoices WHERE quote_id = ? ORDER BY created_at DESC LIMIT 1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(QuoteDetail {
            quote,
            client,
            items,
            invoice,
        })
    }

    /// Lists quotes newest first, filtered and paginated. The invoice
    /// back-reference is not loaded on the index.
    pub async fn list(&self, filter: &QuoteFilter, page: u32) -> DbResult<Page<QuoteDetail>> {
        debug!(?filter, page, "listing quotes");

        let mut count_qb = QueryBuilder::new(
            "SELECT COUNT(*) FROM quotes q JOIN clients c ON c.id = q.client_id WHERE 1=1",
        );
        Self::push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::new(
            "SELECT q.* FROM quotes q JOIN clients c ON c.id = q.client_id WHERE 1=1",
        );
        Self::push_filters(&mut qb, filter);
        qb.push(" ORDER BY q.created_at DESC LIMIT ")
            .push_bind(i64::from(PER_PAGE))
            .push(" OFFSET ")
            .push_bind(page_offset(page));

        let quotes: Vec<Quote> = qb.build_query_as().fetch_all(&self.pool).await?;

        let mut items = Vec::with_capacity(quotes.len());
        for quote in quotes {
            let client = self.client_for(&quote.client_id).await?;
            let quote_items = self.items_for(&quote.id).await?;
            items.push(QuoteDetail {
                quote,
                client,
                items: quote_items,
                invoice: None,
            });
        }

        Ok(Page {
            items,
            total,
            page: page.max(1),
            per_page: PER_PAGE,
        })
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &QuoteFilter) {
        if let Some(status) = filter.status {
            qb.push(" AND q.status = ").push_bind(status);
        }
        if let Some(client_id) = &filter.client_id {
            qb.push(" AND q.client_id = ").push_bind(client_id.clone());
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
                .push(" OR q.quote_number LIKE ")
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

    async fn items_for(&self, quote_id: &str) -> DbResult<Vec<QuoteItem>> {
        let items: Vec<QuoteItem> =
            sqlx::query_as("SELECT * FROM quote_items WHERE quote_id = ? ORDER BY position")
                .bind(quote_id)
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
    use atelier_core::{Money, Quantity};
    use chrono::TimeZone;

    fn ts(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn due(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    async fn seed_client(db: &Database, email: &str) -> String {
        db.clients()
            .insert(
                ClientInput {
                    company_name: Some("Maison Dubois".to_string()),
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

    fn new_quote(client_id: &str, items: Vec<NewLineItem>) -> NewQuote {
        NewQuote {
            client_id: client_id.to_string(),
            valid_until: due(2026, 12, 31),
            notes: None,
            terms_conditions: None,
            tax_rate: TaxRate::from_bps(2000),
            items,
        }
    }

    #[tokio::test]
    async fn test_create_allocates_sequential_numbers() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client_id = seed_client(&db, "jeanne@example.fr").await;
        let repo = db.quotes();

        let first = repo
            .create(new_quote(&client_id, vec![line("Conception", 100, 10000)]), ts(2026, 2, 1))
            .await
            .unwrap();
        assert_eq!(first.quote.quote_number, "DEV-2026-0001");
        assert_eq!(first.quote.status, QuoteStatus::Draft);

        let second = repo
            .create(new_quote(&client_id, vec![line("Suivi", 100, 5000)]), ts(2026, 3, 1))
            .await
            .unwrap();
        assert_eq!(second.quote.quote_number, "DEV-2026-0002");
    }

    #[tokio::test]
    async fn test_numbering_resets_each_year() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client_id = seed_client(&db, "jeanne@example.fr").await;
        let repo = db.quotes();

        let late_2025 = repo
            .create(new_quote(&client_id, vec![line("Conception", 100, 10000)]), ts(2025, 12, 30))
            .await
            .unwrap();
        assert_eq!(late_2025.quote.quote_number, "DEV-2025-0001");

        let early_2026 = repo
            .create(new_quote(&client_id, vec![line("Conception", 100, 10000)]), ts(2026, 1, 2))
            .await
            .unwrap();
        assert_eq!(early_2026.quote.quote_number, "DEV-2026-0001");
    }

    #[tokio::test]
    async fn test_create_stores_exact_totals() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client_id = seed_client(&db, "jeanne@example.fr").await;

        // 2 x 100.00 + 1 x 50.00 at 20% -> 250.00 / 50.00 / 300.00
        let detail = db
            .quotes()
            .create(
                new_quote(
                    &client_id,
                    vec![line("Conception", 200, 10000), line("Suivi", 100, 5000)],
                ),
                ts(2026, 2, 1),
            )
            .await
            .unwrap();

        assert_eq!(detail.quote.subtotal_cents, 25000);
        assert_eq!(detail.quote.tax_amount_cents, 5000);
        assert_eq!(detail.quote.total_cents, 30000);

        assert_eq!(detail.items.len(), 2);
        assert_eq!(detail.items[0].position, 1);
        assert_eq!(detail.items[0].total_price_cents, 20000);
        assert_eq!(detail.items[1].position, 2);
        assert_eq!(detail.items[1].total_price_cents, 5000);
    }

    #[tokio::test]
    async fn test_create_with_unknown_client_fails() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .quotes()
            .create(new_quote("missing", vec![line("Conception", 100, 10000)]), ts(2026, 2, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_replaces_items_wholesale() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client_id = seed_client(&db, "jeanne@example.fr").await;
        let repo = db.quotes();

        let created = repo
            .create(
                new_quote(
                    &client_id,
                    vec![line("Conception", 100, 10000), line("Suivi", 100, 5000)],
                ),
                ts(2026, 2, 1),
            )
            .await
            .unwrap();

        let updated = repo
            .update(
                &created.quote.id,
                QuoteUpdate {
                    client_id: client_id.clone(),
                    status: QuoteStatus::Sent,
                    valid_until: due(2026, 12, 31),
                    notes: Some("Révision".to_string()),
                    terms_conditions: None,
                    tax_rate: TaxRate::from_bps(2000),
                    items: vec![line("Mobilier sur mesure", 300, 20000)],
                },
                ts(2026, 2, 5),
            )
            .await
            .unwrap();

        // exactly the new item set, none of the old rows
        assert_eq!(updated.items.len(), 1);
        assert_eq!(updated.items[0].service_name, "Mobilier sur mesure");
        assert_eq!(updated.quote.subtotal_cents, 60000);
        assert_eq!(updated.quote.status, QuoteStatus::Sent);

        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quote_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(orphans, 1);

        // the number never changes
        assert_eq!(updated.quote.quote_number, created.quote.quote_number);
    }

    #[tokio::test]
    async fn test_update_status_only() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client_id = seed_client(&db, "jeanne@example.fr").await;
        let repo = db.quotes();

        let created = repo
            .create(new_quote(&client_id, vec![line("Conception", 100, 10000)]), ts(2026, 2, 1))
            .await
            .unwrap();

        let updated = repo
            .update_status(&created.quote.id, QuoteStatus::Accepted, ts(2026, 2, 2))
            .await
            .unwrap();
        assert_eq!(updated.quote.status, QuoteStatus::Accepted);
        assert_eq!(updated.quote.total_cents, created.quote.total_cents);

        // the permissive transition set allows going back to draft
        let reverted = repo
            .update_status(&created.quote.id, QuoteStatus::Draft, ts(2026, 2, 3))
            .await
            .unwrap();
        assert_eq!(reverted.quote.status, QuoteStatus::Draft);
    }

    #[tokio::test]
    async fn test_delete_cascades_items() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client_id = seed_client(&db, "jeanne@example.fr").await;
        let repo = db.quotes();

        let created = repo
            .create(new_quote(&client_id, vec![line("Conception", 100, 10000)]), ts(2026, 2, 1))
            .await
            .unwrap();

        repo.delete(&created.quote.id).await.unwrap();

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quote_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_client_delete_cascades_quotes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client_id = seed_client(&db, "jeanne@example.fr").await;
        let repo = db.quotes();

        repo.create(new_quote(&client_id, vec![line("Conception", 100, 10000)]), ts(2026, 2, 1))
            .await
            .unwrap();

        db.clients().delete(&client_id).await.unwrap();

        let listed = repo.list(&QuoteFilter::default(), 1).await.unwrap();
        assert_eq!(listed.total, 0);
    }

    #[tokio::test]
    async fn test_malformed_stored_number_is_refused() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client_id = seed_client(&db, "jeanne@example.fr").await;
        let repo = db.quotes();

        repo.create(new_quote(&client_id, vec![line("Conception", 100, 10000)]), ts(2026, 2, 1))
            .await
            .unwrap();

        sqlx::query("UPDATE quotes SET quote_number = 'DEV-2026-ABCD'")
            .execute(db.pool())
            .await
            .unwrap();

        let err = repo
            .create(new_quote(&client_id, vec![line("Suivi", 100, 5000)]), ts(2026, 3, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Internal(_)));
    }

    #[tokio::test]
    async fn test_list_search_matches_client_or_number() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client_id = seed_client(&db, "jeanne@example.fr").await;
        let other_id = seed_client(&db, "paul@example.fr").await;
        let repo = db.quotes();

        repo.create(new_quote(&client_id, vec![line("Conception", 100, 10000)]), ts(2026, 2, 1))
            .await
            .unwrap();
        repo.create(new_quote(&other_id, vec![line("Suivi", 100, 5000)]), ts(2026, 2, 2))
            .await
            .unwrap();

        let by_number = repo
            .list(
                &QuoteFilter {
                    search: Some("DEV-2026-0002".to_string()),
                    ..QuoteFilter::default()
                },
                1,
            )
            .await
            .unwrap();
        assert_eq!(by_number.total, 1);

        let by_client = repo
            .list(
                &QuoteFilter {
                    client_id: Some(client_id.clone()),
                    ..QuoteFilter::default()
                },
                1,
            )
            .await
            .unwrap();
        assert_eq!(by_client.total, 1);
        assert_eq!(by_client.items[0].quote.quote_number, "DEV-2026-0001");
    }
}
