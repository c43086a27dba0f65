//! # Repository Layer
//!
//! One repository per aggregate. Persistence stays behind explicit
//! functions that take ids and return assembled aggregates; entities never
//! lazy-load their relations.
//!
//! ## Shared Concerns
//! - [`Page`]: the 15-per-page list envelope used by every index endpoint
//! - [`allocate_number`]: year-scoped business numbers for quotes and
//!   invoices, read inside the caller's transaction

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqliteConnection;
use uuid::Uuid;

use atelier_core::numbering::{self, DocumentKind};
use atelier_core::totals::NewLineItem;

use crate::error::{DbError, DbResult};

pub mod admin;
pub mod client;
pub mod contact;
pub mod dashboard;
pub mod invoice;
pub mod project;
pub mod quote;
pub mod settings;

// =============================================================================
// Pagination
// =============================================================================

/// Fixed page size for list endpoints.
pub const PER_PAGE: u32 = 15;

/// One page of results plus the total row count for the filter.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

/// Row offset for a 1-based page number.
pub(crate) fn page_offset(page: u32) -> i64 {
    i64::from(page.max(1) - 1) * i64::from(PER_PAGE)
}

// =============================================================================
// Document Numbering
// =============================================================================

/// Attempts made to allocate a unique document number before giving up.
/// The UNIQUE column catches the read-then-increment race; a retry re-reads
/// the newest number inside a fresh transaction.
pub(crate) const NUMBER_ALLOC_ATTEMPTS: u32 = 3;

/// Returns the business number of the newest document of `kind` created in
/// `now`'s calendar year, by creation order (newest row, not a parse of
/// the numbers). Must run on the same connection/transaction as the
/// subsequent insert.
async fn newest_number_in_year(
    conn: &mut SqliteConnection,
    kind: DocumentKind,
    now: DateTime<Utc>,
) -> DbResult<Option<String>> {
    let year = numbering::numbering_year(now);
    // ISO-8601 text timestamps compare lexicographically, so year scoping
    // is a plain range check on the stored strings.
    let lower = format!("{year:04}-01-01");
    let upper = format!("{:04}-01-01", year + 1);

    let sql = match kind {
        DocumentKind::Quote => {
            "SELECT quote_number FROM quotes \
             WHERE created_at >= ?1 AND created_at < ?2 \
             ORDER BY created_at DESC, rowid DESC LIMIT 1"
        }
        DocumentKind::Invoice => {
            "SELECT invoice_number FROM invoices \
             WHERE created_at >= ?1 AND created_at < ?2 \
             ORDER BY created_at DESC, rowid DESC LIMIT 1"
        }
    };

    let number: Option<String> = sqlx::query_scalar(sql)
        .bind(&lower)
        .bind(&upper)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(number)
}

/// Allocates the next document number for `kind` within `now`'s year.
///
/// A malformed stored number surfaces as a storage error; allocation never
/// silently restarts a corrupt sequence.
pub(crate) async fn allocate_number(
    conn: &mut SqliteConnection,
    kind: DocumentKind,
    now: DateTime<Utc>,
) -> DbResult<String> {
    let last = newest_number_in_year(conn, kind, now).await?;
    let sequence =
        numbering::next_sequence(last.as_deref()).map_err(|e| DbError::Internal(e.to_string()))?;

    Ok(numbering::format_number(
        kind,
        numbering::numbering_year(now),
        sequence,
    ))
}

// =============================================================================
// Line Items
// =============================================================================

/// Inserts validated line items under a parent document, assigning 1-based
/// display positions in input order. `total_price` is computed and stored
/// here, at write time. Quote and invoice item tables share one shape.
pub(crate) async fn insert_line_items(
    conn: &mut SqliteConnection,
    table: &str,
    parent_column: &str,
    parent_id: &str,
    items: &[NewLineItem],
    now: DateTime<Utc>,
) -> DbResult<()> {
    let sql = format!(
        "INSERT INTO {table} (
            id, {parent_column}, service_name, description,
            quantity_hundredths, unit_price_cents, total_price_cents,
            position, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
    );

    for (index, item) in items.iter().enumerate() {
        sqlx::query(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(parent_id)
            .bind(&item.service_name)
            .bind(&item.description)
            .bind(item.quantity.hundredths())
            .bind(item.unit_price.cents())
            .bind(item.total_price().cents())
            .bind((index + 1) as i64)
            .bind(now)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}
