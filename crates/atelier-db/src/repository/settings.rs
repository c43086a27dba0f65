//! # Settings Repository
//!
//! Access to the singleton company-settings row.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use atelier_core::CompanySettings;

use crate::error::DbResult;

/// Repository for the company settings singleton.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Returns the sole settings record, creating it with fixed defaults
    /// on first access. The row is never deleted and never duplicated by
    /// this path.
    ///
    /// The select-then-insert runs in one transaction; two racing first
    /// accesses could still both observe an empty table before either
    /// commits. Acceptable for a single-admin deployment - callers must
    /// not assume the race is impossible.
    pub async fn current(&self, now: DateTime<Utc>) -> DbResult<CompanySettings> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<CompanySettings> =
            sqlx::query_as("SELECT * FROM company_settings ORDER BY rowid LIMIT 1")
                .fetch_optional(&mut *tx)
                .await?;

        if let Some(settings) = existing {
            tx.commit().await?;
            return Ok(settings);
        }

        let settings = CompanySettings::with_defaults(Uuid::new_v4().to_string(), now);

        sqlx::query(
            r#"
            INSERT INTO company_settings (
                id, company_name, address, city, postal_code, country,
                phone, email, website, tax_number,
                default_tax_rate_bps, payment_terms,
                quote_validity_days, invoice_due_days,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&settings.id)
        .bind(&settings.company_name)
        .bind(&settings.address)
        .bind(&settings.city)
        .bind(&settings.postal_code)
        .bind(&settings.country)
        .bind(&settings.phone)
        .bind(&settings.email)
        .bind(&settings.website)
        .bind(&settings.tax_number)
        .bind(settings.default_tax_rate_bps)
        .bind(&settings.payment_terms)
        .bind(settings.quote_validity_days)
        .bind(settings.invoice_due_days)
        .bind(settings.created_at)
        .bind(settings.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(id = %settings.id, "created default company settings");
        Ok(settings)
    }
}
