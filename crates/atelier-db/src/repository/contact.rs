//! # Contact Request Repository
//!
//! Inbound leads from the public contact form, and their one-way
//! conversion into clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use atelier_core::{Client, ContactRequest, ContactStatus};

use crate::error::{DbError, DbResult};
use crate::repository::{page_offset, Page, PER_PAGE};

/// Field set captured by the public contact form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub project_type: String,
    pub budget: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ContactRepository {
    pool: SqlitePool,
}

impl ContactRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ContactRepository { pool }
    }

    /// Records a new lead (public endpoint; status starts at `new`).
    pub async fn insert(&self, input: ContactInput, now: DateTime<Utc>) -> DbResult<ContactRequest> {
        let contact = ContactRequest {
            id: Uuid::new_v4().to_string(),
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            project_type: input.project_type,
            budget: input.budget,
            message: input.message,
            status: ContactStatus::New,
            converted_client_id: None,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO contact_requests (
                id, first_name, last_name, email, phone, project_type,
                budget, message, status, converted_client_id,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&contact.id)
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.project_type)
        .bind(&contact.budget)
        .bind(&contact.message)
        .bind(contact.status)
        .bind(&contact.converted_client_id)
        .bind(contact.created_at)
        .bind(contact.updated_at)
        .execute(&self.pool)
        .await?;

        info!(id = %contact.id, email = %contact.email, "contact request received");
        Ok(contact)
    }

    /// Lists leads newest first, optionally filtered by status.
    pub async fn list(
        &self,
        status: Option<ContactStatus>,
        page: u32,
    ) -> DbResult<Page<ContactRequest>> {
        debug!(?status, page, "listing contact requests");

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM contact_requests WHERE 1=1");
        if let Some(status) = status {
            count_qb.push(" AND status = ").push_bind(status);
        }
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT * FROM contact_requests WHERE 1=1");
        if let Some(status) = status {
            qb.push(" AND status = ").push_bind(status);
        }
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(i64::from(PER_PAGE))
            .push(" OFFSET ")
            .push_bind(page_offset(page));

        let items: Vec<ContactRequest> = qb.build_query_as().fetch_all(&self.pool).await?;

        Ok(Page {
            items,
            total,
            page: page.max(1),
            per_page: PER_PAGE,
        })
    }

    pub async fn get(&self, id: &str) -> DbResult<ContactRequest> {
        let contact: Option<ContactRequest> =
            sqlx::query_as("SELECT * FROM contact_requests WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        contact.ok_or_else(|| DbError::not_found("ContactRequest", id))
    }

    /// Sets the lead's status (e.g. marking it read). The `converted`
    /// status is owned by [`Self::convert`]; setting it here does not
    /// create a client.
    pub async fn update_status(
        &self,
        id: &str,
        status: ContactStatus,
        now: DateTime<Utc>,
    ) -> DbResult<ContactRequest> {
        let result = sqlx::query("UPDATE contact_requests SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ContactRequest", id));
        }

        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM contact_requests WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ContactRequest", id));
        }

        Ok(())
    }

    /// Converts a lead into a client, in one transaction.
    ///
    /// The conversion link is set once and never reversed: converting an
    /// already-converted lead is a conflict. The new client inherits the
    /// lead's contact details with source `contact_form`; a duplicate
    /// client email aborts the whole operation.
    pub async fn convert(&self, id: &str, now: DateTime<Utc>) -> DbResult<(ContactRequest, Client)> {
        let mut tx = self.pool.begin().await?;

        let contact: Option<ContactRequest> =
            sqlx::query_as("SELECT * FROM contact_requests WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let contact = contact.ok_or_else(|| DbError::not_found("ContactRequest", id))?;

        if contact.status == ContactStatus::Converted || contact.converted_client_id.is_some() {
            return Err(DbError::Conflict(format!(
                "contact request {id} has already been converted"
            )));
        }

        let client = Client {
            id: Uuid::new_v4().to_string(),
            company_name: None,
            contact_name: format!("{} {}", contact.first_name, contact.last_name),
            email: contact.email.clone(),
            phone: Some(contact.phone.clone()),
            address: None,
            city: None,
            postal_code: None,
            country: None,
            project_type: Some(contact.project_type.clone()),
            budget_range: contact.budget.clone(),
            source: Some("contact_form".to_string()),
            notes: None,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO clients (
                id, company_name, contact_name, email, phone,
                address, city, postal_code, country,
                project_type, budget_range, source, notes,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&client.id)
        .bind(&client.company_name)
        .bind(&client.contact_name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address)
        .bind(&client.city)
        .bind(&client.postal_code)
        .bind(&client.country)
        .bind(&client.project_type)
        .bind(&client.budget_range)
        .bind(&client.source)
        .bind(&client.notes)
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE contact_requests SET status = ?, converted_client_id = ?, updated_at = ? WHERE id = ?",
        )
        .bind(ContactStatus::Converted)
        .bind(&client.id)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(contact_id = %id, client_id = %client.id, "contact request converted to client");

        let contact = self.get(id).await?;
        Ok((contact, client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn lead(email: &str) -> ContactInput {
        ContactInput {
            first_name: "Claire".to_string(),
            last_name: "Moreau".to_string(),
            email: email.to_string(),
            phone: "+33 6 00 00 00 00".to_string(),
            project_type: "renovation".to_string(),
            budget: Some("20-50k".to_string()),
            message: "Bonjour, je souhaite rénover mon appartement.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_status_flow() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.contacts();

        let contact = repo.insert(lead("claire@example.fr"), Utc::now()).await.unwrap();
        assert_eq!(contact.status, ContactStatus::New);

        let read = repo
            .update_status(&contact.id, ContactStatus::Read, Utc::now())
            .await
            .unwrap();
        assert_eq!(read.status, ContactStatus::Read);

        let new_only = repo.list(Some(ContactStatus::New), 1).await.unwrap();
        assert_eq!(new_only.total, 0);
    }

    #[tokio::test]
    async fn test_convert_creates_and_links_client() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.contacts();

        let contact = repo.insert(lead("claire@example.fr"), Utc::now()).await.unwrap();
        let (converted, client) = repo.convert(&contact.id, Utc::now()).await.unwrap();

        assert_eq!(converted.status, ContactStatus::Converted);
        assert_eq!(converted.converted_client_id.as_deref(), Some(client.id.as_str()));
        assert_eq!(client.contact_name, "Claire Moreau");
        assert_eq!(client.email, "claire@example.fr");
        assert_eq!(client.source.as_deref(), Some("contact_form"));

        // conversion is one-way and set once
        let err = repo.convert(&contact.id, Utc::now()).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_convert_rolls_back_on_duplicate_client_email() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.contacts();

        let first = repo.insert(lead("claire@example.fr"), Utc::now()).await.unwrap();
        repo.convert(&first.id, Utc::now()).await.unwrap();

        let second = repo.insert(lead("claire@example.fr"), Utc::now()).await.unwrap();
        let err = repo.convert(&second.id, Utc::now()).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        // the failed conversion left the lead untouched
        let reloaded = repo.get(&second.id).await.unwrap();
        assert_eq!(reloaded.status, ContactStatus::New);
        assert!(reloaded.converted_client_id.is_none());
    }

    #[tokio::test]
    async fn test_deleting_client_nulls_conversion_link() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.contacts();

        let contact = repo.insert(lead("claire@example.fr"), Utc::now()).await.unwrap();
        let (_, client) = repo.convert(&contact.id, Utc::now()).await.unwrap();

        db.clients().delete(&client.id).await.unwrap();

        let reloaded = repo.get(&contact.id).await.unwrap();
        assert!(reloaded.converted_client_id.is_none());
        // the lead itself survives
        assert_eq!(reloaded.status, ContactStatus::Converted);
    }
}
