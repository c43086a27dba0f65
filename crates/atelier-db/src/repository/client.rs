//! # Client Repository
//!
//! CRUD and aggregate assembly for clients.
//!
//! Deleting a client cascades to its quotes, invoices, and projects
//! (foreign-key policy); a converted contact request keeps existing with a
//! NULLed back-reference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use atelier_core::{Client, ContactRequest, Invoice, Project, Quote};

use crate::error::{DbError, DbResult};
use crate::repository::project::ProjectRow;
use crate::repository::{page_offset, Page, PER_PAGE};

/// Validated field set for creating or fully replacing a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInput {
    pub company_name: Option<String>,
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub project_type: Option<String>,
    pub budget_range: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
}

/// List filters for the client index.
#[derive(Debug, Clone, Default)]
pub struct ClientFilter {
    /// Matches company name, contact name, or email.
    pub search: Option<String>,
    pub project_type: Option<String>,
}

/// A client with everything it owns, assembled for the detail view.
#[derive(Debug, Clone, Serialize)]
pub struct ClientAggregate {
    pub client: Client,
    pub quotes: Vec<Quote>,
    pub invoices: Vec<Invoice>,
    pub projects: Vec<Project>,
    pub contact_request: Option<ContactRequest>,
}

/// Repository for client database operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &ClientFilter) {
        if let Some(search) = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let pattern = format!("%{search}%");
            qb.push(" AND (company_name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR contact_name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR email LIKE ")
                .push_bind(pattern)
                .push(")");
        }

        if let Some(project_type) = &filter.project_type {
            qb.push(" AND project_type = ").push_bind(project_type.clone());
        }
    }

    /// Lists clients newest first, filtered and paginated.
    pub async fn list(&self, filter: &ClientFilter, page: u32) -> DbResult<Page<Client>> {
        debug!(?filter, page, "listing clients");

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM clients WHERE 1=1");
        Self::push_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::new("SELECT * FROM clients WHERE 1=1");
        Self::push_filters(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(i64::from(PER_PAGE))
            .push(" OFFSET ")
            .push_bind(page_offset(page));

        let items: Vec<Client> = qb.build_query_as().fetch_all(&self.pool).await?;

        Ok(Page {
            items,
            total,
            page: page.max(1),
            per_page: PER_PAGE,
        })
    }

    pub async fn get(&self, id: &str) -> DbResult<Client> {
        let client: Option<Client> = sqlx::query_as("SELECT * FROM clients WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        client.ok_or_else(|| DbError::not_found("Client", id))
    }

    /// Assembles the client detail aggregate: the client plus its quotes,
    /// invoices, projects, and originating contact request.
    pub async fn get_aggregate(&self, id: &str) -> DbResult<ClientAggregate> {
        let client = self.get(id).await?;

        let quotes: Vec<Quote> =
            sqlx::query_as("SELECT * FROM quotes WHERE client_id = ? ORDER BY created_at DESC")
                .bind(id)
                .fetch_all(&self.pool)
                .await?;

        let invoices: Vec<Invoice> =
            sqlx::query_as("SELECT * FROM invoices WHERE client_id = ? ORDER BY created_at DESC")
                .bind(id)
                .fetch_all(&self.pool)
                .await?;

        let project_rows: Vec<ProjectRow> =
            sqlx::query_as("SELECT * FROM projects WHERE client_id = ? ORDER BY created_at DESC")
                .bind(id)
                .fetch_all(&self.pool)
                .await?;
        let projects = project_rows.into_iter().map(Project::from).collect();

        let contact_request: Option<ContactRequest> =
            sqlx::query_as("SELECT * FROM contact_requests WHERE converted_client_id = ? LIMIT 1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(ClientAggregate {
            client,
            quotes,
            invoices,
            projects,
            contact_request,
        })
    }

    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM clients WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    /// Inserts a new client. Email is unique across clients.
    pub async fn insert(&self, input: ClientInput, now: DateTime<Utc>) -> DbResult<Client> {
        let client = Client {
            id: Uuid::new_v4().to_string(),
            company_name: input.company_name,
            contact_name: input.contact_name,
            email: input.email,
            phone: input.phone,
            address: input.address,
            city: input.city,
            postal_code: input.postal_code,
            country: input.country,
            project_type: input.project_type,
            budget_range: input.budget_range,
            source: input.source,
            notes: input.notes,
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
        .execute(&self.pool)
        .await?;

        info!(id = %client.id, email = %client.email, "client created");
        Ok(client)
    }

    /// Fully replaces a client's editable fields.
    pub async fn update(
        &self,
        id: &str,
        input: ClientInput,
        now: DateTime<Utc>,
    ) -> DbResult<Client> {
        let result = sqlx::query(
            r#"
            UPDATE clients SET
                company_name = ?, contact_name = ?, email = ?, phone = ?,
                address = ?, city = ?, postal_code = ?, country = ?,
                project_type = ?, budget_range = ?, source = ?, notes = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.company_name)
        .bind(&input.contact_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.postal_code)
        .bind(&input.country)
        .bind(&input.project_type)
        .bind(&input.budget_range)
        .bind(&input.source)
        .bind(&input.notes)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", id));
        }

        self.get(id).await
    }

    /// Deletes a client; owned quotes/invoices/projects cascade away.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM clients WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", id));
        }

        info!(id = %id, "client deleted");
        Ok(())
    }
}
