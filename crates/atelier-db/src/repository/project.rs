//! # Project Repository
//!
//! Portfolio/case-study records. The `gallery` and `services` lists are
//! stored as JSON text columns; [`ProjectRow`] keeps the storage shape out
//! of the domain type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use atelier_core::{Client, Project, ProjectStatus};

use crate::error::{DbError, DbResult};
use crate::repository::{page_offset, Page, PER_PAGE};

/// Raw projects row as stored; JSON columns still serialized.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct ProjectRow {
    pub id: String,
    pub client_id: String,
    pub name: String,
    pub category: String,
    pub year: i64,
    pub location: String,
    pub description: String,
    pub featured_image: Option<String>,
    pub gallery: Option<String>,
    pub services: Option<String>,
    pub surface: Option<String>,
    pub duration: Option<String>,
    pub budget_range: Option<String>,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn parse_string_list(raw: Option<String>) -> Vec<String> {
    raw.as_deref()
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: row.id,
            client_id: row.client_id,
            name: row.name,
            category: row.category,
            year: row.year,
            location: row.location,
            description: row.description,
            featured_image: row.featured_image,
            gallery: parse_string_list(row.gallery),
            services: parse_string_list(row.services),
            surface: row.surface,
            duration: row.duration,
            budget_range: row.budget_range,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Validated field set for creating or fully replacing a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInput {
    pub client_id: String,
    pub name: String,
    pub category: String,
    pub year: i64,
    pub location: String,
    pub description: String,
    pub featured_image: Option<String>,
    pub gallery: Vec<String>,
    pub services: Vec<String>,
    pub surface: Option<String>,
    pub duration: Option<String>,
    pub budget_range: Option<String>,
    pub status: ProjectStatus,
}

/// List filters for the project index.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    pub category: Option<String>,
    pub client_id: Option<String>,
    /// Matches name, location, or category.
    pub search: Option<String>,
}

/// A project with its owning client, as the API returns it.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectWithClient {
    pub project: Project,
    pub client: Client,
}

#[derive(Debug, Clone)]
pub struct ProjectRepository {
    pool: SqlitePool,
}

impl ProjectRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProjectRepository { pool }
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &ProjectFilter) {
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(category) = &filter.category {
            qb.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(client_id) = &filter.client_id {
            qb.push(" AND client_id = ").push_bind(client_id.clone());
        }
        if let Some(search) = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let pattern = format!("%{search}%");
            qb.push(" AND (name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR location LIKE ")
                .push_bind(pattern.clone())
                .push(" OR category LIKE ")
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

    async fn with_clients(&self, rows: Vec<ProjectRow>) -> DbResult<Vec<ProjectWithClient>> {
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let project = Project::from(row);
            let client = self.client_for(&project.client_id).await?;
            out.push(ProjectWithClient { project, client });
        }
        Ok(out)
    }

    /// Lists projects newest first, filtered and paginated.
    pub async fn list(
        &self,
        filter: &ProjectFilter,
        page: u32,
    ) -> DbResult<Page<ProjectWithClient>> {
        debug!(?filter, page, "listing projects");

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM projects WHERE 1=1");
        Self::push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::new("SELECT * FROM projects WHERE 1=1");
        Self::push_filters(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(i64::from(PER_PAGE))
            .push(" OFFSET ")
            .push_bind(page_offset(page));

        let rows: Vec<ProjectRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        let items = self.with_clients(rows).await?;

        Ok(Page {
            items,
            total,
            page: page.max(1),
            per_page: PER_PAGE,
        })
    }

    pub async fn get(&self, id: &str) -> DbResult<ProjectWithClient> {
        let row: Option<ProjectRow> = sqlx::query_as("SELECT * FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let row = row.ok_or_else(|| DbError::not_found("Project", id))?;
        let project = Project::from(row);
        let client = self.client_for(&project.client_id).await?;

        Ok(ProjectWithClient { project, client })
    }

    /// Published portfolio, newest year first.
    pub async fn portfolio(&self) -> DbResult<Vec<ProjectWithClient>> {
        let rows: Vec<ProjectRow> = sqlx::query_as(
            "SELECT * FROM projects WHERE status = ? ORDER BY year DESC, created_at DESC",
        )
        .bind(ProjectStatus::Portfolio)
        .fetch_all(&self.pool)
        .await?;

        self.with_clients(rows).await
    }

    pub async fn insert(&self, input: ProjectInput, now: DateTime<Utc>) -> DbResult<ProjectWithClient> {
        let id = Uuid::new_v4().to_string();
        let gallery =
            serde_json::to_string(&input.gallery).map_err(|e| DbError::Internal(e.to_string()))?;
        let services =
            serde_json::to_string(&input.services).map_err(|e| DbError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO projects (
                id, client_id, name, category, year, location, description,
                featured_image, gallery, services, surface, duration,
                budget_range, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&input.client_id)
        .bind(&input.name)
        .bind(&input.category)
        .bind(input.year)
        .bind(&input.location)
        .bind(&input.description)
        .bind(&input.featured_image)
        .bind(&gallery)
        .bind(&services)
        .bind(&input.surface)
        .bind(&input.duration)
        .bind(&input.budget_range)
        .bind(input.status)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        info!(id = %id, name = %input.name, "project created");
        self.get(&id).await
    }

    pub async fn update(
        &self,
        id: &str,
        input: ProjectInput,
        now: DateTime<Utc>,
    ) -> DbResult<ProjectWithClient> {
        let gallery =
            serde_json::to_string(&input.gallery).map_err(|e| DbError::Internal(e.to_string()))?;
        let services =
            serde_json::to_string(&input.services).map_err(|e| DbError::Internal(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE projects SET
                client_id = ?, name = ?, category = ?, year = ?, location = ?,
                description = ?, featured_image = ?, gallery = ?, services = ?,
                surface = ?, duration = ?, budget_range = ?, status = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.client_id)
        .bind(&input.name)
        .bind(&input.category)
        .bind(input.year)
        .bind(&input.location)
        .bind(&input.description)
        .bind(&input.featured_image)
        .bind(&gallery)
        .bind(&services)
        .bind(&input.surface)
        .bind(&input.duration)
        .bind(&input.budget_range)
        .bind(input.status)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Project", id));
        }

        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Project", id));
        }

        info!(id = %id, "project deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::client::ClientInput;

    async fn seed_client(db: &Database) -> String {
        db.clients()
            .insert(
                ClientInput {
                    company_name: None,
                    contact_name: "Jeanne Martin".to_string(),
                    email: "jeanne@example.fr".to_string(),
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
                Utc::now(),
            )
            .await
            .unwrap()
            .id
    }

    fn project(client_id: &str, name: &str, year: i64, status: ProjectStatus) -> ProjectInput {
        ProjectInput {
            client_id: client_id.to_string(),
            name: name.to_string(),
            category: "Appartement".to_string(),
            year,
            location: "Paris".to_string(),
            description: "Rénovation complète".to_string(),
            featured_image: None,
            gallery: vec!["a.jpg".to_string(), "b.jpg".to_string()],
            services: vec!["conception".to_string()],
            surface: Some("80 m²".to_string()),
            duration: None,
            budget_range: None,
            status,
        }
    }

    #[tokio::test]
    async fn test_json_lists_roundtrip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client_id = seed_client(&db).await;

        let created = db
            .projects()
            .insert(project(&client_id, "Loft Marais", 2025, ProjectStatus::InProgress), Utc::now())
            .await
            .unwrap();

        assert_eq!(created.project.gallery, vec!["a.jpg", "b.jpg"]);
        assert_eq!(created.project.services, vec!["conception"]);
        assert_eq!(created.client.id, client_id);
    }

    #[tokio::test]
    async fn test_portfolio_ordered_by_year_desc() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client_id = seed_client(&db).await;
        let repo = db.projects();

        repo.insert(project(&client_id, "Ancien", 2021, ProjectStatus::Portfolio), Utc::now())
            .await
            .unwrap();
        repo.insert(project(&client_id, "Récent", 2025, ProjectStatus::Portfolio), Utc::now())
            .await
            .unwrap();
        repo.insert(project(&client_id, "En cours", 2026, ProjectStatus::InProgress), Utc::now())
            .await
            .unwrap();

        let portfolio = repo.portfolio().await.unwrap();
        let names: Vec<&str> = portfolio.iter().map(|p| p.project.name.as_str()).collect();
        assert_eq!(names, vec!["Récent", "Ancien"]);
    }

    #[tokio::test]
    async fn test_status_filter() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client_id = seed_client(&db).await;
        let repo = db.projects();

        repo.insert(project(&client_id, "A", 2024, ProjectStatus::Completed), Utc::now())
            .await
            .unwrap();
        repo.insert(project(&client_id, "B", 2024, ProjectStatus::InProgress), Utc::now())
            .await
            .unwrap();

        let completed = repo
            .list(
                &ProjectFilter {
                    status: Some(ProjectStatus::Completed),
                    ..ProjectFilter::default()
                },
                1,
            )
            .await
            .unwrap();
        assert_eq!(completed.total, 1);
        assert_eq!(completed.items[0].project.name, "A");
    }
}
