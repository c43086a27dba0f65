//! Project CRUD handlers plus the public-facing portfolio listing.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::{validation, Client, Project, ProjectStatus};
use atelier_db::repository::project::{ProjectFilter, ProjectInput, ProjectWithClient};

use crate::error::ApiError;
use crate::handlers::{message, MessageResponse, PageDto};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ProjectListQuery {
    pub page: Option<u32>,
    pub status: Option<ProjectStatus>,
    pub category: Option<String>,
    pub client_id: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectRequest {
    pub client_id: String,
    pub name: String,
    pub category: String,
    pub year: i64,
    pub location: String,
    pub description: String,
    pub featured_image: Option<String>,
    #[serde(default)]
    pub gallery: Vec<String>,
    #[serde(default)]
    pub services: Vec<String>,
    pub surface: Option<String>,
    pub duration: Option<String>,
    pub budget_range: Option<String>,
    pub status: ProjectStatus,
}

impl ProjectRequest {
    fn into_input(self, current_year: i64) -> Result<ProjectInput, ApiError> {
        let name = validation::validate_name("name", &self.name)?;
        let category = validation::validate_name("category", &self.category)?;
        let location = validation::validate_name("location", &self.location)?;
        let description = validation::validate_required("description", &self.description)?;
        validation::validate_project_year(self.year, current_year)?;

        Ok(ProjectInput {
            client_id: self.client_id,
            name,
            category,
            year: self.year,
            location,
            description,
            featured_image: self.featured_image,
            gallery: self.gallery,
            services: self.services,
            surface: self.surface,
            duration: self.duration,
            budget_range: self.budget_range,
            status: self.status,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectDto {
    #[serde(flatten)]
    pub project: Project,
    pub client: Client,
}

impl From<ProjectWithClient> for ProjectDto {
    fn from(value: ProjectWithClient) -> Self {
        ProjectDto {
            project: value.project,
            client: value.client,
        }
    }
}

/// `GET /admin/projects`
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProjectListQuery>,
) -> Result<Json<PageDto<ProjectDto>>, ApiError> {
    let filter = ProjectFilter {
        status: query.status,
        category: query.category,
        client_id: query.client_id,
        search: query.search,
    };

    let page = state
        .db
        .projects()
        .list(&filter, query.page.unwrap_or(1))
        .await?;

    Ok(Json(PageDto::from_page(page, ProjectDto::from)))
}

/// `POST /admin/projects`
pub async fn store(
    State(state): State<AppState>,
    Json(req): Json<ProjectRequest>,
) -> Result<(StatusCode, Json<ProjectDto>), ApiError> {
    let now = Utc::now();
    let input = req.into_input(i64::from(now.year()))?;

    if !state.db.clients().exists(&input.client_id).await? {
        return Err(ApiError::validation(
            "client_id does not reference an existing client",
        ));
    }

    let created = state.db.projects().insert(input, now).await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// `GET /admin/projects/:id`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProjectDto>, ApiError> {
    let project = state.db.projects().get(&id).await?;
    Ok(Json(project.into()))
}

/// `PUT /admin/projects/:id`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ProjectRequest>,
) -> Result<Json<ProjectDto>, ApiError> {
    let now = Utc::now();
    let input = req.into_input(i64::from(now.year()))?;

    if !state.db.clients().exists(&input.client_id).await? {
        return Err(ApiError::validation(
            "client_id does not reference an existing client",
        ));
    }

    let updated = state.db.projects().update(&id, input, now).await?;

    Ok(Json(updated.into()))
}

/// `DELETE /admin/projects/:id`
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.db.projects().delete(&id).await?;
    Ok(Json(message("Project deleted successfully")))
}

/// `GET /admin/portfolio` - published projects, newest year first.
pub async fn portfolio(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectDto>>, ApiError> {
    let projects = state.db.projects().portfolio().await?;
    Ok(Json(projects.into_iter().map(ProjectDto::from).collect()))
}
