//! Contact-form lead handlers: the public intake endpoint and the admin
//! lead-management surface.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use atelier_core::{validation, Client, ContactRequest, ContactStatus};
use atelier_db::repository::contact::ContactInput;

use crate::error::ApiError;
use crate::handlers::{message, MessageResponse, PageDto};
use crate::AppState;

/// Public contact form body.
#[derive(Debug, Deserialize)]
pub struct ContactFormRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub project_type: String,
    pub budget: Option<String>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ContactListQuery {
    pub page: Option<u32>,
    pub status: Option<ContactStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ContactStatusRequest {
    pub status: ContactStatus,
}

/// Conversion response: the updated lead plus the created client.
#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub contact: ContactRequest,
    pub client: Client,
}

/// `POST /contact` - public, no authentication.
pub async fn store_public(
    State(state): State<AppState>,
    Json(req): Json<ContactFormRequest>,
) -> Result<(StatusCode, Json<ContactRequest>), ApiError> {
    let input = ContactInput {
        first_name: validation::validate_name("first_name", &req.first_name)?,
        last_name: validation::validate_name("last_name", &req.last_name)?,
        email: validation::validate_email(&req.email)?,
        phone: validation::validate_name("phone", &req.phone)?,
        project_type: validation::validate_name("project_type", &req.project_type)?,
        budget: req.budget,
        message: validation::validate_required("message", &req.message)?,
    };

    let contact = state.db.contacts().insert(input, Utc::now()).await?;

    Ok((StatusCode::CREATED, Json(contact)))
}

/// `GET /admin/contacts`
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ContactListQuery>,
) -> Result<Json<PageDto<ContactRequest>>, ApiError> {
    let page = state
        .db
        .contacts()
        .list(query.status, query.page.unwrap_or(1))
        .await?;

    Ok(Json(PageDto::from_page(page, |contact| contact)))
}

/// `GET /admin/contacts/:id`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContactRequest>, ApiError> {
    let contact = state.db.contacts().get(&id).await?;
    Ok(Json(contact))
}

/// `PATCH /admin/contacts/:id` - status changes only (e.g. mark read).
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ContactStatusRequest>,
) -> Result<Json<ContactRequest>, ApiError> {
    let contact = state
        .db
        .contacts()
        .update_status(&id, req.status, Utc::now())
        .await?;

    Ok(Json(contact))
}

/// `DELETE /admin/contacts/:id`
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.db.contacts().delete(&id).await?;
    Ok(Json(message("Contact request deleted successfully")))
}

/// `POST /admin/contacts/:id/convert` - one-way conversion into a client.
pub async fn convert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ConvertResponse>), ApiError> {
    let (contact, client) = state.db.contacts().convert(&id, Utc::now()).await?;

    Ok((StatusCode::CREATED, Json(ConvertResponse { contact, client })))
}
