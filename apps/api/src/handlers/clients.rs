//! Client CRUD handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use atelier_core::{validation, Client, ContactRequest, Project};
use atelier_db::repository::client::{ClientAggregate, ClientFilter, ClientInput};

use crate::error::ApiError;
use crate::handlers::{
    message, InvoiceSummaryDto, MessageResponse, PageDto, QuoteSummaryDto,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ClientListQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub project_type: Option<String>,
}

/// Create/replace request body; validation mirrors the registry rules
/// (contact name and email required, everything else free-form).
#[derive(Debug, Deserialize)]
pub struct ClientRequest {
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

impl ClientRequest {
    fn into_input(self) -> Result<ClientInput, ApiError> {
        let contact_name = validation::validate_name("contact_name", &self.contact_name)?;
        let email = validation::validate_email(&self.email)?;

        Ok(ClientInput {
            company_name: self.company_name,
            contact_name,
            email,
            phone: self.phone,
            address: self.address,
            city: self.city,
            postal_code: self.postal_code,
            country: self.country,
            project_type: self.project_type,
            budget_range: self.budget_range,
            source: self.source,
            notes: self.notes,
        })
    }
}

/// Client detail: the record plus everything it owns.
#[derive(Debug, Serialize)]
pub struct ClientDetailDto {
    #[serde(flatten)]
    pub client: Client,
    pub quotes: Vec<QuoteSummaryDto>,
    pub invoices: Vec<InvoiceSummaryDto>,
    pub projects: Vec<Project>,
    pub contact_request: Option<ContactRequest>,
}

impl From<ClientAggregate> for ClientDetailDto {
    fn from(aggregate: ClientAggregate) -> Self {
        let today = Utc::now().date_naive();
        ClientDetailDto {
            client: aggregate.client,
            quotes: aggregate.quotes.into_iter().map(QuoteSummaryDto::from).collect(),
            invoices: aggregate
                .invoices
                .into_iter()
                .map(|invoice| InvoiceSummaryDto::from_invoice(invoice, today))
                .collect(),
            projects: aggregate.projects,
            contact_request: aggregate.contact_request,
        }
    }
}

/// `GET /admin/clients`
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ClientListQuery>,
) -> Result<Json<PageDto<Client>>, ApiError> {
    let filter = ClientFilter {
        search: query.search,
        project_type: query.project_type,
    };

    let page = state
        .db
        .clients()
        .list(&filter, query.page.unwrap_or(1))
        .await?;

    Ok(Json(PageDto::from_page(page, |client| client)))
}

/// `POST /admin/clients`
pub async fn store(
    State(state): State<AppState>,
    Json(req): Json<ClientRequest>,
) -> Result<(StatusCode, Json<Client>), ApiError> {
    let input = req.into_input()?;
    let client = state.db.clients().insert(input, Utc::now()).await?;

    Ok((StatusCode::CREATED, Json(client)))
}

/// `GET /admin/clients/:id`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ClientDetailDto>, ApiError> {
    let aggregate = state.db.clients().get_aggregate(&id).await?;
    Ok(Json(aggregate.into()))
}

/// `PUT /admin/clients/:id`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ClientRequest>,
) -> Result<Json<Client>, ApiError> {
    let input = req.into_input()?;
    let client = state.db.clients().update(&id, input, Utc::now()).await?;

    Ok(Json(client))
}

/// `DELETE /admin/clients/:id` - cascades to quotes, invoices, projects.
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.db.clients().delete(&id).await?;
    Ok(Json(message("Client deleted successfully")))
}
