//! Quote lifecycle handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use atelier_core::totals::NewLineItem;
use atelier_core::{validation, QuoteStatus};
use atelier_db::repository::quote::{NewQuote, QuoteFilter, QuoteUpdate};

use crate::error::ApiError;
use crate::handlers::{message, MessageResponse, PageDto, QuoteDto};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct QuoteListQuery {
    pub page: Option<u32>,
    pub status: Option<QuoteStatus>,
    pub client_id: Option<String>,
    pub search: Option<String>,
}

/// One raw line item as posted by the SPA; amounts are 2-decimal strings.
#[derive(Debug, Deserialize)]
pub struct LineItemRequest {
    pub service_name: String,
    pub description: Option<String>,
    pub quantity: String,
    pub unit_price: String,
}

/// Validates the posted item list into domain lines. Runs before any
/// persistence work; the whole request is rejected on the first bad row.
pub(crate) fn parse_items(items: &[LineItemRequest]) -> Result<Vec<NewLineItem>, ApiError> {
    validation::ensure_items_present(items.len())?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            validation::parse_line_item(
                index,
                &item.service_name,
                item.description.as_deref(),
                &item.quantity,
                &item.unit_price,
            )
            .map_err(ApiError::from)
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct StoreQuoteRequest {
    pub client_id: String,
    pub valid_until: NaiveDate,
    pub notes: Option<String>,
    pub terms_conditions: Option<String>,
    pub items: Vec<LineItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuoteRequest {
    pub client_id: String,
    pub status: QuoteStatus,
    pub valid_until: NaiveDate,
    pub notes: Option<String>,
    pub terms_conditions: Option<String>,
    pub items: Vec<LineItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteStatusRequest {
    pub status: QuoteStatus,
}

/// `GET /admin/quotes`
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<QuoteListQuery>,
) -> Result<Json<PageDto<QuoteDto>>, ApiError> {
    let filter = QuoteFilter {
        status: query.status,
        client_id: query.client_id,
        search: query.search,
    };

    let page = state
        .db
        .quotes()
        .list(&filter, query.page.unwrap_or(1))
        .await?;

    let today = Utc::now().date_naive();
    Ok(Json(PageDto::from_page(page, |detail| {
        QuoteDto::from_detail(detail, today)
    })))
}

/// `POST /admin/quotes` - validates, pulls the tax rate from settings,
/// computes totals, allocates a number, persists atomically.
pub async fn store(
    State(state): State<AppState>,
    Json(req): Json<StoreQuoteRequest>,
) -> Result<(StatusCode, Json<QuoteDto>), ApiError> {
    let now = Utc::now();
    let today = now.date_naive();

    validation::validate_future_date("valid_until", req.valid_until, today)?;
    let items = parse_items(&req.items)?;

    if !state.db.clients().exists(&req.client_id).await? {
        return Err(ApiError::validation(
            "client_id does not reference an existing client",
        ));
    }

    let settings = state.db.settings().current(now).await?;

    let detail = state
        .db
        .quotes()
        .create(
            NewQuote {
                client_id: req.client_id,
                valid_until: req.valid_until,
                notes: req.notes,
                terms_conditions: req.terms_conditions,
                tax_rate: settings.default_tax_rate(),
                items,
            },
            now,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(QuoteDto::from_detail(detail, today))))
}

/// `GET /admin/quotes/:id`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<QuoteDto>, ApiError> {
    let detail = state.db.quotes().get(&id).await?;
    Ok(Json(QuoteDto::from_detail(detail, Utc::now().date_naive())))
}

/// `PUT /admin/quotes/:id` - full replacement; totals recomputed at the
/// current settings rate, items replaced wholesale.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateQuoteRequest>,
) -> Result<Json<QuoteDto>, ApiError> {
    let now = Utc::now();

    let items = parse_items(&req.items)?;

    if !state.db.clients().exists(&req.client_id).await? {
        return Err(ApiError::validation(
            "client_id does not reference an existing client",
        ));
    }

    let settings = state.db.settings().current(now).await?;

    let detail = state
        .db
        .quotes()
        .update(
            &id,
            QuoteUpdate {
                client_id: req.client_id,
                status: req.status,
                valid_until: req.valid_until,
                notes: req.notes,
                terms_conditions: req.terms_conditions,
                tax_rate: settings.default_tax_rate(),
                items,
            },
            now,
        )
        .await?;

    Ok(Json(QuoteDto::from_detail(detail, now.date_naive())))
}

/// `PATCH /admin/quotes/:id/status` - status only, nothing recomputed.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<QuoteStatusRequest>,
) -> Result<Json<QuoteDto>, ApiError> {
    let now = Utc::now();
    let detail = state.db.quotes().update_status(&id, req.status, now).await?;

    Ok(Json(QuoteDto::from_detail(detail, now.date_naive())))
}

/// `DELETE /admin/quotes/:id`
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.db.quotes().delete(&id).await?;
    Ok(Json(message("Quote deleted successfully")))
}
