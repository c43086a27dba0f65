//! Invoice lifecycle handlers, including derivation from quotes and
//! payment marking.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use atelier_core::{validation, InvoiceStatus};
use atelier_db::repository::invoice::{InvoiceFilter, InvoiceUpdate, NewInvoice};

use crate::error::ApiError;
use crate::handlers::quotes::{parse_items, LineItemRequest};
use crate::handlers::{message, InvoiceDto, MessageResponse, PageDto};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct InvoiceListQuery {
    pub page: Option<u32>,
    pub status: Option<InvoiceStatus>,
    pub client_id: Option<String>,
    pub overdue: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StoreInvoiceRequest {
    pub client_id: String,
    pub quote_id: Option<String>,
    pub due_date: NaiveDate,
    pub payment_terms: Option<String>,
    pub items: Vec<LineItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceRequest {
    pub client_id: String,
    pub quote_id: Option<String>,
    pub status: InvoiceStatus,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub payment_terms: Option<String>,
    pub items: Vec<LineItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFromQuoteRequest {
    pub due_date: NaiveDate,
    pub payment_terms: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MarkPaidRequest {
    pub paid_date: NaiveDate,
}

/// `GET /admin/invoices`
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<InvoiceListQuery>,
) -> Result<Json<PageDto<InvoiceDto>>, ApiError> {
    let today = Utc::now().date_naive();

    let filter = InvoiceFilter {
        status: query.status,
        client_id: query.client_id,
        overdue: query.overdue.unwrap_or(false),
        search: query.search,
    };

    let page = state
        .db
        .invoices()
        .list(&filter, today, query.page.unwrap_or(1))
        .await?;

    Ok(Json(PageDto::from_page(page, |detail| {
        InvoiceDto::from_detail(detail, today)
    })))
}

/// `POST /admin/invoices` - direct creation. Payment terms default from
/// the company settings when the request leaves them out.
pub async fn store(
    State(state): State<AppState>,
    Json(req): Json<StoreInvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceDto>), ApiError> {
    let now = Utc::now();
    let today = now.date_naive();

    validation::validate_future_date("due_date", req.due_date, today)?;
    let items = parse_items(&req.items)?;

    if !state.db.clients().exists(&req.client_id).await? {
        return Err(ApiError::validation(
            "client_id does not reference an existing client",
        ));
    }

    let settings = state.db.settings().current(now).await?;

    let detail = state
        .db
        .invoices()
        .create(
            NewInvoice {
                client_id: req.client_id,
                quote_id: req.quote_id,
                due_date: req.due_date,
                payment_terms: req.payment_terms.or(settings.payment_terms.clone()),
                tax_rate: settings.default_tax_rate(),
                items,
            },
            now,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(InvoiceDto::from_detail(detail, today))))
}

/// `POST /admin/quotes/:id/invoice` - derives an invoice from the quote,
/// copying totals and items verbatim.
pub async fn create_from_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<String>,
    Json(req): Json<CreateFromQuoteRequest>,
) -> Result<(StatusCode, Json<InvoiceDto>), ApiError> {
    let now = Utc::now();
    let today = now.date_naive();

    validation::validate_future_date("due_date", req.due_date, today)?;

    let settings = state.db.settings().current(now).await?;
    let payment_terms = req.payment_terms.or(settings.payment_terms);

    let detail = state
        .db
        .invoices()
        .create_from_quote(&quote_id, req.due_date, payment_terms, now)
        .await?;

    Ok((StatusCode::CREATED, Json(InvoiceDto::from_detail(detail, today))))
}

/// `GET /admin/invoices/:id`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InvoiceDto>, ApiError> {
    let detail = state.db.invoices().get(&id).await?;
    Ok(Json(InvoiceDto::from_detail(detail, Utc::now().date_naive())))
}

/// `PUT /admin/invoices/:id` - full replacement; totals recomputed at the
/// current settings rate, items replaced wholesale.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateInvoiceRequest>,
) -> Result<Json<InvoiceDto>, ApiError> {
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
        .invoices()
        .update(
            &id,
            InvoiceUpdate {
                client_id: req.client_id,
                quote_id: req.quote_id,
                status: req.status,
                due_date: req.due_date,
                paid_date: req.paid_date,
                payment_terms: req.payment_terms,
                tax_rate: settings.default_tax_rate(),
                items,
            },
            now,
        )
        .await?;

    Ok(Json(InvoiceDto::from_detail(detail, now.date_naive())))
}

/// `PATCH /admin/invoices/:id/paid` - marks paid with the given date.
/// Idempotent; the paid date is recorded as sent.
pub async fn mark_paid(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MarkPaidRequest>,
) -> Result<Json<InvoiceDto>, ApiError> {
    let now = Utc::now();
    let detail = state
        .db
        .invoices()
        .mark_paid(&id, req.paid_date, now)
        .await?;

    Ok(Json(InvoiceDto::from_detail(detail, now.date_naive())))
}

/// `DELETE /admin/invoices/:id`
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.db.invoices().delete(&id).await?;
    Ok(Json(message("Invoice deleted successfully")))
}
