//! Admin authentication handlers and the bearer-token middleware.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use atelier_core::Admin;

use crate::auth::{extract_bearer_token, verify_password, Claims};
use crate::error::ApiError;
use crate::handlers::{message, MessageResponse};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Admin account as exposed to the SPA (never the password hash).
#[derive(Debug, Serialize)]
pub struct AdminDto {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<Admin> for AdminDto {
    fn from(admin: Admin) -> Self {
        AdminDto {
            id: admin.id,
            name: admin.name,
            email: admin.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub admin: AdminDto,
}

/// `POST /admin/login` - verifies credentials and issues a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = req.email.trim();

    let admin = state.db.admins().find_by_email(email).await?;

    // same response for unknown email and wrong password
    let admin = match admin {
        Some(admin) if verify_password(&admin.password_hash, &req.password) => admin,
        _ => {
            warn!(email = %email, "failed login attempt");
            return Err(ApiError::unauthorized("invalid email or password"));
        }
    };

    let token = state.jwt.generate_access_token(&admin.id, &admin.email)?;

    info!(admin_id = %admin.id, "admin logged in");

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt.access_lifetime_secs(),
        admin: admin.into(),
    }))
}

/// `POST /admin/logout` - tokens are stateless; the middleware has already
/// validated the caller, so this just acknowledges.
pub async fn logout(Extension(claims): Extension<Claims>) -> Json<MessageResponse> {
    info!(admin_id = %claims.sub, "admin logged out");
    Json(message("Logged out successfully"))
}

/// `GET /admin/me` - the authenticated admin's account.
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<AdminDto>, ApiError> {
    let admin = state
        .db
        .admins()
        .find_by_id(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("account no longer exists"))?;

    Ok(Json(admin.into()))
}

/// Middleware guarding every `/admin` route except login: requires a valid
/// bearer token and stows the claims for handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("missing authorization header"))?;

    let token = extract_bearer_token(header)
        .ok_or_else(|| ApiError::unauthorized("expected a bearer token"))?;

    let claims = state.jwt.validate_token(token)?;
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
