//! Route table: the public contact endpoint, the login endpoint, and the
//! JWT-guarded admin surface.

use axum::middleware;
use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers;
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::me))
        .route("/dashboard", get(handlers::dashboard::index))
        .route(
            "/clients",
            get(handlers::clients::index).post(handlers::clients::store),
        )
        .route(
            "/clients/:id",
            get(handlers::clients::show)
                .put(handlers::clients::update)
                .delete(handlers::clients::destroy),
        )
        .route("/contacts", get(handlers::contacts::index))
        .route(
            "/contacts/:id",
            get(handlers::contacts::show)
                .patch(handlers::contacts::update_status)
                .delete(handlers::contacts::destroy),
        )
        .route("/contacts/:id/convert", post(handlers::contacts::convert))
        .route(
            "/quotes",
            get(handlers::quotes::index).post(handlers::quotes::store),
        )
        .route(
            "/quotes/:id",
            get(handlers::quotes::show)
                .put(handlers::quotes::update)
                .delete(handlers::quotes::destroy),
        )
        .route("/quotes/:id/status", patch(handlers::quotes::update_status))
        .route(
            "/quotes/:id/invoice",
            post(handlers::invoices::create_from_quote),
        )
        .route(
            "/invoices",
            get(handlers::invoices::index).post(handlers::invoices::store),
        )
        .route(
            "/invoices/:id",
            get(handlers::invoices::show)
                .put(handlers::invoices::update)
                .delete(handlers::invoices::destroy),
        )
        .route("/invoices/:id/paid", patch(handlers::invoices::mark_paid))
        .route(
            "/projects",
            get(handlers::projects::index).post(handlers::projects::store),
        )
        .route(
            "/projects/:id",
            get(handlers::projects::show)
                .put(handlers::projects::update)
                .delete(handlers::projects::destroy),
        )
        .route("/portfolio", get(handlers::projects::portfolio))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::auth::require_auth,
        ));

    Router::new()
        .route("/contact", post(handlers::contacts::store_public))
        .route("/admin/login", post(handlers::auth::login))
        .nest("/admin", admin)
        .with_state(state)
}
