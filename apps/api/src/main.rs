//! # Atelier API
//!
//! REST server for the studio's admin SPA and public marketing site.
//!
//! ## Architecture
//! ```text
//! SPA / site ──► axum (HTTP) ──► handlers ──► repositories ──► SQLite
//!                                   │
//!                                   └──► atelier-core (totals, numbering,
//!                                        validation - pure functions)
//! ```

mod auth;
mod config;
mod error;
mod handlers;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use atelier_db::{Database, DbConfig};

use crate::auth::JwtManager;
use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(true)
        .init();

    info!("starting atelier api server");

    let config = ApiConfig::load()?;
    info!(
        port = config.http_port,
        database = %config.database_path,
        "configuration loaded"
    );

    // connect + migrate
    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!("database ready");

    let jwt = Arc::new(JwtManager::new(
        config.jwt_secret.clone(),
        config.jwt_access_lifetime_secs,
    ));

    let state = AppState { db, jwt };
    let app = routes::build_router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    info!(%addr, "listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, draining connections");
}
