//! Dashboard HTTP API
//!
//! Serves page sessions over WebSocket and exposes the live document store,
//! built with Axum.
//!
//! # Endpoints
//!
//! ## Pages
//! - `GET /api/v1/ws?page=dashboard|login&path=...&width=...` - Page session
//!
//! ## Collections
//! - `GET /api/v1/collections` - List collections
//! - `GET /api/v1/collections/:name` - Current documents
//! - `POST /api/v1/collections/:name/documents` - Insert a document
//! - `DELETE /api/v1/collections/:name/documents/:id` - Remove a document
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use ppm_dashboard::api::{serve, AppState};
//! use ppm_dashboard::auth::MemoryAuth;
//! use ppm_dashboard::backend::DocumentStore;
//! use ppm_dashboard::config::DashboardConfig;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DashboardConfig::default();
//!     let server = config.server.clone();
//!     let state = AppState::new(
//!         Arc::new(DocumentStore::default()),
//!         Arc::new(MemoryAuth::new()),
//!         config,
//!     );
//!     serve(state, &server).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::websocket::websocket_handler;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/collections", get(routes::collections::list_collections))
        .route("/collections/:name", get(routes::collections::get_collection))
        .route(
            "/collections/:name/documents",
            post(routes::collections::insert_document),
        )
        .route(
            "/collections/:name/documents/:id",
            delete(routes::collections::delete_document),
        )
        .route("/ws", get(websocket_handler));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ServerConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Dashboard server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Dashboard server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
