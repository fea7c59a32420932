//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (auth provider is ready)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Kubernetes liveness probe.
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Returns 200 once the auth provider can serve page sessions.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.auth.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
///
/// Full health status with component details. Pages still load without auth,
/// so a missing provider only degrades.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let auth_ok = state.auth.is_ready();

    Json(HealthResponse {
        status: if auth_ok { "healthy" } else { "degraded" }.to_string(),
        auth: if auth_ok { "ok" } else { "unavailable" }.to_string(),
        collections: state.store.collection_names().await.len(),
        sessions: state.hub.stats().await,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
