use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the Livy gateway answered a session listing.
    pub gateway_reachable: bool,
}

/// GET /health -- returns service and gateway health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let gateway_reachable = match state.runner.gateway().ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Livy gateway health check failed");
            false
        }
    };

    let status = if gateway_reachable { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        gateway_reachable,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
