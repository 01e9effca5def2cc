//! System endpoints: health check.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::engine::EngineState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy` while running, `starting` or `stopping` otherwise.
    pub status: String,
    /// Engine lifecycle state.
    pub state: EngineState,
    /// Registered events.
    pub events: usize,
    /// Registered clients.
    pub clients: usize,
    /// Server time (RFC 3339).
    pub timestamp: String,
    /// Crate version.
    pub version: String,
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health, engine state, version, and current timestamp.",
    responses(
        (status = 200, description = "Engine is running", body = HealthResponse),
        (status = 503, description = "Engine is not running", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let engine_state = state.engine.state();
    let (status, label) = match engine_state {
        EngineState::Running => (StatusCode::OK, "healthy"),
        EngineState::Constructed => (StatusCode::SERVICE_UNAVAILABLE, "starting"),
        EngineState::ShuttingDown => (StatusCode::SERVICE_UNAVAILABLE, "stopping"),
    };
    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            state: engine_state,
            events: state.engine.event_names().len(),
            clients: state.engine.client_count(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
