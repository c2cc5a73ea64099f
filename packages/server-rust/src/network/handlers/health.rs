//! Health, liveness, and readiness endpoint handlers.
//!
//! These handlers expose server health for orchestrators (Kubernetes, load
//! balancers) and operational monitoring. They bypass the bearer guard.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use super::AppState;

/// Body of `GET /health`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthReport {
    /// `starting`, `ready`, `draining` or `stopped`.
    #[schema(example = "ready")]
    pub state: String,
    pub in_flight: u64,
    pub uptime_secs: u64,
    pub api: String,
    #[schema(example = "1.0")]
    pub version: String,
}

/// Returns detailed health information.
///
/// Always returns 200 -- the `state` field indicates whether the server is
/// actually serving.
#[utoipa::path(
    get,
    path = "/health",
    tags = ["health"],
    security([]),
    responses((status = 200, description = "Health state, in-flight calls, uptime and API version", body = HealthReport))
)]
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport {
        state: state.shutdown.health_state().as_str().to_string(),
        in_flight: state.shutdown.in_flight_count(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        api: state.api.name.clone(),
        version: state.api.version().to_string(),
    })
}

/// Kubernetes liveness probe -- always returns 200 OK.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses((status = 200, description = "Server is alive"))
)]
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// Kubernetes readiness probe -- returns 200 when ready, 503 otherwise.
///
/// Returns 503 during startup, while draining, and after stop.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is starting or shutting down")
    )
)]
pub async fn readiness_handler(State(state): State<AppState>) -> StatusCode {
    if state.shutdown.health_state().is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
