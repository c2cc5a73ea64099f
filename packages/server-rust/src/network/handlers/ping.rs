//! Anonymous connectivity check, executed through the orchestrator.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::State;
use keel_core::{Envelope, Request};
use serde::Serialize;
use utoipa::ToSchema;

use super::AppState;
use crate::service::ApiResponse;

/// Ping takes no input; its rule set is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct PingRequest;

impl Request for PingRequest {
    const OPERATION: &'static str = "ping";
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PingPayload {
    /// Configured API name.
    #[schema(example = "keel")]
    pub service: String,
    /// Current UTC time in milliseconds since the Unix epoch.
    pub timestamp_millis: u64,
}

#[utoipa::path(
    get,
    path = "/ping",
    tags = ["ping"],
    security([]),
    responses(
        (status = 200, description = "Service is reachable", body = crate::openapi::EnvelopeSchema),
        (status = 503, description = "Server is shutting down")
    )
)]
pub async fn ping_handler(State(state): State<AppState>) -> ApiResponse {
    let _guard = state.shutdown.in_flight_guard();
    let service = state.api.name.clone();

    state
        .orchestrator
        .execute(
            move |_: PingRequest| async move {
                let elapsed = SystemTime::now().duration_since(UNIX_EPOCH)?;
                let timestamp_millis = u64::try_from(elapsed.as_millis())?;
                Ok::<_, anyhow::Error>(Envelope::ok(PingPayload {
                    service,
                    timestamp_millis,
                }))
            },
            PingRequest,
            state.execute_options(),
        )
        .await
}
