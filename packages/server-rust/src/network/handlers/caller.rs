//! Echoes the caller context resolved from the bearer token.

use axum::extract::State;
use keel_core::{CallerContext, Envelope, Request};
use serde::Serialize;
use utoipa::ToSchema;

use super::AppState;
use crate::auth::Caller;
use crate::service::ApiResponse;

#[derive(Debug, Clone)]
pub struct CallerRequest {
    pub context: CallerContext,
}

impl Request for CallerRequest {
    const OPERATION: &'static str = "caller.describe";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CallerPayload {
    #[schema(example = "pt-BR")]
    pub locale: String,
    pub workflow_id: String,
}

impl From<CallerContext> for CallerPayload {
    fn from(context: CallerContext) -> Self {
        Self {
            locale: context.locale,
            workflow_id: context.workflow_id,
        }
    }
}

/// `GET /v{major}/caller`: returns the caller's locale and workflow id.
#[utoipa::path(
    get,
    path = "/caller",
    tags = ["caller"],
    responses(
        (status = 200, description = "Caller context", body = CallerPayload),
        (status = 401, description = "Missing or invalid bearer token", body = crate::openapi::ErrorResultSchema)
    )
)]
pub async fn caller_handler(State(state): State<AppState>, Caller(context): Caller) -> ApiResponse {
    let _guard = state.shutdown.in_flight_guard();

    state
        .orchestrator
        .execute_content(
            |request: CallerRequest| async move {
                Ok::<_, anyhow::Error>(Envelope::ok(CallerPayload::from(request.context)))
            },
            CallerRequest { context },
            state.execute_options(),
        )
        .await
}
