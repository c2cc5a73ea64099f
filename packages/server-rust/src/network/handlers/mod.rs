//! HTTP handlers and the shared state they extract.

pub mod caller;
pub mod health;
pub mod ping;

pub use caller::{caller_handler, CallerPayload, CallerRequest};
pub use health::{health_handler, liveness_handler, readiness_handler, HealthReport};
pub use ping::{ping_handler, PingPayload, PingRequest};

use std::sync::Arc;
use std::time::Instant;

use axum::extract::FromRef;
use keel_core::validation::RequestValidatorBuilder;
use keel_core::RuleSet;

use super::ShutdownController;
use crate::config::ApiSettings;
use crate::service::{ExecuteOptions, ResponseOrchestrator};
use crate::traits::TokenReader;

/// Shared application state passed to all axum handlers via `State` extraction.
///
/// Holds `Arc` references to shared resources so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Validates, invokes and renders every domain call.
    pub orchestrator: Arc<ResponseOrchestrator>,
    /// Verifies bearer tokens for the guard and the caller extractor.
    pub token_reader: Arc<dyn TokenReader>,
    /// Graceful shutdown controller with health state and in-flight tracking.
    pub shutdown: Arc<ShutdownController>,
    /// API name and version.
    pub api: Arc<ApiSettings>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Options for an orchestrated call: defaults plus the shutdown token.
    #[must_use]
    pub fn execute_options(&self) -> ExecuteOptions {
        ExecuteOptions::default().cancellation(self.shutdown.cancellation_token())
    }
}

impl FromRef<AppState> for Arc<dyn TokenReader> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.token_reader)
    }
}

/// Registers the rule sets of the built-in operations.
#[must_use]
pub fn register_rule_sets(builder: RequestValidatorBuilder) -> RequestValidatorBuilder {
    builder
        .register(RuleSet::<PingRequest>::new())
        .register(RuleSet::<CallerRequest>::new())
}
