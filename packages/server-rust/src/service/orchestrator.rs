//! Response orchestration: validate, invoke, classify, render.
//!
//! A single algorithm shared by three packaging variants:
//!
//! 1. **Validate** the request against its registered rule set.
//! 2. **Reject** invalid requests: 500 when the sentinel code is present,
//!    400 otherwise. The handler is never invoked.
//! 3. **Invoke** the handler once. Errors and panics are caught, logged once
//!    through the [`FailureLogger`], and converted to a 500. Panics raised by
//!    a rule or while rendering the response are handled the same way.
//! 4. **Classify** the envelope status with [`StatusClass`] and render the
//!    matching [`ApiResponse`].

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use futures_util::FutureExt;
use keel_core::{Envelope, Request, RequestValidator};
use serde::Serialize;
use tracing::{info_span, Instrument};

use super::classify::StatusClass;
use super::operation::{ExecuteOptions, Outcome, Packaging};
use super::response::ApiResponse;
use crate::traits::{FailureLogger, TracingFailureLogger};

/// Prefix of the single error entry returned for uncaught failures.
pub const FAULT_PREFIX: &str = "Unexpected error! - Message: ";

/// Wraps domain handlers so that every call ends in a well-formed response.
///
/// Holds no per-call state; share one instance behind an `Arc` across
/// concurrent requests.
#[derive(Clone)]
pub struct ResponseOrchestrator {
    validator: Arc<RequestValidator>,
    logger: Arc<dyn FailureLogger>,
}

impl ResponseOrchestrator {
    /// Creates an orchestrator that logs failures through `tracing`.
    #[must_use]
    pub fn new(validator: Arc<RequestValidator>) -> Self {
        Self {
            validator,
            logger: Arc::new(TracingFailureLogger),
        }
    }

    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn FailureLogger>) -> Self {
        self.logger = logger;
        self
    }

    #[must_use]
    pub fn validator(&self) -> &RequestValidator {
        &self.validator
    }

    /// Full-envelope variant: a success body is the whole envelope.
    pub async fn execute<R, T, H, Fut>(
        &self,
        handler: H,
        request: R,
        options: ExecuteOptions,
    ) -> ApiResponse
    where
        R: Request,
        T: Serialize + Send,
        H: FnOnce(R) -> Fut + Send,
        Fut: Future<Output = anyhow::Result<Envelope<T>>> + Send,
    {
        self.orchestrate(handler, request, Packaging::Envelope, options, |envelope, status| {
            Ok(ApiResponse::json(status, serde_json::to_value(&envelope)?))
        })
        .await
    }

    /// Content-only variant: a success body is `envelope.content` alone,
    /// `null` when absent.
    pub async fn execute_content<R, T, H, Fut>(
        &self,
        handler: H,
        request: R,
        options: ExecuteOptions,
    ) -> ApiResponse
    where
        R: Request,
        T: Serialize + Send,
        H: FnOnce(R) -> Fut + Send,
        Fut: Future<Output = anyhow::Result<Envelope<T>>> + Send,
    {
        self.orchestrate(handler, request, Packaging::Content, options, |envelope, status| {
            Ok(ApiResponse::json(status, serde_json::to_value(&envelope.content)?))
        })
        .await
    }

    /// File variant: a success body is the raw content bytes, sent with
    /// `content_type`. Absent content yields an empty body.
    pub async fn execute_file<R, H, Fut>(
        &self,
        handler: H,
        request: R,
        content_type: impl Into<String> + Send,
        options: ExecuteOptions,
    ) -> ApiResponse
    where
        R: Request,
        H: FnOnce(R) -> Fut + Send,
        Fut: Future<Output = anyhow::Result<Envelope<Vec<u8>>>> + Send,
    {
        let content_type = content_type.into();
        self.orchestrate(handler, request, Packaging::File, options, move |envelope, status| {
            Ok(ApiResponse::file(
                status,
                content_type,
                envelope.content.unwrap_or_default(),
            ))
        })
        .await
    }

    /// Runs one call inside an `orchestrate` span and records its outcome.
    async fn orchestrate<R, T, H, Fut, P>(
        &self,
        handler: H,
        request: R,
        packaging: Packaging,
        options: ExecuteOptions,
        package: P,
    ) -> ApiResponse
    where
        R: Request,
        T: Serialize + Send,
        H: FnOnce(R) -> Fut + Send,
        Fut: Future<Output = anyhow::Result<Envelope<T>>> + Send,
        P: FnOnce(Envelope<T>, StatusCode) -> Result<ApiResponse, serde_json::Error> + Send,
    {
        let span = info_span!(
            "orchestrate",
            operation = R::OPERATION,
            variant = packaging.as_str(),
            status = tracing::field::Empty,
            outcome = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        );

        async move {
            let start = Instant::now();
            let (response, outcome) = self.run(handler, request, options, package).await;
            let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            let status = response.status().as_u16();

            let span = tracing::Span::current();
            span.record("status", status);
            span.record("outcome", outcome.as_str());
            span.record("duration_ms", duration_ms);

            tracing::info!(
                operation = R::OPERATION,
                status = status,
                outcome = outcome.as_str(),
                duration_ms = duration_ms,
                "operation complete"
            );
            metrics::counter!(
                "keel_responses_total",
                "operation" => R::OPERATION,
                "outcome" => outcome.as_str(),
                "status" => status.to_string(),
            )
            .increment(1);

            response
        }
        .instrument(span)
        .await
    }

    async fn run<R, T, H, Fut, P>(
        &self,
        handler: H,
        request: R,
        options: ExecuteOptions,
        package: P,
    ) -> (ApiResponse, Outcome)
    where
        R: Request,
        T: Serialize + Send,
        H: FnOnce(R) -> Fut + Send,
        Fut: Future<Output = anyhow::Result<Envelope<T>>> + Send,
        P: FnOnce(Envelope<T>, StatusCode) -> Result<ApiResponse, serde_json::Error> + Send,
    {
        let validation = match std::panic::catch_unwind(AssertUnwindSafe(|| {
            self.validator.validate(&request, options.ignore_validation)
        })) {
            Ok(validation) => validation,
            Err(panic) => return self.panicked("validation", panic.as_ref()),
        };
        if !validation.is_valid() {
            let response = if validation.is_unexpected() {
                ApiResponse::internal_error(validation.into_errors())
            } else {
                ApiResponse::bad_request(validation.into_errors())
            };
            return (response, Outcome::Rejected);
        }

        // The handler is called inside the future so a panic raised before its
        // first await is caught too.
        let invocation = AssertUnwindSafe(async move { handler(request).await }).catch_unwind();

        let result = match options.cancellation {
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => {
                        tracing::warn!(operation = R::OPERATION, "operation cancelled before completion");
                        return (ApiResponse::cancelled(), Outcome::Cancelled);
                    }
                    result = invocation => result,
                }
            }
            None => invocation.await,
        };

        match result {
            Ok(Ok(envelope)) => std::panic::catch_unwind(AssertUnwindSafe(|| {
                self.dispatch(envelope, options.success_status, package)
            }))
            .unwrap_or_else(|panic| self.panicked("response rendering", panic.as_ref())),
            Ok(Err(e)) => self.fault(&e.to_string(), &format!("{e:?}")),
            Err(panic) => self.panicked("handler", panic.as_ref()),
        }
    }

    /// Converts a caught panic from `stage` into a fault.
    fn panicked(&self, stage: &str, payload: &(dyn Any + Send)) -> (ApiResponse, Outcome) {
        let description = panic_description(payload);
        self.fault(&description, &format!("{stage} panicked: {description}"))
    }

    fn dispatch<T, P>(
        &self,
        envelope: Envelope<T>,
        success_status: StatusCode,
        package: P,
    ) -> (ApiResponse, Outcome)
    where
        T: Serialize,
        P: FnOnce(Envelope<T>, StatusCode) -> Result<ApiResponse, serde_json::Error>,
    {
        let class = StatusClass::of(envelope.status_code);
        let rendered = match class {
            StatusClass::Success => {
                package(envelope, success_status).map(|response| (response, Outcome::Succeeded))
            }
            StatusClass::NoContent => Ok((ApiResponse::no_content(), Outcome::Succeeded)),
            StatusClass::Other => {
                let message = envelope.message.unwrap_or_default();
                Ok((ApiResponse::bad_request(vec![message]), Outcome::Failed))
            }
            StatusClass::BadRequest
            | StatusClass::Unauthorized
            | StatusClass::Forbidden
            | StatusClass::NotFound
            | StatusClass::InternalServerError => serde_json::to_value(&envelope)
                .map(|body| (ApiResponse::json(class.http_status(), body), Outcome::Failed)),
        };

        rendered.unwrap_or_else(|e| self.fault(&e.to_string(), &format!("failed to serialize response: {e:?}")))
    }

    /// Converts an uncaught failure into a 500, logging it once.
    fn fault(&self, description: &str, detail: &str) -> (ApiResponse, Outcome) {
        let message = format!("{FAULT_PREFIX}{description}");
        self.logger.log_failure(&message, detail);
        (ApiResponse::internal_error(vec![message]), Outcome::Faulted)
    }
}

impl std::fmt::Debug for ResponseOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseOrchestrator")
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

fn panic_description(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
