//! HTTP middleware stack applied to every route.
//!
//! Middleware ordering follows the outer-to-inner convention: the first
//! layer listed is the outermost (processes the request first on the way
//! in, and the response last on the way out).

use axum::body::Body;
use axum::http::header::HeaderName;
use axum::http::Response;
use axum::http::{HeaderValue, Method, StatusCode};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::config::NetworkConfig;
use crate::versioning::{ApiVersion, SUPPORTED_VERSIONS_HEADER};

/// The composed Tower layer type produced by [`build_http_layers`].
///
/// Each layer wraps the next in a `Stack`, from outermost (first applied)
/// to innermost (last applied).
type HttpLayers = tower::layer::util::Stack<
    PropagateRequestIdLayer,
    tower::layer::util::Stack<
        SetResponseHeaderLayer<HeaderValue>,
        tower::layer::util::Stack<
            RequestBodyLimitLayer,
            tower::layer::util::Stack<
                tower::util::MapResponseLayer<LimitedResponseToBody>,
                tower::layer::util::Stack<
                    TimeoutLayer,
                    tower::layer::util::Stack<
                        CorsLayer,
                        tower::layer::util::Stack<
                            CompressionLayer,
                            tower::layer::util::Stack<
                                TraceLayer<
                                    tower_http::classify::SharedClassifier<
                                        tower_http::classify::ServerErrorsAsFailures,
                                    >,
                                >,
                                tower::layer::util::Stack<
                                    SetRequestIdLayer<MakeRequestUuid>,
                                    tower::layer::util::Identity,
                                >,
                            >,
                        >,
                    >,
                >,
            >,
        >,
    >,
>;

/// Converts the body-limit response body into [`Body`] so the outer
/// `Timeout` layer, which needs a `Default` body, can wrap it.
type LimitedResponseToBody = fn(Response<tower_http::limit::ResponseBody<Body>>) -> Response<Body>;

fn limited_response_to_body(
    response: Response<tower_http::limit::ResponseBody<Body>>,
) -> Response<Body> {
    response.map(Body::new)
}

/// Builds the HTTP-level Tower middleware stack.
///
/// **Middleware ordering (outermost to innermost):**
/// 1. `SetRequestId` -- assigns a UUID v4 `X-Request-Id` to every incoming request
/// 2. `Tracing` -- logs request/response with structured trace spans
/// 3. `Compression` -- gzip response compression
/// 4. `CORS` -- Cross-Origin Resource Sharing based on configured origins
/// 5. `Timeout` -- 408 once the configured request timeout elapses
/// 6. `RequestBodyLimit` -- 413 for bodies over the configured limit
/// 7. `SetResponseHeader` -- `api-supported-versions` on every response
/// 8. `PropagateRequestId` -- copies `X-Request-Id` from the request to the response
///
/// Authentication and version negotiation are applied per route group by
/// the network module, not here.
#[must_use]
pub fn build_http_layers(config: &NetworkConfig, supported: ApiVersion) -> HttpLayers {
    let x_request_id = HeaderName::from_static("x-request-id");

    let cors = build_cors_layer(config);

    ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            x_request_id.clone(),
            MakeRequestUuid,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .map_response(limited_response_to_body as LimitedResponseToBody)
        .layer(RequestBodyLimitLayer::new(config.body_limit))
        .layer(SetResponseHeaderLayer::overriding(
            SUPPORTED_VERSIONS_HEADER.clone(),
            supported.header_value(),
        ))
        .layer(PropagateRequestIdLayer::new(x_request_id))
        .into_inner()
}

/// Builds the CORS layer from the configured origins.
///
/// Unparseable origins are skipped with a warning.
fn build_cors_layer(config: &NetworkConfig) -> CorsLayer {
    let allow_origin = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(%origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any)
        .expose_headers([SUPPORTED_VERSIONS_HEADER.clone()])
}
