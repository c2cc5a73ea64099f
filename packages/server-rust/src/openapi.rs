//! OpenAPI document and Swagger UI.
//!
//! The document title and version come from [`ApiSettings`] at startup. The
//! JSON is served at the configured OpenAPI address, with the browsable UI at
//! [`SWAGGER_UI_PATH`].

use axum::Router;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::ApiSettings;

pub const SWAGGER_UI_PATH: &str = "/swagger-ui";

/// Name of the bearer security scheme in the document.
pub const BEARER_SCHEME: &str = "Bearer";

/// Adds the bearer token scheme on the `Authorization` header.
struct BearerSecurityAddon;

impl Modify for BearerSecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "JWT Authorization header using the Bearer scheme. Example: \"Bearer {token}\"",
            ))),
        );
    }
}

/// OpenAPI schema for [`keel_core::Envelope`].
#[derive(ToSchema)]
#[schema(as = keel_core::Envelope, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct EnvelopeSchema {
    /// Semantic status declared by the handler.
    #[schema(example = 200)]
    status_code: u16,
    /// Operation-specific payload.
    content: Option<serde_json::Value>,
    /// Human-readable note.
    message: Option<String>,
}

/// OpenAPI schema for [`keel_core::ErrorResult`]: a bare array of error codes
/// or messages.
#[derive(ToSchema)]
#[schema(as = keel_core::ErrorResult)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct ErrorResultSchema(Vec<String>);

#[derive(OpenApi)]
#[openapi(
    modifiers(&BearerSecurityAddon),
    info(
        description = "Versioned HTTP API. Versioned routes require a bearer token.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    security(("Bearer" = [])),
    paths(
        crate::network::handlers::ping::ping_handler,
        crate::network::handlers::health::health_handler,
        crate::network::handlers::health::liveness_handler,
        crate::network::handlers::health::readiness_handler,
    ),
    components(schemas(
        EnvelopeSchema,
        ErrorResultSchema,
        crate::network::handlers::ping::PingPayload,
        crate::network::handlers::health::HealthReport,
        crate::network::handlers::caller::CallerPayload
    )),
    tags(
        (name = "ping", description = "Connectivity check"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

/// Operations mounted under the version prefix.
#[derive(OpenApi)]
#[openapi(
    paths(crate::network::handlers::caller::caller_handler),
    tags((name = "caller", description = "Authenticated caller details"))
)]
pub struct VersionedApiDoc;

/// Builds the document, titled and versioned from `settings`, with the
/// versioned operations nested under the version prefix.
#[must_use]
pub fn build_document(settings: &ApiSettings) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi().nest(settings.version().path_prefix(), VersionedApiDoc::openapi());
    doc.info.title.clone_from(&settings.name);
    doc.info.version = settings.version().to_string();
    doc
}

/// Routes serving the OpenAPI JSON and Swagger UI.
pub fn swagger_router<S>(settings: &ApiSettings) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new(SWAGGER_UI_PATH)
        .url(settings.openapi_path(), build_document(settings))
        .into()
}
