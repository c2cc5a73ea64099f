use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::bearer::bearer_token;
use crate::traits::TokenReader;

/// Error code returned when a protected route is called without a valid token.
pub const UNAUTHORIZED: &str = "UNAUTHORIZED";

/// Middleware rejecting requests that lack a verifiable bearer token.
///
/// Rejections are 401 with body `["UNAUTHORIZED"]` and a
/// `WWW-Authenticate: Bearer` header. Verified claims are stored as a request
/// extension for downstream handlers.
pub async fn require_bearer(
    State(reader): State<Arc<dyn TokenReader>>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = bearer_token(request.headers())
        .ok_or(super::AuthError::MissingToken)
        .and_then(|token| reader.verify(&token));

    match claims {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "rejecting unauthenticated request");
            unauthorized()
        }
    }
}

fn unauthorized() -> Response {
    let mut response = (StatusCode::UNAUTHORIZED, Json([UNAUTHORIZED])).into_response();
    response
        .headers_mut()
        .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    response
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::header::AUTHORIZATION;
    use axum::middleware::from_fn_with_state;
    use axum::routing::get;
    use axum::{Extension, Router};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::jwt::tests::{settings, sign, SECRET};
    use crate::auth::{Claims, JwtTokenReader};

    fn app() -> Router {
        let reader: Arc<dyn TokenReader> = Arc::new(JwtTokenReader::new(&settings()));
        Router::new()
            .route(
                "/secret",
                get(|Extension(claims): Extension<Claims>| async move {
                    claims["sub"].as_str().unwrap_or_default().to_string()
                }),
            )
            .layer(from_fn_with_state(reader, require_bearer))
    }

    async fn call(authorization: Option<String>) -> Response {
        let mut builder = axum::http::Request::builder().uri("/secret");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        app().oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let response = call(None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[WWW_AUTHENTICATE], "Bearer");
        assert_eq!(json_body(response).await, json!(["UNAUTHORIZED"]));
    }

    #[tokio::test]
    async fn invalid_token_is_unauthorized() {
        let token = sign("wrong-key", json!({ "sub": "ana" }));
        let response = call(Some(format!("Bearer {token}"))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_reaches_handler_with_claims() {
        let token = sign(SECRET, json!({ "sub": "ana" }));
        let response = call(Some(format!("Bearer {token}"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ana");
    }
}
