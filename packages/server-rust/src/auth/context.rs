//! Resolves [`CallerContext`] from the bearer token of a request.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use keel_core::CallerContext;

use super::bearer::bearer_token;
use super::{claim_string, Claims};
use crate::traits::TokenReader;

pub const LOCALE_CLAIM: &str = "locale";
pub const WORKFLOW_ID_CLAIM: &str = "workflow_id";

/// Builds the caller context from already verified claims. Missing claims
/// are empty.
#[must_use]
pub fn caller_from_claims(claims: &Claims) -> CallerContext {
    CallerContext {
        locale: claim_string(claims, LOCALE_CLAIM).unwrap_or_default(),
        workflow_id: claim_string(claims, WORKFLOW_ID_CLAIM).unwrap_or_default(),
    }
}

/// Verifies the request's bearer token once and reads its locale and
/// workflow id claims.
///
/// Each field is empty when there is no token, the token does not verify,
/// or the claim is missing.
#[must_use]
pub fn resolve_caller(headers: &HeaderMap, reader: &dyn TokenReader) -> CallerContext {
    bearer_token(headers)
        .and_then(|token| reader.verify(&token).ok())
        .map(|claims| caller_from_claims(&claims))
        .unwrap_or_default()
}

/// Extractor yielding the [`CallerContext`] of the current request.
///
/// Reuses the claims stored by the bearer guard when present; otherwise the
/// token is verified here. Never rejects: anonymous requests get an empty
/// context.
#[derive(Debug, Clone)]
pub struct Caller(pub CallerContext);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
    Arc<dyn TokenReader>: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>() {
            return Ok(Self(caller_from_claims(claims)));
        }
        let reader = <Arc<dyn TokenReader> as FromRef<S>>::from_ref(state);
        Ok(Self(resolve_caller(&parts.headers, reader.as_ref())))
    }
}
