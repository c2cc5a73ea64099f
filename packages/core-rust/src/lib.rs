//! Keel Core: response envelopes, request validation, and error results.
//!
//! Transport-agnostic building blocks shared by the HTTP layer in
//! `keel-server`.

pub mod context;
pub mod envelope;
pub mod error_result;
pub mod request;
pub mod validation;

pub use context::CallerContext;
pub use envelope::Envelope;
pub use error_result::ErrorResult;
pub use request::Request;
pub use validation::{RequestValidator, RuleSet, ValidationOutcome, UNEXPECTED_ERROR};
