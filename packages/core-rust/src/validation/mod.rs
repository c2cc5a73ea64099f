//! Request validation: rule sets, the per-type registry, and outcomes.

pub mod outcome;
pub mod rule_set;
pub mod validator;

pub use outcome::{ValidationOutcome, UNEXPECTED_ERROR};
pub use rule_set::RuleSet;
pub use validator::{RequestValidator, RequestValidatorBuilder};
