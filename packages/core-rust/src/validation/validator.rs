use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use super::outcome::ValidationOutcome;
use super::rule_set::RuleSet;
use crate::request::Request;

/// Type-erased view of a `RuleSet<R>` so sets for different request types can
/// live in one map.
trait ErasedRuleSet: Send + Sync {
    /// Evaluates the set against `request`, or returns `None` when `request`
    /// is not of the set's type.
    fn evaluate_any(&self, request: &dyn Any) -> Option<ValidationOutcome>;

    fn operation(&self) -> &'static str;
}

impl<R: Request> ErasedRuleSet for RuleSet<R> {
    fn evaluate_any(&self, request: &dyn Any) -> Option<ValidationOutcome> {
        request.downcast_ref::<R>().map(|request| self.evaluate(request))
    }

    fn operation(&self) -> &'static str {
        R::OPERATION
    }
}

// ---------------------------------------------------------------------------
// RequestValidator
// ---------------------------------------------------------------------------

/// Registry of rule sets keyed by request type.
///
/// Built once at startup through [`RequestValidatorBuilder`] and read-only
/// afterwards, so a single instance can be shared across concurrent calls.
///
/// Lookup rules:
/// - `ignore_validation = true` skips lookup; the request is valid.
/// - No rule set registered for the type: valid, unless the validator is
///   strict, in which case the outcome carries the sentinel code.
/// - Otherwise every rule runs and failing codes are collected in order.
pub struct RequestValidator {
    rule_sets: HashMap<TypeId, Box<dyn ErasedRuleSet>>,
    strict: bool,
}

impl RequestValidator {
    #[must_use]
    pub fn builder() -> RequestValidatorBuilder {
        RequestValidatorBuilder::default()
    }

    /// A lenient validator with no registered rule sets: accepts everything.
    #[must_use]
    pub fn empty() -> Self {
        Self::builder().build()
    }

    /// Validates `request` against the rule set registered for its type.
    pub fn validate<R: Request>(&self, request: &R, ignore_validation: bool) -> ValidationOutcome {
        if ignore_validation {
            return ValidationOutcome::valid();
        }

        let Some(rule_set) = self.rule_sets.get(&TypeId::of::<R>()) else {
            if self.strict {
                tracing::error!(operation = R::OPERATION, "no rule set registered for request type");
                return ValidationOutcome::unexpected();
            }
            return ValidationOutcome::valid();
        };

        // The map is keyed by `TypeId::of::<R>()`, so the downcast only fails if
        // the registry itself is corrupt.
        rule_set
            .evaluate_any(request)
            .unwrap_or_else(ValidationOutcome::unexpected)
    }

    /// Returns `true` when a rule set is registered for `R`.
    #[must_use]
    pub fn has_rule_set<R: Request>(&self) -> bool {
        self.rule_sets.contains_key(&TypeId::of::<R>())
    }

    /// Returns `true` when a missing rule set is reported as an internal failure.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

impl Default for RequestValidator {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for RequestValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut operations: Vec<_> = self.rule_sets.values().map(|set| set.operation()).collect();
        operations.sort_unstable();
        f.debug_struct("RequestValidator")
            .field("operations", &operations)
            .field("strict", &self.strict)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// RequestValidatorBuilder
// ---------------------------------------------------------------------------

/// Collects rule sets before freezing them into a [`RequestValidator`].
#[derive(Default)]
pub struct RequestValidatorBuilder {
    rule_sets: HashMap<TypeId, Box<dyn ErasedRuleSet>>,
    strict: bool,
}

impl RequestValidatorBuilder {
    /// Registers the rule set for request type `R`, replacing any earlier one.
    #[must_use]
    pub fn register<R: Request>(mut self, rule_set: RuleSet<R>) -> Self {
        if self
            .rule_sets
            .insert(TypeId::of::<R>(), Box::new(rule_set))
            .is_some()
        {
            tracing::warn!(operation = R::OPERATION, "replacing previously registered rule set");
        }
        self
    }

    /// When `true`, requests without a registered rule set are rejected with
    /// the sentinel code instead of passing.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub fn build(self) -> RequestValidator {
        RequestValidator {
            rule_sets: self.rule_sets,
            strict: self.strict,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::UNEXPECTED_ERROR;

    struct CreateUser {
        name: String,
        email: String,
    }

    impl Request for CreateUser {
        const OPERATION: &'static str = "users.create";
    }

    struct Unregistered;

    impl Request for Unregistered {
        const OPERATION: &'static str = "unregistered";
    }

    fn user_rules() -> RuleSet<CreateUser> {
        RuleSet::new()
            .rule("NAME_REQUIRED", |r: &CreateUser| !r.name.is_empty())
            .rule("EMAIL_INVALID", |r: &CreateUser| r.email.contains('@'))
    }

    fn validator() -> RequestValidator {
        RequestValidator::builder().register(user_rules()).build()
    }

    #[test]
    fn valid_request_has_no_errors() {
        let request = CreateUser {
            name: "ana".into(),
            email: "ana@example.com".into(),
        };
        assert!(validator().validate(&request, false).is_valid());
    }

    #[test]
    fn invalid_request_reports_codes_in_rule_order() {
        let request = CreateUser {
            name: String::new(),
            email: "nope".into(),
        };
        let outcome = validator().validate(&request, false);
        assert_eq!(outcome.errors(), ["NAME_REQUIRED", "EMAIL_INVALID"]);
    }

    #[test]
    fn ignore_flag_skips_rules() {
        let request = CreateUser {
            name: String::new(),
            email: String::new(),
        };
        assert!(validator().validate(&request, true).is_valid());
    }

    #[test]
    fn missing_rule_set_is_valid_when_lenient() {
        assert!(validator().validate(&Unregistered, false).is_valid());
    }

    #[test]
    fn missing_rule_set_is_unexpected_when_strict() {
        let validator = RequestValidator::builder()
            .register(user_rules())
            .strict(true)
            .build();
        let outcome = validator.validate(&Unregistered, false);
        assert_eq!(outcome.errors(), [UNEXPECTED_ERROR]);
    }

    #[test]
    fn strict_validator_still_honours_ignore_flag() {
        let validator = RequestValidator::builder().strict(true).build();
        assert!(validator.validate(&Unregistered, true).is_valid());
    }

    #[test]
    fn registering_twice_keeps_last_rule_set() {
        let validator = RequestValidator::builder()
            .register(user_rules())
            .register(RuleSet::<CreateUser>::new().rule("ALWAYS", |_: &CreateUser| false))
            .build();
        let request = CreateUser {
            name: String::new(),
            email: String::new(),
        };
        assert_eq!(validator.validate(&request, false).errors(), ["ALWAYS"]);
    }

    #[test]
    fn has_rule_set_reflects_registration() {
        let validator = validator();
        assert!(validator.has_rule_set::<CreateUser>());
        assert!(!validator.has_rule_set::<Unregistered>());
        assert!(!validator.is_strict());
    }

    #[test]
    fn debug_lists_registered_operations() {
        let rendered = format!("{:?}", validator());
        assert!(rendered.contains("users.create"));
    }
}
