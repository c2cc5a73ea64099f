use std::fmt;

use super::outcome::{ValidationOutcome, UNEXPECTED_ERROR};

type Check<R> = Box<dyn Fn(&R) -> anyhow::Result<bool> + Send + Sync>;

/// A single named check. The check returns `Ok(true)` when the request passes.
struct Rule<R> {
    code: String,
    check: Check<R>,
}

/// Ordered collection of validation rules for one request type.
///
/// Evaluation runs every rule, never stopping at the first failure, and
/// collects the code of each failing rule in declaration order. A fallible
/// rule that errors contributes [`UNEXPECTED_ERROR`] and evaluation carries on.
pub struct RuleSet<R> {
    rules: Vec<Rule<R>>,
}

impl<R> RuleSet<R> {
    /// Creates an empty rule set. An empty set accepts every request.
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Appends an infallible rule. `check` returns `true` when the request is
    /// acceptable; otherwise `code` is reported.
    #[must_use]
    pub fn rule<F>(self, code: impl Into<String>, check: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.try_rule(code, move |request| Ok(check(request)))
    }

    /// Appends a rule whose evaluation may fail (e.g. a parse step).
    ///
    /// `Ok(false)` reports `code`. `Err(_)` reports [`UNEXPECTED_ERROR`].
    #[must_use]
    pub fn try_rule<F>(mut self, code: impl Into<String>, check: F) -> Self
    where
        F: Fn(&R) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        self.rules.push(Rule {
            code: code.into(),
            check: Box::new(check),
        });
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs every rule against `request`.
    pub fn evaluate(&self, request: &R) -> ValidationOutcome {
        let mut errors = Vec::new();
        for rule in &self.rules {
            match (rule.check)(request) {
                Ok(true) => {}
                Ok(false) => errors.push(rule.code.clone()),
                Err(err) => {
                    tracing::warn!(code = %rule.code, error = %err, "validation rule failed to evaluate");
                    errors.push(UNEXPECTED_ERROR.to_string());
                }
            }
        }
        ValidationOutcome::from_errors(errors)
    }
}

impl<R> Default for RuleSet<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for RuleSet<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("codes", &self.rules.iter().map(|r| r.code.as_str()).collect::<Vec<_>>())
            .finish()
    }
}
