/// Reserved error code meaning "internal/unexpected failure".
///
/// When present in an outcome it takes precedence over every other code: the
/// request is reported as a server-side failure, not a client mistake.
pub const UNEXPECTED_ERROR: &str = "UNEXPECTED_ERROR";

/// Result of validating a request against its rule set.
///
/// `errors` preserves the declaration order of the failing rules. An empty
/// list means the request is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    errors: Vec<String>,
}

impl ValidationOutcome {
    /// A valid outcome with no errors.
    #[must_use]
    pub fn valid() -> Self {
        Self::default()
    }

    /// An outcome carrying the given error codes, in order.
    #[must_use]
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self { errors }
    }

    /// An outcome carrying only the sentinel code.
    #[must_use]
    pub fn unexpected() -> Self {
        Self::from_errors(vec![UNEXPECTED_ERROR.to_string()])
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns `true` when the sentinel code is among the errors.
    #[must_use]
    pub fn is_unexpected(&self) -> bool {
        self.errors.iter().any(|code| code == UNEXPECTED_ERROR)
    }

    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    #[must_use]
    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}
