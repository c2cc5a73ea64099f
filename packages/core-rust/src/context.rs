/// Caller attributes derived from the bearer token of a request.
///
/// Both fields default to the empty string when the request carries no token
/// or the token lacks the corresponding claim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerContext {
    /// Locale claim of the caller, e.g. `"pt-BR"`.
    pub locale: String,
    /// Workflow/session identifier claim of the caller.
    pub workflow_id: String,
}

impl CallerContext {
    #[must_use]
    pub fn new(locale: impl Into<String>, workflow_id: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            workflow_id: workflow_id.into(),
        }
    }

    /// Returns `true` when neither attribute could be resolved.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.locale.is_empty() && self.workflow_id.is_empty()
    }
}
