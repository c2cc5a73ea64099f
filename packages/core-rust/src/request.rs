/// An inbound request value handed to a domain handler.
///
/// Every request type names the operation it belongs to. The name is used for
/// tracing spans and metrics labels; validation rules are looked up by the
/// concrete type, not by this name.
pub trait Request: Send + Sync + 'static {
    /// Stable operation name, e.g. `"ping"` or `"users.create"`.
    const OPERATION: &'static str;
}
