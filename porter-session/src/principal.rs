//! The capability set a session owner must expose.

/// An authenticated identity that can own sessions.
///
/// The pool never constructs principals; it receives them from the
/// caller (usually a login filter) and keeps a shared reference for the
/// lifetime of each session.
pub trait Principal: Send + Sync {
    /// Unique identifier. Sessions are grouped by this value.
    fn id(&self) -> String;

    /// Whether a session may be created for this principal at all.
    fn can_login(&self) -> bool;

    /// Whether this principal may hold several sessions at once.
    ///
    /// Consulted by the `AllowNew` and `AllowNewFromSameAddress` policies.
    fn allow_multi_login(&self) -> bool;

    /// Whether this principal opts out of the inactivity timeout.
    ///
    /// Only affects the timeout; the absolute expiration always applies.
    /// Overridden by the pool's force-expire flag. Read once, when a
    /// session starts.
    fn save_session(&self) -> bool;
}
