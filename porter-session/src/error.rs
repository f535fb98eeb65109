//! Error types for session operations.

use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session-specific errors.
///
/// Every variant is a terminal outcome for the call that produced it;
/// none of them is worth retrying automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Lookup or removal target is not in the pool
    #[error("Session not found")]
    NotFound,

    /// Lookup target failed its liveness check and has been removed
    #[error("Session expired")]
    Expired,

    /// The multi-login policy rejected a new session
    #[error("Session already started")]
    AlreadyStarted,

    /// Invalid session configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SessionError {
    /// Stable code for the error kind, suitable for logs and API payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::NotFound => "SessionNotFound",
            SessionError::Expired => "SessionExpired",
            SessionError::AlreadyStarted => "SessionAlreadyStarted",
            SessionError::Config(_) => "InvalidConfiguration",
        }
    }
}
