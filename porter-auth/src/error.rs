// Error types for authentication

use porter_session::SessionError;
use thiserror::Error;

/// Error type returned by application delegates.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Cannot login principal")]
    CannotLoginPrincipal,

    #[error("Login filter not implemented")]
    LoginFilterNotImplemented,

    #[error("Authentication filter not implemented")]
    AuthenticationFilterNotImplemented,

    #[error(transparent)]
    Session(#[from] SessionError),

    /// Raised by a login filter, e.g. bad credentials. Passed through as is.
    #[error(transparent)]
    Delegate(BoxError),
}

impl AuthError {
    /// Stable code for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::CannotLoginPrincipal => "CannotLoginPrincipal",
            AuthError::LoginFilterNotImplemented => "LoginFilterNotImplemented",
            AuthError::AuthenticationFilterNotImplemented => "AuthenticationFilterNotImplemented",
            AuthError::Session(err) => err.kind(),
            AuthError::Delegate(_) => "Delegate",
        }
    }

    /// The pool error behind this one, if any.
    pub fn session_error(&self) -> Option<&SessionError> {
        match self {
            AuthError::Session(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
