// Porter - login session lifecycle for Rust services
//
// This library issues unguessable session identifiers, tracks live sessions
// per principal, enforces absolute expiry and inactivity timeouts, and
// applies a configurable policy when a principal logs in more than once.

// Re-export the session engine
pub use porter_session::*;

// Re-export logging
pub use porter_log as log;

// Re-export the security façade
#[cfg(feature = "auth")]
pub use porter_auth as auth;

#[cfg(feature = "auth")]
pub use porter_auth::{
    AuthError, AuthenticationFilter, LoginFilter, LoginGrant, Permission, PermissionResolver,
    Permissions, Security, SecurityConfig, Status, SuccessLoginHandler,
};

/// Prelude for common imports
///
/// ```
/// use porter::prelude::*;
/// ```
pub mod prelude {
    pub use porter_session::prelude::*;

    #[cfg(feature = "auth")]
    pub use porter_auth::prelude::*;
}
