// Login, authentication and logout for Porter
//
// The façade turns framework-specific request contexts into session pool
// calls through three application delegates: a login filter that checks
// credentials, an authentication filter that recovers a stored session
// identifier, and a success handler that stores a new one.

pub mod error;
pub mod filter;
pub mod permissions;
pub mod security;

pub use error::{AuthError, BoxError, Result};
pub use filter::{
    AuthenticationFilter, LoginFilter, LoginGrant, PermissionResolver, SuccessLoginHandler,
};
pub use permissions::{ALL_PERMISSIONS, ALL_STATUSES, Permission, Permissions, Status};
pub use security::{Security, SecurityConfig};

pub use porter_session::{
    MultiLogin, Principal, Session, SessionConfig, SessionError, SessionIdentifier, SessionPool,
};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{AuthError, BoxError};
    pub use crate::filter::{AuthenticationFilter, LoginFilter, LoginGrant, SuccessLoginHandler};
    pub use crate::permissions::{Permission, Permissions, Status};
    pub use crate::security::{Security, SecurityConfig};
    pub use porter_session::prelude::*;
}
