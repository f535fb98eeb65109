// Application delegates

use crate::error::BoxError;
use crate::permissions::Permissions;
use porter_session::{Principal, Session, SessionIdentifier};
use std::sync::Arc;

/// Outcome of a successful credential check.
#[derive(Clone)]
pub struct LoginGrant {
    /// The authenticated principal
    pub principal: Arc<dyn Principal>,
    /// Address to associate with the new session; may be empty
    pub remote_address: String,
}

impl LoginGrant {
    pub fn new(principal: Arc<dyn Principal>, remote_address: impl Into<String>) -> Self {
        Self {
            principal,
            remote_address: remote_address.into(),
        }
    }
}

impl std::fmt::Debug for LoginGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginGrant")
            .field("principal", &self.principal.id())
            .field("remote_address", &self.remote_address)
            .finish()
    }
}

/// Verifies credentials found in a request context.
///
/// Implemented for any `Fn(&C) -> Result<LoginGrant, BoxError>`.
pub trait LoginFilter<C>: Send + Sync {
    fn login(&self, context: &C) -> Result<LoginGrant, BoxError>;
}

impl<C, F> LoginFilter<C> for F
where
    F: Fn(&C) -> Result<LoginGrant, BoxError> + Send + Sync,
{
    fn login(&self, context: &C) -> Result<LoginGrant, BoxError> {
        self(context)
    }
}

/// Recovers a previously issued session identifier from a request context,
/// e.g. from a cookie. `None` when the context carries no identifier.
pub trait AuthenticationFilter<C>: Send + Sync {
    fn identify(&self, context: &C) -> Option<SessionIdentifier>;
}

impl<C, F> AuthenticationFilter<C> for F
where
    F: Fn(&C) -> Option<SessionIdentifier> + Send + Sync,
{
    fn identify(&self, context: &C) -> Option<SessionIdentifier> {
        self(context)
    }
}

/// Called after a session has been started. Stores the identifier wherever
/// the [`AuthenticationFilter`] will look for it later.
pub trait SuccessLoginHandler<C>: Send + Sync {
    fn on_login(&self, context: &mut C, session: &Session);
}

impl<C, F> SuccessLoginHandler<C> for F
where
    F: Fn(&mut C, &Session) + Send + Sync,
{
    fn on_login(&self, context: &mut C, session: &Session) {
        self(context, session)
    }
}

/// Computes the permission set of a principal.
pub trait PermissionResolver: Send + Sync {
    fn resolve(&self, principal: &dyn Principal) -> Permissions;
}

impl<F> PermissionResolver for F
where
    F: Fn(&dyn Principal) -> Permissions + Send + Sync,
{
    fn resolve(&self, principal: &dyn Principal) -> Permissions {
        self(principal)
    }
}
