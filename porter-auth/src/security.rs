// Security façade

use crate::error::{AuthError, Result};
use crate::filter::{
    AuthenticationFilter, LoginFilter, PermissionResolver, SuccessLoginHandler,
};
use crate::permissions::Permissions;
use porter_log::debug;
use porter_session::{
    Principal, Session, SessionConfig, SessionError, SessionIdentifier, SessionPool,
};
use std::sync::Arc;

/// Pool settings plus the application delegates.
pub struct SecurityConfig<C> {
    /// Session pool settings
    pub session: SessionConfig,
    login_filter: Option<Arc<dyn LoginFilter<C>>>,
    authentication_filter: Option<Arc<dyn AuthenticationFilter<C>>>,
    success_handler: Option<Arc<dyn SuccessLoginHandler<C>>>,
    permission_resolver: Option<Arc<dyn PermissionResolver>>,
}

impl<C> SecurityConfig<C> {
    pub fn new(session: SessionConfig) -> Self {
        Self {
            session,
            login_filter: None,
            authentication_filter: None,
            success_handler: None,
            permission_resolver: None,
        }
    }

    /// Set the credential check run by [`Security::login`]
    pub fn with_login_filter(mut self, filter: impl LoginFilter<C> + 'static) -> Self {
        self.login_filter = Some(Arc::new(filter));
        self
    }

    /// Set the identifier lookup run by [`Security::authenticate`]
    pub fn with_authentication_filter(
        mut self,
        filter: impl AuthenticationFilter<C> + 'static,
    ) -> Self {
        self.authentication_filter = Some(Arc::new(filter));
        self
    }

    /// Set the callback that stores a new session's identifier
    pub fn with_success_handler(mut self, handler: impl SuccessLoginHandler<C> + 'static) -> Self {
        self.success_handler = Some(Arc::new(handler));
        self
    }

    /// Set how permissions are derived from a principal
    pub fn with_permission_resolver(mut self, resolver: impl PermissionResolver + 'static) -> Self {
        self.permission_resolver = Some(Arc::new(resolver));
        self
    }

    /// Check the whole configuration up front.
    ///
    /// [`Security::new`] does not call this; a missing filter otherwise
    /// surfaces on the first call that needs it.
    pub fn validate(&self) -> Result<()> {
        self.session.validate()?;
        if self.login_filter.is_none() {
            return Err(AuthError::LoginFilterNotImplemented);
        }
        if self.authentication_filter.is_none() {
            return Err(AuthError::AuthenticationFilterNotImplemented);
        }
        Ok(())
    }
}

impl<C> Default for SecurityConfig<C> {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

/// Entry point for login, authentication and logout.
///
/// `C` is the embedding framework's request context. The façade never
/// looks inside it; the delegates do.
pub struct Security<C> {
    pool: SessionPool,
    login_filter: Option<Arc<dyn LoginFilter<C>>>,
    authentication_filter: Option<Arc<dyn AuthenticationFilter<C>>>,
    success_handler: Option<Arc<dyn SuccessLoginHandler<C>>>,
    permission_resolver: Option<Arc<dyn PermissionResolver>>,
}

impl<C> Security<C> {
    pub fn new(config: SecurityConfig<C>) -> Self {
        Self {
            pool: SessionPool::new(config.session),
            login_filter: config.login_filter,
            authentication_filter: config.authentication_filter,
            success_handler: config.success_handler,
            permission_resolver: config.permission_resolver,
        }
    }

    /// Log in with the credentials in `context`.
    ///
    /// Runs the login filter, checks that the principal may log in, starts
    /// a session under the pool's multi-login policy and hands it to the
    /// success handler so it can be stored in `context`.
    pub fn login(&self, context: &mut C) -> Result<Arc<Session>> {
        let filter = self
            .login_filter
            .as_ref()
            .ok_or(AuthError::LoginFilterNotImplemented)?;

        let grant = filter.login(context).map_err(AuthError::Delegate)?;
        if !grant.principal.can_login() {
            self.pool.config().logger.warn(&format!(
                "login refused for {}: principal cannot login",
                grant.principal.id()
            ));
            return Err(AuthError::CannotLoginPrincipal);
        }

        let session = self
            .pool
            .start_session(grant.principal, &grant.remote_address)?;

        match &self.success_handler {
            Some(handler) => handler.on_login(context, &session),
            None => debug!("no success login handler configured, identifier not stored"),
        }

        Ok(session)
    }

    /// Resolve the session named by the identifier in `context`.
    ///
    /// A successful call counts as activity and keeps the session alive.
    pub fn authenticate(&self, context: &C) -> Result<Arc<Session>> {
        let filter = self
            .authentication_filter
            .as_ref()
            .ok_or(AuthError::AuthenticationFilterNotImplemented)?;

        let id = filter.identify(context).ok_or(SessionError::NotFound)?;
        Ok(self.pool.get_session(&id)?)
    }

    /// Log out the session named by `id`.
    pub fn end_session(&self, id: &SessionIdentifier) -> Result<()> {
        Ok(self.pool.stop_session(id)?)
    }

    /// Log out the session named by the identifier in `context`.
    pub fn end_current_session(&self, context: &C) -> Result<()> {
        let filter = self
            .authentication_filter
            .as_ref()
            .ok_or(AuthError::AuthenticationFilterNotImplemented)?;

        let id = filter.identify(context).ok_or(SessionError::NotFound)?;
        self.end_session(&id)
    }

    /// Log out every session of `principal`.
    pub fn end_all_sessions(&self, principal: &dyn Principal) -> usize {
        self.pool.stop_all_sessions(principal)
    }

    /// Sessions currently held by `principal`.
    pub fn sessions(&self, principal: &dyn Principal) -> Vec<Arc<Session>> {
        self.pool.get_all_sessions(principal)
    }

    /// Permissions of the session's owner, when a resolver is configured.
    pub fn permissions(&self, session: &Session) -> Option<Permissions> {
        self.permission_resolver
            .as_ref()
            .map(|resolver| resolver.resolve(&**session.principal()))
    }

    /// Drop every expired session.
    pub fn purge_expired(&self) -> usize {
        self.pool.purge_expired()
    }

    pub fn pool(&self) -> &SessionPool {
        &self.pool
    }
}
