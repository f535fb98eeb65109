//! In-memory session pool.
//!
//! Sessions are indexed twice: by identifier, and by owning principal. Both
//! indices live behind a single reader/writer lock and every mutation
//! updates them together, so a session is reachable through one index
//! exactly when it is reachable through the other.
//!
//! Lookups take the shared lock. Logins take the exclusive lock for the
//! whole policy decision, so two concurrent logins by the same principal
//! cannot both pass a `FailNew` check.

use crate::config::{MultiLogin, SessionConfig};
use crate::error::{SessionError, SessionResult};
use crate::principal::Principal;
use crate::session::{Session, SessionIdentifier, SessionState};
use parking_lot::RwLock;
use porter_log::debug;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Default)]
struct Indices {
    by_session_id: HashMap<SessionIdentifier, Arc<Session>>,
    by_principal_id: HashMap<String, HashMap<SessionIdentifier, Arc<Session>>>,
}

impl Indices {
    fn insert(&mut self, session: Arc<Session>) {
        self.by_principal_id
            .entry(session.principal_id().to_string())
            .or_default()
            .insert(session.id().clone(), session.clone());
        self.by_session_id.insert(session.id().clone(), session);
    }

    /// Drop a session from both indices and close it. `None` when it was
    /// already gone.
    fn remove(&mut self, id: &SessionIdentifier) -> Option<Arc<Session>> {
        let session = self.by_session_id.remove(id)?;

        let principal_id = session.principal_id();
        if let Some(owned) = self.by_principal_id.get_mut(principal_id) {
            owned.remove(id);
            if owned.is_empty() {
                self.by_principal_id.remove(principal_id);
            }
        }

        session.close();
        Some(session)
    }

    fn sessions_of(&self, principal_id: &str) -> Vec<Arc<Session>> {
        self.by_principal_id
            .get(principal_id)
            .map(|owned| owned.values().cloned().collect())
            .unwrap_or_default()
    }
}

/// Concurrent store of login sessions.
///
/// # Examples
///
/// ```
/// use porter_session::{Principal, SessionConfig, SessionError, SessionPool};
/// use std::sync::Arc;
///
/// struct User(&'static str);
///
/// impl Principal for User {
///     fn id(&self) -> String { self.0.to_string() }
///     fn can_login(&self) -> bool { true }
///     fn allow_multi_login(&self) -> bool { false }
///     fn save_session(&self) -> bool { false }
/// }
///
/// let pool = SessionPool::new(SessionConfig::default());
/// let session = pool.start_session(Arc::new(User("alice")), "10.0.0.7").unwrap();
///
/// let found = pool.get_session(session.id()).unwrap();
/// assert_eq!(found.principal_id(), "alice");
///
/// pool.stop_session(session.id()).unwrap();
/// assert_eq!(pool.get_session(session.id()).unwrap_err(), SessionError::NotFound);
/// ```
pub struct SessionPool {
    config: SessionConfig,
    indices: RwLock<Indices>,
}

impl SessionPool {
    /// Create an empty pool governed by `config`.
    pub fn new(config: SessionConfig) -> Self {
        debug!(
            "session pool created: expiration={:?} timeout={:?} multi_login={} force_expire={}",
            config.expiration, config.timeout, config.multi_login, config.force_expire
        );
        Self {
            config,
            indices: RwLock::new(Indices::default()),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Start a session for `principal` from `remote_address`.
    ///
    /// The principal's existing sessions are reconciled with the configured
    /// [`MultiLogin`] policy first. Sessions that have already expired are
    /// evicted before the policy looks at them. Whether the principal may
    /// log in at all is the caller's check.
    ///
    /// # Errors
    ///
    /// [`SessionError::AlreadyStarted`] when the policy refuses the login.
    pub fn start_session(
        &self,
        principal: Arc<dyn Principal>,
        remote_address: &str,
    ) -> SessionResult<Arc<Session>> {
        let allow_multi_login = principal.allow_multi_login();
        let session = Arc::new(Session::start(
            SessionIdentifier::generate(remote_address),
            principal,
            &self.config,
        ));
        let principal_id = session.principal_id();

        let mut indices = self.indices.write();

        let mut stale = Vec::new();
        let mut current = Vec::new();
        for existing in indices.sessions_of(principal_id) {
            let state = existing.state(&self.config);
            if state.is_expired() {
                indices.remove(existing.id());
                stale.push((existing, state));
            } else {
                current.push(existing);
            }
        }

        let admitted = match self.config.multi_login {
            MultiLogin::FailNew => current.is_empty().then(Vec::new),
            MultiLogin::ExpireCurrent => Some(current),
            MultiLogin::AllowNew => (allow_multi_login || current.is_empty()).then(Vec::new),
            MultiLogin::AllowNewFromSameAddress => {
                (allow_multi_login || current.is_empty()).then(|| {
                    current
                        .into_iter()
                        .filter(|existing| existing.remote_address() != remote_address)
                        .collect()
                })
            }
        };

        let evict = match admitted {
            Some(evict) => evict,
            None => {
                drop(indices);
                self.log_expired(&stale);
                self.config.logger.warn(&format!(
                    "login of {} rejected by {} policy: session already started",
                    principal_id, self.config.multi_login
                ));
                return Err(SessionError::AlreadyStarted);
            }
        };

        for existing in &evict {
            indices.remove(existing.id());
        }
        indices.insert(session.clone());
        drop(indices);

        self.log_expired(&stale);
        if !evict.is_empty() {
            self.config.logger.info(&format!(
                "{} session(s) of {} closed by {} policy",
                evict.len(),
                principal_id,
                self.config.multi_login
            ));
        }
        self.config.logger.debug(&format!(
            "session started for {} from {:?}",
            principal_id, remote_address
        ));

        Ok(session)
    }

    /// Expiry lines for sessions dropped under the lock. Called after the
    /// guard is released so a sink may use the pool.
    fn log_expired(&self, expired: &[(Arc<Session>, SessionState)]) {
        for (session, state) in expired {
            session.log_expiry(*state, &self.config);
        }
    }

    /// Look up a live session and mark it as used.
    ///
    /// Every successful lookup restarts the session's inactivity window.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotFound`] when the identifier is unknown, and
    /// [`SessionError::Expired`] when the session failed its liveness
    /// check, in which case it has been removed.
    pub fn get_session(&self, id: &SessionIdentifier) -> SessionResult<Arc<Session>> {
        let (session, state) = {
            let indices = self.indices.read();
            let session = indices
                .by_session_id
                .get(id)
                .cloned()
                .ok_or(SessionError::NotFound)?;

            // Removal needs the write lock, so the session cannot be closed
            // while this read guard is held.
            let state = session.state(&self.config);
            if !state.is_expired() {
                session.refresh();
                return Ok(session);
            }
            (session, state)
        };

        self.indices.write().remove(id);
        session.log_expiry(state, &self.config);
        Err(SessionError::Expired)
    }

    /// Remove the session named by `id`.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotFound`] when no such session is in the pool,
    /// including when it was removed before.
    pub fn remove_session_by_id(&self, id: &SessionIdentifier) -> SessionResult<()> {
        let removed = self.indices.write().remove(id);
        match removed {
            Some(session) => {
                self.config.logger.info(&format!(
                    "session of {} from {:?} removed",
                    session.principal_id(),
                    session.remote_address()
                ));
                Ok(())
            }
            None => {
                self.config.logger.warn(&format!(
                    "cannot remove session from {:?}: session not found",
                    id.remote_address()
                ));
                Err(SessionError::NotFound)
            }
        }
    }

    /// End a session (logout). Same as [`SessionPool::remove_session_by_id`].
    pub fn stop_session(&self, id: &SessionIdentifier) -> SessionResult<()> {
        self.remove_session_by_id(id)
    }

    /// Remove a session the caller already holds. Removing it again is a
    /// no-op.
    pub fn remove_session(&self, session: &Session) {
        let removed = self.indices.write().remove(session.id());
        if removed.is_some() {
            self.config.logger.info(&format!(
                "session of {} from {:?} removed",
                session.principal_id(),
                session.remote_address()
            ));
        }
    }

    /// Snapshot of every session indexed for `principal`.
    ///
    /// Expired sessions that have not been looked up yet are included;
    /// check [`Session::expired`] when only live ones matter.
    pub fn get_all_sessions(&self, principal: &dyn Principal) -> Vec<Arc<Session>> {
        self.indices.read().sessions_of(&principal.id())
    }

    /// Remove every session of `principal`. Returns how many were removed.
    pub fn stop_all_sessions(&self, principal: &dyn Principal) -> usize {
        let principal_id = principal.id();
        let removed = {
            let mut indices = self.indices.write();
            indices
                .sessions_of(&principal_id)
                .iter()
                .filter_map(|session| indices.remove(session.id()))
                .count()
        };

        if removed > 0 {
            self.config
                .logger
                .info(&format!("{} session(s) of {} removed", removed, principal_id));
        }
        removed
    }

    /// Remove every expired session. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let mut indices = self.indices.write();
        let expired: Vec<(Arc<Session>, SessionState)> = indices
            .by_session_id
            .values()
            .map(|session| (session.clone(), session.state(&self.config)))
            .filter(|(_, state)| state.is_expired())
            .collect();

        for (session, _) in &expired {
            indices.remove(session.id());
        }
        drop(indices);

        self.log_expired(&expired);
        debug!("purged {} expired session(s)", expired.len());
        expired.len()
    }

    /// Number of sessions in the pool, expired or not.
    pub fn len(&self) -> usize {
        self.indices.read().by_session_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of principals holding at least one session.
    pub fn principal_count(&self) -> usize {
        self.indices.read().by_principal_id.len()
    }
}

impl fmt::Debug for SessionPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionPool")
            .field("config", &self.config)
            .field("sessions", &self.len())
            .finish()
    }
}
