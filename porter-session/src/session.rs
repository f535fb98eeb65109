//! Session identifiers and the session lifecycle record.

use crate::config::SessionConfig;
use crate::principal::Principal;
use crate::token;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Composite key naming one session.
///
/// Two independently generated tokens plus the remote address the session
/// was started from. Equality is structural over all three parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionIdentifier {
    sid: String,
    ssid: String,
    remote_address: String,
}

impl SessionIdentifier {
    /// Rebuild an identifier from its parts, e.g. when reading it back
    /// from a cookie.
    pub fn new(
        sid: impl Into<String>,
        ssid: impl Into<String>,
        remote_address: impl Into<String>,
    ) -> Self {
        Self {
            sid: sid.into(),
            ssid: ssid.into(),
            remote_address: remote_address.into(),
        }
    }

    /// Fresh identifier with two new tokens.
    pub fn generate(remote_address: impl Into<String>) -> Self {
        Self::new(token::new_token(), token::new_token(), remote_address)
    }

    pub fn sid(&self) -> &str {
        &self.sid
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// Address supplied at login. May be empty.
    pub fn remote_address(&self) -> &str {
        &self.remote_address
    }
}

/// Liveness of a session at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Usable.
    Active,
    /// Idle for longer than the timeout.
    TimedOut,
    /// Past its absolute expiration time.
    HardExpired,
    /// Removed from the pool. Terminal.
    Closed,
}

impl SessionState {
    pub fn is_expired(&self) -> bool {
        !matches!(self, SessionState::Active)
    }
}

/// A login session.
///
/// Owned by the pool once created and handed out as `Arc<Session>`.
/// The identifier, owner and start/expiration times never change; the
/// refresh time moves forward on every successful lookup, and the closed
/// flag is set once, when the pool drops the session from its indices.
pub struct Session {
    id: SessionIdentifier,
    principal: Arc<dyn Principal>,
    principal_id: String,
    save_session: bool,
    start_time: DateTime<Utc>,
    expiration_time: DateTime<Utc>,
    refresh_time: Mutex<DateTime<Utc>>,
    closed: AtomicBool,
}

/// `from + span`, saturating at the latest representable instant.
pub(crate) fn deadline(from: DateTime<Utc>, span: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(span)
        .ok()
        .and_then(|span| from.checked_add_signed(span))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

impl Session {
    pub(crate) fn start(
        id: SessionIdentifier,
        principal: Arc<dyn Principal>,
        config: &SessionConfig,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            principal_id: principal.id(),
            save_session: principal.save_session(),
            principal,
            start_time: now,
            expiration_time: deadline(now, config.expiration),
            refresh_time: Mutex::new(now),
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &SessionIdentifier {
        &self.id
    }

    pub fn principal(&self) -> &Arc<dyn Principal> {
        &self.principal
    }

    /// Owner's identifier as it was at login; the key of the per-principal
    /// index.
    pub fn principal_id(&self) -> &str {
        &self.principal_id
    }

    pub fn remote_address(&self) -> &str {
        self.id.remote_address()
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Absolute end of life, fixed at login.
    pub fn expiration_time(&self) -> DateTime<Utc> {
        self.expiration_time
    }

    /// Last time the session was used.
    pub fn refresh_time(&self) -> DateTime<Utc> {
        *self.refresh_time.lock()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Restart the inactivity window. Does not move the expiration time.
    pub fn refresh(&self) {
        *self.refresh_time.lock() = Utc::now();
    }

    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Evaluate the session against `config` without logging.
    ///
    /// The inactivity timeout only applies when the principal does not
    /// keep its sessions or the pool forces expiry; the absolute
    /// expiration always applies. The principal's choice is read once,
    /// when the session starts, so evaluation never calls back into it.
    pub fn state(&self, config: &SessionConfig) -> SessionState {
        if self.is_closed() {
            return SessionState::Closed;
        }

        let now = Utc::now();
        let timeout_applies = !self.save_session || config.force_expire;
        if timeout_applies && deadline(self.refresh_time(), config.timeout) < now {
            return SessionState::TimedOut;
        }
        if self.expiration_time < now {
            return SessionState::HardExpired;
        }
        SessionState::Active
    }

    /// Whether the session can no longer be used. Logs the reason.
    pub fn expired(&self, config: &SessionConfig) -> bool {
        let state = self.state(config);
        self.log_expiry(state, config);
        state.is_expired()
    }

    /// Write the expiry line for `state`, if it is one of the expiry states.
    pub(crate) fn log_expiry(&self, state: SessionState, config: &SessionConfig) {
        match state {
            SessionState::TimedOut => config.logger.info(&format!(
                "session of {} from {:?} expired by timeout",
                self.principal_id,
                self.remote_address()
            )),
            SessionState::HardExpired => config.logger.info(&format!(
                "session of {} from {:?} expired",
                self.principal_id,
                self.remote_address()
            )),
            SessionState::Active | SessionState::Closed => {}
        }
    }

    /// Serializable snapshot for listings.
    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            principal_id: self.principal_id.clone(),
            remote_address: self.remote_address().to_string(),
            start_time: self.start_time,
            refresh_time: self.refresh_time(),
            expiration_time: self.expiration_time,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("principal", &self.principal_id)
            .field("remote_address", &self.id.remote_address)
            .field("start_time", &self.start_time)
            .field("refresh_time", &self.refresh_time())
            .field("expiration_time", &self.expiration_time)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Session metadata without the identifier tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub principal_id: String,
    pub remote_address: String,
    pub start_time: DateTime<Utc>,
    pub refresh_time: DateTime<Utc>,
    pub expiration_time: DateTime<Utc>,
}
