//! Login session engine for Porter.
//!
//! Issues, tracks, refreshes and revokes login sessions for authenticated
//! principals. All state is process-local and in memory.
//!
//! # Lifecycle
//!
//! A session is created by [`SessionPool::start_session`] and carries two
//! independent clocks:
//!
//! - an **expiration time**, fixed at login, after which the session is dead
//!   no matter how active it is;
//! - an **inactivity timeout**, restarted by every successful
//!   [`SessionPool::get_session`], which drops idle sessions early. A
//!   principal can opt out of the timeout through
//!   [`Principal::save_session`] unless the pool forces expiry.
//!
//! Expiry is evaluated lazily on lookup; [`SessionPool::purge_expired`]
//! sweeps the whole pool when periodic cleanup is wanted.
//!
//! # Repeated logins
//!
//! [`MultiLogin`] decides what happens when a principal that already holds
//! sessions logs in again: refuse, replace, add alongside, or add while
//! closing sessions held from other addresses.
//!
//! # Example
//!
//! ```
//! use porter_session::prelude::*;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! struct Account { name: String }
//!
//! impl Principal for Account {
//!     fn id(&self) -> String { self.name.clone() }
//!     fn can_login(&self) -> bool { true }
//!     fn allow_multi_login(&self) -> bool { true }
//!     fn save_session(&self) -> bool { false }
//! }
//!
//! let config = SessionConfig::new(Duration::from_secs(8 * 3600), Duration::from_secs(900))
//!     .with_multi_login(MultiLogin::ExpireCurrent);
//! let pool = SessionPool::new(config);
//!
//! let account = Arc::new(Account { name: "alice".into() });
//! let first = pool.start_session(account.clone(), "10.0.0.1")?;
//! let second = pool.start_session(account.clone(), "10.0.0.2")?;
//!
//! assert!(first.is_closed());
//! assert_eq!(pool.get_all_sessions(account.as_ref()).len(), 1);
//! assert_eq!(pool.get_session(second.id())?.remote_address(), "10.0.0.2");
//! # Ok::<(), SessionError>(())
//! ```

pub mod config;
pub mod error;
pub mod pool;
pub mod principal;
pub mod session;
pub mod token;

pub use config::{DEFAULT_ENV_PREFIX, MultiLogin, SessionConfig, SessionSettings};
pub use error::{SessionError, SessionResult};
pub use pool::SessionPool;
pub use principal::Principal;
pub use session::{Session, SessionIdentifier, SessionInfo, SessionState};
pub use token::new_token;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{MultiLogin, SessionConfig};
    pub use crate::error::{SessionError, SessionResult};
    pub use crate::pool::SessionPool;
    pub use crate::principal::Principal;
    pub use crate::session::{Session, SessionIdentifier, SessionState};
}
