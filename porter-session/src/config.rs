//! Session configuration.

use crate::error::{SessionError, SessionResult};
use porter_log::Logger;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Environment prefix read by [`SessionConfig::from_env`].
pub const DEFAULT_ENV_PREFIX: &str = "PORTER_SESSION";

/// What happens when a principal that already holds a session logs in again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiLogin {
    /// Refuse the new session while any session exists.
    #[default]
    FailNew,
    /// Close every existing session and start the new one.
    ExpireCurrent,
    /// Start the new session alongside the existing ones, if the principal
    /// allows multiple logins.
    AllowNew,
    /// Like `AllowNew`, but a login from a new address closes the sessions
    /// held from other addresses.
    AllowNewFromSameAddress,
}

impl MultiLogin {
    /// Configuration name of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            MultiLogin::FailNew => "fail_new",
            MultiLogin::ExpireCurrent => "expire_current",
            MultiLogin::AllowNew => "allow_new",
            MultiLogin::AllowNewFromSameAddress => "allow_new_from_same_address",
        }
    }
}

impl fmt::Display for MultiLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MultiLogin {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "fail_new" => Ok(MultiLogin::FailNew),
            "expire_current" => Ok(MultiLogin::ExpireCurrent),
            "allow_new" => Ok(MultiLogin::AllowNew),
            "allow_new_from_same_address" => Ok(MultiLogin::AllowNewFromSameAddress),
            other => Err(SessionError::Config(format!(
                "unknown multi-login policy: {other}"
            ))),
        }
    }
}

/// Policy bundle attached to a session pool.
///
/// Built once and moved into the pool, which only hands out shared
/// references afterwards.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Absolute session lifetime, counted from login and never extended
    pub expiration: Duration,
    /// Inactivity window, restarted by every successful lookup
    pub timeout: Duration,
    /// Policy for repeated logins by the same principal
    pub multi_login: MultiLogin,
    /// Apply the inactivity timeout even to principals that opt out of it
    pub force_expire: bool,
    /// Destination for session lifecycle lines
    pub logger: Logger,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            expiration: Duration::from_secs(2 * 3600),
            timeout: Duration::from_secs(30 * 60),
            multi_login: MultiLogin::FailNew,
            force_expire: false,
            logger: Logger::new("porter::session"),
        }
    }
}

impl SessionConfig {
    /// Create a configuration with the given lifetime and inactivity timeout.
    ///
    /// # Examples
    ///
    /// ```
    /// use porter_session::{MultiLogin, SessionConfig};
    /// use std::time::Duration;
    ///
    /// let config = SessionConfig::new(Duration::from_secs(3600), Duration::from_secs(600))
    ///     .with_multi_login(MultiLogin::ExpireCurrent)
    ///     .with_force_expire(true);
    ///
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(expiration: Duration, timeout: Duration) -> Self {
        Self {
            expiration,
            timeout,
            ..Default::default()
        }
    }

    /// Set the multi-login policy.
    pub fn with_multi_login(mut self, multi_login: MultiLogin) -> Self {
        self.multi_login = multi_login;
        self
    }

    /// Set the force-expire flag.
    pub fn with_force_expire(mut self, force_expire: bool) -> Self {
        self.force_expire = force_expire;
        self
    }

    /// Replace the logger.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Route lifecycle lines to `sink` instead of the global writer.
    pub fn with_log_sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.logger = self.logger.with_sink(sink);
        self
    }

    /// Reject configurations under which no session could ever be used.
    pub fn validate(&self) -> SessionResult<()> {
        if self.expiration.is_zero() {
            return Err(SessionError::Config(
                "expiration must be greater than zero".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(SessionError::Config(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Build a validated configuration from deserialized settings.
    pub fn from_settings(settings: &SessionSettings) -> SessionResult<Self> {
        let config = Self::new(
            Duration::from_secs(settings.expiration_secs),
            Duration::from_secs(settings.timeout_secs),
        )
        .with_multi_login(settings.multi_login)
        .with_force_expire(settings.force_expire);

        config.validate()?;
        Ok(config)
    }

    /// Parse TOML text. Settings are read from a `[session]` table when one
    /// exists, otherwise from the top level.
    ///
    /// ```
    /// use porter_session::{MultiLogin, SessionConfig};
    ///
    /// let config = SessionConfig::from_toml_str(r#"
    ///     [session]
    ///     expiration_secs = 600
    ///     timeout_secs = 60
    ///     multi_login = "allow_new"
    /// "#).unwrap();
    ///
    /// assert_eq!(config.multi_login, MultiLogin::AllowNew);
    /// ```
    pub fn from_toml_str(source: &str) -> SessionResult<Self> {
        let mut document: toml::Table = toml::from_str(source)
            .map_err(|e| SessionError::Config(format!("invalid TOML: {e}")))?;

        let table = match document.remove("session") {
            Some(toml::Value::Table(section)) => section,
            Some(_) => {
                return Err(SessionError::Config(
                    "`session` must be a table".to_string(),
                ));
            }
            None => document,
        };

        let settings: SessionSettings = toml::Value::Table(table)
            .try_into()
            .map_err(|e| SessionError::Config(format!("invalid session settings: {e}")))?;

        Self::from_settings(&settings)
    }

    /// Read and parse a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> SessionResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            SessionError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&source)
    }

    /// Read `{prefix}_EXPIRATION_SECS`, `{prefix}_TIMEOUT_SECS`,
    /// `{prefix}_MULTI_LOGIN` and `{prefix}_FORCE_EXPIRE`. Missing variables
    /// keep their defaults.
    pub fn from_env(prefix: &str) -> SessionResult<Self> {
        Self::from_lookup(prefix, |key| env::var(key).ok())
    }

    /// Load a `.env` file (the default one when `path` is `None`), then
    /// read the environment as [`SessionConfig::from_env`] does.
    pub fn from_dotenv(path: Option<&Path>, prefix: &str) -> SessionResult<Self> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| SessionError::Config(e.to_string()))?;
            }
            None => {
                // A missing default .env is not an error.
                dotenvy::dotenv().ok();
            }
        }
        Self::from_env(prefix)
    }

    fn from_lookup<F>(prefix: &str, lookup: F) -> SessionResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{prefix}_{name}"));
        let mut settings = SessionSettings::default();

        if let Some(value) = var("EXPIRATION_SECS") {
            settings.expiration_secs = parse_secs("EXPIRATION_SECS", &value)?;
        }
        if let Some(value) = var("TIMEOUT_SECS") {
            settings.timeout_secs = parse_secs("TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = var("MULTI_LOGIN") {
            settings.multi_login = value.parse()?;
        }
        if let Some(value) = var("FORCE_EXPIRE") {
            settings.force_expire = value == "1" || value.eq_ignore_ascii_case("true");
        }

        Self::from_settings(&settings)
    }
}

fn parse_secs(name: &str, value: &str) -> SessionResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| SessionError::Config(format!("{name} must be a number of seconds, got {value:?}")))
}

/// Serializable form of [`SessionConfig`], as found in files and the
/// environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub expiration_secs: u64,
    pub timeout_secs: u64,
    pub multi_login: MultiLogin,
    pub force_expire: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            expiration_secs: 2 * 3600,
            timeout_secs: 30 * 60,
            multi_login: MultiLogin::FailNew,
            force_expire: false,
        }
    }
}
