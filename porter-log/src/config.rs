//! Process-wide logging configuration read from the environment.

use crate::level::{Format, Level};
use once_cell::sync::Lazy;
use std::env;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

static LOG_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

static CONFIG: Lazy<LogConfig> = Lazy::new(LogConfig::from_env);

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// `PORTER_DEBUG`
    pub debug: bool,
    /// `PORTER_LOG_LEVEL`
    pub level: Level,
    /// `PORTER_LOG_FORMAT`
    pub format: Format,
    /// `PORTER_LOG_COLOR`
    pub color: bool,
    /// `PORTER_LOG_TIMESTAMPS`
    pub timestamps: bool,
    /// `PORTER_LOG_MODULE`
    pub module_path: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Json,
            color: false,
            timestamps: true,
            module_path: true,
        }
    }
}

fn flag(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

fn stderr_is_terminal() -> bool {
    env::var_os("NO_COLOR").is_none() && env::var_os("TERM").is_some()
}

impl LogConfig {
    /// Build the configuration from `PORTER_*` variables and publish the
    /// level and debug flag to the global atomics.
    pub fn from_env() -> Self {
        let debug = flag("PORTER_DEBUG").unwrap_or(false);

        let level = env::var("PORTER_LOG_LEVEL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(if debug { Level::Debug } else { Level::Info });

        let format = env::var("PORTER_LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(Format::Json);

        let config = Self {
            debug,
            level,
            format,
            color: flag("PORTER_LOG_COLOR").unwrap_or_else(stderr_is_terminal),
            timestamps: flag("PORTER_LOG_TIMESTAMPS").unwrap_or(true),
            module_path: flag("PORTER_LOG_MODULE").unwrap_or(true),
        };

        DEBUG_ENABLED.store(config.debug, Ordering::SeqCst);
        LOG_LEVEL.store(config.level as u8, Ordering::SeqCst);

        config
    }
}

/// Force the environment to be read now instead of on the first log line.
pub fn init() {
    Lazy::force(&CONFIG);
}

/// The global configuration.
pub fn config() -> &'static LogConfig {
    &CONFIG
}

/// Whether `PORTER_DEBUG` (or [`set_debug`]) is on.
#[inline]
pub fn is_debug_enabled() -> bool {
    init();
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

/// Whether a line at `level` would be written.
#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    level != Level::Off && level >= current_level()
}

/// Whether a line at `level` passes the level filter or, for `Debug`, the
/// debug flag. Every writer uses this check.
#[inline]
pub fn is_enabled(level: Level) -> bool {
    passes(level, current_level(), is_debug_enabled())
}

pub(crate) fn passes(level: Level, floor: Level, debug: bool) -> bool {
    level != Level::Off && (level >= floor || (debug && level == Level::Debug))
}

/// Current minimum level.
pub fn current_level() -> Level {
    init();
    Level::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Change the minimum level at runtime.
pub fn set_level(level: Level) {
    init();
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
    log::set_max_level(level.to_level_filter());
}

/// Toggle debug mode at runtime. Enabling it lowers the level to `Debug`.
pub fn set_debug(enabled: bool) {
    init();
    DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    if enabled && current_level() > Level::Debug {
        set_level(Level::Debug);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_off_is_never_enabled() {
        assert!(!is_level_enabled(Level::Off));
    }

    #[test]
    fn test_debug_flag_admits_debug_only() {
        assert!(passes(Level::Debug, Level::Warn, true));
        assert!(!passes(Level::Debug, Level::Warn, false));
        assert!(!passes(Level::Trace, Level::Warn, true));
        assert!(!passes(Level::Info, Level::Warn, true));
        assert!(passes(Level::Error, Level::Warn, false));
        assert!(!passes(Level::Off, Level::Trace, true));
    }

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, Level::Info);
        assert_eq!(config.format, Format::Json);
        assert!(config.timestamps);
    }
}
