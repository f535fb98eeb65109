//! Porter logging.
//!
//! Structured logging for the Porter session engine, controlled by the
//! `PORTER_DEBUG` and `PORTER_LOG_*` environment variables.
//!
//! Three ways in:
//!
//! - the `trace!` .. `error!` macros, for crate-internal diagnostics;
//! - [`Logger`], a cloneable handle a component carries around, which can
//!   be pointed at a caller-supplied sink;
//! - [`install`], which routes `log` crate records through the same writer.
//!
//! ```rust
//! use porter_log::{debug, info, warn};
//!
//! debug!("pool created");
//! info!("session started for {}", "alice");
//! warn!(target: "porter::pool", "session not found");
//! ```
//!
//! # Environment Variables
//!
//! - `PORTER_DEBUG=1` - Enable debug logging
//! - `PORTER_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `PORTER_LOG_FORMAT=pretty|json|compact` - Set output format
//! - `PORTER_LOG_COLOR=1|0` - Enable/disable colors
//! - `PORTER_LOG_TIMESTAMPS=1|0`, `PORTER_LOG_MODULE=1|0`

mod bridge;
mod config;
mod level;
mod output;
mod sink;

pub use bridge::install;
pub use config::{
    LogConfig, config, current_level, init, is_debug_enabled, is_enabled, is_level_enabled,
    set_debug, set_level,
};
pub use level::{Format, Level, UnknownVariant};
#[doc(hidden)]
pub use output::emit;
pub use sink::{Logger, Sink};

/// Log a trace message.
#[macro_export]
macro_rules! trace {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Trace) {
            $crate::emit($crate::Level::Trace, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Trace) {
            $crate::emit($crate::Level::Trace, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log a debug message.
///
/// Written when `PORTER_DEBUG=1` or the level is `debug` or lower.
#[macro_export]
macro_rules! debug {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_enabled($crate::Level::Debug) {
            $crate::emit($crate::Level::Debug, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_enabled($crate::Level::Debug) {
            $crate::emit($crate::Level::Debug, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log an info message.
#[macro_export]
macro_rules! info {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Info) {
            $crate::emit($crate::Level::Info, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Info) {
            $crate::emit($crate::Level::Info, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log a warning message.
#[macro_export]
macro_rules! warn {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Warn) {
            $crate::emit($crate::Level::Warn, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Warn) {
            $crate::emit($crate::Level::Warn, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log an error message.
#[macro_export]
macro_rules! error {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Error) {
            $crate::emit($crate::Level::Error, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Error) {
            $crate::emit($crate::Level::Error, module_path!(), &format!($($arg)+));
        }
    };
}

#[cfg(feature = "tracing")]
pub mod tracing_compat {
    //! A `tracing` subscriber that honours the porter level and color flag.

    use super::*;

    pub fn subscriber() -> impl tracing::Subscriber {
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::{EnvFilter, fmt};

        let directive = match current_level() {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Off => "off",
        };

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(config().color))
    }
}
