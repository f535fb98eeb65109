//! `log` crate bridge.

use crate::config::{current_level, is_enabled};
use crate::level::Level;

struct Bridge;

static BRIDGE: Bridge = Bridge;

impl log::Log for Bridge {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        is_enabled(Level::from(metadata.level()))
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            crate::output::emit(
                Level::from(record.level()),
                record.target(),
                &record.args().to_string(),
            );
        }
    }

    fn flush(&self) {}
}

/// Install the porter writer as the global `log` logger.
///
/// Records emitted with `log::info!` and friends by the embedding
/// application are then rendered in the configured porter format.
/// Fails if another logger was installed first.
pub fn install() -> Result<(), log::SetLoggerError> {
    log::set_logger(&BRIDGE)?;
    log::set_max_level(current_level().to_level_filter());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_once() {
        assert!(install().is_ok());
        assert!(install().is_err());

        log::info!(target: "porter::bridge", "routed through porter");
        assert!(log::logger().enabled(&log::Metadata::builder().level(log::Level::Error).build()));
    }
}
