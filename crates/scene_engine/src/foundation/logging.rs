//! Logging utilities
//!
//! The engine logs through the `log` facade; applications pick the sink.
//! `init_with_config` wires up `env_logger` the way the demo binary expects.

pub use log::{debug, error, info, trace, warn};

use crate::core::config::LoggingConfig;

/// Initialize logging with a default filter taken from configuration.
///
/// `RUST_LOG` still wins when it is set. Calling this more than once is
/// harmless; later calls keep the logger that is already installed.
pub fn init_with_config(config: &LoggingConfig) {
    let env = env_logger::Env::default().default_filter_or(config.level.as_str());
    if env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
        .is_err()
    {
        log::debug!("Logger already installed, keeping it");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_keeps_first_logger() {
        let config = LoggingConfig::default();
        init_with_config(&config);
        init_with_config(&config);
        assert_ne!(log::max_level(), log::LevelFilter::Off);
    }
}
