use std::{env, str::FromStr};

use log::debug;

/**
 * Initializes logger
 */
pub fn init_logger(default_level: log::LevelFilter) -> log::LevelFilter {
    let custom_level_result = env::var("RUST_LOG");

    let level = match custom_level_result {
        Ok(level) => log::LevelFilter::from_str(level.as_str()).unwrap_or(default_level),
        Err(_) => {
            debug!(
                "Could not find provided log level, falling back to {}",
                default_level.as_str()
            );

            default_level
        }
    };

    env_logger::builder()
        .filter_level(level)
        .format_target(false)
        .format_timestamp(None)
        .filter_module("polodb_core", log::LevelFilter::Warn)
        .init();

    level
}
