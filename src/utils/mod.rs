//! Utility module for TSPlayer
//!
//! This module provides common utilities used throughout the crate:
//! - Error handling with custom error types
//! - Configuration management
//! - Clocks and single-slot timers
//! - Logging setup and position formatting

pub mod config;
pub mod error;
pub mod timer;

pub use config::{Config, ControllerConfig, GeneralConfig, PlaybackConfig, PlaybackPolicy};
pub use error::{IntoPlayerError, PlayerError, Result};
pub use timer::{Clock, ManualClock, SystemClock, TimerSlot};

use log::LevelFilter;

/// Initialize the application configuration
///
/// Loads configuration from:
/// 1. Default values
/// 2. User configuration file
/// 3. Environment variables
pub fn load_config() -> Result<Config> {
    Config::load()
}

/// Map the logging section onto a level filter
///
/// A disabled log switch silences the crate entirely.
pub fn log_filter(general: &GeneralConfig) -> LevelFilter {
    if !general.enable_log {
        return LevelFilter::Off;
    }
    general.log_level.parse().unwrap_or(LevelFilter::Info)
}

/// Install `env_logger` according to the logging section
///
/// `RUST_LOG` still wins when set. Calling this twice is harmless.
pub fn init_logging(general: &GeneralConfig) {
    let filter = log_filter(general);
    let _ = env_logger::Builder::new()
        .filter_level(filter)
        .parse_env("RUST_LOG")
        .format_timestamp_millis()
        .try_init();
}

/// Format a position in milliseconds for display
///
/// Returns "HH:MM:SS" or "MM:SS" for positions under an hour.
pub fn format_position(position_ms: u64) -> String {
    let total_secs = position_ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}
