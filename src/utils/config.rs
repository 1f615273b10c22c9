//! Configuration management for TSPlayer
//!
//! Holds the process-wide defaults a view is built from: playback policy,
//! controller behaviour and logging. Loaded once at startup and handed to
//! `VideoViewBuilder` explicitly.

use crate::renderer::ScaleMode;
use crate::utils::error::{IntoPlayerError, PlayerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Playback configuration
    pub playback: PlaybackConfig,

    /// Controller configuration
    pub controller: ControllerConfig,

    /// General settings
    pub general: GeneralConfig,
}

/// Playback configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Keep playing on a metered mobile connection without asking
    pub play_on_mobile_network: bool,

    /// Arbitrate audio focus with other players
    pub enable_audio_focus: bool,

    /// Default scale mode for new render sinks
    pub screen_scale: ScaleMode,
}

/// Controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Follow the device rotation sensor
    pub enable_orientation: bool,

    /// Lay out around display cutouts
    pub adapt_cutout: bool,

    /// Auto-hide delay in milliseconds
    pub default_timeout_ms: u64,
}

/// General configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Emit log output at all
    pub enable_log: bool,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            play_on_mobile_network: false,
            enable_audio_focus: true,
            screen_scale: ScaleMode::Default,
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            enable_orientation: true,
            adapt_cutout: true,
            default_timeout_ms: 4000,
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            enable_log: false,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from various sources
    ///
    /// Later sources override earlier ones:
    /// 1. Default values
    /// 2. User config file (~/.config/tsplayer/config.toml on Linux)
    /// 3. Environment variables (TSPLAYER_* prefix)
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(user_path) = Self::user_config_path() {
            if user_path.exists() {
                config = Self::from_file(&user_path)?;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Read a TOML file; missing keys fall back to defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).config_err("reading config file")?;
        let config: Config = toml::from_str(&contents).config_err("parsing config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the user config file
    pub fn save(&self) -> Result<()> {
        let path = Self::user_config_path()
            .ok_or_else(|| PlayerError::Config("Cannot determine user config path".to_string()))?;
        self.save_to(&path)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).config_err("creating config directory")?;
        }
        let toml = toml::to_string_pretty(self).config_err("serializing config")?;
        std::fs::write(path, toml).config_err("writing config file")?;

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = env_bool("TSPLAYER_PLAY_ON_MOBILE_NETWORK")? {
            self.playback.play_on_mobile_network = value;
        }

        if let Some(value) = env_bool("TSPLAYER_ENABLE_AUDIO_FOCUS")? {
            self.playback.enable_audio_focus = value;
        }

        if let Some(value) = env_bool("TSPLAYER_ENABLE_ORIENTATION")? {
            self.controller.enable_orientation = value;
        }

        if let Ok(timeout) = std::env::var("TSPLAYER_DEFAULT_TIMEOUT_MS") {
            self.controller.default_timeout_ms = timeout
                .parse()
                .map_err(|_| PlayerError::Config("Invalid TSPLAYER_DEFAULT_TIMEOUT_MS".to_string()))?;
        }

        if let Some(value) = env_bool("TSPLAYER_ENABLE_LOG")? {
            self.general.enable_log = value;
        }

        if let Ok(log_level) = std::env::var("TSPLAYER_LOG_LEVEL") {
            self.general.log_level = log_level;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.controller.default_timeout_ms == 0 {
            return Err(PlayerError::Config("Auto-hide timeout must be non-zero".to_string()));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.general.log_level.as_str()) {
            return Err(PlayerError::Config(format!(
                "Invalid log level '{}', must be one of: {:?}",
                self.general.log_level, valid_log_levels
            )));
        }

        Ok(())
    }

    /// Get user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tsplayer").join("config.toml"))
    }
}

fn env_bool(key: &str) -> Result<Option<bool>> {
    match std::env::var(key) {
        Ok(value) => match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(Some(true)),
            "0" | "false" | "no" => Ok(Some(false)),
            _ => Err(PlayerError::Config(format!("Invalid {}", key))),
        },
        Err(_) => Ok(None),
    }
}

/// Runtime playback policy shared between a view and its controller
///
/// Flipping the mobile-network flag lets a view that stopped in
/// `StartAbort` go through on the next `start()`.
#[derive(Debug, Clone, Default)]
pub struct PlaybackPolicy {
    play_on_mobile_network: Arc<AtomicBool>,
}

impl PlaybackPolicy {
    pub fn new(play_on_mobile_network: bool) -> Self {
        Self {
            play_on_mobile_network: Arc::new(AtomicBool::new(play_on_mobile_network)),
        }
    }

    pub fn from_config(config: &PlaybackConfig) -> Self {
        Self::new(config.play_on_mobile_network)
    }

    pub fn play_on_mobile_network(&self) -> bool {
        self.play_on_mobile_network.load(Ordering::Acquire)
    }

    pub fn set_play_on_mobile_network(&self, allow: bool) {
        self.play_on_mobile_network.store(allow, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.playback.play_on_mobile_network);
        assert!(config.playback.enable_audio_focus);
        assert!(config.controller.enable_orientation);
        assert!(config.controller.adapt_cutout);
        assert_eq!(config.controller.default_timeout_ms, 4000);
        assert_eq!(config.playback.screen_scale, ScaleMode::Default);
        assert!(!config.general.enable_log);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.controller.default_timeout_ms = 0;
        assert!(config.validate().is_err());

        config.controller.default_timeout_ms = 2500;
        config.general.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.playback.screen_scale = ScaleMode::CenterCrop;
        config.controller.default_timeout_ms = 2500;
        config.save_to(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[playback]\nplay_on_mobile_network = true\n").unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert!(loaded.playback.play_on_mobile_network);
        assert!(loaded.playback.enable_audio_focus);
        assert_eq!(loaded.controller.default_timeout_ms, 4000);
    }

    #[test]
    fn test_policy_is_shared_between_clones() {
        let policy = PlaybackPolicy::new(false);
        let other = policy.clone();
        other.set_play_on_mobile_network(true);
        assert!(policy.play_on_mobile_network());
    }
}
