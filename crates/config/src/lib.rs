//! Resonance configuration
//!
//! A single TOML file with one table per section. Each section implements
//! [`ConfigSection`] for validation and merging.
//!
//! - Missing files yield defaults; invalid values are reported per field
//! - Writes are atomic and keep a `.toml.backup` of the previous file
//! - `RESONANCE_SECTION_FIELD` environment variables override file values
//!
//! # Example
//!
//! ```rust,no_run
//! use resonance_config::ConfigManager;
//!
//! let manager = ConfigManager::new().expect("config directory");
//! let config = manager.load_or_default();
//! println!("Progress interval: {}ms", config.player.progress_interval_ms);
//! ```

mod error;
mod manager;
mod overrides;
mod persistence;
mod validation;

// Config sections
mod app_config;
mod content_config;
mod player_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::ConfigManager;
pub use overrides::{apply_env_overrides, set_value, ENV_PREFIX};
pub use validation::{ConfigSection, Validator};

pub use app_config::{AppConfig, ColorMode, LogLevel};
pub use content_config::ContentConfig;
pub use player_config::{FailurePolicySetting, PlayerConfig};

use serde::{Deserialize, Serialize};

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Application-level settings
    pub app: AppConfig,

    /// Playback behavior
    pub player: PlayerConfig,

    /// Search limits and auto-save timing
    pub content: ContentConfig,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates every section, returning all errors found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.app.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.player.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.content.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Merges this config with another, preferring values from `other`
    pub fn merge(&mut self, other: Config) {
        self.app.merge(other.app);
        self.player.merge(other.player);
        self.content.merge(other.content);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            player: PlayerConfig::default(),
            content: ContentConfig::default(),
        }
    }
}
