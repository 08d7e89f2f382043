//! Application-level configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Log level for application logging
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter string understood by `env_logger`
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Whether terminal output is colored
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Color when writing to a terminal
    Auto,
    Always,
    Never,
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorMode::Auto => write!(f, "auto"),
            ColorMode::Always => write!(f, "always"),
            ColorMode::Never => write!(f, "never"),
        }
    }
}

impl FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ColorMode::Auto),
            "always" => Ok(ColorMode::Always),
            "never" => Ok(ColorMode::Never),
            other => Err(format!("unknown color mode '{}'", other)),
        }
    }
}

/// Application-level settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Database file path (relative to the data dir if not absolute)
    pub database_path: PathBuf,

    /// Log level for application output
    pub log_level: LogLevel,

    /// Enable debug mode (forces debug logging)
    pub debug_mode: bool,

    /// Terminal color output
    pub color: ColorMode,

    /// Profile the CLI acts as; set by `resonance init`
    pub active_profile: Option<String>,

    /// How many recently played tracks to list
    pub max_recent_tracks: usize,
}

impl AppConfig {
    /// Log level after applying debug mode
    pub fn effective_log_level(&self) -> LogLevel {
        if self.debug_mode {
            LogLevel::Debug
        } else {
            self.log_level
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("resonance.db"),
            log_level: LogLevel::Info,
            debug_mode: false,
            color: ColorMode::Auto,
            active_profile: None,
            max_recent_tracks: 20,
        }
    }
}

impl ConfigSection for AppConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut results = vec![
            Validator::not_empty(
                &self.database_path.to_string_lossy(),
                "app.database_path",
            ),
            Validator::in_range(self.max_recent_tracks, 1, 100, "app.max_recent_tracks"),
        ];

        if let Some(profile) = &self.active_profile {
            results.push(Validator::uuid(profile, "app.active_profile"));
        }

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        self.database_path = other.database_path;
        self.log_level = other.log_level;
        self.debug_mode = other.debug_mode;
        self.color = other.color;
        if other.active_profile.is_some() {
            self.active_profile = other.active_profile;
        }
        self.max_recent_tracks = other.max_recent_tracks;
    }

    fn section_name(&self) -> &'static str {
        "app"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_database_path() {
        let config = AppConfig {
            database_path: PathBuf::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_active_profile() {
        let config = AppConfig {
            active_profile: Some("not-a-uuid".to_string()),
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors[0].field, "app.active_profile");
    }

    #[test]
    fn test_invalid_max_recent_tracks() {
        let mut config = AppConfig::default();
        config.max_recent_tracks = 0;
        assert!(config.validate().is_err());

        config.max_recent_tracks = 150;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_keeps_active_profile_when_other_has_none() {
        let mut base = AppConfig {
            active_profile: Some("67e55044-10b1-426f-9247-bb680e5fe0c8".to_string()),
            ..Default::default()
        };
        let other = AppConfig {
            log_level: LogLevel::Debug,
            ..Default::default()
        };

        base.merge(other);
        assert_eq!(base.log_level, LogLevel::Debug);
        assert!(base.active_profile.is_some());
    }

    #[test]
    fn test_effective_log_level() {
        let mut config = AppConfig::default();
        assert_eq!(config.effective_log_level(), LogLevel::Info);
        config.debug_mode = true;
        assert_eq!(config.effective_log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!("never".parse::<ColorMode>(), Ok(ColorMode::Never));
        assert_eq!(ColorMode::Auto.to_string(), "auto");
    }
}
