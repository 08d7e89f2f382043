//! Configuration manager - main API for config operations

use crate::overrides::{apply_env_overrides, ENV_PREFIX};
use crate::persistence::ConfigPersistence;
use crate::{Config, ConfigError, ConfigResult};
use directories::ProjectDirs;
use std::path::PathBuf;

const CONFIG_FILE: &str = "config.toml";

/// Loads, saves and locates the Resonance config file
pub struct ConfigManager {
    persistence: ConfigPersistence,
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a manager for the platform config directory
    ///
    /// - Linux: `~/.config/resonance/`
    /// - macOS: `~/Library/Application Support/resonance/`
    /// - Windows: `%APPDATA%\resonance\`
    pub fn new() -> ConfigResult<Self> {
        let dirs = ProjectDirs::from("", "", "resonance").ok_or_else(|| {
            ConfigError::PathResolutionError {
                reason: "Could not determine user config directory".to_string(),
            }
        })?;

        Ok(Self::with_dirs(
            dirs.config_dir().to_path_buf(),
            dirs.data_dir().to_path_buf(),
        ))
    }

    /// Creates a manager that keeps config and data in one directory
    pub fn with_directory(dir: PathBuf) -> ConfigResult<Self> {
        Ok(Self::with_dirs(dir.clone(), dir))
    }

    fn with_dirs(config_dir: PathBuf, data_dir: PathBuf) -> Self {
        Self {
            persistence: ConfigPersistence::new(config_dir.join(CONFIG_FILE)),
            config_dir,
            data_dir,
        }
    }

    /// Returns the config directory path
    pub fn config_dir(&self) -> &PathBuf {
        &self.config_dir
    }

    /// Returns the full config file path
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Resolves the database location; relative paths live in the data dir
    pub fn database_path(&self, config: &Config) -> PathBuf {
        if config.app.database_path.is_absolute() {
            config.app.database_path.clone()
        } else {
            self.data_dir.join(&config.app.database_path)
        }
    }

    /// Loads the configuration from file
    pub fn load(&self) -> ConfigResult<Config> {
        self.persistence.load()
    }

    /// Loads the configuration, falling back to defaults on any error
    pub fn load_or_default(&self) -> Config {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config: {}, using defaults", e);
                Config::default()
            }
        }
    }

    /// Saves the configuration after validating it
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.persistence.save(config)
    }

    /// Loads, modifies and saves the configuration in one step
    ///
    /// ```rust,no_run
    /// # use resonance_config::ConfigManager;
    /// # let manager = ConfigManager::new().unwrap();
    /// manager.update(|config| {
    ///     config.player.seek_step_secs = 15;
    /// }).expect("Failed to update config");
    /// ```
    pub fn update<F>(&self, update_fn: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        update_fn(&mut config);
        self.save(&config)
    }

    /// Writes a default config file if none exists
    ///
    /// Returns Ok(true) if a new file was created.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.config_path().exists() {
            log::info!(
                "Config file already exists at {}",
                self.config_path().display()
            );
            return Ok(false);
        }

        self.persistence.write_default()?;
        Ok(true)
    }

    /// Overwrites the config file with defaults
    pub fn reset(&self) -> ConfigResult<()> {
        self.save(&Config::default())
    }

    /// Returns the validation problems of the current config file
    pub fn validate(&self) -> ConfigResult<Vec<String>> {
        let config = self.load()?;

        match config.validate() {
            Ok(()) => Ok(Vec::new()),
            Err(errors) => Ok(errors.iter().map(|e| e.to_string()).collect()),
        }
    }

    /// Loads the config file and applies `RESONANCE_SECTION_FIELD` variables
    /// from the process environment
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;
        let vars = std::env::vars().filter(|(key, _)| key.starts_with(ENV_PREFIX));
        apply_env_overrides(&mut config, vars)?;

        if let Err(errors) = config.validate() {
            return Err(ConfigError::ValidationError(
                errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            ));
        }

        Ok(config)
    }
}
