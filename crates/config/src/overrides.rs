//! `RESONANCE_SECTION_FIELD=value` overrides on top of the config file

use crate::{Config, ConfigError, ConfigResult};
use std::path::PathBuf;

/// Prefix shared by every override variable
pub const ENV_PREFIX: &str = "RESONANCE_";

fn parse<T: std::str::FromStr>(value: &str) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| e.to_string())
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("expected a boolean, got '{}'", other)),
    }
}

/// Sets one setting addressed as `section.field`.
///
/// Returns `Ok(false)` when no such setting exists.
pub fn set_value(config: &mut Config, path: &str, value: &str) -> Result<bool, String> {
    match path {
        "app.database_path" => config.app.database_path = PathBuf::from(value),
        "app.log_level" => config.app.log_level = parse(value)?,
        "app.debug_mode" => config.app.debug_mode = parse_bool(value)?,
        "app.color" => config.app.color = parse(value)?,
        "app.active_profile" => {
            config.app.active_profile = Some(value.trim().to_string()).filter(|v| !v.is_empty())
        }
        "app.max_recent_tracks" => config.app.max_recent_tracks = parse(value)?,

        "player.progress_interval_ms" => config.player.progress_interval_ms = parse(value)?,
        "player.default_track_secs" => config.player.default_track_secs = parse(value)?,
        "player.simulate_missing_audio" => {
            config.player.simulate_missing_audio = parse_bool(value)?
        }
        "player.load_retry_attempts" => config.player.load_retry_attempts = parse(value)?,
        "player.retry_initial_delay_ms" => config.player.retry_initial_delay_ms = parse(value)?,
        "player.failure_policy" => config.player.failure_policy = parse(value)?,
        "player.seek_step_secs" => config.player.seek_step_secs = parse(value)?,

        "content.profile_autosave_ms" => config.content.profile_autosave_ms = parse(value)?,
        "content.avatar_autosave_ms" => config.content.avatar_autosave_ms = parse(value)?,
        "content.search_debounce_ms" => config.content.search_debounce_ms = parse(value)?,
        "content.track_search_limit" => config.content.track_search_limit = parse(value)?,
        "content.album_search_limit" => config.content.album_search_limit = parse(value)?,
        "content.artist_search_limit" => config.content.artist_search_limit = parse(value)?,
        "content.search_history_limit" => config.content.search_history_limit = parse(value)?,

        _ => return Ok(false),
    }
    Ok(true)
}

/// Maps `RESONANCE_PLAYER_SEEK_STEP_SECS` to `player.seek_step_secs`
fn env_key_to_path(key: &str) -> Option<String> {
    let rest = key.strip_prefix(ENV_PREFIX)?.to_ascii_lowercase();
    let (section, field) = rest.split_once('_')?;
    Some(format!("{}.{}", section, field))
}

/// Applies every `RESONANCE_*` variable in `vars`.
///
/// Unknown names are logged and skipped; unparsable values are errors.
/// Returns the paths that were applied.
pub fn apply_env_overrides<I>(config: &mut Config, vars: I) -> ConfigResult<Vec<String>>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut applied = Vec::new();

    for (key, value) in vars {
        let Some(path) = env_key_to_path(&key) else {
            continue;
        };

        match set_value(config, &path, &value) {
            Ok(true) => {
                log::info!("Config override from {}: {} = {}", key, path, value);
                applied.push(path);
            }
            Ok(false) => log::warn!("Ignoring unknown config override {}", key),
            Err(reason) => {
                return Err(ConfigError::InvalidOverride { key, value, reason });
            }
        }
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FailurePolicySetting;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_env_key_to_path() {
        assert_eq!(
            env_key_to_path("RESONANCE_PLAYER_SEEK_STEP_SECS").as_deref(),
            Some("player.seek_step_secs")
        );
        assert_eq!(env_key_to_path("HOME"), None);
        assert_eq!(env_key_to_path("RESONANCE_"), None);
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        let applied = apply_env_overrides(
            &mut config,
            vars(&[
                ("RESONANCE_PLAYER_FAILURE_POLICY", "stay"),
                ("RESONANCE_APP_DEBUG_MODE", "yes"),
                ("RESONANCE_CONTENT_TRACK_SEARCH_LIMIT", "5"),
                ("PATH", "/usr/bin"),
                ("RESONANCE_PLAYER_VOLUME", "11"),
            ]),
        )
        .unwrap();

        assert_eq!(applied.len(), 3);
        assert_eq!(config.player.failure_policy, FailurePolicySetting::Stay);
        assert!(config.app.debug_mode);
        assert_eq!(config.content.track_search_limit, 5);
    }

    #[test]
    fn test_bad_value_is_an_error() {
        let mut config = Config::default();
        let result = apply_env_overrides(
            &mut config,
            vars(&[("RESONANCE_PLAYER_PROGRESS_INTERVAL_MS", "fast")]),
        );
        assert!(matches!(result, Err(ConfigError::InvalidOverride { .. })));
    }

    #[test]
    fn test_blank_active_profile_clears_it() {
        let mut config = Config::default();
        config.app.active_profile = Some("67e55044-10b1-426f-9247-bb680e5fe0c8".to_string());
        assert_eq!(set_value(&mut config, "app.active_profile", " "), Ok(true));
        assert_eq!(config.app.active_profile, None);
    }
}
