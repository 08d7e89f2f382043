//! Player configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What the player does once a track has failed to load too many times
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicySetting {
    /// Move on to the next track
    Skip,
    /// Stay on the failed track until the user retries
    Stay,
}

impl std::fmt::Display for FailurePolicySetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePolicySetting::Skip => write!(f, "skip"),
            FailurePolicySetting::Stay => write!(f, "stay"),
        }
    }
}

impl FromStr for FailurePolicySetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(FailurePolicySetting::Skip),
            "stay" => Ok(FailurePolicySetting::Stay),
            other => Err(format!("expected skip or stay, got '{}'", other)),
        }
    }
}

/// Playback behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// How often progress is refreshed while playing
    pub progress_interval_ms: u64,

    /// Duration used for simulated tracks that declare none
    pub default_track_secs: u32,

    /// Play tracks without audio in simulated mode instead of failing
    pub simulate_missing_audio: bool,

    /// Extra attempts after a track fails to load
    pub load_retry_attempts: u32,

    /// Delay before the first retry; doubles after each failure
    pub retry_initial_delay_ms: u64,

    /// What to do when retries run out
    pub failure_policy: FailurePolicySetting,

    /// Seconds moved by one seek key press
    pub seek_step_secs: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            progress_interval_ms: 100,
            default_track_secs: 180,
            simulate_missing_audio: true,
            load_retry_attempts: 2,
            retry_initial_delay_ms: 500,
            failure_policy: FailurePolicySetting::Skip,
            seek_step_secs: 10,
        }
    }
}

impl ConfigSection for PlayerConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::in_range(
                self.progress_interval_ms,
                16,
                1000,
                "player.progress_interval_ms",
            ),
            Validator::in_range(self.default_track_secs, 1, 3600, "player.default_track_secs"),
            Validator::in_range(self.load_retry_attempts, 0, 10, "player.load_retry_attempts"),
            Validator::in_range(
                self.retry_initial_delay_ms,
                10,
                60_000,
                "player.retry_initial_delay_ms",
            ),
            Validator::in_range(self.seek_step_secs, 1, 120, "player.seek_step_secs"),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.progress_interval_ms = other.progress_interval_ms;
        self.default_track_secs = other.default_track_secs;
        self.simulate_missing_audio = other.simulate_missing_audio;
        self.load_retry_attempts = other.load_retry_attempts;
        self.retry_initial_delay_ms = other.retry_initial_delay_ms;
        self.failure_policy = other.failure_policy;
        self.seek_step_secs = other.seek_step_secs;
    }

    fn section_name(&self) -> &'static str {
        "player"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = PlayerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.progress_interval_ms, 100);
        assert_eq!(config.default_track_secs, 180);
    }

    #[test]
    fn test_progress_interval_bounds() {
        let mut config = PlayerConfig::default();
        config.progress_interval_ms = 15;
        assert!(config.validate().is_err());
        config.progress_interval_ms = 1001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_multiple_validation_errors() {
        let config = PlayerConfig {
            default_track_secs: 0,
            load_retry_attempts: 11,
            seek_step_secs: 0,
            ..Default::default()
        };

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_merge() {
        let mut base = PlayerConfig::default();
        let other = PlayerConfig {
            failure_policy: FailurePolicySetting::Stay,
            simulate_missing_audio: false,
            ..Default::default()
        };

        base.merge(other);
        assert_eq!(base.failure_policy, FailurePolicySetting::Stay);
        assert!(!base.simulate_missing_audio);
    }

    #[test]
    fn test_failure_policy_parse() {
        assert_eq!("Stay".parse(), Ok(FailurePolicySetting::Stay));
        assert!("retry".parse::<FailurePolicySetting>().is_err());
    }
}
