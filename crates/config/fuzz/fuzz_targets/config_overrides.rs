//! Arbitrary config files and override values must be rejected, never panic.
//!
//! Run with: cargo fuzz run config_overrides

#![no_main]
use libfuzzer_sys::fuzz_target;
use resonance_config::{apply_env_overrides, Config};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // First line is an override value, the rest a config file
    let (value, file) = text.split_once('\n').unwrap_or((text, ""));

    let mut config = toml::from_str::<Config>(file).unwrap_or_default();
    for key in [
        "RESONANCE_PLAYER_PROGRESS_INTERVAL_MS",
        "RESONANCE_PLAYER_FAILURE_POLICY",
        "RESONANCE_APP_LOG_LEVEL",
        "RESONANCE_CONTENT_TRACK_SEARCH_LIMIT",
    ] {
        let _ = apply_env_overrides(&mut config, [(key.to_string(), value.to_string())]);
    }
    let _ = config.validate();
});
