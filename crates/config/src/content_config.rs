//! Content, search and auto-save configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Settings for the content store collaborators
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContentConfig {
    /// Idle time before profile text edits are saved
    pub profile_autosave_ms: u64,

    /// Idle time before an avatar change is saved
    pub avatar_autosave_ms: u64,

    /// Idle time before a typed search runs
    pub search_debounce_ms: u64,

    /// Maximum tracks returned by a search
    pub track_search_limit: u32,

    /// Maximum albums returned by a search
    pub album_search_limit: u32,

    /// Maximum artists returned by a search
    pub artist_search_limit: u32,

    /// How many past searches are listed
    pub search_history_limit: u32,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            profile_autosave_ms: 1000,
            avatar_autosave_ms: 500,
            search_debounce_ms: 500,
            track_search_limit: 20,
            album_search_limit: 10,
            artist_search_limit: 10,
            search_history_limit: 10,
        }
    }
}

impl ConfigSection for ContentConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::in_range(
                self.profile_autosave_ms,
                0,
                10_000,
                "content.profile_autosave_ms",
            ),
            Validator::in_range(self.avatar_autosave_ms, 0, 10_000, "content.avatar_autosave_ms"),
            Validator::in_range(self.search_debounce_ms, 0, 10_000, "content.search_debounce_ms"),
            Validator::in_range(self.track_search_limit, 1, 100, "content.track_search_limit"),
            Validator::in_range(self.album_search_limit, 1, 100, "content.album_search_limit"),
            Validator::in_range(self.artist_search_limit, 1, 100, "content.artist_search_limit"),
            Validator::in_range(
                self.search_history_limit,
                1,
                100,
                "content.search_history_limit",
            ),
        ])
    }

    fn merge(&mut self, other: Self) {
        *self = other;
    }

    fn section_name(&self) -> &'static str {
        "content"
    }
}
