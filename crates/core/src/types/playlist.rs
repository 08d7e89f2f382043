//! Playlist domain models

use crate::types::common::entity_id;
use crate::types::{ProfileId, Timestamp, TrackId, Validator};
use serde::{Deserialize, Serialize};

entity_id!(
    /// Unique identifier for a playlist
    PlaylistId
);

/// A user-curated list of tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub user_id: ProfileId,
    pub name: String,
    pub cover_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Playlist {
    /// Creates a new empty playlist
    pub fn new(user_id: ProfileId, name: String) -> Self {
        let now = Timestamp::now();
        Self {
            id: PlaylistId::new(),
            user_id,
            name,
            cover_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Updates the playlist name
    pub fn set_name(&mut self, name: String) {
        self.name = name;
        self.updated_at = Timestamp::now();
    }
}

impl Validator for Playlist {
    fn validate(&self) -> Result<(), Vec<String>> {
        if self.name.trim().is_empty() {
            Err(vec!["Playlist name cannot be empty".to_string()])
        } else {
            Ok(())
        }
    }
}

/// A track's slot in a playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub playlist_id: PlaylistId,
    pub track_id: TrackId,
    /// Zero-based, contiguous within a playlist
    pub position: u32,
    pub added_at: Timestamp,
}

impl PlaylistEntry {
    /// Creates an entry at the given position
    pub fn new(playlist_id: PlaylistId, track_id: TrackId, position: u32) -> Self {
        Self {
            playlist_id,
            track_id,
            position,
            added_at: Timestamp::now(),
        }
    }
}
