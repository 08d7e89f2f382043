//! Saved library items and listening history

use crate::types::common::entity_id;
use crate::types::{AlbumId, ProfileId, Timestamp, TrackId};
use serde::{Deserialize, Serialize};

entity_id!(
    /// Unique identifier for a library entry
    LibraryItemId
);

/// What a library entry points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LibraryTarget {
    Track(TrackId),
    Album(AlbumId),
    Artist(ProfileId),
}

impl LibraryTarget {
    /// Short kind label, as stored and displayed
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Track(_) => "track",
            Self::Album(_) => "album",
            Self::Artist(_) => "artist",
        }
    }

    /// Identifier of the referenced entity as a string
    pub fn target_id(&self) -> String {
        match self {
            Self::Track(id) => id.as_string(),
            Self::Album(id) => id.as_string(),
            Self::Artist(id) => id.as_string(),
        }
    }
}

/// Something a user saved to their library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryItem {
    pub id: LibraryItemId,
    pub user_id: ProfileId,
    pub target: LibraryTarget,
    pub added_at: Timestamp,
}

impl LibraryItem {
    pub fn new(user_id: ProfileId, target: LibraryTarget) -> Self {
        Self {
            id: LibraryItemId::new(),
            user_id,
            target,
            added_at: Timestamp::now(),
        }
    }
}

/// One play recorded in a user's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentlyPlayed {
    pub user_id: ProfileId,
    pub track_id: Option<TrackId>,
    pub album_id: Option<AlbumId>,
    pub played_at: Timestamp,
}

/// A search query a user submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
    pub user_id: ProfileId,
    pub query: String,
    pub searched_at: Timestamp,
}
