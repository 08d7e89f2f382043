//! Album domain model

use crate::types::common::entity_id;
use crate::types::{ProfileId, Timestamp, Track, Validator};
use serde::{Deserialize, Serialize};

entity_id!(
    /// Unique identifier for an album
    AlbumId
);

/// An album or single released by an artist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub artist_id: ProfileId,
    pub title: String,
    pub cover_url: Option<String>,
    /// Singles hold exactly one track
    pub is_single: bool,
    pub created_at: Timestamp,
}

impl Album {
    /// Creates a new album
    pub fn new(title: String, artist_id: ProfileId) -> Self {
        Self {
            id: AlbumId::new(),
            artist_id,
            title,
            cover_url: None,
            is_single: false,
            created_at: Timestamp::now(),
        }
    }

    /// Creates a single and its one track, which inherits the album's title and cover
    pub fn new_single(mut track: Track, cover_url: Option<String>) -> (Self, Track) {
        let album = Self {
            id: AlbumId::new(),
            artist_id: track.artist_id,
            title: track.title.clone(),
            cover_url: cover_url.clone(),
            is_single: true,
            created_at: Timestamp::now(),
        };

        track.album_id = Some(album.id);
        if track.cover_url.is_none() {
            track.cover_url = cover_url;
        }

        (album, track)
    }
}

impl Validator for Album {
    fn validate(&self) -> Result<(), Vec<String>> {
        if self.title.trim().is_empty() {
            Err(vec!["Album title cannot be empty".to_string()])
        } else {
            Ok(())
        }
    }
}

/// Album with its tracks in release order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumWithTracks {
    pub album: Album,
    pub tracks: Vec<Track>,
}

impl AlbumWithTracks {
    /// Total declared running time in seconds
    pub fn total_duration_secs(&self) -> u64 {
        self.tracks.iter().map(|t| u64::from(t.duration_secs)).sum()
    }

    /// Returns true if any track is marked explicit
    pub fn has_explicit(&self) -> bool {
        self.tracks.iter().any(|t| t.is_explicit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_single_links_track() {
        let artist = ProfileId::new();
        let track = Track::new("Lanterns".to_string(), artist, "Vela".to_string());
        let (album, track) = Album::new_single(track, Some("cover.png".to_string()));

        assert!(album.is_single);
        assert_eq!(album.title, "Lanterns");
        assert_eq!(album.artist_id, artist);
        assert_eq!(track.album_id, Some(album.id));
        assert_eq!(track.cover_url.as_deref(), Some("cover.png"));
    }

    #[test]
    fn test_album_validation() {
        assert!(Album::new("Tides".to_string(), ProfileId::new()).is_valid());
        assert!(!Album::new("".to_string(), ProfileId::new()).is_valid());
    }

    #[test]
    fn test_album_with_tracks_totals() {
        let artist = ProfileId::new();
        let album = Album::new("Tides".to_string(), artist);
        let tracks = vec![
            Track::new("One".to_string(), artist, "Vela".to_string()).with_duration_secs(200),
            Track::new("Two".to_string(), artist, "Vela".to_string())
                .with_duration_secs(150)
                .explicit(),
        ];
        let full = AlbumWithTracks { album, tracks };

        assert_eq!(full.total_duration_secs(), 350);
        assert!(full.has_explicit());
    }
}
