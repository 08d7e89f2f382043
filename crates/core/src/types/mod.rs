//! Domain types for Resonance
//!
//! - `track`: Tracks and their audio sources
//! - `album`: Albums and singles
//! - `playlist`: Playlists and their entries
//! - `profile`: Profiles, parental controls and settings edits
//! - `library`: Saved library items and listening history
//! - `common`: Shared traits and utilities

mod album;
mod common;
mod library;
mod playlist;
mod profile;
mod track;

pub use album::{Album, AlbumId, AlbumWithTracks};
pub use common::{Duration, Timestamp, Validator};
pub use library::{LibraryItem, LibraryItemId, LibraryTarget, RecentlyPlayed, SearchHistoryEntry};
pub use playlist::{Playlist, PlaylistEntry, PlaylistId};
pub use profile::{
    ParentalControls, Profile, ProfileField, ProfileId, ProfilePatch, ThemePreference,
    MAX_PIN_LENGTH, MIN_PIN_LENGTH,
};
pub use track::{AudioSource, Track, TrackId};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_ids_are_exported() {
        let _track_id: TrackId = TrackId::new();
        let _album_id: AlbumId = AlbumId::new();
        let _playlist_id: PlaylistId = PlaylistId::new();
        let _profile_id: ProfileId = ProfileId::new();
        let _library_id: LibraryItemId = LibraryItemId::new();
    }

    #[test]
    fn test_duration_formatting() {
        let d = Duration::from_seconds(3665);
        assert_eq!(d.to_string(), "61:05");
    }
}
