pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, ErrorSeverity, RecoveryAction, Result};
pub use types::{
    Album, AlbumId, AlbumWithTracks, AudioSource, Duration, LibraryItem, LibraryItemId,
    LibraryTarget, ParentalControls, Playlist, PlaylistEntry, PlaylistId, Profile, ProfileField,
    ProfileId, ProfilePatch, RecentlyPlayed, SearchHistoryEntry, ThemePreference, Timestamp, Track,
    TrackId, Validator,
};
