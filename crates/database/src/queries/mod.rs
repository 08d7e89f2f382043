//! Database query operations organized by entity

pub mod albums;
pub mod history;
pub mod library;
pub mod playlists;
pub mod profiles;
pub mod tracks;

use resonance_core::{AppError, Timestamp};
use sqlx::sqlite::SqliteRow;
use sqlx::{Decode, Row, Sqlite, Type};

// Re-export commonly used query functions
pub use albums::{
    create_album, create_single, delete_album, get_album, get_album_with_tracks,
    list_albums_by_artist,
};
pub use history::{
    clear_search_history, list_recently_played, list_search_history, record_play, record_search,
    recent_tracks,
};
pub use library::{
    add_to_library, is_in_library, library_albums, library_artists, library_tracks,
    list_library_items, remove_from_library,
};
pub use playlists::{
    add_track_to_playlist, create_playlist, delete_playlist, get_playlist, get_playlist_tracks,
    list_playlists, remove_track_from_playlist, rename_playlist,
};
pub use profiles::{apply_profile_patch, create_profile, get_profile, update_profile};
pub use tracks::{
    create_track, get_track, increment_play_count, list_album_tracks, list_artist_tracks,
};

/// Reads one column, naming it in the error
pub(crate) fn column<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T, AppError>
where
    T: Decode<'r, Sqlite> + Type<Sqlite>,
{
    row.try_get(name)
        .map_err(|e| AppError::database(format!("Missing column {}", name), e))
}

/// Reads a millisecond timestamp column
pub(crate) fn timestamp(row: &SqliteRow, name: &str) -> Result<Timestamp, AppError> {
    column::<i64>(row, name).map(Timestamp::from_millis)
}

/// Parses an identifier column with the entity's `from_string`
pub(crate) fn id_column<T, E>(
    row: &SqliteRow,
    name: &str,
    parse: impl FnOnce(&str) -> Result<T, E>,
) -> Result<T, AppError>
where
    E: std::error::Error + Send + Sync + 'static,
{
    let raw: String = column(row, name)?;
    parse(&raw).map_err(|e| AppError::database(format!("Invalid identifier in {}", name), e))
}

/// Parses a nullable identifier column
pub(crate) fn optional_id_column<T, E>(
    row: &SqliteRow,
    name: &str,
    parse: impl FnOnce(&str) -> Result<T, E>,
) -> Result<Option<T>, AppError>
where
    E: std::error::Error + Send + Sync + 'static,
{
    let raw: Option<String> = column(row, name)?;
    raw.map(|raw| {
        parse(&raw).map_err(|e| AppError::database(format!("Invalid identifier in {}", name), e))
    })
    .transpose()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::connection::create_test_db;
    use crate::migrations::run_migrations;
    use crate::DbPool;
    use resonance_core::{Album, Profile, ProfilePatch, Track};

    pub async fn setup() -> DbPool {
        let pool = create_test_db().await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    pub async fn listener(pool: &DbPool, name: &str) -> Profile {
        let profile = Profile::new(Some(name.to_string()));
        super::create_profile(pool, &profile).await.unwrap();
        profile
    }

    pub async fn artist(pool: &DbPool, name: &str) -> Profile {
        let mut profile = Profile::new(Some(name.to_string()));
        profile.apply(&ProfilePatch::ArtistProfile {
            is_artist: true,
            artist_name: Some(name.to_string()),
            artist_bio: None,
        });
        super::create_profile(pool, &profile).await.unwrap();
        profile
    }

    /// Album by `artist` holding one track per title
    pub async fn album(pool: &DbPool, artist: &Profile, title: &str, tracks: &[&str]) -> (Album, Vec<Track>) {
        let album = Album::new(title.to_string(), artist.id);
        super::create_album(pool, &album).await.unwrap();

        let mut created = Vec::new();
        for name in tracks {
            let mut track = Track::new(name.to_string(), artist.id, artist.label().to_string())
                .with_duration_secs(200);
            track.album_id = Some(album.id);
            super::create_track(pool, &track).await.unwrap();
            created.push(track);
        }
        (album, created)
    }
}
