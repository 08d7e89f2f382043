//! Track database operations

use super::{column, id_column, optional_id_column, timestamp};
use crate::DbPool;
use resonance_core::{AlbumId, AppError, AudioSource, ProfileId, Track, TrackId, Validator};
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Sqlite};

pub(crate) const TRACK_COLUMNS: &str = "t.id, t.album_id, t.artist_id, t.title, t.artist_name, \
     t.audio_url, t.cover_url, t.duration_secs, t.is_explicit, t.has_music_video, \
     t.music_video_url, t.play_count, t.created_at";

/// Creates a new track; its album, if any, must already exist
pub async fn create_track(pool: &DbPool, track: &Track) -> Result<(), AppError> {
    insert_track(pool, track).await
}

pub(crate) async fn insert_track<'e, E>(executor: E, track: &Track) -> Result<(), AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    track
        .validate()
        .map_err(|errors| AppError::validation("Track", errors))?;

    sqlx::query(
        r#"
        INSERT INTO tracks (
            id, album_id, artist_id, title, artist_name, audio_url, cover_url, duration_secs,
            is_explicit, has_music_video, music_video_url, play_count, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(track.id.as_string())
    .bind(track.album_id.map(|id| id.as_string()))
    .bind(track.artist_id.as_string())
    .bind(&track.title)
    .bind(&track.artist_name)
    .bind(track.audio_source.as_ref().map(|s| s.reference()))
    .bind(&track.cover_url)
    .bind(i64::from(track.duration_secs))
    .bind(track.is_explicit)
    .bind(track.has_music_video)
    .bind(&track.music_video_url)
    .bind(track.play_count as i64)
    .bind(track.created_at.as_millis())
    .execute(executor)
    .await
    .map_err(|e| AppError::database("Failed to create track", e))?;

    Ok(())
}

/// Gets a track by ID
pub async fn get_track(pool: &DbPool, id: TrackId) -> Result<Track, AppError> {
    let row = sqlx::query(&format!("SELECT {} FROM tracks t WHERE t.id = ?", TRACK_COLUMNS))
        .bind(id.as_string())
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::database("Failed to fetch track", e))?
        .ok_or_else(|| AppError::RecordNotFound {
            entity: "Track".to_string(),
            identifier: id.to_string(),
        })?;

    row_to_track(&row)
}

/// Lists an album's tracks in the order they were added
pub async fn list_album_tracks(pool: &DbPool, album_id: AlbumId) -> Result<Vec<Track>, AppError> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM tracks t WHERE t.album_id = ? ORDER BY t.created_at, t.rowid",
        TRACK_COLUMNS
    ))
    .bind(album_id.as_string())
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to list album tracks", e))?;

    rows.iter().map(row_to_track).collect()
}

/// Lists an artist's tracks, most played first
pub async fn list_artist_tracks(pool: &DbPool, artist_id: ProfileId) -> Result<Vec<Track>, AppError> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM tracks t WHERE t.artist_id = ? ORDER BY t.play_count DESC, t.created_at DESC",
        TRACK_COLUMNS
    ))
    .bind(artist_id.as_string())
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to list artist tracks", e))?;

    rows.iter().map(row_to_track).collect()
}

/// Adds one play to a track's counter
pub async fn increment_play_count(pool: &DbPool, id: TrackId) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE tracks SET play_count = play_count + 1 WHERE id = ?")
        .bind(id.as_string())
        .execute(pool)
        .await
        .map_err(|e| AppError::database("Failed to update play count", e))?;

    if result.rows_affected() == 0 {
        return Err(AppError::RecordNotFound {
            entity: "Track".to_string(),
            identifier: id.to_string(),
        });
    }

    Ok(())
}

pub(crate) fn row_to_track(row: &SqliteRow) -> Result<Track, AppError> {
    let audio_url: Option<String> = column(row, "audio_url")?;
    let duration_secs: i64 = column(row, "duration_secs")?;
    let play_count: i64 = column(row, "play_count")?;

    Ok(Track {
        id: id_column(row, "id", TrackId::from_string)?,
        album_id: optional_id_column(row, "album_id", AlbumId::from_string)?,
        artist_id: id_column(row, "artist_id", ProfileId::from_string)?,
        title: column(row, "title")?,
        artist_name: column(row, "artist_name")?,
        audio_source: audio_url.as_deref().and_then(AudioSource::parse),
        cover_url: column(row, "cover_url")?,
        duration_secs: u32::try_from(duration_secs).unwrap_or(0),
        is_explicit: column(row, "is_explicit")?,
        has_music_video: column(row, "has_music_video")?,
        music_video_url: column(row, "music_video_url")?,
        play_count: u64::try_from(play_count).unwrap_or(0),
        created_at: timestamp(row, "created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::fixtures::{album, artist, setup};
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_create_and_get_track() {
        let pool = setup().await;
        let vela = artist(&pool, "Vela").await;

        let track = Track::new("Lanterns".to_string(), vela.id, "Vela".to_string())
            .with_source(AudioSource::File(PathBuf::from("/music/lanterns.flac")))
            .with_duration_secs(241)
            .explicit();
        create_track(&pool, &track).await.unwrap();

        let stored = get_track(&pool, track.id).await.unwrap();
        assert_eq!(stored, track);
    }

    #[tokio::test]
    async fn test_track_needs_existing_album() {
        let pool = setup().await;
        let vela = artist(&pool, "Vela").await;

        let mut track = Track::new("Orphan".to_string(), vela.id, "Vela".to_string());
        track.album_id = Some(AlbumId::new());

        assert!(create_track(&pool, &track).await.is_err());
    }

    #[tokio::test]
    async fn test_album_tracks_in_insert_order() {
        let pool = setup().await;
        let vela = artist(&pool, "Vela").await;
        let (tides, tracks) = album(&pool, &vela, "Tides", &["One", "Two", "Three"]).await;

        let listed = list_album_tracks(&pool, tides.id).await.unwrap();
        assert_eq!(listed, tracks);
    }

    #[tokio::test]
    async fn test_increment_play_count() {
        let pool = setup().await;
        let vela = artist(&pool, "Vela").await;
        let (_, tracks) = album(&pool, &vela, "Tides", &["One", "Two"]).await;

        increment_play_count(&pool, tracks[1].id).await.unwrap();
        increment_play_count(&pool, tracks[1].id).await.unwrap();

        assert_eq!(get_track(&pool, tracks[1].id).await.unwrap().play_count, 2);
        let by_artist = list_artist_tracks(&pool, vela.id).await.unwrap();
        assert_eq!(by_artist[0].id, tracks[1].id);

        assert!(increment_play_count(&pool, TrackId::new()).await.is_err());
    }
}
