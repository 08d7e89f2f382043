//! Playlist database operations

use super::tracks::{row_to_track, TRACK_COLUMNS};
use super::{column, id_column, timestamp};
use crate::DbPool;
use resonance_core::{
    AppError, Playlist, PlaylistEntry, PlaylistId, ProfileId, Timestamp, Track, TrackId, Validator,
};
use sqlx::sqlite::SqliteRow;

/// Creates a new playlist
pub async fn create_playlist(pool: &DbPool, playlist: &Playlist) -> Result<(), AppError> {
    playlist
        .validate()
        .map_err(|errors| AppError::validation("Playlist", errors))?;

    sqlx::query(
        r#"
        INSERT INTO playlists (id, user_id, name, cover_url, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(playlist.id.as_string())
    .bind(playlist.user_id.as_string())
    .bind(&playlist.name)
    .bind(&playlist.cover_url)
    .bind(playlist.created_at.as_millis())
    .bind(playlist.updated_at.as_millis())
    .execute(pool)
    .await
    .map_err(|e| AppError::database("Failed to create playlist", e))?;

    Ok(())
}

/// Gets a playlist by ID
pub async fn get_playlist(pool: &DbPool, id: PlaylistId) -> Result<Playlist, AppError> {
    let row = sqlx::query(
        "SELECT id, user_id, name, cover_url, created_at, updated_at FROM playlists WHERE id = ?",
    )
    .bind(id.as_string())
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::database("Failed to fetch playlist", e))?
    .ok_or_else(|| AppError::RecordNotFound {
        entity: "Playlist".to_string(),
        identifier: id.to_string(),
    })?;

    row_to_playlist(&row)
}

/// Lists a user's playlists, most recently changed first
pub async fn list_playlists(pool: &DbPool, user_id: ProfileId) -> Result<Vec<Playlist>, AppError> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, name, cover_url, created_at, updated_at
        FROM playlists
        WHERE user_id = ?
        ORDER BY updated_at DESC, rowid DESC
        "#,
    )
    .bind(user_id.as_string())
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to list playlists", e))?;

    rows.iter().map(row_to_playlist).collect()
}

/// Renames a playlist and returns it
pub async fn rename_playlist(pool: &DbPool, id: PlaylistId, name: &str) -> Result<Playlist, AppError> {
    let mut playlist = get_playlist(pool, id).await?;
    playlist.set_name(name.trim().to_string());
    playlist
        .validate()
        .map_err(|errors| AppError::validation("Playlist", errors))?;

    sqlx::query("UPDATE playlists SET name = ?, updated_at = ? WHERE id = ?")
        .bind(&playlist.name)
        .bind(playlist.updated_at.as_millis())
        .bind(id.as_string())
        .execute(pool)
        .await
        .map_err(|e| AppError::database("Failed to rename playlist", e))?;

    Ok(playlist)
}

/// Deletes a playlist and its entries
pub async fn delete_playlist(pool: &DbPool, id: PlaylistId) -> Result<(), AppError> {
    sqlx::query("DELETE FROM playlists WHERE id = ?")
        .bind(id.as_string())
        .execute(pool)
        .await
        .map_err(|e| AppError::database("Failed to delete playlist", e))?;

    Ok(())
}

/// Appends a track to the end of a playlist
pub async fn add_track_to_playlist(
    pool: &DbPool,
    playlist_id: PlaylistId,
    track_id: TrackId,
) -> Result<PlaylistEntry, AppError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::database("Failed to start transaction", e))?;

    let next: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM playlist_tracks WHERE playlist_id = ?",
    )
    .bind(playlist_id.as_string())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| AppError::database("Failed to read playlist length", e))?;

    let entry = PlaylistEntry::new(playlist_id, track_id, u32::try_from(next).unwrap_or(u32::MAX));

    sqlx::query(
        "INSERT INTO playlist_tracks (playlist_id, track_id, position, added_at) VALUES (?, ?, ?, ?)",
    )
    .bind(entry.playlist_id.as_string())
    .bind(entry.track_id.as_string())
    .bind(i64::from(entry.position))
    .bind(entry.added_at.as_millis())
    .execute(&mut *tx)
    .await
    .map_err(|e| AppError::database("Failed to add track to playlist", e))?;

    touch(&mut tx, playlist_id).await?;

    tx.commit()
        .await
        .map_err(|e| AppError::database("Failed to add track to playlist", e))?;

    Ok(entry)
}

/// Removes the first occurrence of a track.
///
/// The `playlist_tracks_close_gap` trigger renumbers the entries after it.
///
/// Returns false if the track was not in the playlist.
pub async fn remove_track_from_playlist(
    pool: &DbPool,
    playlist_id: PlaylistId,
    track_id: TrackId,
) -> Result<bool, AppError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::database("Failed to start transaction", e))?;

    let position: Option<i64> = sqlx::query_scalar(
        "SELECT MIN(position) FROM playlist_tracks WHERE playlist_id = ? AND track_id = ?",
    )
    .bind(playlist_id.as_string())
    .bind(track_id.as_string())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| AppError::database("Failed to find playlist entry", e))?;

    let Some(position) = position else {
        return Ok(false);
    };

    sqlx::query("DELETE FROM playlist_tracks WHERE playlist_id = ? AND position = ?")
        .bind(playlist_id.as_string())
        .bind(position)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database("Failed to remove track from playlist", e))?;

    touch(&mut tx, playlist_id).await?;

    tx.commit()
        .await
        .map_err(|e| AppError::database("Failed to remove track from playlist", e))?;

    Ok(true)
}

/// Gets a playlist's tracks in playlist order
pub async fn get_playlist_tracks(pool: &DbPool, playlist_id: PlaylistId) -> Result<Vec<Track>, AppError> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM tracks t
        JOIN playlist_tracks pt ON t.id = pt.track_id
        WHERE pt.playlist_id = ?
        ORDER BY pt.position
        "#,
        TRACK_COLUMNS
    ))
    .bind(playlist_id.as_string())
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to get playlist tracks", e))?;

    rows.iter().map(row_to_track).collect()
}

async fn touch(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    playlist_id: PlaylistId,
) -> Result<(), AppError> {
    sqlx::query("UPDATE playlists SET updated_at = ? WHERE id = ?")
        .bind(Timestamp::now().as_millis())
        .bind(playlist_id.as_string())
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database("Failed to update playlist", e))?;

    Ok(())
}

fn row_to_playlist(row: &SqliteRow) -> Result<Playlist, AppError> {
    Ok(Playlist {
        id: id_column(row, "id", PlaylistId::from_string)?,
        user_id: id_column(row, "user_id", ProfileId::from_string)?,
        name: column(row, "name")?,
        cover_url: column(row, "cover_url")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}
