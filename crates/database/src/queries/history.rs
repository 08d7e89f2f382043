//! Listening and search history

use super::tracks::{row_to_track, TRACK_COLUMNS};
use super::{column, id_column, optional_id_column, timestamp};
use crate::DbPool;
use resonance_core::{
    AlbumId, AppError, ProfileId, RecentlyPlayed, SearchHistoryEntry, Track, TrackId,
};

/// Records one play in a user's history
pub async fn record_play(pool: &DbPool, play: &RecentlyPlayed) -> Result<(), AppError> {
    if play.track_id.is_none() && play.album_id.is_none() {
        return Err(AppError::InvalidArgument {
            argument: "play".to_string(),
            reason: "A play must reference a track or an album".to_string(),
        });
    }

    sqlx::query(
        "INSERT INTO recently_played (user_id, track_id, album_id, played_at) VALUES (?, ?, ?, ?)",
    )
    .bind(play.user_id.as_string())
    .bind(play.track_id.map(|id| id.as_string()))
    .bind(play.album_id.map(|id| id.as_string()))
    .bind(play.played_at.as_millis())
    .execute(pool)
    .await
    .map_err(|e| AppError::database("Failed to record play", e))?;

    Ok(())
}

/// Lists a user's latest plays, newest first
pub async fn list_recently_played(
    pool: &DbPool,
    user_id: ProfileId,
    limit: u32,
) -> Result<Vec<RecentlyPlayed>, AppError> {
    let rows = sqlx::query(
        r#"
        SELECT user_id, track_id, album_id, played_at
        FROM recently_played
        WHERE user_id = ?
        ORDER BY played_at DESC, rowid DESC
        LIMIT ?
        "#,
    )
    .bind(user_id.as_string())
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to list recent plays", e))?;

    rows.iter()
        .map(|row| {
            Ok(RecentlyPlayed {
                user_id: id_column(row, "user_id", ProfileId::from_string)?,
                track_id: optional_id_column(row, "track_id", TrackId::from_string)?,
                album_id: optional_id_column(row, "album_id", AlbumId::from_string)?,
                played_at: timestamp(row, "played_at")?,
            })
        })
        .collect()
}

/// Tracks from a user's latest plays, newest first.
///
/// A track played several times appears once, at its latest play.
pub async fn recent_tracks(pool: &DbPool, user_id: ProfileId, limit: u32) -> Result<Vec<Track>, AppError> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM tracks t
        JOIN (
            SELECT track_id, MAX(played_at) AS last_played, MAX(rowid) AS last_row
            FROM recently_played
            WHERE user_id = ? AND track_id IS NOT NULL
            GROUP BY track_id
        ) rp ON rp.track_id = t.id
        ORDER BY rp.last_played DESC, rp.last_row DESC
        LIMIT ?
        "#,
        TRACK_COLUMNS
    ))
    .bind(user_id.as_string())
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to list recent tracks", e))?;

    rows.iter().map(row_to_track).collect()
}

/// Records a submitted search; blank queries are ignored
pub async fn record_search(pool: &DbPool, entry: &SearchHistoryEntry) -> Result<(), AppError> {
    let query = entry.query.trim();
    if query.is_empty() {
        return Ok(());
    }

    sqlx::query("INSERT INTO search_history (user_id, query, searched_at) VALUES (?, ?, ?)")
        .bind(entry.user_id.as_string())
        .bind(query)
        .bind(entry.searched_at.as_millis())
        .execute(pool)
        .await
        .map_err(|e| AppError::database("Failed to record search", e))?;

    Ok(())
}

/// Lists a user's latest searches, newest first
pub async fn list_search_history(
    pool: &DbPool,
    user_id: ProfileId,
    limit: u32,
) -> Result<Vec<SearchHistoryEntry>, AppError> {
    let rows = sqlx::query(
        r#"
        SELECT user_id, query, searched_at
        FROM search_history
        WHERE user_id = ?
        ORDER BY searched_at DESC, rowid DESC
        LIMIT ?
        "#,
    )
    .bind(user_id.as_string())
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to list search history", e))?;

    rows.iter()
        .map(|row| {
            Ok(SearchHistoryEntry {
                user_id: id_column(row, "user_id", ProfileId::from_string)?,
                query: column(row, "query")?,
                searched_at: timestamp(row, "searched_at")?,
            })
        })
        .collect()
}

/// Deletes a user's search history and returns how many entries went
pub async fn clear_search_history(pool: &DbPool, user_id: ProfileId) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM search_history WHERE user_id = ?")
        .bind(user_id.as_string())
        .execute(pool)
        .await
        .map_err(|e| AppError::database("Failed to clear search history", e))?;

    Ok(result.rows_affected())
}
