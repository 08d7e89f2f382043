//! Saved library items

use super::albums::{row_to_album, ALBUM_COLUMNS};
use super::profiles::{row_to_profile, PROFILE_COLUMNS};
use super::tracks::{row_to_track, TRACK_COLUMNS};
use super::{column, id_column, optional_id_column, timestamp};
use crate::DbPool;
use resonance_core::{
    Album, AlbumId, AppError, LibraryItem, LibraryItemId, LibraryTarget, Profile, ProfileId, Track,
    TrackId,
};
use sqlx::sqlite::SqliteRow;

/// Column holding the target id for each kind of library entry
fn target_column(target: &LibraryTarget) -> &'static str {
    match target {
        LibraryTarget::Track(_) => "track_id",
        LibraryTarget::Album(_) => "album_id",
        LibraryTarget::Artist(_) => "artist_id",
    }
}

/// Saves an item to a user's library.
///
/// Returns false if it was already saved.
pub async fn add_to_library(pool: &DbPool, item: &LibraryItem) -> Result<bool, AppError> {
    let sql = format!(
        "INSERT OR IGNORE INTO library_items (id, user_id, {}, added_at) VALUES (?, ?, ?, ?)",
        target_column(&item.target)
    );

    let result = sqlx::query(&sql)
        .bind(item.id.as_string())
        .bind(item.user_id.as_string())
        .bind(item.target.target_id())
        .bind(item.added_at.as_millis())
        .execute(pool)
        .await
        .map_err(|e| AppError::database("Failed to add to library", e))?;

    Ok(result.rows_affected() > 0)
}

/// Removes an item from a user's library; returns false if it was not saved
pub async fn remove_from_library(
    pool: &DbPool,
    user_id: ProfileId,
    target: &LibraryTarget,
) -> Result<bool, AppError> {
    let sql = format!(
        "DELETE FROM library_items WHERE user_id = ? AND {} = ?",
        target_column(target)
    );

    let result = sqlx::query(&sql)
        .bind(user_id.as_string())
        .bind(target.target_id())
        .execute(pool)
        .await
        .map_err(|e| AppError::database("Failed to remove from library", e))?;

    Ok(result.rows_affected() > 0)
}

/// Returns true if the user saved this item
pub async fn is_in_library(
    pool: &DbPool,
    user_id: ProfileId,
    target: &LibraryTarget,
) -> Result<bool, AppError> {
    let sql = format!(
        "SELECT COUNT(*) FROM library_items WHERE user_id = ? AND {} = ?",
        target_column(target)
    );

    let count: i64 = sqlx::query_scalar(&sql)
        .bind(user_id.as_string())
        .bind(target.target_id())
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::database("Failed to check library", e))?;

    Ok(count > 0)
}

/// Lists every library entry of a user, newest first
pub async fn list_library_items(pool: &DbPool, user_id: ProfileId) -> Result<Vec<LibraryItem>, AppError> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, track_id, album_id, artist_id, added_at
        FROM library_items
        WHERE user_id = ?
        ORDER BY added_at DESC, rowid DESC
        "#,
    )
    .bind(user_id.as_string())
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to list library", e))?;

    rows.iter().map(row_to_item).collect()
}

/// Saved tracks, newest first
pub async fn library_tracks(pool: &DbPool, user_id: ProfileId) -> Result<Vec<Track>, AppError> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM library_items li
        JOIN tracks t ON t.id = li.track_id
        WHERE li.user_id = ?
        ORDER BY li.added_at DESC, li.rowid DESC
        "#,
        TRACK_COLUMNS
    ))
    .bind(user_id.as_string())
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to list library tracks", e))?;

    rows.iter().map(row_to_track).collect()
}

/// Saved albums, newest first
pub async fn library_albums(pool: &DbPool, user_id: ProfileId) -> Result<Vec<Album>, AppError> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM library_items li
        JOIN albums a ON a.id = li.album_id
        WHERE li.user_id = ?
        ORDER BY li.added_at DESC, li.rowid DESC
        "#,
        ALBUM_COLUMNS
    ))
    .bind(user_id.as_string())
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to list library albums", e))?;

    rows.iter().map(row_to_album).collect()
}

/// Followed artists, newest first
pub async fn library_artists(pool: &DbPool, user_id: ProfileId) -> Result<Vec<Profile>, AppError> {
    // Profile columns are unqualified; the subquery exposes no clashing names
    let rows = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM profiles
        JOIN (
            SELECT artist_id, added_at AS saved_at, rowid AS saved_row
            FROM library_items
            WHERE user_id = ? AND artist_id IS NOT NULL
        ) li ON li.artist_id = profiles.id
        ORDER BY li.saved_at DESC, li.saved_row DESC
        "#,
        PROFILE_COLUMNS
    ))
    .bind(user_id.as_string())
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to list library artists", e))?;

    rows.iter().map(row_to_profile).collect()
}

fn row_to_item(row: &SqliteRow) -> Result<LibraryItem, AppError> {
    let track = optional_id_column(row, "track_id", TrackId::from_string)?;
    let album = optional_id_column(row, "album_id", AlbumId::from_string)?;
    let artist = optional_id_column(row, "artist_id", ProfileId::from_string)?;

    let target = match (track, album, artist) {
        (Some(id), None, None) => LibraryTarget::Track(id),
        (None, Some(id), None) => LibraryTarget::Album(id),
        (None, None, Some(id)) => LibraryTarget::Artist(id),
        _ => {
            let id: String = column(row, "id")?;
            return Err(AppError::InternalError {
                message: format!("Library item {} must reference exactly one entity", id),
            });
        }
    };

    Ok(LibraryItem {
        id: id_column(row, "id", LibraryItemId::from_string)?,
        user_id: id_column(row, "user_id", ProfileId::from_string)?,
        target,
        added_at: timestamp(row, "added_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::fixtures::{album, artist, listener, setup};

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let pool = setup().await;
        let sam = listener(&pool, "Sam").await;
        let vela = artist(&pool, "Vela").await;

        let target = LibraryTarget::Artist(vela.id);
        assert!(add_to_library(&pool, &LibraryItem::new(sam.id, target)).await.unwrap());
        assert!(!add_to_library(&pool, &LibraryItem::new(sam.id, target)).await.unwrap());

        assert_eq!(list_library_items(&pool, sam.id).await.unwrap().len(), 1);
        assert!(is_in_library(&pool, sam.id, &target).await.unwrap());
    }

    #[tokio::test]
    async fn test_lists_by_kind() {
        let pool = setup().await;
        let sam = listener(&pool, "Sam").await;
        let vela = artist(&pool, "Vela").await;
        let (tides, tracks) = album(&pool, &vela, "Tides", &["One", "Two"]).await;

        for target in [
            LibraryTarget::Track(tracks[1].id),
            LibraryTarget::Album(tides.id),
            LibraryTarget::Artist(vela.id),
        ] {
            add_to_library(&pool, &LibraryItem::new(sam.id, target)).await.unwrap();
        }

        assert_eq!(library_tracks(&pool, sam.id).await.unwrap(), vec![tracks[1].clone()]);
        assert_eq!(library_albums(&pool, sam.id).await.unwrap(), vec![tides]);
        assert_eq!(library_artists(&pool, sam.id).await.unwrap(), vec![vela]);

        let kinds: Vec<_> = list_library_items(&pool, sam.id)
            .await
            .unwrap()
            .iter()
            .map(|i| i.target.kind())
            .collect();
        assert_eq!(kinds, vec!["artist", "album", "track"]);
    }

    #[tokio::test]
    async fn test_remove_from_library() {
        let pool = setup().await;
        let sam = listener(&pool, "Sam").await;
        let vela = artist(&pool, "Vela").await;
        let (tides, _) = album(&pool, &vela, "Tides", &[]).await;

        let target = LibraryTarget::Album(tides.id);
        add_to_library(&pool, &LibraryItem::new(sam.id, target)).await.unwrap();

        assert!(remove_from_library(&pool, sam.id, &target).await.unwrap());
        assert!(!remove_from_library(&pool, sam.id, &target).await.unwrap());
        assert!(!is_in_library(&pool, sam.id, &target).await.unwrap());
    }
}
