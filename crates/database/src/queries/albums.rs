//! Album database operations

use super::tracks::{insert_track, list_album_tracks};
use super::{column, id_column, timestamp};
use crate::DbPool;
use resonance_core::{Album, AlbumId, AlbumWithTracks, AppError, ProfileId, Track, Validator};
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Sqlite};

pub(crate) const ALBUM_COLUMNS: &str = "a.id, a.artist_id, a.title, a.cover_url, a.is_single, a.created_at";

/// Creates a new album
pub async fn create_album(pool: &DbPool, album: &Album) -> Result<(), AppError> {
    insert_album(pool, album).await
}

/// Creates a single: the album row and its one track, atomically
pub async fn create_single(pool: &DbPool, album: &Album, track: &Track) -> Result<(), AppError> {
    if !album.is_single || track.album_id != Some(album.id) {
        return Err(AppError::InvalidArgument {
            argument: "single".to_string(),
            reason: "A single must be flagged as such and own its track".to_string(),
        });
    }

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::database("Failed to start transaction", e))?;

    insert_album(&mut *tx, album).await?;
    insert_track(&mut *tx, track).await?;

    tx.commit()
        .await
        .map_err(|e| AppError::database("Failed to create single", e))?;

    Ok(())
}

async fn insert_album<'e, E>(executor: E, album: &Album) -> Result<(), AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    album
        .validate()
        .map_err(|errors| AppError::validation("Album", errors))?;

    sqlx::query(
        "INSERT INTO albums (id, artist_id, title, cover_url, is_single, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(album.id.as_string())
    .bind(album.artist_id.as_string())
    .bind(&album.title)
    .bind(&album.cover_url)
    .bind(album.is_single)
    .bind(album.created_at.as_millis())
    .execute(executor)
    .await
    .map_err(|e| AppError::database("Failed to create album", e))?;

    Ok(())
}

/// Gets an album by ID
pub async fn get_album(pool: &DbPool, id: AlbumId) -> Result<Album, AppError> {
    let row = sqlx::query(&format!("SELECT {} FROM albums a WHERE a.id = ?", ALBUM_COLUMNS))
        .bind(id.as_string())
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::database("Failed to fetch album", e))?
        .ok_or_else(|| AppError::RecordNotFound {
            entity: "Album".to_string(),
            identifier: id.to_string(),
        })?;

    row_to_album(&row)
}

/// Gets an album together with its tracks
pub async fn get_album_with_tracks(pool: &DbPool, id: AlbumId) -> Result<AlbumWithTracks, AppError> {
    let album = get_album(pool, id).await?;
    let tracks = list_album_tracks(pool, id).await?;
    Ok(AlbumWithTracks { album, tracks })
}

/// Lists an artist's albums, newest first
pub async fn list_albums_by_artist(pool: &DbPool, artist_id: ProfileId) -> Result<Vec<Album>, AppError> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM albums a WHERE a.artist_id = ? ORDER BY a.created_at DESC, a.rowid DESC",
        ALBUM_COLUMNS
    ))
    .bind(artist_id.as_string())
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to list albums", e))?;

    rows.iter().map(row_to_album).collect()
}

/// Deletes an album and its tracks
pub async fn delete_album(pool: &DbPool, id: AlbumId) -> Result<(), AppError> {
    sqlx::query("DELETE FROM albums WHERE id = ?")
        .bind(id.as_string())
        .execute(pool)
        .await
        .map_err(|e| AppError::database("Failed to delete album", e))?;

    Ok(())
}

pub(crate) fn row_to_album(row: &SqliteRow) -> Result<Album, AppError> {
    Ok(Album {
        id: id_column(row, "id", AlbumId::from_string)?,
        artist_id: id_column(row, "artist_id", ProfileId::from_string)?,
        title: column(row, "title")?,
        cover_url: column(row, "cover_url")?,
        is_single: column(row, "is_single")?,
        created_at: timestamp(row, "created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::fixtures::{album, artist, setup};
    use crate::queries::tracks::get_track;

    #[tokio::test]
    async fn test_create_and_get_album() {
        let pool = setup().await;
        let vela = artist(&pool, "Vela").await;
        let (tides, _) = album(&pool, &vela, "Tides", &[]).await;

        assert_eq!(get_album(&pool, tides.id).await.unwrap(), tides);
    }

    #[tokio::test]
    async fn test_blank_title_rejected() {
        let pool = setup().await;
        let vela = artist(&pool, "Vela").await;

        let result = create_album(&pool, &Album::new("  ".to_string(), vela.id)).await;
        assert!(matches!(result, Err(AppError::ValidationFailed { .. })));
    }

    #[tokio::test]
    async fn test_create_single() {
        let pool = setup().await;
        let vela = artist(&pool, "Vela").await;

        let track = Track::new("Lanterns".to_string(), vela.id, "Vela".to_string());
        let (single, track) = Album::new_single(track, Some("cover.png".to_string()));
        create_single(&pool, &single, &track).await.unwrap();

        let full = get_album_with_tracks(&pool, single.id).await.unwrap();
        assert!(full.album.is_single);
        assert_eq!(full.tracks, vec![track]);
    }

    #[tokio::test]
    async fn test_failed_single_leaves_nothing() {
        let pool = setup().await;
        let vela = artist(&pool, "Vela").await;

        // Valid album, invalid track: the album insert must roll back
        let mut track = Track::new("Lanterns".to_string(), vela.id, "Vela".to_string());
        track.has_music_video = true;
        let (single, track) = Album::new_single(track, None);

        assert!(create_single(&pool, &single, &track).await.is_err());
        assert!(get_album(&pool, single.id).await.is_err());
    }

    #[tokio::test]
    async fn test_list_and_delete_albums() {
        let pool = setup().await;
        let vela = artist(&pool, "Vela").await;
        let (first, tracks) = album(&pool, &vela, "First", &["One"]).await;
        std::thread::sleep(std::time::Duration::from_millis(5));
        let (second, _) = album(&pool, &vela, "Second", &[]).await;

        let listed = list_albums_by_artist(&pool, vela.id).await.unwrap();
        assert_eq!(listed, vec![second, first.clone()]);

        delete_album(&pool, first.id).await.unwrap();
        assert!(get_track(&pool, tracks[0].id).await.is_err());
        assert_eq!(list_albums_by_artist(&pool, vela.id).await.unwrap().len(), 1);
    }
}
