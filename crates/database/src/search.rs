//! Substring search over tracks, albums and artists

use crate::queries::albums::{row_to_album, ALBUM_COLUMNS};
use crate::queries::history::record_search;
use crate::queries::profiles::{row_to_profile, PROFILE_COLUMNS};
use crate::queries::tracks::{row_to_track, TRACK_COLUMNS};
use crate::DbPool;
use resonance_core::{Album, AppError, Profile, ProfileId, SearchHistoryEntry, Timestamp, Track};

/// Maximum results per entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub tracks: u32,
    pub albums: u32,
    pub artists: u32,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            tracks: 20,
            albums: 10,
            artists: 10,
        }
    }
}

/// Matches grouped by entity kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub tracks: Vec<Track>,
    pub albums: Vec<Album>,
    pub artists: Vec<Profile>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty() && self.albums.is_empty() && self.artists.is_empty()
    }

    pub fn total(&self) -> usize {
        self.tracks.len() + self.albums.len() + self.artists.len()
    }
}

/// Searches the catalogue for `query`, case-insensitively.
///
/// A blank query returns no results. When `user` is given, the trimmed query
/// is added to that user's search history.
pub async fn search(
    pool: &DbPool,
    user: Option<ProfileId>,
    query: &str,
    limits: SearchLimits,
) -> Result<SearchResults, AppError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(SearchResults::default());
    }

    let pattern = like_pattern(query);
    let results = SearchResults {
        tracks: search_tracks(pool, &pattern, limits.tracks).await?,
        albums: search_albums(pool, &pattern, limits.albums).await?,
        artists: search_artists(pool, &pattern, limits.artists).await?,
    };

    log::debug!("Search for {:?} matched {} items", query, results.total());

    if let Some(user_id) = user {
        record_search(
            pool,
            &SearchHistoryEntry {
                user_id,
                query: query.to_string(),
                searched_at: Timestamp::now(),
            },
        )
        .await?;
    }

    Ok(results)
}

async fn search_tracks(pool: &DbPool, pattern: &str, limit: u32) -> Result<Vec<Track>, AppError> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM tracks t
        LEFT JOIN profiles p ON p.id = t.artist_id
        WHERE t.title LIKE ?1 ESCAPE '\'
           OR t.artist_name LIKE ?1 ESCAPE '\'
           OR p.artist_name LIKE ?1 ESCAPE '\'
           OR p.display_name LIKE ?1 ESCAPE '\'
        ORDER BY t.play_count DESC, t.title
        LIMIT ?2
        "#,
        TRACK_COLUMNS
    ))
    .bind(pattern)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to search tracks", e))?;

    rows.iter().map(row_to_track).collect()
}

async fn search_albums(pool: &DbPool, pattern: &str, limit: u32) -> Result<Vec<Album>, AppError> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM albums a
        WHERE a.title LIKE ?1 ESCAPE '\'
        ORDER BY a.created_at DESC
        LIMIT ?2
        "#,
        ALBUM_COLUMNS
    ))
    .bind(pattern)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to search albums", e))?;

    rows.iter().map(row_to_album).collect()
}

async fn search_artists(pool: &DbPool, pattern: &str, limit: u32) -> Result<Vec<Profile>, AppError> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM profiles
        WHERE is_artist = 1
          AND (artist_name LIKE ?1 ESCAPE '\' OR display_name LIKE ?1 ESCAPE '\')
        ORDER BY COALESCE(artist_name, display_name)
        LIMIT ?2
        "#,
        PROFILE_COLUMNS
    ))
    .bind(pattern)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to search artists", e))?;

    rows.iter().map(row_to_profile).collect()
}

/// Wraps `query` in wildcards, escaping LIKE metacharacters with `\`
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
