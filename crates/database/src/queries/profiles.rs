//! Profile database operations

use super::{column, id_column, timestamp};
use crate::DbPool;
use resonance_core::{
    AppError, ParentalControls, Profile, ProfileId, ProfilePatch, ThemePreference, Validator,
};
use sqlx::sqlite::SqliteRow;

pub(crate) const PROFILE_COLUMNS: &str = "id, display_name, avatar_url, is_artist, artist_name, artist_bio, \
     parental_controls_enabled, parental_pin, music_videos_enabled, explicit_content_enabled, \
     theme_preference, created_at, updated_at";

/// Creates a new profile
pub async fn create_profile(pool: &DbPool, profile: &Profile) -> Result<(), AppError> {
    profile
        .validate()
        .map_err(|errors| AppError::validation("Profile", errors))?;

    sqlx::query(
        r#"
        INSERT INTO profiles (
            id, display_name, avatar_url, is_artist, artist_name, artist_bio,
            parental_controls_enabled, parental_pin, music_videos_enabled, explicit_content_enabled,
            theme_preference, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(profile.id.as_string())
    .bind(&profile.display_name)
    .bind(&profile.avatar_url)
    .bind(profile.is_artist)
    .bind(&profile.artist_name)
    .bind(&profile.artist_bio)
    .bind(profile.parental.enabled)
    .bind(&profile.parental.pin)
    .bind(profile.parental.music_videos_enabled)
    .bind(profile.parental.explicit_content_enabled)
    .bind(profile.theme.as_str())
    .bind(profile.created_at.as_millis())
    .bind(profile.updated_at.as_millis())
    .execute(pool)
    .await
    .map_err(|e| AppError::database("Failed to create profile", e))?;

    Ok(())
}

/// Gets a profile by ID
pub async fn get_profile(pool: &DbPool, id: ProfileId) -> Result<Profile, AppError> {
    let row = sqlx::query(&format!("SELECT {} FROM profiles WHERE id = ?", PROFILE_COLUMNS))
        .bind(id.as_string())
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::database("Failed to fetch profile", e))?
        .ok_or_else(|| AppError::RecordNotFound {
            entity: "Profile".to_string(),
            identifier: id.to_string(),
        })?;

    row_to_profile(&row)
}

/// Writes every field of an existing profile
pub async fn update_profile(pool: &DbPool, profile: &Profile) -> Result<(), AppError> {
    profile
        .validate()
        .map_err(|errors| AppError::validation("Profile", errors))?;

    let result = sqlx::query(
        r#"
        UPDATE profiles SET
            display_name = ?, avatar_url = ?, is_artist = ?, artist_name = ?, artist_bio = ?,
            parental_controls_enabled = ?, parental_pin = ?, music_videos_enabled = ?,
            explicit_content_enabled = ?, theme_preference = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&profile.display_name)
    .bind(&profile.avatar_url)
    .bind(profile.is_artist)
    .bind(&profile.artist_name)
    .bind(&profile.artist_bio)
    .bind(profile.parental.enabled)
    .bind(&profile.parental.pin)
    .bind(profile.parental.music_videos_enabled)
    .bind(profile.parental.explicit_content_enabled)
    .bind(profile.theme.as_str())
    .bind(profile.updated_at.as_millis())
    .bind(profile.id.as_string())
    .execute(pool)
    .await
    .map_err(|e| AppError::database("Failed to update profile", e))?;

    if result.rows_affected() == 0 {
        return Err(AppError::RecordNotFound {
            entity: "Profile".to_string(),
            identifier: profile.id.to_string(),
        });
    }

    Ok(())
}

/// Applies one settings edit to a stored profile and returns the result.
///
/// The edit is validated against the whole profile before anything is written.
pub async fn apply_profile_patch(
    pool: &DbPool,
    id: ProfileId,
    patch: &ProfilePatch,
) -> Result<Profile, AppError> {
    let mut profile = get_profile(pool, id).await?;
    profile.apply(patch);
    update_profile(pool, &profile).await?;

    log::debug!("Saved {:?} for profile {}", patch.field(), id);
    Ok(profile)
}

pub(crate) fn row_to_profile(row: &SqliteRow) -> Result<Profile, AppError> {
    let theme: String = column(row, "theme_preference")?;
    let theme = theme.parse::<ThemePreference>()?;

    Ok(Profile {
        id: id_column(row, "id", ProfileId::from_string)?,
        display_name: column(row, "display_name")?,
        avatar_url: column(row, "avatar_url")?,
        is_artist: column(row, "is_artist")?,
        artist_name: column(row, "artist_name")?,
        artist_bio: column(row, "artist_bio")?,
        parental: ParentalControls {
            enabled: column(row, "parental_controls_enabled")?,
            pin: column(row, "parental_pin")?,
            music_videos_enabled: column(row, "music_videos_enabled")?,
            explicit_content_enabled: column(row, "explicit_content_enabled")?,
        },
        theme,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}
