//! Profile and account settings

use crate::error::{AppError, Result};
use crate::types::common::entity_id;
use crate::types::{Timestamp, Track, Validator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

entity_id!(
    /// Unique identifier for a user profile (listeners and artists alike)
    ProfileId
);

/// Shortest accepted parental PIN
pub const MIN_PIN_LENGTH: usize = 4;
/// Longest accepted parental PIN
pub const MAX_PIN_LENGTH: usize = 6;

/// UI theme selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            other => Err(AppError::InvalidArgument {
                argument: "theme".to_string(),
                reason: format!("'{}' is not one of light, dark, system", other),
            }),
        }
    }
}

/// Parental control settings attached to a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentalControls {
    pub enabled: bool,
    pub pin: Option<String>,
    pub music_videos_enabled: bool,
    pub explicit_content_enabled: bool,
}

impl Default for ParentalControls {
    fn default() -> Self {
        Self {
            enabled: false,
            pin: None,
            music_videos_enabled: true,
            explicit_content_enabled: true,
        }
    }
}

impl ParentalControls {
    /// Returns true if this track may not be played without the PIN
    pub fn blocks(&self, track: &Track) -> bool {
        track.is_explicit && self.enabled && !self.explicit_content_enabled
    }

    /// Returns true if any of the tracks needs the PIN
    pub fn requires_pin(&self, tracks: &[Track]) -> bool {
        tracks.iter().any(|t| self.blocks(t))
    }

    /// Checks whether a collection may be played with the supplied PIN.
    ///
    /// Collections without blocked tracks pass regardless of `pin`.
    pub fn authorize(&self, tracks: &[Track], pin: Option<&str>) -> Result<()> {
        if !self.requires_pin(tracks) {
            return Ok(());
        }

        let Some(supplied) = pin else {
            return Err(AppError::AccessDenied {
                reason: "This content is protected by parental controls; a PIN is required"
                    .to_string(),
            });
        };

        if supplied.trim() == self.pin.as_deref().unwrap_or("") {
            Ok(())
        } else {
            Err(AppError::AccessDenied {
                reason: "Incorrect PIN".to_string(),
            })
        }
    }

    /// Returns the track's video reference when videos are allowed
    pub fn video_for<'a>(&self, track: &'a Track) -> Option<&'a str> {
        if !track.has_music_video || (self.enabled && !self.music_videos_enabled) {
            return None;
        }
        track.music_video_url.as_deref()
    }

    /// Keeps only the digits of user input, as typed into the PIN field
    pub fn sanitize_pin(input: &str) -> String {
        input.chars().filter(|c| c.is_ascii_digit()).collect()
    }
}

impl Validator for ParentalControls {
    fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        match &self.pin {
            Some(pin) => {
                if !pin.chars().all(|c| c.is_ascii_digit())
                    || !(MIN_PIN_LENGTH..=MAX_PIN_LENGTH).contains(&pin.len())
                {
                    errors.push(format!(
                        "PIN must be {} to {} digits",
                        MIN_PIN_LENGTH, MAX_PIN_LENGTH
                    ));
                }
            }
            None if self.enabled => {
                errors.push("Parental controls need a PIN".to_string());
            }
            None => {}
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A listener or artist account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub is_artist: bool,
    pub artist_name: Option<String>,
    pub artist_bio: Option<String>,
    pub parental: ParentalControls,
    pub theme: ThemePreference,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Profile {
    /// Creates a listener profile with default settings
    pub fn new(display_name: Option<String>) -> Self {
        let now = Timestamp::now();
        Self {
            id: ProfileId::new(),
            display_name,
            avatar_url: None,
            is_artist: false,
            artist_name: None,
            artist_bio: None,
            parental: ParentalControls::default(),
            theme: ThemePreference::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Name to show for this profile: artist name for artists, then display name
    pub fn label(&self) -> &str {
        let artist = if self.is_artist {
            self.artist_name.as_deref()
        } else {
            None
        };
        artist
            .or(self.display_name.as_deref())
            .unwrap_or("Unknown")
    }

    /// Applies an edit and stamps `updated_at`
    pub fn apply(&mut self, patch: &ProfilePatch) {
        patch.apply_to(self);
        self.updated_at = Timestamp::now();
    }
}

impl Validator for Profile {
    fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.is_artist
            && self
                .artist_name
                .as_deref()
                .map_or(true, |n| n.trim().is_empty())
        {
            errors.push("Artist profiles need an artist name".to_string());
        }

        if let Err(parental) = self.parental.validate() {
            errors.extend(parental);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Independently saved groups of profile settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProfileField {
    DisplayName,
    Avatar,
    ArtistProfile,
    ParentalControls,
    Theme,
}

/// A single edit to one group of profile settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProfilePatch {
    DisplayName(String),
    Avatar(Option<String>),
    ArtistProfile {
        is_artist: bool,
        artist_name: Option<String>,
        artist_bio: Option<String>,
    },
    ParentalControls(ParentalControls),
    Theme(ThemePreference),
}

impl ProfilePatch {
    /// The settings group this edit belongs to; later edits to the same group supersede earlier ones
    pub fn field(&self) -> ProfileField {
        match self {
            Self::DisplayName(_) => ProfileField::DisplayName,
            Self::Avatar(_) => ProfileField::Avatar,
            Self::ArtistProfile { .. } => ProfileField::ArtistProfile,
            Self::ParentalControls(_) => ProfileField::ParentalControls,
            Self::Theme(_) => ProfileField::Theme,
        }
    }

    fn apply_to(&self, profile: &mut Profile) {
        match self {
            Self::DisplayName(name) => profile.display_name = Some(name.clone()),
            Self::Avatar(url) => profile.avatar_url = url.clone(),
            Self::ArtistProfile {
                is_artist,
                artist_name,
                artist_bio,
            } => {
                profile.is_artist = *is_artist;
                profile.artist_name = artist_name.clone().filter(|s| !s.is_empty());
                profile.artist_bio = artist_bio.clone().filter(|s| !s.is_empty());
            }
            Self::ParentalControls(controls) => {
                let mut controls = controls.clone();
                controls.pin = controls.pin.filter(|p| !p.is_empty());
                profile.parental = controls;
            }
            Self::Theme(theme) => profile.theme = *theme,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explicit_track() -> Track {
        Track::new("Loud".to_string(), ProfileId::new(), "Vela".to_string()).explicit()
    }

    fn clean_track() -> Track {
        Track::new("Quiet".to_string(), ProfileId::new(), "Vela".to_string())
    }

    fn locked() -> ParentalControls {
        ParentalControls {
            enabled: true,
            pin: Some("1234".to_string()),
            music_videos_enabled: true,
            explicit_content_enabled: false,
        }
    }

    #[test]
    fn test_profile_id_parses_next_to_app_result() {
        let id = ProfileId::new();
        let parsed: ProfileId = id.as_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!(ProfileId::from_string("nope").is_err());
        assert!("nope".parse::<ProfileId>().is_err());
    }

    #[test]
    fn test_theme_parse() {
        assert_eq!("Dark".parse::<ThemePreference>().unwrap(), ThemePreference::Dark);
        assert!("neon".parse::<ThemePreference>().is_err());
        assert_eq!(ThemePreference::default().to_string(), "system");
    }

    #[test]
    fn test_blocks_only_explicit_when_locked() {
        let controls = locked();
        assert!(controls.blocks(&explicit_track()));
        assert!(!controls.blocks(&clean_track()));

        let open = ParentalControls::default();
        assert!(!open.blocks(&explicit_track()));

        let allowed = ParentalControls {
            explicit_content_enabled: true,
            ..locked()
        };
        assert!(!allowed.blocks(&explicit_track()));
    }

    #[test]
    fn test_authorize() {
        let controls = locked();
        let tracks = vec![clean_track(), explicit_track()];

        assert!(matches!(
            controls.authorize(&tracks, None),
            Err(AppError::AccessDenied { .. })
        ));
        assert!(controls.authorize(&tracks, Some("9999")).is_err());
        assert!(controls.authorize(&tracks, Some("1234")).is_ok());
        assert!(controls.authorize(&[clean_track()], None).is_ok());
    }

    #[test]
    fn test_video_gate() {
        let mut track = clean_track();
        track.has_music_video = true;
        track.music_video_url = Some("https://cdn.example.com/v.mp4".to_string());

        assert!(ParentalControls::default().video_for(&track).is_some());

        let no_videos = ParentalControls {
            music_videos_enabled: false,
            ..locked()
        };
        assert!(no_videos.video_for(&track).is_none());
    }

    #[test]
    fn test_pin_validation() {
        assert!(locked().is_valid());

        let short = ParentalControls {
            pin: Some("12".to_string()),
            ..locked()
        };
        assert!(!short.is_valid());

        let letters = ParentalControls {
            pin: Some("12ab".to_string()),
            ..locked()
        };
        assert!(!letters.is_valid());

        let missing = ParentalControls {
            pin: None,
            ..locked()
        };
        assert!(!missing.is_valid());

        assert_eq!(ParentalControls::sanitize_pin("12-3a4"), "1234");
    }

    #[test]
    fn test_artist_requires_name() {
        let mut profile = Profile::new(Some("Sam".to_string()));
        assert!(profile.is_valid());

        profile.apply(&ProfilePatch::ArtistProfile {
            is_artist: true,
            artist_name: Some(String::new()),
            artist_bio: None,
        });
        assert!(!profile.is_valid());

        profile.apply(&ProfilePatch::ArtistProfile {
            is_artist: true,
            artist_name: Some("Vela".to_string()),
            artist_bio: Some("Synths".to_string()),
        });
        assert!(profile.is_valid());
        assert_eq!(profile.label(), "Vela");
    }

    #[test]
    fn test_patch_fields_and_apply() {
        let mut profile = Profile::new(None);
        let patch = ProfilePatch::DisplayName("Sam".to_string());
        assert_eq!(patch.field(), ProfileField::DisplayName);

        profile.apply(&patch);
        profile.apply(&ProfilePatch::Theme(ThemePreference::Dark));
        profile.apply(&ProfilePatch::ParentalControls(ParentalControls {
            pin: Some(String::new()),
            enabled: false,
            ..ParentalControls::default()
        }));

        assert_eq!(profile.label(), "Sam");
        assert_eq!(profile.theme, ThemePreference::Dark);
        assert_eq!(profile.parental.pin, None);
    }
}
