//! Track domain model

use crate::types::common::entity_id;
use crate::types::{AlbumId, Duration, ProfileId, Timestamp, Validator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

entity_id!(
    /// Unique identifier for a track
    TrackId
);

/// Where a track's audio can be read from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioSource {
    /// Audio file on the local filesystem
    File(PathBuf),
    /// Audio fetched over HTTP(S)
    Url(String),
}

impl AudioSource {
    /// Interprets a stored source reference.
    ///
    /// `http://` and `https://` references are URLs, anything else is a path.
    /// Blank references mean the track has no audio.
    pub fn parse(reference: &str) -> Option<Self> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }

        let lower = reference.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Some(Self::Url(reference.to_string()))
        } else {
            Some(Self::File(PathBuf::from(reference)))
        }
    }

    /// Returns the reference in the form it is stored
    pub fn reference(&self) -> String {
        match self {
            Self::File(path) => path.to_string_lossy().into_owned(),
            Self::Url(url) => url.clone(),
        }
    }

    /// Returns the lowercase file extension, if the reference has one
    pub fn extension(&self) -> Option<String> {
        let path = match self {
            Self::File(path) => path.as_path(),
            Self::Url(url) => {
                let without_query = url.split(['?', '#']).next().unwrap_or(url);
                return Path::new(without_query)
                    .extension()
                    .map(|e| e.to_string_lossy().to_lowercase());
            }
        };
        path.extension().map(|e| e.to_string_lossy().to_lowercase())
    }

    /// Returns true if the source is remote
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Url(_))
    }
}

impl fmt::Display for AudioSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference())
    }
}

/// A playable song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub album_id: Option<AlbumId>,
    pub artist_id: ProfileId,
    pub title: String,
    /// Artist name shown next to the title
    pub artist_name: String,
    pub audio_source: Option<AudioSource>,
    pub cover_url: Option<String>,
    /// Declared length in whole seconds; 0 when unknown
    pub duration_secs: u32,
    pub is_explicit: bool,
    pub has_music_video: bool,
    pub music_video_url: Option<String>,
    pub play_count: u64,
    pub created_at: Timestamp,
}

impl Track {
    /// Creates a new track with no audio attached
    pub fn new(title: String, artist_id: ProfileId, artist_name: String) -> Self {
        Self {
            id: TrackId::new(),
            album_id: None,
            artist_id,
            title,
            artist_name,
            audio_source: None,
            cover_url: None,
            duration_secs: 0,
            is_explicit: false,
            has_music_video: false,
            music_video_url: None,
            play_count: 0,
            created_at: Timestamp::now(),
        }
    }

    /// Sets the audio source
    pub fn with_source(mut self, source: AudioSource) -> Self {
        self.audio_source = Some(source);
        self
    }

    /// Sets the declared duration
    pub fn with_duration_secs(mut self, secs: u32) -> Self {
        self.duration_secs = secs;
        self
    }

    /// Marks the track explicit
    pub fn explicit(mut self) -> Self {
        self.is_explicit = true;
        self
    }

    /// Returns true if the track has audio that can actually be played
    pub fn is_playable(&self) -> bool {
        self.audio_source.is_some()
    }

    /// Returns the declared duration
    pub fn duration(&self) -> Duration {
        Duration::from_seconds(u64::from(self.duration_secs))
    }
}

impl Validator for Track {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push("Track title cannot be empty".to_string());
        }

        if self.has_music_video && self.music_video_url.is_none() {
            errors.push("Music video flag set without a video reference".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
