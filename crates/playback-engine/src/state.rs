//! Engine state management

use crate::{PlaybackMode, PlaybackStatus};
use resonance_core::Track;

/// What is loaded and how far along it is
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    current: Option<Track>,
    status: PlaybackStatus,
    progress: f64,
    duration: f64,
    mode: Option<PlaybackMode>,
    last_error: Option<String>,
}

impl PlaybackState {
    pub fn new() -> Self {
        Self {
            current: None,
            status: PlaybackStatus::Idle,
            progress: 0.0,
            duration: 0.0,
            mode: None,
            last_error: None,
        }
    }

    pub fn current(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub(crate) fn set_current(&mut self, track: Track, mode: Option<PlaybackMode>, duration: f64) {
        self.current = Some(track);
        self.mode = mode;
        self.duration = duration.max(0.0);
        self.progress = 0.0;
        self.last_error = None;
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: PlaybackStatus) {
        self.status = status;
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    /// Elapsed seconds
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub(crate) fn set_progress(&mut self, progress: f64) {
        self.progress = progress;
    }

    /// Total seconds; 0 when unknown
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub(crate) fn set_duration(&mut self, duration: f64) {
        self.duration = duration;
    }

    pub fn mode(&self) -> Option<PlaybackMode> {
        self.mode
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub(crate) fn set_error(&mut self, message: String) {
        self.last_error = Some(message);
    }

    /// True when progress has reached a known duration
    pub fn at_end(&self) -> bool {
        self.duration > 0.0 && self.progress >= self.duration
    }

    pub fn progress_percentage(&self) -> f32 {
        if self.duration == 0.0 {
            return 0.0;
        }
        ((self.progress / self.duration) * 100.0) as f32
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a consumer needs to render the player at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub state: PlaybackState,
    pub queue: Vec<Track>,
    pub queue_index: Option<usize>,
}

impl PlayerSnapshot {
    pub fn can_go_previous(&self) -> bool {
        self.queue_index.is_some_and(|i| i > 0)
    }

    pub fn can_go_next(&self) -> bool {
        self.queue_index.is_some_and(|i| i + 1 < self.queue.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resonance_core::ProfileId;

    #[test]
    fn test_new_state_is_idle() {
        let state = PlaybackState::new();
        assert_eq!(state.status(), PlaybackStatus::Idle);
        assert!(state.current().is_none());
        assert!(state.mode().is_none());
        assert_eq!(state.progress_percentage(), 0.0);
    }

    #[test]
    fn test_set_current_resets_progress_and_error() {
        let mut state = PlaybackState::new();
        state.set_progress(42.0);
        state.set_error("boom".to_string());

        let track = Track::new("A".to_string(), ProfileId::new(), "Vela".to_string());
        state.set_current(track, Some(PlaybackMode::Simulated), 200.0);

        assert_eq!(state.progress(), 0.0);
        assert_eq!(state.duration(), 200.0);
        assert!(state.last_error().is_none());
    }

    #[test]
    fn test_at_end_and_percentage() {
        let mut state = PlaybackState::new();
        state.set_duration(200.0);
        state.set_progress(50.0);
        assert_eq!(state.progress_percentage(), 25.0);
        assert!(!state.at_end());

        state.set_progress(200.0);
        assert!(state.at_end());
    }

    #[test]
    fn test_snapshot_navigation_flags() {
        let artist = ProfileId::new();
        let queue = vec![
            Track::new("A".to_string(), artist, "Vela".to_string()),
            Track::new("B".to_string(), artist, "Vela".to_string()),
        ];
        let snapshot = PlayerSnapshot {
            state: PlaybackState::new(),
            queue,
            queue_index: Some(0),
        };
        assert!(!snapshot.can_go_previous());
        assert!(snapshot.can_go_next());
    }
}
