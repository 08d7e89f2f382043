//! Queue and transport state machine

use crate::output::AudioOutput;
use crate::queue::Queue;
use crate::state::{PlaybackState, PlayerSnapshot};
use crate::types::{FailurePolicy, OutputEvent, PlaybackMode, PlaybackStatus, PlayerEvent};
use crossbeam_channel::{unbounded, Receiver, Sender};
use resonance_core::{Track, TrackId};
use resonance_resilience::RetryPolicy;
use std::time::Duration;

/// Tunables for [`PlaybackEngine`]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// How often the progress timer ticks
    pub progress_interval: Duration,
    /// Duration given to simulated tracks that declare none
    pub default_track_secs: u32,
    /// Play tracks without audio on the simulated clock instead of failing them
    pub simulate_missing_audio: bool,
    /// Reload attempts for a failing track
    pub retry: RetryPolicy,
    pub failure_policy: FailurePolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            progress_interval: Duration::from_millis(100),
            default_track_secs: 180,
            simulate_missing_audio: true,
            retry: RetryPolicy::new(3).with_initial_delay(Duration::from_millis(500)),
            failure_policy: FailurePolicy::Skip,
        }
    }
}

/// The playback engine: current track, queue, transport controls and progress.
///
/// All operations are synchronous and take effect in call order. Time only
/// moves through [`tick`](PlaybackEngine::tick), which the progress timer calls.
pub struct PlaybackEngine {
    output: Box<dyn AudioOutput>,
    settings: EngineSettings,
    state: PlaybackState,
    queue: Queue,
    subscribers: Vec<Sender<PlayerEvent>>,
    retry_in: Option<Duration>,
    failures: usize,
    /// Set by a failure that the skip policy moves past
    skip_pending: bool,
}

impl PlaybackEngine {
    pub fn new<O: AudioOutput + 'static>(output: O, settings: EngineSettings) -> Self {
        Self {
            output: Box::new(output),
            settings,
            state: PlaybackState::new(),
            queue: Queue::new(),
            subscribers: Vec::new(),
            retry_in: None,
            failures: 0,
            skip_pending: false,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Receives every event emitted from now on
    pub fn subscribe(&mut self) -> Receiver<PlayerEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Plays `track`, optionally replacing the queue first.
    ///
    /// With a queue the index moves to `track`'s position in it, or 0 when the
    /// track is not part of it. Without one the queue is left alone.
    pub fn play_track(&mut self, track: Track, queue: Option<Vec<Track>>) {
        if let Some(tracks) = queue {
            let index = tracks.iter().position(|t| t.id == track.id).unwrap_or(0);
            self.replace_queue(tracks, index);
        }
        self.failures = 0;
        self.load(track);
    }

    /// Flips between playing and paused.
    ///
    /// A failed track is retried; a track paused at its end restarts.
    pub fn toggle_play(&mut self) {
        match self.state.status() {
            PlaybackStatus::Idle => {}
            PlaybackStatus::Failed => {
                self.failures = 0;
                self.reload_current();
            }
            PlaybackStatus::Playing => {
                if self.is_audio() {
                    if let Err(e) = self.output.pause() {
                        log::warn!("Output refused to pause: {}", e);
                    }
                }
                self.set_status(PlaybackStatus::Paused);
            }
            PlaybackStatus::Paused if self.state.at_end() => self.reload_current(),
            PlaybackStatus::Paused => {
                if self.is_audio() {
                    if let Err(e) = self.output.play() {
                        let retryable = e.is_retryable();
                        self.fail(e.to_string(), retryable);
                        self.skip_failed();
                        return;
                    }
                }
                self.set_status(PlaybackStatus::Playing);
            }
        }
    }

    /// Replaces the queue and plays `tracks[start_index]`.
    ///
    /// An empty list changes nothing; an out-of-range index is clamped.
    pub fn set_queue(&mut self, tracks: Vec<Track>, start_index: usize) {
        if tracks.is_empty() {
            log::debug!("Ignoring empty queue");
            return;
        }

        self.replace_queue(tracks, start_index);
        if let Some(track) = self.queue.current().cloned() {
            self.failures = 0;
            self.load(track);
        }
    }

    /// Plays the next queued track; a no-op at the end of the queue
    pub fn next_track(&mut self) {
        if let Some(track) = self.queue.advance().cloned() {
            self.failures = 0;
            self.load(track);
        }
    }

    /// Plays the previous queued track; a no-op at the start of the queue
    pub fn previous_track(&mut self) {
        if let Some(track) = self.queue.retreat().cloned() {
            self.failures = 0;
            self.load(track);
        }
    }

    /// Moves progress to `seconds`, clamped to the track.
    ///
    /// Works whether or not the track is playing. Non-finite input is ignored.
    pub fn seek_to(&mut self, seconds: f64) {
        if !seconds.is_finite() || self.state.current().is_none() {
            return;
        }

        let mut target = seconds.max(0.0);
        if self.state.duration() > 0.0 {
            target = target.min(self.state.duration());
        }
        self.state.set_progress(target);

        if self.is_audio() && self.state.status() != PlaybackStatus::Failed {
            if let Err(e) = self.output.seek(target) {
                self.seek_failed(target, e.to_string());
            }
        }
        self.emit_progress();
    }

    /// Advances engine time by `elapsed`.
    ///
    /// Counts down a pending retry, handles output events, and moves progress
    /// while playing.
    pub fn tick(&mut self, elapsed: Duration) {
        if let Some(remaining) = self.retry_in {
            if elapsed >= remaining {
                self.retry_in = None;
                log::info!("Retrying playback (attempt {})", self.failures + 1);
                self.reload_current();
                return;
            } else {
                self.retry_in = Some(remaining - elapsed);
            }
        }

        while let Some(event) = self.output.poll_event() {
            if self.is_audio() {
                self.handle_output_event(event);
            }
        }

        if !self.state.is_playing() {
            return;
        }

        match self.state.mode() {
            Some(PlaybackMode::Audio) => {
                let mut position = self.output.position();
                if self.state.duration() > 0.0 {
                    position = position.min(self.state.duration());
                }
                self.state.set_progress(position);
                self.emit_progress();
            }
            Some(PlaybackMode::Simulated) => {
                let position = self.state.progress() + elapsed.as_secs_f64();
                if position >= self.state.duration() {
                    self.state.set_progress(self.state.duration());
                    self.emit_progress();
                    self.track_ended();
                } else {
                    self.state.set_progress(position);
                    self.emit_progress();
                }
            }
            None => {}
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.state.current()
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn status(&self) -> PlaybackStatus {
        self.state.status()
    }

    pub fn progress(&self) -> f64 {
        self.state.progress()
    }

    pub fn duration(&self) -> f64 {
        self.state.duration()
    }

    pub fn mode(&self) -> Option<PlaybackMode> {
        self.state.mode()
    }

    pub fn queue(&self) -> &[Track] {
        self.queue.tracks()
    }

    pub fn queue_index(&self) -> Option<usize> {
        self.queue.index()
    }

    /// True while a failed track waits for its next attempt
    pub fn retry_pending(&self) -> bool {
        self.retry_in.is_some()
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            state: self.state.clone(),
            queue: self.queue.tracks().to_vec(),
            queue_index: self.queue.index(),
        }
    }

    fn replace_queue(&mut self, tracks: Vec<Track>, index: usize) {
        self.queue.replace(tracks, index);
        self.emit(PlayerEvent::QueueReplaced {
            len: self.queue.len(),
            index: self.queue.index(),
        });
    }

    fn reload_current(&mut self) {
        if let Some(track) = self.state.current().cloned() {
            self.load(track);
        }
    }

    /// Loads `track`, then moves past any tracks the skip policy gives up on
    fn load(&mut self, track: Track) {
        self.load_once(track);
        self.skip_failed();
    }

    fn skip_failed(&mut self) {
        while std::mem::take(&mut self.skip_pending) {
            if let Some(track) = self.queue.advance().cloned() {
                self.failures = 0;
                self.load_once(track);
            }
        }
    }

    fn load_once(&mut self, track: Track) {
        self.retry_in = None;
        self.skip_pending = false;
        if self.is_audio() {
            self.output.stop();
        }

        let index = self
            .queue
            .current()
            .filter(|queued| queued.id == track.id)
            .and(self.queue.index());
        let declared = f64::from(track.duration_secs);
        let source = track.audio_source.clone();

        log::debug!("Loading '{}' ({})", track.title, track.id);

        match source {
            Some(source) => {
                self.state
                    .set_current(track.clone(), Some(PlaybackMode::Audio), declared);
                self.emit(PlayerEvent::TrackChanged { track, index });

                match self.output.load(&source).and_then(|_| self.output.play()) {
                    Ok(()) => self.set_status(PlaybackStatus::Playing),
                    Err(e) => {
                        let retryable = e.is_retryable();
                        self.fail(e.to_string(), retryable);
                        return;
                    }
                }
            }
            None if self.settings.simulate_missing_audio => {
                let duration = if declared > 0.0 {
                    declared
                } else {
                    f64::from(self.settings.default_track_secs)
                };
                self.state
                    .set_current(track.clone(), Some(PlaybackMode::Simulated), duration);
                self.emit(PlayerEvent::TrackChanged { track, index });
                self.set_status(PlaybackStatus::Playing);
            }
            None => {
                self.state.set_current(track.clone(), None, declared);
                self.emit(PlayerEvent::TrackChanged { track, index });
                self.fail("Track has no audio source".to_string(), false);
                return;
            }
        }

        self.emit_progress();
    }

    fn handle_output_event(&mut self, event: OutputEvent) {
        match event {
            OutputEvent::Loaded { duration } => {
                if let Some(duration) = duration.filter(|d| d.is_finite() && *d > 0.0) {
                    self.state.set_duration(duration);
                }
                self.emit_progress();
            }
            OutputEvent::Ended => self.track_ended(),
            OutputEvent::Error { message, retryable } => {
                self.fail(message, retryable);
                self.skip_failed();
            }
            OutputEvent::SeekFailed(message) => {
                let requested = self.state.progress();
                self.seek_failed(requested, message);
            }
        }
    }

    fn track_ended(&mut self) {
        if self.queue.has_next() {
            self.next_track();
            return;
        }

        if self.state.duration() <= 0.0 {
            self.state.set_duration(self.state.progress());
        }
        self.state.set_progress(self.state.duration());
        if self.is_audio() {
            if let Err(e) = self.output.pause() {
                log::debug!("Pause after end of stream failed: {}", e);
            }
        }
        self.set_status(PlaybackStatus::Paused);
        self.emit_progress();
        self.emit(PlayerEvent::QueueEnded);
    }

    fn fail(&mut self, message: String, retryable: bool) {
        let Some(track_id) = self.state.current().map(|t| t.id) else {
            return;
        };

        if self.is_audio() {
            self.output.stop();
        }
        self.failures += 1;
        let retrying = retryable && self.settings.retry.allows_retry(self.failures);

        log::warn!(
            "Playback of {} failed (attempt {}): {}",
            track_id,
            self.failures,
            message
        );

        self.state.set_error(message.clone());
        self.set_status(PlaybackStatus::Failed);
        self.emit(PlayerEvent::Failed {
            track_id,
            message,
            retrying,
        });

        if retrying {
            self.retry_in = Some(self.settings.retry.delay_for_attempt(self.failures));
        } else if self.settings.failure_policy == FailurePolicy::Skip
            && self.is_queue_current(track_id)
            && self.queue.has_next()
        {
            self.skip_pending = true;
        }
    }

    fn seek_failed(&mut self, requested: f64, message: String) {
        log::warn!("Seek to {:.1}s failed: {}", requested, message);
        self.state.set_progress(self.output.position());
        self.emit(PlayerEvent::SeekFailed { requested, message });
        self.emit_progress();
    }

    fn is_audio(&self) -> bool {
        self.state.mode() == Some(PlaybackMode::Audio)
    }

    fn is_queue_current(&self, id: TrackId) -> bool {
        self.queue.current().is_some_and(|t| t.id == id)
    }

    fn set_status(&mut self, status: PlaybackStatus) {
        if self.state.status() != status {
            self.state.set_status(status);
            self.emit(PlayerEvent::StatusChanged(status));
        }
    }

    fn emit_progress(&mut self) {
        self.emit(PlayerEvent::Progress {
            position: self.state.progress(),
            duration: self.state.duration(),
        });
    }

    fn emit(&mut self, event: PlayerEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.output.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineResult;
    use resonance_core::{AudioSource, ProfileId};

    /// Output that accepts everything and never produces events
    struct SilentOutput;

    impl AudioOutput for SilentOutput {
        fn load(&mut self, _source: &AudioSource) -> EngineResult<()> {
            Ok(())
        }
        fn play(&mut self) -> EngineResult<()> {
            Ok(())
        }
        fn pause(&mut self) -> EngineResult<()> {
            Ok(())
        }
        fn seek(&mut self, _seconds: f64) -> EngineResult<()> {
            Ok(())
        }
        fn stop(&mut self) {}
        fn position(&self) -> f64 {
            0.0
        }
        fn poll_event(&mut self) -> Option<OutputEvent> {
            None
        }
    }

    fn simulated(title: &str, secs: u32) -> Track {
        Track::new(title.to_string(), ProfileId::new(), "Vela".to_string()).with_duration_secs(secs)
    }

    #[test]
    fn test_new_engine_is_idle() {
        let engine = PlaybackEngine::new(SilentOutput, EngineSettings::default());
        assert_eq!(engine.status(), PlaybackStatus::Idle);
        assert!(engine.current_track().is_none());
        assert_eq!(engine.queue_index(), None);
    }

    #[test]
    fn test_toggle_on_idle_is_noop() {
        let mut engine = PlaybackEngine::new(SilentOutput, EngineSettings::default());
        engine.toggle_play();
        assert_eq!(engine.status(), PlaybackStatus::Idle);
    }

    #[test]
    fn test_seek_ignores_non_finite_and_clamps() {
        let mut engine = PlaybackEngine::new(SilentOutput, EngineSettings::default());
        engine.play_track(simulated("A", 120), None);

        engine.seek_to(f64::NAN);
        assert_eq!(engine.progress(), 0.0);

        engine.seek_to(500.0);
        assert_eq!(engine.progress(), 120.0);

        engine.seek_to(-4.0);
        assert_eq!(engine.progress(), 0.0);
    }

    #[test]
    fn test_simulated_clock_advances_only_while_playing() {
        let mut engine = PlaybackEngine::new(SilentOutput, EngineSettings::default());
        engine.play_track(simulated("A", 120), None);

        engine.tick(Duration::from_millis(1500));
        assert!((engine.progress() - 1.5).abs() < 1e-9);

        engine.toggle_play();
        engine.tick(Duration::from_secs(5));
        assert!((engine.progress() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_missing_audio_fails_when_simulation_disabled() {
        let settings = EngineSettings {
            simulate_missing_audio: false,
            ..EngineSettings::default()
        };
        let mut engine = PlaybackEngine::new(SilentOutput, settings);
        engine.play_track(simulated("A", 120), None);

        assert_eq!(engine.status(), PlaybackStatus::Failed);
        assert!(!engine.retry_pending());
        assert!(engine.state().last_error().is_some());
    }
}
