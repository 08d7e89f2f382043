//! Shared access to one engine

use crate::engine::PlaybackEngine;
use crate::state::PlayerSnapshot;
use crate::types::{PlaybackStatus, PlayerEvent};
use crossbeam_channel::Receiver;
use resonance_core::Track;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

/// Cloneable handle to a [`PlaybackEngine`].
///
/// Every clone drives the same engine; operations are serialised by a mutex.
#[derive(Clone)]
pub struct PlayerHandle {
    inner: Arc<Mutex<PlaybackEngine>>,
}

impl PlayerHandle {
    pub fn new(engine: PlaybackEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PlaybackEngine> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn downgrade(&self) -> Weak<Mutex<PlaybackEngine>> {
        Arc::downgrade(&self.inner)
    }

    /// Runs `f` with exclusive access to the engine
    pub fn with<R>(&self, f: impl FnOnce(&mut PlaybackEngine) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn play_track(&self, track: Track, queue: Option<Vec<Track>>) {
        self.lock().play_track(track, queue);
    }

    pub fn toggle_play(&self) {
        self.lock().toggle_play();
    }

    pub fn set_queue(&self, tracks: Vec<Track>, start_index: usize) {
        self.lock().set_queue(tracks, start_index);
    }

    pub fn next_track(&self) {
        self.lock().next_track();
    }

    pub fn previous_track(&self) {
        self.lock().previous_track();
    }

    pub fn seek_to(&self, seconds: f64) {
        self.lock().seek_to(seconds);
    }

    pub fn tick(&self, elapsed: Duration) {
        self.lock().tick(elapsed);
    }

    pub fn subscribe(&self) -> Receiver<PlayerEvent> {
        self.lock().subscribe()
    }

    pub fn current_track(&self) -> Option<Track> {
        self.lock().current_track().cloned()
    }

    pub fn is_playing(&self) -> bool {
        self.lock().is_playing()
    }

    pub fn status(&self) -> PlaybackStatus {
        self.lock().status()
    }

    pub fn progress(&self) -> f64 {
        self.lock().progress()
    }

    pub fn duration(&self) -> f64 {
        self.lock().duration()
    }

    pub fn queue(&self) -> Vec<Track> {
        self.lock().queue().to_vec()
    }

    pub fn queue_index(&self) -> Option<usize> {
        self.lock().queue_index()
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        self.lock().snapshot()
    }
}
