//! Background progress ticks

use crate::handle::PlayerHandle;
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::io;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Ticks an engine at a fixed interval on a dedicated thread.
///
/// The thread exits when the timer is dropped or once every [`PlayerHandle`]
/// to the engine is gone.
pub struct ProgressTimer {
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl ProgressTimer {
    pub fn start(handle: &PlayerHandle, interval: Duration) -> io::Result<Self> {
        let engine = handle.downgrade();
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let thread = thread::Builder::new()
            .name("progress-timer".to_string())
            .spawn(move || {
                let mut last = Instant::now();
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }

                    let Some(engine) = engine.upgrade() else {
                        break;
                    };
                    let now = Instant::now();
                    engine
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .tick(now - last);
                    last = now;
                }
                log::debug!("Progress timer stopped");
            })?;

        Ok(Self {
            stop: Some(stop_tx),
            thread: Some(thread),
        })
    }

    /// Stops ticking and waits for the thread to exit
    pub fn stop(&mut self) {
        self.stop.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for ProgressTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineSettings, PlaybackEngine};
    use crate::error::EngineResult;
    use crate::output::AudioOutput;
    use crate::types::OutputEvent;
    use resonance_core::{AudioSource, ProfileId, Track};

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

    #[test]
    fn test_timer_advances_simulated_progress() {
        let handle = PlayerHandle::new(PlaybackEngine::new(SilentOutput, EngineSettings::default()));
        let track = Track::new("A".to_string(), ProfileId::new(), "Vela".to_string());
        handle.play_track(track, None);

        let mut timer = ProgressTimer::start(&handle, Duration::from_millis(10)).unwrap();
        thread::sleep(Duration::from_millis(200));
        timer.stop();

        let progress = handle.progress();
        assert!(progress > 0.0);

        thread::sleep(Duration::from_millis(50));
        assert_eq!(handle.progress(), progress);
    }

    #[test]
    fn test_timer_exits_when_engine_dropped() {
        let handle = PlayerHandle::new(PlaybackEngine::new(SilentOutput, EngineSettings::default()));
        let mut timer = ProgressTimer::start(&handle, Duration::from_millis(5)).unwrap();
        drop(handle);

        thread::sleep(Duration::from_millis(50));
        assert!(timer.thread.as_ref().is_some_and(|t| t.is_finished()));
        timer.stop();
    }
}
