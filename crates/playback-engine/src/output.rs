//! Seam between the engine and a concrete audio output

use crate::error::EngineResult;
use crate::types::OutputEvent;
use resonance_core::AudioSource;

/// An audio output the engine drives.
///
/// Calls must return quickly; slow work such as fetching or decoding belongs on
/// the output's own thread, with results reported through [`poll_event`].
///
/// [`poll_event`]: AudioOutput::poll_event
pub trait AudioOutput: Send {
    /// Starts opening `source`, replacing whatever was loaded. Playback stays paused.
    fn load(&mut self, source: &AudioSource) -> EngineResult<()>;

    fn play(&mut self) -> EngineResult<()>;

    fn pause(&mut self) -> EngineResult<()>;

    /// Moves the read position to `seconds`
    fn seek(&mut self, seconds: f64) -> EngineResult<()>;

    /// Releases the loaded source; a no-op when nothing is loaded
    fn stop(&mut self);

    /// Audible position in seconds
    fn position(&self) -> f64;

    /// Next pending event, if any
    fn poll_event(&mut self) -> Option<OutputEvent>;
}
