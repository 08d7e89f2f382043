//! Playback engine for Resonance
//!
//! Owns the play queue and transport state, drives one [`AudioOutput`], and
//! reports changes to subscribers as [`PlayerEvent`]s.

mod decoder;
mod engine;
mod error;
mod handle;
mod output;
mod queue;
mod state;
mod stream;
mod timer;
mod types;

pub use decoder::{AudioDecoder, DecodedAudio};
pub use engine::{EngineSettings, PlaybackEngine};
pub use error::{EngineError, EngineResult};
pub use handle::PlayerHandle;
pub use output::AudioOutput;
pub use queue::Queue;
pub use state::{PlaybackState, PlayerSnapshot};
pub use stream::{NullSink, SampleSink, StreamOutput};
pub use timer::ProgressTimer;
pub use types::{FailurePolicy, OutputEvent, PlaybackMode, PlaybackStatus, PlayerEvent};

pub type Result<T> = std::result::Result<T, EngineError>;
