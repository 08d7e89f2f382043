use resonance_core::{Track, TrackId};

/// Transport status of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// Nothing loaded
    Idle,
    Playing,
    Paused,
    /// The current track could not be loaded or streamed
    Failed,
}

/// How the current track is being played
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackMode {
    /// Real audio through the output
    Audio,
    /// Progress advanced by the engine clock alone; the track has no audio
    Simulated,
}

/// What happens once a failing track has used up its retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Advance to the next track; stay failed at the end of the queue
    #[default]
    Skip,
    /// Stay on the failed track until play is toggled
    Stay,
}

/// Notifications sent to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    TrackChanged {
        track: Track,
        index: Option<usize>,
    },
    StatusChanged(PlaybackStatus),
    Progress {
        position: f64,
        duration: f64,
    },
    QueueReplaced {
        len: usize,
        index: Option<usize>,
    },
    /// The last track in the queue finished
    QueueEnded,
    Failed {
        track_id: TrackId,
        message: String,
        retrying: bool,
    },
    SeekFailed {
        requested: f64,
        message: String,
    },
}

/// Events reported by an audio output
#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    /// The source opened; duration is known for most formats
    Loaded { duration: Option<f64> },
    /// Natural end of the source
    Ended,
    /// Loading or streaming failed; the output is unusable until the next load
    Error { message: String, retryable: bool },
    /// A seek could not be performed; playback continues where it was
    SeekFailed(String),
}
