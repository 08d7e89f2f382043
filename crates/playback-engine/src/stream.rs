//! Decoding output that streams a source on its own thread

use crate::decoder::AudioDecoder;
use crate::error::{EngineError, EngineResult};
use crate::output::AudioOutput;
use crate::types::OutputEvent;
use crossbeam_channel::{
    bounded, unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError,
};
use resonance_core::AudioSource;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How long an idle stream waits for a command before checking again
const IDLE_POLL: Duration = Duration::from_millis(50);
/// How far decoding may run ahead of the wall clock
const MAX_AHEAD: f64 = 0.25;

/// Where decoded samples go
pub trait SampleSink: Send {
    fn open(&mut self, sample_rate: u32, channels: usize) -> EngineResult<()>;

    /// Accepts interleaved samples
    fn write(&mut self, samples: &[f32]) -> EngineResult<()>;
}

/// Discards samples; timing still follows the wall clock
#[derive(Debug, Default)]
pub struct NullSink;

impl SampleSink for NullSink {
    fn open(&mut self, _sample_rate: u32, _channels: usize) -> EngineResult<()> {
        Ok(())
    }

    fn write(&mut self, _samples: &[f32]) -> EngineResult<()> {
        Ok(())
    }
}

type SinkFactory = Box<dyn Fn() -> Box<dyn SampleSink> + Send>;

#[derive(Debug, Clone, Copy, PartialEq)]
enum StreamCommand {
    Play,
    Pause,
    Seek(f64),
    Stop,
}

struct Session {
    commands: Sender<StreamCommand>,
    events: Receiver<OutputEvent>,
    position: Arc<AtomicU64>,
}

/// [`AudioOutput`] backed by symphonia.
///
/// Each load starts a fresh stream thread with its own event channel, so
/// events from a replaced source are never observed.
pub struct StreamOutput {
    session: Option<Session>,
    sink_factory: SinkFactory,
}

impl StreamOutput {
    /// Creates an output that paces samples into a [`NullSink`]
    pub fn new() -> Self {
        Self::with_sink_factory(|| Box::new(NullSink))
    }

    /// Creates an output that opens a new sink from `factory` for every load
    pub fn with_sink_factory<F>(factory: F) -> Self
    where
        F: Fn() -> Box<dyn SampleSink> + Send + 'static,
    {
        Self {
            session: None,
            sink_factory: Box::new(factory),
        }
    }

    fn send(&self, command: StreamCommand) -> EngineResult<()> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| EngineError::InvalidState("No source loaded".to_string()))?;
        session
            .commands
            .send(command)
            .map_err(|_| EngineError::OutputError("Stream is no longer running".to_string()))
    }
}

impl Default for StreamOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioOutput for StreamOutput {
    fn load(&mut self, source: &AudioSource) -> EngineResult<()> {
        self.stop();

        let (command_tx, command_rx) = bounded(16);
        let (event_tx, event_rx) = unbounded();
        let position = Arc::new(AtomicU64::new(0f64.to_bits()));

        let sink = (self.sink_factory)();
        let thread_source = source.clone();
        let thread_position = Arc::clone(&position);

        thread::Builder::new()
            .name("audio-stream".to_string())
            .spawn(move || {
                stream_loop(thread_source, sink, command_rx, event_tx, thread_position)
            })?;

        log::debug!("Streaming {}", source);
        self.session = Some(Session {
            commands: command_tx,
            events: event_rx,
            position,
        });
        Ok(())
    }

    fn play(&mut self) -> EngineResult<()> {
        self.send(StreamCommand::Play)
    }

    fn pause(&mut self) -> EngineResult<()> {
        self.send(StreamCommand::Pause)
    }

    fn seek(&mut self, seconds: f64) -> EngineResult<()> {
        self.send(StreamCommand::Seek(seconds))
    }

    fn stop(&mut self) {
        // The thread may still be fetching; it exits at its next command check
        if let Some(session) = self.session.take() {
            let _ = session.commands.try_send(StreamCommand::Stop);
        }
    }

    fn position(&self) -> f64 {
        self.session
            .as_ref()
            .map(|s| f64::from_bits(s.position.load(Ordering::Relaxed)))
            .unwrap_or(0.0)
    }

    fn poll_event(&mut self) -> Option<OutputEvent> {
        self.session.as_ref()?.events.try_recv().ok()
    }
}

impl Drop for StreamOutput {
    fn drop(&mut self) {
        self.stop();
    }
}

fn stream_loop(
    source: AudioSource,
    mut sink: Box<dyn SampleSink>,
    commands: Receiver<StreamCommand>,
    events: Sender<OutputEvent>,
    position: Arc<AtomicU64>,
) {
    let report = |e: EngineError| {
        log::error!("Stream of {} failed: {}", source, e);
        let _ = events.send(OutputEvent::Error {
            retryable: e.is_retryable(),
            message: e.to_string(),
        });
    };

    let mut decoder = match AudioDecoder::open(&source) {
        Ok(decoder) => decoder,
        Err(e) => return report(e),
    };

    let spec = *decoder.spec();
    let rate = f64::from(spec.rate);
    if let Err(e) = sink.open(spec.rate, spec.channels.count()) {
        return report(e);
    }
    let _ = events.send(OutputEvent::Loaded {
        duration: decoder.duration(),
    });

    let mut playing = false;
    let mut exhausted = false;
    let mut decoded = 0.0_f64;
    let mut heard = 0.0_f64;
    // Wall-clock instant and stream position playback last resumed from
    let mut anchor: Option<(Instant, f64)> = None;

    loop {
        let command = if playing {
            match commands.try_recv() {
                Ok(command) => Some(command),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => break,
            }
        } else {
            match commands.recv_timeout(IDLE_POLL) {
                Ok(command) => Some(command),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        };

        match command {
            Some(StreamCommand::Play) if !playing => {
                playing = true;
                anchor = Some((Instant::now(), heard));
            }
            Some(StreamCommand::Pause) if playing => {
                heard = audible(anchor, decoded);
                playing = false;
                anchor = None;
            }
            Some(StreamCommand::Seek(target)) => match decoder.seek(target) {
                Ok(reached) => {
                    decoded = reached;
                    heard = reached;
                    exhausted = false;
                    if playing {
                        anchor = Some((Instant::now(), heard));
                    }
                    position.store(heard.to_bits(), Ordering::Relaxed);
                }
                Err(e) => {
                    let _ = events.send(OutputEvent::SeekFailed(e.to_string()));
                }
            },
            Some(StreamCommand::Stop) => break,
            _ => {}
        }

        if !playing {
            continue;
        }

        let now_heard = audible(anchor, decoded);
        position.store(now_heard.to_bits(), Ordering::Relaxed);

        if exhausted {
            if now_heard >= decoded {
                heard = decoded;
                playing = false;
                anchor = None;
                let _ = events.send(OutputEvent::Ended);
            } else {
                thread::sleep(Duration::from_secs_f64((decoded - now_heard).min(0.05)));
            }
            continue;
        }

        let ahead = decoded - now_heard;
        if ahead > MAX_AHEAD {
            thread::sleep(Duration::from_secs_f64((ahead - MAX_AHEAD).min(0.05)));
            continue;
        }

        match decoder.decode_next() {
            Ok(Some(audio)) => {
                if let Err(e) = sink.write(&audio.samples) {
                    return report(e);
                }
                decoded += audio.frames as f64 / rate;
            }
            Ok(None) => exhausted = true,
            Err(e) => return report(e),
        }
    }

    log::debug!("Stream of {} closed", source);
}

/// Position the listener has reached, never past what was decoded
fn audible(anchor: Option<(Instant, f64)>, decoded: f64) -> f64 {
    match anchor {
        Some((at, from)) => (from + at.elapsed().as_secs_f64()).min(decoded),
        None => decoded,
    }
}
