//! Shared fixtures for playback engine tests

#![allow(dead_code)]

use playback_engine::{AudioOutput, EngineError, EngineResult, OutputEvent};
use resonance_core::{AudioSource, ProfileId, Track};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Calls the engine made on the output, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(String),
    Play,
    Pause,
    Seek(f64),
    Stop,
}

#[derive(Debug, Default)]
pub struct OutputScript {
    pub calls: Vec<Call>,
    pub events: VecDeque<OutputEvent>,
    pub position: f64,
    /// Number of upcoming loads that fail
    pub failing_loads: usize,
    pub load_failure_retryable: bool,
    pub fail_seeks: bool,
}

/// Scriptable output; clones share one script
#[derive(Clone, Default)]
pub struct FakeOutput {
    script: Arc<Mutex<OutputScript>>,
}

impl FakeOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self) -> MutexGuard<'_, OutputScript> {
        self.script.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script().calls.clone()
    }

    pub fn loads(&self) -> usize {
        self.script()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Load(_)))
            .count()
    }

    pub fn push_event(&self, event: OutputEvent) {
        self.script().events.push_back(event);
    }

    pub fn set_position(&self, seconds: f64) {
        self.script().position = seconds;
    }

    pub fn fail_loads(&self, count: usize, retryable: bool) {
        let mut script = self.script();
        script.failing_loads = count;
        script.load_failure_retryable = retryable;
    }
}

impl AudioOutput for FakeOutput {
    fn load(&mut self, source: &AudioSource) -> EngineResult<()> {
        let mut script = self.script();
        script.calls.push(Call::Load(source.reference()));
        script.position = 0.0;
        if script.failing_loads > 0 {
            script.failing_loads -= 1;
            return Err(if script.load_failure_retryable {
                EngineError::Network("connection reset".to_string())
            } else {
                EngineError::UnsupportedFormat("xm".to_string())
            });
        }
        Ok(())
    }

    fn play(&mut self) -> EngineResult<()> {
        self.script().calls.push(Call::Play);
        Ok(())
    }

    fn pause(&mut self) -> EngineResult<()> {
        self.script().calls.push(Call::Pause);
        Ok(())
    }

    fn seek(&mut self, seconds: f64) -> EngineResult<()> {
        let mut script = self.script();
        script.calls.push(Call::Seek(seconds));
        if script.fail_seeks {
            return Err(EngineError::SeekError("not seekable".to_string()));
        }
        script.position = seconds;
        Ok(())
    }

    fn stop(&mut self) {
        self.script().calls.push(Call::Stop);
    }

    fn position(&self) -> f64 {
        self.script.lock().unwrap().position
    }

    fn poll_event(&mut self) -> Option<OutputEvent> {
        self.script().events.pop_front()
    }
}

/// Track without audio, played on the simulated clock
pub fn silent_track(title: &str, secs: u32) -> Track {
    Track::new(title.to_string(), ProfileId::new(), "Vela".to_string()).with_duration_secs(secs)
}

/// Track with a local file source
pub fn audio_track(title: &str, secs: u32) -> Track {
    silent_track(title, secs).with_source(AudioSource::File(PathBuf::from(format!(
        "/music/{}.wav",
        title
    ))))
}

/// Writes a mono 16-bit PCM WAV of a quiet tone
pub fn write_wav(path: &Path, sample_rate: u32, seconds: f64) -> std::io::Result<()> {
    let frames = (f64::from(sample_rate) * seconds) as u32;
    let data_len = frames * 2;

    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());

    for i in 0..frames {
        let t = f64::from(i) / f64::from(sample_rate);
        let sample = ((t * 440.0 * std::f64::consts::TAU).sin() * 3000.0) as i16;
        bytes.extend_from_slice(&sample.to_le_bytes());
    }

    std::fs::write(path, bytes)
}
