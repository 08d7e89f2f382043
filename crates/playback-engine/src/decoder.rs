use crate::error::{EngineError, EngineResult};
use resonance_core::AudioSource;
use std::io::Cursor;
use std::time::Duration;
use symphonia::core::audio::{AudioBufferRef, SampleBuffer, SignalSpec};
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::{Time, TimeBase};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Decodes one audio source into interleaved `f32` samples
pub struct AudioDecoder {
    reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    spec: SignalSpec,
    time_base: Option<TimeBase>,
    duration: Option<f64>,
}

pub struct DecodedAudio {
    /// Interleaved samples
    pub samples: Vec<f32>,
    pub frames: usize,
    pub spec: SignalSpec,
}

impl AudioDecoder {
    /// Opens a local file directly or downloads a URL, then probes its format
    pub fn open(source: &AudioSource) -> EngineResult<Self> {
        let media: Box<dyn MediaSource> = match source {
            AudioSource::File(path) => {
                let file = std::fs::File::open(path).map_err(|e| {
                    EngineError::SourceUnavailable(format!("{}: {}", path.display(), e))
                })?;
                Box::new(file)
            }
            AudioSource::Url(url) => Box::new(Cursor::new(fetch(url)?)),
        };

        Self::from_media(media, source.extension().as_deref())
    }

    fn from_media(media: Box<dyn MediaSource>, extension: Option<&str>) -> EngineResult<Self> {
        let mss = MediaSourceStream::new(media, Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = extension {
            hint.with_extension(extension);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| match e {
                SymphoniaError::Unsupported(what) => EngineError::UnsupportedFormat(what.to_string()),
                other => EngineError::DecodeError(format!("Failed to probe format: {}", other)),
            })?;

        let reader = probed.format;

        let track = reader
            .default_track()
            .ok_or_else(|| EngineError::DecodeError("No audio track found".to_string()))?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| match e {
                SymphoniaError::Unsupported(what) => EngineError::UnsupportedFormat(what.to_string()),
                other => EngineError::DecodeError(format!("Failed to create decoder: {}", other)),
            })?;

        let sample_rate = codec_params.sample_rate.unwrap_or(44100);
        let spec = SignalSpec::new(sample_rate, codec_params.channels.unwrap_or_default());
        let duration = codec_params
            .n_frames
            .map(|frames| frames as f64 / f64::from(sample_rate));

        Ok(Self {
            reader,
            decoder,
            track_id,
            spec,
            time_base: codec_params.time_base,
            duration,
        })
    }

    /// Decodes the next packet; `None` at end of stream
    pub fn decode_next(&mut self) -> EngineResult<Option<DecodedAudio>> {
        loop {
            let packet = match self.reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => return Ok(None),
                Err(e) => {
                    return Err(EngineError::DecodeError(format!(
                        "Failed to read packet: {}",
                        e
                    )));
                }
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    log::warn!("Decode error, skipping packet: {}", e);
                    continue;
                }
                Err(e) => {
                    return Err(EngineError::DecodeError(format!(
                        "Failed to decode packet: {}",
                        e
                    )));
                }
            };

            let spec = *decoded.spec();
            let frames = decoded.frames();
            let samples = interleave(decoded);

            return Ok(Some(DecodedAudio {
                samples,
                frames,
                spec,
            }));
        }
    }

    pub fn spec(&self) -> &SignalSpec {
        &self.spec
    }

    /// Total length in seconds when the container declares it
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Seeks to `time_secs` and returns the position actually reached
    pub fn seek(&mut self, time_secs: f64) -> EngineResult<f64> {
        let time = Time::new(time_secs.trunc() as u64, time_secs.fract());

        let seeked = self
            .reader
            .seek(
                SeekMode::Accurate,
                SeekTo::Time {
                    time,
                    track_id: Some(self.track_id),
                },
            )
            .map_err(|e| EngineError::SeekError(format!("Failed to seek: {}", e)))?;

        self.decoder.reset();

        let reached = match self.time_base {
            Some(base) => {
                let t = base.calc_time(seeked.actual_ts);
                t.seconds as f64 + t.frac
            }
            None => time_secs,
        };
        Ok(reached)
    }
}

fn interleave(decoded: AudioBufferRef<'_>) -> Vec<f32> {
    let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
    buffer.copy_interleaved_ref(decoded);
    buffer.samples().to_vec()
}

/// Downloads a remote source into memory
fn fetch(url: &str) -> EngineResult<Vec<u8>> {
    log::debug!("Fetching audio from {}", url);

    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| EngineError::Network(format!("Failed to build HTTP client: {}", e)))?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| EngineError::Network(format!("{}: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        let message = format!("{} returned {}", url, status);
        return Err(if status.is_server_error() {
            EngineError::Network(message)
        } else {
            EngineError::SourceUnavailable(message)
        });
    }

    let bytes = response
        .bytes()
        .map_err(|e| EngineError::Network(format!("{}: {}", url, e)))?;
    Ok(bytes.to_vec())
}
