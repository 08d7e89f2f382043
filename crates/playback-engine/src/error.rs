use resonance_core::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Audio source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Output error: {0}")]
    OutputError(String),

    #[error("Seek error: {0}")]
    SeekError(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl EngineError {
    /// Whether loading the same source again could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::SourceUnavailable(_)
                | EngineError::Network(_)
                | EngineError::OutputError(_)
                | EngineError::IoError(_)
        )
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::SourceUnavailable(reason) => AppError::AudioSourceUnavailable {
                source_ref: String::new(),
                reason,
            },
            EngineError::Network(message) => AppError::NetworkError {
                message,
                source: None,
            },
            EngineError::UnsupportedFormat(format) => AppError::UnsupportedFormat {
                format,
                source_ref: String::new(),
            },
            EngineError::DecodeError(message) | EngineError::SeekError(message) => {
                AppError::AudioDecodeError {
                    message,
                    source: None,
                }
            }
            EngineError::OutputError(message) => AppError::PlaybackDeviceError { message },
            EngineError::InvalidState(message) => AppError::InternalError { message },
            EngineError::IoError(e) => AppError::from(e),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
