//! Error types and recovery strategies for Resonance
//!
//! Errors carry a severity tier and a recommended recovery action:
//! - **Recoverable**: can be retried automatically (network hiccups, locked database)
//! - **Degraded**: the item or feature is skipped but the app keeps running
//! - **Fatal**: requires user intervention (corrupted store, broken configuration)

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Recovery actions that can be taken when an error occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Retry the operation immediately
    RetryImmediate,
    /// Retry with exponential backoff
    RetryWithBackoff,
    /// Skip the failing item and continue with the next one
    SkipItem,
    /// Disable the failing feature and continue
    DisableFeature,
    /// Restore from the most recent backup
    RestoreBackup,
    /// No automatic recovery - user intervention required
    UserIntervention,
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetryImmediate => write!(f, "Retrying immediately"),
            Self::RetryWithBackoff => write!(f, "Retrying with backoff"),
            Self::SkipItem => write!(f, "Skipping item"),
            Self::DisableFeature => write!(f, "Disabling feature"),
            Self::RestoreBackup => write!(f, "Restoring from backup"),
            Self::UserIntervention => write!(f, "User intervention required"),
        }
    }
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Error can be automatically recovered from
    Recoverable,
    /// Feature degraded but app can continue
    Degraded,
    /// Critical error requiring user action
    Fatal,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recoverable => write!(f, "Recoverable"),
            Self::Degraded => write!(f, "Degraded"),
            Self::Fatal => write!(f, "Fatal"),
        }
    }
}

/// Main error type for Resonance
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Network Errors =====
    /// Network request failed
    #[error("Network error: {message}")]
    NetworkError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Network timeout
    #[error("Network timeout after {seconds}s: {operation}")]
    NetworkTimeout { operation: String, seconds: u64 },

    /// Connection lost while streaming
    #[error("Connection lost: {message}")]
    ConnectionLost { message: String },

    // ===== Store Errors =====
    /// Content store operation failed
    #[error("Database error: {message}")]
    DatabaseError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Content store is corrupted
    #[error("Database corrupted: {details}")]
    DatabaseCorrupted { details: String },

    /// Content store is locked by another process
    #[error("Database locked: {operation}")]
    DatabaseLocked { operation: String },

    /// Record not found in the content store
    #[error("Record not found: {entity} with {identifier}")]
    RecordNotFound { entity: String, identifier: String },

    // ===== Audio Errors =====
    /// Audio source cannot be opened or fetched
    #[error("Audio source unavailable: {source_ref} - {reason}")]
    AudioSourceUnavailable { source_ref: String, reason: String },

    /// Unsupported audio format
    #[error("Unsupported audio format: {format} in {source_ref}")]
    UnsupportedFormat { format: String, source_ref: String },

    /// Audio decoding failed
    #[error("Audio decode error: {message}")]
    AudioDecodeError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Audio output error
    #[error("Playback device error: {message}")]
    PlaybackDeviceError { message: String },

    /// Invalid seek target
    #[error("Invalid audio position: {position}ms (track duration: {duration}ms)")]
    InvalidPosition { position: u64, duration: u64 },

    // ===== Access Errors =====
    /// Content is gated by parental controls
    #[error("Access denied: {reason}")]
    AccessDenied { reason: String },

    // ===== File System Errors =====
    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Permission denied for file operation
    #[error("Permission denied: {operation} on {path}")]
    PermissionDenied { operation: String, path: PathBuf },

    /// General I/O error
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: io::Error,
    },

    // ===== Validation / Configuration Errors =====
    /// An entity failed validation
    #[error("Invalid {entity}: {}", .errors.join("; "))]
    ValidationFailed { entity: String, errors: Vec<String> },

    /// Invalid configuration
    #[error("Invalid configuration: {setting} = '{value}' ({reason})")]
    InvalidConfiguration {
        setting: String,
        value: String,
        reason: String,
    },

    /// Configuration file corrupted
    #[error("Configuration corrupted: {path}")]
    ConfigurationCorrupted { path: PathBuf },

    // ===== Generic Errors =====
    /// Generic internal error
    #[error("Internal error: {message}")]
    InternalError { message: String },

    /// Operation cancelled by user
    #[error("Operation cancelled: {operation}")]
    Cancelled { operation: String },

    /// Invalid argument provided
    #[error("Invalid argument: {argument} - {reason}")]
    InvalidArgument { argument: String, reason: String },
}

impl AppError {
    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NetworkError { .. }
            | Self::NetworkTimeout { .. }
            | Self::ConnectionLost { .. }
            | Self::DatabaseLocked { .. } => ErrorSeverity::Recoverable,

            Self::AudioSourceUnavailable { .. }
            | Self::UnsupportedFormat { .. }
            | Self::AudioDecodeError { .. }
            | Self::PlaybackDeviceError { .. } => ErrorSeverity::Degraded,

            Self::DatabaseCorrupted { .. } | Self::ConfigurationCorrupted { .. } => {
                ErrorSeverity::Fatal
            }

            _ => ErrorSeverity::Degraded,
        }
    }

    /// Returns the recommended recovery action for this error
    pub fn recovery_action(&self) -> RecoveryAction {
        match self {
            Self::NetworkTimeout { .. } | Self::ConnectionLost { .. } => {
                RecoveryAction::RetryImmediate
            }

            Self::NetworkError { .. }
            | Self::DatabaseLocked { .. }
            | Self::AudioSourceUnavailable { .. } => RecoveryAction::RetryWithBackoff,

            Self::UnsupportedFormat { .. } | Self::AudioDecodeError { .. } => {
                RecoveryAction::SkipItem
            }

            Self::PlaybackDeviceError { .. } => RecoveryAction::DisableFeature,

            Self::ConfigurationCorrupted { .. } => RecoveryAction::RestoreBackup,

            _ => RecoveryAction::UserIntervention,
        }
    }

    /// Returns a user-friendly error message suitable for a toast
    pub fn user_message(&self) -> String {
        match self {
            Self::NetworkError { .. } | Self::NetworkTimeout { .. } => {
                "Cannot connect to the internet. Please check your connection.".to_string()
            }
            Self::ConnectionLost { .. } => {
                "The stream was interrupted. Press play to retry.".to_string()
            }

            Self::DatabaseError { .. } | Self::DatabaseLocked { .. } => {
                "Your music library is temporarily unavailable. Please try again.".to_string()
            }
            Self::DatabaseCorrupted { .. } => {
                "The music library is damaged and needs repair.".to_string()
            }
            Self::RecordNotFound { entity, .. } => format!("{} was not found.", entity),

            Self::AudioSourceUnavailable { .. } => {
                "This song cannot be loaded right now.".to_string()
            }
            Self::UnsupportedFormat { format, .. } => {
                format!("This audio format ({}) is not supported.", format)
            }
            Self::AudioDecodeError { .. } => {
                "Cannot play this song. The audio may be damaged.".to_string()
            }
            Self::PlaybackDeviceError { .. } => {
                "Cannot access audio playback. Please check your device settings.".to_string()
            }
            Self::InvalidPosition { .. } => "Cannot seek to that position.".to_string(),

            Self::AccessDenied { .. } => {
                "This content is protected by parental controls.".to_string()
            }

            Self::FileNotFound { .. } => {
                "The file was not found. It may have been moved or deleted.".to_string()
            }
            Self::PermissionDenied { .. } => "Permission denied.".to_string(),
            Self::IoError { .. } => "A file operation failed. Please try again.".to_string(),

            Self::ValidationFailed { errors, .. } => errors.join(" "),
            Self::InvalidConfiguration { setting, .. } => {
                format!("Invalid setting: {}. Please check your configuration.", setting)
            }
            Self::ConfigurationCorrupted { .. } => {
                "App settings are corrupted. Resetting to defaults...".to_string()
            }

            Self::InternalError { .. } => {
                "An unexpected error occurred. Please try again.".to_string()
            }
            Self::Cancelled { .. } => "Operation was cancelled.".to_string(),
            Self::InvalidArgument { .. } => "Invalid input provided.".to_string(),
        }
    }

    /// Returns true if this error should be logged at ERROR level
    pub fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Fatal
    }

    /// Returns true if this error can be automatically retried
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.recovery_action(),
            RecoveryAction::RetryImmediate | RecoveryAction::RetryWithBackoff
        )
    }

    /// Helper to create a network error from any error type
    pub fn network<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Helper to create a database error from any error type
    pub fn database<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::DatabaseError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Helper to create an audio decode error from any error type
    pub fn audio_decode<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::AudioDecodeError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Helper to wrap validator output
    pub fn validation(entity: impl Into<String>, errors: Vec<String>) -> Self {
        Self::ValidationFailed {
            entity: entity.into(),
            errors,
        }
    }
}

/// Convenience type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound {
                path: PathBuf::from("unknown"),
            },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                operation: "file operation".to_string(),
                path: PathBuf::from("unknown"),
            },
            _ => Self::IoError {
                message: err.to_string(),
                source: err,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_recovery_action_display() {
        assert_eq!(
            RecoveryAction::RetryImmediate.to_string(),
            "Retrying immediately"
        );
        assert_eq!(RecoveryAction::SkipItem.to_string(), "Skipping item");
        assert_eq!(
            RecoveryAction::UserIntervention.to_string(),
            "User intervention required"
        );
    }

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Recoverable < ErrorSeverity::Degraded);
        assert!(ErrorSeverity::Degraded < ErrorSeverity::Fatal);
    }

    #[test]
    fn test_network_errors_are_retryable() {
        let err = AppError::ConnectionLost {
            message: "reset by peer".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Recoverable);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_decode_errors_skip_the_track() {
        let err = AppError::UnsupportedFormat {
            format: "wma".to_string(),
            source_ref: "/music/a.wma".to_string(),
        };
        assert_eq!(err.recovery_action(), RecoveryAction::SkipItem);
        assert!(!err.is_retryable());
        assert!(err.user_message().contains("wma"));
    }

    #[test]
    fn test_access_denied_message() {
        let err = AppError::AccessDenied {
            reason: "wrong PIN".to_string(),
        };
        assert_eq!(err.recovery_action(), RecoveryAction::UserIntervention);
        assert!(err.user_message().contains("parental controls"));
        assert!(err.to_string().contains("wrong PIN"));
    }

    #[test]
    fn test_validation_error_joins_messages() {
        let err = AppError::validation(
            "Track",
            vec!["Title cannot be empty".to_string(), "Bad".to_string()],
        );
        assert_eq!(err.to_string(), "Invalid Track: Title cannot be empty; Bad");
    }

    #[test]
    fn test_database_helper_keeps_source() {
        let io = io::Error::new(io::ErrorKind::Other, "disk");
        let err = AppError::database("Failed to write", io);
        assert!(err.source().is_some());
        assert!(!err.is_critical());
    }

    #[test]
    fn test_from_io_not_found() {
        let err: AppError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, AppError::FileNotFound { .. }));
    }
}
