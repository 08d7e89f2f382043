//! Error types for resilience operations

use thiserror::Error;

/// Result type for resilience operations
pub type ResilienceResult<T> = Result<T, ResilienceError>;

/// Errors that can occur in resilience operations
#[derive(Debug, Error)]
pub enum ResilienceError {
    /// All retry attempts exhausted
    #[error("All {attempts} retry attempts exhausted: {last_error}")]
    RetriesExhausted { attempts: usize, last_error: String },

    /// A buffered write could not be flushed
    #[error("Flush for '{key}' failed: {message}")]
    FlushFailed { key: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_exhausted_error() {
        let err = ResilienceError::RetriesExhausted {
            attempts: 3,
            last_error: "connection failed".to_string(),
        };
        assert!(err.to_string().contains("3"));
        assert!(err.to_string().contains("connection failed"));
    }

    #[test]
    fn test_flush_failed_error() {
        let err = ResilienceError::FlushFailed {
            key: "DisplayName".to_string(),
            message: "database is locked".to_string(),
        };
        assert!(err.to_string().contains("DisplayName"));
        assert!(err.to_string().contains("locked"));
    }
}
