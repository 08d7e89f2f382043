//! Resilience patterns for fault-tolerant operations
//!
//! - Retry with exponential backoff
//! - Coalescing (debounced) writes
//!
//! # Example
//!
//! ```rust
//! use resonance_resilience::RetryPolicy;
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new(3)
//!     .with_initial_delay(Duration::from_millis(100));
//! assert_eq!(policy.max_attempts(), 3);
//! ```

mod debounce;
mod error;
mod retry;

pub use debounce::{CoalescingWriter, CoalescingWriterBuilder};
pub use error::{ResilienceError, ResilienceResult};
pub use retry::{with_retry, RetryPolicy};
