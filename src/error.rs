//! Error types for capture operations.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for capture operations.
pub type Result<T> = std::result::Result<T, CaptureError>;

/// Errors that can occur while capturing or estimating the frame period.
///
/// Programming-contract violations (starting an already running grabber,
/// releasing a frame twice, tearing down while capturing) are not represented
/// here; they are asserts and fail fast.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The source produced no data within the wait timeout. During
    /// steady-state capture this means the device stalled and is fatal.
    #[error("frame source stalled: no data within {waited:?}")]
    SourceStalled {
        /// How long the wait blocked before giving up.
        waited: Duration,
    },

    /// Waiting for source readiness failed for a reason other than an
    /// interrupted call. Fatal: the source is assumed broken.
    #[error("wait on frame source failed: {message}")]
    WaitFailed {
        /// Description from the source.
        message: String,
    },

    /// Reading a frame from the source failed. Fatal: the source is assumed
    /// to be in a broken state not worth retrying silently.
    #[error("frame read failed: {message}")]
    ReadFailed {
        /// Description from the source.
        message: String,
    },

    /// I/O error from the operating system.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration or parameter.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// What was wrong with the configuration.
        message: String,
    },

    /// The estimation window ended before two timestamps were recorded, so
    /// no inter-arrival interval exists.
    #[error("period estimation needs at least two samples, got {count}")]
    InsufficientSamples {
        /// Number of timestamps actually recorded.
        count: usize,
    },

    /// The capture thread died on a fatal condition. The whole capture
    /// pipeline must be rebuilt; there is no fine-grained recovery.
    #[error("capture thread panicked; restart the capture pipeline")]
    CaptureThreadPanicked,
}

impl CaptureError {
    /// Whether this error indicates a broken source or environment, as
    /// opposed to a rejected input.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::InvalidConfig { .. } | Self::InsufficientSamples { .. }
        )
    }
}
