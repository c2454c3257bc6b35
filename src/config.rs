//! Capture configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CaptureError, Result};

/// Configuration for a [`FrameGrabber`](crate::FrameGrabber).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Number of frames in the pool. Must be greater than 1 so one frame can
    /// be written while another is read.
    pub frame_count: usize,

    /// Requested frame size in bytes. The size actually granted by the
    /// source wins; a mismatch is reported, not an error.
    pub frame_size: Option<usize>,

    /// Bound on a single wait for source readiness. A wait that times out
    /// during steady-state capture means the device stalled and is fatal.
    #[serde(with = "humantime_serde")]
    pub wait_timeout: Duration,

    /// Sleep between reclamation attempts while the oldest frame is still
    /// held by a reader. Must be non-zero so the loop cannot busy-spin.
    #[serde(with = "humantime_serde")]
    pub busy_backoff: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            frame_count: 4,
            frame_size: None,
            wait_timeout: Duration::from_secs(2),
            busy_backoff: Duration::from_millis(2),
        }
    }
}

impl CaptureConfig {
    /// Create a new builder.
    #[must_use]
    pub fn builder() -> CaptureConfigBuilder {
        CaptureConfigBuilder::default()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.frame_count < 2 {
            return Err(CaptureError::InvalidConfig {
                message: format!(
                    "frame_count {} too small: the pool needs at least 2 frames",
                    self.frame_count
                ),
            });
        }
        if self.wait_timeout.is_zero() {
            return Err(CaptureError::InvalidConfig {
                message: "wait_timeout must be non-zero".to_string(),
            });
        }
        if self.busy_backoff.is_zero() {
            return Err(CaptureError::InvalidConfig {
                message: "busy_backoff must be non-zero to avoid spinning".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for [`CaptureConfig`].
#[derive(Debug, Default)]
pub struct CaptureConfigBuilder {
    config: CaptureConfig,
}

impl CaptureConfigBuilder {
    /// Set the number of frames in the pool.
    #[must_use]
    pub fn frame_count(mut self, count: usize) -> Self {
        self.config.frame_count = count;
        self
    }

    /// Set the requested frame size in bytes.
    #[must_use]
    pub fn frame_size(mut self, size: usize) -> Self {
        self.config.frame_size = Some(size);
        self
    }

    /// Set the bound on a single readiness wait.
    #[must_use]
    pub fn wait_timeout(mut self, timeout: Duration) -> Self {
        self.config.wait_timeout = timeout;
        self
    }

    /// Set the sleep between reclamation attempts while the oldest frame is
    /// held.
    #[must_use]
    pub fn busy_backoff(mut self, backoff: Duration) -> Self {
        self.config.busy_backoff = backoff;
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<CaptureConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
