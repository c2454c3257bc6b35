//! The capture-source collaborator trait.
//!
//! Opening and configuring the underlying device (discovery, format
//! negotiation, capability queries) happens outside this crate. The core
//! consumes only three primitives: a bounded wait for readiness, a one-frame
//! read, and the negotiated frame size.

use std::time::Duration;

use crate::error::Result;

/// Outcome of waiting for the source to have data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// A frame is ready to be read.
    Ready,
    /// The timeout elapsed with no data. Fatal during steady-state capture.
    TimedOut,
    /// The wait was interrupted (e.g. by a signal) and should be retried
    /// transparently.
    Interrupted,
}

/// A hardware capture source delivering frames at a roughly periodic rate.
///
/// The capture loop and the period estimator are the only callers, and they
/// are mutually exclusive: the grabber owns the source and moves it into the
/// capture thread while running, so a single read channel is never shared.
pub trait FrameSource: Send + 'static {
    /// Size of one frame in bytes, as negotiated with the device. Fixed for
    /// the lifetime of the source; the pool allocates buffers of this size.
    fn frame_size(&self) -> usize;

    /// Block until the source has a frame available, up to `timeout`.
    ///
    /// Errors are reserved for broken-source conditions; a plain timeout or
    /// an interrupted wait is reported through [`Readiness`].
    fn wait_ready(&mut self, timeout: Duration) -> Result<Readiness>;

    /// Read exactly one frame's worth of bytes into `dest`, returning the
    /// number of bytes read. `dest` is always `frame_size()` bytes long.
    fn read_frame(&mut self, dest: &mut [u8]) -> Result<usize>;
}
