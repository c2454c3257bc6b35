//! Recycling frame-buffer pool and capture loop for periodic frame sources.
//!
//! A single background producer fills a fixed set of pre-allocated frame
//! buffers from a hardware capture source while any number of readers take
//! temporally ordered, race-free views of the most recent frames. Buffers
//! are recycled in place: the oldest unread frame is reused for the next
//! capture, and a frame held by a reader is never overwritten. Under reader
//! pressure the oldest unread frame's data is dropped rather than blocking
//! the producer or growing the pool.
//!
//! # Architecture
//!
//! - [`FramePool`] - owns all frames, ordered newest to oldest behind a
//!   single pool-wide lock; answers "give me the last N frames" and "how
//!   many frames are newer than T" queries.
//! - [`FrameGrabber`] - the capture lifecycle: spawns the producer thread,
//!   stops it cooperatively, and runs one-shot period estimation.
//! - [`FrameSource`] - the collaborator trait wrapping the device's
//!   wait/read primitives; device discovery and format negotiation live
//!   outside this crate.
//! - [`Clock`] / [`Timestamp`] - the clock domain frames are stamped in.
//!
//! # Example
//!
//! ```
//! use framegrab::{CaptureConfig, FrameGrabber, FrameSource, Readiness, Result};
//! use std::time::Duration;
//!
//! /// Synthetic source producing one frame every 2 ms.
//! struct Counter {
//!     frame: u8,
//! }
//!
//! impl FrameSource for Counter {
//!     fn frame_size(&self) -> usize {
//!         16
//!     }
//!
//!     fn wait_ready(&mut self, _timeout: Duration) -> Result<Readiness> {
//!         std::thread::sleep(Duration::from_millis(2));
//!         Ok(Readiness::Ready)
//!     }
//!
//!     fn read_frame(&mut self, dest: &mut [u8]) -> Result<usize> {
//!         self.frame = self.frame.wrapping_add(1);
//!         dest.fill(self.frame);
//!         Ok(dest.len())
//!     }
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut grabber = FrameGrabber::new(Counter { frame: 0 }, CaptureConfig::default())?;
//!
//! grabber.start();
//! std::thread::sleep(Duration::from_millis(20));
//!
//! // Newest-first view of the two most recent frames.
//! let frames = grabber.acquire_front(2);
//! for frame in &frames {
//!     println!("{:?}: {} bytes", frame.timestamp(), frame.data().len());
//! }
//! grabber.release(frames);
//!
//! grabber.stop()?;
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod clock;
pub mod config;
pub mod error;
pub mod period;
pub mod pool;
pub mod source;

pub use capture::{CaptureStats, FrameGrabber};
pub use clock::{Clock, MonotonicClock, Timestamp};
pub use config::{CaptureConfig, CaptureConfigBuilder};
pub use error::{CaptureError, Result};
pub use period::PeriodEstimate;
pub use pool::{Frame, FrameHandle, FramePool};
pub use source::{FrameSource, Readiness};
