//! Buffer pool with a temporally ordered ledger.
//!
//! The pool owns a fixed set of frames, allocated once and recycled in
//! place. A `VecDeque` keeps them ordered newest to oldest: the capture loop
//! reclaims the oldest reader-free frame from the back, fills it, and
//! publishes it at the front; readers acquire handles from the front. One
//! pool-wide lock guards the ledger order and is never held across a
//! blocking wait or read.
//!
//! Frames live in `Arc`s. Only ledgered frames are reachable from
//! [`FramePool::acquire_front`], and reclamation succeeds only when the
//! ledger holds the sole reference, so the writer's exclusive access goes
//! through `Arc::get_mut` and is compiler-checked rather than a convention.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::clock::Timestamp;

/// A fixed-capacity frame buffer plus its capture timestamp and outstanding
/// reader count.
#[derive(Debug)]
pub struct Frame {
    timestamp: Timestamp,
    data: Box<[u8]>,
    /// Outstanding acquisitions. A frame with readers is never reclaimed.
    reader_count: AtomicI32,
}

impl Frame {
    fn new(size: usize) -> Self {
        Self {
            timestamp: Timestamp::NEVER,
            data: vec![0u8; size].into_boxed_slice(),
            reader_count: AtomicI32::new(0),
        }
    }

    /// Capture time, or [`Timestamp::NEVER`] if the frame was never filled.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// The frame's bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn readers(&self) -> i32 {
        self.reader_count.load(Ordering::SeqCst)
    }
}

/// Read-only handle to an acquired frame.
///
/// The frame cannot be reused for writing while any handle to it exists.
/// Dropping the handle releases it; [`FramePool::release`] is the explicit
/// form for releasing a whole acquisition at once.
#[derive(Debug)]
pub struct FrameHandle {
    frame: Arc<Frame>,
}

impl FrameHandle {
    /// Capture time of the held frame.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.frame.timestamp
    }

    /// Bytes of the held frame.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.frame.data
    }
}

impl Drop for FrameHandle {
    fn drop(&mut self) {
        let prev = self.frame.reader_count.fetch_sub(1, Ordering::SeqCst);
        assert!(prev > 0, "frame reader count underflow");
    }
}

/// A frame removed from the ledger for writing.
///
/// Unreachable from `acquire_front` until published again. Holds the sole
/// reference to the frame, so mutation is exclusive.
pub(crate) struct ReclaimedFrame {
    frame: Arc<Frame>,
}

impl ReclaimedFrame {
    fn frame_mut(&mut self) -> &mut Frame {
        Arc::get_mut(&mut self.frame).expect("reclaimed frame is uniquely held")
    }

    /// Writable view of the frame's bytes.
    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.frame_mut().data
    }

    /// Stamp the frame with its capture time.
    pub(crate) fn set_timestamp(&mut self, timestamp: Timestamp) {
        self.frame_mut().timestamp = timestamp;
    }
}

/// Pool of pre-allocated frames ordered newest to oldest.
///
/// The frame set is fixed at construction: frames are only relocated within
/// the order, never created or destroyed, until the pool itself is dropped.
#[derive(Debug)]
pub struct FramePool {
    ledger: Mutex<VecDeque<Arc<Frame>>>,
    frame_count: usize,
    frame_size: usize,
}

impl FramePool {
    /// Create a pool of `frame_count` frames of `frame_size` bytes each.
    ///
    /// # Panics
    ///
    /// Panics if `frame_count` is not greater than 1 or `frame_size` is 0.
    #[must_use]
    pub fn new(frame_count: usize, frame_size: usize) -> Self {
        assert!(frame_count > 1, "frame_count must be > 1");
        assert!(frame_size > 0, "frame_size must be > 0");

        let ledger = (0..frame_count)
            .map(|_| Arc::new(Frame::new(frame_size)))
            .collect();

        info!(frame_count, frame_size, "frame pool created");

        Self {
            ledger: Mutex::new(ledger),
            frame_count,
            frame_size,
        }
    }

    /// Number of frames in the pool.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Size of each frame in bytes.
    #[must_use]
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Acquire up to `n` frames from the front of the order, newest first.
    ///
    /// Fewer are returned if the pool holds fewer; `n` larger than the pool
    /// silently clamps. Acquired frames cannot be reused for writing until
    /// every returned handle is released.
    #[must_use]
    pub fn acquire_front(&self, n: usize) -> Vec<FrameHandle> {
        let ledger = self.ledger.lock();
        ledger
            .iter()
            .take(n)
            .map(|frame| {
                frame.reader_count.fetch_add(1, Ordering::SeqCst);
                FrameHandle {
                    frame: Arc::clone(frame),
                }
            })
            .collect()
    }

    /// Release a previously acquired set of handles.
    ///
    /// Equivalent to dropping them; provided so acquisitions read as a
    /// paired acquire/release at the call site. Frames are not reordered by
    /// release.
    pub fn release(&self, handles: Vec<FrameHandle>) {
        drop(handles);
    }

    /// Number of frames newer than `t`, walking from the front until a
    /// timestamp at or before `t` is found.
    ///
    /// Returns 0 if the front frame is already at or before `t`. Never-filled
    /// frames carry the sentinel timestamp and are never counted.
    #[must_use]
    pub fn count_newer_than(&self, t: Timestamp) -> usize {
        let ledger = self.ledger.lock();
        ledger.iter().take_while(|frame| frame.timestamp > t).count()
    }

    /// Remove the oldest frame from the order for writing, or `None` if it
    /// is still held by a reader (busy).
    ///
    /// Busy is flow control, not an error: the caller retries later instead
    /// of blocking. A handle released between the count decrement and the
    /// drop of its `Arc` leaves the frame momentarily shared; that window is
    /// also treated as busy.
    pub(crate) fn reclaim_oldest_for_write(&self) -> Option<ReclaimedFrame> {
        let mut ledger = self.ledger.lock();
        {
            let oldest = ledger.back()?;
            if oldest.readers() > 0 || Arc::strong_count(oldest) != 1 {
                return None;
            }
        }
        let frame = ledger.pop_back()?;
        Some(ReclaimedFrame { frame })
    }

    /// Insert a freshly written frame at the front of the order.
    ///
    /// Must only be called after [`Self::reclaim_oldest_for_write`], with the
    /// frame's data and timestamp already updated; the writer must not touch
    /// the frame afterwards (enforced by the move).
    pub(crate) fn publish(&self, reclaimed: ReclaimedFrame) {
        let mut ledger = self.ledger.lock();
        ledger.push_front(reclaimed.frame);
    }
}
