//! The capture loop: a single background producer filling the pool.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info, trace, warn};

use crate::clock::{Clock, MonotonicClock, Timestamp};
use crate::config::CaptureConfig;
use crate::error::{CaptureError, Result};
use crate::period::{self, PeriodEstimate};
use crate::pool::{FrameHandle, FramePool};
use crate::source::{FrameSource, Readiness};

/// Counters snapshot for a grabber.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureStats {
    /// Frames captured and published since construction.
    pub frames_captured: u64,
    /// Capture cycles skipped because the oldest frame was held by a reader.
    pub busy_skips: u64,
}

/// Owns the frame pool, the capture source, and the producer thread.
///
/// Exactly one producer runs at a time. `start()`/`stop()` move the source
/// into and out of the capture thread, so the period estimator (which needs
/// the source too) can only run while capture is stopped; the single read
/// channel is never shared.
pub struct FrameGrabber<S: FrameSource, C: Clock = MonotonicClock> {
    config: CaptureConfig,
    pool: Arc<FramePool>,
    clock: C,
    source: Option<S>,
    running: Arc<AtomicBool>,
    frames_captured: Arc<AtomicU64>,
    busy_skips: Arc<AtomicU64>,
    capture_thread: Option<JoinHandle<S>>,
}

impl<S: FrameSource> FrameGrabber<S> {
    /// Create a grabber over `source` with the default monotonic clock.
    pub fn new(source: S, config: CaptureConfig) -> Result<Self> {
        Self::with_clock(source, config, MonotonicClock::new())
    }
}

impl<S: FrameSource, C: Clock> FrameGrabber<S, C> {
    /// Create a grabber stamping frames with `clock`.
    ///
    /// The pool is sized by the source's negotiated frame size; a requested
    /// size in the config that differs is reported, not an error.
    pub fn with_clock(source: S, config: CaptureConfig, clock: C) -> Result<Self> {
        config.validate()?;

        let granted = source.frame_size();
        if let Some(requested) = config.frame_size {
            if requested != granted {
                warn!(requested, granted, "frame size adjusted by source");
            }
        }

        let pool = Arc::new(FramePool::new(config.frame_count, granted));

        Ok(Self {
            config,
            pool,
            clock,
            source: Some(source),
            running: Arc::new(AtomicBool::new(false)),
            frames_captured: Arc::new(AtomicU64::new(0)),
            busy_skips: Arc::new(AtomicU64::new(0)),
            capture_thread: None,
        })
    }

    /// The shared frame pool, for readers on other threads.
    #[must_use]
    pub fn pool(&self) -> &Arc<FramePool> {
        &self.pool
    }

    /// Frame size in bytes as granted by the source.
    #[must_use]
    pub fn frame_size(&self) -> usize {
        self.pool.frame_size()
    }

    /// Acquire up to `n` frames, newest first. See
    /// [`FramePool::acquire_front`].
    #[must_use]
    pub fn acquire_front(&self, n: usize) -> Vec<FrameHandle> {
        self.pool.acquire_front(n)
    }

    /// Release a previously acquired set of handles. See
    /// [`FramePool::release`].
    pub fn release(&self, handles: Vec<FrameHandle>) {
        self.pool.release(handles);
    }

    /// Number of frames newer than `t`. See [`FramePool::count_newer_than`].
    #[must_use]
    pub fn count_newer_than(&self, t: Timestamp) -> usize {
        self.pool.count_newer_than(t)
    }

    /// Whether the capture thread is running.
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        self.capture_thread.is_some()
    }

    /// Current capture counters.
    #[must_use]
    pub fn stats(&self) -> CaptureStats {
        CaptureStats {
            frames_captured: self.frames_captured.load(Ordering::SeqCst),
            busy_skips: self.busy_skips.load(Ordering::SeqCst),
        }
    }

    /// Spawn the capture thread.
    ///
    /// # Panics
    ///
    /// Panics if capture is already running, or if a previous capture thread
    /// died fatally and took the source with it.
    pub fn start(&mut self) {
        assert!(self.capture_thread.is_none(), "capture already running");
        let source = self
            .source
            .take()
            .expect("frame source present when idle");

        self.running.store(true, Ordering::SeqCst);

        let running = Arc::clone(&self.running);
        let pool = Arc::clone(&self.pool);
        let frames_captured = Arc::clone(&self.frames_captured);
        let busy_skips = Arc::clone(&self.busy_skips);
        let clock = self.clock.clone();
        let config = self.config.clone();

        let handle = thread::spawn(move || {
            run_capture(
                source,
                &pool,
                &clock,
                &config,
                &running,
                &frames_captured,
                &busy_skips,
            )
        });
        self.capture_thread = Some(handle);

        info!("started capture");
    }

    /// Stop the capture thread and wait for it to exit.
    ///
    /// No-op when idle. The cancellation flag is polled once per iteration,
    /// so an in-flight wait/read cycle completes first: stop latency is
    /// bounded by one wait timeout plus one read. After this returns, no
    /// further frame writes occur until `start()` is called again.
    pub fn stop(&mut self) -> Result<()> {
        let Some(handle) = self.capture_thread.take() else {
            return Ok(());
        };

        self.running.store(false, Ordering::SeqCst);

        match handle.join() {
            Ok(source) => {
                self.source = Some(source);
                let stats = self.stats();
                info!(
                    frames = stats.frames_captured,
                    busy_skips = stats.busy_skips,
                    "stopped capture"
                );
                Ok(())
            }
            Err(panic) => {
                error!("capture thread panicked: {:?}", panic);
                Err(CaptureError::CaptureThreadPanicked)
            }
        }
    }

    /// Sample the source for roughly `duration` and estimate the real frame
    /// period as `(mean, stddev)` seconds. Blocks the caller for the whole
    /// window; the frame pool is not touched.
    ///
    /// # Panics
    ///
    /// Panics if called while capture is running: the source's read channel
    /// does not support concurrent readers.
    pub fn estimate_period(&mut self, duration: Duration) -> Result<PeriodEstimate> {
        assert!(
            self.capture_thread.is_none(),
            "period estimation requires the capture loop to be stopped"
        );
        let source = self
            .source
            .as_mut()
            .expect("frame source present when idle");
        period::estimate(source, &self.clock, duration, self.config.wait_timeout)
    }
}

impl<S: FrameSource, C: Clock> Drop for FrameGrabber<S, C> {
    fn drop(&mut self) {
        // Teardown precondition: the producer must be stopped first.
        if !thread::panicking() {
            assert!(
                self.capture_thread.is_none(),
                "frame grabber dropped while capturing; call stop() first"
            );
        }
    }
}

/// Capture thread body. Returns the source to the grabber on clean exit;
/// fatal conditions panic the thread, surfaced by `stop()`.
fn run_capture<S: FrameSource, C: Clock>(
    mut source: S,
    pool: &FramePool,
    clock: &C,
    config: &CaptureConfig,
    running: &AtomicBool,
    frames_captured: &AtomicU64,
    busy_skips: &AtomicU64,
) -> S {
    debug!("capture thread started");
    let mut busy_streak = 0u64;

    // Cancellation is polled here only; an in-flight wait/read completes
    // before the flag is observed.
    while running.load(Ordering::SeqCst) {
        match source.wait_ready(config.wait_timeout) {
            Ok(Readiness::Ready) => {}
            Ok(Readiness::Interrupted) => continue,
            Ok(Readiness::TimedOut) => {
                error!(timeout = ?config.wait_timeout, "frame source stalled");
                panic!(
                    "frame source stalled: no data within {:?}",
                    config.wait_timeout
                );
            }
            Err(e) => {
                error!(error = %e, "wait on frame source failed");
                panic!("wait on frame source failed: {e}");
            }
        }

        // The oldest frame may still be held by a reader. Skip this cycle
        // without blocking and without touching the held frame; the backoff
        // keeps the retry from spinning.
        let Some(mut frame) = pool.reclaim_oldest_for_write() else {
            busy_skips.fetch_add(1, Ordering::SeqCst);
            if busy_streak == 0 {
                warn!("no writable frame: oldest still held by a reader");
            } else {
                trace!(busy_streak, "still no writable frame");
            }
            busy_streak += 1;
            thread::sleep(config.busy_backoff);
            continue;
        };
        busy_streak = 0;

        let timestamp = clock.now();
        match source.read_frame(frame.data_mut()) {
            Ok(len) => trace!(len, "captured frame"),
            Err(e) => {
                error!(error = %e, "frame read failed");
                panic!("frame read failed: {e}");
            }
        }
        frame.set_timestamp(timestamp);
        pool.publish(frame);
        frames_captured.fetch_add(1, Ordering::SeqCst);
    }

    debug!("capture thread exiting");
    source
}
