//! Capture timestamps and the clock they are read from.
//!
//! Frames are stamped in a single clock domain chosen when the grabber is
//! built. The default [`MonotonicClock`] is anchored to an [`Instant`] epoch,
//! so timestamps are comparable for the lifetime of the process but carry no
//! wall-clock meaning.

use std::time::Instant;

/// A capture timestamp: whole seconds plus nanoseconds within the second.
///
/// Timestamps are totally ordered. A frame that has never been filled carries
/// [`Timestamp::NEVER`], which sorts before every real timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    secs: i64,
    nanos: u32,
}

impl Timestamp {
    /// Sentinel for "never captured". Minimum representable time.
    pub const NEVER: Timestamp = Timestamp {
        secs: i64::MIN,
        nanos: 0,
    };

    /// Create a timestamp from whole seconds and nanoseconds within the
    /// second.
    ///
    /// # Panics
    ///
    /// Panics if `nanos` is not below one billion.
    #[must_use]
    pub fn new(secs: i64, nanos: u32) -> Self {
        assert!(nanos < 1_000_000_000, "nanos {nanos} out of range");
        Self { secs, nanos }
    }

    /// Whole seconds of the timestamp.
    #[must_use]
    pub fn secs(&self) -> i64 {
        self.secs
    }

    /// Nanoseconds within the second.
    #[must_use]
    pub fn nanos(&self) -> u32 {
        self.nanos
    }

    /// Elapsed time from `earlier` to `self` as fractional seconds.
    ///
    /// Negative if `earlier` is actually later than `self`. The arithmetic is
    /// done in `f64`, so intervals against [`Timestamp::NEVER`] are huge but
    /// well-defined rather than an integer overflow.
    #[must_use]
    pub fn seconds_since(&self, earlier: Timestamp) -> f64 {
        (self.secs as f64 - earlier.secs as f64)
            + (f64::from(self.nanos) - f64::from(earlier.nanos)) * 1e-9
    }
}

/// Source of capture timestamps.
///
/// The clock is read once per captured frame, outside the pool lock. A
/// fallible clock has no counterpart here: `Instant`-based clocks cannot
/// fail, and test clocks are deterministic.
pub trait Clock: Clone + Send + 'static {
    /// Current time in the clock's own domain.
    fn now(&self) -> Timestamp;
}

/// Monotonic clock anchored to an epoch taken at construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    /// Create a clock whose epoch is "now".
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        let elapsed = self.epoch.elapsed();
        Timestamp::new(elapsed.as_secs() as i64, elapsed.subsec_nanos())
    }
}
