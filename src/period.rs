//! Capture-period estimation.
//!
//! A one-shot diagnostic that runs the same wait/read cycle as the capture
//! loop against a private scratch buffer, discarding the data and keeping
//! only the timestamps. The buffer pool is never touched, so a concurrently
//! running capture loop's frames are unaffected; the single source read
//! channel is the only shared resource, and the grabber's ownership of the
//! source keeps the two from running at once.

use std::time::Duration;

use tracing::debug;

use crate::clock::{Clock, Timestamp};
use crate::error::{CaptureError, Result};
use crate::source::{FrameSource, Readiness};

/// Mean and spread of the source's inter-frame arrival time, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodEstimate {
    /// Arithmetic mean of the inter-arrival intervals.
    pub mean: f64,
    /// Population standard deviation of the intervals.
    pub stddev: f64,
}

/// Sample the source for roughly `duration` and estimate its frame period.
///
/// Same fatal policy as the capture loop: a wait timeout or a wait/read
/// error ends the estimation with an error. Interrupted waits are retried
/// transparently.
pub(crate) fn estimate<S, C>(
    source: &mut S,
    clock: &C,
    duration: Duration,
    wait_timeout: Duration,
) -> Result<PeriodEstimate>
where
    S: FrameSource,
    C: Clock,
{
    let mut scratch = vec![0u8; source.frame_size()];
    let mut stamps: Vec<Timestamp> = Vec::new();

    loop {
        let now = clock.now();
        let elapsed = stamps.first().map_or(0.0, |first| now.seconds_since(*first));
        stamps.push(now);
        if elapsed > duration.as_secs_f64() {
            break;
        }

        loop {
            match source.wait_ready(wait_timeout)? {
                Readiness::Ready => break,
                Readiness::Interrupted => continue,
                Readiness::TimedOut => {
                    return Err(CaptureError::SourceStalled {
                        waited: wait_timeout,
                    })
                }
            }
        }

        // Frame data is discarded; only the arrival time matters.
        source.read_frame(&mut scratch)?;
    }

    let intervals = intervals(&stamps);
    if intervals.is_empty() {
        return Err(CaptureError::InsufficientSamples {
            count: stamps.len(),
        });
    }

    let mean = mean(&intervals);
    let stddev = population_stddev(&intervals, mean);
    debug!(
        samples = stamps.len(),
        mean, stddev, "estimated capture period"
    );

    Ok(PeriodEstimate { mean, stddev })
}

/// Consecutive inter-arrival intervals as fractional seconds.
fn intervals(stamps: &[Timestamp]) -> Vec<f64> {
    stamps
        .windows(2)
        .map(|pair| pair[1].seconds_since(pair[0]))
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation around a precomputed mean, accumulated over
/// every interval.
fn population_stddev(values: &[f64], mean: f64) -> f64 {
    let sum_of_squares: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (sum_of_squares / values.len() as f64).sqrt()
}
