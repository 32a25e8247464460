//! Elapsed time and ETA estimation.
//!
//! The ETA is a linear extrapolation: if `p` percent took `t` seconds, the
//! remaining `100 - p` percent is assumed to take `t * (100 - p) / p`. Stages
//! have very different speeds, so this is only a rough hint for callers.

use chrono::{DateTime, Utc};

use crate::job::Job;

/// Seconds since the job started processing, or since creation if it has not.
///
/// Returns `None` when that timestamp lies in the future.
pub fn elapsed_seconds(job: &Job, now: DateTime<Utc>) -> Option<f64> {
    let since = job.started_at.unwrap_or(job.created_at);
    let millis = (now - since).num_milliseconds();
    if millis < 0 {
        return None;
    }
    Some(millis as f64 / 1000.0)
}

/// Remaining seconds for `progress` percent done after `elapsed` seconds.
pub fn estimate_eta(progress: u8, elapsed: f64) -> Option<f64> {
    if progress == 0 || progress >= 100 || !elapsed.is_finite() || elapsed < 0.0 {
        return None;
    }
    let progress = f64::from(progress);
    Some(elapsed * (100.0 - progress) / progress)
}

/// ETA for a job; `None` for terminal jobs and when no estimate is possible.
pub fn eta_seconds(job: &Job, now: DateTime<Utc>) -> Option<f64> {
    if job.is_terminal() {
        return None;
    }
    estimate_eta(job.progress, elapsed_seconds(job, now)?)
}

/// Map a fraction in `[0, 1]` onto the integer band `[lo, hi]`.
pub fn scale_fraction(fraction: f64, lo: u8, hi: u8) -> u8 {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let span = f64::from(hi.saturating_sub(lo));
    lo + (fraction * span).round() as u8
}
