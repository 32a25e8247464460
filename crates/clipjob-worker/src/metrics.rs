//! Job pipeline metrics.
//!
//! Recorded through the `metrics` facade; the binary decides where they go.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const JOBS_SUBMITTED_TOTAL: &str = "clipjob_jobs_submitted_total";
    pub const JOBS_COMPLETED_TOTAL: &str = "clipjob_jobs_completed_total";
    pub const JOBS_FAILED_TOTAL: &str = "clipjob_jobs_failed_total";
    pub const STAGE_DURATION_SECONDS: &str = "clipjob_stage_duration_seconds";
    pub const CLIPS_SELECTED_TOTAL: &str = "clipjob_clips_selected_total";
}

/// Pipeline stage labels.
pub mod stages {
    pub const DOWNLOAD: &str = "download";
    pub const TRANSCRIBE: &str = "transcribe";
    pub const FIND_CLIPS: &str = "find_clips";
    pub const FINALIZE: &str = "finalize";
}

pub fn record_job_submitted() {
    counter!(names::JOBS_SUBMITTED_TOTAL).increment(1);
}

pub fn record_job_completed() {
    counter!(names::JOBS_COMPLETED_TOTAL).increment(1);
}

pub fn record_job_failed() {
    counter!(names::JOBS_FAILED_TOTAL).increment(1);
}

/// Record how long one pipeline stage took.
pub fn record_stage_duration(stage: &'static str, duration_secs: f64) {
    histogram!(names::STAGE_DURATION_SECONDS, "stage" => stage).record(duration_secs);
}

pub fn record_clips_selected(count: usize) {
    counter!(names::CLIPS_SELECTED_TOTAL).increment(count as u64);
}
