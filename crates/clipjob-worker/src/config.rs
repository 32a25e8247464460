//! Worker configuration.

use std::path::PathBuf;

use clipjob_models::DEFAULT_MAX_CLIP_DURATION;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Root for per-job temporary directories
    pub work_dir: PathBuf,
    /// Maximum jobs running at once (0 = unbounded)
    pub max_concurrent_jobs: usize,
    /// Clip length limit used when a request does not give one
    pub default_max_clip_duration: f64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("/tmp/clipjob"),
            max_concurrent_jobs: 0,
            default_max_clip_duration: DEFAULT_MAX_CLIP_DURATION,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORKER_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/tmp/clipjob")),
            max_concurrent_jobs: std::env::var("WORKER_MAX_CONCURRENT_JOBS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            default_max_clip_duration: std::env::var("DEFAULT_MAX_CLIP_DURATION")
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|d| d.is_finite() && *d > 0.0)
                .unwrap_or(DEFAULT_MAX_CLIP_DURATION),
        }
    }

    /// Directory holding everything produced for one job.
    pub fn job_dir(&self, job_id: &clipjob_models::JobId) -> PathBuf {
        self.work_dir.join(format!("yt-process-{}", job_id))
    }
}
