//! Job records and the status state machine.
//!
//! A job moves `queued → processing → {completed | failed}`. Terminal states
//! accept no further updates. Every status change goes through
//! [`Job::apply`], which keeps `result`/`error` in lockstep with the status.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::result::JobResult;
use crate::video::VideoInfo;

/// Default upper bound on a selected clip's duration, in seconds.
pub const DEFAULT_MAX_CLIP_DURATION: f64 = 30.0;

/// Highest progress value a job may report before it completes.
const MAX_PROCESSING_PROGRESS: u8 = 99;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Job processing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job is created and waiting for its task to start
    #[default]
    Queued,
    /// Job is actively being processed
    Processing,
    /// Job completed successfully
    Completed,
    /// Job failed with an error
    Failed,
}

impl JobStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether a job in this state may move to `next`.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Queued, JobStatus::Processing)
                | (JobStatus::Queued, JobStatus::Failed)
                | (JobStatus::Processing, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Completed)
                | (JobStatus::Processing, JobStatus::Failed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rejected status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot move job from {from} to {to}")]
pub struct TransitionError {
    pub from: JobStatus,
    pub to: JobStatus,
}

/// A status change, applied to a job as one unit.
///
/// `Completed` always carries the result and `Failed` always carries the
/// error, so the record can never show one without the other.
#[derive(Debug, Clone)]
pub enum StatusUpdate {
    Processing { progress: u8, message: String },
    Completed { result: Box<JobResult>, message: String },
    Failed { error: String, message: String },
}

impl StatusUpdate {
    /// Progress report while processing.
    pub fn processing(progress: u8, message: impl Into<String>) -> Self {
        Self::Processing {
            progress,
            message: message.into(),
        }
    }

    /// Successful completion with the final payload.
    pub fn completed(result: JobResult) -> Self {
        Self::Completed {
            result: Box::new(result),
            message: "Processing complete!".to_string(),
        }
    }

    /// Failure with a human-readable description.
    pub fn failed(error: impl Into<String>) -> Self {
        let error = error.into();
        Self::Failed {
            message: format!("Error: {}", error),
            error,
        }
    }

    /// Status the job will be in after this update.
    pub fn status(&self) -> JobStatus {
        match self {
            StatusUpdate::Processing { .. } => JobStatus::Processing,
            StatusUpdate::Completed { .. } => JobStatus::Completed,
            StatusUpdate::Failed { .. } => JobStatus::Failed,
        }
    }
}

/// Partial update that touches only the named fields.
///
/// Status is never part of a patch; it only changes through [`StatusUpdate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPatch {
    pub title: Option<String>,
    pub duration: Option<f64>,
    pub thumbnail: Option<String>,
    pub path: Option<String>,
    pub progress: Option<u8>,
    pub message: Option<String>,
}

impl JobPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// True when the patch names no field at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One asynchronous execution of the fetch → transcribe → select pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    /// Unique job ID
    pub id: JobId,

    /// Current status
    #[serde(default)]
    pub status: JobStatus,

    /// Progress (0-100)
    #[serde(default)]
    pub progress: u8,

    /// Current processing step description
    #[serde(default)]
    pub message: String,

    /// Error description (set only when failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// URL the source media is fetched from
    pub source_url: String,

    /// Clips longer than this many seconds are discarded
    pub max_clip_duration: f64,

    /// Source video details, filled in as they become known
    #[serde(default)]
    pub video: VideoInfo,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// When processing began
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When the job reached a terminal state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Final payload (set only when completed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JobResult>,
}

impl Job {
    /// Create a queued job for the given source.
    pub fn new(source_url: impl Into<String>, max_clip_duration: f64) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            status: JobStatus::Queued,
            progress: 0,
            message: "Job queued, starting processing...".to_string(),
            error: None,
            source_url: source_url.into(),
            max_clip_duration,
            video: VideoInfo::default(),
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
            result: None,
        }
    }

    /// Check if the job is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Apply a status change.
    ///
    /// Progress never goes backwards while processing and only reaches 100 on
    /// completion. The job is left untouched when the transition is illegal.
    pub fn apply(&mut self, update: StatusUpdate) -> Result<(), TransitionError> {
        let next = update.status();
        if !self.status.can_transition_to(next) {
            return Err(TransitionError {
                from: self.status,
                to: next,
            });
        }

        let now = Utc::now();
        match update {
            StatusUpdate::Processing { progress, message } => {
                if self.status == JobStatus::Queued {
                    self.started_at = Some(now);
                }
                self.status = JobStatus::Processing;
                self.progress = self.progress.max(progress.min(MAX_PROCESSING_PROGRESS));
                self.message = message;
            }
            StatusUpdate::Completed { result, message } => {
                self.status = JobStatus::Completed;
                self.progress = 100;
                self.message = message;
                self.result = Some(*result);
                self.completed_at = Some(now);
            }
            StatusUpdate::Failed { error, message } => {
                self.status = JobStatus::Failed;
                self.error = Some(error);
                self.message = message;
                self.completed_at = Some(now);
            }
        }
        self.updated_at = now;
        Ok(())
    }

    /// Merge a partial update. Returns `false` when the job is terminal and
    /// the patch was ignored.
    pub fn merge(&mut self, patch: JobPatch) -> bool {
        if self.is_terminal() {
            return false;
        }

        let JobPatch {
            title,
            duration,
            thumbnail,
            path,
            progress,
            message,
        } = patch;

        if title.is_some() {
            self.video.title = title;
        }
        if duration.is_some() {
            self.video.duration = duration;
        }
        if thumbnail.is_some() {
            self.video.thumbnail = thumbnail;
        }
        if path.is_some() {
            self.video.path = path;
        }
        if let Some(progress) = progress {
            if self.status == JobStatus::Processing {
                self.progress = self.progress.max(progress.min(MAX_PROCESSING_PROGRESS));
            }
        }
        if let Some(message) = message {
            self.message = message;
        }

        self.updated_at = Utc::now();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{TranscriptPayload, VideoFileMetadata, VideoPayload};

    fn sample_result() -> JobResult {
        JobResult {
            video: VideoPayload {
                id: "youtube-0011223344556677".to_string(),
                object: "video".to_string(),
                clips: Vec::new(),
                created: 0,
                metadata: VideoFileMetadata {
                    duration: 12.0,
                    file_size: 1024,
                    mime_type: "video/mp4".to_string(),
                },
                source: "/tmp/clipjob/a.mp4".to_string(),
                status: "complete".to_string(),
                title: "A".to_string(),
            },
            transcript: TranscriptPayload {
                id: "youtube-0011223344556677-transcript".to_string(),
                object: "transcript".to_string(),
                created: 0,
                words: Vec::new(),
                transcription: String::new(),
            },
            temp_video_path: "/tmp/clipjob/a.mp4".to_string(),
            temp_dir: "/tmp/clipjob".to_string(),
        }
    }

    #[test]
    fn test_job_creation() {
        let job = Job::new("https://youtu.be/abc", DEFAULT_MAX_CLIP_DURATION);
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.progress, 0);
        assert!(job.result.is_none());
        assert!(job.error.is_none());
        assert!(job.started_at.is_none());
    }

    #[test]
    fn test_job_state_transitions() {
        let mut job = Job::new("https://youtu.be/abc", 30.0);

        job.apply(StatusUpdate::processing(10, "Downloading")).unwrap();
        assert_eq!(job.status, JobStatus::Processing);
        assert!(job.started_at.is_some());

        job.apply(StatusUpdate::completed(sample_result())).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress, 100);
        assert!(job.result.is_some());
        assert!(job.error.is_none());
        assert!(job.completed_at.is_some());
    }

    #[test]
    fn test_progress_never_regresses() {
        let mut job = Job::new("https://youtu.be/abc", 30.0);
        job.apply(StatusUpdate::processing(40, "Transcribing")).unwrap();
        job.apply(StatusUpdate::processing(20, "Late report")).unwrap();
        assert_eq!(job.progress, 40);
        assert_eq!(job.message, "Late report");
    }

    #[test]
    fn test_processing_never_reaches_100() {
        let mut job = Job::new("https://youtu.be/abc", 30.0);
        job.apply(StatusUpdate::processing(100, "Almost")).unwrap();
        assert_eq!(job.progress, 99);
    }

    #[test]
    fn test_terminal_states_reject_updates() {
        let mut job = Job::new("https://youtu.be/abc", 30.0);
        job.apply(StatusUpdate::processing(10, "Downloading")).unwrap();
        job.apply(StatusUpdate::failed("network down")).unwrap();
        assert_eq!(job.error.as_deref(), Some("network down"));
        assert_eq!(job.message, "Error: network down");

        let err = job
            .apply(StatusUpdate::processing(50, "Resurrected"))
            .unwrap_err();
        assert_eq!(err.from, JobStatus::Failed);
        assert_eq!(err.to, JobStatus::Processing);
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.result.is_none());

        assert!(job.apply(StatusUpdate::completed(sample_result())).is_err());
        assert!(job.result.is_none());
    }

    #[test]
    fn test_queued_cannot_complete_directly() {
        let mut job = Job::new("https://youtu.be/abc", 30.0);
        assert!(job.apply(StatusUpdate::completed(sample_result())).is_err());
        assert_eq!(job.status, JobStatus::Queued);

        job.apply(StatusUpdate::failed("rejected")).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
    }

    #[test]
    fn test_merge_updates_named_fields_only() {
        let mut job = Job::new("https://youtu.be/abc", 30.0);
        job.apply(StatusUpdate::processing(10, "Downloading")).unwrap();

        assert!(job.merge(JobPatch::new().title("Talk").duration(321.0)));
        assert_eq!(job.video.title.as_deref(), Some("Talk"));
        assert_eq!(job.video.duration, Some(321.0));
        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.progress, 10);
        assert_eq!(job.message, "Downloading");

        job.merge(JobPatch::new().progress(25).message("Downloading 60%"));
        assert_eq!(job.progress, 25);
        assert_eq!(job.message, "Downloading 60%");
    }

    #[test]
    fn test_merge_ignores_progress_when_queued_and_all_when_terminal() {
        let mut job = Job::new("https://youtu.be/abc", 30.0);
        job.merge(JobPatch::new().progress(30));
        assert_eq!(job.progress, 0);

        job.apply(StatusUpdate::failed("boom")).unwrap();
        assert!(!job.merge(JobPatch::new().path("/tmp/x.mp4")));
        assert!(job.video.path.is_none());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&JobStatus::Processing).unwrap(), "\"processing\"");
        assert!(JobStatus::Completed.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
    }
}
