//! Shared data models for the clipjob service.
//!
//! This crate provides Serde-serializable types for:
//! - Jobs, their status state machine and partial updates
//! - Transcribed words and clip candidates
//! - The final result payload handed back to callers
//! - Progress/ETA estimation and source URL validation

pub mod clip;
pub mod job;
pub mod progress;
pub mod result;
pub mod transcript;
pub mod utils;
pub mod video;

// Re-export common types
pub use clip::{Clip, ClipCandidate, ClipScores};
pub use job::{
    Job, JobId, JobPatch, JobStatus, StatusUpdate, TransitionError, DEFAULT_MAX_CLIP_DURATION,
};
pub use progress::{elapsed_seconds, estimate_eta, eta_seconds, scale_fraction};
pub use result::{JobResult, TranscriptPayload, VideoFileMetadata, VideoPayload};
pub use transcript::{Transcription, Word};
pub use utils::{validate_source_url, UrlValidationError};
pub use video::{SourceMetadata, VideoInfo};
