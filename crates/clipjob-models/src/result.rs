//! Final payload of a completed job.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::clip::Clip;
use crate::transcript::Word;

/// File-level facts about the downloaded media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoFileMetadata {
    /// Seconds (0 when unknown)
    pub duration: f64,
    /// Bytes
    pub file_size: u64,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoPayload {
    /// `youtube-{16 hex chars}`
    pub id: String,
    pub object: String,
    pub clips: Vec<Clip>,
    pub created: i64,
    pub metadata: VideoFileMetadata,
    /// Local media path
    pub source: String,
    pub status: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptPayload {
    /// `{video_id}-transcript`
    pub id: String,
    pub object: String,
    pub created: i64,
    pub words: Vec<Word>,
    /// Reconstructed transcript text
    pub transcription: String,
}

/// Everything a caller gets back once a job completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct JobResult {
    pub video: VideoPayload,
    pub transcript: TranscriptPayload,
    pub temp_video_path: String,
    pub temp_dir: String,
}
