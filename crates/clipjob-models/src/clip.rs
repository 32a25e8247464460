//! Clip models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A clip proposed by the detection collaborator.
///
/// Missing character offsets mean "from the start" and "to the end" of the
/// transcript respectively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClipCandidate {
    pub start_time: f64,
    pub end_time: f64,

    #[serde(default)]
    pub start_char: Option<usize>,

    #[serde(default)]
    pub end_char: Option<usize>,
}

impl ClipCandidate {
    pub fn new(start_time: f64, end_time: f64) -> Self {
        Self {
            start_time,
            end_time,
            start_char: None,
            end_char: None,
        }
    }

    pub fn with_chars(mut self, start_char: usize, end_char: usize) -> Self {
        self.start_char = Some(start_char);
        self.end_char = Some(end_char);
        self
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Ranking scores attached to a clip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClipScores {
    pub embedding_norm: f64,
}

/// A selected clip as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Clip {
    /// `{video_id}-clip-{index}`
    pub id: String,
    pub object: String,
    /// Unix seconds
    pub created: i64,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub start_char: usize,
    pub end_char: usize,
    pub video_id: String,
    pub favorited: bool,
    pub deleted: bool,
    pub scores: ClipScores,
    pub title: String,
}
