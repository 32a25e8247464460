//! Transcription output: timed words with character spans.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One transcribed token.
///
/// `start_char..end_char` is a half-open span into the reconstructed
/// transcript. Offsets count characters, not bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Word {
    #[serde(default)]
    pub start_char: Option<usize>,

    #[serde(default)]
    pub end_char: Option<usize>,

    /// Start time in seconds
    #[serde(default)]
    pub start_time: f64,

    /// End time in seconds
    #[serde(default)]
    pub end_time: f64,

    #[serde(default)]
    pub text: Option<String>,
}

impl Word {
    /// Word with a character span.
    pub fn spanned(
        text: impl Into<String>,
        start_char: usize,
        end_char: usize,
        start_time: f64,
        end_time: f64,
    ) -> Self {
        Self {
            start_char: Some(start_char),
            end_char: Some(end_char),
            start_time,
            end_time,
            text: Some(text.into()),
        }
    }

    /// The span and text, when the span is non-empty and the text is present.
    pub fn valid_span(&self) -> Option<(usize, usize, &str)> {
        match (self.start_char, self.end_char, self.text.as_deref()) {
            (Some(start), Some(end), Some(text)) if end > start && !text.is_empty() => {
                Some((start, end, text))
            }
            _ => None,
        }
    }
}

/// Output of the transcription collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Transcription {
    pub words: Vec<Word>,

    /// Upstream text when the service reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Upstream payload, handed back unchanged to the clip finder
    #[serde(skip)]
    #[schemars(skip)]
    pub raw: Option<serde_json::Value>,
}

impl Transcription {
    pub fn from_words(words: Vec<Word>) -> Self {
        Self {
            words,
            text: None,
            raw: None,
        }
    }
}
