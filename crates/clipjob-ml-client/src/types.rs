//! ML service request/response types and normalization.
//!
//! Upstream payloads are loosely typed: numbers sometimes arrive as strings,
//! fields may be missing or use alternative names, and lists may or may not
//! be wrapped in an object. Everything is accepted here and converted into
//! the workspace models in one place.

use clipjob_models::{ClipCandidate, Word};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request for transcription of a local media file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscribeRequest {
    pub media_path: String,
}

/// Request for clip detection over a transcription.
#[derive(Debug, Clone, Serialize)]
pub struct FindClipsRequest {
    pub transcription: Value,
}

/// One word as the service reports it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWord {
    #[serde(default)]
    pub start_char: Option<Value>,
    #[serde(default)]
    pub end_char: Option<Value>,
    #[serde(default)]
    pub start_time: Option<Value>,
    #[serde(default)]
    pub end_time: Option<Value>,
    #[serde(default)]
    pub text: Option<Value>,
    #[serde(default)]
    pub start: Option<Value>,
    #[serde(default)]
    pub end: Option<Value>,
    #[serde(default)]
    pub word: Option<Value>,
}

/// One clip as the service reports it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawClip {
    #[serde(default)]
    pub start_time: Option<Value>,
    #[serde(default)]
    pub end_time: Option<Value>,
    #[serde(default)]
    pub start_char: Option<Value>,
    #[serde(default)]
    pub end_char: Option<Value>,
    #[serde(default)]
    pub start: Option<Value>,
    #[serde(default)]
    pub end: Option<Value>,
}

/// `/transcribe` response body.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TranscribeResponse {
    Bare(Vec<RawWord>),
    Wrapped {
        #[serde(default)]
        words: Vec<RawWord>,
        #[serde(default)]
        text: Option<String>,
    },
}

/// `/clips/find` response body.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FindClipsResponse {
    Bare(Vec<RawClip>),
    Wrapped {
        #[serde(default)]
        clips: Vec<RawClip>,
    },
}

impl FindClipsResponse {
    pub fn into_clips(self) -> Vec<RawClip> {
        match self {
            FindClipsResponse::Wrapped { clips } => clips,
            FindClipsResponse::Bare(clips) => clips,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Convert upstream words. Unusable offsets become `None`, missing times 0.
///
/// `start_time`/`end_time`/`text` win over `start`/`end`/`word` when both
/// are present and usable.
pub fn normalize_words(raw: Vec<RawWord>) -> Vec<Word> {
    raw.into_iter()
        .map(|w| Word {
            start_char: w.start_char.as_ref().and_then(as_offset),
            end_char: w.end_char.as_ref().and_then(as_offset),
            start_time: first_of(&w.start_time, &w.start, as_seconds).unwrap_or(0.0),
            end_time: first_of(&w.end_time, &w.end, as_seconds).unwrap_or(0.0),
            text: first_of(&w.text, &w.word, as_text),
        })
        .collect()
}

/// Convert upstream clips. Clips without both times are dropped.
pub fn normalize_clips(raw: Vec<RawClip>) -> Vec<ClipCandidate> {
    raw.into_iter()
        .filter_map(|c| {
            let start_time = first_of(&c.start_time, &c.start, as_seconds)?;
            let end_time = first_of(&c.end_time, &c.end, as_seconds)?;
            Some(ClipCandidate {
                start_time,
                end_time,
                start_char: c.start_char.as_ref().and_then(as_offset),
                end_char: c.end_char.as_ref().and_then(as_offset),
            })
        })
        .collect()
}

/// Parse `primary`, falling back to `alternative` when it is absent or unusable.
fn first_of<T>(
    primary: &Option<Value>,
    alternative: &Option<Value>,
    parse: fn(&Value) -> Option<T>,
) -> Option<T> {
    primary
        .as_ref()
        .and_then(parse)
        .or_else(|| alternative.as_ref().and_then(parse))
}

fn as_seconds(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn as_offset(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_words_accepts_strings_and_missing_fields() {
        let raw: Vec<RawWord> = serde_json::from_value(json!([
            {"text": "hi", "start_char": 0, "end_char": "2", "start_time": "0.5", "end_time": 0.9},
            {"word": "there", "start": 1.0},
            {"text": null, "start_char": -3, "end_char": "x"}
        ]))
        .unwrap();

        let words = normalize_words(raw);
        assert_eq!(words.len(), 3);
        assert_eq!(words[0], Word::spanned("hi", 0, 2, 0.5, 0.9));
        assert_eq!(words[1].text.as_deref(), Some("there"));
        assert_eq!(words[1].start_time, 1.0);
        assert_eq!(words[1].end_time, 0.0);
        assert!(words[1].start_char.is_none());
        assert!(words[2].text.is_none());
        assert!(words[2].start_char.is_none());
        assert!(words[2].end_char.is_none());
    }

    #[test]
    fn test_normalize_clips_drops_untimed() {
        let raw = serde_json::from_value::<FindClipsResponse>(json!({
            "clips": [
                {"start_time": 0, "end_time": "20", "start_char": 0, "end_char": 2},
                {"start_time": 5},
                {"start": "1.5", "end": 3}
            ]
        }))
        .unwrap()
        .into_clips();

        let clips = normalize_clips(raw);
        assert_eq!(clips.len(), 2);
        assert_eq!(clips[0], ClipCandidate::new(0.0, 20.0).with_chars(0, 2));
        assert_eq!(clips[1], ClipCandidate::new(1.5, 3.0));
    }

    #[test]
    fn test_words_with_both_time_spellings() {
        let parsed: TranscribeResponse = serde_json::from_value(json!({
            "words": [
                {"text": "hi", "start_char": 0, "end_char": 2,
                 "start": 0.0, "start_time": 0.0, "end": 0.4, "end_time": 0.4},
                {"word": "there", "text": null, "start_char": 3, "end_char": 8,
                 "start": "0.5", "start_time": "bogus", "end": 1.0}
            ]
        }))
        .unwrap();
        let TranscribeResponse::Wrapped { words, .. } = parsed else {
            panic!("expected wrapped response");
        };

        let words = normalize_words(words);
        assert_eq!(words[0], Word::spanned("hi", 0, 2, 0.0, 0.4));
        assert_eq!(words[1], Word::spanned("there", 3, 8, 0.5, 1.0));
    }

    #[test]
    fn test_clips_with_both_time_spellings() {
        let raw = serde_json::from_value::<FindClipsResponse>(json!([
            {"start": 1, "start_time": 2, "end": 9, "end_time": 10}
        ]))
        .unwrap()
        .into_clips();
        assert_eq!(normalize_clips(raw), vec![ClipCandidate::new(2.0, 10.0)]);
    }

    #[test]
    fn test_bare_list_responses() {
        let clips: FindClipsResponse =
            serde_json::from_value(json!([{"start_time": 1, "end_time": 2}])).unwrap();
        assert_eq!(clips.into_clips().len(), 1);

        let words: TranscribeResponse =
            serde_json::from_value(json!([{"text": "a"}])).unwrap();
        assert!(matches!(words, TranscribeResponse::Bare(ref w) if w.len() == 1));
    }
}
