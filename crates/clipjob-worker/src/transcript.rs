//! Transcript reconstruction from word-level character spans.
//!
//! The transcription service reports each word with a half-open character
//! span into a transcript it never returns in full. The text is rebuilt by
//! laying every word into a space-filled buffer at its span, so that clip
//! character offsets index into the same text the service saw.

use clipjob_models::Word;

/// Spans ending beyond this many characters are ignored rather than
/// allocating an unbounded buffer.
const MAX_TRANSCRIPT_CHARS: usize = 16 * 1024 * 1024;

/// Rebuild the transcript text from timed words.
///
/// - No words: empty string.
/// - At least one usable span: a buffer of `max(end_char)` spaces, with each
///   word's text written at its `start_char` and cut to its span width. Later
///   words overwrite earlier ones where spans overlap.
/// - No usable span: non-empty word texts joined by single spaces. Offsets
///   into this text are not guaranteed to line up with clip spans.
///
/// Trailing whitespace is always trimmed.
pub fn reconstruct(words: &[Word]) -> String {
    if words.is_empty() {
        return String::new();
    }

    let spans: Vec<(usize, usize, &str)> = words
        .iter()
        .filter_map(Word::valid_span)
        .filter(|(_, end, _)| *end <= MAX_TRANSCRIPT_CHARS)
        .collect();

    let Some(len) = spans.iter().map(|(_, end, _)| *end).max() else {
        return join_texts(words);
    };

    let mut buf = vec![' '; len];
    for (start, end, text) in spans {
        for (slot, ch) in buf[start..end].iter_mut().zip(text.chars()) {
            *slot = ch;
        }
    }

    let text: String = buf.into_iter().collect();
    text.trim_end().to_string()
}

fn join_texts(words: &[Word]) -> String {
    let joined = words
        .iter()
        .filter_map(|w| w.text.as_deref())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    joined.trim_end().to_string()
}
