//! Clip selection and enrichment.

use clipjob_models::{Clip, ClipCandidate, ClipScores};

/// Maximum number of characters in a clip title.
const MAX_TITLE_CHARS: usize = 100;

/// Keep candidates no longer than `max_duration` seconds and turn them into
/// caller-facing clips, in input order.
///
/// The title is the transcript text under the clip's character span, or
/// `Clip {n}` when that text is blank. Ids are `{video_id}-clip-{i}`, dense
/// and zero-based over the kept clips.
pub fn select_clips(
    candidates: &[ClipCandidate],
    transcript: &str,
    max_duration: f64,
    video_id: &str,
    created: i64,
) -> Vec<Clip> {
    let chars: Vec<char> = transcript.chars().collect();
    let mut selected: Vec<Clip> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let duration = candidate.duration();
        // Also drops NaN durations.
        if !(duration <= max_duration) {
            continue;
        }

        let index = selected.len();
        let start = candidate.start_char.unwrap_or(0).min(chars.len());
        let end = candidate
            .end_char
            .unwrap_or(chars.len())
            .min(chars.len())
            .max(start);

        selected.push(Clip {
            id: format!("{}-clip-{}", video_id, index),
            object: "clip".to_string(),
            created,
            start_time: candidate.start_time,
            end_time: candidate.end_time,
            duration,
            start_char: start,
            end_char: end,
            video_id: video_id.to_string(),
            favorited: false,
            deleted: false,
            scores: ClipScores::default(),
            title: clip_title(&chars[start..end], index),
        });
    }

    selected
}

fn clip_title(span: &[char], index: usize) -> String {
    let text: String = span.iter().collect();
    let title: String = text.trim().chars().take(MAX_TITLE_CHARS).collect();
    let title = title.trim_end();
    if title.is_empty() {
        format!("Clip {}", index + 1)
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIDEO_ID: &str = "youtube-00112233aabbccdd";

    #[test]
    fn test_long_clip_excluded() {
        let clips = select_clips(
            &[ClipCandidate::new(0.0, 45.0)],
            "hi there",
            30.0,
            VIDEO_ID,
            0,
        );
        assert!(clips.is_empty());
    }

    #[test]
    fn test_title_from_char_span() {
        let clips = select_clips(
            &[ClipCandidate::new(0.0, 20.0).with_chars(0, 2)],
            "hi there",
            30.0,
            VIDEO_ID,
            1_700_000_000,
        );
        assert_eq!(clips.len(), 1);
        let clip = &clips[0];
        assert_eq!(clip.title, "hi");
        assert_eq!(clip.id, "youtube-00112233aabbccdd-clip-0");
        assert_eq!(clip.object, "clip");
        assert_eq!(clip.duration, 20.0);
        assert_eq!(clip.created, 1_700_000_000);
        assert_eq!(clip.scores.embedding_norm, 0.0);
        assert!(!clip.favorited && !clip.deleted);
    }

    #[test]
    fn test_equal_duration_kept_and_ids_dense() {
        let candidates = [
            ClipCandidate::new(0.0, 10.0),
            ClipCandidate::new(10.0, 90.0),
            ClipCandidate::new(20.0, 50.0),
        ];
        let clips = select_clips(&candidates, "some words here", 30.0, VIDEO_ID, 0);
        assert_eq!(clips.len(), 2);
        assert_eq!(clips[0].id, format!("{VIDEO_ID}-clip-0"));
        assert_eq!(clips[1].id, format!("{VIDEO_ID}-clip-1"));
        assert_eq!(clips[1].start_time, 20.0);
        assert!(clips.iter().all(|c| c.duration <= 30.0));
    }

    #[test]
    fn test_missing_chars_cover_whole_transcript() {
        let clips = select_clips(
            &[ClipCandidate::new(0.0, 5.0)],
            "  whole text  ",
            30.0,
            VIDEO_ID,
            0,
        );
        assert_eq!(clips[0].title, "whole text");
        assert_eq!(clips[0].start_char, 0);
        assert_eq!(clips[0].end_char, 14);
    }

    #[test]
    fn test_blank_title_falls_back_to_number() {
        let candidates = [
            ClipCandidate::new(0.0, 5.0).with_chars(0, 2),
            ClipCandidate::new(5.0, 9.0).with_chars(2, 5),
        ];
        let clips = select_clips(&candidates, "hi   ", 30.0, VIDEO_ID, 0);
        assert_eq!(clips[0].title, "hi");
        assert_eq!(clips[1].title, "Clip 2");
    }

    #[test]
    fn test_out_of_range_chars_are_clamped() {
        let clips = select_clips(
            &[ClipCandidate::new(0.0, 5.0).with_chars(3, 500)],
            "hi there",
            30.0,
            VIDEO_ID,
            0,
        );
        assert_eq!(clips[0].title, "there");
        assert_eq!(clips[0].end_char, 8);

        let clips = select_clips(
            &[ClipCandidate::new(0.0, 5.0).with_chars(50, 60)],
            "hi there",
            30.0,
            VIDEO_ID,
            0,
        );
        assert_eq!(clips[0].title, "Clip 1");
    }

    #[test]
    fn test_title_truncated_to_100_chars() {
        let transcript = "é".repeat(250);
        let clips = select_clips(
            &[ClipCandidate::new(0.0, 5.0)],
            &transcript,
            30.0,
            VIDEO_ID,
            0,
        );
        assert_eq!(clips[0].title.chars().count(), 100);
    }
}
