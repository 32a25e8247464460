//! yt-dlp download progress parsing.
//!
//! Downloads run with `--newline --progress-template` so that every progress
//! report arrives on its own stdout line in a fixed, machine-readable layout:
//!
//! ```text
//! clipjob-progress <downloaded_bytes> <total_bytes> <total_bytes_estimate> <status>
//! ```
//!
//! yt-dlp prints `NA` for fields it does not know.

use serde::{Deserialize, Serialize};

/// Marker that starts every progress line.
pub const PROGRESS_PREFIX: &str = "clipjob-progress";

/// Value passed to `--progress-template`.
pub(crate) const PROGRESS_TEMPLATE: &str = "download:clipjob-progress %(progress.downloaded_bytes)s %(progress.total_bytes)s %(progress.total_bytes_estimate)s %(progress.status)s";

/// Progress of a single download.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadProgress {
    /// Bytes received so far
    pub downloaded_bytes: u64,
    /// Exact or estimated total size, when known
    pub total_bytes: Option<u64>,
    /// Whether yt-dlp reported the file as finished
    pub is_complete: bool,
}

impl DownloadProgress {
    /// Fraction done in `[0, 1]`, if the total size is known.
    pub fn fraction(&self) -> Option<f64> {
        if self.is_complete {
            return Some(1.0);
        }
        match self.total_bytes {
            Some(total) if total > 0 => {
                Some((self.downloaded_bytes as f64 / total as f64).min(1.0))
            }
            _ => None,
        }
    }
}

/// Parse one line of yt-dlp output. Non-progress lines yield `None`.
pub fn parse_progress_line(line: &str) -> Option<DownloadProgress> {
    let rest = line.trim().strip_prefix(PROGRESS_PREFIX)?;
    let mut fields = rest.split_whitespace();

    let downloaded = parse_bytes(fields.next()?)?;
    let total = parse_bytes(fields.next()?);
    let estimate = parse_bytes(fields.next()?);
    let status = fields.next().unwrap_or("downloading");

    Some(DownloadProgress {
        downloaded_bytes: downloaded,
        total_bytes: total.or(estimate),
        is_complete: status == "finished",
    })
}

/// yt-dlp prints byte counts as integers, floats (estimates) or `NA`.
fn parse_bytes(field: &str) -> Option<u64> {
    if let Ok(n) = field.parse::<u64>() {
        return Some(n);
    }
    field
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_progress_line() {
        let progress = parse_progress_line("clipjob-progress 5000 10000 NA downloading").unwrap();
        assert_eq!(progress.downloaded_bytes, 5000);
        assert_eq!(progress.total_bytes, Some(10000));
        assert!(!progress.is_complete);
        assert!((progress.fraction().unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_uses_estimate_when_total_unknown() {
        let progress =
            parse_progress_line("clipjob-progress 250 NA 1000.0 downloading").unwrap();
        assert_eq!(progress.total_bytes, Some(1000));
        assert!((progress.fraction().unwrap() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_parse_finished() {
        let progress = parse_progress_line("clipjob-progress 10 NA NA finished").unwrap();
        assert!(progress.is_complete);
        assert_eq!(progress.fraction(), Some(1.0));
    }

    #[test]
    fn test_unknown_total_has_no_fraction() {
        let progress = parse_progress_line("clipjob-progress 10 NA NA downloading").unwrap();
        assert_eq!(progress.fraction(), None);
    }

    #[test]
    fn test_ignores_other_lines() {
        assert!(parse_progress_line("[youtube] abc: Downloading webpage").is_none());
        assert!(parse_progress_line("clipjob-progress NA NA NA downloading").is_none());
        assert!(parse_progress_line("").is_none());
    }
}
