//! Video metadata lookup and download using yt-dlp.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use clipjob_models::SourceMetadata;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};
use crate::fs_utils::find_media_file;
use crate::progress::{parse_progress_line, DownloadProgress, PROGRESS_TEMPLATE};

/// Default yt-dlp format selector: best mp4 video + m4a audio, else best mp4, else best.
pub const DEFAULT_FORMAT: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";

/// Maximum number of characters kept from a video title for file names.
const MAX_TITLE_CHARS: usize = 100;

/// yt-dlp settings.
#[derive(Debug, Clone)]
pub struct YtDlpConfig {
    /// Binary name or absolute path
    pub binary: String,
    /// Format selector passed to `-f`
    pub format: String,
}

impl Default for YtDlpConfig {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            format: DEFAULT_FORMAT.to_string(),
        }
    }
}

impl YtDlpConfig {
    /// Load from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            binary: std::env::var("YTDLP_PATH").unwrap_or(defaults.binary),
            format: std::env::var("YTDLP_FORMAT").unwrap_or(defaults.format),
        }
    }
}

/// Subset of `--dump-single-json` output we care about.
#[derive(Debug, Deserialize)]
struct RawInfo {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    thumbnail: Option<String>,
}

/// Handle for running yt-dlp.
#[derive(Debug, Clone, Default)]
pub struct YtDlp {
    config: YtDlpConfig,
}

impl YtDlp {
    pub fn new(config: YtDlpConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &YtDlpConfig {
        &self.config
    }

    /// Whether the configured binary can be found.
    pub fn is_available(&self) -> bool {
        check_ytdlp(&self.config.binary).is_ok()
    }

    /// Look up title, duration and thumbnail without downloading.
    pub async fn resolve_metadata(&self, url: &str) -> MediaResult<SourceMetadata> {
        let binary = check_ytdlp(&self.config.binary)?;
        debug!(url = %url, "Resolving video metadata");

        let output = Command::new(binary)
            .args(["--dump-single-json", "--skip-download", "--no-playlist", "--no-warnings"])
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr: {}", stderr);
            return Err(MediaError::metadata_failed(last_line(&stderr)));
        }

        let info: RawInfo = serde_json::from_slice(&output.stdout)?;
        Ok(SourceMetadata {
            title: info
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            duration: info.duration.filter(|d| d.is_finite() && *d >= 0.0),
            thumbnail: info.thumbnail,
        })
    }

    /// Download `url` into `dest_dir` as `{file_stem}.{ext}`.
    ///
    /// `on_progress` is called from the output reader for every progress line
    /// yt-dlp prints. Returns the path of the downloaded media file.
    pub async fn fetch<F>(
        &self,
        url: &str,
        dest_dir: &Path,
        file_stem: &str,
        on_progress: F,
    ) -> MediaResult<PathBuf>
    where
        F: Fn(DownloadProgress) + Send + 'static,
    {
        let binary = check_ytdlp(&self.config.binary)?;
        tokio::fs::create_dir_all(dest_dir).await?;

        let output_template = dest_dir.join(format!("{}.%(ext)s", file_stem));
        info!(
            url = %url,
            dest = %dest_dir.display(),
            "Downloading video"
        );

        let mut child = Command::new(binary)
            .args(["--newline", "--no-playlist", "--progress-template", PROGRESS_TEMPLATE])
            .args(["-f", self.config.format.as_str()])
            .arg("-o")
            .arg(&output_template)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MediaError::download_failed("yt-dlp stdout not captured"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::download_failed("yt-dlp stderr not captured"))?;

        let progress_handle = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(progress) = parse_progress_line(&line) {
                    on_progress(progress);
                }
            }
        });
        let stderr_handle = tokio::spawn(async move {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf).await;
            buf
        });

        let status = child.wait().await?;
        let _ = progress_handle.await;
        let stderr = stderr_handle.await.unwrap_or_default();

        if !status.success() {
            debug!("yt-dlp stderr: {}", stderr);
            if stderr.contains("429") || stderr.contains("Too Many Requests") {
                warn!(url = %url, "YouTube rate limit detected");
            }
            return Err(MediaError::download_failed(format!(
                "yt-dlp failed: {}",
                last_line(&stderr)
            )));
        }

        let path = find_media_file(dest_dir, file_stem).await?;
        let size = tokio::fs::metadata(&path).await?.len();
        info!(
            output = %path.display(),
            size_mb = size as f64 / (1024.0 * 1024.0),
            "Downloaded video successfully"
        );
        Ok(path)
    }
}

/// Check if yt-dlp is available under the given name or path.
pub fn check_ytdlp(binary: &str) -> MediaResult<PathBuf> {
    which::which(binary).map_err(|_| MediaError::YtDlpNotFound(binary.to_string()))
}

/// Turn a video title into a file-name-safe stem.
///
/// Keeps alphanumerics, spaces, `-` and `_`, drops trailing whitespace and
/// keeps at most 100 characters. Falls back to `video` when nothing remains.
pub fn sanitize_title(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let safe: String = kept.trim_end().chars().take(MAX_TITLE_CHARS).collect();
    let safe = safe.trim().to_string();
    if safe.is_empty() {
        "video".to_string()
    } else {
        safe
    }
}

fn last_line(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("Unknown error")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("Hello, World! (2024)"), "Hello World 2024");
        assert_eq!(sanitize_title("a/b\\c:d"), "abcd");
        assert_eq!(sanitize_title("trailing   "), "trailing");
        assert_eq!(sanitize_title("???"), "video");
        assert_eq!(sanitize_title("Café – über"), "Café  über");
    }

    #[test]
    fn test_sanitize_title_truncates() {
        let long = "x".repeat(250);
        assert_eq!(sanitize_title(&long).chars().count(), 100);
    }

    #[test]
    fn test_last_line() {
        assert_eq!(last_line("a\nERROR: boom\n\n"), "ERROR: boom");
        assert_eq!(last_line(""), "Unknown error");
    }

    #[test]
    fn test_missing_binary() {
        let err = check_ytdlp("definitely-not-a-real-ytdlp-binary").unwrap_err();
        assert!(matches!(err, MediaError::YtDlpNotFound(_)));
    }

    #[tokio::test]
    async fn test_fetch_with_missing_binary_fails() {
        let ytdlp = YtDlp::new(YtDlpConfig {
            binary: "definitely-not-a-real-ytdlp-binary".to_string(),
            ..Default::default()
        });
        let dir = tempfile::TempDir::new().unwrap();
        let err = ytdlp
            .fetch("https://youtu.be/abc", dir.path(), "x", |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::YtDlpNotFound(_)));
    }
}
