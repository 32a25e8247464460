//! Filesystem helpers for downloaded media.

use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{MediaError, MediaResult};

/// Container extensions yt-dlp may produce, in order of preference.
pub const MEDIA_EXTENSIONS: &[&str] = &["mp4", "webm", "mkv"];

/// Locate the downloaded media file in `dir`.
///
/// Files whose stem matches `file_stem` win; otherwise the first file with a
/// known media extension is returned.
pub async fn find_media_file(dir: impl AsRef<Path>, file_stem: &str) -> MediaResult<PathBuf> {
    let dir = dir.as_ref();
    let mut candidates = Vec::new();

    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        let Some(rank) = MEDIA_EXTENSIONS
            .iter()
            .position(|known| known.eq_ignore_ascii_case(ext))
        else {
            continue;
        };
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let stem_matches = path.file_stem().and_then(|s| s.to_str()) == Some(file_stem);
        candidates.push((!stem_matches, rank, path));
    }

    candidates.sort();
    candidates
        .into_iter()
        .next()
        .map(|(_, _, path)| path)
        .ok_or_else(|| MediaError::NoMediaFile(dir.to_path_buf()))
}

/// `video/<ext>` for a media path; `video/mp4` when there is no extension.
pub fn mime_type_for(path: impl AsRef<Path>) -> String {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| "mp4".to_string());
    format!("video/{}", ext)
}

/// Recursively delete a directory, logging instead of failing.
pub async fn remove_dir_best_effort(dir: impl AsRef<Path>) {
    let dir = dir.as_ref();
    match fs::remove_dir_all(dir).await {
        Ok(()) => tracing::debug!(dir = %dir.display(), "Removed work directory"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            dir = %dir.display(),
            error = %e,
            "Failed to remove work directory"
        ),
    }
}
