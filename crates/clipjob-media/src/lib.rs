//! Source media acquisition through yt-dlp.
//!
//! This crate provides:
//! - Metadata lookup (`--dump-single-json`) without downloading
//! - Downloads with byte-level progress parsed from yt-dlp's output
//! - Media file discovery, mime types and best-effort cleanup

pub mod download;
pub mod error;
pub mod fs_utils;
pub mod progress;

pub use download::{check_ytdlp, sanitize_title, YtDlp, YtDlpConfig};
pub use error::{MediaError, MediaResult};
pub use fs_utils::{find_media_file, mime_type_for, remove_dir_best_effort, MEDIA_EXTENSIONS};
pub use progress::{parse_progress_line, DownloadProgress, PROGRESS_PREFIX};
