//! External collaborators of the pipeline.
//!
//! The pipeline only talks to acquisition, transcription and clip detection
//! through these traits. Production implementations wrap yt-dlp and the ML
//! service; tests plug in fakes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use clipjob_media::{DownloadProgress, YtDlp};
use clipjob_ml_client::MlClient;
use clipjob_models::{ClipCandidate, SourceMetadata, Transcription};

use crate::error::WorkerResult;

/// Download progress callback, called with a fraction in `[0, 1]`.
pub type FetchProgress = Box<dyn Fn(f64) + Send + Sync>;

/// Fetches source media and its metadata.
#[async_trait]
pub trait SourceAcquirer: Send + Sync {
    /// Title, duration and thumbnail, looked up before downloading.
    async fn resolve_metadata(&self, url: &str) -> WorkerResult<SourceMetadata>;

    /// Download the media into `dest_dir`, naming it after `file_stem`.
    async fn fetch(
        &self,
        url: &str,
        dest_dir: &Path,
        file_stem: &str,
        on_progress: FetchProgress,
    ) -> WorkerResult<PathBuf>;

    /// Whether the collaborator can currently do its job.
    async fn is_available(&self) -> bool {
        true
    }
}

/// Turns a media file into timed words.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, media_path: &Path) -> WorkerResult<Transcription>;

    async fn is_available(&self) -> bool {
        true
    }
}

/// Proposes clip spans over a transcription.
#[async_trait]
pub trait ClipFinder: Send + Sync {
    async fn find_clips(&self, transcription: &Transcription) -> WorkerResult<Vec<ClipCandidate>>;
}

#[async_trait]
impl SourceAcquirer for YtDlp {
    async fn resolve_metadata(&self, url: &str) -> WorkerResult<SourceMetadata> {
        Ok(YtDlp::resolve_metadata(self, url).await?)
    }

    async fn fetch(
        &self,
        url: &str,
        dest_dir: &Path,
        file_stem: &str,
        on_progress: FetchProgress,
    ) -> WorkerResult<PathBuf> {
        let path = YtDlp::fetch(self, url, dest_dir, file_stem, move |p: DownloadProgress| {
            if let Some(fraction) = p.fraction() {
                on_progress(fraction);
            }
        })
        .await?;
        Ok(path)
    }

    async fn is_available(&self) -> bool {
        YtDlp::is_available(self)
    }
}

#[async_trait]
impl Transcriber for MlClient {
    async fn transcribe(&self, media_path: &Path) -> WorkerResult<Transcription> {
        Ok(MlClient::transcribe(self, media_path).await?)
    }

    async fn is_available(&self) -> bool {
        self.health_check().await.unwrap_or(false)
    }
}

#[async_trait]
impl ClipFinder for MlClient {
    async fn find_clips(&self, transcription: &Transcription) -> WorkerResult<Vec<ClipCandidate>> {
        Ok(MlClient::find_clips(self, transcription).await?)
    }
}
