//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("{0}")]
    Validation(String),

    #[error("Acquisition failed: {0}")]
    Acquisition(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Clip detection failed: {0}")]
    ClipDetection(String),

    #[error("Media error: {0}")]
    Media(#[from] clipjob_media::MediaError),

    #[error("ML service error: {0}")]
    Ml(#[from] clipjob_ml_client::MlError),

    #[error("Registry error: {0}")]
    Registry(#[from] clipjob_registry::RegistryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn acquisition(msg: impl Into<String>) -> Self {
        Self::Acquisition(msg.into())
    }

    pub fn transcription(msg: impl Into<String>) -> Self {
        Self::Transcription(msg.into())
    }

    pub fn clip_detection(msg: impl Into<String>) -> Self {
        Self::ClipDetection(msg.into())
    }

    /// Whether the error came from caller input rather than processing.
    pub fn is_validation(&self) -> bool {
        matches!(self, WorkerError::Validation(_))
    }
}

impl From<clipjob_models::UrlValidationError> for WorkerError {
    fn from(e: clipjob_models::UrlValidationError) -> Self {
        Self::Validation(e.to_string())
    }
}
