//! Registry error types.

use clipjob_models::JobId;
use thiserror::Error;

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Job already exists: {0}")]
    DuplicateJob(JobId),
}
