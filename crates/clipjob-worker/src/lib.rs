//! Job pipeline worker.
//!
//! This crate provides:
//! - Transcript reconstruction from word-level character spans
//! - Clip selection and enrichment
//! - Collaborator traits for acquisition, transcription and clip detection
//! - The per-job pipeline (`JobProcessor`) and the submit/poll surface
//!   (`JobExecutor`)

pub mod clip_select;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod metrics;
pub mod processor;
pub mod transcript;

pub use clip_select::select_clips;
pub use collaborators::{ClipFinder, FetchProgress, SourceAcquirer, Transcriber};
pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::{CollaboratorHealth, JobExecutor, ResultLookup};
pub use logging::JobLogger;
pub use processor::JobProcessor;
pub use transcript::reconstruct;
