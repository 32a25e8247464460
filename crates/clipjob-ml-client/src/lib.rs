//! Client for the ML transcription and clip-detection service.
//!
//! The service transcribes a local media file into timed words with
//! character spans and proposes clip spans over that transcription. Its
//! responses are normalized here once, so the rest of the workspace only
//! sees [`clipjob_models::Word`] and [`clipjob_models::ClipCandidate`].

pub mod client;
pub mod error;
pub mod types;

pub use client::{MlClient, MlClientConfig};
pub use error::{MlError, MlResult};
pub use types::{normalize_clips, normalize_words, RawClip, RawWord};
