//! In-memory job registry.
//!
//! Holds every job submitted during the lifetime of the process. Nothing is
//! persisted and nothing is evicted.

pub mod error;
pub mod registry;

pub use error::{RegistryError, RegistryResult};
pub use registry::{clamp_limit, JobRegistry, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
