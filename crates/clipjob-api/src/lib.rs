//! Axum HTTP API for clip jobs.
//!
//! This crate provides:
//! - Job submission, status polling, listing and result retrieval
//! - Streaming of downloaded media from the worker's scratch directory
//! - Health reporting with collaborator availability
//! - Security headers, request ids and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
