//! Application state.

use std::sync::Arc;

use clipjob_worker::JobExecutor;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub executor: Arc<JobExecutor>,
}

impl AppState {
    pub fn new(config: ApiConfig, executor: JobExecutor) -> Self {
        Self {
            config: Arc::new(config),
            executor: Arc::new(executor),
        }
    }
}
