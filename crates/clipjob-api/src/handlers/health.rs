//! Health check handler.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub yt_dlp_available: bool,
    pub transcription_available: bool,
    pub timestamp: String,
}

/// Liveness probe that also reports whether the collaborators are usable.
///
/// Always answers 200; an unavailable collaborator only flips its flag.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let collaborators = state.executor.health().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        yt_dlp_available: collaborators.acquisition_available,
        transcription_available: collaborators.transcription_available,
        timestamp: Utc::now().to_rfc3339(),
    })
}
