//! Job submission and polling handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use clipjob_models::{elapsed_seconds, eta_seconds, Job, JobId, JobResult, JobStatus, VideoInfo};
use clipjob_registry::clamp_limit;
use clipjob_worker::ResultLookup;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// Types
// ============================================================================

/// Body of `POST /youtube/process`.
#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub url: Option<String>,
    /// Longest clip to keep, in seconds.
    #[serde(default)]
    pub max_duration: Option<f64>,
}

/// Response to a successful submission.
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub job_id: JobId,
    pub status: JobStatus,
    pub message: String,
}

/// Query parameters for the job list.
#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    /// Kept as text so a garbage value falls back to the default limit.
    #[serde(default)]
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListJobsResponse {
    pub jobs: Vec<JobSnapshot>,
}

/// Point-in-time view of a job as returned to pollers.
#[derive(Debug, Serialize)]
pub struct JobSnapshot {
    pub job_id: JobId,
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub elapsed_seconds: Option<f64>,
    pub eta_seconds: Option<f64>,
    pub max_duration: f64,
    pub video: VideoInfo,
}

impl JobSnapshot {
    pub fn new(job: Job, now: DateTime<Utc>) -> Self {
        Self {
            elapsed_seconds: elapsed_seconds(&job, now),
            eta_seconds: eta_seconds(&job, now),
            job_id: job.id,
            status: job.status,
            progress: job.progress,
            message: job.message,
            error: job.error,
            created_at: job.created_at,
            updated_at: job.updated_at,
            started_at: job.started_at,
            max_duration: job.max_clip_duration,
            video: job.video,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Start processing a YouTube video; returns as soon as the job is queued.
pub async fn process_youtube(
    State(state): State<AppState>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> ApiResult<Json<ProcessResponse>> {
    let Json(request) =
        payload.map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e.body_text())))?;

    let url = request
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("YouTube URL is required"))?;

    let job_id = state.executor.submit(&url, request.max_duration)?;
    info!(job_id = %job_id, "Accepted processing request");

    Ok(Json(ProcessResponse {
        message: format!(
            "Processing started. Use /jobs/{}/status to check progress.",
            job_id
        ),
        job_id,
        status: JobStatus::Queued,
    }))
}

/// Newest jobs first.
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> Json<ListJobsResponse> {
    let limit = clamp_limit(query.limit.as_deref());
    let now = Utc::now();
    let jobs = state
        .executor
        .list_jobs(limit)
        .into_iter()
        .map(|job| JobSnapshot::new(job, now))
        .collect();
    Json(ListJobsResponse { jobs })
}

/// Poll a job's status.
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobSnapshot>> {
    let job = state
        .executor
        .get_status(&JobId::from_string(job_id))
        .ok_or_else(ApiError::job_not_found)?;
    Ok(Json(JobSnapshot::new(job, Utc::now())))
}

/// Final payload of a completed job.
pub async fn get_job_result(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobResult>> {
    match state.executor.get_result(&JobId::from_string(job_id)) {
        ResultLookup::Ready(result) => Ok(Json(*result)),
        ResultLookup::NotCompleted(status) => Err(ApiError::NotCompleted(status)),
        ResultLookup::NotFound => Err(ApiError::job_not_found()),
    }
}
