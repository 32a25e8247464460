//! Streaming of downloaded media.

use std::io::ErrorKind;
use std::path::{Component, Path as FsPath, PathBuf};

use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Serve a file from the worker's scratch directory.
///
/// The captured path is absolute, as reported in a job's `video.path` or a
/// result's `temp_video_path`. Anything resolving outside the work directory
/// is refused with 403. Range requests are honoured.
pub async fn serve_video(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    request: Request,
) -> ApiResult<Response> {
    let work_dir = &state.executor.config().work_dir;
    let file = resolve_media_path(work_dir, &raw).await?;

    match ServeFile::new(&file).oneshot(request).await {
        Ok(response) => Ok(response.map(Body::new).into_response()),
        Err(never) => match never {},
    }
}

/// Map a requested path onto a file inside `work_dir`.
async fn resolve_media_path(work_dir: &FsPath, raw: &str) -> ApiResult<PathBuf> {
    let requested = PathBuf::from(format!("/{}", raw.trim_start_matches('/')));
    if requested
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(outside_work_dir(raw));
    }

    let root = match tokio::fs::canonicalize(work_dir).await {
        Ok(root) => root,
        Err(_) if requested.starts_with(work_dir) => return Err(file_not_found(raw)),
        Err(_) => return Err(outside_work_dir(raw)),
    };

    match tokio::fs::canonicalize(&requested).await {
        Ok(resolved) if !resolved.starts_with(&root) => Err(outside_work_dir(raw)),
        Ok(resolved) => match tokio::fs::metadata(&resolved).await {
            Ok(meta) if meta.is_file() => Ok(resolved),
            _ => Err(file_not_found(raw)),
        },
        Err(e) if e.kind() == ErrorKind::NotFound => {
            if requested.starts_with(work_dir) || requested.starts_with(&root) {
                Err(file_not_found(raw))
            } else {
                Err(outside_work_dir(raw))
            }
        }
        Err(e) => {
            warn!(path = %raw, error = %e, "Could not resolve media path");
            Err(ApiError::internal(e.to_string()))
        }
    }
}

fn outside_work_dir(raw: &str) -> ApiError {
    warn!(path = %raw, "Refused media path outside work directory");
    ApiError::forbidden("Invalid file path - only job files can be served")
}

fn file_not_found(raw: &str) -> ApiError {
    ApiError::not_found(format!("File not found: /{}", raw.trim_start_matches('/')))
}
