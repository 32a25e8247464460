//! Router tests against in-process collaborators.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use clipjob_api::{create_router, ApiConfig, AppState};
use clipjob_models::{ClipCandidate, SourceMetadata, Transcription, Word};
use clipjob_registry::JobRegistry;
use clipjob_worker::{
    ClipFinder, FetchProgress, JobExecutor, SourceAcquirer, Transcriber, WorkerConfig,
    WorkerResult,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

struct FakeAcquirer {
    gate: Option<Arc<tokio::sync::Notify>>,
}

#[async_trait]
impl SourceAcquirer for FakeAcquirer {
    async fn resolve_metadata(&self, _url: &str) -> WorkerResult<SourceMetadata> {
        Ok(SourceMetadata {
            title: "Demo".to_string(),
            duration: Some(60.0),
            thumbnail: None,
        })
    }

    async fn fetch(
        &self,
        _url: &str,
        dest_dir: &Path,
        file_stem: &str,
        on_progress: FetchProgress,
    ) -> WorkerResult<PathBuf> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let path = dest_dir.join(format!("{}.mp4", file_stem));
        tokio::fs::write(&path, b"not really a video").await?;
        on_progress(1.0);
        Ok(path)
    }
}

struct FakeMl;

#[async_trait]
impl Transcriber for FakeMl {
    async fn transcribe(&self, _media_path: &Path) -> WorkerResult<Transcription> {
        Ok(Transcription::from_words(vec![
            Word::spanned("hi", 0, 2, 0.0, 0.4),
            Word::spanned("there", 3, 8, 0.5, 1.0),
        ]))
    }

    async fn is_available(&self) -> bool {
        false
    }
}

#[async_trait]
impl ClipFinder for FakeMl {
    async fn find_clips(&self, _transcription: &Transcription) -> WorkerResult<Vec<ClipCandidate>> {
        Ok(vec![
            ClipCandidate::new(0.0, 20.0).with_chars(0, 2),
            ClipCandidate::new(0.0, 45.0),
        ])
    }
}

fn test_app(work_dir: &Path, gate: Option<Arc<tokio::sync::Notify>>) -> Router {
    let worker_config = WorkerConfig {
        work_dir: work_dir.to_path_buf(),
        ..Default::default()
    };
    let executor = JobExecutor::new(
        worker_config,
        Arc::new(JobRegistry::new()),
        Arc::new(FakeAcquirer { gate }),
        Arc::new(FakeMl),
        Arc::new(FakeMl),
    );
    create_router(AppState::new(ApiConfig::default(), executor), None)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn wait_for_status(app: &Router, job_id: &str, wanted: &str) -> Value {
    let uri = format!("/jobs/{}/status", job_id);
    for _ in 0..200 {
        let (status, body) = get_json(app, &uri).await;
        assert_eq!(status, StatusCode::OK);
        if body["status"] == wanted {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {job_id} never reached {wanted}");
}

#[tokio::test]
async fn test_health_reports_collaborators() {
    let dir = TempDir::new().unwrap();
    let app = test_app(dir.path(), None);

    let (status, body) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["yt_dlp_available"], true);
    assert_eq!(body["transcription_available"], false);
    assert!(body["version"].is_string());
    assert!(body["timestamp"].is_string());

    let (status, _) = get_json(&app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_submit_poll_and_fetch_result() {
    let dir = TempDir::new().unwrap();
    let app = test_app(dir.path(), None);

    let (status, body) = post_json(
        &app,
        "/youtube/process",
        serde_json::json!({"url": "https://youtu.be/abc", "max_duration": 30}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "queued");
    let job_id = body["job_id"].as_str().unwrap().to_string();

    let snapshot = wait_for_status(&app, &job_id, "completed").await;
    assert_eq!(snapshot["job_id"], job_id.as_str());
    assert_eq!(snapshot["progress"], 100);
    assert_eq!(snapshot["message"], "Processing complete!");
    assert_eq!(snapshot["max_duration"], 30.0);
    assert_eq!(snapshot["video"]["title"], "Demo");
    assert!(snapshot["eta_seconds"].is_null());
    assert!(snapshot["error"].is_null());

    let (status, result) = get_json(&app, &format!("/jobs/{}/result", job_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["transcript"]["transcription"], "hi there");
    let clips = result["video"]["clips"].as_array().unwrap();
    assert_eq!(clips.len(), 1);
    assert_eq!(clips[0]["title"], "hi");

    // The downloaded file can be streamed back.
    let media = result["temp_video_path"].as_str().unwrap();
    let request = Request::builder()
        .uri(format!("/video{}", media))
        .body(Body::empty())
        .unwrap();
    let (status, bytes) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"not really a video");

    let (status, listed) = get_json(&app, "/jobs?limit=abc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["jobs"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_submissions_are_rejected() {
    let dir = TempDir::new().unwrap();
    let app = test_app(dir.path(), None);

    let (status, body) = post_json(&app, "/youtube/process", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "YouTube URL is required");

    let (status, body) = post_json(
        &app,
        "/youtube/process",
        serde_json::json!({"url": "https://vimeo.com/123"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid YouTube URL");

    let (status, _) = post_json(
        &app,
        "/youtube/process",
        serde_json::json!({"url": "https://youtu.be/abc", "max_duration": -1}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, listed) = get_json(&app, "/jobs").await;
    assert!(listed["jobs"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let dir = TempDir::new().unwrap();
    let app = test_app(dir.path(), None);

    let (status, body) = get_json(&app, "/jobs/nope/status").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Job not found");

    let (status, body) = get_json(&app, "/jobs/nope/result").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Job not found");
}

#[tokio::test]
async fn test_result_of_running_job_is_not_completed() {
    let dir = TempDir::new().unwrap();
    let gate = Arc::new(tokio::sync::Notify::new());
    let app = test_app(dir.path(), Some(Arc::clone(&gate)));

    let (_, body) = post_json(
        &app,
        "/youtube/process",
        serde_json::json!({"url": "youtube.com/watch?v=abc"}),
    )
    .await;
    let job_id = body["job_id"].as_str().unwrap().to_string();

    let (status, body) = get_json(&app, &format!("/jobs/{}/result", job_id)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Job not completed");
    let job_status = body["status"].as_str().unwrap();
    assert!(job_status == "queued" || job_status == "processing");

    gate.notify_one();
    wait_for_status(&app, &job_id, "completed").await;
}

#[tokio::test]
async fn test_video_outside_work_dir_is_forbidden() {
    let dir = TempDir::new().unwrap();
    let app = test_app(dir.path(), None);

    let (status, body) = get_json(&app, "/video/etc/passwd").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());

    let missing = dir.path().join("missing.mp4");
    let (status, _) = get_json(&app, &format!("/video{}", missing.display())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_and_security_headers() {
    let dir = TempDir::new().unwrap();
    let app = test_app(dir.path(), None);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("X-Request-ID", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-123");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");

    // Metrics are disabled when no handle is given.
    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
