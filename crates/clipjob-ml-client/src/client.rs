//! ML service HTTP client.

use std::path::Path;
use std::time::Duration;

use clipjob_models::{ClipCandidate, Transcription};
use reqwest::{Client, Response};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{MlError, MlResult};
use crate::types::{
    normalize_clips, normalize_words, FindClipsRequest, FindClipsResponse, HealthResponse,
    TranscribeRequest, TranscribeResponse,
};

/// Configuration for ML client.
#[derive(Debug, Clone)]
pub struct MlClientConfig {
    /// Base URL of ML service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Max retries
    pub max_retries: u32,
}

impl Default for MlClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout: Duration::from_secs(600), // transcription of long videos is slow
            max_retries: 2,
        }
    }
}

impl MlClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("ML_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8001".to_string()),
            timeout: Duration::from_secs(
                std::env::var("ML_SERVICE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
            max_retries: std::env::var("ML_SERVICE_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
        }
    }
}

/// Client for the transcription and clip-detection service.
#[derive(Debug, Clone)]
pub struct MlClient {
    http: Client,
    config: MlClientConfig,
}

impl MlClient {
    /// Create a new ML client.
    pub fn new(config: MlClientConfig) -> MlResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(MlError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> MlResult<Self> {
        Self::new(MlClientConfig::from_env())
    }

    pub fn config(&self) -> &MlClientConfig {
        &self.config
    }

    /// Check if ML service is healthy.
    pub async fn health_check(&self) -> MlResult<bool> {
        let url = format!("{}/health", self.config.base_url);

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                let health: HealthResponse = response.json().await?;
                Ok(health.status == "healthy" || health.status == "ok")
            }
            Ok(response) => {
                warn!("ML service health check failed: {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("ML service health check error: {}", e);
                Ok(false)
            }
        }
    }

    /// Transcribe a local media file into timed words.
    pub async fn transcribe(&self, media_path: &Path) -> MlResult<Transcription> {
        let request = TranscribeRequest {
            media_path: media_path.to_string_lossy().into_owned(),
        };
        let body: serde_json::Value = self.post_json("/transcribe", &request).await?;

        let parsed: TranscribeResponse = serde_json::from_value(body.clone())
            .map_err(|e| MlError::InvalidResponse(format!("transcription: {}", e)))?;
        let (words, text) = match parsed {
            TranscribeResponse::Wrapped { words, text } => (words, text),
            TranscribeResponse::Bare(words) => (words, None),
        };

        let words = normalize_words(words);
        debug!(words = words.len(), "Received transcription");
        Ok(Transcription {
            words,
            text,
            raw: Some(body),
        })
    }

    /// Ask the service for clip spans over a transcription.
    ///
    /// The original upstream payload is sent back when available, so the
    /// service sees exactly what it produced.
    pub async fn find_clips(&self, transcription: &Transcription) -> MlResult<Vec<ClipCandidate>> {
        let payload = match &transcription.raw {
            Some(raw) => raw.clone(),
            None => serde_json::to_value(transcription)?,
        };
        let request = FindClipsRequest {
            transcription: payload,
        };
        let body: serde_json::Value = self.post_json("/clips/find", &request).await?;

        let parsed: FindClipsResponse = serde_json::from_value(body)
            .map_err(|e| MlError::InvalidResponse(format!("clips: {}", e)))?;
        let clips = normalize_clips(parsed.into_clips());
        debug!(clips = clips.len(), "Received clip candidates");
        Ok(clips)
    }

    /// POST a JSON body with retries and decode the JSON response.
    async fn post_json<B: Serialize + Sync>(&self, path: &str, body: &B) -> MlResult<serde_json::Value> {
        let url = format!("{}{}", self.config.base_url, path);
        debug!("Sending request to {}", url);

        let response = self
            .with_retry(|| async {
                let response = self
                    .http
                    .post(&url)
                    .json(body)
                    .send()
                    .await
                    .map_err(MlError::Network)?;
                check_status(response).await
            })
            .await?;

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> MlResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = MlResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        "ML request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(MlError::RequestFailed("Unknown error".to_string())))
    }
}

/// Map non-success statuses: 5xx is retryable, anything else is not.
async fn check_status(response: Response) -> MlResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = format!("ML service returned {}: {}", status, body);
    if status.is_server_error() {
        Err(MlError::ServiceUnavailable(message))
    } else {
        Err(MlError::RequestFailed(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipjob_models::Word;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, max_retries: u32) -> MlClient {
        MlClient::new(MlClientConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
            max_retries,
        })
        .unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = MlClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8001");
        assert_eq!(config.timeout, Duration::from_secs(600));
        assert_eq!(config.max_retries, 2);
    }

    #[tokio::test]
    async fn test_transcribe_normalizes_words() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transcribe"))
            .and(body_partial_json(json!({"media_path": "/tmp/a.mp4"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "words": [
                    {"text": "hi", "start_char": 0, "end_char": 2, "start_time": 0.0, "end_time": "0.4"},
                    {"text": "there", "start_char": "3", "end_char": 8, "start_time": 0.5}
                ]
            })))
            .mount(&server)
            .await;

        let transcription = client_for(&server, 0)
            .transcribe(Path::new("/tmp/a.mp4"))
            .await
            .unwrap();

        assert_eq!(transcription.words.len(), 2);
        assert_eq!(transcription.words[0], Word::spanned("hi", 0, 2, 0.0, 0.4));
        assert_eq!(transcription.words[1].start_char, Some(3));
        assert_eq!(transcription.words[1].end_time, 0.0);
        assert!(transcription.raw.is_some());
    }

    #[tokio::test]
    async fn test_find_clips_sends_raw_transcription_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/clips/find"))
            .and(body_partial_json(json!({"transcription": {"marker": "upstream"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "clips": [{"start_time": 0.0, "end_time": 20.0, "start_char": 0, "end_char": 2}]
            })))
            .mount(&server)
            .await;

        let transcription = Transcription {
            words: Vec::new(),
            text: None,
            raw: Some(json!({"marker": "upstream"})),
        };
        let clips = client_for(&server, 0)
            .find_clips(&transcription)
            .await
            .unwrap();

        assert_eq!(clips, vec![ClipCandidate::new(0.0, 20.0).with_chars(0, 2)]);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transcribe"))
            .respond_with(ResponseTemplate::new(422).set_body_string("bad file"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server, 2)
            .transcribe(Path::new("/tmp/a.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, MlError::RequestFailed(ref msg) if msg.contains("bad file")));
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/clips/find"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let err = client_for(&server, 1)
            .find_clips(&Transcription::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MlError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_invalid_response_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/clips/find"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("nope")))
            .mount(&server)
            .await;

        let err = client_for(&server, 0)
            .find_clips(&Transcription::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MlError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(&server)
            .await;

        assert!(client_for(&server, 0).health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_health_check_unreachable() {
        let client = MlClient::new(MlClientConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(2),
            max_retries: 0,
        })
        .unwrap();
        assert!(!client.health_check().await.unwrap());
    }
}
