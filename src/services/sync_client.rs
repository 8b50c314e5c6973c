//! Remote sync service client.
//!
//! Provides the [`SyncControl`] seam used by the dispatcher and reporter,
//! and an HTTP implementation with bearer authentication.

use crate::config::RemoteConfig;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Job accepted by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartedSync {
    /// Raw state token of the new job.
    pub state: String,
    pub job_id: Option<String>,
}

/// Progress counters as reported by the remote service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteProgress {
    pub total_count: i64,
    pub items_left: i64,
    pub total_size: i64,
    pub size_left: i64,
}

/// Current job status of a repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSyncStatus {
    /// Raw state token, e.g. `running`.
    pub state: String,
    pub job_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub finish_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub progress: RemoteProgress,
}

/// Start, inspect and cancel sync jobs on the remote service.
///
/// Implementations report an already-running sync as [`AppError::Conflict`]
/// and an unknown repository as [`AppError::NotFound`].
#[async_trait]
pub trait SyncControl: Send + Sync {
    async fn start_sync(&self, remote_id: &str) -> Result<StartedSync, AppError>;

    async fn sync_status(&self, remote_id: &str) -> Result<RemoteSyncStatus, AppError>;

    /// Request cancellation without waiting for the job to stop.
    async fn cancel_sync(&self, remote_id: &str) -> Result<(), AppError>;
}

/// HTTP client for the remote sync service.
#[derive(Debug, Clone)]
pub struct SyncControlClient {
    client: Client,
    config: RemoteConfig,
}

impl SyncControlClient {
    /// Create a new client.
    pub fn new(config: RemoteConfig) -> Result<Self, AppError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        if let Some(token) = &config.token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| AppError::config("Invalid remote token format"))?;
            headers.insert(header::AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Full URL for an API path.
    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn sync_endpoint(remote_id: &str) -> String {
        format!("/repositories/{}/sync", urlencoding::encode(remote_id))
    }

    /// Map a non-success response to an error, consuming the body.
    async fn error_for(response: Response, endpoint: &str) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let body_message = extract_message(&body);

        match status {
            StatusCode::NOT_FOUND => AppError::not_found_with_id("Remote repository", endpoint),
            StatusCode::CONFLICT => AppError::Conflict {
                message: body_message.unwrap_or_else(|| "Sync already in progress".to_string()),
                repository_id: None,
            },
            _ => {
                let message = match body_message {
                    Some(msg) => msg,
                    None => format!("Request failed ({}): {}", status.as_u16(), body),
                };
                AppError::remote_call_full(message, status.as_u16(), endpoint)
            }
        }
    }

    /// Decode a JSON body or map the failure.
    async fn handle_response<T: DeserializeOwned>(
        response: Response,
        endpoint: &str,
    ) -> Result<T, AppError> {
        if response.status().is_success() {
            response.json::<T>().await.map_err(|e| {
                AppError::remote_call(format!("Failed to parse response from {}: {}", endpoint, e))
            })
        } else {
            Err(Self::error_for(response, endpoint).await)
        }
    }
}

#[async_trait]
impl SyncControl for SyncControlClient {
    async fn start_sync(&self, remote_id: &str) -> Result<StartedSync, AppError> {
        let endpoint = Self::sync_endpoint(remote_id);
        let response = self.client.post(self.api_url(&endpoint)).send().await?;
        Self::handle_response(response, &endpoint).await
    }

    async fn sync_status(&self, remote_id: &str) -> Result<RemoteSyncStatus, AppError> {
        let endpoint = Self::sync_endpoint(remote_id);
        let response = self.client.get(self.api_url(&endpoint)).send().await?;
        Self::handle_response(response, &endpoint).await
    }

    async fn cancel_sync(&self, remote_id: &str) -> Result<(), AppError> {
        let endpoint = Self::sync_endpoint(remote_id);
        let response = self.client.delete(self.api_url(&endpoint)).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_for(response, &endpoint).await)
        }
    }
}

/// Pull a human message out of a JSON error body.
///
/// Accepts `{"message": "..."}` or `{"error": "..."}`; non-string values are
/// rendered as JSON.
fn extract_message(body: &str) -> Option<String> {
    let value = serde_json::from_str::<serde_json::Value>(body).ok()?;
    let field = value.get("message").or_else(|| value.get("error"))?;
    Some(match field.as_str() {
        Some(s) => s.to_string(),
        None => field.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> SyncControlClient {
        SyncControlClient::new(RemoteConfig {
            base_url: base_url.to_string(),
            token: Some("test-token".to_string()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_api_url_construction() {
        let c = client("https://sync.example.com/api/");
        let endpoint = SyncControlClient::sync_endpoint("acme-rhel-6");
        assert_eq!(
            c.api_url(&endpoint),
            "https://sync.example.com/api/repositories/acme-rhel-6/sync"
        );
    }

    #[test]
    fn test_remote_ids_are_encoded() {
        assert_eq!(
            SyncControlClient::sync_endpoint("acme/rhel 6"),
            "/repositories/acme%2Frhel%206/sync"
        );
    }

    #[test]
    fn test_invalid_token_is_rejected() {
        let result = SyncControlClient::new(RemoteConfig {
            base_url: "https://sync.example.com".to_string(),
            token: Some("bad\ntoken".to_string()),
            timeout_secs: 5,
        });
        assert!(matches!(result, Err(AppError::Config { .. })));
    }

    #[test]
    fn test_extract_message() {
        assert_eq!(
            extract_message(r#"{"message": "already syncing"}"#).as_deref(),
            Some("already syncing")
        );
        assert_eq!(
            extract_message(r#"{"error": {"base": ["nope"]}}"#).as_deref(),
            Some(r#"{"base":["nope"]}"#)
        );
        assert!(extract_message("<html>").is_none());
    }

    #[test]
    fn test_status_deserialization() {
        let status: RemoteSyncStatus = serde_json::from_str(
            r#"{
                "state": "running",
                "job_id": "job-7",
                "start_time": "2026-03-01T10:00:00Z",
                "finish_time": null,
                "progress": {"total_count": 10, "items_left": 4, "total_size": 2048, "size_left": 512}
            }"#,
        )
        .unwrap();
        assert_eq!(status.state, "running");
        assert!(status.finish_time.is_none());
        assert_eq!(status.progress.size_left, 512);
    }

    #[test]
    fn test_status_without_progress() {
        let status: RemoteSyncStatus =
            serde_json::from_str(r#"{"state": "not_synced", "job_id": null, "start_time": null, "finish_time": null}"#)
                .unwrap();
        assert_eq!(status.progress, RemoteProgress::default());
    }
}
