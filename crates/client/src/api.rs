//! REST API client for the upscaling service endpoints.
//!
//! Wraps the task-creation and task-status endpoints (plus the result
//! download) using [`reqwest`]. The [`UpscaleApi`] trait is the seam
//! between the polling driver and the network, so the driver can be
//! exercised against a scripted endpoint in tests.

use async_trait::async_trait;
use serde::Deserialize;

use pixelift_core::asset::ImageAsset;
use pixelift_core::config::ClientConfig;
use pixelift_core::error::UpscaleError;
use pixelift_core::task::TaskStatus;

/// Header carrying the API credential.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Path of the visual-scale task collection, relative to the base URL.
const SCALE_TASKS_PATH: &str = "/api/tasks/visual/scale";

/// Multipart field name the service expects for the image payload.
const IMAGE_FIELD: &str = "image_file";

// ---------------------------------------------------------------------------
// Wire envelopes
// ---------------------------------------------------------------------------

/// Creation response: `{ "data": { "task_id": "..." } }`.
#[derive(Debug, Deserialize)]
struct CreateEnvelope {
    #[serde(default)]
    data: Option<CreatedTask>,
}

#[derive(Debug, Deserialize)]
struct CreatedTask {
    #[serde(default)]
    task_id: Option<String>,
}

/// Status response: `{ "data": { "state": ..., ... } }`.
#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    #[serde(default)]
    data: Option<TaskStatus>,
}

/// Error bodies usually carry `{ "message": "..." }`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

// ---------------------------------------------------------------------------
// UpscaleApi trait
// ---------------------------------------------------------------------------

/// Remote operations the workflow needs.
///
/// Implemented by [`HttpUpscaleApi`] for the real service and by fakes
/// in tests.
#[async_trait]
pub trait UpscaleApi: Send + Sync {
    /// Upload an image and return the server-assigned task id.
    async fn create_task(&self, asset: &ImageAsset) -> Result<String, UpscaleError>;

    /// Query the current status of a task.
    async fn task_status(&self, task_id: &str) -> Result<TaskStatus, UpscaleError>;

    /// Download the enhanced-image bytes from a result URL.
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, UpscaleError>;
}

// ---------------------------------------------------------------------------
// HttpUpscaleApi
// ---------------------------------------------------------------------------

/// [`UpscaleApi`] implementation backed by the real HTTP service.
pub struct HttpUpscaleApi {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpUpscaleApi {
    /// Build an API client with a per-request timeout from the config.
    pub fn new(config: ClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, config }
    }

    /// Reuse an existing [`reqwest::Client`] (connection pooling).
    pub fn with_client(client: reqwest::Client, config: ClientConfig) -> Self {
        Self { client, config }
    }

    fn tasks_url(&self) -> String {
        format!("{}{}", self.config.base_url, SCALE_TASKS_PATH)
    }

    /// Pull a human-readable message out of an error response body.
    ///
    /// Prefers the JSON `message` field, then the raw body, then the
    /// status line.
    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(&body) {
            if let Some(message) = parsed.message {
                return message;
            }
        }
        if body.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        } else {
            body
        }
    }

    /// Map a non-2xx upload status into the error taxonomy.
    fn classify_upload_status(status: u16, message: String) -> UpscaleError {
        match status {
            401 | 403 => UpscaleError::Auth("Check your API key.".to_string()),
            429 => UpscaleError::RateLimit("Please try again later.".to_string()),
            413 => UpscaleError::PayloadTooLarge(message),
            _ => UpscaleError::Upload { status, message },
        }
    }
}

#[async_trait]
impl UpscaleApi for HttpUpscaleApi {
    async fn create_task(&self, asset: &ImageAsset) -> Result<String, UpscaleError> {
        let part = reqwest::multipart::Part::bytes(asset.bytes().to_vec())
            .file_name(asset.file_name().to_string())
            .mime_str(asset.media_type())
            .map_err(|e| {
                UpscaleError::Validation(format!(
                    "Invalid media type '{}': {e}",
                    asset.media_type()
                ))
            })?;
        let form = reqwest::multipart::Form::new().part(IMAGE_FIELD, part);

        let response = self
            .client
            .post(self.tasks_url())
            .header(API_KEY_HEADER, &self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UpscaleError::Transport(format!("Upload request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response).await;
            return Err(Self::classify_upload_status(status.as_u16(), message));
        }

        let envelope: CreateEnvelope = response
            .json()
            .await
            .map_err(|e| UpscaleError::Protocol(format!("Malformed create response: {e}")))?;

        match envelope.data.and_then(|d| d.task_id) {
            Some(task_id) if !task_id.is_empty() => Ok(task_id),
            _ => Err(UpscaleError::Protocol(
                "Task id missing from create response".to_string(),
            )),
        }
    }

    async fn task_status(&self, task_id: &str) -> Result<TaskStatus, UpscaleError> {
        let response = self
            .client
            .get(format!("{}/{}", self.tasks_url(), task_id))
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await
            .map_err(|e| UpscaleError::Transport(format!("Status request failed: {e}")))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(UpscaleError::TaskNotFound(
                "It may have expired.".to_string(),
            ));
        }
        if !status.is_success() {
            let message = Self::error_message(response).await;
            return Err(UpscaleError::Upload {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: StatusEnvelope = response
            .json()
            .await
            .map_err(|e| UpscaleError::Protocol(format!("Malformed status response: {e}")))?;

        envelope.data.ok_or_else(|| {
            UpscaleError::Protocol("Status response missing task data".to_string())
        })
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, UpscaleError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| UpscaleError::Fetch(format!("Result request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpscaleError::Fetch(format!(
                "Result download returned HTTP {}",
                status.as_u16()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpscaleError::Fetch(format!("Result body read failed: {e}")))?;
        Ok(bytes.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
