//! Client configuration.
//!
//! Everything the client needs to talk to the upscaling service lives
//! in an explicit [`ClientConfig`] owned by the client instance — no
//! process-wide globals. Load one from the environment with
//! [`ClientConfig::from_env`] or build it directly.

use std::time::Duration;

use crate::error::UpscaleError;

/// Default service base URL.
pub const DEFAULT_BASE_URL: &str = "https://techhk.aoscdn.com";

/// Default status-query budget (~2 minutes at the default interval).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// Default delay between status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default timeout for a single HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection and polling configuration for one client instance.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service base URL, without a trailing slash.
    pub base_url: String,
    /// API credential sent in the `X-API-Key` header.
    pub api_key: String,
    /// Maximum number of status queries before giving up.
    pub max_attempts: u32,
    /// Fixed delay between status queries.
    pub poll_interval: Duration,
    /// Timeout applied to each individual HTTP request.
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Build a configuration with the default polling policy.
    ///
    /// A trailing slash on `base_url` is trimmed so path joins never
    /// produce `//`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var                     | Default                      |
    /// |-----------------------------|------------------------------|
    /// | `PIXELIFT_API_KEY`          | (required)                   |
    /// | `PIXELIFT_BASE_URL`         | `https://techhk.aoscdn.com`  |
    /// | `PIXELIFT_MAX_ATTEMPTS`     | `60`                         |
    /// | `PIXELIFT_POLL_INTERVAL_MS` | `2000`                       |
    ///
    /// Fails with [`UpscaleError::Config`] when the API key is absent
    /// or a numeric value does not parse.
    pub fn from_env() -> Result<Self, UpscaleError> {
        let api_key = std::env::var("PIXELIFT_API_KEY")
            .map_err(|_| UpscaleError::Config("PIXELIFT_API_KEY is not set".to_string()))?;

        let base_url =
            std::env::var("PIXELIFT_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let max_attempts: u32 = std::env::var("PIXELIFT_MAX_ATTEMPTS")
            .unwrap_or_else(|_| DEFAULT_MAX_ATTEMPTS.to_string())
            .parse()
            .map_err(|_| {
                UpscaleError::Config("PIXELIFT_MAX_ATTEMPTS must be a valid u32".to_string())
            })?;

        let poll_interval_ms: u64 = std::env::var("PIXELIFT_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| DEFAULT_POLL_INTERVAL.as_millis().to_string())
            .parse()
            .map_err(|_| {
                UpscaleError::Config("PIXELIFT_POLL_INTERVAL_MS must be a valid u64".to_string())
            })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            max_attempts,
            poll_interval: Duration::from_millis(poll_interval_ms),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
