//! Error taxonomy for the upscaling workflow.
//!
//! Every failure surfaced to a caller is one of these variants. All of
//! them are terminal for the current invocation — nothing is retried
//! automatically except the "still processing" polling loop itself.

/// Errors produced by validation, submission, polling, or result download.
#[derive(Debug, thiserror::Error)]
pub enum UpscaleError {
    /// The input image was rejected before any network call.
    #[error("Invalid file: {0}")]
    Validation(String),

    /// The service rejected the API credential (HTTP 401/403).
    #[error("API authentication failed: {0}")]
    Auth(String),

    /// The service throttled the request (HTTP 429).
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// The service refused the upload as too large (HTTP 413).
    #[error("Image file too large: {0}")]
    PayloadTooLarge(String),

    /// Any other non-2xx response to the upload or a status query.
    #[error("Upload failed ({status}): {message}")]
    Upload {
        /// HTTP status code.
        status: u16,
        /// Server-supplied message, or the raw response body.
        message: String,
    },

    /// The request itself failed — no response was received
    /// (network, DNS, TLS, timeout).
    #[error("Network error: {0}")]
    Transport(String),

    /// The server answered successfully but the body did not have the
    /// expected shape (e.g. a create response without a task id).
    #[error("Unexpected server response: {0}")]
    Protocol(String),

    /// A status query returned 404 — the task is gone or expired.
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// The server reported that processing failed. The message carries
    /// the server reason plus candidate causes for user display.
    #[error("{0}")]
    TaskFailed(String),

    /// No terminal state was observed within the attempt budget.
    #[error("Upscale timed out after {attempts} status checks")]
    Timeout {
        /// Number of status queries issued before giving up.
        attempts: u32,
    },

    /// The secondary download of the enhanced image failed.
    #[error("Result download failed: {0}")]
    Fetch(String),

    /// Client configuration could not be assembled (missing or
    /// malformed environment values).
    #[error("Configuration error: {0}")]
    Config(String),
}

impl UpscaleError {
    /// Stable machine-readable kind string for this error.
    ///
    /// Unlike the `Display` output, these never change and are safe to
    /// match on in calling code or structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            UpscaleError::Validation(_) => "validation",
            UpscaleError::Auth(_) => "auth",
            UpscaleError::RateLimit(_) => "rate_limit",
            UpscaleError::PayloadTooLarge(_) => "payload_too_large",
            UpscaleError::Upload { .. } => "upload",
            UpscaleError::Transport(_) => "transport",
            UpscaleError::Protocol(_) => "protocol",
            UpscaleError::TaskNotFound(_) => "task_not_found",
            UpscaleError::TaskFailed(_) => "task_failed",
            UpscaleError::Timeout { .. } => "timeout",
            UpscaleError::Fetch(_) => "fetch",
            UpscaleError::Config(_) => "config",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
