//! Task lifecycle state machine.
//!
//! The remote service reports task progress through a numeric state
//! code plus a detail string. [`interpret_status`] is the pure
//! transition function from one status payload to a [`PollOutcome`];
//! the network loop that feeds it lives in the client crate, so timing
//! and transport stay independent of transition logic.

use serde::Deserialize;

use crate::error::UpscaleError;

// ---------------------------------------------------------------------------
// Wire state codes
// ---------------------------------------------------------------------------

/// State code for a task waiting in the queue.
pub const STATE_CODE_QUEUED: i32 = 0;
/// State code for a finished task. Only final when `state_detail` is
/// [`STATE_DETAIL_COMPLETE`]; otherwise the task is still processing.
pub const STATE_CODE_COMPLETED: i32 = 1;
/// State code for a failed task.
pub const STATE_CODE_FAILED: i32 = 4;

/// Detail string confirming that a `state == 1` task is fully done.
pub const STATE_DETAIL_COMPLETE: &str = "Complete";

/// Candidate causes appended to a server-reported failure, for user
/// display. The service rarely says why a task failed.
const FAILURE_HINTS: &[&str] = &[
    "unsupported image format or content",
    "image too large or corrupted",
    "server-side processing error",
    "rate limit or quota exceeded",
];

// ---------------------------------------------------------------------------
// Lifecycle states
// ---------------------------------------------------------------------------

/// Local view of a task's lifecycle.
///
/// `Queued → Processing → {Succeeded | Failed}`, plus `TimedOut` when
/// the attempt budget runs out before a terminal state is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Waiting in the service queue (state code 0).
    Queued,
    /// Accepted and being worked on.
    Processing,
    /// Finished; a result reference is available.
    Succeeded,
    /// The service reported a processing failure.
    Failed,
    /// No terminal state within the attempt budget.
    TimedOut,
}

impl TaskState {
    /// Stable lowercase label for logs and the progress callback.
    pub fn label(&self) -> &'static str {
        match self {
            TaskState::Queued => "queued",
            TaskState::Processing => "processing",
            TaskState::Succeeded => "succeeded",
            TaskState::Failed => "failed",
            TaskState::TimedOut => "timed_out",
        }
    }

    /// Whether no further polling should occur from this state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Succeeded | TaskState::Failed | TaskState::TimedOut
        )
    }
}

// ---------------------------------------------------------------------------
// Wire payload
// ---------------------------------------------------------------------------

/// Status-endpoint payload for one task, as returned by the service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskStatus {
    /// Numeric state code (see the `STATE_CODE_*` constants).
    #[serde(default)]
    pub state: i32,
    /// Textual qualifier for the state code.
    #[serde(default)]
    pub state_detail: Option<String>,
    /// Progress percentage, when the service reports one.
    #[serde(default)]
    pub progress: Option<u32>,
    /// Result image URL; present only on full completion.
    #[serde(default)]
    pub image: Option<String>,
    /// Declared output width in pixels.
    #[serde(default)]
    pub image_width: Option<u32>,
    /// Declared output height in pixels.
    #[serde(default)]
    pub image_height: Option<u32>,
    /// Server error description, on failure.
    #[serde(default)]
    pub error: Option<String>,
    /// Alternative server message field, on failure.
    #[serde(default)]
    pub message: Option<String>,
}

/// Remote locator for the enhanced image, plus the dimensions the
/// success payload declared. Dimensions pass through verbatim — absent
/// in the payload means absent here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultReference {
    /// URL of the enhanced image, fetched in a second request.
    pub url: String,
    /// Declared output width.
    pub width: Option<u32>,
    /// Declared output height.
    pub height: Option<u32>,
}

/// Outcome of interpreting one status payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Not finished yet; poll again after the configured delay.
    Pending {
        /// Which non-terminal state was observed.
        state: TaskState,
        /// Progress percentage, if reported.
        progress: Option<u32>,
    },
    /// Finished; the result is ready to fetch.
    Succeeded(ResultReference),
    /// The service reported a processing failure.
    Failed {
        /// User-facing reason, built by [`failure_reason`].
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Transition function
// ---------------------------------------------------------------------------

/// Classify which lifecycle state a status payload reports.
///
/// Unlike [`interpret_status`] this never fails: it looks only at the
/// state code and detail string, not at whether the rest of the
/// payload is well-formed. Observers (progress callbacks, logs) use
/// this so they still see the attempt when the payload turns out to
/// be malformed.
pub fn observed_state(status: &TaskStatus) -> TaskState {
    if status.state == STATE_CODE_COMPLETED
        && status.state_detail.as_deref() == Some(STATE_DETAIL_COMPLETE)
    {
        TaskState::Succeeded
    } else if status.state == STATE_CODE_FAILED {
        TaskState::Failed
    } else if status.state == STATE_CODE_QUEUED {
        TaskState::Queued
    } else {
        TaskState::Processing
    }
}

/// Interpret one status payload into a [`PollOutcome`].
///
/// Pure: no I/O, no clock. The rules mirror the service's contract:
///
/// * `state == 1` with `state_detail == "Complete"` is success — and
///   must carry a result URL, otherwise the payload is malformed.
/// * `state == 4` is failure, with the server's message when present.
/// * Everything else (queued, or `state == 1` mid-progress) is pending.
pub fn interpret_status(status: &TaskStatus) -> Result<PollOutcome, UpscaleError> {
    if status.state == STATE_CODE_COMPLETED
        && status.state_detail.as_deref() == Some(STATE_DETAIL_COMPLETE)
    {
        let url = match &status.image {
            Some(url) if !url.is_empty() => url.clone(),
            _ => {
                return Err(UpscaleError::Protocol(
                    "No image URL in completed response".to_string(),
                ))
            }
        };
        return Ok(PollOutcome::Succeeded(ResultReference {
            url,
            width: status.image_width,
            height: status.image_height,
        }));
    }

    if status.state == STATE_CODE_FAILED {
        return Ok(PollOutcome::Failed {
            reason: failure_reason(status),
        });
    }

    let state = if status.state == STATE_CODE_QUEUED {
        TaskState::Queued
    } else {
        TaskState::Processing
    };
    Ok(PollOutcome::Pending {
        state,
        progress: status.progress,
    })
}

/// Build the user-facing reason string for a failed task.
///
/// Uses the server's `error` field, then `message`, then a generic
/// fallback, and appends [`FAILURE_HINTS`] since the service's own
/// messages are usually unhelpful.
pub fn failure_reason(status: &TaskStatus) -> String {
    let server_msg = status
        .error
        .as_deref()
        .or(status.message.as_deref())
        .unwrap_or("Unknown error");
    format!(
        "Upscale failed: {server_msg}. Possible causes: {}.",
        FAILURE_HINTS.join("; ")
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
