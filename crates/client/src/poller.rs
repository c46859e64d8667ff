//! Polling driver for a submitted task.
//!
//! [`poll_until_terminal`] performs the actual status queries and
//! inter-attempt delays; each response is interpreted by the pure
//! transition function in `pixelift_core::task`. Queries are strictly
//! sequential — attempt N+1 is never issued before attempt N's
//! response has been observed.

use pixelift_core::config::ClientConfig;
use pixelift_core::error::UpscaleError;
use pixelift_core::task::{
    interpret_status, observed_state, PollOutcome, ResultReference, TaskState,
};

use crate::api::UpscaleApi;

/// Snapshot handed to the progress callback, once per poll attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollProgress {
    /// State observed on this attempt.
    pub state: TaskState,
    /// 1-based attempt counter.
    pub attempt: u32,
    /// Progress percentage, if the service reported one.
    pub progress: Option<u32>,
}

/// Optional observer invoked once per poll attempt.
pub type ProgressCallback = Box<dyn FnMut(PollProgress) + Send>;

/// Poll a task until it reaches a terminal state.
///
/// Issues at most `config.max_attempts` status queries, sleeping
/// `config.poll_interval` between consecutive attempts. The callback
/// fires on every attempt, whatever the outcome.
///
/// Terminal results:
/// * `Ok(reference)` — the task succeeded.
/// * [`UpscaleError::TaskFailed`] — the service reported failure.
/// * [`UpscaleError::Timeout`] — the budget ran out while pending.
/// * Any error from the status query itself (404 becomes
///   [`UpscaleError::TaskNotFound`] in the API layer) aborts
///   immediately; only "still processing" responses cause waiting.
pub async fn poll_until_terminal(
    api: &dyn UpscaleApi,
    config: &ClientConfig,
    task_id: &str,
    on_progress: &mut Option<ProgressCallback>,
) -> Result<ResultReference, UpscaleError> {
    for attempt in 1..=config.max_attempts {
        let status = api.task_status(task_id).await?;

        // The callback fires on every attempt where a response was
        // observed, even when the payload then turns out malformed.
        if let Some(callback) = on_progress.as_mut() {
            callback(PollProgress {
                state: observed_state(&status),
                attempt,
                progress: status.progress,
            });
        }

        match interpret_status(&status)? {
            PollOutcome::Succeeded(reference) => {
                tracing::info!(task_id = %task_id, attempt, "Upscale task completed");
                return Ok(reference);
            }
            PollOutcome::Failed { reason } => {
                tracing::warn!(task_id = %task_id, attempt, reason = %reason, "Upscale task failed");
                return Err(UpscaleError::TaskFailed(reason));
            }
            PollOutcome::Pending { state, progress } => {
                tracing::debug!(
                    task_id = %task_id,
                    attempt,
                    state = state.label(),
                    progress,
                    "Task still pending"
                );
                // No sleep after the final attempt; the budget is spent.
                if attempt < config.max_attempts {
                    tokio::time::sleep(config.poll_interval).await;
                }
            }
        }
    }

    tracing::warn!(
        task_id = %task_id,
        attempts = config.max_attempts,
        "Upscale task timed out"
    );
    Err(UpscaleError::Timeout {
        attempts: config.max_attempts,
    })
}
