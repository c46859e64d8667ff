//! End-to-end workflow tests against a scripted in-memory endpoint.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;

use pixelift_client::{poll_until_terminal, upscale_with, PollProgress, UpscaleApi};
use pixelift_core::asset::ImageAsset;
use pixelift_core::config::ClientConfig;
use pixelift_core::error::UpscaleError;
use pixelift_core::task::{TaskState, TaskStatus};

// ---------------------------------------------------------------------------
// Scripted endpoint
// ---------------------------------------------------------------------------

/// Fake endpoint that replays a scripted sequence of status responses
/// and counts every call.
struct ScriptedApi {
    create_result: Mutex<Option<Result<String, UpscaleError>>>,
    statuses: Mutex<VecDeque<Result<TaskStatus, UpscaleError>>>,
    image_bytes: Vec<u8>,
    create_calls: AtomicU32,
    status_calls: AtomicU32,
    fetch_calls: AtomicU32,
}

impl ScriptedApi {
    fn new(
        create_result: Result<String, UpscaleError>,
        statuses: Vec<Result<TaskStatus, UpscaleError>>,
    ) -> Self {
        Self {
            create_result: Mutex::new(Some(create_result)),
            statuses: Mutex::new(statuses.into_iter().collect()),
            image_bytes: b"enhanced-bytes".to_vec(),
            create_calls: AtomicU32::new(0),
            status_calls: AtomicU32::new(0),
            fetch_calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl UpscaleApi for ScriptedApi {
    async fn create_task(&self, _asset: &ImageAsset) -> Result<String, UpscaleError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.create_result
            .lock()
            .unwrap()
            .take()
            .expect("create_task called more than once")
    }

    async fn task_status(&self, _task_id: &str) -> Result<TaskStatus, UpscaleError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .expect("status queried past the scripted sequence")
    }

    async fn fetch_image(&self, _url: &str) -> Result<Vec<u8>, UpscaleError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.image_bytes.clone())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fast_config() -> ClientConfig {
    let mut config = ClientConfig::new("https://svc.example.com", "test-key");
    config.poll_interval = Duration::ZERO;
    config
}

fn png_asset() -> ImageAsset {
    ImageAsset::new("photo.png", "image/png", vec![0u8; 64])
}

fn processing(progress: Option<u32>) -> TaskStatus {
    TaskStatus {
        state: 1,
        state_detail: Some("Processing".into()),
        progress,
        ..Default::default()
    }
}

fn complete(width: u32, height: u32) -> TaskStatus {
    TaskStatus {
        state: 1,
        state_detail: Some("Complete".into()),
        image: Some("https://cdn.example.com/out.png".into()),
        image_width: Some(width),
        image_height: Some(height),
        ..Default::default()
    }
}

fn failed(error: &str) -> TaskStatus {
    TaskStatus {
        state: 4,
        error: Some(error.into()),
        ..Default::default()
    }
}

fn recording_callback(seen: &Arc<Mutex<Vec<PollProgress>>>) -> pixelift_client::ProgressCallback {
    let seen = Arc::clone(seen);
    Box::new(move |p| seen.lock().unwrap().push(p))
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn processing_three_times_then_success_polls_exactly_four_times() {
    let api = ScriptedApi::new(
        Ok("task-1".into()),
        vec![
            Ok(processing(Some(10))),
            Ok(processing(Some(50))),
            Ok(processing(Some(90))),
            Ok(complete(2048, 1536)),
        ],
    );
    let seen = Arc::new(Mutex::new(Vec::new()));

    let result = upscale_with(
        &api,
        &fast_config(),
        png_asset(),
        Some(recording_callback(&seen)),
    )
    .await
    .unwrap();

    assert_eq!(api.status_calls.load(Ordering::SeqCst), 4);
    assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.bytes, b"enhanced-bytes");
    assert_eq!(result.width, Some(2048));
    assert_eq!(result.height, Some(1536));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 4);
    assert_eq!(
        seen[0],
        PollProgress {
            state: TaskState::Processing,
            attempt: 1,
            progress: Some(10),
        }
    );
    assert_eq!(seen[3].state, TaskState::Succeeded);
    assert_eq!(seen[3].attempt, 4);
}

#[tokio::test]
async fn sixty_pending_responses_time_out_without_a_sixty_first_query() {
    let statuses = (0..60)
        .map(|_| {
            Ok(TaskStatus {
                state: 0,
                ..Default::default()
            })
        })
        .collect();
    let api = ScriptedApi::new(Ok("task-1".into()), statuses);
    let seen = Arc::new(Mutex::new(Vec::new()));

    let err = upscale_with(
        &api,
        &fast_config(),
        png_asset(),
        Some(recording_callback(&seen)),
    )
    .await
    .unwrap_err();

    assert_matches!(err, UpscaleError::Timeout { attempts: 60 });
    // Exactly the budget — the scripted queue would panic on a 61st pop.
    assert_eq!(api.status_calls.load(Ordering::SeqCst), 60);
    assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 0);
    assert_eq!(seen.lock().unwrap().len(), 60);
    assert_eq!(seen.lock().unwrap()[0].state, TaskState::Queued);
}

#[tokio::test]
async fn server_reported_failure_terminates_immediately() {
    let api = ScriptedApi::new(
        Ok("task-1".into()),
        vec![Ok(processing(None)), Ok(failed("content rejected"))],
    );

    let err = upscale_with(&api, &fast_config(), png_asset(), None)
        .await
        .unwrap_err();

    assert_matches!(err, UpscaleError::TaskFailed(reason) => {
        assert!(reason.contains("content rejected"), "{reason}");
    });
    assert_eq!(api.status_calls.load(Ordering::SeqCst), 2);
    assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn task_not_found_terminates_immediately_with_budget_remaining() {
    let api = ScriptedApi::new(
        Ok("task-1".into()),
        vec![
            Ok(processing(None)),
            Err(UpscaleError::TaskNotFound("It may have expired.".into())),
        ],
    );

    let err = upscale_with(&api, &fast_config(), png_asset(), None)
        .await
        .unwrap_err();

    assert_matches!(err, UpscaleError::TaskNotFound(_));
    assert_eq!(api.status_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn missing_task_id_fails_before_any_polling() {
    let api = ScriptedApi::new(
        Err(UpscaleError::Protocol(
            "Task id missing from create response".into(),
        )),
        vec![],
    );

    let err = upscale_with(&api, &fast_config(), png_asset(), None)
        .await
        .unwrap_err();

    assert_matches!(err, UpscaleError::Protocol(_));
    assert_eq!(api.create_calls.load(Ordering::SeqCst), 1);
    assert_eq!(api.status_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn invalid_asset_rejected_before_any_network_call() {
    let api = ScriptedApi::new(Ok("task-1".into()), vec![]);
    let asset = ImageAsset::new("anim.gif", "image/gif", vec![0u8; 64]);

    let err = upscale_with(&api, &fast_config(), asset, None)
        .await
        .unwrap_err();

    assert_matches!(err, UpscaleError::Validation(_));
    assert_eq!(api.create_calls.load(Ordering::SeqCst), 0);
    assert_eq!(api.status_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn success_without_result_url_is_a_protocol_error() {
    let api = ScriptedApi::new(
        Ok("task-1".into()),
        vec![Ok(TaskStatus {
            state: 1,
            state_detail: Some("Complete".into()),
            ..Default::default()
        })],
    );
    let seen = Arc::new(Mutex::new(Vec::new()));

    let err = upscale_with(
        &api,
        &fast_config(),
        png_asset(),
        Some(recording_callback(&seen)),
    )
    .await
    .unwrap_err();

    assert_matches!(err, UpscaleError::Protocol(_));
    assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 0);

    // The callback still fires for the attempt whose payload was
    // malformed; it reports the state the service claimed.
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].state, TaskState::Succeeded);
    assert_eq!(seen[0].attempt, 1);
}

// ---------------------------------------------------------------------------
// Poller in isolation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn poller_returns_verbatim_reference() {
    let api = ScriptedApi::new(Ok("unused".into()), vec![Ok(complete(800, 600))]);
    let mut on_progress: Option<pixelift_client::ProgressCallback> = None;

    let reference = poll_until_terminal(&api, &fast_config(), "task-9", &mut on_progress)
        .await
        .unwrap();

    assert_eq!(reference.url, "https://cdn.example.com/out.png");
    assert_eq!(reference.width, Some(800));
    assert_eq!(reference.height, Some(600));
}

#[tokio::test]
async fn poller_aborts_on_transport_error_without_retry() {
    let api = ScriptedApi::new(
        Ok("unused".into()),
        vec![
            Ok(processing(None)),
            Err(UpscaleError::Transport("connection reset".into())),
        ],
    );
    let mut on_progress: Option<pixelift_client::ProgressCallback> = None;

    let err = poll_until_terminal(&api, &fast_config(), "task-9", &mut on_progress)
        .await
        .unwrap_err();

    assert_matches!(err, UpscaleError::Transport(_));
    assert_eq!(api.status_calls.load(Ordering::SeqCst), 2);
}
