//! Top-level upscaling workflow.
//!
//! [`UpscaleClient`] holds the configuration and HTTP client for one
//! service instance and runs the sequential pipeline: validate the
//! asset, submit it, poll the task to a terminal state, then download
//! the enhanced image. Each call owns its own task state — concurrent
//! calls on separate images are fully independent.

use pixelift_core::asset::ImageAsset;
use pixelift_core::config::ClientConfig;
use pixelift_core::error::UpscaleError;

use crate::api::{HttpUpscaleApi, UpscaleApi};
use crate::poller::{poll_until_terminal, ProgressCallback};

/// The materialized result: enhanced-image bytes plus the dimensions
/// the service declared, passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpscaledImage {
    /// Enhanced-image bytes, downloaded from the result URL.
    pub bytes: Vec<u8>,
    /// Declared output width, if the service reported one.
    pub width: Option<u32>,
    /// Declared output height, if the service reported one.
    pub height: Option<u32>,
}

/// Client for the remote upscaling service.
pub struct UpscaleClient {
    api: HttpUpscaleApi,
    config: ClientConfig,
}

impl UpscaleClient {
    /// Create a client from an explicit configuration.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            api: HttpUpscaleApi::new(config.clone()),
            config,
        }
    }

    /// Create a client from `PIXELIFT_*` environment variables.
    pub fn from_env() -> Result<Self, UpscaleError> {
        Ok(Self::new(ClientConfig::from_env()?))
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Upscale one image end to end.
    ///
    /// Resolves to the enhanced image, or fails with a classified
    /// [`UpscaleError`]. The optional callback fires once per poll
    /// attempt with the observed state and attempt count.
    pub async fn upscale(
        &self,
        asset: ImageAsset,
        on_progress: Option<ProgressCallback>,
    ) -> Result<UpscaledImage, UpscaleError> {
        upscale_with(&self.api, &self.config, asset, on_progress).await
    }
}

/// Run the upscaling workflow against any [`UpscaleApi`] endpoint.
///
/// This is the seam [`UpscaleClient::upscale`] delegates to; tests
/// drive it with a scripted endpoint instead of the real service.
pub async fn upscale_with(
    api: &dyn UpscaleApi,
    config: &ClientConfig,
    asset: ImageAsset,
    mut on_progress: Option<ProgressCallback>,
) -> Result<UpscaledImage, UpscaleError> {
    asset.validate()?;

    let task_id = api.create_task(&asset).await?;
    tracing::info!(
        task_id = %task_id,
        file_name = asset.file_name(),
        media_type = asset.media_type(),
        size = asset.len(),
        "Upscale task created"
    );

    let reference = poll_until_terminal(api, config, &task_id, &mut on_progress).await?;

    let bytes = api.fetch_image(&reference.url).await?;
    tracing::info!(
        task_id = %task_id,
        size = bytes.len(),
        width = reference.width,
        height = reference.height,
        "Enhanced image downloaded"
    );

    Ok(UpscaledImage {
        bytes,
        width: reference.width,
        height: reference.height,
    })
}
