//! Command-line consumer of the upscaling client.
//!
//! Usage: `pixelift <input-image> [output-path]`
//!
//! Reads an image file, runs the submit/poll/download workflow against
//! the service configured via `PIXELIFT_*` environment variables, and
//! writes the enhanced image. The default output path appends
//! `_upscaled` to the input file stem.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixelift_client::{PollProgress, UpscaleClient};
use pixelift_core::asset::{media_type_for_extension, ImageAsset};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixelift=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let input = match args.next() {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("Usage: pixelift <input-image> [output-path]");
            return ExitCode::FAILURE;
        }
    };
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output_path(&input));

    match run(&input, &output).await {
        Ok(image_len) => {
            tracing::info!(
                output = %output.display(),
                size = image_len,
                "Enhanced image written"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Upscale failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(input: &Path, output: &Path) -> anyhow::Result<usize> {
    let input_str = input.to_string_lossy();
    let media_type = media_type_for_extension(&input_str)
        .with_context(|| format!("Unsupported file extension: {input_str}"))?;

    let bytes = tokio::fs::read(input)
        .await
        .with_context(|| format!("Failed to read {input_str}"))?;
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let asset = ImageAsset::new(file_name, media_type, bytes);

    let client = UpscaleClient::from_env().context("Failed to load client configuration")?;

    let on_progress: pixelift_client::ProgressCallback = Box::new(|p: PollProgress| {
        tracing::info!(
            state = p.state.label(),
            attempt = p.attempt,
            progress = p.progress,
            "Waiting for upscale"
        );
    });
    let image = client.upscale(asset, Some(on_progress)).await?;

    tokio::fs::write(output, &image.bytes)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(image.bytes.len())
}

/// `photo.png` -> `photo_upscaled.png`, preserving the directory.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let name = match input.extension() {
        Some(ext) => format!("{stem}_upscaled.{}", ext.to_string_lossy()),
        None => format!("{stem}_upscaled"),
    };
    input.with_file_name(name)
}
