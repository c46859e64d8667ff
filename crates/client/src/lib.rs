//! HTTP client for an AI image-upscaling task service.
//!
//! Submits a validated image as a multipart upload, polls the returned
//! task at a fixed interval until a terminal state, then downloads the
//! enhanced image. Transition logic is pure and lives in
//! `pixelift-core`; this crate owns transport, timing, and the
//! top-level [`UpscaleClient`] workflow.

pub mod api;
pub mod client;
pub mod poller;

pub use api::{HttpUpscaleApi, UpscaleApi};
pub use client::{upscale_with, UpscaleClient, UpscaledImage};
pub use poller::{poll_until_terminal, PollProgress, ProgressCallback};
