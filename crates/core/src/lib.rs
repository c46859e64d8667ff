//! Core domain logic for the pixelift upscaling client.
//!
//! Pure, I/O-free building blocks: image asset validation, the task
//! lifecycle state machine, status-payload interpretation, the error
//! taxonomy, and client configuration.

pub mod asset;
pub mod config;
pub mod error;
pub mod task;
