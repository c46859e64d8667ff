//! Image asset validation.
//!
//! An [`ImageAsset`] is the caller-supplied input to the upscaling
//! workflow: owned bytes plus a declared media type. Validation is pure
//! and synchronous, and always runs before any network call.

use crate::error::UpscaleError;

// ---------------------------------------------------------------------------
// Limits and accepted types
// ---------------------------------------------------------------------------

/// Maximum accepted upload size (10 MiB).
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Media types the upscaling service accepts.
///
/// `image/jpg` is not a registered type, but browsers and tools emit it
/// often enough that the service accepts it as an alias for JPEG.
pub const ACCEPTED_MEDIA_TYPES: &[&str] =
    &["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Map a file extension to its media type, for callers that only have a
/// path. Returns `None` for extensions outside the accepted set.
pub fn media_type_for_extension(path: &str) -> Option<&'static str> {
    let ext = path.rsplit('.').next()?;
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// ImageAsset
// ---------------------------------------------------------------------------

/// A user-selected image awaiting upload.
///
/// Immutable once constructed; the workflow consumes it on submission.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    file_name: String,
    media_type: String,
    bytes: Vec<u8>,
}

impl ImageAsset {
    /// Wrap raw image bytes with their declared media type.
    ///
    /// No validation happens here — call [`validate`](Self::validate)
    /// (the workflow does this for you) before submitting.
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Original file name, used as the multipart part file name.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Declared media type (e.g. `image/png`).
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Raw image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Check the asset against the service's input contract.
    ///
    /// Rejects empty payloads, media types outside
    /// [`ACCEPTED_MEDIA_TYPES`], and payloads over [`MAX_IMAGE_BYTES`].
    /// The rejection message is user-facing: it names the offending
    /// type or the actual size.
    pub fn validate(&self) -> Result<(), UpscaleError> {
        if self.bytes.is_empty() {
            return Err(UpscaleError::Validation(
                "No image data provided".to_string(),
            ));
        }

        if !ACCEPTED_MEDIA_TYPES.contains(&self.media_type.as_str()) {
            return Err(UpscaleError::Validation(format!(
                "Unsupported format: '{}'. Use JPG, PNG, or WebP.",
                self.media_type
            )));
        }

        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(UpscaleError::Validation(format!(
                "File too large: {:.2} MB. Max 10 MB.",
                self.bytes.len() as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
