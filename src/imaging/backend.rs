//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations every backend must
//! support: identify, thumbnail, and WebP transcoding.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate with `webp` for lossy WebP output.

use super::params::{Quality, ThumbnailParams};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },
    #[error("Failed to encode {path}: {reason}")]
    Encode { path: String, reason: String },
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// Planning (crop geometry, output naming) happens above this seam; the
/// backend only moves pixels.
pub trait ImageBackend {
    /// Get image dimensions without a full decode.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode, crop, resample and encode a thumbnail to `params.output`.
    ///
    /// On error nothing is left at `params.output`.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError>;

    /// Re-encode an existing raster file as lossy WebP at `output`.
    fn to_webp(&self, source: &Path, output: &Path, quality: Quality)
    -> Result<(), BackendError>;
}
