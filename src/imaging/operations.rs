//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take the request and encoding settings, compute parameters, and call
//! the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::compute_crop;
use super::format::SourceFormat;
use super::params::{Compression, Quality, ThumbnailParams};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// A failed WebP post-pass. Recoverable: the JPEG/PNG artifact is still valid.
#[derive(Error, Debug)]
#[error("WebP conversion of {} failed: {source}", path.display())]
pub struct TranscodeError {
    pub path: PathBuf,
    #[source]
    pub source: BackendError,
}

/// Outcome of [`transcode_to_webp`].
#[derive(Debug)]
pub struct Transcoded {
    /// The WebP file on success, the untouched input otherwise.
    pub path: PathBuf,
    pub error: Option<TranscodeError>,
}

/// Source, destination and encoding settings of one thumbnail request.
#[derive(Debug, Clone)]
pub struct ThumbnailRequest<'a> {
    pub source: &'a Path,
    pub format: SourceFormat,
    pub output: &'a Path,
    pub width: u32,
    pub height: Option<u32>,
    pub quality: Quality,
    pub compression: Compression,
}

/// Plan a thumbnail operation without executing it.
///
/// Useful for testing parameter generation.
pub fn plan_thumbnail(request: &ThumbnailRequest<'_>, source_dims: (u32, u32)) -> ThumbnailParams {
    let plan = compute_crop(source_dims, request.width, request.height);

    ThumbnailParams {
        source: request.source.to_path_buf(),
        format: request.format,
        output: request.output.to_path_buf(),
        crop: plan.crop,
        width: plan.output.0,
        height: plan.output.1,
        quality: request.quality,
        compression: request.compression,
    }
}

/// Create a thumbnail: identify the source, plan the cover crop, encode.
///
/// Returns the parameters that were executed.
pub fn create_thumbnail(
    backend: &impl ImageBackend,
    request: &ThumbnailRequest<'_>,
) -> Result<ThumbnailParams> {
    let dims = backend.identify(request.source)?;
    let params = plan_thumbnail(request, (dims.width, dims.height));
    backend.thumbnail(&params)?;
    Ok(params)
}

/// Convert a freshly written raster to WebP next to it (`{stem}.webp`).
///
/// On success the input is removed when `delete_original` is set. On failure
/// the error is returned alongside the original path, which remains a
/// servable artifact.
pub fn transcode_to_webp(
    backend: &impl ImageBackend,
    raster: &Path,
    quality: Quality,
    delete_original: bool,
) -> Transcoded {
    let webp_path = raster.with_extension("webp");

    if let Err(source) = backend.to_webp(raster, &webp_path, quality) {
        tracing::warn!(path = %raster.display(), error = %source, "WebP conversion failed; keeping original");
        return Transcoded {
            path: raster.to_path_buf(),
            error: Some(TranscodeError {
                path: raster.to_path_buf(),
                source,
            }),
        };
    }

    if delete_original && let Err(e) = std::fs::remove_file(raster) {
        // The WebP is already in place; a leftover intermediate only costs disk
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %raster.display(), error = %e, "Failed to remove WebP intermediate");
        }
    }

    Transcoded {
        path: webp_path,
        error: None,
    }
}
