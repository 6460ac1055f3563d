//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader` with guessed format (header only) |
//! | Decode (JPEG, PNG, WebP) | `image::ImageReader`, format forced from the sniffed MIME |
//! | Crop | `image::DynamicImage::crop_imm` |
//! | Resample | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (compression preset, alpha kept) |
//! | Encode → WebP | `webp::Encoder` (lossy, quality) |
//!
//! Every encode goes to a temp file next to the destination and is renamed
//! into place on success.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::format::SourceFormat;
use super::params::{Compression, Quality, ThumbnailParams};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
///
/// With `format` the decoder is fixed; without it the format is guessed
/// from the content.
fn load_image(path: &Path, format: Option<ImageFormat>) -> Result<DynamicImage, BackendError> {
    let mut reader = ImageReader::open(path)?;
    match format {
        Some(format) => reader.set_format(format),
        None => reader = reader.with_guessed_format()?,
    }
    reader.decode().map_err(|e| BackendError::Decode {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Encode lossy WebP. `webp` only takes 8-bit RGB or RGBA buffers.
fn encode_webp(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, String> {
    let img = if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };
    let encoder = webp::Encoder::from_image(&img).map_err(|e| e.to_string())?;
    let encoded = encoder
        .encode_simple(false, quality.value() as f32)
        .map_err(|e| format!("{e:?}"))?;
    Ok(encoded.to_vec())
}

/// Encode `img` as `format` and move it to `path` once fully written.
fn save_image(
    img: &DynamicImage,
    format: SourceFormat,
    path: &Path,
    quality: Quality,
    compression: Compression,
) -> Result<(), BackendError> {
    let encode_err = |reason: String| BackendError::Encode {
        path: path.display().to_string(),
        reason,
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut staged = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        match format {
            SourceFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
                let encoder = JpegEncoder::new_with_quality(&mut writer, quality.value().max(1));
                rgb.write_with_encoder(encoder)
                    .map_err(|e| encode_err(e.to_string()))?;
            }
            SourceFormat::Png => {
                let encoder = PngEncoder::new_with_quality(
                    &mut writer,
                    compression.png_preset(),
                    PngFilter::Adaptive,
                );
                img.write_with_encoder(encoder)
                    .map_err(|e| encode_err(e.to_string()))?;
            }
            SourceFormat::WebP => {
                let bytes = encode_webp(img, quality).map_err(encode_err)?;
                writer.write_all(&bytes)?;
            }
        }
        writer.flush()?;
    }
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        // Header only; the format comes from the content, not the extension
        let (width, height) = ImageReader::open(path)?
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| BackendError::Decode {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(Dimensions { width, height })
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
        let img = load_image(&params.source, Some(params.format.image_format()))?;
        let crop = params.crop;
        let resized = img
            .crop_imm(crop.x, crop.y, crop.width, crop.height)
            .resize_exact(params.width, params.height, FilterType::Lanczos3);
        drop(img);

        save_image(
            &resized,
            params.format,
            &params.output,
            params.quality,
            params.compression,
        )
    }

    fn to_webp(&self, source: &Path, output: &Path, quality: Quality) -> Result<(), BackendError> {
        let img = load_image(source, None)?;
        save_image(
            &img,
            SourceFormat::WebP,
            output,
            quality,
            Compression::default(),
        )
    }
}
