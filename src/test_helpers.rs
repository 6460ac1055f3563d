//! Shared test utilities for the crop-cache test suite.
//!
//! Synthetic source images in every accepted format, plus small assertions
//! over cache directories.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let source = tmp.path().join("photo.jpg");
//! create_test_jpeg(&source, 400, 300);
//!
//! // ... run the cache ...
//! assert_eq!(decode_dimensions(&thumb.path), (200, 150));
//! ```

use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;

// =========================================================================
// Synthetic sources
// =========================================================================

/// Diagonal gradient so crops and resamples produce non-uniform output.
fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    })
}

pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, ImageFormat::Jpeg)
        .unwrap();
}

/// Opaque RGB PNG.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

/// RGBA PNG whose left half is fully transparent.
pub fn create_test_png_with_alpha(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        let alpha = if x < width / 2 { 0 } else { 255 };
        Rgba([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            64,
            alpha,
        ])
    });
    img.save_with_format(path, ImageFormat::Png).unwrap();
}

/// Lossy WebP, encoded the same way the backend writes WebP.
pub fn create_test_webp(path: &Path, width: u32, height: u32) {
    let img = image::DynamicImage::ImageRgb8(gradient(width, height));
    let encoder = webp::Encoder::from_image(&img).unwrap();
    std::fs::write(path, &*encoder.encode(80.0)).unwrap();
}

// =========================================================================
// Assertions
// =========================================================================

/// Decoded dimensions of an image file. Panics if it is not an image.
pub fn decode_dimensions(path: &Path) -> (u32, u32) {
    image::image_dimensions(path)
        .unwrap_or_else(|e| panic!("{} is not a readable image: {e}", path.display()))
}

/// Sorted file names in a cache directory.
pub fn cache_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
