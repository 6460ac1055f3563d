//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which plans the crop and output path) and the [`backend`](super::backend)
//! (which does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (0–100, default 75). Clamped on construction.
//! - [`Compression`]: PNG compression level (0–9, default 5). Clamped on construction.
//! - [`ThumbnailParams`]: Full specification for a thumbnail: source, crop region, output size and path, encoding settings.

use super::calculations::CropRect;
use super::format::SourceFormat;
use std::path::PathBuf;

/// Quality setting for lossy image encoding (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.min(100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(75)
    }
}

/// PNG compression level, 0 (fastest) to 9 (smallest).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compression(pub u8);

impl Compression {
    pub fn new(value: u32) -> Self {
        Self(value.min(9) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Map the 0-9 level onto the encoder's presets.
    pub fn png_preset(self) -> image::codecs::png::CompressionType {
        use image::codecs::png::CompressionType;
        match self.0 {
            0..=3 => CompressionType::Fast,
            4..=6 => CompressionType::Default,
            _ => CompressionType::Best,
        }
    }
}

impl Default for Compression {
    fn default() -> Self {
        Self(5)
    }
}

/// Parameters for a thumbnail operation (crop + resample + encode).
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    /// Sniffed format of the source; decides the decoder and the output encoder.
    pub format: SourceFormat,
    pub output: PathBuf,
    pub crop: CropRect,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
    pub compression: Compression,
}
