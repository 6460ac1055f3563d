//! Image processing.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Sniff** | `image::guess_format` on the file head |
//! | **Identify** | `image::ImageReader` header read, format guessed from content |
//! | **Crop + resample** | `crop_imm` + `resize_exact` (Lanczos3) |
//! | **Encode** | JPEG / PNG via `image`, lossy WebP via `webp` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop geometry (unit testable)
//! - **Format**: Magic-byte detection of accepted source formats
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod format;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{CropPlan, CropRect, compute_crop, proportional_height};
pub use format::{SourceFormat, Sniffed, sniff};
pub use operations::{
    ThumbnailRequest, TranscodeError, Transcoded, create_thumbnail, plan_thumbnail,
    transcode_to_webp,
};
pub use params::{Compression, Quality, ThumbnailParams};
pub use rust_backend::RustBackend;
