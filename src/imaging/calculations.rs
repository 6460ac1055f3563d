//! Pure calculation functions for crop geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// Integer sub-region of a source raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// The whole source, no cropping.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

/// What to sample from the source and how big the output canvas is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropPlan {
    pub crop: CropRect,
    /// Final canvas dimensions `(width, height)`.
    pub output: (u32, u32),
}

/// Height of a proportional resize to `width`, preserving the source aspect ratio.
///
/// Never returns less than 1 so extreme panoramas still produce a canvas.
pub fn proportional_height(source: (u32, u32), width: u32) -> u32 {
    let (src_w, src_h) = source;
    let height = (width as f64 * src_h as f64 / src_w as f64).round() as u32;
    height.max(1)
}

/// Compute the source region to sample so the output covers the target box.
///
/// Without a target height the output height follows the source aspect ratio
/// and the full source is used. With one, the larger axis of the source is
/// center-cropped so the remaining region has the target's aspect ratio: the
/// result fills the box with no letterboxing and no distortion.
///
/// # Arguments
/// * `source` - Source dimensions `(width, height)`, both non-zero
/// * `width` - Target width, non-zero
/// * `height` - Optional target height, non-zero when present
///
/// # Examples
/// ```
/// # use crop_cache::imaging::{compute_crop, CropRect};
/// // 2:1 landscape into a square: keep the middle 500x500
/// let plan = compute_crop((1000, 500), 200, Some(200));
/// assert_eq!(plan.crop, CropRect { x: 250, y: 0, width: 500, height: 500 });
/// assert_eq!(plan.output, (200, 200));
/// ```
pub fn compute_crop(source: (u32, u32), width: u32, height: Option<u32>) -> CropPlan {
    let (src_w, src_h) = source;

    let Some(height) = height else {
        return CropPlan {
            crop: CropRect::full(src_w, src_h),
            output: (width, proportional_height(source, width)),
        };
    };

    let ratio_x = src_w as f64 / width as f64;
    let ratio_y = src_h as f64 / height as f64;

    let crop = if ratio_x > ratio_y {
        // Source is proportionally wider: trim the sides
        let crop_w = clamp_extent((src_w as f64 / ratio_x * ratio_y).round(), src_w);
        CropRect {
            x: ((src_w - crop_w) as f64 / 2.0).round() as u32,
            y: 0,
            width: crop_w,
            height: src_h,
        }
    } else if ratio_y > ratio_x {
        // Source is proportionally taller: trim top and bottom
        let crop_h = clamp_extent((src_h as f64 / ratio_y * ratio_x).round(), src_h);
        CropRect {
            x: 0,
            y: ((src_h - crop_h) as f64 / 2.0).round() as u32,
            width: src_w,
            height: crop_h,
        }
    } else {
        CropRect::full(src_w, src_h)
    };

    CropPlan {
        crop,
        output: (width, height),
    }
}

/// Keep a rounded extent within `1..=bound`.
fn clamp_extent(value: f64, bound: u32) -> u32 {
    (value as u32).clamp(1, bound)
}
