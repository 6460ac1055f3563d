//! End-to-end cache behavior with the real `image`/`webp` backend.

use crop_cache::cache::{CacheError, CacheStatus, ThumbnailCache};
use crop_cache::config::CacheConfig;
use crop_cache::imaging::SourceFormat;
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_jpeg(path: &Path, width: u32, height: u32) {
    RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]))
        .save_with_format(path, ImageFormat::Jpeg)
        .unwrap();
}

fn write_alpha_png(path: &Path, width: u32, height: u32) {
    RgbaImage::from_fn(width, height, |x, _| {
        Rgba([200, 40, 40, if x < width / 2 { 0 } else { 255 }])
    })
    .save_with_format(path, ImageFormat::Png)
    .unwrap();
}

fn write_webp(path: &Path, width: u32, height: u32) {
    let img = image::DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, 120, (y % 256) as u8])
    }));
    let encoded = webp::Encoder::from_image(&img).unwrap().encode(80.0);
    fs::write(path, &*encoded).unwrap();
}

fn open_cache(tmp: &TempDir, webp: bool) -> ThumbnailCache {
    ThumbnailCache::new(CacheConfig {
        cache_dir: tmp.path().join("thumbs"),
        webp,
        ..CacheConfig::default()
    })
    .unwrap()
}

fn file_count(dir: &Path) -> usize {
    fs::read_dir(dir).unwrap().count()
}

#[test]
fn cover_crop_has_exact_dimensions_and_is_reused() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("Wide Shot.jpg");
    write_jpeg(&source, 1000, 500);
    let cache = open_cache(&tmp, false);

    let thumb = cache.make(&source, 200, Some(200)).unwrap();
    assert_eq!(thumb.status, CacheStatus::Generated);
    assert_eq!(thumb.source_format, SourceFormat::Jpeg);
    assert_eq!(image::image_dimensions(&thumb.path).unwrap(), (200, 200));
    assert_eq!(
        image::ImageReader::open(&thumb.path)
            .unwrap()
            .with_guessed_format()
            .unwrap()
            .format(),
        Some(ImageFormat::Jpeg)
    );

    let bytes = fs::read(&thumb.path).unwrap();
    let again = cache.make(&source, 200, Some(200)).unwrap();
    assert_eq!(again.status, CacheStatus::Hit);
    assert_eq!(again.path, thumb.path);
    assert_eq!(fs::read(&again.path).unwrap(), bytes);
    assert_eq!(file_count(cache.dir()), 1);
}

#[test]
fn width_only_keeps_aspect_ratio() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("tall.jpg");
    write_jpeg(&source, 300, 600);
    let cache = open_cache(&tmp, false);

    let thumb = cache.make(&source, 150, None).unwrap();
    assert_eq!(image::image_dimensions(&thumb.path).unwrap(), (150, 300));
}

#[test]
fn png_keeps_transparency() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("logo.png");
    write_alpha_png(&source, 64, 32);
    let cache = open_cache(&tmp, false);

    let thumb = cache.make(&source, 32, Some(16)).unwrap();
    assert_eq!(thumb.path.extension().unwrap(), "png");

    let img = image::open(&thumb.path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (32, 16));
    assert_eq!(img.get_pixel(0, 8)[3], 0);
    assert_eq!(img.get_pixel(31, 8)[3], 255);
}

#[test]
fn webp_mode_leaves_only_webp() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("photo.jpg");
    write_jpeg(&source, 400, 300);
    let cache = open_cache(&tmp, true);

    let thumb = cache.make(&source, 100, Some(100)).unwrap();
    assert!(thumb.transcode_error.is_none());
    assert_eq!(thumb.path.extension().unwrap(), "webp");
    assert_eq!(image::image_dimensions(&thumb.path).unwrap(), (100, 100));
    assert_eq!(file_count(cache.dir()), 1);

    assert_eq!(cache.make(&source, 100, Some(100)).unwrap().status, CacheStatus::Hit);
}

#[test]
fn rejected_sources_write_nothing() {
    let tmp = TempDir::new().unwrap();
    let fake = tmp.path().join("notes.jpg");
    fs::write(&fake, "just text").unwrap();
    let cache = open_cache(&tmp, false);

    assert!(matches!(
        cache.make(&fake, 100, None),
        Err(CacheError::UnsupportedMime { .. })
    ));
    assert!(matches!(
        cache.make(&tmp.path().join("missing.png"), 100, None),
        Err(CacheError::SourceNotFound(_))
    ));
    assert_eq!(file_count(cache.dir()), 0);
}

#[test]
fn edit_then_flush_by_source() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("photo.jpg");
    let other = tmp.path().join("other.jpg");
    write_jpeg(&source, 200, 100);
    write_jpeg(&other, 200, 100);
    let cache = open_cache(&tmp, false);

    let before = cache.make(&source, 50, None).unwrap();
    cache.make(&other, 50, None).unwrap();

    // A different size changes the revision, so the edited source misses
    write_jpeg(&source, 240, 120);
    let after = cache.make(&source, 50, None).unwrap();
    assert_eq!(after.status, CacheStatus::Generated);
    assert_ne!(after.path, before.path);
    assert_eq!(file_count(cache.dir()), 3);

    let report = cache.flush(Some(&source)).unwrap();
    assert_eq!(report.removed, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(file_count(cache.dir()), 1);

    let report = cache.flush(None).unwrap();
    assert_eq!(report.removed, 1);
    assert_eq!(file_count(cache.dir()), 0);
}

#[test]
fn format_follows_content_not_extension() {
    let tmp = TempDir::new().unwrap();
    let renamed = tmp.path().join("photo.png");
    let bare = tmp.path().join("photo");
    write_jpeg(&renamed, 400, 200);
    fs::copy(&renamed, &bare).unwrap();
    let cache = open_cache(&tmp, false);

    for source in [&renamed, &bare] {
        let thumb = cache.make(source, 200, Some(200)).unwrap();
        assert_eq!(thumb.source_format, SourceFormat::Jpeg);
        assert_eq!(thumb.path.extension().unwrap(), "jpg");
        assert_eq!(image::image_dimensions(&thumb.path).unwrap(), (200, 200));
    }
}

#[test]
fn webp_source_has_exact_dimensions() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("clip.webp");
    write_webp(&source, 300, 200);
    let cache = open_cache(&tmp, true);

    let thumb = cache.make(&source, 120, Some(90)).unwrap();
    assert_eq!(thumb.source_format, SourceFormat::WebP);
    assert!(thumb.transcode_error.is_none());
    assert_eq!(thumb.path.extension().unwrap(), "webp");
    assert_eq!(image::image_dimensions(&thumb.path).unwrap(), (120, 90));
    assert_eq!(file_count(cache.dir()), 1);
}

#[test]
fn regenerating_after_flush_is_pixel_identical() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("photo.jpg");
    write_jpeg(&source, 500, 300);
    let cache = open_cache(&tmp, false);

    let first = cache.make(&source, 100, Some(100)).unwrap();
    let before = image::open(&first.path).unwrap().to_rgba8();

    assert_eq!(cache.flush(Some(&source)).unwrap().removed, 1);
    assert!(!first.path.exists());

    let second = cache.make(&source, 100, Some(100)).unwrap();
    assert_eq!(second.status, CacheStatus::Generated);
    assert_eq!(second.path, first.path);
    assert_eq!(image::open(&second.path).unwrap().to_rgba8(), before);
}
