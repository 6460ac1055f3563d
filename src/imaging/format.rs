//! Source format detection by magic bytes.
//!
//! File extensions lie (a `.txt` renamed `.jpg` is still text), so the format
//! is sniffed from the first bytes of the file with [`image::guess_format`].
//! Only JPEG, PNG and WebP are accepted as thumbnail sources.

use image::ImageFormat;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Bytes read from the head of a file; enough for every signature `image` knows.
const SNIFF_LEN: u64 = 64;

/// MIME reported for content no decoder recognises.
const UNKNOWN_MIME: &str = "application/octet-stream";

/// Accepted source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Jpeg,
    Png,
    WebP,
}

impl SourceFormat {
    pub fn mime(self) -> &'static str {
        match self {
            SourceFormat::Jpeg => "image/jpeg",
            SourceFormat::Png => "image/png",
            SourceFormat::WebP => "image/webp",
        }
    }

    /// Canonical extension of cache entries generated from this format.
    pub fn extension(self) -> &'static str {
        match self {
            SourceFormat::Jpeg => "jpg",
            SourceFormat::Png => "png",
            SourceFormat::WebP => "webp",
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            SourceFormat::Jpeg => ImageFormat::Jpeg,
            SourceFormat::Png => ImageFormat::Png,
            SourceFormat::WebP => ImageFormat::WebP,
        }
    }

    fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(SourceFormat::Jpeg),
            ImageFormat::Png => Some(SourceFormat::Png),
            ImageFormat::WebP => Some(SourceFormat::WebP),
            _ => None,
        }
    }
}

/// Outcome of sniffing a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sniffed {
    Supported(SourceFormat),
    /// Recognised or not, the content is not an accepted source. Carries its MIME.
    Unsupported(&'static str),
}

/// Detect the format of `path` from its leading bytes.
pub fn sniff(path: &Path) -> io::Result<Sniffed> {
    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    File::open(path)?.take(SNIFF_LEN).read_to_end(&mut head)?;
    Ok(sniff_bytes(&head))
}

/// Detect the format of an in-memory file head.
pub fn sniff_bytes(head: &[u8]) -> Sniffed {
    match image::guess_format(head) {
        Ok(format) => match SourceFormat::from_image_format(format) {
            Some(source) => Sniffed::Supported(source),
            None => Sniffed::Unsupported(format.to_mime_type()),
        },
        Err(_) => Sniffed::Unsupported(UNKNOWN_MIME),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{create_test_jpeg, create_test_png};
    use tempfile::TempDir;

    #[test]
    fn sniffs_jpeg_regardless_of_extension() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("photo.png");
        create_test_jpeg(&path, 16, 16);
        assert_eq!(sniff(&path).unwrap(), Sniffed::Supported(SourceFormat::Jpeg));
    }

    #[test]
    fn sniffs_png() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("icon.png");
        create_test_png(&path, 16, 16);
        assert_eq!(sniff(&path).unwrap(), Sniffed::Supported(SourceFormat::Png));
    }

    #[test]
    fn sniffs_webp_signature() {
        let head = b"RIFF\x24\x00\x00\x00WEBPVP8 ";
        assert_eq!(sniff_bytes(head), Sniffed::Supported(SourceFormat::WebP));
    }

    #[test]
    fn text_is_unsupported() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notes.jpg");
        std::fs::write(&path, "just some text, not an image").unwrap();
        assert_eq!(sniff(&path).unwrap(), Sniffed::Unsupported(UNKNOWN_MIME));
    }

    #[test]
    fn known_but_rejected_format_reports_its_mime() {
        assert_eq!(sniff_bytes(b"GIF89a\x01\x00\x01\x00"), Sniffed::Unsupported("image/gif"));
    }

    #[test]
    fn empty_file_is_unsupported() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.png");
        std::fs::write(&path, b"").unwrap();
        assert_eq!(sniff(&path).unwrap(), Sniffed::Unsupported(UNKNOWN_MIME));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(sniff(Path::new("/nonexistent/image.jpg")).is_err());
    }

    #[test]
    fn extensions_and_mimes() {
        assert_eq!(SourceFormat::Jpeg.extension(), "jpg");
        assert_eq!(SourceFormat::Png.mime(), "image/png");
        assert_eq!(SourceFormat::WebP.image_format(), ImageFormat::WebP);
    }
}
