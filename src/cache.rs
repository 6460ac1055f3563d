//! The thumbnail cache.
//!
//! [`ThumbnailCache`] owns a flat directory of generated thumbnails. Each
//! [`make`](ThumbnailCache::make) call runs
//!
//! ```text
//! Validate → KeyBuild → CacheLookup → (Hit | Generate) → Return
//! ```
//!
//! - **Validate**: the source must be an existing regular file whose content
//!   sniffs as JPEG, PNG or WebP, and the requested dimensions must be
//!   non-zero. Nothing is written when validation fails.
//! - **KeyBuild**: [`CacheKey::build`] from the source name, the requested
//!   dimensions and the source revision (size + mtime).
//! - **CacheLookup**: `{key}.webp` when WebP mode is on, then
//!   `{key}.{jpg,png,webp}` for the source format. A hit does no image work.
//! - **Generate**: cover crop, resample, encode, then the optional WebP
//!   post-pass. A failed post-pass keeps the JPEG/PNG and reports the failure
//!   in [`Thumbnail::transcode_error`].
//!
//! ## Invalidation
//!
//! Because keys embed the source revision, editing a source makes the next
//! request miss; the stale variants remain until flushed.
//! [`flush`](ThumbnailCache::flush) removes every variant of one source
//! (matched on the identity segment of the entry name) or wipes the whole
//! directory.
//!
//! ## Concurrency
//!
//! None. The cache assumes a single writer: concurrent callers on the same
//! directory may regenerate the same entry twice or flush a file another
//! caller just wrote.

use crate::config::CacheConfig;
use crate::imaging::{
    BackendError, ImageBackend, RustBackend, Sniffed, SourceFormat, ThumbnailRequest,
    TranscodeError, create_thumbnail, sniff, transcode_to_webp,
};
use crate::naming::{self, CacheKey};
use serde::{Serialize, Serializer};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Could not create cache directory {}: {source}", path.display())]
    CacheDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Image file does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("Not a regular file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("Invalid image type: {mime} ({})", path.display())]
    UnsupportedMime { path: PathBuf, mime: String },
    #[error("Invalid dimensions: width {width}, height {height:?} (both must be positive)")]
    InvalidDimensions { width: u32, height: Option<u32> },
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl CacheError {
    /// Whether the request itself was rejected, before any image work.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CacheError::SourceNotFound(_)
                | CacheError::NotAFile(_)
                | CacheError::UnsupportedMime { .. }
                | CacheError::InvalidDimensions { .. }
        )
    }
}

/// How a [`Thumbnail`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    Hit,
    Generated,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheStatus::Hit => write!(f, "cached"),
            CacheStatus::Generated => write!(f, "generated"),
        }
    }
}

/// A cached thumbnail ready to serve.
#[derive(Debug, Serialize)]
pub struct Thumbnail {
    pub path: PathBuf,
    pub status: CacheStatus,
    /// Detected format of the source image.
    pub source_format: SourceFormat,
    /// Set when WebP mode is on and the post-pass failed; `path` is then the
    /// JPEG/PNG artifact.
    #[serde(serialize_with = "serialize_error")]
    pub transcode_error: Option<TranscodeError>,
}

fn serialize_error<S: Serializer>(
    error: &Option<TranscodeError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    error.as_ref().map(|e| e.to_string()).serialize(serializer)
}

/// Outcome of a flush.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    pub removed: u32,
    /// Entries that matched but could not be deleted.
    pub failed: u32,
}

impl fmt::Display for FlushReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failed > 0 {
            write!(f, "{} removed, {} failed", self.removed, self.failed)
        } else {
            write!(f, "{} removed", self.removed)
        }
    }
}

/// A file in the cache directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry {
    pub name: String,
    pub size: u64,
    /// Identity segment when the name is a cache key.
    pub identity: Option<String>,
}

/// Summary of cache performance over several requests.
#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: u32,
    pub generated: u32,
    pub failed: u32,
}

impl CacheStats {
    pub fn record(&mut self, status: CacheStatus) {
        match status {
            CacheStatus::Hit => self.hits += 1,
            CacheStatus::Generated => self.generated += 1,
        }
    }

    pub fn fail(&mut self) {
        self.failed += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.generated + self.failed
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} cached, {} generated", self.hits, self.generated)?;
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        write!(f, " ({} total)", self.total())
    }
}

/// Create the cache directory (and parents) with mode 0755.
fn create_cache_dir(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(path)
}

/// Disk cache of cover-cropped thumbnails.
pub struct ThumbnailCache<B = RustBackend> {
    config: CacheConfig,
    backend: B,
}

impl ThumbnailCache<RustBackend> {
    /// Open (creating if needed) the cache directory named by `config`.
    pub fn new(config: CacheConfig) -> Result<Self, CacheError> {
        Self::with_backend(config, RustBackend::new())
    }
}

impl<B: ImageBackend> ThumbnailCache<B> {
    /// Open the cache with a specific backend (allows testing with mock).
    pub fn with_backend(config: CacheConfig, backend: B) -> Result<Self, CacheError> {
        create_cache_dir(&config.cache_dir).map_err(|source| CacheError::CacheDir {
            path: config.cache_dir.clone(),
            source,
        })?;
        Ok(Self { config, backend })
    }

    pub fn dir(&self) -> &Path {
        &self.config.cache_dir
    }

    /// Return a thumbnail of `source` at `width` × `height`.
    ///
    /// Without `height` the thumbnail keeps the source aspect ratio;
    /// with it the source is center-cropped to fill the box exactly.
    pub fn make(
        &self,
        source: &Path,
        width: u32,
        height: Option<u32>,
    ) -> Result<Thumbnail, CacheError> {
        let metadata = match fs::metadata(source) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CacheError::SourceNotFound(source.to_path_buf()));
            }
            Err(e) => return Err(CacheError::Io(e)),
        };
        if !metadata.is_file() {
            return Err(CacheError::NotAFile(source.to_path_buf()));
        }
        if width == 0 || height == Some(0) {
            return Err(CacheError::InvalidDimensions { width, height });
        }
        let format = match sniff(source)? {
            Sniffed::Supported(format) => format,
            Sniffed::Unsupported(mime) => {
                return Err(CacheError::UnsupportedMime {
                    path: source.to_path_buf(),
                    mime: mime.to_string(),
                });
            }
        };

        let key = CacheKey::build(source, width, height, &naming::revision(&metadata));

        if let Some(path) = self.lookup(&key, format) {
            tracing::debug!(source = %source.display(), path = %path.display(), "Cache hit");
            return Ok(Thumbnail {
                path,
                status: CacheStatus::Hit,
                source_format: format,
                transcode_error: None,
            });
        }

        tracing::debug!(
            source = %source.display(),
            mime = format.mime(),
            key = %key,
            "Cache miss"
        );
        let output = self.dir().join(key.file_name(format.extension()));
        let params = create_thumbnail(
            &self.backend,
            &ThumbnailRequest {
                source,
                format,
                output: &output,
                width,
                height,
                quality: self.config.quality(),
                compression: self.config.compression(),
            },
        )?;
        tracing::info!(
            source = %source.display(),
            path = %output.display(),
            width = params.width,
            height = params.height,
            "Generated thumbnail"
        );

        let (path, transcode_error) = if self.config.webp && format != SourceFormat::WebP {
            let transcoded = transcode_to_webp(&self.backend, &output, self.config.quality(), true);
            (transcoded.path, transcoded.error)
        } else {
            (output, None)
        };

        Ok(Thumbnail {
            path,
            status: CacheStatus::Generated,
            source_format: format,
            transcode_error,
        })
    }

    /// Existing artifact for `key`, if any.
    fn lookup(&self, key: &CacheKey, format: SourceFormat) -> Option<PathBuf> {
        let webp = self
            .config
            .webp
            .then(|| self.dir().join(key.file_name("webp")));
        let native = self.dir().join(key.file_name(format.extension()));
        webp.into_iter().chain([native]).find(|p| p.is_file())
    }

    /// Remove cached entries.
    ///
    /// With `source`, only the variants of that source are removed (the
    /// source itself need not exist any more). Without, every file in the
    /// cache directory goes. Deletion is best-effort per file: entries that
    /// vanished meanwhile are ignored, other failures are counted.
    pub fn flush(&self, source: Option<&Path>) -> Result<FlushReport, CacheError> {
        let target = source.map(naming::identity_hash);
        let mut report = FlushReport::default();

        for entry in fs::read_dir(self.dir())? {
            let Ok(entry) = entry else {
                report.failed += 1;
                continue;
            };
            if !entry.file_type().is_ok_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.path();

            if let Some(target) = &target {
                let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
                if CacheKey::identity_segment(stem) != Some(target.as_str()) {
                    continue;
                }
            }

            match fs::remove_file(&path) {
                Ok(()) => report.removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove cache entry");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            source = source.map(|s| s.display().to_string()),
            removed = report.removed,
            failed = report.failed,
            "Flushed cache"
        );
        Ok(report)
    }

    /// Files in the cache directory, sorted by name.
    pub fn entries(&self) -> Result<Vec<CachedEntry>, CacheError> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(self.dir())? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let stem = Path::new(&name)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("");
            let identity = CacheKey::identity_segment(stem).map(str::to_string);
            entries.push(CachedEntry {
                name,
                size: metadata.len(),
                identity,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
