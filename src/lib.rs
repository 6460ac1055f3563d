//! # Crop Cache
//!
//! On-disk thumbnail cache. Given a source image and a target size it returns
//! the path of a center-cropped, resampled thumbnail, generating it on first
//! request and reusing it afterwards.
//!
//! # Request Flow
//!
//! ```text
//! source + width [+ height]
//!   → validate (exists, regular file, JPEG/PNG/WebP by content)
//!   → key      {slug}-{dims}-{identity}-{revision}
//!   → lookup   cache_dir/{key}.{webp|jpg|png}
//!   → generate cover crop → Lanczos3 resample → encode [→ WebP]
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`cache`] | [`ThumbnailCache`](cache::ThumbnailCache): `make`, `flush`, `entries` |
//! | [`naming`] | Cache key construction and identity-segment parsing |
//! | [`imaging`] | Crop geometry, format sniffing, the `image`/`webp` backend |
//! | [`config`] | `crop-cache.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## The Directory Is the Index
//!
//! There is no manifest or database. A key encodes everything needed to
//! decide a hit (source name, requested size, source revision), so lookup is
//! a stat of one or two paths and flushing a source is a directory scan
//! matching the identity segment.
//!
//! ## Revision in the Key
//!
//! Keys embed a short hash of the source's size and modification time rather
//! than a wall-clock timestamp. Repeated requests for an unchanged source hit;
//! an edited source misses and is regenerated without an explicit flush.
//!
//! ## Atomic Writes
//!
//! Encoders write to a temp file in the cache directory that is renamed into
//! place, so a crash or encode failure never leaves a truncated entry that a
//! later lookup would serve.

pub mod cache;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;

#[cfg(test)]
pub(crate) mod test_helpers;
