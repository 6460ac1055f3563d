//! Cache-file naming.
//!
//! Every cache entry is named `{slug}-{dims}-{identity}-{revision}.{ext}`:
//!
//! - `slug`: the source file stem, lowercased, HTML-escaped, with accented
//!   Latin letters folded to ASCII and everything else that is not a letter
//!   or digit turned into single hyphens (`Café Crème!.jpg` → `cafe-creme`).
//! - `dims`: `{width}` or `{width}x{height}`.
//! - `identity`: CRC32 of the source base name, extension included, as 8 hex
//!   digits. All variants of one source share it, which is what flushing by
//!   source matches on.
//! - `revision`: 8 hex digits derived from the source's size and
//!   modification time. Editing the source yields a new key; repeating a
//!   request for an unchanged source yields the same key.
//!
//! The directory listing *is* the index: no sidecar files are written.

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::Metadata;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Width in hex digits of the identity and revision segments.
const SEGMENT_LEN: usize = 8;

/// Base name (without extension) of a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build the key for a request.
    ///
    /// `revision` is normally [`revision`] of the source metadata.
    pub fn build(source: &Path, width: u32, height: Option<u32>, revision: &str) -> Self {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();

        let dims = match (width, height) {
            (0, Some(h)) => format!("x{h}"),
            (0, None) => String::new(),
            (w, Some(h)) => format!("{w}x{h}"),
            (w, None) => w.to_string(),
        };

        let segments = [slugify(&stem), dims, identity_hash(source), revision.to_string()];
        let key = segments
            .iter()
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("-");
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of this key with the given extension.
    pub fn file_name(&self, ext: &str) -> String {
        format!("{}.{}", self.0, ext)
    }

    /// Extract the identity segment from an entry's file stem.
    ///
    /// The segment is located by position (second from the end), so a slug
    /// that happens to contain the same hex digits never matches. Returns
    /// `None` for names that do not look like cache keys.
    pub fn identity_segment(stem: &str) -> Option<&str> {
        let mut parts = stem.rsplit('-');
        let revision = parts.next()?;
        let identity = parts.next()?;
        (is_hex_segment(revision) && is_hex_segment(identity)).then_some(identity)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_hex_segment(s: &str) -> bool {
    s.len() == SEGMENT_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Identity fingerprint of a source: CRC32 of its base name, extension included.
pub fn identity_hash(source: &Path) -> String {
    let name = source
        .file_name()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    format!("{:08x}", crc32fast::hash(name.as_bytes()))
}

/// Revision fingerprint of a source from its size and modification time.
///
/// Platforms without modification times hash the size alone.
pub fn revision(metadata: &Metadata) -> String {
    let modified = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_nanos())
        .unwrap_or(0);

    let mut hasher = Sha256::new();
    hasher.update(b"revision\0");
    hasher.update(metadata.len().to_le_bytes());
    hasher.update(modified.to_le_bytes());
    let digest = hasher.finalize();
    digest[..SEGMENT_LEN / 2]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Turn a file stem into a filesystem- and URL-safe slug.
///
/// Empty when nothing usable survives (e.g. `"!!!"`).
pub fn slugify(stem: &str) -> String {
    let escaped = html_escape(&stem.to_lowercase());
    let folded: String = escaped
        .chars()
        .map(|c| fold_to_ascii(c).unwrap_or(' '))
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join("-")
}

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// ASCII letter or digit for `c`, folding accented Latin letters to their
/// base letter. `None` for everything else.
fn fold_to_ascii(c: char) -> Option<char> {
    if c.is_ascii_alphanumeric() {
        return Some(c);
    }
    let base = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'æ' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ð' => 'd',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'þ' => 'b',
        'ß' => 's',
        _ => return None,
    };
    Some(base)
}
