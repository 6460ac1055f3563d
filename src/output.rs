//! CLI output formatting.
//!
//! # Output Format
//!
//! ## make
//!
//! ```text
//! photo.jpg → cache/photo-200x200-3f2a9c1e-0b1d4e7a.jpg (generated)
//! beach.png → cache/beach-200-77c0e2d1-a41f09bc.webp (cached)
//! night.jpg → cache/night-200-9e1c3b22-c0ffee11.jpg (generated)
//!     WebP: WebP conversion of cache/night-200-9e1c3b22-c0ffee11.jpg failed: ...
//!
//! Cache: 1 cached, 2 generated (3 total)
//! ```
//!
//! ## flush
//!
//! ```text
//! Flushed photo.jpg: 3 removed
//! Flushed cache: 12 removed, 1 failed
//! ```
//!
//! ## list
//!
//! ```text
//! beach-200-77c0e2d1-a41f09bc.webp  4.1 KB
//! photo-200x200-3f2a9c1e-0b1d4e7a.jpg  9.8 KB
//! notes.txt  12 B  (foreign)
//!
//! 3 entries, 13.9 KB
//! ```
//!
//! Each `format_*` function returns `Vec<String>` for testability; the
//! `print_*` wrappers write to stdout.

use crate::cache::{CacheError, CachedEntry, FlushReport, Thumbnail};
use std::path::Path;

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count (1024-based, one decimal above bytes).
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

fn display_name(source: &Path) -> String {
    source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| source.display().to_string())
}

// ============================================================================
// make
// ============================================================================

/// Format the result of one `make` request.
pub fn format_make_output(source: &Path, thumb: &Thumbnail) -> Vec<String> {
    let mut lines = vec![format!(
        "{} → {} ({})",
        display_name(source),
        thumb.path.display(),
        thumb.status
    )];
    if let Some(ref error) = thumb.transcode_error {
        lines.push(format!("{}WebP: {}", indent(1), error));
    }
    lines
}

/// Format a failed `make` request.
pub fn format_make_error(source: &Path, error: &CacheError) -> String {
    format!("{}: {}", display_name(source), error)
}

pub fn print_make_output(source: &Path, thumb: &Thumbnail) {
    for line in format_make_output(source, thumb) {
        println!("{}", line);
    }
}

// ============================================================================
// flush
// ============================================================================

pub fn format_flush_output(source: Option<&Path>, report: &FlushReport) -> Vec<String> {
    let target = source.map_or_else(|| "cache".to_string(), display_name);
    vec![format!("Flushed {}: {}", target, report)]
}

pub fn print_flush_output(source: Option<&Path>, report: &FlushReport) {
    for line in format_flush_output(source, report) {
        println!("{}", line);
    }
}

// ============================================================================
// list
// ============================================================================

/// Format a cache directory listing with a size footer.
///
/// Files whose names are not cache keys are flagged `(foreign)`.
pub fn format_entries(entries: &[CachedEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec!["Cache is empty".to_string()];
    }

    let mut lines: Vec<String> = entries
        .iter()
        .map(|e| match e.identity {
            Some(_) => format!("{}  {}", e.name, format_size(e.size)),
            None => format!("{}  {}  (foreign)", e.name, format_size(e.size)),
        })
        .collect();

    let total: u64 = entries.iter().map(|e| e.size).sum();
    let noun = if entries.len() == 1 { "entry" } else { "entries" };
    lines.push(String::new());
    lines.push(format!("{} {}, {}", entries.len(), noun, format_size(total)));
    lines
}

pub fn print_entries(entries: &[CachedEntry]) {
    for line in format_entries(entries) {
        println!("{}", line);
    }
}
