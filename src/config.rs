//! Cache configuration module.
//!
//! Handles loading, validating, and merging `crop-cache.toml`. Stock defaults
//! are overridden by the config file, which is in turn overridden by command
//! line flags.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! cache_dir = "cache"       # Where thumbnails are written (created if absent)
//! quality = 75              # JPEG/WebP encoding quality (0-100)
//! png_compression = 5       # PNG compression level (0-9)
//! webp = false              # Convert every thumbnail to WebP
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Compression, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "crop-cache.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config file not found: {0}")]
    Missing(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Cache configuration, fixed for the lifetime of a [`ThumbnailCache`](crate::cache::ThumbnailCache).
///
/// All fields have defaults. Config files need only specify the values they
/// want to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Directory holding cached thumbnails. Created recursively if absent.
    pub cache_dir: PathBuf,
    /// JPEG and WebP encoding quality (0 = worst, 100 = best).
    pub quality: u32,
    /// PNG compression level (0 = fastest, 9 = smallest).
    pub png_compression: u32,
    /// Convert every generated thumbnail to WebP.
    pub webp: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("cache"),
            quality: 75,
            png_compression: 5,
            webp: false,
        }
    }
}

impl CacheConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quality > 100 {
            return Err(ConfigError::Validation("quality must be 0-100".into()));
        }
        if self.png_compression > 9 {
            return Err(ConfigError::Validation(
                "png_compression must be 0-9".into(),
            ));
        }
        if self.cache_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "cache_dir must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }

    pub fn compression(&self) -> Compression {
        Compression::new(self.png_compression)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(CacheConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<CacheConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CacheConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a TOML file, falling back to defaults when it is absent.
///
/// Merges file values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: &Path) -> Result<CacheConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Like [`load_config`] but the file must exist.
pub fn load_config_strict(path: &Path) -> Result<CacheConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Missing(path.to_path_buf()));
    }
    load_config(path)
}

/// Returns a fully-commented stock `crop-cache.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# crop-cache Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command line flags (--cache-dir, --quality, --png-compression, --webp)
# override the values in this file.
# Unknown keys will cause an error.

# Directory holding cached thumbnails. Created (mode 0755) if absent.
# Entries are named {slug}-{width}[x{height}]-{identity}-{revision}.{jpg,png,webp}
cache_dir = "cache"

# JPEG and WebP encoding quality (0 = worst, 100 = best).
quality = 75

# PNG compression level (0 = fastest, 9 = smallest files).
png_compression = 5

# Convert every generated thumbnail to WebP, removing the JPEG/PNG
# intermediate. If a conversion fails the JPEG/PNG is kept and served.
webp = false
"##
}
