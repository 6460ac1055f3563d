use clap::{Parser, Subcommand};
use crop_cache::cache::{CacheStats, ThumbnailCache};
use crop_cache::config::{self, CacheConfig, DEFAULT_CONFIG_FILE};
use crop_cache::output;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "crop-cache")]
#[command(about = "Center-cropped thumbnail cache for JPEG, PNG and WebP images")]
#[command(long_about = "\
Center-cropped thumbnail cache for JPEG, PNG and WebP images

Thumbnails are generated on first request and served from the cache
directory afterwards. Give only --width to keep the source aspect ratio;
give --width and --height to crop the center of the source to that box.

Cache entries are named

  {slug}-{width}[x{height}]-{identity}-{revision}.{jpg,png,webp}

where identity is a hash of the source file name (shared by all variants,
used by 'flush') and revision changes whenever the source is edited.

Settings are read from crop-cache.toml in the working directory if present;
command line flags override them. Run 'crop-cache gen-config' for a
documented config file. Set RUST_LOG=debug to trace cache hits and misses.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./crop-cache.toml, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Cache directory
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// JPEG/WebP quality (0-100)
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(0..=100))]
    quality: Option<u32>,

    /// PNG compression level (0-9)
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(0..=9))]
    png_compression: Option<u32>,

    /// Convert generated thumbnails to WebP
    #[arg(long, global = true)]
    webp: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Return (generating if needed) thumbnails of one or more images
    Make {
        /// Source images
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Thumbnail width in pixels
        #[arg(long, short = 'w', value_parser = clap::value_parser!(u32).range(1..))]
        width: u32,

        /// Thumbnail height in pixels (crop to fill; omit to keep aspect ratio)
        #[arg(long, short = 'H', value_parser = clap::value_parser!(u32).range(1..))]
        height: Option<u32>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove cached thumbnails of one source, or everything
    Flush {
        /// Source image whose variants to remove (omit to empty the cache)
        source: Option<PathBuf>,
    },
    /// List cache entries
    List,
    /// Print a stock crop-cache.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Make {
            sources,
            width,
            height,
            json,
        } => {
            let cache = ThumbnailCache::new(resolve_config(&cli)?)?;
            make(&cache, sources, *width, *height, *json)?;
        }
        Command::Flush { source } => {
            let cache = ThumbnailCache::new(resolve_config(&cli)?)?;
            let report = cache.flush(source.as_deref())?;
            output::print_flush_output(source.as_deref(), &report);
        }
        Command::List => {
            let cache = ThumbnailCache::new(resolve_config(&cli)?)?;
            output::print_entries(&cache.entries()?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Config file (if any), then command line overrides.
fn resolve_config(cli: &Cli) -> Result<CacheConfig, config::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::load_config_strict(path)?,
        None => config::load_config(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    if let Some(dir) = &cli.cache_dir {
        config.cache_dir = dir.clone();
    }
    if let Some(quality) = cli.quality {
        config.quality = quality;
    }
    if let Some(level) = cli.png_compression {
        config.png_compression = level;
    }
    if cli.webp {
        config.webp = true;
    }
    config.validate()?;
    Ok(config)
}

fn make(
    cache: &ThumbnailCache,
    sources: &[PathBuf],
    width: u32,
    height: Option<u32>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut stats = CacheStats::default();
    let mut results = Vec::new();

    for source in sources {
        match cache.make(source, width, height) {
            Ok(thumb) => {
                stats.record(thumb.status);
                if json {
                    results.push(serde_json::json!({ "source": source, "thumbnail": thumb }));
                } else {
                    output::print_make_output(source, &thumb);
                }
            }
            Err(e) => {
                stats.fail();
                if json {
                    results.push(serde_json::json!({ "source": source, "error": e.to_string() }));
                } else {
                    eprintln!("{}", output::format_make_error(source, &e));
                }
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if sources.len() > 1 {
        println!();
        println!("Cache: {}", stats);
    }

    if stats.failed > 0 {
        return Err(format!("{} of {} thumbnails failed", stats.failed, stats.total()).into());
    }
    Ok(())
}
