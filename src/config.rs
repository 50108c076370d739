//! Runtime configuration
//!
//! Loaded from a TOML file. Every key is optional:
//!
//! ```toml
//! [cache]
//! capacity_mb = 256
//! max_open_sources = 32
//! block_cache_entries = 64
//!
//! [tiles]
//! max_output_size = 16384
//!
//! [pyramid]
//! suffix = "pyramid"
//! projection_extent = 20037508.3427892
//!
//! [logging]
//! level = "info"
//! file = "rastertile.log"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::LevelFilter;

use crate::coordinate::MERCATOR_EXTENT;
use crate::errors::{TileError, TileResult};
use crate::extractor::{DEFAULT_PYRAMID_SUFFIX, MAX_OUTPUT_SIZE};
use crate::source::geotiff::DEFAULT_BLOCK_CACHE_ENTRIES;

/// Settings for the tile service and the command line tool
#[derive(Debug, Clone, PartialEq)]
pub struct TileConfig {
    /// Byte budget of the tile cache, in MiB
    pub cache_capacity_mb: usize,
    /// Open raster handles kept by the source pool
    pub max_open_sources: usize,
    /// Decoded strips/tiles kept per open GeoTIFF
    pub block_cache_entries: usize,
    /// Largest tile side served, at most [`MAX_OUTPUT_SIZE`]
    pub max_output_size: u32,
    pub pyramid_suffix: String,
    /// Half width of the projected world used to normalise pyramid positions
    pub projection_extent: f64,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl Default for TileConfig {
    fn default() -> Self {
        TileConfig {
            cache_capacity_mb: 256,
            max_open_sources: 32,
            block_cache_entries: DEFAULT_BLOCK_CACHE_ENTRIES,
            max_output_size: MAX_OUTPUT_SIZE,
            pyramid_suffix: DEFAULT_PYRAMID_SUFFIX.to_string(),
            projection_extent: MERCATOR_EXTENT,
            log_level: LevelFilter::Info,
            log_file: None,
        }
    }
}

impl TileConfig {
    /// Reads and parses a configuration file
    pub fn load(path: &Path) -> TileResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| TileError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_str(&content)
    }

    /// Cache budget in bytes
    pub fn cache_capacity_bytes(&self) -> usize {
        self.cache_capacity_mb.saturating_mul(1024 * 1024)
    }
}

impl FromStr for TileConfig {
    type Err = TileError;

    fn from_str(content: &str) -> TileResult<Self> {
        let value: toml::Value = content.parse()
            .map_err(|e| TileError::Config(format!("failed to parse TOML: {}", e)))?;

        let mut config = TileConfig::default();

        if let Some(cache) = section(&value, "cache")? {
            if let Some(v) = positive_integer(cache, "cache", "capacity_mb", true)? {
                config.cache_capacity_mb = v;
            }
            if let Some(v) = positive_integer(cache, "cache", "max_open_sources", false)? {
                config.max_open_sources = v;
            }
            if let Some(v) = positive_integer(cache, "cache", "block_cache_entries", false)? {
                config.block_cache_entries = v;
            }
        }

        if let Some(tiles) = section(&value, "tiles")? {
            if let Some(v) = positive_integer(tiles, "tiles", "max_output_size", false)? {
                if v > MAX_OUTPUT_SIZE as usize {
                    return Err(TileError::Config(format!(
                        "tiles.max_output_size {} exceeds {}", v, MAX_OUTPUT_SIZE)));
                }
                config.max_output_size = v as u32;
            }
        }

        if let Some(pyramid) = section(&value, "pyramid")? {
            if let Some(suffix) = string(pyramid, "pyramid", "suffix")? {
                if suffix.is_empty() {
                    return Err(TileError::Config("pyramid.suffix must not be empty".to_string()));
                }
                config.pyramid_suffix = suffix.to_string();
            }
            if let Some(extent) = pyramid.get("projection_extent") {
                let extent = extent.as_float()
                    .or_else(|| extent.as_integer().map(|i| i as f64))
                    .ok_or_else(|| TileError::Config("pyramid.projection_extent must be a number".to_string()))?;
                if !(extent > 0.0) || !extent.is_finite() {
                    return Err(TileError::Config(format!("pyramid.projection_extent {} must be positive", extent)));
                }
                config.projection_extent = extent;
            }
        }

        if let Some(logging) = section(&value, "logging")? {
            if let Some(level) = string(logging, "logging", "level")? {
                config.log_level = LevelFilter::from_str(level)
                    .map_err(|_| TileError::Config(format!("unknown log level '{}'", level)))?;
            }
            if let Some(file) = string(logging, "logging", "file")? {
                config.log_file = Some(PathBuf::from(file));
            }
        }

        Ok(config)
    }
}

fn section<'a>(value: &'a toml::Value, name: &str) -> TileResult<Option<&'a toml::value::Table>> {
    match value.get(name) {
        None => Ok(None),
        Some(v) => v.as_table()
            .map(Some)
            .ok_or_else(|| TileError::Config(format!("[{}] must be a table", name))),
    }
}

fn positive_integer(table: &toml::value::Table, section: &str, key: &str, allow_zero: bool) -> TileResult<Option<usize>> {
    let Some(value) = table.get(key) else {
        return Ok(None);
    };
    let number = value.as_integer()
        .ok_or_else(|| TileError::Config(format!("{}.{} must be an integer", section, key)))?;
    if number < 0 || (!allow_zero && number == 0) {
        return Err(TileError::Config(format!("{}.{} out of range: {}", section, key, number)));
    }
    Ok(Some(number as usize))
}

fn string<'a>(table: &'a toml::value::Table, section: &str, key: &str) -> TileResult<Option<&'a str>> {
    match table.get(key) {
        None => Ok(None),
        Some(v) => v.as_str()
            .map(Some)
            .ok_or_else(|| TileError::Config(format!("{}.{} must be a string", section, key))),
    }
}
