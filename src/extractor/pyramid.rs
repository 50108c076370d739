//! Tile pyramid lookup
//!
//! A pyramid for raster `P` lives in the directory `P.<suffix>` and holds
//! Web Mercator tiles at `<zoom>/<x>/<y>.<extension>`. The zoom level is
//! picked so that one tile covers roughly the requested ground size at the
//! request's latitude.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::coordinate::{CoordinateTransformer, MERCATOR_EXTENT};

/// Directory suffix used when none is configured
pub const DEFAULT_PYRAMID_SUFFIX: &str = "pyramid";

/// Deepest zoom level the locator will address
pub const MAX_ZOOM: u32 = 30;

/// Zoom level and tile indices inside a pyramid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileIndex {
    pub zoom: u32,
    pub x: u64,
    pub y: u64,
}

/// Maps requests to pyramid tiles
#[derive(Debug, Clone)]
pub struct PyramidLocator {
    suffix: String,
    extent: f64,
}

impl Default for PyramidLocator {
    fn default() -> Self {
        PyramidLocator::new(DEFAULT_PYRAMID_SUFFIX, MERCATOR_EXTENT)
    }
}

impl PyramidLocator {
    pub fn new(suffix: &str, extent: f64) -> Self {
        PyramidLocator {
            suffix: suffix.to_string(),
            extent,
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// `P.<suffix>`
    pub fn pyramid_root(&self, path: &Path) -> PathBuf {
        with_suffix(path, Some(&self.suffix))
    }

    /// Zoom level whose tiles span about `ground_size` meters at northing `y`
    ///
    /// `round(log2(circumference * cos(latitude) / ground_size)) + 1`, never
    /// below 0 and capped at [`MAX_ZOOM`].
    pub fn zoom_level(&self, y: f64, ground_size: f64) -> u32 {
        let latitude = CoordinateTransformer::latitude_from_mercator_y(y);
        let level = (CoordinateTransformer::parallel_length(latitude) / ground_size).log2().round() + 1.0;
        if level.is_nan() || level < 0.0 {
            0
        } else {
            (level as u32).min(MAX_ZOOM)
        }
    }

    /// Tile covering the top-left position `(x, y)`
    pub fn locate(&self, x: f64, y: f64, ground_size: f64) -> TileIndex {
        let zoom = self.zoom_level(y, ground_size);
        let (norm_x, norm_y) = CoordinateTransformer::normalize(x, y, self.extent);
        let num_tiles = 1u64 << zoom;
        let index = |norm: f64| ((norm * num_tiles as f64).floor() as u64).min(num_tiles - 1);

        TileIndex {
            zoom,
            x: index(norm_x),
            y: index(norm_y),
        }
    }

    /// `root/<zoom>/<x>/<y>.<extension>`
    pub fn tile_path(&self, root: &Path, index: &TileIndex, extension: Option<&str>) -> PathBuf {
        let dir = root.join(index.zoom.to_string()).join(index.x.to_string());
        with_suffix(&dir.join(index.y.to_string()), extension)
    }

    /// The single-file raster `P.<extension>`
    pub fn direct_path(&self, path: &Path, extension: Option<&str>) -> PathBuf {
        with_suffix(path, extension)
    }
}

/// Appends `.suffix` to the full path, keeping any dots already in it
fn with_suffix(path: &Path, suffix: Option<&str>) -> PathBuf {
    match suffix {
        Some(suffix) if !suffix.is_empty() => {
            let mut name = OsString::from(path.as_os_str());
            name.push(".");
            name.push(suffix);
            PathBuf::from(name)
        },
        _ => path.to_path_buf(),
    }
}
