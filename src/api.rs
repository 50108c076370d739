//! Request surface of the library
//!
//! [`TileService`] answers tile requests: it consults the extraction cache,
//! prefers a pyramid tile when a pyramid sits next to the requested raster,
//! and otherwise reads the window straight from the full raster.

use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use lru::LruCache;

use crate::cache::{CacheStats, ExtractionCache, ExtractionKey};
use crate::config::TileConfig;
use crate::coordinate::{GeoTransform, Point};
use crate::errors::{TileError, TileResult};
use crate::extractor::{read_tile, PixelFormat, PixelWindow, PyramidLocator, RasterTile};
use crate::source::{BandType, GeoTiffProvider, Interpolation, RasterSource, SourceProvider};
use crate::utils::sync::lock;

/// Open source shared between requests; the mutex serialises reads on one handle
pub type SharedSource = Arc<Mutex<Box<dyn RasterSource>>>;

/// Bounded pool of open raster handles keyed by path
pub struct SourcePool {
    provider: Arc<dyn SourceProvider>,
    handles: Mutex<LruCache<PathBuf, SharedSource>>,
}

impl SourcePool {
    pub fn new(provider: Arc<dyn SourceProvider>, max_open: usize) -> Self {
        let capacity = NonZeroUsize::new(max_open).unwrap_or(NonZeroUsize::MIN);
        SourcePool {
            provider,
            handles: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Handle for `path`, opening it if it is not pooled
    ///
    /// Opening happens outside the pool lock; if two threads open the same
    /// path at once the first handle inserted wins.
    pub fn get(&self, path: &Path) -> TileResult<SharedSource> {
        if let Some(handle) = lock(&self.handles).get(path) {
            return Ok(Arc::clone(handle));
        }

        let opened: SharedSource = Arc::new(Mutex::new(self.provider.open(path)?));
        let mut handles = lock(&self.handles);
        if let Some(existing) = handles.get(path) {
            return Ok(Arc::clone(existing));
        }
        if let Some((evicted, _)) = handles.push(path.to_path_buf(), Arc::clone(&opened)) {
            if evicted != path {
                debug!("Closing {}", evicted.display());
            }
        }
        Ok(opened)
    }

    pub fn len(&self) -> usize {
        lock(&self.handles).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Description of the raster that serves a path
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub band_count: usize,
    pub band_type: Option<BandType>,
    pub format: PixelFormat,
    pub geotransform: GeoTransform,
    /// Corners of the raster in projected coordinates
    pub top_left: Point,
    pub bottom_right: Point,
    /// Pyramid directory next to the raster, if any
    pub pyramid: Option<PathBuf>,
}

impl fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Raster: {}", self.path.display())?;
        writeln!(f, "  Dimensions: {}x{}", self.width, self.height)?;
        writeln!(f, "  Bands: {}", self.band_count)?;
        match self.band_type {
            Some(band_type) => writeln!(f, "  Band type: {}", band_type)?,
            None => writeln!(f, "  Band type: unknown")?,
        }
        writeln!(f, "  Tile format: {} ({} bytes per pixel)", self.format, self.format.byte_size())?;
        writeln!(f, "  Geotransform: {}", self.geotransform)?;
        writeln!(f, "  Extent: ({}, {}) - ({}, {})",
                 self.top_left.x, self.top_left.y, self.bottom_right.x, self.bottom_right.y)?;
        match &self.pyramid {
            Some(root) => write!(f, "  Pyramid: {}", root.display()),
            None => write!(f, "  Pyramid: none"),
        }
    }
}

/// Tile extraction service, shareable across threads
pub struct TileService {
    provider: Arc<dyn SourceProvider>,
    pool: SourcePool,
    cache: ExtractionCache,
    locator: PyramidLocator,
    max_output_size: u32,
}

impl TileService {
    /// Service reading GeoTIFF files from disk
    pub fn from_config(config: &TileConfig) -> Self {
        Self::new(Arc::new(GeoTiffProvider::new(config.block_cache_entries)), config)
    }

    /// Service over any source provider, with the default LRU cache
    pub fn new(provider: Arc<dyn SourceProvider>, config: &TileConfig) -> Self {
        Self::with_cache(provider, config, ExtractionCache::new(config.cache_capacity_bytes()))
    }

    /// Service over any source provider and a caller-built cache
    pub fn with_cache(provider: Arc<dyn SourceProvider>, config: &TileConfig, cache: ExtractionCache) -> Self {
        TileService {
            pool: SourcePool::new(Arc::clone(&provider), config.max_open_sources),
            provider,
            cache,
            locator: PyramidLocator::new(&config.pyramid_suffix, config.projection_extent),
            max_output_size: config.max_output_size,
        }
    }

    /// Tile whose top-left corner is `(top_left_x, top_left_y)`, covering
    /// `ground_size` meters on each side, resampled to `output_size` pixels
    ///
    /// `path` is the raster path without extension; `extension` is appended
    /// for both the direct file and pyramid tiles. Any failure is logged and
    /// reported as `None`.
    pub fn get_tile(
        &self,
        path: &Path,
        extension: Option<&str>,
        top_left_x: f64,
        top_left_y: f64,
        ground_size: f64,
        output_size: u32,
        interpolation: Interpolation,
    ) -> Option<Arc<RasterTile>> {
        let key = ExtractionKey::new(path, extension, top_left_x, top_left_y, ground_size, output_size, interpolation);
        self.get_tile_for(&key)
    }

    /// Same as [`TileService::get_tile`] for a prepared key
    pub fn get_tile_for(&self, key: &ExtractionKey) -> Option<Arc<RasterTile>> {
        self.cache.get_or_compute(key, || match self.extract(key) {
            Ok(tile) => Some(Arc::new(tile)),
            Err(e) => {
                warn!("No tile for {} at ({}, {}): {}",
                      key.path().display(), key.top_left_x(), key.top_left_y(), e);
                None
            },
        })
    }

    /// Runs one extraction, bypassing the cache
    pub fn extract(&self, key: &ExtractionKey) -> TileResult<RasterTile> {
        if key.output_size() > self.max_output_size {
            return Err(TileError::InvalidRequest(format!(
                "output size {} exceeds the configured maximum {}", key.output_size(), self.max_output_size)));
        }

        let root = self.locator.pyramid_root(key.path());
        if self.provider.is_directory(&root) {
            let index = self.locator.locate(key.top_left_x(), key.top_left_y(), key.ground_size());
            let tile_path = self.locator.tile_path(&root, &index, key.extension());
            match self.pool.get(&tile_path) {
                Ok(handle) => {
                    debug!("Using pyramid tile {}", tile_path.display());
                    return self.read_from(&handle, key);
                },
                Err(e) => debug!("Pyramid tile {} unavailable ({}), reading full raster", tile_path.display(), e),
            }
        }

        let direct = self.locator.direct_path(key.path(), key.extension());
        let handle = self.pool.get(&direct)?;
        self.read_from(&handle, key)
    }

    fn read_from(&self, handle: &SharedSource, key: &ExtractionKey) -> TileResult<RasterTile> {
        let mut source = lock(handle);
        let window = PixelWindow::from_geo(
            &source.geotransform(),
            key.top_left_x(),
            key.top_left_y(),
            key.ground_size(),
            key.output_size(),
        )?;
        let format = PixelFormat::for_source(source.as_ref());
        debug!("Reading window {:?} as {}", window, format);
        read_tile(source.as_mut(), &window, key.interpolation(), format)
    }

    /// Metadata of the raster serving `path`
    pub fn describe(&self, path: &Path, extension: Option<&str>) -> TileResult<SourceInfo> {
        let direct = self.locator.direct_path(path, extension);
        let handle = self.pool.get(&direct)?;
        let source = lock(&handle);
        let (width, height) = source.dimensions();
        let root = self.locator.pyramid_root(path);
        let geotransform = source.geotransform();

        Ok(SourceInfo {
            path: direct,
            width,
            height,
            band_count: source.band_count(),
            band_type: source.band_type(1),
            format: PixelFormat::for_source(source.as_ref()),
            geotransform,
            top_left: geotransform.pixel_to_geo(0.0, 0.0),
            bottom_right: geotransform.pixel_to_geo(width as f64, height as f64),
            pyramid: self.provider.is_directory(&root).then_some(root),
        })
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn open_sources(&self) -> usize {
        self.pool.len()
    }

    pub fn locator(&self) -> &PyramidLocator {
        &self.locator
    }
}
