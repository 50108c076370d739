//! In-memory raster sources
//!
//! Band planes held in memory. Useful for embedding callers that already
//! have decoded pixels and for exercising the extraction pipeline without
//! files.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::debug;

use crate::coordinate::GeoTransform;
use crate::errors::{TileError, TileResult};
use super::resample::{resample_into, SamplePlane};
use super::{BandRead, BandType, RasterSource, SourceProvider};

#[derive(Debug, Clone)]
struct MemoryBand {
    band_type: BandType,
    samples: Arc<Vec<f64>>,
}

/// Raster held entirely in memory
#[derive(Debug, Clone)]
pub struct MemorySource {
    width: u32,
    height: u32,
    geotransform: GeoTransform,
    bands: Vec<MemoryBand>,
    reads: Arc<AtomicUsize>,
}

impl MemorySource {
    /// Creates a source without bands; the geotransform is validated here
    pub fn new(width: u32, height: u32, geotransform: GeoTransform) -> TileResult<Self> {
        geotransform.validate()?;
        if width == 0 || height == 0 {
            return Err(TileError::InvalidRequest(format!("empty raster {}x{}", width, height)));
        }
        Ok(MemorySource {
            width,
            height,
            geotransform,
            bands: Vec::new(),
            reads: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Appends a band of `width * height` samples in row-major order
    pub fn with_band(mut self, band_type: BandType, samples: Vec<f64>) -> TileResult<Self> {
        let expected = self.width as usize * self.height as usize;
        if samples.len() != expected {
            return Err(TileError::InvalidRequest(format!(
                "band has {} samples, raster needs {}", samples.len(), expected)));
        }
        self.bands.push(MemoryBand { band_type, samples: Arc::new(samples) });
        Ok(self)
    }

    /// Appends a `Byte` band from raw bytes
    pub fn with_byte_band(self, bytes: &[u8]) -> TileResult<Self> {
        self.with_band(BandType::Byte, bytes.iter().map(|&b| b as f64).collect())
    }

    /// Number of `read_band` calls served by this source and its clones
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl RasterSource for MemorySource {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn band_count(&self) -> usize {
        self.bands.len()
    }

    fn band_type(&self, band: usize) -> Option<BandType> {
        band.checked_sub(1)
            .and_then(|index| self.bands.get(index))
            .map(|b| b.band_type)
    }

    fn geotransform(&self) -> GeoTransform {
        self.geotransform
    }

    fn read_band(&mut self, read: &BandRead, out: &mut [u8]) -> TileResult<()> {
        read.validate(self.width, self.height, self.bands.len(), out.len())?;
        self.reads.fetch_add(1, Ordering::SeqCst);

        let band = &self.bands[read.band - 1];
        let src_width = read.src_width as usize;
        let mut window = Vec::with_capacity(src_width * read.src_height as usize);
        for row in read.src_y..read.src_y + read.src_height {
            let start = row as usize * self.width as usize + read.src_x as usize;
            window.extend_from_slice(&band.samples[start..start + src_width]);
        }

        let plane = SamplePlane::new(src_width, read.src_height as usize, &window);
        resample_into(&plane, read, out);
        Ok(())
    }
}

/// Provider serving registered in-memory sources by path
#[derive(Debug, Default)]
pub struct MemoryProvider {
    sources: HashMap<PathBuf, MemorySource>,
    directories: HashSet<PathBuf>,
    opens: AtomicUsize,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `source` under `path`; every `open` hands out a clone sharing the pixels
    pub fn insert<P: Into<PathBuf>>(&mut self, path: P, source: MemorySource) {
        self.sources.insert(path.into(), source);
    }

    /// Marks `path` as a directory, e.g. a pyramid root
    pub fn add_directory<P: Into<PathBuf>>(&mut self, path: P) {
        self.directories.insert(path.into());
    }

    /// Number of successful `open` calls
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl SourceProvider for MemoryProvider {
    fn open(&self, path: &Path) -> TileResult<Box<dyn RasterSource>> {
        match self.sources.get(path) {
            Some(source) => {
                self.opens.fetch_add(1, Ordering::SeqCst);
                debug!("Opened in-memory source {}", path.display());
                Ok(Box::new(source.clone()))
            },
            None => Err(TileError::NotFound(path.to_path_buf())),
        }
    }

    fn is_directory(&self, path: &Path) -> bool {
        self.directories.contains(path)
    }
}
