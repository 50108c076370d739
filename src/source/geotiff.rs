//! GeoTIFF raster source
//!
//! Opens classic TIFF or BigTIFF files, picks the first full-resolution
//! image and serves windowed reads by decoding the strips or tiles the
//! window touches.

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};

use crate::coordinate::GeoTransform;
use crate::errors::{TileError, TileResult};
use crate::io::SeekableReader;
use crate::tiff::{read_geotransform, BlockReader, ImageLayout, TiffReader};
use super::resample::{resample_into, SamplePlane};
use super::{BandRead, BandType, RasterSource, SourceProvider};

/// Decoded blocks kept per open file unless configured otherwise
pub const DEFAULT_BLOCK_CACHE_ENTRIES: usize = 64;

/// Open GeoTIFF file
pub struct GeoTiffSource {
    reader: Box<dyn SeekableReader>,
    tiff: TiffReader,
    blocks: BlockReader,
    geotransform: GeoTransform,
    path: PathBuf,
}

impl GeoTiffSource {
    /// Opens the file at `path`
    pub fn open(path: &Path, block_cache_entries: usize) -> TileResult<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TileError::NotFound(path.to_path_buf()),
            _ => TileError::Io(e),
        })?;
        let mut source = Self::from_reader(Box::new(BufReader::new(file)), block_cache_entries)?;
        source.path = path.to_path_buf();
        info!("Opened {} ({}x{}, {} bands)", path.display(),
              source.blocks.layout().width, source.blocks.layout().height, source.band_count());
        Ok(source)
    }

    /// Parses a GeoTIFF from any seekable stream
    pub fn from_reader(mut reader: Box<dyn SeekableReader>, block_cache_entries: usize) -> TileResult<Self> {
        let (tiff, ifds) = TiffReader::read(reader.as_mut())?;

        let ifd = ifds.iter()
            .find(|ifd| ifd.is_full_resolution())
            .unwrap_or(&ifds[0]);
        debug!("Using IFD #{}", ifd.number);

        let geotransform = read_geotransform(&tiff, reader.as_mut(), ifd)?;
        let layout = ImageLayout::from_ifd(&tiff, reader.as_mut(), ifd)?;
        let blocks = BlockReader::new(layout, block_cache_entries)?;

        Ok(GeoTiffSource {
            reader,
            tiff,
            blocks,
            geotransform,
            path: PathBuf::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layout(&self) -> &ImageLayout {
        self.blocks.layout()
    }

    /// Decodes the source window of one band into a plane of samples
    fn read_window(&mut self, read: &BandRead) -> TileResult<Vec<f64>> {
        let band = read.band - 1;
        let band_type = self.blocks.layout().band_type;
        let handler = self.tiff.handler();

        let mut window = Vec::with_capacity(read.src_width as usize * read.src_height as usize);
        let mut current: Option<(usize, Arc<Vec<u8>>)> = None;

        for y in read.src_y..read.src_y + read.src_height {
            for x in read.src_x..read.src_x + read.src_width {
                let index = self.blocks.layout().block_index(x, y);
                let block = match &current {
                    Some((cached, block)) if *cached == index => Arc::clone(block),
                    _ => {
                        let block = self.blocks.block(self.reader.as_mut(), handler, index)?;
                        current = Some((index, Arc::clone(&block)));
                        block
                    },
                };

                let offset = self.blocks.layout().offset_in_block(x, y, band);
                let bytes = block.get(offset..offset + band_type.size_in_bytes())
                    .ok_or_else(|| TileError::Format(format!(
                        "Block {} too short for pixel ({}, {})", index, x, y)))?;
                window.push(handler.decode_sample(bytes, band_type));
            }
        }

        Ok(window)
    }
}

impl RasterSource for GeoTiffSource {
    fn dimensions(&self) -> (u32, u32) {
        let layout = self.blocks.layout();
        (layout.width, layout.height)
    }

    fn band_count(&self) -> usize {
        self.blocks.layout().samples_per_pixel
    }

    fn band_type(&self, band: usize) -> Option<BandType> {
        if band >= 1 && band <= self.band_count() {
            Some(self.blocks.layout().band_type)
        } else {
            None
        }
    }

    fn geotransform(&self) -> GeoTransform {
        self.geotransform
    }

    fn read_band(&mut self, read: &BandRead, out: &mut [u8]) -> TileResult<()> {
        let (width, height) = self.dimensions();
        read.validate(width, height, self.band_count(), out.len())?;

        let window = self.read_window(read)?;
        let plane = SamplePlane::new(read.src_width as usize, read.src_height as usize, &window);
        resample_into(&plane, read, out);
        Ok(())
    }
}

/// Opens GeoTIFF files from the local file system
#[derive(Debug, Clone)]
pub struct GeoTiffProvider {
    block_cache_entries: usize,
}

impl GeoTiffProvider {
    pub fn new(block_cache_entries: usize) -> Self {
        GeoTiffProvider { block_cache_entries }
    }
}

impl Default for GeoTiffProvider {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_CACHE_ENTRIES)
    }
}

impl SourceProvider for GeoTiffProvider {
    fn open(&self, path: &Path) -> TileResult<Box<dyn RasterSource>> {
        Ok(Box::new(GeoTiffSource::open(path, self.block_cache_entries)?))
    }
}
