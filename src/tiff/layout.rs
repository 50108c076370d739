//! Pixel data layout of a TIFF image
//!
//! Strips and tiles are both treated as blocks: a strip is a block as wide
//! as the image and `RowsPerStrip` tall.

use log::debug;

use crate::errors::{TileError, TileResult};
use crate::io::SeekableReader;
use crate::source::BandType;
use crate::tiff::constants::{planar_config, predictor as predictor_codes, sample_format, tags};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;

/// Largest decoded block accepted, in bytes
pub const MAX_BLOCK_BYTES: u64 = 1 << 30;

/// Geometry and encoding of the pixel blocks of one image
#[derive(Debug, Clone)]
pub struct ImageLayout {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: usize,
    pub band_type: BandType,
    pub compression: u64,
    pub predictor: u16,
    pub tiled: bool,
    pub block_width: u32,
    pub block_height: u32,
    pub blocks_across: u32,
    pub blocks_down: u32,
    pub offsets: Vec<u64>,
    pub byte_counts: Vec<u64>,
}

impl ImageLayout {
    /// Reads the layout tags of `ifd`, rejecting encodings the block reader cannot decode
    pub fn from_ifd(tiff: &TiffReader, reader: &mut dyn SeekableReader, ifd: &IFD) -> TileResult<Self> {
        let (width, height) = ifd.get_dimensions()
            .ok_or_else(|| TileError::Format("Missing image dimensions".to_string()))?;
        if width == 0 || height == 0 || width > u32::MAX as u64 || height > u32::MAX as u64 {
            return Err(TileError::Format(format!("Invalid image dimensions {}x{}", width, height)));
        }
        let (width, height) = (width as u32, height as u32);

        let samples_per_pixel = ifd.get_samples_per_pixel() as usize;
        if samples_per_pixel == 0 {
            return Err(TileError::Format("SamplesPerPixel is 0".to_string()));
        }

        let band_type = read_band_type(tiff, reader, ifd)?;

        let planar = ifd.get_tag_value(tags::PLANAR_CONFIGURATION).unwrap_or(planar_config::CHUNKY as u64);
        if planar != planar_config::CHUNKY as u64 && samples_per_pixel > 1 {
            return Err(TileError::Unsupported(format!("planar configuration {}", planar)));
        }

        let compression = ifd.get_tag_value(tags::COMPRESSION).unwrap_or(1);

        let predictor = ifd.get_tag_value(tags::PREDICTOR).unwrap_or(predictor_codes::NONE as u64) as u16;
        match predictor {
            predictor_codes::NONE => {},
            predictor_codes::HORIZONTAL_DIFFERENCING if band_type.size_in_bytes() <= 2 => {},
            _ => return Err(TileError::Unsupported(format!(
                "predictor {} for {} samples", predictor, band_type))),
        }

        let tiled = ifd.is_tiled();
        let (block_width, block_height, offsets_tag, counts_tag) = if tiled {
            let tile_width = ifd.get_tag_value(tags::TILE_WIDTH).unwrap_or(0) as u32;
            let tile_height = ifd.get_tag_value(tags::TILE_LENGTH).unwrap_or(0) as u32;
            (tile_width, tile_height, tags::TILE_OFFSETS, tags::TILE_BYTE_COUNTS)
        } else {
            let rows = ifd.get_tag_value(tags::ROWS_PER_STRIP)
                .unwrap_or(height as u64)
                .min(height as u64) as u32;
            (width, rows, tags::STRIP_OFFSETS, tags::STRIP_BYTE_COUNTS)
        };
        if block_width == 0 || block_height == 0 {
            return Err(TileError::Format(format!("Invalid block size {}x{}", block_width, block_height)));
        }

        let block_bytes = (block_width as u64)
            .checked_mul(block_height as u64)
            .and_then(|pixels| pixels.checked_mul(samples_per_pixel as u64))
            .and_then(|samples| samples.checked_mul(band_type.size_in_bytes() as u64))
            .filter(|&bytes| bytes <= MAX_BLOCK_BYTES)
            .ok_or_else(|| TileError::Format(format!(
                "Block of {}x{} pixels exceeds {} bytes", block_width, block_height, MAX_BLOCK_BYTES)))?;

        let blocks_across = width.div_ceil(block_width);
        let blocks_down = height.div_ceil(block_height);

        let offsets = tiff.read_tag_values(reader, ifd, offsets_tag)?;
        let byte_counts = tiff.read_tag_values(reader, ifd, counts_tag)?;
        let expected = blocks_across as usize * blocks_down as usize;
        if offsets.len() < expected || byte_counts.len() < expected {
            return Err(TileError::Format(format!(
                "Expected {} blocks, found {} offsets and {} byte counts",
                expected, offsets.len(), byte_counts.len())));
        }
        check_block_extents(&offsets[..expected], &byte_counts[..expected], tiff.file_size())?;

        debug!("Layout: {}x{} {} x{} in {} {}x{} blocks ({} bytes each), compression {}",
               width, height, band_type, samples_per_pixel,
               if tiled { "tiled" } else { "stripped" }, block_width, block_height, block_bytes, compression);

        Ok(ImageLayout {
            width,
            height,
            samples_per_pixel,
            band_type,
            compression,
            predictor,
            tiled,
            block_width,
            block_height,
            blocks_across,
            blocks_down,
            offsets,
            byte_counts,
        })
    }

    /// Bytes of one pixel (all samples)
    pub fn pixel_bytes(&self) -> usize {
        self.samples_per_pixel * self.band_type.size_in_bytes()
    }

    /// Bytes of one decoded block row
    pub fn block_row_bytes(&self) -> usize {
        self.block_width as usize * self.pixel_bytes()
    }

    /// Rows actually stored in a block; the last strip may be shorter
    pub fn rows_in_block(&self, index: usize) -> usize {
        if self.tiled {
            return self.block_height as usize;
        }
        let block_row = index / self.blocks_across as usize;
        let start = block_row * self.block_height as usize;
        (self.height as usize - start).min(self.block_height as usize)
    }

    /// Index of the block holding pixel `(x, y)`
    pub fn block_index(&self, x: u32, y: u32) -> usize {
        (y / self.block_height) as usize * self.blocks_across as usize + (x / self.block_width) as usize
    }

    /// Byte offset of sample `band` (0-based) of pixel `(x, y)` inside its block
    pub fn offset_in_block(&self, x: u32, y: u32, band: usize) -> usize {
        let bx = (x % self.block_width) as usize;
        let by = (y % self.block_height) as usize;
        by * self.block_row_bytes() + bx * self.pixel_bytes() + band * self.band_type.size_in_bytes()
    }
}

/// Every stored block must lie inside the file; sparse blocks (offset or count 0) are skipped
fn check_block_extents(offsets: &[u64], byte_counts: &[u64], file_size: u64) -> TileResult<()> {
    for (index, (&offset, &count)) in offsets.iter().zip(byte_counts).enumerate() {
        if offset == 0 || count == 0 {
            continue;
        }
        if offset.checked_add(count).map_or(true, |end| end > file_size) {
            return Err(TileError::Format(format!(
                "Block {} spans {} bytes at offset {}, past the end of the file ({} bytes)",
                index, count, offset, file_size)));
        }
    }
    Ok(())
}

fn read_band_type(tiff: &TiffReader, reader: &mut dyn SeekableReader, ifd: &IFD) -> TileResult<BandType> {
    let bits = if ifd.has_tag(tags::BITS_PER_SAMPLE) {
        tiff.read_tag_values(reader, ifd, tags::BITS_PER_SAMPLE)?
    } else {
        vec![1]
    };
    let first_bits = bits.first().copied().unwrap_or(1);
    if bits.iter().any(|&b| b != first_bits) {
        return Err(TileError::Unsupported(format!("mixed BitsPerSample {:?}", bits)));
    }

    let format = if ifd.has_tag(tags::SAMPLE_FORMAT) {
        tiff.read_tag_values(reader, ifd, tags::SAMPLE_FORMAT)?
            .first()
            .copied()
            .unwrap_or(sample_format::UNSIGNED as u64)
    } else {
        sample_format::UNSIGNED as u64
    };

    BandType::from_tiff(first_bits, format).ok_or_else(|| TileError::Unsupported(format!(
        "{} bits per sample with sample format {}", first_bits, format)))
}
