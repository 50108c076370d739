//! Immutable extracted tiles and their histogram helpers

use crate::errors::{TileError, TileResult};
use super::pixel_format::PixelFormat;

/// Square block of packed pixels produced by one extraction
#[derive(Debug, Clone, PartialEq)]
pub struct RasterTile {
    format: PixelFormat,
    size: u32,
    data: Vec<u8>,
}

impl RasterTile {
    /// Wraps a packed buffer, checking its length against `format` and `size`
    pub fn new(format: PixelFormat, size: u32, data: Vec<u8>) -> TileResult<Self> {
        let expected = format.tile_bytes(size)?;
        if data.len() != expected {
            return Err(TileError::InvalidRequest(format!(
                "{} tile of size {} needs {} bytes, got {}", format, size, expected, data.len())));
        }
        Ok(RasterTile { format, size, data })
    }

    /// Tile with every byte zero
    pub fn zeroed(format: PixelFormat, size: u32) -> TileResult<Self> {
        let data = vec![0u8; format.tile_bytes(size)?];
        Ok(RasterTile { format, size, data })
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Side length in pixels
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Bytes of pixel `(x, y)`
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.size || y >= self.size {
            return None;
        }
        let bpp = self.format.byte_size();
        let start = (y as usize * self.size as usize + x as usize) * bpp;
        self.data.get(start..start + bpp)
    }

    /// Value of pixel `(x, y)` of a `Float` tile
    pub fn float_value(&self, x: u32, y: u32) -> Option<f32> {
        if self.format != PixelFormat::Float {
            return None;
        }
        let bytes = self.pixel(x, y)?;
        Some(f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Count of each byte value; only defined for `Byte` tiles
    pub fn histogram(&self) -> Option<[u64; 256]> {
        if self.format != PixelFormat::Byte {
            return None;
        }
        let mut histogram = [0u64; 256];
        for &value in &self.data {
            histogram[value as usize] += 1;
        }
        Some(histogram)
    }

    /// The `n` most frequent byte values, most frequent first
    ///
    /// Ties go to the lower value. Returns `min(n, 256)` values; once every
    /// occurring value is listed the rest follow in ascending order with a
    /// count of zero. Each pick scans the whole histogram, so this is meant
    /// for small `n`. `None` for non-`Byte` tiles.
    pub fn most_common(&self, n: usize) -> Option<Vec<u8>> {
        let mut histogram = self.histogram()?;
        let count = n.min(256);
        let mut values = Vec::with_capacity(count);
        let mut taken = [false; 256];

        for _ in 0..count {
            let mut best: Option<(usize, u64)> = None;
            for (value, &occurrences) in histogram.iter().enumerate() {
                if taken[value] {
                    continue;
                }
                if best.map_or(true, |(_, best_count)| occurrences > best_count) {
                    best = Some((value, occurrences));
                }
            }
            let Some((value, _)) = best else { break };
            values.push(value as u8);
            histogram[value] = 0;
            taken[value] = true;
        }

        Some(values)
    }
}
