//! Output pixel formats

use std::fmt;

use crate::errors::{TileError, TileResult};
use crate::source::{BandType, RasterSource, SampleType};

/// Packed pixel layout of a raster tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// One byte per pixel
    Byte,
    /// Three interleaved bytes per pixel
    Rgb,
    /// Four interleaved bytes per pixel
    Rgba,
    /// One native-endian `f32` per pixel
    Float,
}

impl PixelFormat {
    /// Derives the tile format from a source's band count and band types
    ///
    /// Three or four byte bands give RGB/RGBA, a single byte band gives
    /// `Byte`; everything else reads band 1 as `Float`.
    pub fn for_source(source: &dyn RasterSource) -> PixelFormat {
        let bands = source.band_count();
        let all_bytes = (1..=bands).all(|band| source.band_type(band) == Some(BandType::Byte));

        match (bands, all_bytes) {
            (3, true) => PixelFormat::Rgb,
            (4, true) => PixelFormat::Rgba,
            (1, true) => PixelFormat::Byte,
            _ => PixelFormat::Float,
        }
    }

    /// Bytes of one pixel
    pub fn byte_size(&self) -> usize {
        match self {
            PixelFormat::Byte => 1,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba | PixelFormat::Float => 4,
        }
    }

    /// Bytes needed for `pixel_count` pixels, `None` on overflow
    pub fn size_in_bytes(&self, pixel_count: usize) -> Option<usize> {
        self.byte_size().checked_mul(pixel_count)
    }

    /// Bytes of a square tile with `size` pixels per side
    pub fn tile_bytes(&self, size: u32) -> TileResult<usize> {
        (size as usize).checked_mul(size as usize)
            .and_then(|pixels| self.size_in_bytes(pixels))
            .ok_or_else(|| TileError::InvalidRequest(format!("{} tile of size {} is too large", self, size)))
    }

    /// Number of source bands interleaved into one pixel
    pub fn band_count(&self) -> usize {
        match self {
            PixelFormat::Byte | PixelFormat::Float => 1,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }

    /// Encoding of each interleaved sample
    pub fn sample_type(&self) -> SampleType {
        match self {
            PixelFormat::Float => SampleType::F32,
            _ => SampleType::U8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PixelFormat::Byte => "Byte",
            PixelFormat::Rgb => "RGB",
            PixelFormat::Rgba => "RGBA",
            PixelFormat::Float => "Float",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
