//! Raster source abstraction
//!
//! A raster source is an open handle to georeferenced pixel data. The
//! extraction core only ever talks to the [`RasterSource`] and
//! [`SourceProvider`] traits; the GeoTIFF reader and the in-memory source are
//! the two implementations shipped with the crate.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::coordinate::GeoTransform;
use crate::errors::{TileError, TileResult};
use crate::tiff::constants::sample_format as sample_formats;

pub mod geotiff;
pub mod memory;
pub mod resample;

#[cfg(test)]
mod tests;

pub use geotiff::{GeoTiffProvider, GeoTiffSource};
pub use memory::{MemoryProvider, MemorySource};

/// Storage type of one band's samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BandType {
    Byte,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    Float32,
    Float64,
}

impl BandType {
    pub fn size_in_bytes(&self) -> usize {
        match self {
            BandType::Byte | BandType::Int8 => 1,
            BandType::UInt16 | BandType::Int16 => 2,
            BandType::UInt32 | BandType::Int32 | BandType::Float32 => 4,
            BandType::Float64 => 8,
        }
    }

    /// Band type for a TIFF BitsPerSample / SampleFormat pair
    pub fn from_tiff(bits_per_sample: u64, sample_format: u64) -> Option<BandType> {
        const UNSIGNED: u64 = sample_formats::UNSIGNED as u64;
        const SIGNED: u64 = sample_formats::SIGNED as u64;
        const FLOAT: u64 = sample_formats::IEEEFP as u64;

        match (bits_per_sample, sample_format) {
            (8, UNSIGNED) => Some(BandType::Byte),
            (8, SIGNED) => Some(BandType::Int8),
            (16, UNSIGNED) => Some(BandType::UInt16),
            (16, SIGNED) => Some(BandType::Int16),
            (32, UNSIGNED) => Some(BandType::UInt32),
            (32, SIGNED) => Some(BandType::Int32),
            (32, FLOAT) => Some(BandType::Float32),
            (64, FLOAT) => Some(BandType::Float64),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BandType::Byte => "Byte",
            BandType::Int8 => "Int8",
            BandType::UInt16 => "UInt16",
            BandType::Int16 => "Int16",
            BandType::UInt32 => "UInt32",
            BandType::Int32 => "Int32",
            BandType::Float32 => "Float32",
            BandType::Float64 => "Float64",
        }
    }
}

impl fmt::Display for BandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sample encoding written into a destination buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    /// One byte, rounded and clamped to 0..=255
    U8,
    /// Four bytes, native-endian `f32`
    F32,
}

impl SampleType {
    pub fn size_in_bytes(&self) -> usize {
        match self {
            SampleType::U8 => 1,
            SampleType::F32 => 4,
        }
    }

    /// Writes `value` at the start of `out`
    pub fn encode(&self, value: f64, out: &mut [u8]) {
        match self {
            SampleType::U8 => out[0] = value.round().clamp(0.0, 255.0) as u8,
            SampleType::F32 => out[..4].copy_from_slice(&(value as f32).to_ne_bytes()),
        }
    }
}

/// Resampling kernel used when the source window and the destination differ in size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interpolation {
    #[default]
    Nearest,
    Bilinear,
    Cubic,
    Average,
}

impl Interpolation {
    pub fn name(&self) -> &'static str {
        match self {
            Interpolation::Nearest => "nearest",
            Interpolation::Bilinear => "bilinear",
            Interpolation::Cubic => "cubic",
            Interpolation::Average => "average",
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Interpolation {
    type Err = TileError;

    fn from_str(s: &str) -> TileResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" | "near" => Ok(Interpolation::Nearest),
            "bilinear" | "linear" => Ok(Interpolation::Bilinear),
            "cubic" | "bicubic" => Ok(Interpolation::Cubic),
            "average" | "area" => Ok(Interpolation::Average),
            other => Err(TileError::InvalidRequest(format!("Unknown interpolation: {}", other))),
        }
    }
}

/// One windowed, resampled read of a single band
///
/// The source window `src_x, src_y, src_width, src_height` is resampled to
/// `dst_width x dst_height`. Sample `(col, row)` is encoded as `sample` at byte
/// offset `(row * dst_width + col) * pixel_stride` of the destination buffer,
/// so several bands can be interleaved into one buffer by offsetting its start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandRead {
    /// 1-based band index
    pub band: usize,
    pub src_x: u32,
    pub src_y: u32,
    pub src_width: u32,
    pub src_height: u32,
    pub dst_width: u32,
    pub dst_height: u32,
    pub sample: SampleType,
    pub pixel_stride: usize,
    pub interpolation: Interpolation,
}

impl BandRead {
    /// Minimum destination length for this read
    pub fn required_len(&self) -> usize {
        if self.dst_width == 0 || self.dst_height == 0 {
            return 0;
        }
        let last = (self.dst_height as usize - 1) * self.dst_width as usize + self.dst_width as usize - 1;
        last * self.pixel_stride + self.sample.size_in_bytes()
    }

    /// Checks the window against the raster size and the destination length
    pub fn validate(&self, width: u32, height: u32, band_count: usize, out_len: usize) -> TileResult<()> {
        if self.band == 0 || self.band > band_count {
            return Err(TileError::InvalidRequest(format!(
                "band {} out of range 1..={}", self.band, band_count)));
        }
        if self.src_width == 0 || self.src_height == 0 {
            return Err(TileError::InvalidRequest("empty source window".to_string()));
        }
        if self.src_x as u64 + self.src_width as u64 > width as u64
            || self.src_y as u64 + self.src_height as u64 > height as u64 {
            return Err(TileError::InvalidRequest(format!(
                "window {}x{}+{}+{} exceeds raster {}x{}",
                self.src_width, self.src_height, self.src_x, self.src_y, width, height)));
        }
        if self.pixel_stride < self.sample.size_in_bytes() {
            return Err(TileError::InvalidRequest(format!(
                "pixel stride {} smaller than sample size", self.pixel_stride)));
        }
        if out_len < self.required_len() {
            return Err(TileError::InvalidRequest(format!(
                "destination holds {} bytes, read needs {}", out_len, self.required_len())));
        }
        Ok(())
    }
}

/// Open handle to georeferenced pixel data; closed when dropped
pub trait RasterSource: Send {
    /// Width and height in pixels
    fn dimensions(&self) -> (u32, u32);

    fn band_count(&self) -> usize;

    /// Type of a 1-based band, `None` when out of range
    fn band_type(&self, band: usize) -> Option<BandType>;

    fn geotransform(&self) -> GeoTransform;

    /// Windowed, resampled read of one band into `out`
    fn read_band(&mut self, read: &BandRead, out: &mut [u8]) -> TileResult<()>;
}

/// Opens raster sources by path
pub trait SourceProvider: Send + Sync {
    /// Opens `path`; `TileError::NotFound` when nothing exists there
    fn open(&self, path: &Path) -> TileResult<Box<dyn RasterSource>>;

    /// Whether `path` is a directory (used to detect tile pyramids)
    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }
}
