//! Geographic request to pixel window mapping

use crate::coordinate::GeoTransform;
use crate::errors::{TileError, TileResult};

/// Largest tile side accepted, in pixels
pub const MAX_OUTPUT_SIZE: u32 = 16384;

/// Square window of source pixels feeding one output tile
///
/// The offsets may be negative or beyond the raster: no bounds checks are
/// made here, clamping happens when the window is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub offset_x: i64,
    pub offset_y: i64,
    /// Side of the window in source pixels
    pub source_size: u32,
    /// Side of the output tile in pixels
    pub destination_size: u32,
}

impl PixelWindow {
    pub fn new(offset_x: i64, offset_y: i64, source_size: u32, destination_size: u32) -> Self {
        PixelWindow { offset_x, offset_y, source_size, destination_size }
    }

    /// Maps a top-left geo position and ground size to a pixel window
    ///
    /// `offset_x = floor((x - origin_x) / pixel_size_x)`,
    /// `offset_y = floor((origin_y - y) / |pixel_size_y|)` and
    /// `source_size = round(ground_size / pixel_size_x)`, at least one pixel.
    pub fn from_geo(
        transform: &GeoTransform,
        x: f64,
        y: f64,
        ground_size: f64,
        output_size: u32,
    ) -> TileResult<Self> {
        transform.validate()?;
        if !(ground_size > 0.0) || !ground_size.is_finite() {
            return Err(TileError::InvalidRequest(format!("ground size {} is not positive", ground_size)));
        }
        check_output_size(output_size)?;
        if !x.is_finite() || !y.is_finite() {
            return Err(TileError::InvalidRequest(format!("position ({}, {}) is not finite", x, y)));
        }

        let offset_x = ((x - transform.origin_x) / transform.pixel_size_x).floor();
        let offset_y = ((transform.origin_y - y) / transform.pixel_size_y.abs()).floor();
        let source_size = (ground_size / transform.pixel_size_x).round().max(1.0);

        if source_size > u32::MAX as f64 {
            return Err(TileError::InvalidRequest(format!(
                "ground size {} spans {} pixels", ground_size, source_size)));
        }

        Ok(PixelWindow {
            offset_x: offset_x as i64,
            offset_y: offset_y as i64,
            source_size: source_size as u32,
            destination_size: output_size,
        })
    }

    /// Destination pixels per source pixel
    pub fn ratio(&self) -> f64 {
        self.destination_size as f64 / self.source_size as f64
    }

    /// True when fewer destination than source pixels are produced
    pub fn is_downscale(&self) -> bool {
        self.destination_size < self.source_size
    }
}

/// Rejects tile sides of zero or above [`MAX_OUTPUT_SIZE`]
pub fn check_output_size(output_size: u32) -> TileResult<()> {
    if output_size == 0 || output_size > MAX_OUTPUT_SIZE {
        return Err(TileError::InvalidRequest(format!(
            "output size {} is outside 1..={}", output_size, MAX_OUTPUT_SIZE)));
    }
    Ok(())
}
