//! Writing extracted tiles to disk
//!
//! `.raw` paths receive the packed tile bytes unchanged. Any other extension
//! goes through the image crate: byte tiles become grayscale, RGB and RGBA
//! tiles keep their channels and float tiles are stretched over their value
//! range into 16-bit grayscale.

use std::fs;
use std::path::Path;

use image::{DynamicImage, GrayImage, ImageBuffer, Luma, RgbImage, RgbaImage};
use log::info;

use crate::errors::{TileError, TileResult};
use crate::extractor::{PixelFormat, RasterTile};

/// Converts a tile into an image
pub fn tile_to_image(tile: &RasterTile) -> TileResult<DynamicImage> {
    let size = tile.size();
    let data = tile.data().to_vec();
    let mismatch = || TileError::Format(format!("{} tile buffer does not match size {}", tile.format(), size));

    let image = match tile.format() {
        PixelFormat::Byte => DynamicImage::ImageLuma8(
            GrayImage::from_raw(size, size, data).ok_or_else(mismatch)?),
        PixelFormat::Rgb => DynamicImage::ImageRgb8(
            RgbImage::from_raw(size, size, data).ok_or_else(mismatch)?),
        PixelFormat::Rgba => DynamicImage::ImageRgba8(
            RgbaImage::from_raw(size, size, data).ok_or_else(mismatch)?),
        PixelFormat::Float => DynamicImage::ImageLuma16(
            ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(size, size, stretch_floats(tile))
                .ok_or_else(mismatch)?),
    };
    Ok(image)
}

/// Maps the finite values of a float tile linearly onto `0..=u16::MAX`
fn stretch_floats(tile: &RasterTile) -> Vec<u16> {
    let values: Vec<f32> = tile.data()
        .chunks_exact(4)
        .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    let (min, max) = values.iter()
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;

    values.iter()
        .map(|&v| {
            if !v.is_finite() || !(range > 0.0) {
                0
            } else {
                (((v - min) / range) * u16::MAX as f32).round() as u16
            }
        })
        .collect()
}

/// Writes `tile` to `path`, choosing the encoding from the extension
pub fn save_tile(tile: &RasterTile, path: &Path) -> TileResult<()> {
    let is_raw = path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("raw"));

    if is_raw {
        fs::write(path, tile.data())?;
    } else {
        tile_to_image(tile)?
            .save(path)
            .map_err(|e| TileError::Format(format!("Failed to write {}: {}", path.display(), e)))?;
    }

    info!("Wrote {}x{} {} tile to {}", tile.size(), tile.size(), tile.format(), path.display());
    Ok(())
}
