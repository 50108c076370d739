//! Windowed reading, padding and packing of tiles

use log::trace;

use crate::errors::{TileError, TileResult};
use crate::source::{BandRead, Interpolation, RasterSource};
use super::pixel_format::PixelFormat;
use super::region::ClampedRegion;
use super::tile::RasterTile;
use super::window::{check_output_size, PixelWindow};

/// Reads `window` from `source` into a `destination_size` square tile
///
/// Only the part of the window inside the raster is read; overhanging sides
/// are zero padded. Downscaling always uses nearest-neighbour sampling. A
/// window entirely outside the raster yields a zero tile without touching
/// the source.
pub fn read_tile(
    source: &mut dyn RasterSource,
    window: &PixelWindow,
    interpolation: Interpolation,
    format: PixelFormat,
) -> TileResult<RasterTile> {
    let size = window.destination_size;
    check_output_size(size)?;
    let bands = format.band_count();
    if source.band_count() < bands {
        return Err(TileError::InvalidRequest(format!(
            "{} tiles need {} bands, source has {}", format, bands, source.band_count())));
    }

    let interpolation = if window.is_downscale() { Interpolation::Nearest } else { interpolation };

    let (width, height) = source.dimensions();
    let region = match ClampedRegion::from_window(window, width, height) {
        Some(region) => region,
        None => {
            trace!("Window {:?} outside {}x{} raster", window, width, height);
            return RasterTile::zeroed(format, size);
        },
    };

    let bpp = format.byte_size();
    let sample = format.sample_type();
    let dst_width = region.destination_width();
    let dst_height = region.destination_height();
    let mut buffer = vec![0u8; format.size_in_bytes(dst_width as usize * dst_height as usize)
        .ok_or_else(|| TileError::InvalidRequest(format!("window {:?} is too large", window)))?];

    for band in 0..bands {
        let read = BandRead {
            band: band + 1,
            src_x: region.usable_x,
            src_y: region.usable_y,
            src_width: region.usable_width,
            src_height: region.usable_height,
            dst_width,
            dst_height,
            sample,
            pixel_stride: bpp,
            interpolation,
        };
        source.read_band(&read, &mut buffer[band * sample.size_in_bytes()..])?;
    }

    if !region.is_clamped() {
        return RasterTile::new(format, size, buffer);
    }

    let mut data = vec![0u8; format.tile_bytes(size)?];
    let row_bytes = dst_width as usize * bpp;
    for (row, chunk) in buffer.chunks_exact(row_bytes).enumerate() {
        let start = ((row + region.top as usize) * size as usize + region.left as usize) * bpp;
        data[start..start + row_bytes].copy_from_slice(chunk);
    }

    RasterTile::new(format, size, data)
}
