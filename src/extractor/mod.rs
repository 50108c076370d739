//! Tile extraction from raster sources
//!
//! Maps geographic requests to pixel windows, locates pyramid tiles, and
//! reads windows into packed, zero-padded tiles.

mod window;
mod region;
mod pixel_format;
mod tile;
mod window_reader;
mod pyramid;

#[cfg(test)]
mod tests;

pub use window::{PixelWindow, MAX_OUTPUT_SIZE};
pub use region::ClampedRegion;
pub use pixel_format::PixelFormat;
pub use tile::RasterTile;
pub use window_reader::read_tile;
pub use pyramid::{PyramidLocator, TileIndex, DEFAULT_PYRAMID_SUFFIX, MAX_ZOOM};
