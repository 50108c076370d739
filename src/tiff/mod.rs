//! TIFF file format parsing module
//!
//! Reads TIFF and BigTIFF headers, IFDs, GeoTIFF georeferencing tags and
//! the strip or tile blocks holding pixel data.

pub mod ifd;
pub mod reader;
pub mod geotags;
pub mod layout;
pub mod block_reader;
pub(crate) mod constants;

#[cfg(test)]
pub(crate) mod tests;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use ifd::{IFD, IFDEntry};
pub use reader::TiffReader;
pub use geotags::read_geotransform;
pub use layout::ImageLayout;
pub use block_reader::BlockReader;
