//! Factory for creating compression handlers

use crate::errors::{TileError, TileResult};
use super::handler::CompressionHandler;
use super::uncompressed::UncompressedHandler;
use super::deflate::AdobeDeflateHandler;
use super::zstd::ZstdHandler;

/// Maps TIFF compression codes to handlers
pub struct CompressionFactory;

impl CompressionFactory {
    /// Create a handler for the given compression code
    ///
    /// Code 32946 is the legacy Deflate code some writers still emit;
    /// 50000 is the ZSTD code registered by GDAL.
    pub fn create_handler(compression: u64) -> TileResult<Box<dyn CompressionHandler>> {
        match compression {
            1 => Ok(Box::new(UncompressedHandler)),
            8 | 32946 => Ok(Box::new(AdobeDeflateHandler)),
            14 | 50000 => Ok(Box::new(ZstdHandler)),
            _ => Err(TileError::Unsupported(format!("compression code {}", compression))),
        }
    }
}
