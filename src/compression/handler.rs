//! Compression handler trait definition

use crate::errors::TileResult;

/// Strategy for decoding one stored TIFF block
pub trait CompressionHandler: Send + Sync {
    /// Decompress a strip or tile into raw sample bytes
    fn decompress(&self, data: &[u8]) -> TileResult<Vec<u8>>;

    /// Human-readable name used in logs and `info` output
    fn name(&self) -> &'static str;

    /// TIFF compression code
    fn code(&self) -> u64;
}
