//! Handler for Zstandard compressed blocks

use crate::errors::{TileError, TileResult};
use super::handler::CompressionHandler;
use log::{debug, warn};

/// Zstandard handler, compression code 14 (GDAL's ZSTD code is 50000)
pub struct ZstdHandler;

impl CompressionHandler for ZstdHandler {
    fn decompress(&self, data: &[u8]) -> TileResult<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }

        match zstd::decode_all(data) {
            Ok(decompressed) => {
                debug!("ZSTD decompressed {} bytes to {} bytes", data.len(), decompressed.len());
                Ok(decompressed)
            },
            Err(e) => {
                warn!("ZSTD decompression error: {}", e);
                Err(TileError::Io(e))
            }
        }
    }

    fn name(&self) -> &'static str {
        "ZSTD"
    }

    fn code(&self) -> u64 {
        14
    }
}
