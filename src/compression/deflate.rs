//! Handler for Adobe Deflate compressed blocks

use std::io::Read;
use flate2::read::ZlibDecoder;
use crate::errors::TileResult;
use super::handler::CompressionHandler;

/// Adobe Deflate (zlib) handler, compression code 8
pub struct AdobeDeflateHandler;

impl CompressionHandler for AdobeDeflateHandler {
    fn decompress(&self, data: &[u8]) -> TileResult<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(data);
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed)?;
        Ok(decompressed)
    }

    fn name(&self) -> &'static str {
        "Adobe Deflate"
    }

    fn code(&self) -> u64 {
        8
    }
}
