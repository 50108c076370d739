//! Strip and tile decoding
//!
//! Reads one compressed block, decompresses it and undoes the horizontal
//! predictor. Decoded blocks are kept in a small LRU so neighbouring
//! windows that share blocks decode them once.

use std::io::SeekFrom;
use std::num::NonZeroUsize;
use std::sync::Arc;

use log::{debug, trace};
use lru::LruCache;

use crate::compression::{CompressionFactory, CompressionHandler};
use crate::errors::{TileError, TileResult};
use crate::io::byte_order::ByteOrderHandler;
use crate::io::SeekableReader;
use crate::tiff::constants::predictor;
use crate::tiff::layout::ImageLayout;

/// Decodes blocks of one image, caching the most recently used ones
pub struct BlockReader {
    layout: ImageLayout,
    compression: Box<dyn CompressionHandler>,
    cache: LruCache<usize, Arc<Vec<u8>>>,
}

impl BlockReader {
    pub fn new(layout: ImageLayout, cache_entries: usize) -> TileResult<Self> {
        let compression = CompressionFactory::create_handler(layout.compression)?;
        debug!("Using compression: {} (code {})", compression.name(), compression.code());
        let capacity = NonZeroUsize::new(cache_entries).unwrap_or(NonZeroUsize::MIN);

        Ok(BlockReader {
            layout,
            compression,
            cache: LruCache::new(capacity),
        })
    }

    pub fn layout(&self) -> &ImageLayout {
        &self.layout
    }

    /// Decoded bytes of block `index`
    pub fn block(
        &mut self,
        reader: &mut dyn SeekableReader,
        handler: &dyn ByteOrderHandler,
        index: usize,
    ) -> TileResult<Arc<Vec<u8>>> {
        if let Some(block) = self.cache.get(&index) {
            return Ok(Arc::clone(block));
        }

        let block = Arc::new(self.decode_block(reader, handler, index)?);
        self.cache.put(index, Arc::clone(&block));
        Ok(block)
    }

    fn decode_block(
        &self,
        reader: &mut dyn SeekableReader,
        handler: &dyn ByteOrderHandler,
        index: usize,
    ) -> TileResult<Vec<u8>> {
        let offset = *self.layout.offsets.get(index)
            .ok_or_else(|| TileError::Format(format!("Block {} has no offset", index)))?;
        let byte_count = *self.layout.byte_counts.get(index)
            .ok_or_else(|| TileError::Format(format!("Block {} has no byte count", index)))?;

        let row_bytes = self.layout.block_row_bytes();
        let rows = self.layout.rows_in_block(index);
        let expected = row_bytes * rows;
        trace!("Reading block {} at offset {} ({} bytes)", index, offset, byte_count);

        // Sparse files leave missing blocks at offset 0
        if offset == 0 || byte_count == 0 {
            return Ok(vec![0u8; expected]);
        }

        // Extents were checked against the file size when the layout was read
        let byte_count = usize::try_from(byte_count)
            .map_err(|_| TileError::Format(format!("Block {} is too large ({} bytes)", index, byte_count)))?;
        reader.seek(SeekFrom::Start(offset))?;
        let mut compressed = vec![0u8; byte_count];
        reader.read_exact(&mut compressed)?;

        let mut data = self.compression.decompress(&compressed)?;
        if data.len() < expected {
            return Err(TileError::Format(format!(
                "Block {} decoded to {} bytes, expected {}", index, data.len(), expected)));
        }
        data.truncate(expected);

        if self.layout.predictor == predictor::HORIZONTAL_DIFFERENCING {
            for row in data.chunks_exact_mut(row_bytes) {
                match self.layout.band_type.size_in_bytes() {
                    1 => undo_predictor_u8(row, self.layout.samples_per_pixel),
                    _ => handler.undo_predictor_u16(row, self.layout.samples_per_pixel),
                }
            }
        }

        Ok(data)
    }
}

/// Undoes TIFF horizontal differencing on 8-bit samples in place
pub fn undo_predictor_u8(row: &mut [u8], samples_per_pixel: usize) {
    for i in samples_per_pixel..row.len() {
        row[i] = row[i].wrapping_add(row[i - samples_per_pixel]);
    }
}
