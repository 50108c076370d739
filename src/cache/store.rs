//! Storage backends for extracted tiles

use std::sync::Arc;

use log::trace;
use lru::LruCache;

use crate::extractor::RasterTile;
use super::key::ExtractionKey;

/// Key-value storage behind the extraction cache
///
/// Implementations need no internal locking: the cache serialises every
/// call under its own mutex.
pub trait TileStore: Send {
    fn get(&mut self, key: &ExtractionKey) -> Option<Arc<RasterTile>>;

    /// Stores `tile`, returning how many entries were evicted to make room
    fn put(&mut self, key: ExtractionKey, tile: Arc<RasterTile>) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes of pixel data held
    fn size_bytes(&self) -> usize;

    fn clear(&mut self);
}

/// Least-recently-used store bounded by total pixel bytes
pub struct LruTileStore {
    capacity_bytes: usize,
    current_bytes: usize,
    entries: LruCache<ExtractionKey, Arc<RasterTile>>,
}

impl LruTileStore {
    pub fn new(capacity_bytes: usize) -> Self {
        LruTileStore {
            capacity_bytes,
            current_bytes: 0,
            entries: LruCache::unbounded(),
        }
    }

    pub fn capacity_bytes(&self) -> usize {
        self.capacity_bytes
    }
}

impl TileStore for LruTileStore {
    fn get(&mut self, key: &ExtractionKey) -> Option<Arc<RasterTile>> {
        self.entries.get(key).map(Arc::clone)
    }

    fn put(&mut self, key: ExtractionKey, tile: Arc<RasterTile>) -> usize {
        let size_bytes = tile.data().len();
        if size_bytes > self.capacity_bytes {
            trace!("Tile of {} bytes exceeds cache capacity {}", size_bytes, self.capacity_bytes);
            return 0;
        }

        if let Some(old) = self.entries.pop(&key) {
            self.current_bytes = self.current_bytes.saturating_sub(old.data().len());
        }

        let mut evicted = 0;
        while self.current_bytes + size_bytes > self.capacity_bytes {
            match self.entries.pop_lru() {
                Some((_key, old)) => {
                    self.current_bytes = self.current_bytes.saturating_sub(old.data().len());
                    evicted += 1;
                },
                None => break,
            }
        }

        self.current_bytes += size_bytes;
        self.entries.put(key, tile);
        evicted
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn size_bytes(&self) -> usize {
        self.current_bytes
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.current_bytes = 0;
    }
}
