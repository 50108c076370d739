//! Single-flight cache of extracted tiles
//!
//! The first caller for a key computes the tile outside the lock; callers
//! arriving while that computation runs wait for it and receive the same
//! `Arc`. Successful results are stored in the backing [`TileStore`];
//! failures are handed to the waiters but never stored.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use log::{debug, trace};

use crate::extractor::RasterTile;
use crate::utils::sync::lock;
use super::key::ExtractionKey;
use super::store::{LruTileStore, TileStore};

/// Result slot of one running computation
struct InFlight {
    result: Mutex<Option<Option<Arc<RasterTile>>>>,
    ready: Condvar,
}

impl InFlight {
    fn new() -> Self {
        InFlight {
            result: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    fn complete(&self, result: Option<Arc<RasterTile>>) {
        *lock(&self.result) = Some(result);
        self.ready.notify_all();
    }

    fn wait(&self) -> Option<Arc<RasterTile>> {
        let mut slot = lock(&self.result);
        loop {
            if let Some(result) = slot.as_ref() {
                return result.clone();
            }
            slot = self.ready.wait(slot).unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }
}

struct CacheState {
    store: Box<dyn TileStore>,
    in_flight: HashMap<ExtractionKey, Arc<InFlight>>,
}

#[derive(Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    evictions: AtomicU64,
}

/// Snapshot of cache activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests served from the store
    pub hits: u64,
    /// Requests that ran a computation
    pub misses: u64,
    /// Requests that waited for another caller's computation
    pub coalesced: u64,
    /// Entries dropped by the store to make room
    pub evictions: u64,
    pub entries: usize,
    pub size_bytes: usize,
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} hits, {} misses, {} coalesced, {} evictions, {} entries ({} bytes)",
               self.hits, self.misses, self.coalesced, self.evictions, self.entries, self.size_bytes)
    }
}

/// Keyed tile cache with single-flight computation
pub struct ExtractionCache {
    state: Mutex<CacheState>,
    counters: CacheCounters,
}

/// Releases the in-flight slot of a leader on every exit path
struct FlightGuard<'a> {
    cache: &'a ExtractionCache,
    key: &'a ExtractionKey,
    flight: Arc<InFlight>,
    result: Option<Arc<RasterTile>>,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let result = self.result.take();
        {
            let mut state = lock(&self.cache.state);
            state.in_flight.remove(self.key);
            if let Some(tile) = &result {
                let evicted = state.store.put(self.key.clone(), Arc::clone(tile));
                if evicted > 0 {
                    self.cache.counters.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
                    trace!("Evicted {} tiles", evicted);
                }
            }
        }
        self.flight.complete(result);
    }
}

impl ExtractionCache {
    /// Cache over a byte-bounded LRU store
    pub fn new(capacity_bytes: usize) -> Self {
        Self::with_store(Box::new(LruTileStore::new(capacity_bytes)))
    }

    /// Cache over a caller-supplied store
    pub fn with_store(store: Box<dyn TileStore>) -> Self {
        ExtractionCache {
            state: Mutex::new(CacheState {
                store,
                in_flight: HashMap::new(),
            }),
            counters: CacheCounters::default(),
        }
    }

    /// Returns the tile for `key`, computing it at most once across concurrent callers
    ///
    /// `compute` runs without any cache lock held. A `None` result is passed
    /// to every waiter and not stored, so the next request retries. If
    /// `compute` panics the waiters receive `None`.
    pub fn get_or_compute<F>(&self, key: &ExtractionKey, compute: F) -> Option<Arc<RasterTile>>
    where
        F: FnOnce() -> Option<Arc<RasterTile>>,
    {
        let flight = {
            let mut state = lock(&self.state);
            if let Some(tile) = state.store.get(key) {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                return Some(tile);
            }

            if let Some(flight) = state.in_flight.get(key) {
                self.counters.coalesced.fetch_add(1, Ordering::Relaxed);
                let flight = Arc::clone(flight);
                drop(state);
                trace!("Waiting for in-flight extraction of {}", key.path().display());
                return flight.wait();
            }

            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            let flight = Arc::new(InFlight::new());
            state.in_flight.insert(key.clone(), Arc::clone(&flight));
            flight
        };

        let mut guard = FlightGuard {
            cache: self,
            key,
            flight,
            result: None,
        };
        let result = compute();
        guard.result = result.clone();
        drop(guard);

        if result.is_none() {
            debug!("Extraction for {} produced no tile", key.path().display());
        }
        result
    }

    /// Stored tile for `key`, without computing
    pub fn get(&self, key: &ExtractionKey) -> Option<Arc<RasterTile>> {
        let tile = lock(&self.state).store.get(key);
        if tile.is_some() {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
        }
        tile
    }

    /// Drops every stored tile; running computations are unaffected
    pub fn clear(&self) {
        lock(&self.state).store.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let state = lock(&self.state);
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            coalesced: self.counters.coalesced.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            entries: state.store.len(),
            size_bytes: state.store.size_bytes(),
        }
    }

    /// Number of computations currently running
    pub fn in_flight(&self) -> usize {
        lock(&self.state).in_flight.len()
    }
}
