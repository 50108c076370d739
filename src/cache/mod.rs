//! Caching of extracted tiles
//!
//! Requests are keyed by everything that determines the output tile. The
//! cache coalesces concurrent identical requests and keeps results in a
//! pluggable, bounded store.

mod key;
mod store;
mod extraction_cache;


pub use key::ExtractionKey;
pub use store::{LruTileStore, TileStore};
pub use extraction_cache::{CacheStats, ExtractionCache};
