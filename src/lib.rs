//! Windowed tile extraction from georeferenced rasters
//!
//! Given a projected top-left corner, a ground size and an output size,
//! [`TileService`] maps the request onto source pixels, prefers a pre-built
//! pyramid tile when one exists, resamples the window into a packed
//! [`RasterTile`] and caches the result with single-flight semantics.

pub mod io;
pub mod tiff;
pub mod utils;
pub mod compression;
pub mod coordinate;
pub mod source;
pub mod extractor;
pub mod cache;
pub mod config;
pub mod errors;
pub mod commands;
pub mod api;

pub use crate::api::{SourceInfo, SourcePool, TileService};
pub use crate::config::TileConfig;
pub use crate::errors::{TileError, TileResult};

pub use cache::{CacheStats, ExtractionCache, ExtractionKey};
pub use coordinate::GeoTransform;
pub use extractor::{PixelFormat, PixelWindow, PyramidLocator, RasterTile};
pub use source::{Interpolation, RasterSource, SourceProvider};
