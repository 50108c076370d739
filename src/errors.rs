//! Error types for tile extraction

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors raised while locating, opening or reading raster data
#[derive(Debug)]
pub enum TileError {
    /// Neither a pyramid tile nor a direct file exists for the request
    NotFound(PathBuf),
    /// Underlying read failed (corrupt block, truncated file, unreadable band)
    Io(io::Error),
    /// Geotransform with a zero or non-finite pixel size
    DegenerateGeometry(String),
    /// Request parameters that cannot describe a tile
    InvalidRequest(String),
    /// Malformed raster container
    Format(String),
    /// Valid container using a feature this crate does not decode
    Unsupported(String),
    /// Invalid configuration file or value
    Config(String),
}

impl fmt::Display for TileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileError::NotFound(path) => write!(f, "No raster data found at {}", path.display()),
            TileError::Io(e) => write!(f, "I/O error: {}", e),
            TileError::DegenerateGeometry(msg) => write!(f, "Degenerate geotransform: {}", msg),
            TileError::InvalidRequest(msg) => write!(f, "Invalid tile request: {}", msg),
            TileError::Format(msg) => write!(f, "Malformed raster: {}", msg),
            TileError::Unsupported(msg) => write!(f, "Unsupported raster feature: {}", msg),
            TileError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for TileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TileError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TileError {
    fn from(error: io::Error) -> Self {
        TileError::Io(error)
    }
}

impl From<String> for TileError {
    fn from(msg: String) -> Self {
        TileError::Format(msg)
    }
}

/// Result type for tile operations
pub type TileResult<T> = Result<T, TileError>;
