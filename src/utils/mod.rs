//! Utility modules for common functionality
//!
//! Logging, progress reporting, tile export and lock helpers used by the
//! service and the command line tool.

pub mod logger;
pub mod progress;
pub mod image_export;
pub(crate) mod sync;
