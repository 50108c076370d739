//! Low-level I/O helpers for raster containers
//!
//! Byte order strategies and the reader bound shared by every
//! file-backed raster source.

pub mod byte_order;

use std::io::{Read, Seek};

/// Readers that can both read and seek, and move between worker threads
pub trait SeekableReader: Read + Seek + Send + Sync {}

impl<T: Read + Seek + Send + Sync> SeekableReader for T {}
