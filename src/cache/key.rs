//! Cache keys for tile extraction requests

use std::path::{Path, PathBuf};

use crate::source::Interpolation;

/// Identity of one extraction request
///
/// Floating-point parameters are stored as their bit patterns so identical
/// requests hash and compare identically; `-0.0` is stored as `0.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtractionKey {
    path: PathBuf,
    extension: Option<String>,
    top_left_x: u64,
    top_left_y: u64,
    ground_size: u64,
    output_size: u32,
    interpolation: Interpolation,
}

impl ExtractionKey {
    /// An empty extension is treated as no extension
    pub fn new(
        path: &Path,
        extension: Option<&str>,
        top_left_x: f64,
        top_left_y: f64,
        ground_size: f64,
        output_size: u32,
        interpolation: Interpolation,
    ) -> Self {
        ExtractionKey {
            path: path.to_path_buf(),
            extension: extension.filter(|e| !e.is_empty()).map(str::to_string),
            top_left_x: key_bits(top_left_x),
            top_left_y: key_bits(top_left_y),
            ground_size: key_bits(ground_size),
            output_size,
            interpolation,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    pub fn top_left_x(&self) -> f64 {
        f64::from_bits(self.top_left_x)
    }

    pub fn top_left_y(&self) -> f64 {
        f64::from_bits(self.top_left_y)
    }

    pub fn ground_size(&self) -> f64 {
        f64::from_bits(self.ground_size)
    }

    pub fn output_size(&self) -> u32 {
        self.output_size
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }
}

fn key_bits(value: f64) -> u64 {
    if value == 0.0 { 0.0f64.to_bits() } else { value.to_bits() }
}
