//! Affine geotransform of a raster
//!
//! Maps pixel/line space to georeferenced space using the usual six
//! coefficients: `x = origin_x + col * pixel_size_x + row * rotation_x` and
//! `y = origin_y + col * rotation_y + row * pixel_size_y`.

use std::fmt;

use crate::errors::{TileError, TileResult};
use super::point::Point;

/// Six-coefficient affine transform from pixel space to geo space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub pixel_size_x: f64,
    pub rotation_x: f64,
    pub origin_y: f64,
    pub rotation_y: f64,
    /// Usually negative for north-up rasters
    pub pixel_size_y: f64,
}

impl GeoTransform {
    /// North-up transform without rotation
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_size_x: f64, pixel_size_y: f64) -> Self {
        GeoTransform {
            origin_x,
            pixel_size_x,
            rotation_x: 0.0,
            origin_y,
            rotation_y: 0.0,
            pixel_size_y,
        }
    }

    /// Builds a transform from the conventional coefficient array
    /// `[origin_x, pixel_size_x, rotation_x, origin_y, rotation_y, pixel_size_y]`
    pub fn from_coefficients(c: [f64; 6]) -> Self {
        GeoTransform {
            origin_x: c[0],
            pixel_size_x: c[1],
            rotation_x: c[2],
            origin_y: c[3],
            rotation_y: c[4],
            pixel_size_y: c[5],
        }
    }

    pub fn coefficients(&self) -> [f64; 6] {
        [self.origin_x, self.pixel_size_x, self.rotation_x,
         self.origin_y, self.rotation_y, self.pixel_size_y]
    }

    /// Rejects transforms whose pixel sizes cannot map ground distance to pixels
    ///
    /// Columns must run east (`pixel_size_x > 0`); rows may run either way
    /// since only `|pixel_size_y|` is used.
    pub fn validate(&self) -> TileResult<()> {
        if !(self.pixel_size_x > 0.0) || !self.pixel_size_x.is_finite() {
            return Err(TileError::DegenerateGeometry(format!("pixel_size_x is {}", self.pixel_size_x)));
        }
        if self.pixel_size_y == 0.0 || !self.pixel_size_y.is_finite() {
            return Err(TileError::DegenerateGeometry(format!("pixel_size_y is {}", self.pixel_size_y)));
        }
        if !self.origin_x.is_finite() || !self.origin_y.is_finite() {
            return Err(TileError::DegenerateGeometry("origin is not finite".to_string()));
        }
        Ok(())
    }

    /// Geo position of the top-left corner of pixel `(col, row)`
    pub fn pixel_to_geo(&self, col: f64, row: f64) -> Point {
        Point::new(
            self.origin_x + col * self.pixel_size_x + row * self.rotation_x,
            self.origin_y + col * self.rotation_y + row * self.pixel_size_y,
        )
    }
}

impl fmt::Display for GeoTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "origin ({}, {}), pixel size ({}, {})",
               self.origin_x, self.origin_y, self.pixel_size_x, self.pixel_size_y)?;
        if self.rotation_x != 0.0 || self.rotation_y != 0.0 {
            write!(f, ", rotation ({}, {})", self.rotation_x, self.rotation_y)?;
        }
        Ok(())
    }
}
