//! Point structure for georeferenced positions

/// A position in the raster's projected coordinate system
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Easting (Web Mercator meters for pyramids)
    pub x: f64,
    /// Northing
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Point offset by `dx` east and `dy` north
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Point::new(self.x + dx, self.y + dy)
    }
}
