//! Web Mercator helpers used to pick pyramid levels

use std::f64::consts::PI;

/// Half the width of the Web Mercator plane in meters
pub const MERCATOR_EXTENT: f64 = 20037508.3427892;

/// Equatorial circumference in meters
pub const EARTH_CIRCUMFERENCE: f64 = 40075016.686;

/// Meters per degree of longitude at the equator
pub const METERS_PER_DEGREE: f64 = 111319.49;

/// Transformer for Web Mercator positions
pub struct CoordinateTransformer;

impl CoordinateTransformer {
    /// Latitude in radians of a Web Mercator northing
    ///
    /// `lat = 2 * atan(exp(y * pi / (METERS_PER_DEGREE * 180))) - pi / 2`
    pub fn latitude_from_mercator_y(y: f64) -> f64 {
        (y * PI / (METERS_PER_DEGREE * 180.0)).exp().atan() * 2.0 - PI / 2.0
    }

    /// Position normalised to `[0, 1]` across the projection extent
    ///
    /// Rows grow southwards, so the y axis is flipped: the north edge maps to 0.
    pub fn normalize(x: f64, y: f64, extent: f64) -> (f64, f64) {
        let width = 2.0 * extent;
        let norm_x = (x + extent) / width;
        let norm_y = 1.0 - (y + extent) / width;
        (norm_x.clamp(0.0, 1.0), norm_y.clamp(0.0, 1.0))
    }

    /// Ground width in meters of the whole world at the given latitude
    pub fn parallel_length(latitude: f64) -> f64 {
        EARTH_CIRCUMFERENCE * latitude.cos()
    }
}
