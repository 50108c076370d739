//! Coordinate handling for georeferenced rasters
//!
//! Affine geotransforms and the Web Mercator helpers used by the pyramid
//! locator.

mod geotransform;
mod point;
mod transform;

pub use self::geotransform::GeoTransform;
pub use self::point::Point;
pub use self::transform::{CoordinateTransformer, EARTH_CIRCUMFERENCE, MERCATOR_EXTENT, METERS_PER_DEGREE};
