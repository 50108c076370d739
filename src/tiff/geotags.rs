//! GeoTIFF georeferencing tags
//!
//! Builds the affine geotransform of an image either from the
//! ModelTransformationTag or from the ModelPixelScaleTag and
//! ModelTiepointTag pair.

use log::debug;

use crate::coordinate::GeoTransform;
use crate::errors::{TileError, TileResult};
use crate::io::SeekableReader;
use crate::tiff::constants::tags;
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;

/// Reads and validates the geotransform of an IFD
pub fn read_geotransform(tiff: &TiffReader, reader: &mut dyn SeekableReader, ifd: &IFD) -> TileResult<GeoTransform> {
    let transform = if ifd.has_tag(tags::MODEL_TRANSFORMATION_TAG) {
        let matrix = tiff.read_tag_doubles(reader, ifd, tags::MODEL_TRANSFORMATION_TAG)?;
        from_transformation_matrix(&matrix)?
    } else if ifd.has_tag(tags::MODEL_PIXEL_SCALE_TAG) && ifd.has_tag(tags::MODEL_TIEPOINT_TAG) {
        let scale = tiff.read_tag_doubles(reader, ifd, tags::MODEL_PIXEL_SCALE_TAG)?;
        let tiepoints = tiff.read_tag_doubles(reader, ifd, tags::MODEL_TIEPOINT_TAG)?;
        from_scale_and_tiepoint(&scale, &tiepoints)?
    } else {
        return Err(TileError::DegenerateGeometry("image has no georeferencing tags".to_string()));
    };

    debug!("Geotransform: {}", transform);
    transform.validate()?;
    Ok(transform)
}

/// Row-major 4x4 model transformation matrix
fn from_transformation_matrix(m: &[f64]) -> TileResult<GeoTransform> {
    if m.len() < 16 {
        return Err(TileError::Format(format!(
            "ModelTransformationTag has {} values, expected 16", m.len())));
    }
    Ok(GeoTransform::from_coefficients([m[3], m[0], m[1], m[7], m[4], m[5]]))
}

/// Pixel scale (sx, sy, sz) and the first tiepoint (i, j, k, x, y, z)
fn from_scale_and_tiepoint(scale: &[f64], tiepoints: &[f64]) -> TileResult<GeoTransform> {
    if scale.len() < 2 || tiepoints.len() < 6 {
        return Err(TileError::Format(format!(
            "ModelPixelScaleTag/ModelTiepointTag too short ({} / {} values)", scale.len(), tiepoints.len())));
    }

    let (sx, sy) = (scale[0], scale[1]);
    let (i, j) = (tiepoints[0], tiepoints[1]);
    let (x, y) = (tiepoints[3], tiepoints[4]);

    Ok(GeoTransform::north_up(x - i * sx, y + j * sy, sx, -sy))
}
