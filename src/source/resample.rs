//! Resampling kernels shared by all raster sources
//!
//! Sources decode the requested source window of one band into a plane of
//! `f64` samples; [`resample_into`] maps it onto the destination grid and
//! encodes every value at the read's pixel stride.

use super::{BandRead, Interpolation};

/// Decoded samples of a source window, row-major
pub struct SamplePlane<'a> {
    pub width: usize,
    pub height: usize,
    pub samples: &'a [f64],
}

impl<'a> SamplePlane<'a> {
    pub fn new(width: usize, height: usize, samples: &'a [f64]) -> Self {
        SamplePlane { width, height, samples }
    }

    #[inline]
    fn at(&self, x: isize, y: isize) -> f64 {
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.height as isize - 1) as usize;
        self.samples[y * self.width + x]
    }
}

/// Resamples `plane` to the read's destination size and encodes it into `out`
pub fn resample_into(plane: &SamplePlane, read: &BandRead, out: &mut [u8]) {
    let dst_width = read.dst_width as usize;
    let dst_height = read.dst_height as usize;
    let scale_x = plane.width as f64 / dst_width as f64;
    let scale_y = plane.height as f64 / dst_height as f64;
    let same_size = plane.width == dst_width && plane.height == dst_height;

    for row in 0..dst_height {
        for col in 0..dst_width {
            let value = if same_size {
                plane.samples[row * plane.width + col]
            } else {
                match read.interpolation {
                    Interpolation::Nearest => nearest(plane, col, row, scale_x, scale_y),
                    Interpolation::Bilinear => bilinear(plane, col, row, scale_x, scale_y),
                    Interpolation::Cubic => cubic(plane, col, row, scale_x, scale_y),
                    Interpolation::Average => average(plane, col, row, scale_x, scale_y),
                }
            };
            let offset = (row * dst_width + col) * read.pixel_stride;
            read.sample.encode(value, &mut out[offset..]);
        }
    }
}

fn nearest(plane: &SamplePlane, col: usize, row: usize, scale_x: f64, scale_y: f64) -> f64 {
    let sx = ((col as f64 + 0.5) * scale_x).floor() as isize;
    let sy = ((row as f64 + 0.5) * scale_y).floor() as isize;
    plane.at(sx, sy)
}

/// Source coordinate of a destination pixel centre, in pixel-centre space
#[inline]
fn centre(index: usize, scale: f64) -> f64 {
    (index as f64 + 0.5) * scale - 0.5
}

fn bilinear(plane: &SamplePlane, col: usize, row: usize, scale_x: f64, scale_y: f64) -> f64 {
    let sx = centre(col, scale_x);
    let sy = centre(row, scale_y);
    let x0 = sx.floor();
    let y0 = sy.floor();
    let fx = sx - x0;
    let fy = sy - y0;
    let (x0, y0) = (x0 as isize, y0 as isize);

    let top = plane.at(x0, y0) * (1.0 - fx) + plane.at(x0 + 1, y0) * fx;
    let bottom = plane.at(x0, y0 + 1) * (1.0 - fx) + plane.at(x0 + 1, y0 + 1) * fx;
    top * (1.0 - fy) + bottom * fy
}

/// Catmull-Rom weights for the four taps around `t` in `[0, 1)`
fn catmull_rom(t: f64) -> [f64; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        (-t3 + 2.0 * t2 - t) / 2.0,
        (3.0 * t3 - 5.0 * t2 + 2.0) / 2.0,
        (-3.0 * t3 + 4.0 * t2 + t) / 2.0,
        (t3 - t2) / 2.0,
    ]
}

fn cubic(plane: &SamplePlane, col: usize, row: usize, scale_x: f64, scale_y: f64) -> f64 {
    let sx = centre(col, scale_x);
    let sy = centre(row, scale_y);
    let x0 = sx.floor();
    let y0 = sy.floor();
    let wx = catmull_rom(sx - x0);
    let wy = catmull_rom(sy - y0);
    let (x0, y0) = (x0 as isize, y0 as isize);

    let mut value = 0.0;
    for (j, weight_y) in wy.iter().enumerate() {
        let y = y0 - 1 + j as isize;
        let mut row_value = 0.0;
        for (i, weight_x) in wx.iter().enumerate() {
            row_value += plane.at(x0 - 1 + i as isize, y) * weight_x;
        }
        value += row_value * weight_y;
    }
    value
}

/// Area-weighted mean of the source pixels covered by the destination pixel
fn average(plane: &SamplePlane, col: usize, row: usize, scale_x: f64, scale_y: f64) -> f64 {
    let (x_start, x_end) = (col as f64 * scale_x, (col + 1) as f64 * scale_x);
    let (y_start, y_end) = (row as f64 * scale_y, (row + 1) as f64 * scale_y);

    let mut sum = 0.0;
    let mut total_weight = 0.0;
    let mut y = y_start.floor();
    while y < y_end {
        let weight_y = (y_end.min(y + 1.0) - y_start.max(y)).max(0.0);
        let mut x = x_start.floor();
        while x < x_end {
            let weight_x = (x_end.min(x + 1.0) - x_start.max(x)).max(0.0);
            let weight = weight_x * weight_y;
            if weight > 0.0 {
                sum += plane.at(x as isize, y as isize) * weight;
                total_weight += weight;
            }
            x += 1.0;
        }
        y += 1.0;
    }

    if total_weight > 0.0 {
        sum / total_weight
    } else {
        nearest(plane, col, row, scale_x, scale_y)
    }
}
