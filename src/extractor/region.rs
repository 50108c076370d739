//! Clamping of pixel windows against the raster bounds
//!
//! A window may hang over any raster edge. The part inside the raster is
//! read; the overhang becomes zero padding in the output tile. Padding is
//! measured in destination pixels using the window's single ratio, and the
//! usable destination span is whatever remains, so read data and padding
//! always add up to the tile size.

use super::window::PixelWindow;

/// Usable part of a window plus the padding around it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClampedRegion {
    /// Source-space start and size of the part inside the raster
    pub usable_x: u32,
    pub usable_y: u32,
    pub usable_width: u32,
    pub usable_height: u32,
    /// Destination-space padding on each side
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
    destination_size: u32,
}

#[derive(Debug, Clone, Copy)]
struct AxisSpan {
    start: u32,
    len: u32,
    before: u32,
    after: u32,
}

/// Clamps `[offset, offset + size)` to `[0, limit)` along one axis
fn clamp_axis(offset: i64, size: u32, limit: u32, destination: u32, ratio: f64) -> Option<AxisSpan> {
    // i128 so windows far outside the raster cannot overflow
    let start = offset as i128;
    let end = start + size as i128;
    let usable_start = start.max(0);
    let usable_end = end.min(limit as i128);
    if usable_end <= usable_start {
        return None;
    }

    let before = ((usable_start - start) as f64 * ratio).round() as u64;
    let after = ((end - usable_end) as f64 * ratio).round() as u64;
    if before + after >= destination as u64 {
        return None;
    }

    Some(AxisSpan {
        start: usable_start as u32,
        len: (usable_end - usable_start) as u32,
        before: before as u32,
        after: after as u32,
    })
}

impl ClampedRegion {
    /// Clamps `window` to a `width x height` raster
    ///
    /// Returns `None` when nothing of the window is inside the raster, or
    /// when the padding leaves no destination pixels to fill.
    pub fn from_window(window: &PixelWindow, width: u32, height: u32) -> Option<Self> {
        let ratio = window.ratio();
        let destination = window.destination_size;
        let x = clamp_axis(window.offset_x, window.source_size, width, destination, ratio)?;
        let y = clamp_axis(window.offset_y, window.source_size, height, destination, ratio)?;

        Some(ClampedRegion {
            usable_x: x.start,
            usable_y: y.start,
            usable_width: x.len,
            usable_height: y.len,
            left: x.before,
            right: x.after,
            top: y.before,
            bottom: y.after,
            destination_size: destination,
        })
    }

    /// True when any side was clamped
    pub fn is_clamped(&self) -> bool {
        self.left != 0 || self.right != 0 || self.top != 0 || self.bottom != 0
    }

    /// Destination columns filled with read data
    pub fn destination_width(&self) -> u32 {
        self.destination_size - self.left - self.right
    }

    /// Destination rows filled with read data
    pub fn destination_height(&self) -> u32 {
        self.destination_size - self.top - self.bottom
    }
}
