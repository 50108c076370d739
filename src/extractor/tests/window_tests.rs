use crate::coordinate::GeoTransform;
use crate::errors::TileError;
use crate::extractor::{ClampedRegion, PixelWindow, MAX_OUTPUT_SIZE};

#[test]
fn test_from_geo_basic() {
    let transform = GeoTransform::north_up(1000.0, 5000.0, 10.0, -10.0);
    let window = PixelWindow::from_geo(&transform, 1250.0, 4500.0, 640.0, 256).unwrap();

    assert_eq!(window, PixelWindow::new(25, 50, 64, 256));
}

#[test]
fn test_from_geo_floors_negative_offsets() {
    let transform = GeoTransform::north_up(0.0, 0.0, 10.0, -10.0);
    let window = PixelWindow::from_geo(&transform, -15.0, 15.0, 100.0, 10).unwrap();

    assert_eq!(window.offset_x, -2);
    assert_eq!(window.offset_y, -2);
    assert_eq!(window.source_size, 10);
}

#[test]
fn test_from_geo_rounds_source_size() {
    let transform = GeoTransform::north_up(0.0, 0.0, 3.0, -3.0);
    assert_eq!(PixelWindow::from_geo(&transform, 0.0, 0.0, 10.0, 8).unwrap().source_size, 3);
    assert_eq!(PixelWindow::from_geo(&transform, 0.0, 0.0, 11.0, 8).unwrap().source_size, 4);
    assert_eq!(PixelWindow::from_geo(&transform, 0.0, 0.0, 1.0, 8).unwrap().source_size, 1);
}

#[test]
fn test_from_geo_rejects_bad_input() {
    let transform = GeoTransform::north_up(0.0, 0.0, 1.0, -1.0);
    assert!(matches!(PixelWindow::from_geo(&transform, 0.0, 0.0, 0.0, 8), Err(TileError::InvalidRequest(_))));
    assert!(matches!(PixelWindow::from_geo(&transform, 0.0, 0.0, 10.0, 0), Err(TileError::InvalidRequest(_))));
    assert!(matches!(PixelWindow::from_geo(&transform, 0.0, 0.0, 10.0, MAX_OUTPUT_SIZE + 1), Err(TileError::InvalidRequest(_))));
    assert!(matches!(PixelWindow::from_geo(&transform, 0.0, 0.0, 10.0, u32::MAX), Err(TileError::InvalidRequest(_))));
    assert!(PixelWindow::from_geo(&transform, 0.0, 0.0, 10.0, MAX_OUTPUT_SIZE).is_ok());

    let degenerate = GeoTransform::north_up(0.0, 0.0, 1.0, 0.0);
    assert!(matches!(PixelWindow::from_geo(&degenerate, 0.0, 0.0, 10.0, 8), Err(TileError::DegenerateGeometry(_))));
}

#[test]
fn test_region_inside_is_not_clamped() {
    let region = ClampedRegion::from_window(&PixelWindow::new(10, 20, 30, 60), 100, 100).unwrap();

    assert!(!region.is_clamped());
    assert_eq!((region.usable_x, region.usable_y, region.usable_width, region.usable_height), (10, 20, 30, 30));
    assert_eq!((region.destination_width(), region.destination_height()), (60, 60));
}

#[test]
fn test_region_clamps_each_side_independently() {
    // ratio 2: 5 source pixels over the left edge, 10 over the bottom edge
    let region = ClampedRegion::from_window(&PixelWindow::new(-5, 80, 30, 60), 100, 100).unwrap();

    assert_eq!((region.left, region.right, region.top, region.bottom), (10, 0, 0, 20));
    assert_eq!((region.usable_x, region.usable_width), (0, 25));
    assert_eq!((region.usable_y, region.usable_height), (80, 20));
    assert_eq!(region.destination_width(), 50);
    assert_eq!(region.destination_height(), 40);
}

#[test]
fn test_region_remainders_use_rounding() {
    // ratio 256 / 100: 3 px overhang -> 7.68 -> 8
    let region = ClampedRegion::from_window(&PixelWindow::new(-3, 0, 100, 256), 1000, 1000).unwrap();
    assert_eq!(region.left, 8);
    assert_eq!(region.destination_width(), 248);
}

#[test]
fn test_region_outside_raster() {
    assert!(ClampedRegion::from_window(&PixelWindow::new(100, 0, 10, 10), 100, 100).is_none());
    assert!(ClampedRegion::from_window(&PixelWindow::new(0, -10, 10, 10), 100, 100).is_none());
    assert!(ClampedRegion::from_window(&PixelWindow::new(-500, -500, 10, 10), 100, 100).is_none());
    assert!(ClampedRegion::from_window(&PixelWindow::new(i64::MAX, i64::MIN, u32::MAX, 10), 100, 100).is_none());
}

#[test]
fn test_region_padding_consuming_destination() {
    assert!(ClampedRegion::from_window(&PixelWindow::new(-19, 0, 20, 1), 100, 100).is_none());
}
