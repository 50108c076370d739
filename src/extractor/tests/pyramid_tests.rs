use std::path::{Path, PathBuf};

use crate::coordinate::{EARTH_CIRCUMFERENCE, MERCATOR_EXTENT};
use crate::extractor::{PyramidLocator, TileIndex, MAX_ZOOM};

#[test]
fn test_zoom_for_exact_power_of_two() {
    let locator = PyramidLocator::default();
    for k in 0..12 {
        let ground = EARTH_CIRCUMFERENCE / 2f64.powi(k);
        assert_eq!(locator.zoom_level(0.0, ground), k as u32 + 1, "k = {}", k);
    }
}

#[test]
fn test_zoom_drops_towards_the_poles() {
    let locator = PyramidLocator::default();
    // cos(latitude) shrinks the parallel, so a fixed ground size needs a lower level further north
    let equator = locator.zoom_level(0.0, 1000.0);
    let north = locator.zoom_level(15_000_000.0, 1000.0);
    assert!(north < equator);
}

#[test]
fn test_zoom_clamped() {
    let locator = PyramidLocator::default();
    assert_eq!(locator.zoom_level(0.0, EARTH_CIRCUMFERENCE * 100.0), 0);
    assert_eq!(locator.zoom_level(0.0, 1e-9), MAX_ZOOM);
}

#[test]
fn test_locate_quadrants() {
    let locator = PyramidLocator::default();
    let ground = EARTH_CIRCUMFERENCE / 2.0;

    // zoom 2: 4 x 4 tiles, rows counted from the north edge
    let index = locator.locate(-MERCATOR_EXTENT, 1.0, ground);
    assert_eq!(index, TileIndex { zoom: 2, x: 0, y: 1 });

    let index = locator.locate(1.0, -1.0, ground);
    assert_eq!(index, TileIndex { zoom: 2, x: 2, y: 2 });
}

#[test]
fn test_locate_clamps_to_last_tile() {
    let locator = PyramidLocator::default();
    let index = locator.locate(MERCATOR_EXTENT * 2.0, -MERCATOR_EXTENT * 2.0, 1000.0);
    let last = (1u64 << index.zoom) - 1;

    assert_eq!(index.x, last);
    assert_eq!(index.y, last);
}

#[test]
fn test_paths() {
    let locator = PyramidLocator::default();
    let base = Path::new("/data/world.v2");

    let root = locator.pyramid_root(base);
    assert_eq!(root, PathBuf::from("/data/world.v2.pyramid"));

    let tile = locator.tile_path(&root, &TileIndex { zoom: 3, x: 5, y: 1 }, Some("tif"));
    assert_eq!(tile, PathBuf::from("/data/world.v2.pyramid/3/5/1.tif"));

    assert_eq!(locator.direct_path(base, Some("tif")), PathBuf::from("/data/world.v2.tif"));
    assert_eq!(locator.direct_path(base, None), PathBuf::from("/data/world.v2"));
}

#[test]
fn test_custom_suffix() {
    let locator = PyramidLocator::new("tiles", MERCATOR_EXTENT);
    assert_eq!(locator.pyramid_root(Path::new("a/b")), PathBuf::from("a/b.tiles"));
}
