use crate::coordinate::GeoTransform;
use crate::errors::TileError;
use crate::extractor::{read_tile, PixelFormat, PixelWindow};
use crate::source::{BandRead, BandType, Interpolation, MemorySource, RasterSource, SampleType};

fn gradient(size: u32) -> MemorySource {
    let pixels: Vec<u8> = (0..size * size).map(|i| ((i % size) * 2 + (i / size)) as u8).collect();
    MemorySource::new(size, size, GeoTransform::north_up(0.0, size as f64, 1.0, -1.0))
        .unwrap()
        .with_byte_band(&pixels)
        .unwrap()
}

fn rgb(size: u32) -> MemorySource {
    let mut source = MemorySource::new(size, size, GeoTransform::north_up(0.0, 0.0, 1.0, -1.0)).unwrap();
    for band in 0..3u32 {
        let samples = (0..size * size).map(|i| ((i + band * 40) % 256) as f64).collect();
        source = source.with_band(BandType::Byte, samples).unwrap();
    }
    source
}

fn direct_read(source: &mut MemorySource, x: u32, y: u32, w: u32, h: u32, dw: u32, dh: u32) -> Vec<u8> {
    let read = BandRead {
        band: 1,
        src_x: x,
        src_y: y,
        src_width: w,
        src_height: h,
        dst_width: dw,
        dst_height: dh,
        sample: SampleType::U8,
        pixel_stride: 1,
        interpolation: Interpolation::Nearest,
    };
    let mut out = vec![0u8; (dw * dh) as usize];
    source.read_band(&read, &mut out).unwrap();
    out
}

#[test]
fn test_in_bounds_window_has_exact_size() {
    let mut source = gradient(64);
    let tile = read_tile(&mut source, &PixelWindow::new(8, 8, 16, 32), Interpolation::Nearest, PixelFormat::Byte).unwrap();

    assert_eq!(tile.data().len(), 32 * 32);
    assert_eq!(tile.data(), direct_read(&mut source, 8, 8, 16, 16, 32, 32).as_slice());
}

#[test]
fn test_left_edge_straddle_pads_with_zeros() {
    let mut source = gradient(100);
    let k = 10;
    let tile = read_tile(&mut source, &PixelWindow::new(-k, 0, 40, 80), Interpolation::Nearest, PixelFormat::Byte).unwrap();

    let padding = (k as f64 * 2.0).round() as usize;
    let expected = direct_read(&mut source, 0, 0, 30, 40, 60, 80);
    for row in 0..80usize {
        let line = &tile.data()[row * 80..(row + 1) * 80];
        assert!(line[..padding].iter().all(|&v| v == 0), "row {}", row);
        assert_eq!(&line[padding..], &expected[row * 60..(row + 1) * 60], "row {}", row);
    }
}

#[test]
fn test_bottom_right_straddle() {
    let mut source = gradient(100);
    let tile = read_tile(&mut source, &PixelWindow::new(90, 95, 20, 20), Interpolation::Bilinear, PixelFormat::Byte).unwrap();

    assert_eq!(tile.pixel(0, 0), Some(&[((90 * 2 + 95) % 256) as u8][..]));
    assert_eq!(tile.pixel(9, 4), Some(&[((99 * 2 + 99) % 256) as u8][..]));
    assert_eq!(tile.pixel(10, 0), Some(&[0][..]));
    assert_eq!(tile.pixel(0, 5), Some(&[0][..]));
    assert_eq!(tile.pixel(19, 19), Some(&[0][..]));
}

#[test]
fn test_window_outside_raster_reads_nothing() {
    let mut source = gradient(32);
    let tile = read_tile(&mut source, &PixelWindow::new(-100, 10, 16, 16), Interpolation::Nearest, PixelFormat::Byte).unwrap();

    assert!(tile.data().iter().all(|&v| v == 0));
    assert_eq!(tile.data().len(), 256);
    assert_eq!(source.read_count(), 0);
}

#[test]
fn test_downscale_forces_nearest() {
    let mut source = gradient(64);
    let window = PixelWindow::new(0, 0, 64, 16);
    let bilinear = read_tile(&mut source, &window, Interpolation::Bilinear, PixelFormat::Byte).unwrap();
    let nearest = read_tile(&mut source, &window, Interpolation::Nearest, PixelFormat::Byte).unwrap();

    assert_eq!(bilinear, nearest);
}

#[test]
fn test_rgb_interleaving() {
    let mut source = rgb(16);
    let tile = read_tile(&mut source, &PixelWindow::new(0, 0, 16, 16), Interpolation::Nearest, PixelFormat::Rgb).unwrap();

    assert_eq!(tile.data().len(), 16 * 16 * 3);
    assert_eq!(tile.pixel(0, 0), Some(&[0, 40, 80][..]));
    assert_eq!(tile.pixel(5, 1), Some(&[21, 61, 101][..]));
}

#[test]
fn test_rgba_padding_is_transparent() {
    let mut source = rgb(8).with_byte_band(&[255u8; 64]).unwrap();
    let tile = read_tile(&mut source, &PixelWindow::new(-4, 0, 8, 8), Interpolation::Nearest, PixelFormat::Rgba).unwrap();

    assert_eq!(tile.pixel(0, 0), Some(&[0, 0, 0, 0][..]));
    assert_eq!(tile.pixel(4, 0), Some(&[0, 40, 80, 255][..]));
}

#[test]
fn test_float_tile() {
    let samples: Vec<f64> = (0..16).map(|v| v as f64 + 0.5).collect();
    let mut source = MemorySource::new(4, 4, GeoTransform::north_up(0.0, 0.0, 1.0, -1.0))
        .unwrap()
        .with_band(BandType::Float32, samples)
        .unwrap();
    assert_eq!(PixelFormat::for_source(&source), PixelFormat::Float);

    let tile = read_tile(&mut source, &PixelWindow::new(2, 2, 4, 4), Interpolation::Nearest, PixelFormat::Float).unwrap();
    assert_eq!(tile.data().len(), 64);
    assert_eq!(tile.float_value(0, 0), Some(10.5));
    assert_eq!(tile.float_value(1, 1), Some(15.5));
    assert_eq!(tile.float_value(2, 0), Some(0.0));
}

#[test]
fn test_missing_bands_rejected() {
    let mut source = gradient(8);
    assert!(read_tile(&mut source, &PixelWindow::new(0, 0, 8, 8), Interpolation::Nearest, PixelFormat::Rgb).is_err());
}

#[test]
fn test_oversized_destination_rejected() {
    let mut source = gradient(8);
    let straddling = PixelWindow::new(-4, 0, 8, u32::MAX);
    let result = read_tile(&mut source, &straddling, Interpolation::Nearest, PixelFormat::Byte);
    assert!(matches!(result, Err(TileError::InvalidRequest(_))));

    let outside = PixelWindow::new(100, 100, 8, u32::MAX);
    let result = read_tile(&mut source, &outside, Interpolation::Nearest, PixelFormat::Float);
    assert!(matches!(result, Err(TileError::InvalidRequest(_))));
    assert_eq!(source.read_count(), 0);
}
