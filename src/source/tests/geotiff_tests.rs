use std::io::Cursor;
use std::path::Path;

use crate::errors::TileError;
use crate::source::{BandRead, BandType, GeoTiffProvider, GeoTiffSource, Interpolation, RasterSource, SampleType, SourceProvider};
use crate::tiff::constants::tags;
use crate::tiff::tests::test_utils::{Blocks, Sample, TiffFixture};

fn open(fixture: &TiffFixture) -> GeoTiffSource {
    GeoTiffSource::from_reader(Box::new(Cursor::new(fixture.build())), 8).unwrap()
}

fn full_read(source: &GeoTiffSource, band: usize, sample: SampleType) -> BandRead {
    let (width, height) = source.dimensions();
    BandRead {
        band,
        src_x: 0,
        src_y: 0,
        src_width: width,
        src_height: height,
        dst_width: width,
        dst_height: height,
        sample,
        pixel_stride: sample.size_in_bytes(),
        interpolation: Interpolation::Nearest,
    }
}

#[test]
fn test_metadata() {
    let source = open(&TiffFixture::color(30, 20, 4).with_blocks(Blocks::Tiles(16, 16)));

    assert_eq!(source.dimensions(), (30, 20));
    assert_eq!(source.band_count(), 4);
    assert_eq!(source.band_type(4), Some(BandType::Byte));
    assert_eq!(source.band_type(5), None);
    assert_eq!(source.geotransform().pixel_size_y, -1.0);
}

#[test]
fn test_window_read_across_tiles() {
    let mut source = open(&TiffFixture::gradient(40, 40).with_blocks(Blocks::Tiles(16, 16)).deflate(true));
    let read = BandRead {
        band: 1,
        src_x: 14,
        src_y: 14,
        src_width: 4,
        src_height: 4,
        dst_width: 4,
        dst_height: 4,
        sample: SampleType::U8,
        pixel_stride: 1,
        interpolation: Interpolation::Nearest,
    };
    let mut out = vec![0u8; 16];
    source.read_band(&read, &mut out).unwrap();

    for row in 0..4u32 {
        for col in 0..4u32 {
            let expected = ((14 + col) + (14 + row) * 40) % 256;
            assert_eq!(out[(row * 4 + col) as usize] as u32, expected);
        }
    }
}

#[test]
fn test_second_band_of_rgb() {
    let mut source = open(&TiffFixture::color(8, 8, 3).big_endian().big_tiff());
    let read = full_read(&source, 2, SampleType::U8);
    let mut out = vec![0u8; 64];
    source.read_band(&read, &mut out).unwrap();

    assert_eq!(out[0], 50);
    assert_eq!(out[8 * 3 + 5], (5 + 3 + 50) as u8);
}

#[test]
fn test_float_band_read_as_f32() {
    let samples: Vec<f64> = (0..16).map(|v| v as f64 * -1.5).collect();
    let mut source = open(&TiffFixture::gray(4, 4, samples.clone()).with_sample(Sample::F32));
    assert_eq!(source.band_type(1), Some(BandType::Float32));

    let read = full_read(&source, 1, SampleType::F32);
    let mut out = vec![0u8; 64];
    source.read_band(&read, &mut out).unwrap();

    let values: Vec<f32> = out.chunks(4).map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]])).collect();
    assert_eq!(values[15], -22.5);
    assert_eq!(values[1], -1.5);
}

#[test]
fn test_signed_16_bit_band() {
    let samples: Vec<f64> = vec![-100.0, 0.0, 100.0, 32000.0];
    let mut source = open(&TiffFixture::gray(2, 2, samples).with_sample(Sample::I16).deflate(true));
    assert_eq!(source.band_type(1), Some(BandType::Int16));

    let read = full_read(&source, 1, SampleType::F32);
    let mut out = vec![0u8; 16];
    source.read_band(&read, &mut out).unwrap();
    assert_eq!(f32::from_ne_bytes([out[0], out[1], out[2], out[3]]), -100.0);
    assert_eq!(f32::from_ne_bytes([out[12], out[13], out[14], out[15]]), 32000.0);
}

#[test]
fn test_provider_missing_file_is_not_found() {
    let provider = GeoTiffProvider::default();
    let result = provider.open(Path::new("/nonexistent/raster.tif"));
    assert!(matches!(result, Err(TileError::NotFound(_))));
}

#[test]
fn test_signed_8_bit_band() {
    let samples: Vec<f64> = vec![-1.0, -128.0, 0.0, 127.0];
    let mut source = open(&TiffFixture::gray(2, 2, samples).with_sample(Sample::I8).deflate(true));
    assert_eq!(source.band_type(1), Some(BandType::Int8));

    let read = full_read(&source, 1, SampleType::F32);
    let mut out = vec![0u8; 16];
    source.read_band(&read, &mut out).unwrap();
    let values: Vec<f32> = out.chunks_exact(4)
        .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    assert_eq!(values, vec![-1.0, -128.0, 0.0, 127.0]);
}

#[test]
fn test_tag_count_larger_than_file_is_format_error() {
    let fixture = TiffFixture::gradient(8, 8).with_tag_count(tags::MODEL_PIXEL_SCALE_TAG, u32::MAX as u64);
    let result = GeoTiffSource::from_reader(Box::new(Cursor::new(fixture.build())), 8);
    assert!(matches!(result, Err(TileError::Format(_))));
}

#[test]
fn test_block_larger_than_file_is_format_error() {
    let fixture = TiffFixture::gradient(8, 8).with_byte_count(1 << 40).big_tiff();
    let result = GeoTiffSource::from_reader(Box::new(Cursor::new(fixture.build())), 8);
    assert!(matches!(result, Err(TileError::Format(_))));
}
