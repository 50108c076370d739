use crate::coordinate::GeoTransform;
use crate::extractor::{PixelFormat, RasterTile};
use crate::source::{BandType, MemorySource};

fn byte_tile(counts: &[(u8, usize)], size: u32) -> RasterTile {
    let mut data = Vec::new();
    for &(value, count) in counts {
        data.extend(std::iter::repeat(value).take(count));
    }
    data.resize((size * size) as usize, 0);
    RasterTile::new(PixelFormat::Byte, size, data).unwrap()
}

#[test]
fn test_size_in_bytes() {
    assert_eq!(PixelFormat::Byte.size_in_bytes(10), Some(10));
    assert_eq!(PixelFormat::Rgb.size_in_bytes(10), Some(30));
    assert_eq!(PixelFormat::Rgba.size_in_bytes(10), Some(40));
    assert_eq!(PixelFormat::Float.size_in_bytes(10), Some(40));
    assert_eq!(PixelFormat::Float.size_in_bytes(usize::MAX), None);
    assert_eq!(PixelFormat::Rgb.tile_bytes(4).unwrap(), 48);
}

#[test]
fn test_format_derivation() {
    let transform = GeoTransform::north_up(0.0, 0.0, 1.0, -1.0);
    let base = MemorySource::new(1, 1, transform).unwrap();

    let one = base.clone().with_byte_band(&[1]).unwrap();
    assert_eq!(PixelFormat::for_source(&one), PixelFormat::Byte);

    let three = one.clone().with_byte_band(&[2]).unwrap().with_byte_band(&[3]).unwrap();
    assert_eq!(PixelFormat::for_source(&three), PixelFormat::Rgb);

    let four = three.clone().with_byte_band(&[4]).unwrap();
    assert_eq!(PixelFormat::for_source(&four), PixelFormat::Rgba);

    let two = one.clone().with_byte_band(&[2]).unwrap();
    assert_eq!(PixelFormat::for_source(&two), PixelFormat::Float);

    let wide = base.clone().with_band(BandType::UInt16, vec![1000.0]).unwrap();
    assert_eq!(PixelFormat::for_source(&wide), PixelFormat::Float);

    let mixed = one.with_band(BandType::Int16, vec![1.0]).unwrap().with_byte_band(&[3]).unwrap();
    assert_eq!(PixelFormat::for_source(&mixed), PixelFormat::Float);

    let signed = base.with_band(BandType::Int8, vec![-5.0]).unwrap();
    assert_eq!(PixelFormat::for_source(&signed), PixelFormat::Float);
}

#[test]
fn test_tile_length_checked() {
    assert!(RasterTile::new(PixelFormat::Rgb, 2, vec![0; 11]).is_err());
    assert!(RasterTile::new(PixelFormat::Rgb, 2, vec![0; 12]).is_ok());
    assert_eq!(RasterTile::zeroed(PixelFormat::Float, 3).unwrap().data().len(), 36);
}

#[test]
fn test_histogram() {
    let tile = byte_tile(&[(7, 10), (3, 5)], 4);
    let histogram = tile.histogram().unwrap();

    assert_eq!(histogram[7], 10);
    assert_eq!(histogram[3], 5);
    assert_eq!(histogram[0], 1);
    assert_eq!(histogram.iter().sum::<u64>(), 16);
}

#[test]
fn test_histogram_only_for_byte_tiles() {
    assert!(RasterTile::zeroed(PixelFormat::Rgb, 2).unwrap().histogram().is_none());
    assert!(RasterTile::zeroed(PixelFormat::Float, 2).unwrap().most_common(3).is_none());
}

#[test]
fn test_most_common_order() {
    let tile = byte_tile(&[(7, 100), (3, 50)], 16);
    let values = tile.most_common(3).unwrap();

    // 256 - 150 zero pixels make 0 the most common value
    assert_eq!(values, vec![0, 7, 3]);

    let tile = byte_tile(&[(7, 100), (3, 50), (9, 106)], 16);
    assert_eq!(tile.most_common(2).unwrap(), vec![9, 7]);
    assert_eq!(&tile.most_common(5).unwrap()[..3], &[9, 7, 3]);
}

#[test]
fn test_most_common_ties_prefer_lower_value() {
    let tile = byte_tile(&[(200, 2), (100, 2), (50, 2), (0, 2)], 2);
    // 200 fills the first two pixels, then 100; size 2 holds four pixels
    assert_eq!(tile.most_common(2).unwrap(), vec![100, 200]);
}

#[test]
fn test_most_common_clamps_to_256_distinct_values() {
    let data: Vec<u8> = (0..=255).collect();
    let tile = RasterTile::new(PixelFormat::Byte, 16, data).unwrap();
    let values = tile.most_common(1000).unwrap();

    assert_eq!(values.len(), 256);
    assert_eq!(values, (0..=255).collect::<Vec<u8>>());
}
