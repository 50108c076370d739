//! Byte order handling for TIFF containers
//!
//! Header fields and pixel samples are stored in the byte order announced by
//! the first two bytes of the file. Each order gets its own handler so the
//! rest of the reader never branches on endianness.

use byteorder::{BigEndian, ByteOrder as Endian, LittleEndian, ReadBytesExt};
use std::io::Result;

use crate::errors::{TileError, TileResult};
use crate::io::SeekableReader;
use crate::source::BandType;

/// Byte order of a TIFF file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// "II" (Intel)
    LittleEndian,
    /// "MM" (Motorola)
    BigEndian,
}

impl ByteOrder {
    /// Detects the byte order from the two-byte TIFF marker
    pub fn detect(reader: &mut dyn SeekableReader) -> TileResult<Self> {
        let marker = reader.read_u16::<LittleEndian>()?;
        match marker {
            0x4949 => Ok(ByteOrder::LittleEndian),
            0x4D4D => Ok(ByteOrder::BigEndian),
            _ => Err(TileError::Format(format!("Invalid byte order marker: {:#06x}", marker))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "Little Endian (II)",
            ByteOrder::BigEndian => "Big Endian (MM)",
        }
    }

    /// Creates the handler for this byte order
    pub fn create_handler(&self) -> Box<dyn ByteOrderHandler> {
        match self {
            ByteOrder::LittleEndian => Box::new(LittleEndianHandler),
            ByteOrder::BigEndian => Box::new(BigEndianHandler),
        }
    }
}

/// Strategy for reading header values and decoding pixel samples
pub trait ByteOrderHandler: Send + Sync {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16>;

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32>;

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64>;

    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64>;

    /// Decodes one pixel sample of the given type from the start of `bytes`
    ///
    /// `bytes` must hold at least `band_type.size_in_bytes()` bytes.
    fn decode_sample(&self, bytes: &[u8], band_type: BandType) -> f64;

    /// Undoes TIFF horizontal differencing on 16-bit samples in place
    fn undo_predictor_u16(&self, row: &mut [u8], samples_per_pixel: usize);
}

/// Little-endian byte order handler
pub struct LittleEndianHandler;

impl ByteOrderHandler for LittleEndianHandler {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<LittleEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<LittleEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<LittleEndian>()
    }

    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64> {
        reader.read_f64::<LittleEndian>()
    }

    fn decode_sample(&self, bytes: &[u8], band_type: BandType) -> f64 {
        decode_with::<LittleEndian>(bytes, band_type)
    }

    fn undo_predictor_u16(&self, row: &mut [u8], samples_per_pixel: usize) {
        undo_predictor_u16_with::<LittleEndian>(row, samples_per_pixel)
    }
}

/// Big-endian byte order handler
pub struct BigEndianHandler;

impl ByteOrderHandler for BigEndianHandler {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<BigEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<BigEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<BigEndian>()
    }

    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64> {
        reader.read_f64::<BigEndian>()
    }

    fn decode_sample(&self, bytes: &[u8], band_type: BandType) -> f64 {
        decode_with::<BigEndian>(bytes, band_type)
    }

    fn undo_predictor_u16(&self, row: &mut [u8], samples_per_pixel: usize) {
        undo_predictor_u16_with::<BigEndian>(row, samples_per_pixel)
    }
}

fn decode_with<E: Endian>(bytes: &[u8], band_type: BandType) -> f64 {
    match band_type {
        BandType::Byte => bytes[0] as f64,
        BandType::Int8 => bytes[0] as i8 as f64,
        BandType::UInt16 => E::read_u16(bytes) as f64,
        BandType::Int16 => E::read_i16(bytes) as f64,
        BandType::UInt32 => E::read_u32(bytes) as f64,
        BandType::Int32 => E::read_i32(bytes) as f64,
        BandType::Float32 => E::read_f32(bytes) as f64,
        BandType::Float64 => E::read_f64(bytes),
    }
}

fn undo_predictor_u16_with<E: Endian>(row: &mut [u8], samples_per_pixel: usize) {
    let stride = samples_per_pixel * 2;
    let mut i = stride;
    while i + 2 <= row.len() {
        let previous = E::read_u16(&row[i - stride..]);
        let current = E::read_u16(&row[i..]);
        E::write_u16(&mut row[i..], current.wrapping_add(previous));
        i += 2;
    }
}
