//! TIFF/BigTIFF header and IFD reader
//!
//! Parses the header, walks the IFD chain and resolves tag value arrays,
//! whether stored inline in the entry or at an offset in the file.

use log::{debug, warn};
use std::io::{Cursor, SeekFrom};

use crate::errors::{TileError, TileResult};
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::SeekableReader;
use crate::tiff::constants::{field_types, header};
use crate::tiff::ifd::{IFDEntry, IFD};

/// Upper bound on IFDs followed in one file, guards against offset loops
const MAX_IFDS: usize = 100;

/// Reader state for one TIFF file: byte order and classic/BigTIFF flavour
pub struct TiffReader {
    byte_order: ByteOrder,
    handler: Box<dyn ByteOrderHandler>,
    is_big_tiff: bool,
    file_size: u64,
}

impl TiffReader {
    /// Reads the header and every IFD in the chain
    ///
    /// # Returns
    /// The reader state (needed to resolve tag arrays and decode samples)
    /// together with the parsed IFDs, in file order
    pub fn read(reader: &mut dyn SeekableReader) -> TileResult<(TiffReader, Vec<IFD>)> {
        reader.seek(SeekFrom::Start(0))?;

        let byte_order = ByteOrder::detect(reader)?;
        debug!("Detected byte order: {}", byte_order.name());
        let handler = byte_order.create_handler();

        let version = handler.read_u16(reader)?;
        let is_big_tiff = match version {
            header::BIG_TIFF_VERSION => {
                let offset_size = handler.read_u16(reader)?;
                let reserved = handler.read_u16(reader)?;
                if offset_size != header::BIGTIFF_OFFSET_SIZE || reserved != 0 {
                    return Err(TileError::Format(format!(
                        "Invalid BigTIFF header: offset_size={}, reserved={}", offset_size, reserved)));
                }
                true
            },
            header::TIFF_VERSION => false,
            _ => return Err(TileError::Format(format!("Unsupported TIFF version: {}", version))),
        };

        let file_size = file_size(reader)?;
        let tiff = TiffReader { byte_order, handler, is_big_tiff, file_size };

        let first_ifd_offset = tiff.read_offset(reader)?;
        if first_ifd_offset < 8 || first_ifd_offset >= file_size {
            return Err(TileError::Format(format!(
                "Invalid IFD offset: {} (file size: {})", first_ifd_offset, file_size)));
        }

        let ifds = tiff.read_ifd_chain(reader, first_ifd_offset, file_size)?;
        if ifds.is_empty() {
            return Err(TileError::Format("No IFDs found in TIFF file".to_string()));
        }

        debug!("Read {} IFDs ({})", ifds.len(), if is_big_tiff { "BigTIFF" } else { "TIFF" });
        Ok((tiff, ifds))
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn handler(&self) -> &dyn ByteOrderHandler {
        self.handler.as_ref()
    }

    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }

    /// Length of the file in bytes; every stored array must fit inside it
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Rejects an out-of-line tag array that would extend past the end of the file
    fn check_tag_extent(&self, entry: &IFDEntry) -> TileResult<()> {
        if entry.is_value_inline(self.is_big_tiff) {
            return Ok(());
        }
        let end = entry.count
            .checked_mul(entry.field_type_size() as u64)
            .and_then(|size| size.checked_add(entry.value_offset));
        match end {
            Some(end) if end <= self.file_size => Ok(()),
            _ => Err(TileError::Format(format!(
                "Tag {} holds {} values at offset {}, past the end of the file ({} bytes)",
                entry.tag, entry.count, entry.value_offset, self.file_size))),
        }
    }

    fn read_offset(&self, reader: &mut dyn SeekableReader) -> TileResult<u64> {
        if self.is_big_tiff {
            Ok(self.handler.read_u64(reader)?)
        } else {
            Ok(self.handler.read_u32(reader)? as u64)
        }
    }

    fn read_ifd_chain(&self, reader: &mut dyn SeekableReader, first_offset: u64, file_size: u64) -> TileResult<Vec<IFD>> {
        let mut ifds = Vec::new();
        let mut offset = first_offset;

        while offset != 0 && ifds.len() < MAX_IFDS {
            if offset >= file_size {
                warn!("IFD offset {} exceeds file size {}, stopping IFD chain", offset, file_size);
                break;
            }

            let ifd = self.read_ifd(reader, offset, ifds.len())?;
            let next = match self.read_offset(reader) {
                Ok(next) => next,
                Err(e) => {
                    warn!("Error reading next IFD offset: {}", e);
                    ifds.push(ifd);
                    break;
                }
            };
            ifds.push(ifd);

            if next != 0 && (next < 8 || next >= file_size) {
                warn!("Invalid next IFD offset: {}, stopping IFD chain", next);
                break;
            }
            offset = next;
        }

        Ok(ifds)
    }

    /// Reads one IFD; leaves the reader positioned at the next-IFD offset field
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader, offset: u64, number: usize) -> TileResult<IFD> {
        reader.seek(SeekFrom::Start(offset))?;

        let entry_count = if self.is_big_tiff {
            self.handler.read_u64(reader)?
        } else {
            self.handler.read_u16(reader)? as u64
        };

        let mut ifd = IFD::new(number, offset);
        for _ in 0..entry_count {
            ifd.add_entry(self.read_ifd_entry(reader)?);
        }

        debug!("Read IFD #{} with {} entries", number, ifd.entries.len());
        Ok(ifd)
    }

    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader) -> TileResult<IFDEntry> {
        let tag = self.handler.read_u16(reader)?;
        let field_type = self.handler.read_u16(reader)?;
        let count = if self.is_big_tiff {
            self.handler.read_u64(reader)?
        } else {
            self.handler.read_u32(reader)? as u64
        };

        let field_width = if self.is_big_tiff { 8 } else { 4 };
        let mut inline = [0u8; 8];
        reader.read_exact(&mut inline[..field_width])?;

        let mut entry = IFDEntry::new(tag, field_type, count, 0, inline);
        let mut field = Cursor::new(inline);
        entry.value_offset = if entry.is_value_inline(self.is_big_tiff) && count > 0 {
            self.read_integer(&mut field, field_type)?
        } else {
            self.read_offset(&mut field)?
        };

        Ok(entry)
    }

    fn read_integer(&self, reader: &mut dyn SeekableReader, field_type: u16) -> TileResult<u64> {
        let value = match field_type {
            field_types::BYTE | field_types::SBYTE | field_types::UNDEFINED | field_types::ASCII => {
                let mut byte = [0u8; 1];
                reader.read_exact(&mut byte)?;
                byte[0] as u64
            },
            field_types::SHORT | field_types::SSHORT => self.handler.read_u16(reader)? as u64,
            field_types::LONG | field_types::SLONG | field_types::FLOAT => self.handler.read_u32(reader)? as u64,
            field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => self.handler.read_u64(reader)?,
            _ => return Err(TileError::Unsupported(format!("integer tag of field type {}", field_type))),
        };
        Ok(value)
    }

    fn read_real(&self, reader: &mut dyn SeekableReader, field_type: u16) -> TileResult<f64> {
        match field_type {
            field_types::DOUBLE => Ok(self.handler.read_f64(reader)?),
            field_types::FLOAT => Ok(f32::from_bits(self.handler.read_u32(reader)?) as f64),
            field_types::RATIONAL => {
                let numerator = self.handler.read_u32(reader)? as f64;
                let denominator = self.handler.read_u32(reader)? as f64;
                Ok(if denominator == 0.0 { 0.0 } else { numerator / denominator })
            },
            _ => Ok(self.read_integer(reader, field_type)? as f64),
        }
    }

    /// Reads all values of an integer tag
    pub fn read_tag_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TileResult<Vec<u64>> {
        let entry = ifd.get_entry(tag)
            .ok_or_else(|| TileError::Format(format!("Tag {} not found", tag)))?;

        self.check_tag_extent(entry)?;

        let mut values = Vec::new();
        if entry.is_value_inline(self.is_big_tiff) {
            let mut field = Cursor::new(entry.inline);
            for _ in 0..entry.count {
                values.push(self.read_integer(&mut field, entry.field_type)?);
            }
        } else {
            reader.seek(SeekFrom::Start(entry.value_offset))?;
            for _ in 0..entry.count {
                values.push(self.read_integer(reader, entry.field_type)?);
            }
        }

        Ok(values)
    }

    /// Reads all values of a tag as doubles (GeoTIFF model tags)
    pub fn read_tag_doubles(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TileResult<Vec<f64>> {
        let entry = ifd.get_entry(tag)
            .ok_or_else(|| TileError::Format(format!("Tag {} not found", tag)))?;

        self.check_tag_extent(entry)?;

        let mut values = Vec::new();
        if entry.is_value_inline(self.is_big_tiff) {
            let mut field = Cursor::new(entry.inline);
            for _ in 0..entry.count {
                values.push(self.read_real(&mut field, entry.field_type)?);
            }
        } else {
            reader.seek(SeekFrom::Start(entry.value_offset))?;
            for _ in 0..entry.count {
                values.push(self.read_real(reader, entry.field_type)?);
            }
        }

        Ok(values)
    }
}

/// Size of the underlying stream, restoring the current position
fn file_size(reader: &mut dyn SeekableReader) -> TileResult<u64> {
    let position = reader.stream_position()?;
    let size = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(position))?;
    Ok(size)
}
