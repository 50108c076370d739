//! Image File Directory (IFD) structures
//!
//! An IFD is the tag table describing one image in a TIFF file. The raster
//! source only needs a handful of tags, so entries are kept in a map keyed by
//! tag number alongside the raw entry list.

use std::collections::HashMap;
use std::fmt;
use log::trace;

use crate::tiff::constants::{field_types, new_subfile_type, tags};

/// One tag entry of an IFD
#[derive(Debug, Clone)]
pub struct IFDEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// First value when stored inline, otherwise the offset of the value array
    pub value_offset: u64,
    /// Raw value field as stored in the file (4 bytes used for classic TIFF)
    pub inline: [u8; 8],
}

impl IFDEntry {
    pub fn new(tag: u16, field_type: u16, count: u64, value_offset: u64, inline: [u8; 8]) -> Self {
        IFDEntry {
            tag,
            field_type,
            count,
            value_offset,
            inline,
        }
    }

    /// Size in bytes of one value of this entry's field type
    pub fn field_type_size(&self) -> usize {
        field_type_size(self.field_type)
    }

    /// Whether the values fit in the entry's value field
    pub fn is_value_inline(&self, is_big_tiff: bool) -> bool {
        let total_size = (self.field_type_size() as u64).saturating_mul(self.count);
        let inline_size = if is_big_tiff { 8 } else { 4 };
        total_size <= inline_size
    }
}

/// Size in bytes of one value of a TIFF field type
pub fn field_type_size(field_type: u16) -> usize {
    match field_type {
        field_types::BYTE | field_types::ASCII | field_types::SBYTE | field_types::UNDEFINED => 1,
        field_types::SHORT | field_types::SSHORT => 2,
        field_types::LONG | field_types::SLONG | field_types::FLOAT => 4,
        field_types::RATIONAL | field_types::SRATIONAL | field_types::DOUBLE => 8,
        field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => 8,
        _ => 1,
    }
}

/// Image File Directory
#[derive(Debug, Clone)]
pub struct IFD {
    /// Entries in file order
    pub entries: Vec<IFDEntry>,
    /// IFD number (0-based)
    pub number: usize,
    /// Offset of this IFD in the file
    pub offset: u64,
    tag_map: HashMap<u16, IFDEntry>,
}

impl IFD {
    pub fn new(number: usize, offset: u64) -> Self {
        IFD {
            entries: Vec::new(),
            number,
            offset,
            tag_map: HashMap::new(),
        }
    }

    pub fn add_entry(&mut self, entry: IFDEntry) {
        self.tag_map.insert(entry.tag, entry.clone());
        self.entries.push(entry);
    }

    /// Value of a single-valued tag
    pub fn get_tag_value(&self, tag: u16) -> Option<u64> {
        let value = self.tag_map.get(&tag).map(|entry| entry.value_offset);
        trace!("IFD #{} tag {} -> {:?}", self.number, tag, value);
        value
    }

    pub fn has_tag(&self, tag: u16) -> bool {
        self.tag_map.contains_key(&tag)
    }

    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        self.tag_map.get(&tag)
    }

    /// Width and height of the image, if both tags are present
    pub fn get_dimensions(&self) -> Option<(u64, u64)> {
        let width = self.get_tag_value(tags::IMAGE_WIDTH)?;
        let height = self.get_tag_value(tags::IMAGE_LENGTH)?;
        Some((width, height))
    }

    /// Samples per pixel, 1 when the tag is absent
    pub fn get_samples_per_pixel(&self) -> u64 {
        self.get_tag_value(tags::SAMPLES_PER_PIXEL).unwrap_or(1)
    }

    /// True for full-resolution images (not overviews or masks)
    pub fn is_full_resolution(&self) -> bool {
        let subfile = self.get_tag_value(tags::NEW_SUBFILE_TYPE).unwrap_or(0);
        subfile & (new_subfile_type::REDUCED_RESOLUTION | new_subfile_type::TRANSPARENCY_MASK) == 0
    }

    /// True when pixel data is organised in tiles rather than strips
    pub fn is_tiled(&self) -> bool {
        self.has_tag(tags::TILE_WIDTH) && self.has_tag(tags::TILE_LENGTH)
    }
}

impl fmt::Display for IFD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IFD #{} (offset: {})", self.number, self.offset)?;
        if let Some((width, height)) = self.get_dimensions() {
            writeln!(f, "  Dimensions: {}x{}", width, height)?;
        }
        writeln!(f, "  Samples per pixel: {}", self.get_samples_per_pixel())?;
        write!(f, "  Layout: {}", if self.is_tiled() { "tiled" } else { "stripped" })
    }
}
