//! In-memory GeoTIFF builder for tests
//!
//! Only depends on `byteorder`, `flate2` and std so the integration tests can
//! include this file as well.
#![allow(dead_code)]

use std::io::{Cursor, Write};

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use flate2::write::ZlibEncoder;
use flate2::Compression;

/// How pixel data is split into blocks
#[derive(Debug, Clone, Copy)]
pub enum Blocks {
    Strips(u32),
    Tiles(u32, u32),
}

/// Georeferencing tags written into the IFD
#[derive(Debug, Clone, Copy)]
pub enum Georef {
    /// ModelPixelScale + ModelTiepoint: origin x, origin y, pixel width, pixel height
    ScaleTiepoint(f64, f64, f64, f64),
    /// ModelTransformation from `[origin_x, psx, rot_x, origin_y, rot_y, psy]`
    Matrix([f64; 6]),
    None,
}

/// Sample encoding of the fixture
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    U8,
    I8,
    U16,
    I16,
    F32,
}

impl Sample {
    fn bits(&self) -> u16 {
        match self {
            Sample::U8 | Sample::I8 => 8,
            Sample::U16 | Sample::I16 => 16,
            Sample::F32 => 32,
        }
    }

    fn format(&self) -> u16 {
        match self {
            Sample::U8 | Sample::U16 => 1,
            Sample::I8 | Sample::I16 => 2,
            Sample::F32 => 3,
        }
    }

    fn size(&self) -> usize {
        self.bits() as usize / 8
    }
}

enum Value {
    Short(Vec<u16>),
    Long(Vec<u32>),
    Long8(Vec<u64>),
    Double(Vec<f64>),
}

impl Value {
    fn field_type(&self) -> u16 {
        match self {
            Value::Short(_) => 3,
            Value::Long(_) => 4,
            Value::Long8(_) => 16,
            Value::Double(_) => 12,
        }
    }

    fn count(&self) -> usize {
        match self {
            Value::Short(v) => v.len(),
            Value::Long(v) => v.len(),
            Value::Long8(v) => v.len(),
            Value::Double(v) => v.len(),
        }
    }

    fn encode<E: ByteOrder>(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            Value::Short(v) => v.iter().for_each(|x| out.write_u16::<E>(*x).unwrap()),
            Value::Long(v) => v.iter().for_each(|x| out.write_u32::<E>(*x).unwrap()),
            Value::Long8(v) => v.iter().for_each(|x| out.write_u64::<E>(*x).unwrap()),
            Value::Double(v) => v.iter().for_each(|x| out.write_f64::<E>(*x).unwrap()),
        }
        out
    }
}

/// Description of a single-image GeoTIFF
#[derive(Debug, Clone)]
pub struct TiffFixture {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u16,
    pub sample: Sample,
    /// Interleaved samples, `width * height * samples_per_pixel`
    pub samples: Vec<f64>,
    pub blocks: Blocks,
    pub deflate: bool,
    pub predictor: bool,
    pub big_tiff: bool,
    pub big_endian: bool,
    pub georef: Georef,
    /// Counts written in place of the real ones, to describe corrupt files
    pub count_overrides: Vec<(u16, u64)>,
    /// Byte count written for every block instead of its real size
    pub byte_count_override: Option<u64>,
}

impl TiffFixture {
    /// Single-band 8-bit raster, one strip, 1 m pixels with origin (0, height)
    pub fn gray(width: u32, height: u32, samples: Vec<f64>) -> Self {
        TiffFixture {
            width,
            height,
            samples_per_pixel: 1,
            sample: Sample::U8,
            samples,
            blocks: Blocks::Strips(height),
            deflate: false,
            predictor: false,
            big_tiff: false,
            big_endian: false,
            georef: Georef::ScaleTiepoint(0.0, height as f64, 1.0, 1.0),
            count_overrides: Vec::new(),
            byte_count_override: None,
        }
    }

    /// Single-band 8-bit raster whose value at (x, y) is `(x + y * width) % 256`
    pub fn gradient(width: u32, height: u32) -> Self {
        let samples = (0..width * height).map(|i| (i % 256) as f64).collect();
        Self::gray(width, height, samples)
    }

    /// Multi-band 8-bit raster; band `b` at (x, y) holds `(x + y + 50 * b) % 256`
    pub fn color(width: u32, height: u32, bands: u16) -> Self {
        let mut samples = Vec::with_capacity((width * height) as usize * bands as usize);
        for y in 0..height {
            for x in 0..width {
                for b in 0..bands as u32 {
                    samples.push(((x + y + 50 * b) % 256) as f64);
                }
            }
        }
        let mut fixture = Self::gray(width, height, samples);
        fixture.samples_per_pixel = bands;
        fixture
    }

    pub fn with_georef(mut self, georef: Georef) -> Self {
        self.georef = georef;
        self
    }

    pub fn with_blocks(mut self, blocks: Blocks) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn with_sample(mut self, sample: Sample) -> Self {
        self.sample = sample;
        self
    }

    pub fn deflate(mut self, predictor: bool) -> Self {
        self.deflate = true;
        self.predictor = predictor;
        self
    }

    pub fn big_tiff(mut self) -> Self {
        self.big_tiff = true;
        self
    }

    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    /// Declares `count` values for `tag` while storing the real array
    pub fn with_tag_count(mut self, tag: u16, count: u64) -> Self {
        self.count_overrides.push((tag, count));
        self
    }

    /// Declares `count` bytes for every block while storing the real data
    pub fn with_byte_count(mut self, count: u64) -> Self {
        self.byte_count_override = Some(count);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        if self.big_endian {
            self.build_with::<BigEndian>()
        } else {
            self.build_with::<LittleEndian>()
        }
    }

    pub fn cursor(&self) -> Cursor<Vec<u8>> {
        Cursor::new(self.build())
    }

    fn block_geometry(&self) -> (u32, u32, u32, u32) {
        let (bw, bh) = match self.blocks {
            Blocks::Strips(rows) => (self.width, rows.min(self.height)),
            Blocks::Tiles(tw, th) => (tw, th),
        };
        (bw, bh, self.width.div_ceil(bw), self.height.div_ceil(bh))
    }

    fn encode_block<E: ByteOrder>(&self, bx: u32, by: u32) -> Vec<u8> {
        let (bw, bh, _, _) = self.block_geometry();
        let spp = self.samples_per_pixel as usize;
        let rows = match self.blocks {
            Blocks::Strips(_) => bh.min(self.height - by * bh),
            Blocks::Tiles(..) => bh,
        };

        let mut raw = Vec::new();
        for r in 0..rows {
            let y = by * bh + r;
            let mut row = Vec::new();
            for c in 0..bw {
                let x = bx * bw + c;
                for s in 0..spp {
                    let value = if x < self.width && y < self.height {
                        self.samples[(y as usize * self.width as usize + x as usize) * spp + s]
                    } else {
                        0.0
                    };
                    match self.sample {
                        Sample::U8 => row.push(value as u8),
                        Sample::I8 => row.push(value as i8 as u8),
                        Sample::U16 => row.write_u16::<E>(value as u16).unwrap(),
                        Sample::I16 => row.write_i16::<E>(value as i16).unwrap(),
                        Sample::F32 => row.write_f32::<E>(value as f32).unwrap(),
                    }
                }
            }
            if self.predictor {
                apply_predictor::<E>(&mut row, spp, self.sample);
            }
            raw.extend_from_slice(&row);
        }

        if self.deflate {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&raw).unwrap();
            encoder.finish().unwrap()
        } else {
            raw
        }
    }

    fn build_with<E: ByteOrder>(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(if self.big_endian { b"MM" } else { b"II" });
        if self.big_tiff {
            out.write_u16::<E>(43).unwrap();
            out.write_u16::<E>(8).unwrap();
            out.write_u16::<E>(0).unwrap();
            out.write_u64::<E>(0).unwrap();
        } else {
            out.write_u16::<E>(42).unwrap();
            out.write_u32::<E>(0).unwrap();
        }

        let (bw, bh, across, down) = self.block_geometry();
        let mut offsets = Vec::new();
        let mut counts = Vec::new();
        for by in 0..down {
            for bx in 0..across {
                let block = self.encode_block::<E>(bx, by);
                offsets.push(out.len() as u64);
                counts.push(self.byte_count_override.unwrap_or(block.len() as u64));
                out.extend_from_slice(&block);
            }
        }

        let offset_value = |values: &[u64]| if self.big_tiff {
            Value::Long8(values.to_vec())
        } else {
            Value::Long(values.iter().map(|&v| v as u32).collect())
        };

        let spp = self.samples_per_pixel as usize;
        let mut entries: Vec<(u16, Value)> = vec![
            (256, Value::Long(vec![self.width])),
            (257, Value::Long(vec![self.height])),
            (258, Value::Short(vec![self.sample.bits(); spp])),
            (259, Value::Short(vec![if self.deflate { 8 } else { 1 }])),
            (277, Value::Short(vec![self.samples_per_pixel])),
            (284, Value::Short(vec![1])),
            (339, Value::Short(vec![self.sample.format(); spp])),
        ];
        if self.predictor {
            entries.push((317, Value::Short(vec![2])));
        }
        match self.blocks {
            Blocks::Strips(_) => {
                entries.push((273, offset_value(&offsets)));
                entries.push((278, Value::Long(vec![bh])));
                entries.push((279, offset_value(&counts)));
            },
            Blocks::Tiles(..) => {
                entries.push((322, Value::Long(vec![bw])));
                entries.push((323, Value::Long(vec![bh])));
                entries.push((324, offset_value(&offsets)));
                entries.push((325, offset_value(&counts)));
            },
        }
        match self.georef {
            Georef::ScaleTiepoint(origin_x, origin_y, psx, psy) => {
                entries.push((33550, Value::Double(vec![psx, psy, 0.0])));
                entries.push((33922, Value::Double(vec![0.0, 0.0, 0.0, origin_x, origin_y, 0.0])));
            },
            Georef::Matrix(c) => {
                entries.push((34264, Value::Double(vec![
                    c[1], c[2], 0.0, c[0],
                    c[4], c[5], 0.0, c[3],
                    0.0, 0.0, 0.0, 0.0,
                    0.0, 0.0, 0.0, 1.0,
                ])));
            },
            Georef::None => {},
        }
        entries.sort_by_key(|(tag, _)| *tag);

        let inline_size = if self.big_tiff { 8 } else { 4 };
        let mut fields = Vec::new();
        for (tag, value) in &entries {
            let bytes = value.encode::<E>();
            let field = if bytes.len() <= inline_size {
                let mut field = bytes.clone();
                field.resize(inline_size, 0);
                field
            } else {
                let offset = out.len() as u64;
                out.extend_from_slice(&bytes);
                let mut field = Vec::new();
                if self.big_tiff {
                    field.write_u64::<E>(offset).unwrap();
                } else {
                    field.write_u32::<E>(offset as u32).unwrap();
                }
                field
            };
            let count = self.count_overrides.iter()
                .find(|(overridden, _)| overridden == tag)
                .map_or(value.count() as u64, |(_, count)| *count);
            fields.push((*tag, value.field_type(), count, field));
        }

        if out.len() % 2 == 1 {
            out.push(0);
        }
        let ifd_offset = out.len() as u64;
        if self.big_tiff {
            out.write_u64::<E>(fields.len() as u64).unwrap();
        } else {
            out.write_u16::<E>(fields.len() as u16).unwrap();
        }
        for (tag, field_type, count, field) in fields {
            out.write_u16::<E>(tag).unwrap();
            out.write_u16::<E>(field_type).unwrap();
            if self.big_tiff {
                out.write_u64::<E>(count).unwrap();
            } else {
                out.write_u32::<E>(count as u32).unwrap();
            }
            out.extend_from_slice(&field);
        }
        if self.big_tiff {
            out.write_u64::<E>(0).unwrap();
            E::write_u64(&mut out[8..16], ifd_offset);
        } else {
            out.write_u32::<E>(0).unwrap();
            E::write_u32(&mut out[4..8], ifd_offset as u32);
        }

        out
    }
}

fn apply_predictor<E: ByteOrder>(row: &mut [u8], spp: usize, sample: Sample) {
    match sample {
        Sample::U8 | Sample::I8 => {
            for i in (spp..row.len()).rev() {
                row[i] = row[i].wrapping_sub(row[i - spp]);
            }
        },
        Sample::U16 | Sample::I16 => {
            let stride = spp * 2;
            let mut i = row.len();
            while i >= stride + 2 {
                i -= 2;
                let current = E::read_u16(&row[i..]);
                let previous = E::read_u16(&row[i - stride..]);
                E::write_u16(&mut row[i..], current.wrapping_sub(previous));
            }
        },
        Sample::F32 => {},
    }
}
