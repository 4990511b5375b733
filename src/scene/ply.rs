//! Binary PLY import for trained 3DGS point clouds.
//!
//! Only what trained splat exports actually contain is supported: a
//! `binary_little_endian` body whose first element is `vertex`, made of
//! scalar properties. Known properties are mapped by name; any property
//! that is absent reads as zero.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use tracing::{debug, info};

use super::{SplatCloud, MAX_SH_COEFFS};
use crate::util::{Error, Result};

/// Records reserved up front; larger clouds grow as data arrives.
const RESERVE_RECORDS: usize = 64 * 1024;

/// Scalar property type of a PLY element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlyScalar {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Float32,
    Float64,
}

impl PlyScalar {
    /// Parse a PLY type name, accepting both the old and sized spellings.
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "char" | "int8" => Self::Int8,
            "uchar" | "uint8" => Self::UInt8,
            "short" | "int16" => Self::Int16,
            "ushort" | "uint16" => Self::UInt16,
            "int" | "int32" => Self::Int32,
            "uint" | "uint32" => Self::UInt32,
            "float" | "float32" => Self::Float32,
            "double" | "float64" => Self::Float64,
            _ => return None,
        })
    }

    /// Size in bytes.
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }

    fn read_f32(self, buf: &[u8]) -> f32 {
        match self {
            Self::Int8 => buf[0] as i8 as f32,
            Self::UInt8 => buf[0] as f32,
            Self::Int16 => LittleEndian::read_i16(buf) as f32,
            Self::UInt16 => LittleEndian::read_u16(buf) as f32,
            Self::Int32 => LittleEndian::read_i32(buf) as f32,
            Self::UInt32 => LittleEndian::read_u32(buf) as f32,
            Self::Float32 => LittleEndian::read_f32(buf),
            Self::Float64 => LittleEndian::read_f64(buf) as f32,
        }
    }
}

/// One vertex property with its byte offset inside a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlyProperty {
    pub name: String,
    pub ty: PlyScalar,
    pub offset: usize,
}

/// Parsed PLY header, restricted to the vertex element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlyHeader {
    pub vertex_count: usize,
    pub properties: Vec<PlyProperty>,
    /// Bytes per vertex record.
    pub stride: usize,
}

impl PlyHeader {
    /// Parse the header up to and including `end_header`.
    pub fn parse<R: BufRead>(reader: &mut R) -> Result<Self> {
        let mut line = String::new();
        let mut line_no = 1usize;

        if !next_line(reader, &mut line)? || line.trim_end() != "ply" {
            return Err(Error::ply("missing 'ply' magic"));
        }

        let mut header = PlyHeader::default();
        let mut seen_format = false;
        // None until the first element, then whether we are inside `vertex`.
        let mut in_vertex: Option<bool> = None;

        loop {
            line_no += 1;
            if !next_line(reader, &mut line)? {
                return Err(Error::ply("header is not terminated by 'end_header'"));
            }
            let mut tokens = line.split_whitespace();
            match tokens.next() {
                Some("end_header") => break,
                Some("comment") | Some("obj_info") | None => {}
                Some("format") => {
                    match tokens.next() {
                        Some("binary_little_endian") => {}
                        Some(other) => {
                            return Err(Error::ply(format!("unsupported format '{}'", other)))
                        }
                        None => return Err(Error::ply("format line without a format")),
                    }
                    seen_format = true;
                }
                Some("element") => {
                    let name = tokens.next().unwrap_or_default();
                    match (in_vertex, name) {
                        (None, "vertex") => {
                            let count = tokens.next().and_then(|c| c.parse::<usize>().ok());
                            header.vertex_count = count.ok_or_else(|| {
                                Error::ply(format!("bad vertex count on line {}", line_no))
                            })?;
                            in_vertex = Some(true);
                        }
                        (None, other) => {
                            return Err(Error::ply(format!(
                                "first element must be 'vertex', found '{}'",
                                other
                            )))
                        }
                        (Some(_), _) => in_vertex = Some(false),
                    }
                }
                Some("property") => {
                    if in_vertex != Some(true) {
                        continue;
                    }
                    let ty_name = tokens.next().unwrap_or_default();
                    if ty_name == "list" {
                        return Err(Error::ply("list properties on 'vertex' are not supported"));
                    }
                    let ty = PlyScalar::parse(ty_name).ok_or_else(|| {
                        Error::ply(format!("unknown property type '{}'", ty_name))
                    })?;
                    let name = tokens
                        .next()
                        .ok_or_else(|| Error::ply(format!("unnamed property on line {}", line_no)))?;
                    header.properties.push(PlyProperty {
                        name: name.to_string(),
                        ty,
                        offset: header.stride,
                    });
                    header.stride += ty.num_bytes();
                }
                Some(other) => {
                    return Err(Error::ply(format!("unexpected header keyword '{}'", other)))
                }
            }
        }

        if !seen_format {
            return Err(Error::ply("missing format line"));
        }
        if in_vertex.is_none() {
            return Err(Error::ply("no 'vertex' element"));
        }
        Ok(header)
    }

    /// Find a property by name.
    pub fn property(&self, name: &str) -> Option<&PlyProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}

fn next_line<R: BufRead>(reader: &mut R, line: &mut String) -> Result<bool> {
    line.clear();
    Ok(reader.read_line(line)? > 0)
}

/// Read a splat cloud from a PLY file.
pub fn read_ply(path: impl AsRef<Path>, sh_coeffs: usize) -> Result<SplatCloud> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            Error::FileNotFound(path.to_path_buf())
        } else {
            Error::Io(e)
        }
    })?;
    parse_ply(BufReader::new(file), sh_coeffs)
}

/// Read a splat cloud from a PLY stream.
///
/// `f_dc_*` become the base colors as stored. `f_rest_*` is interleaved by
/// channel, so coefficient `j` of channel `c` is `f_rest_{3j + c}`.
pub fn parse_ply<R: BufRead>(mut reader: R, sh_coeffs: usize) -> Result<SplatCloud> {
    if sh_coeffs > MAX_SH_COEFFS {
        return Err(Error::invalid(format!(
            "at most {} SH coefficients per channel, got {}",
            MAX_SH_COEFFS, sh_coeffs
        )));
    }
    let header = PlyHeader::parse(&mut reader)?;
    let n = header.vertex_count;
    if n > 0 && header.stride == 0 {
        return Err(Error::ply(format!("{} vertices without properties", n)));
    }
    if n.checked_mul(header.stride).is_none() {
        return Err(Error::ply(format!(
            "{} vertices of {} bytes overflow the address space",
            n, header.stride
        )));
    }
    info!(splats = n, properties = header.properties.len(), "loading PLY");

    let slot = |name: &str| header.property(name).map(|p| (p.ty, p.offset));
    let slots = |names: &[&str]| -> Vec<Option<(PlyScalar, usize)>> {
        names.iter().map(|&name| slot(name)).collect()
    };
    let position = slots(&["x", "y", "z"]);
    let opacity = slot("opacity");
    let scale = slots(&["scale_0", "scale_1", "scale_2"]);
    let rotation = slots(&["rot_0", "rot_1", "rot_2", "rot_3"]);
    let color = slots(&["f_dc_0", "f_dc_1", "f_dc_2"]);
    let rest: Vec<_> = (0..3 * sh_coeffs).map(|i| slot(&format!("f_rest_{}", i))).collect();
    debug!(
        sh_found = rest.iter().filter(|s| s.is_some()).count(),
        stride = header.stride,
        "PLY layout"
    );

    let read = |record: &[u8], slot: Option<(PlyScalar, usize)>| match slot {
        Some((ty, offset)) => ty.read_f32(&record[offset..offset + ty.num_bytes()]),
        None => 0.0,
    };

    // Columns grow with the records actually read, not the declared count.
    let mut cloud = SplatCloud::with_capacity(n.min(RESERVE_RECORDS), sh_coeffs);
    let mut record = vec![0u8; header.stride];
    for i in 0..n {
        reader.read_exact(&mut record).map_err(|e| {
            if e.kind() == ErrorKind::UnexpectedEof {
                Error::ply(format!("vertex data ends after {} of {} records", i, n))
            } else {
                Error::Io(e)
            }
        })?;

        for a in 0..3 {
            cloud.positions[a].push(read(&record, position[a]));
            cloud.log_scales[a].push(read(&record, scale[a]));
            cloud.colors[a].push(read(&record, color[a]));
        }
        for a in 0..4 {
            cloud.rotations[a].push(read(&record, rotation[a]));
        }
        cloud.opacities.push(read(&record, opacity));
        for c in 0..3 {
            cloud.sh[c].extend((0..sh_coeffs).map(|j| read(&record, rest[j * 3 + c])));
        }
    }
    Ok(cloud)
}
