//! Binary value-dump writer.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use tempfile::NamedTempFile;
use tracing::debug;

use super::format::*;
use crate::util::{Error, Result};
use crate::value::{ElementsRef, Value};

/// Elements converted per payload chunk.
const CHUNK_ELEMS: usize = 1024;

/// Output stream for writing dump values.
///
/// Holds no state between values other than the write position, so
/// writing values one call at a time yields the same bytes as writing
/// them in one batch.
pub struct DumpWriter<W: Write> {
    writer: W,
    pos: u64,
    num_values: usize,
}

impl DumpWriter<BufWriter<File>> {
    /// Create (or truncate) a dump file for writing.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        Ok(Self::new(BufWriter::with_capacity(2 * 1024 * 1024, file))) // 2MB buffer
    }
}

impl<W: Write> DumpWriter<W> {
    /// Wrap a byte sink.
    pub fn new(writer: W) -> Self {
        Self { writer, pos: 0, num_values: 0 }
    }

    /// Get the current write position.
    #[inline]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Number of values written so far.
    #[inline]
    pub fn num_values(&self) -> usize {
        self.num_values
    }

    /// Encode one value and return the number of bytes written.
    pub fn write_value(&mut self, value: &Value) -> Result<u64> {
        let written = encode_value(&mut self.writer, value)?;
        self.pos += written;
        self.num_values += 1;
        Ok(written)
    }

    /// Encode values in order and return the number of bytes written.
    pub fn write_values<'a>(&mut self, values: impl IntoIterator<Item = &'a Value>) -> Result<u64> {
        let mut total = 0;
        for value in values {
            total += self.write_value(value)?;
        }
        Ok(total)
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and return the underlying sink.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.writer)
    }
}

/// Encode one value into `sink`, returning the number of bytes written.
///
/// Errors from the sink are returned unchanged; nothing is retried.
pub fn encode_value<W: Write + ?Sized>(sink: &mut W, value: &Value) -> Result<u64> {
    let shape = value.shape();
    let elems = value.elements();

    sink.write_u8(BINARY_MARKER)?;
    sink.write_u8(FORMAT_VERSION)?;
    // Shape guarantees rank <= 255 for arrays.
    sink.write_u8(if value.is_scalar() { SCALAR_RANK } else { shape.len() as u8 })?;
    sink.write_all(value.element_type().tag())?;
    for &dim in shape {
        sink.write_u64::<LittleEndian>(dim)?;
    }
    write_payload(sink, elems)?;

    Ok(encoded_len(value))
}

/// Encode values in order into `sink`.
pub fn encode_values<'a, W: Write + ?Sized>(
    sink: &mut W,
    values: impl IntoIterator<Item = &'a Value>,
) -> Result<u64> {
    let mut total = 0;
    for value in values {
        total += encode_value(sink, value)?;
    }
    Ok(total)
}

/// Write `values` to `path` as a complete dump file.
///
/// Parent directories are created as needed. Values are streamed into a
/// temporary file next to `path`, which replaces `path` only after every
/// value was written and synced. On any error the temporary file is
/// removed and `path` is left as it was.
pub fn write_file<'a>(
    path: impl AsRef<Path>,
    values: impl IntoIterator<Item = &'a Value>,
) -> Result<u64> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if path.file_name().is_none() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("output path has no file name: {}", path.display()),
        )));
    }
    fs::create_dir_all(dir)?;

    let tmp = NamedTempFile::new_in(dir)?;
    let mut writer = DumpWriter::new(BufWriter::with_capacity(2 * 1024 * 1024, tmp));
    for value in values {
        let offset = writer.pos();
        let written = writer.write_value(value)?;
        debug!(
            offset,
            bytes = written,
            ty = %value.element_type(),
            shape = ?value.shape(),
            "wrote value"
        );
    }
    let total = writer.pos();
    let tmp = writer
        .into_inner()?
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(total)
}

/// Encode one value into a fresh buffer.
pub fn to_bytes(value: &Value) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_len(value) as usize);
    // Writing into a Vec cannot fail.
    let _ = encode_value(&mut buf, value);
    buf
}

/// Exact encoded size of a value in bytes.
pub fn encoded_len(value: &Value) -> u64 {
    let rank = if value.is_scalar() { 0 } else { value.shape().len() };
    header_len(rank) as u64 + value.elements().num_bytes() as u64
}

/// Write elements as fixed-width little-endian, independent of host order.
fn write_payload<W: Write + ?Sized>(sink: &mut W, elems: ElementsRef<'_>) -> Result<()> {
    let mut buf = [0u8; CHUNK_ELEMS * 8];
    match elems {
        ElementsRef::Int64(data) => {
            for chunk in data.chunks(CHUNK_ELEMS) {
                let bytes = &mut buf[..chunk.len() * 8];
                LittleEndian::write_i64_into(chunk, bytes);
                sink.write_all(bytes)?;
            }
        }
        ElementsRef::Float32(data) => {
            for chunk in data.chunks(CHUNK_ELEMS) {
                let bytes = &mut buf[..chunk.len() * 4];
                LittleEndian::write_f32_into(chunk, bytes);
                sink.write_all(bytes)?;
            }
        }
    }
    Ok(())
}
