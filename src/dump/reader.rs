//! Binary value-dump reader.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use memmap2::Mmap;

use super::format::*;
use crate::util::{ElementType, Error, Result, Shape};
use crate::value::{Array, Elements, Scalar, Value};

/// Elements decoded per payload chunk. Also bounds the up-front
/// allocation for a declared shape, so a corrupt shape cannot trigger a
/// huge allocation before the payload is actually seen.
const CHUNK_ELEMS: usize = 1024;

/// Parsed header of one encoded value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueHeader {
    /// Byte offset of the value's marker in the stream.
    pub offset: u64,
    /// Element type from the tag.
    pub element_type: ElementType,
    /// Shape, or None for a scalar.
    pub shape: Option<Shape>,
}

impl ValueHeader {
    /// Rank (0 for scalars).
    pub fn rank(&self) -> usize {
        self.shape.as_ref().map_or(0, Shape::rank)
    }

    /// Number of payload elements.
    pub fn num_elements(&self) -> u64 {
        self.shape.as_ref().map_or(1, Shape::num_elements)
    }

    /// Header size in bytes.
    pub fn header_len(&self) -> u64 {
        header_len(self.rank()) as u64
    }

    /// Payload size in bytes.
    ///
    /// Saturates at `u64::MAX`; [`DumpReader::read_header`] never yields
    /// a header whose size overflows.
    pub fn payload_len(&self) -> u64 {
        self.num_elements().saturating_mul(self.element_type.num_bytes() as u64)
    }

    /// Total encoded size in bytes.
    pub fn encoded_len(&self) -> u64 {
        self.header_len().saturating_add(self.payload_len())
    }
}

/// Input stream for reading dump values.
pub struct DumpReader<R: Read> {
    reader: R,
    pos: u64,
    failed: bool,
}

impl<R: Read> DumpReader<R> {
    /// Wrap a byte source positioned at a value boundary.
    pub fn new(reader: R) -> Self {
        Self { reader, pos: 0, failed: false }
    }

    /// Get the current read position.
    #[inline]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Read the next value header.
    ///
    /// Returns `Ok(None)` on a clean end of input at a value boundary.
    pub fn read_header(&mut self) -> Result<Option<ValueHeader>> {
        let offset = self.pos;
        let marker = match self.read_first_byte()? {
            Some(b) => b,
            None => return Ok(None),
        };
        if marker != BINARY_MARKER {
            return Err(Error::InvalidMarker { found: marker, offset });
        }

        let version = self.read_u8()?;
        if version != FORMAT_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        let rank = self.read_u8()?;
        let mut tag = [0u8; TAG_LEN];
        self.read_exact(&mut tag)?;
        let element_type = ElementType::from_tag(&tag)?;

        let shape = if rank == SCALAR_RANK {
            None
        } else {
            let mut dims = [0u64; u8::MAX as usize];
            let dims = &mut dims[..rank as usize];
            for dim in dims.iter_mut() {
                *dim = self.read_u64()?;
            }
            Some(Shape::from_slice(dims)?)
        };

        let header = ValueHeader { offset, element_type, shape };
        let size = header
            .num_elements()
            .checked_mul(element_type.num_bytes() as u64)
            .and_then(|payload| payload.checked_add(header.header_len()));
        if size.is_none() {
            return Err(Error::InvalidShape(format!(
                "payload of {} {} elements at offset {} overflows u64",
                header.num_elements(),
                element_type,
                offset
            )));
        }
        Ok(Some(header))
    }

    /// Read the payload described by `header`.
    pub fn read_payload(&mut self, header: &ValueHeader) -> Result<Value> {
        let count = header.num_elements();
        let elements = match header.element_type {
            ElementType::Int64 => Elements::Int64(self.read_chunked(count, 8, |b, out: &mut [i64]| {
                LittleEndian::read_i64_into(b, out)
            })?),
            ElementType::Float32 => Elements::Float32(self.read_chunked(count, 4, |b, out: &mut [f32]| {
                LittleEndian::read_f32_into(b, out)
            })?),
        };

        match &header.shape {
            None => {
                let scalar = match elements {
                    Elements::Int64(v) => Scalar::Int64(v[0]),
                    Elements::Float32(v) => Scalar::Float32(v[0]),
                };
                Ok(Value::Scalar(scalar))
            }
            Some(shape) => Ok(Value::Array(Array::new(shape.clone(), elements)?)),
        }
    }

    /// Skip the payload described by `header`.
    pub fn skip_payload(&mut self, header: &ValueHeader) -> Result<()> {
        let len = header.payload_len();
        let copied = io::copy(&mut (&mut self.reader).take(len), &mut io::sink())?;
        self.pos += copied;
        if copied < len {
            return Err(Error::UnexpectedEof(self.pos));
        }
        Ok(())
    }

    /// Read the next complete value.
    ///
    /// Returns `Ok(None)` on a clean end of input at a value boundary.
    pub fn read_value(&mut self) -> Result<Option<Value>> {
        match self.read_header()? {
            Some(header) => self.read_payload(&header).map(Some),
            None => Ok(None),
        }
    }

    /// Read every remaining value.
    pub fn read_all(&mut self) -> Result<Vec<Value>> {
        let mut values = Vec::new();
        while let Some(value) = self.read_value()? {
            values.push(value);
        }
        Ok(values)
    }

    fn read_chunked<T: Copy + Default>(
        &mut self,
        count: u64,
        width: usize,
        decode: impl Fn(&[u8], &mut [T]),
    ) -> Result<Vec<T>> {
        let mut out = Vec::with_capacity(count.min(CHUNK_ELEMS as u64) as usize);
        let mut bytes = vec![0u8; CHUNK_ELEMS * width];
        let mut decoded = vec![T::default(); CHUNK_ELEMS];
        let mut remaining = count;
        while remaining > 0 {
            let n = remaining.min(CHUNK_ELEMS as u64) as usize;
            self.read_exact(&mut bytes[..n * width])?;
            decode(&bytes[..n * width], &mut decoded[..n]);
            out.extend_from_slice(&decoded[..n]);
            remaining -= n as u64;
        }
        Ok(out)
    }

    fn read_first_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.pos += 1;
                    return Ok(Some(byte[0]));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn read_u8(&mut self) -> Result<u8> {
        let v = self.reader.read_u8().map_err(|e| self.eof(e))?;
        self.pos += 1;
        Ok(v)
    }

    fn read_u64(&mut self) -> Result<u64> {
        let v = self.reader.read_u64::<LittleEndian>().map_err(|e| self.eof(e))?;
        self.pos += 8;
        Ok(v)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.reader.read_exact(buf).map_err(|e| self.eof(e))?;
        self.pos += buf.len() as u64;
        Ok(())
    }

    fn eof(&self, e: io::Error) -> Error {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::UnexpectedEof(self.pos)
        } else {
            Error::Io(e)
        }
    }
}

impl<R: Read> Iterator for DumpReader<R> {
    type Item = Result<Value>;

    /// Yields values until end of input; stops after the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.read_value() {
            Ok(Some(v)) => Some(Ok(v)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Decode every value in a byte buffer.
pub fn decode_values(bytes: &[u8]) -> Result<Vec<Value>> {
    DumpReader::new(bytes).read_all()
}

/// A dump file opened for reading.
/// Supports both memory-mapped and buffered I/O modes.
pub struct DumpFile {
    path: PathBuf,
    inner: FileInner,
}

enum FileInner {
    /// Memory-mapped file (preferred for large files)
    Mmap(Mmap),
    /// Whole file read into memory (fallback, and for empty files)
    Buffer(Vec<u8>),
}

impl DumpFile {
    /// Open a file for reading with memory mapping.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_opts(path, true)
    }

    /// Open a file with optional memory mapping.
    pub fn open_opts(path: impl AsRef<Path>, use_mmap: bool) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;

        let size = file.metadata()?.len();
        let inner = if use_mmap && size > 0 {
            // Safety: the mapping is read-only and lives no longer than self.
            FileInner::Mmap(unsafe { Mmap::map(&file) }?)
        } else {
            let mut buf = Vec::with_capacity(size as usize);
            file.read_to_end(&mut buf)?;
            FileInner::Buffer(buf)
        };

        Ok(Self { path: path.to_path_buf(), inner })
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw file contents.
    pub fn bytes(&self) -> &[u8] {
        match &self.inner {
            FileInner::Mmap(mmap) => mmap,
            FileInner::Buffer(buf) => buf,
        }
    }

    /// Total file size.
    pub fn size(&self) -> u64 {
        self.bytes().len() as u64
    }

    /// Check if the file was memory-mapped.
    pub fn is_mmap(&self) -> bool {
        matches!(self.inner, FileInner::Mmap(_))
    }

    /// Reader positioned at the first value.
    pub fn reader(&self) -> DumpReader<&[u8]> {
        DumpReader::new(self.bytes())
    }

    /// Decode every value in the file.
    pub fn read_all(&self) -> Result<Vec<Value>> {
        self.reader().read_all()
    }

    /// Parse every value header, skipping payloads.
    pub fn headers(&self) -> Result<Vec<ValueHeader>> {
        let mut reader = self.reader();
        let mut headers = Vec::new();
        while let Some(header) = reader.read_header()? {
            reader.skip_payload(&header)?;
            headers.push(header);
        }
        Ok(headers)
    }
}
