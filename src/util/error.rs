//! Error types for splatdump.

use std::path::PathBuf;
use thiserror::Error;

use super::ElementType;

/// Main error type for splatdump operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Array shape is empty, negative, too deep or too large
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// Array data length does not match the product of its shape
    #[error("Shape mismatch: shape holds {expected} elements, got {actual}")]
    ShapeMismatch { expected: u64, actual: usize },

    /// Value cannot be represented in the target element type
    #[error("Value {value} is not representable as {ty}")]
    Range { value: String, ty: ElementType },

    /// Element type outside the supported set
    #[error("Unsupported element type: {0:?}")]
    UnsupportedType(String),

    /// First byte of a value is not the binary marker
    #[error("Invalid value marker 0x{found:02x} at offset {offset}")]
    InvalidMarker { found: u8, offset: u64 },

    /// Unsupported binary format version
    #[error("Unsupported binary format version: {0}")]
    UnsupportedVersion(u8),

    /// Input is truncated
    #[error("Unexpected end of input at position {0}")]
    UnexpectedEof(u64),

    /// Decoded values do not form the expected structure
    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    /// Malformed or unsupported PLY input
    #[error("Invalid PLY file: {0}")]
    InvalidPly(String),

    /// File does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Scene configuration could not be parsed
    #[error("Invalid scene config: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Create an invalid PLY error.
    pub fn ply(msg: impl Into<String>) -> Self {
        Self::InvalidPly(msg.into())
    }
}

/// Result type alias for splatdump operations.
pub type Result<T> = std::result::Result<T, Error>;
