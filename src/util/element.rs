//! Element types - the numeric kinds a dump value can carry.

use std::fmt;

use super::{Error, Result};

/// Numeric element type of a dump value.
///
/// The set is closed: every encoded value is either `i64` or `f32`.
/// Each kind has a fixed byte width and a fixed 3-byte ASCII tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementType {
    /// Signed 64-bit integer
    Int64,
    /// 32-bit floating point (IEEE 754 single precision)
    Float32,
}

impl ElementType {
    /// Width of the wire tag in bytes.
    pub const TAG_LEN: usize = 3;

    /// All supported element types.
    pub const ALL: [Self; 2] = [Self::Int64, Self::Float32];

    /// Returns the size in bytes of a single element of this type.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Int64 => 8,
            Self::Float32 => 4,
        }
    }

    /// Returns the wire tag of this type.
    #[inline]
    pub const fn tag(self) -> &'static [u8; 3] {
        match self {
            Self::Int64 => b"i64",
            Self::Float32 => b"f32",
        }
    }

    /// Returns the name of this type as a string.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int64 => "i64",
            Self::Float32 => "f32",
        }
    }

    /// Parse a type from its wire tag.
    pub fn from_tag(tag: &[u8]) -> Result<Self> {
        match tag {
            b"i64" => Ok(Self::Int64),
            b"f32" => Ok(Self::Float32),
            other => Err(Error::UnsupportedType(
                String::from_utf8_lossy(other).into_owned(),
            )),
        }
    }

    /// Parse a type from its name, ignoring surrounding padding.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::from_tag(name.trim().as_bytes())
    }

    /// Returns true if this is an integer type.
    #[inline]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Int64)
    }

    /// Returns true if this is a floating point type.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
