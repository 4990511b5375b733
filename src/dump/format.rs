//! Binary value-dump format constants.

/// First byte of every binary value (ASCII `b`).
pub const BINARY_MARKER: u8 = b'b';

/// Binary format version written after the marker.
pub const FORMAT_VERSION: u8 = 2;

/// Rank byte reserved for scalars.
pub const SCALAR_RANK: u8 = 0;

/// Width of the type tag in bytes.
pub const TAG_LEN: usize = 3;

/// Marker, version, rank and tag.
pub const FIXED_HEADER_LEN: usize = 3 + TAG_LEN;

/// Width of one shape entry in bytes.
pub const DIM_LEN: usize = 8;

/// Header length of a value with the given rank.
#[inline]
pub const fn header_len(rank: usize) -> usize {
    FIXED_HEADER_LEN + rank * DIM_LEN
}
