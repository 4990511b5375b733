//! Binary value-dump format.
//!
//! Each value is self-describing; a file is nothing more than values
//! written back to back, with no file header and no padding.
//!
//! ## Value Layout
//!
//! ```text
//! +------------------+
//! | Marker: 'b'      |  1 byte (0x62)
//! +------------------+
//! | Version          |  1 byte (2)
//! +------------------+
//! | Rank             |  1 byte (0 = scalar)
//! +------------------+
//! | Type tag         |  3 bytes ("i64" / "f32")
//! +------------------+
//! | Shape            |  rank x u64 LE, outermost first
//! +------------------+
//! | Payload          |  elements, row-major, LE
//! +------------------+
//! ```
//!
//! All multi-byte fields are little-endian regardless of the host.

mod format;
mod reader;
mod writer;

pub use format::*;
pub use reader::*;
pub use writer::*;
