//! # splatdump
//!
//! Test-fixture generator for a 3D Gaussian-splat renderer.
//!
//! Builds deterministic scenes (a camera plus a cloud of splats) and
//! serializes them as a concatenation of self-describing binary values
//! that the renderer's test harness reads directly.
//!
//! ## Modules
//!
//! - [`util`] - Basic types (element types, shapes, errors)
//! - [`value`] - Scalar and array values
//! - [`dump`] - Binary value-dump encoder and decoder
//! - [`scene`] - Cameras, splat clouds, fixtures and the dataset suite
//!
//! ## Example
//!
//! ```no_run
//! use splatdump::scene::{Fixture, SceneConfig};
//!
//! let stats = Fixture::generate(100_000, &SceneConfig::default())
//!     .write("data/100k.in")?;
//! println!("{} bytes", stats.bytes);
//! # Ok::<(), splatdump::Error>(())
//! ```

pub mod util;
pub mod value;
pub mod dump;
pub mod scene;

// Re-export commonly used types
pub use util::{ElementType, Error, Result, Shape};
pub use value::Value;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{ElementType, Error, Result, Shape};
    pub use crate::value::{Array, Element, Elements, Number, Scalar, Value};
    pub use crate::dump::{DumpFile, DumpReader, DumpWriter};
    pub use crate::scene::{Camera, Fixture, SceneConfig, SplatCloud};
}
