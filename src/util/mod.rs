//! Utility types shared by the value model, the codec and the scene layer.
//!
//! - [`ElementType`] - supported numeric kinds
//! - [`Shape`] - array dimensions
//! - [`Error`] / [`Result`] - error handling

mod element;
mod error;
mod shape;

pub use element::*;
pub use error::*;
pub use shape::*;
