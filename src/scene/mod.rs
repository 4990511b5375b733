//! Scene layer: cameras, splat clouds and the fixture files built from them.
//!
//! A [`Fixture`] pairs a [`Camera`] with a [`SplatCloud`] and knows how to
//! lay both out as the renderer's 30 input values. Clouds come either from
//! the deterministic uniform-cube generator or from a trained PLY export.

mod camera;
mod cloud;
mod config;
mod fixture;
pub mod generate;
pub mod ply;
mod suite;

pub use camera::*;
pub use cloud::*;
pub use config::*;
pub use fixture::*;
pub use suite::*;
