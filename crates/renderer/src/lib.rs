//! Overlay rendering for numeric flood-depth tiles.
//!
//! - [`decode`]: RGB channels to depth in meters
//! - [`classify`]: ordered band tables
//! - [`style`]: profiles (table + alpha policy), built-in and JSON-defined
//! - [`transform`]: the per-pixel pipeline and tile rendering
//! - [`png`]: PNG encoding of the output

pub mod classify;
pub mod decode;
pub mod png;
pub mod style;
pub mod transform;

pub use classify::{ClassificationBand, ClassificationTable, LowerBound};
pub use style::{AlphaPolicy, Profile, StyleConfig};
pub use transform::{render_raster, render_tile, transform, transform_in_place, TransformOptions};
