//! Common types shared by the flood-overlay crates.

pub mod color;
pub mod error;
pub mod raster;

pub use color::Rgba;
pub use error::{TileError, TileResult};
pub use raster::RgbaRaster;
