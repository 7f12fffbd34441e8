//! In-memory RGBA raster passed between the loader, transform and encoder.

use crate::error::{TileError, TileResult};

/// An 8-bit-per-channel RGBA pixel grid in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaRaster {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl RgbaRaster {
    /// Wrap a raw RGBA buffer, checking that it holds exactly
    /// `width * height` pixels.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> TileResult<Self> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| {
                TileError::source_unreadable(format!("raster dimensions overflow: {}x{}", width, height))
            })?;

        if data.len() != expected {
            return Err(TileError::source_unreadable(format!(
                "pixel buffer length {} does not match {}x{} RGBA ({} bytes)",
                data.len(),
                width,
                height,
                expected
            )));
        }

        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Pixel at column `x`, row `y`, or `None` when out of bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y * self.width + x) * 4;
        let px = &self.data[offset..offset + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}
