//! Generators for numeric-PNG style test rasters.
//!
//! Depths are packed the same way real tiles are: RGB hold a big-endian
//! 24-bit integer of millimeters.

use std::io::Cursor;

use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgba, RgbaImage};

/// Millimeters per meter in the numeric PNG encoding.
const MM_PER_METER: f64 = 1000.0;

/// Pack a depth in meters and an alpha into one RGBA pixel.
///
/// # Example
///
/// ```
/// use test_utils::encoded_pixel;
///
/// assert_eq!(encoded_pixel(1.0, 255), [0, 3, 232, 255]);
/// ```
pub fn encoded_pixel(depth_m: f64, alpha: u8) -> [u8; 4] {
    let raw = (depth_m * MM_PER_METER).round().clamp(0.0, 0xFF_FFFF as f64) as u32;
    [(raw >> 16) as u8, (raw >> 8) as u8, raw as u8, alpha]
}

/// Build an RGBA buffer from one depth per pixel, all opaque.
pub fn depth_pixels(depths: &[f64]) -> Vec<u8> {
    depths.iter().flat_map(|&d| encoded_pixel(d, 255)).collect()
}

/// Build an RGBA buffer with a horizontal depth ramp.
///
/// Column `x` holds `max_depth * x / (width - 1)`; the first column is zero
/// (no data). Every pixel is opaque.
pub fn depth_ramp(width: usize, height: usize, max_depth: f64) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    let denom = width.saturating_sub(1).max(1) as f64;
    for _ in 0..height {
        for x in 0..width {
            pixels.extend_from_slice(&encoded_pixel(max_depth * x as f64 / denom, 255));
        }
    }
    pixels
}

/// Same as [`depth_ramp`], with every pixel in a checkerboard made fully
/// transparent.
pub fn depth_ramp_with_holes(width: usize, height: usize, max_depth: f64) -> Vec<u8> {
    let mut pixels = depth_ramp(width, height, max_depth);
    for y in 0..height {
        for x in 0..width {
            if (x + y) % 2 == 1 {
                pixels[(y * width + x) * 4 + 3] = 0;
            }
        }
    }
    pixels
}

/// Encode an RGBA buffer as a PNG with the `image` crate.
///
/// # Panics
///
/// Panics if `pixels` does not hold `width * height` RGBA pixels.
pub fn encode_png_rgba(pixels: &[u8], width: u32, height: u32) -> Vec<u8> {
    let img: RgbaImage = ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, pixels.to_vec())
        .expect("pixel buffer matches dimensions");
    let mut out = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Png)
        .expect("PNG encoding of test raster");
    out
}

/// Decode any image bytes into `(width, height, rgba)`.
///
/// # Panics
///
/// Panics if the bytes are not a decodable image.
pub fn decode_rgba(bytes: &[u8]) -> (u32, u32, Vec<u8>) {
    let img = image::load_from_memory(bytes)
        .expect("decodable image")
        .to_rgba8();
    let (w, h) = img.dimensions();
    (w, h, img.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_pixel() {
        assert_eq!(encoded_pixel(0.0, 255), [0, 0, 0, 255]);
        assert_eq!(encoded_pixel(0.3, 255), [0, 1, 44, 255]);
        assert_eq!(encoded_pixel(20.0, 0), [0, 78, 32, 0]);
    }

    #[test]
    fn test_depth_ramp_shape() {
        let pixels = depth_ramp(5, 3, 4.0);
        assert_eq!(pixels.len(), 5 * 3 * 4);
        assert_eq!(&pixels[0..4], &[0, 0, 0, 255]);
        assert_eq!(&pixels[16..20], &encoded_pixel(4.0, 255));
    }

    #[test]
    fn test_png_round_trip() {
        let pixels = depth_ramp_with_holes(4, 4, 2.0);
        let png = encode_png_rgba(&pixels, 4, 4);
        let (w, h, decoded) = decode_rgba(&png);
        assert_eq!((w, h), (4, 4));
        assert_eq!(decoded, pixels);
    }
}
