//! Per-pixel raster transform: decode, classify, merge transparency.
//!
//! ```text
//! source bytes ─► image decode ─► RgbaRaster
//!                                    │
//!                 per pixel: decode ─► classify ─► alpha merge
//!                                    │
//!                                    ▼
//!                               PNG encode ─► tile bytes
//! ```
//!
//! Everything here is pure; concurrent tiles share nothing.

use std::time::Instant;

use overlay_common::{RgbaRaster, TileError, TileResult};
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::decode::decode;
use crate::png::create_png_auto;
use crate::style::Profile;

/// Minimum pixels before the per-pixel loop is split across rayon workers.
const PARALLEL_THRESHOLD: usize = 64 * 64;

/// Per-call transform options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformOptions {
    /// Requested alpha for classified pixels. Ignored by fixed-alpha profiles.
    pub alpha: Option<u8>,
}

impl TransformOptions {
    pub fn with_alpha(alpha: u8) -> Self {
        Self { alpha: Some(alpha) }
    }
}

/// Transform one encoded pixel into its output color.
///
/// RGB always comes from the classification; alpha is forced to zero when
/// the source pixel was fully transparent.
#[inline(always)]
pub fn transform_pixel(pixel: [u8; 4], profile: &Profile, alpha: u8) -> [u8; 4] {
    let [r, g, b, a] = pixel;
    let color = profile.table.classify(decode(r, g, b), alpha);
    let out_alpha = if a == 0 { 0 } else { color.a };
    [color.r, color.g, color.b, out_alpha]
}

/// Transform an RGBA buffer in place.
///
/// Trailing bytes that do not form a whole pixel are left untouched.
pub fn transform_in_place(pixels: &mut [u8], profile: &Profile, options: TransformOptions) {
    let alpha = profile.alpha.resolve(options.alpha);

    let apply = |px: &mut [u8]| {
        let out = transform_pixel([px[0], px[1], px[2], px[3]], profile, alpha);
        px.copy_from_slice(&out);
    };

    if pixels.len() / 4 >= PARALLEL_THRESHOLD {
        pixels.par_chunks_exact_mut(4).for_each(apply);
    } else {
        pixels.chunks_exact_mut(4).for_each(apply);
    }
}

/// Transform a raster into a new raster of identical dimensions.
pub fn transform(raster: &RgbaRaster, profile: &Profile, options: TransformOptions) -> RgbaRaster {
    let mut output = raster.clone();
    transform_in_place(output.as_bytes_mut(), profile, options);
    output
}

/// Decode a source container (PNG, or anything else `image` reads) into RGBA.
pub fn decode_source(bytes: &[u8]) -> TileResult<RgbaRaster> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| TileError::source_unreadable(format!("failed to decode source image: {}", e)))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    RgbaRaster::from_raw(width as usize, height as usize, rgba.into_raw())
}

/// Transform a raster and encode the result as PNG.
pub fn render_raster(
    raster: RgbaRaster,
    profile: &Profile,
    options: TransformOptions,
) -> TileResult<Vec<u8>> {
    let (width, height) = (raster.width(), raster.height());
    let mut pixels = raster.into_raw();

    let start = Instant::now();
    transform_in_place(&mut pixels, profile, options);
    let classify_ms = start.elapsed().as_secs_f64() * 1000.0;

    let start = Instant::now();
    let png = create_png_auto(&pixels, width, height)?;
    let encode_ms = start.elapsed().as_secs_f64() * 1000.0;

    debug!(
        width,
        height,
        classify_ms,
        encode_ms,
        bytes = png.len(),
        "Rendered overlay tile"
    );

    Ok(png)
}

/// Full tile conversion: source bytes in, overlay PNG bytes out.
#[instrument(skip(source, profile), fields(profile = %profile.name, source_bytes = source.len()))]
pub fn render_tile(source: &[u8], profile: &Profile, options: TransformOptions) -> TileResult<Vec<u8>> {
    let raster = decode_source(source)?;
    render_raster(raster, profile, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_pixel_merge() {
        let profile = Profile::strict_transparency();
        // 1.0m, opaque
        assert_eq!(transform_pixel([0, 3, 232, 255], &profile, 255), [255, 216, 192, 255]);
        // 1.0m, transparent source keeps band rgb but zero alpha
        assert_eq!(transform_pixel([0, 3, 232, 0], &profile, 255), [255, 216, 192, 0]);
        // any nonzero source alpha counts as opaque
        assert_eq!(transform_pixel([0, 3, 232, 1], &profile, 255), [255, 216, 192, 255]);
    }

    #[test]
    fn test_transform_in_place_ignores_partial_pixel() {
        let profile = Profile::strict_transparency();
        let mut pixels = vec![0, 3, 232, 255, 9, 9];
        transform_in_place(&mut pixels, &profile, TransformOptions::default());
        assert_eq!(pixels, vec![255, 216, 192, 255, 9, 9]);
    }

    #[test]
    fn test_decode_source_rejects_garbage() {
        let err = decode_source(b"not an image").unwrap_err();
        assert!(matches!(err, TileError::SourceUnreadable(_)));
    }
}
