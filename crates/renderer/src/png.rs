//! PNG encoding for classified overlay tiles.
//!
//! Two encoding modes:
//! - **Indexed PNG (color type 3)**: used when the tile has at most 256
//!   distinct colors, which every classified tile does. Transparency goes
//!   into a tRNS chunk.
//! - **RGBA PNG (color type 6)**: fallback for anything with more colors.

use overlay_common::{TileError, TileResult};
use rayon::prelude::*;
use std::collections::HashMap;
use std::io::Write;

/// PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Palette capacity of an 8-bit indexed PNG.
const PALETTE_CAPACITY: usize = 256;

/// Tiles with at least this many pixels build their palette on rayon.
const PARALLEL_PIXELS: usize = 64 * 64;

const COLOR_TYPE_INDEXED: u8 = 3;
const COLOR_TYPE_RGBA: u8 = 6;

/// Distinct RGBA colors in first-seen order.
#[derive(Debug, Default)]
struct Palette {
    colors: Vec<[u8; 4]>,
    lookup: HashMap<[u8; 4], u8>,
}

impl Palette {
    /// Index of `color`, adding it if new. `None` once the palette is full.
    #[inline]
    fn index_of(&mut self, color: [u8; 4]) -> Option<u8> {
        if let Some(&index) = self.lookup.get(&color) {
            return Some(index);
        }
        if self.colors.len() == PALETTE_CAPACITY {
            return None;
        }
        let index = self.colors.len() as u8;
        self.colors.push(color);
        self.lookup.insert(color, index);
        Some(index)
    }

    /// Build the palette and per-pixel indices, or `None` past 256 colors.
    fn index_pixels(pixels: &[u8]) -> Option<(Self, Vec<u8>)> {
        if pixels.len() / 4 >= PARALLEL_PIXELS {
            Self::index_pixels_parallel(pixels)
        } else {
            Self::index_pixels_sequential(pixels)
        }
    }

    fn index_pixels_sequential(pixels: &[u8]) -> Option<(Self, Vec<u8>)> {
        let mut palette = Self::default();
        let indices = pixels
            .chunks_exact(4)
            .map(|px| palette.index_of([px[0], px[1], px[2], px[3]]))
            .collect::<Option<Vec<u8>>>()?;
        Some((palette, indices))
    }

    /// Colors are collected per rayon chunk and merged in chunk order, which
    /// yields the same palette as the sequential scan.
    fn index_pixels_parallel(pixels: &[u8]) -> Option<(Self, Vec<u8>)> {
        let chunk_len = (pixels.len() / 4 / rayon::current_num_threads()).max(256) * 4;

        let chunk_colors: Vec<Option<Palette>> = pixels
            .par_chunks(chunk_len)
            .map(|chunk| {
                let mut local = Palette::default();
                for px in chunk.chunks_exact(4) {
                    local.index_of([px[0], px[1], px[2], px[3]])?;
                }
                Some(local)
            })
            .collect();

        let mut palette = Self::default();
        for local in chunk_colors {
            for color in local?.colors {
                palette.index_of(color)?;
            }
        }

        let indices = pixels
            .par_chunks_exact(4)
            .map(|px| palette.lookup.get(&[px[0], px[1], px[2], px[3]]).copied().unwrap_or(0))
            .collect();

        Some((palette, indices))
    }
}

/// Encode RGBA pixels, picking indexed output when the colors fit a palette.
pub fn create_png_auto(pixels: &[u8], width: usize, height: usize) -> TileResult<Vec<u8>> {
    check_dimensions(pixels.len(), width, height, 4)?;

    match Palette::index_pixels(pixels) {
        Some((palette, indices)) => create_png_indexed(width, height, &palette.colors, &indices),
        None => create_png(pixels, width, height),
    }
}

/// Create an indexed PNG (color type 3) from RGBA palette entries and
/// one index per pixel.
pub fn create_png_indexed(
    width: usize,
    height: usize,
    palette: &[[u8; 4]],
    indices: &[u8],
) -> TileResult<Vec<u8>> {
    check_dimensions(indices.len(), width, height, 1)?;
    if palette.is_empty() || palette.len() > PALETTE_CAPACITY {
        return Err(TileError::encoding(format!(
            "palette must hold 1..={} colors, got {}",
            PALETTE_CAPACITY,
            palette.len()
        )));
    }
    if let Some(bad) = indices.iter().find(|&&i| usize::from(i) >= palette.len()) {
        return Err(TileError::encoding(format!(
            "palette index {} out of range for {} colors",
            bad,
            palette.len()
        )));
    }

    let mut out = start_png(width, height, COLOR_TYPE_INDEXED);

    let rgb: Vec<u8> = palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    write_chunk(&mut out, b"PLTE", &rgb);

    if palette.iter().any(|c| c[3] != 255) {
        let alphas: Vec<u8> = palette.iter().map(|c| c[3]).collect();
        write_chunk(&mut out, b"tRNS", &alphas);
    }

    finish_png(out, indices, width, height, 1)
}

/// Create an RGBA PNG (color type 6).
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> TileResult<Vec<u8>> {
    check_dimensions(pixels.len(), width, height, 4)?;
    let out = start_png(width, height, COLOR_TYPE_RGBA);
    finish_png(out, pixels, width, height, 4)
}

fn check_dimensions(len: usize, width: usize, height: usize, bytes_per_pixel: usize) -> TileResult<()> {
    if width == 0 || height == 0 {
        return Err(TileError::encoding(format!(
            "PNG dimensions must be non-zero, got {}x{}",
            width, height
        )));
    }
    if u32::try_from(width).is_err() || u32::try_from(height).is_err() {
        return Err(TileError::encoding(format!("PNG dimensions too large: {}x{}", width, height)));
    }
    let expected = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(bytes_per_pixel))
        .ok_or_else(|| TileError::encoding(format!("PNG dimensions overflow: {}x{}", width, height)))?;
    if len != expected {
        return Err(TileError::encoding(format!(
            "buffer holds {} bytes, {}x{} needs {}",
            len, width, height, expected
        )));
    }
    Ok(())
}

/// Signature plus IHDR. Dimensions were checked to fit `u32`.
fn start_png(width: usize, height: usize, color_type: u8) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&PNG_SIGNATURE);

    let mut ihdr = [0u8; 13];
    ihdr[0..4].copy_from_slice(&(width as u32).to_be_bytes());
    ihdr[4..8].copy_from_slice(&(height as u32).to_be_bytes());
    ihdr[8] = 8; // bit depth
    ihdr[9] = color_type;
    // compression, filter and interlace methods stay 0
    write_chunk(&mut out, b"IHDR", &ihdr);
    out
}

/// IDAT plus IEND.
fn finish_png(
    mut out: Vec<u8>,
    data: &[u8],
    width: usize,
    height: usize,
    bytes_per_pixel: usize,
) -> TileResult<Vec<u8>> {
    let idat = deflate_scanlines(data, width, height, bytes_per_pixel)?;
    write_chunk(&mut out, b"IDAT", &idat);
    write_chunk(&mut out, b"IEND", &[]);
    Ok(out)
}

/// Length, type, data, then CRC over type and data.
fn write_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);

    let mut crc = crc32fast::Hasher::new();
    crc.update(kind);
    crc.update(data);
    out.extend_from_slice(&crc.finalize().to_be_bytes());
}

/// Prefix each scanline with filter type 0 and zlib-compress.
fn deflate_scanlines(
    data: &[u8],
    width: usize,
    height: usize,
    bytes_per_pixel: usize,
) -> TileResult<Vec<u8>> {
    let stride = width * bytes_per_pixel;
    let mut raw = Vec::with_capacity(height * (stride + 1));
    for row in data.chunks_exact(stride) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let compress_err = |e: std::io::Error| TileError::encoding(format!("IDAT compression failed: {}", e));
    let mut zlib = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    zlib.write_all(&raw).map_err(compress_err)?;
    zlib.finish().map_err(compress_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_reuses_indices() {
        let pixels = [
            255, 0, 0, 255, // red
            0, 255, 0, 255, // green
            0, 0, 255, 255, // blue
            255, 0, 0, 255, // red again
        ];

        let (palette, indices) = Palette::index_pixels_sequential(&pixels).unwrap();
        assert_eq!(palette.colors.len(), 3);
        assert_eq!(indices, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_palette_distinguishes_alpha() {
        let pixels = [255, 0, 0, 255, 255, 0, 0, 0];

        let (palette, indices) = Palette::index_pixels_sequential(&pixels).unwrap();
        assert_eq!(palette.colors, vec![[255, 0, 0, 255], [255, 0, 0, 0]]);
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut pixels = Vec::with_capacity(128 * 128 * 4);
        for y in 0..128u32 {
            for x in 0..128u32 {
                let band = ((x / 16) + (y / 16)) % 9;
                pixels.extend_from_slice(&[(band * 20) as u8, 100, 200, 255]);
            }
        }

        let (seq, seq_indices) = Palette::index_pixels_sequential(&pixels).unwrap();
        let (par, par_indices) = Palette::index_pixels_parallel(&pixels).unwrap();
        assert_eq!(seq.colors, par.colors);
        assert_eq!(seq_indices, par_indices);
    }

    #[test]
    fn test_palette_overflow() {
        let pixels: Vec<u8> = (0..300u32)
            .flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 0, 255])
            .collect();
        assert!(Palette::index_pixels_sequential(&pixels).is_none());

        let mut large = pixels.clone();
        large.resize(PARALLEL_PIXELS * 4, 0);
        assert!(Palette::index_pixels_parallel(&large).is_none());
    }

    #[test]
    fn test_dimension_mismatch_is_encoding_error() {
        let err = create_png(&[0u8; 12], 2, 2).unwrap_err();
        assert!(matches!(err, TileError::Encoding(_)));

        let err = create_png_auto(&[], 0, 0).unwrap_err();
        assert!(matches!(err, TileError::Encoding(_)));
    }

    #[test]
    fn test_indexed_rejects_bad_index() {
        let err = create_png_indexed(2, 1, &[[0, 0, 0, 0]], &[0, 1]).unwrap_err();
        assert!(matches!(err, TileError::Encoding(_)));
    }
}
