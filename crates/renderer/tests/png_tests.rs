//! Tests for PNG encoding of overlay tiles.
//!
//! Covers indexed vs RGBA selection, transparency in indexed output, and
//! decoding of the produced files.

use renderer::png::{create_png, create_png_auto, create_png_indexed, PNG_SIGNATURE};
use renderer::style::Profile;
use renderer::transform::{transform_in_place, TransformOptions};
use test_utils::{decode_rgba, depth_ramp_with_holes};

/// Read the IHDR color type byte.
fn color_type(png: &[u8]) -> u8 {
    // signature(8) + length(4) + "IHDR"(4) + width(4) + height(4) + depth(1)
    png[25]
}

fn has_chunk(png: &[u8], name: &[u8; 4]) -> bool {
    png.windows(4).any(|w| w == name)
}

fn classified_tile(width: usize, height: usize) -> Vec<u8> {
    let mut pixels = depth_ramp_with_holes(width, height, 30.0);
    transform_in_place(&mut pixels, &Profile::configurable_alpha(), TransformOptions::default());
    pixels
}

// ============================================================================
// Basic PNG creation tests
// ============================================================================

#[test]
fn test_create_png_rgba_signature_and_type() {
    let pixels = [
        255, 0, 0, 255, // red
        0, 255, 0, 255, // green
        0, 0, 255, 255, // blue
        255, 255, 0, 255, // yellow
    ];

    let png = create_png(&pixels, 2, 2).unwrap();
    assert_eq!(&png[0..8], &PNG_SIGNATURE);
    assert_eq!(color_type(&png), 6);

    let (w, h, decoded) = decode_rgba(&png);
    assert_eq!((w, h), (2, 2));
    assert_eq!(decoded, pixels.to_vec());
}

#[test]
fn test_classified_tile_uses_indexed_png() {
    let pixels = classified_tile(256, 256);
    let png = create_png_auto(&pixels, 256, 256).unwrap();

    assert_eq!(color_type(&png), 3);
    assert!(has_chunk(&png, b"PLTE"));
    assert!(has_chunk(&png, b"tRNS"));

    let (_, _, decoded) = decode_rgba(&png);
    assert_eq!(decoded, pixels);
}

#[test]
fn test_indexed_smaller_than_rgba_for_classified_tile() {
    let pixels = classified_tile(256, 256);
    let indexed = create_png_auto(&pixels, 256, 256).unwrap();
    let rgba = create_png(&pixels, 256, 256).unwrap();

    assert!(
        indexed.len() < rgba.len(),
        "Indexed PNG ({} bytes) should be smaller than RGBA ({} bytes)",
        indexed.len(),
        rgba.len()
    );
}

#[test]
fn test_opaque_palette_has_no_trns() {
    let palette = [[255, 0, 0, 255], [0, 0, 255, 255]];
    let png = create_png_indexed(2, 1, &palette, &[0, 1]).unwrap();
    assert!(!has_chunk(&png, b"tRNS"));

    let (_, _, decoded) = decode_rgba(&png);
    assert_eq!(decoded, vec![255, 0, 0, 255, 0, 0, 255, 255]);
}

// ============================================================================
// Format selection tests
// ============================================================================

#[test]
fn test_create_png_rgba_fallback_many_colors() {
    let mut pixels = Vec::with_capacity(300 * 4);
    for i in 0..300u32 {
        pixels.push((i % 256) as u8);
        pixels.push((i / 256) as u8);
        pixels.push(0);
        pixels.push(255);
    }

    let png = create_png_auto(&pixels, 300, 1).unwrap();
    assert_eq!(color_type(&png), 6);
    let (_, _, decoded) = decode_rgba(&png);
    assert_eq!(decoded, pixels);
}

#[test]
fn test_output_is_deterministic() {
    let pixels = classified_tile(128, 128);
    let a = create_png_auto(&pixels, 128, 128).unwrap();
    let b = create_png_auto(&pixels, 128, 128).unwrap();
    assert_eq!(a, b);
}
