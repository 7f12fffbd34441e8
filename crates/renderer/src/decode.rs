//! Decoding of numeric PNG pixels into depth values.
//!
//! Each pixel's RGB channels form one big-endian 24-bit unsigned integer
//! holding thousandths of a meter:
//!
//! ```text
//! value = (r * 65536 + g * 256 + b) * 0.001
//! ```
//!
//! Zero doubles as the no-data sentinel; the encoding cannot tell them apart.

/// Meters per raw integer step.
pub const SCALE: f64 = 0.001;

/// Largest raw value three channels can hold.
pub const MAX_RAW: u32 = 0xFF_FFFF;

/// Largest decodable value in meters (16777.215).
pub const MAX_VALUE: f64 = MAX_RAW as f64 * SCALE;

/// Combine three channels into the raw 24-bit integer.
#[inline(always)]
pub fn raw_value(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Decode one pixel's channels into meters.
///
/// Total over all inputs; the result is always finite and non-negative.
#[inline(always)]
pub fn decode(r: u8, g: u8, b: u8) -> f64 {
    raw_value(r, g, b) as f64 * SCALE
}

/// Encode meters back into the three channels.
///
/// Rounds to the nearest thousandth and clamps to the 24-bit range. Negative
/// and non-finite values encode as zero.
pub fn encode(value: f64) -> [u8; 3] {
    if !value.is_finite() || value <= 0.0 {
        return [0, 0, 0];
    }

    let raw = (value / SCALE).round().min(MAX_RAW as f64) as u32;
    [(raw >> 16) as u8, (raw >> 8) as u8, raw as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_channel_weights() {
        assert_eq!(decode(0, 0, 0), 0.0);
        assert_eq!(decode(0, 0, 1), 1.0 * SCALE);
        assert_eq!(decode(0, 1, 0), 256.0 * SCALE);
        assert_eq!(decode(1, 0, 0), 65536.0 * SCALE);
    }

    #[test]
    fn test_decode_one_meter() {
        // 1000 = 0x0003E8
        assert_eq!(decode(0, 3, 232), 1.0);
    }

    #[test]
    fn test_decode_max() {
        assert_eq!(decode(255, 255, 255), MAX_VALUE);
        assert!((MAX_VALUE - 16777.215).abs() < 1e-9);
    }

    #[test]
    fn test_encode_inverse() {
        assert_eq!(encode(1.0), [0, 3, 232]);
        assert_eq!(encode(0.3), [0, 1, 44]);
        assert_eq!(encode(20.0), [0, 78, 32]);
    }

    #[test]
    fn test_encode_out_of_range() {
        assert_eq!(encode(0.0), [0, 0, 0]);
        assert_eq!(encode(-2.5), [0, 0, 0]);
        assert_eq!(encode(f64::NAN), [0, 0, 0]);
        assert_eq!(encode(f64::INFINITY), [0, 0, 0]);
        assert_eq!(encode(1.0e9), [255, 255, 255]);
    }
}
