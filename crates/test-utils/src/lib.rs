//! Shared test utilities for the flood-overlay workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Generators for numeric-PNG encoded depth rasters
//! - Known pixel fixtures with their expected overlay colors
//! - Approximate equality assertions
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

/// Assert two depths agree within a tolerance (default: a tenth of the
/// encoding step, 0.0001 m).
///
/// ```
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(0.3000000001, 0.3);
/// assert_approx_eq!(1.0004, 1.0, 0.0005);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($actual:expr, $expected:expr) => {
        $crate::assert_approx_eq!($actual, $expected, 0.0001)
    };
    ($actual:expr, $expected:expr, $tolerance:expr) => {{
        let (actual, expected, tolerance) = ($actual as f64, $expected as f64, $tolerance as f64);
        assert!(
            (actual - expected).abs() <= tolerance,
            "depth {} differs from {} by more than {}",
            actual,
            expected,
            tolerance
        );
    }};
}

/// Assert that the pixel at `(x, y)` of an RGBA buffer equals `expected`.
#[macro_export]
macro_rules! assert_pixel_eq {
    ($pixels:expr, $width:expr, ($x:expr, $y:expr), $expected:expr) => {{
        let offset = (($y) * ($width) + ($x)) * 4;
        let actual = &$pixels[offset..offset + 4];
        let expected: [u8; 4] = $expected;
        assert_eq!(
            actual,
            &expected[..],
            "pixel ({}, {}) mismatch",
            $x,
            $y
        );
    }};
}
