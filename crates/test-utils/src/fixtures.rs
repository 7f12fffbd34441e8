//! Known source pixels and the overlay colors they must produce.

/// A source pixel and its expected output under each built-in profile.
#[derive(Debug, Clone, Copy)]
pub struct PixelCase {
    pub name: &'static str,
    pub source: [u8; 4],
    /// Expected output with the opaque MLIT profile.
    pub strict: [u8; 4],
    /// Expected output with the barrier-free profile at its default alpha.
    pub configurable: [u8; 4],
}

/// Pixels covering every band, the zero/no-data case and the
/// transparency merge.
pub const PIXEL_CASES: &[PixelCase] = &[
    PixelCase {
        name: "one_meter",
        source: [0, 3, 232, 255],
        strict: [255, 216, 192, 255],
        configurable: [255, 216, 192, 204],
    },
    PixelCase {
        name: "zero_opaque",
        source: [0, 0, 0, 255],
        strict: [0, 0, 0, 0],
        configurable: [0, 0, 0, 0],
    },
    PixelCase {
        name: "zero_transparent",
        source: [0, 0, 0, 0],
        strict: [0, 0, 0, 0],
        configurable: [0, 0, 0, 0],
    },
    PixelCase {
        name: "deep_transparent_source",
        source: [0, 78, 32, 0],
        strict: [220, 122, 220, 0],
        configurable: [220, 122, 220, 0],
    },
    PixelCase {
        name: "twenty_meters",
        source: [0, 78, 32, 255],
        strict: [220, 122, 220, 255],
        configurable: [220, 122, 220, 204],
    },
    PixelCase {
        name: "ten_centimeters",
        source: [0, 0, 100, 255],
        strict: [247, 245, 169, 255],
        configurable: [255, 255, 179, 204],
    },
    PixelCase {
        name: "one_millimeter",
        source: [0, 0, 1, 255],
        strict: [247, 245, 169, 255],
        configurable: [255, 255, 179, 204],
    },
    PixelCase {
        name: "max_value",
        source: [255, 255, 255, 255],
        strict: [220, 122, 220, 255],
        configurable: [220, 122, 220, 204],
    },
];

/// Example URL for the strict-transparency scheme.
pub const SHINSUI_TILE_URL: &str = "shinsui://tiles/5/10/12.png";

/// Example URL for the configurable-alpha scheme.
pub const NUMPNG_TILE_URL: &str = "numpng://tiles/5/10/12.png";
