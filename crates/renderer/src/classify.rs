//! Discrete classification of depth values into display colors.
//!
//! A [`ClassificationTable`] is an ordered list of bands, highest lower bound
//! first. Classification walks the bands top-down and returns the color of
//! the first band whose bound the value meets. Values that are not strictly
//! positive (zero, no-data, negative, NaN) are always transparent.

use overlay_common::{Rgba, TileError, TileResult};
use serde::{Deserialize, Serialize};

/// Inclusive lower bounds of the published flood-depth bands, in meters.
///
/// The lowest band sits below these and is bounded by `> 0.0`.
pub const FLOOD_DEPTH_THRESHOLDS: [f64; 7] = [20.0, 10.0, 5.0, 3.0, 1.0, 0.5, 0.3];

/// Legend labels matching [`FLOOD_DEPTH_THRESHOLDS`] plus the lowest band.
pub const FLOOD_DEPTH_LABELS: [&str; 8] = [
    "20m-", "10-20m", "5-10m", "3-5m", "1-3m", "0.5-1m", "0.3-0.5m", "0-0.3m",
];

/// Lower edge of a band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LowerBound {
    /// Matches `value >= bound`.
    AtLeast(f64),
    /// Matches `value > bound`.
    Above(f64),
}

impl LowerBound {
    #[inline(always)]
    pub fn admits(&self, value: f64) -> bool {
        match *self {
            LowerBound::AtLeast(bound) => value >= bound,
            LowerBound::Above(bound) => value > bound,
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            LowerBound::AtLeast(bound) | LowerBound::Above(bound) => bound,
        }
    }
}

/// One interval of a classification table.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationBand {
    pub lower: LowerBound,
    /// Band color. Only RGB is used; alpha is decided by the caller.
    pub color: Rgba,
    pub label: Option<String>,
}

impl ClassificationBand {
    pub fn new(lower: LowerBound, color: Rgba) -> Self {
        Self {
            lower,
            color,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Ordered, validated set of bands.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationTable {
    name: String,
    bands: Vec<ClassificationBand>,
}

impl ClassificationTable {
    /// Build a table from bands ordered highest bound first.
    ///
    /// Bounds must be finite, non-negative and strictly descending.
    pub fn new(name: impl Into<String>, bands: Vec<ClassificationBand>) -> TileResult<Self> {
        let name = name.into();

        if bands.is_empty() {
            return Err(TileError::config(format!("table '{}' has no bands", name)));
        }

        for (i, band) in bands.iter().enumerate() {
            let bound = band.lower.value();
            if !bound.is_finite() || bound < 0.0 {
                return Err(TileError::config(format!(
                    "table '{}': band {} has invalid lower bound {}",
                    name, i, bound
                )));
            }
        }

        for pair in bands.windows(2) {
            if pair[1].lower.value() >= pair[0].lower.value() {
                return Err(TileError::config(format!(
                    "table '{}': bands must be in descending order ({} follows {})",
                    name,
                    pair[1].lower.value(),
                    pair[0].lower.value()
                )));
            }
        }

        Ok(Self { name, bands })
    }

    /// Build a table on the published flood-depth thresholds.
    ///
    /// `colors` are given top band first; the last color is the `> 0` band.
    pub fn flood_depth(name: impl Into<String>, colors: [Rgba; 8]) -> Self {
        let bands = FLOOD_DEPTH_THRESHOLDS
            .iter()
            .map(|&bound| LowerBound::AtLeast(bound))
            .chain(std::iter::once(LowerBound::Above(0.0)))
            .zip(colors)
            .zip(FLOOD_DEPTH_LABELS)
            .map(|((lower, color), label)| ClassificationBand::new(lower, color).with_label(label))
            .collect();

        Self::from_trusted(name.into(), bands)
    }

    /// Build from built-in bands that are descending by construction.
    pub(crate) fn from_trusted(name: String, bands: Vec<ClassificationBand>) -> Self {
        debug_assert!(bands
            .windows(2)
            .all(|pair| pair[1].lower.value() < pair[0].lower.value()));
        Self { name, bands }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bands(&self) -> &[ClassificationBand] {
        &self.bands
    }

    /// Index of the band a value falls in, or `None` for the transparent case.
    #[inline]
    pub fn band_index(&self, value: f64) -> Option<usize> {
        // Also rejects NaN.
        if !(value > 0.0) {
            return None;
        }
        self.bands.iter().position(|band| band.lower.admits(value))
    }

    /// Classify a value, applying `alpha` to the matched band's color.
    #[inline]
    pub fn classify(&self, value: f64, alpha: u8) -> Rgba {
        match self.band_index(value) {
            Some(idx) => self.bands[idx].color.with_alpha(alpha),
            None => Rgba::TRANSPARENT,
        }
    }

    /// `(label, color)` pairs top-down, for legend rendering.
    pub fn legend(&self, alpha: u8) -> Vec<(String, Rgba)> {
        self.bands
            .iter()
            .map(|band| {
                let label = band.label.clone().unwrap_or_else(|| match band.lower {
                    LowerBound::AtLeast(v) => format!(">={}", v),
                    LowerBound::Above(v) => format!(">{}", v),
                });
                (label, band.color.with_alpha(alpha))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ClassificationTable {
        ClassificationTable::new(
            "test",
            vec![
                ClassificationBand::new(LowerBound::AtLeast(1.0), Rgba::rgb(255, 0, 0)),
                ClassificationBand::new(LowerBound::Above(0.0), Rgba::rgb(0, 0, 255)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_lower_bound_inclusivity() {
        assert!(LowerBound::AtLeast(1.0).admits(1.0));
        assert!(!LowerBound::Above(0.0).admits(0.0));
        assert!(LowerBound::Above(0.0).admits(f64::MIN_POSITIVE));
    }

    #[test]
    fn test_band_index() {
        let t = table();
        assert_eq!(t.band_index(5.0), Some(0));
        assert_eq!(t.band_index(1.0), Some(0));
        assert_eq!(t.band_index(0.999), Some(1));
        assert_eq!(t.band_index(0.0), None);
        assert_eq!(t.band_index(-1.0), None);
        assert_eq!(t.band_index(f64::NAN), None);
    }

    #[test]
    fn test_unmatched_value_is_transparent() {
        let t = ClassificationTable::new(
            "sparse",
            vec![ClassificationBand::new(LowerBound::AtLeast(0.1), Rgba::rgb(1, 2, 3))],
        )
        .unwrap();
        assert_eq!(t.classify(0.05, 255), Rgba::TRANSPARENT);
        assert_eq!(t.classify(0.1, 255), Rgba::new(1, 2, 3, 255));
    }

    #[test]
    fn test_rejects_ascending_bands() {
        let result = ClassificationTable::new(
            "bad",
            vec![
                ClassificationBand::new(LowerBound::AtLeast(0.5), Rgba::rgb(0, 0, 0)),
                ClassificationBand::new(LowerBound::AtLeast(1.0), Rgba::rgb(0, 0, 0)),
            ],
        );
        assert!(matches!(result, Err(TileError::Config(_))));
    }

    #[test]
    fn test_rejects_duplicate_bound() {
        let result = ClassificationTable::new(
            "bad",
            vec![
                ClassificationBand::new(LowerBound::AtLeast(0.5), Rgba::rgb(0, 0, 0)),
                ClassificationBand::new(LowerBound::Above(0.5), Rgba::rgb(0, 0, 0)),
            ],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_negative_and_empty() {
        assert!(ClassificationTable::new("empty", vec![]).is_err());
        assert!(ClassificationTable::new(
            "neg",
            vec![ClassificationBand::new(LowerBound::AtLeast(-1.0), Rgba::rgb(0, 0, 0))],
        )
        .is_err());
    }

    #[test]
    fn test_flood_depth_layout() {
        let colors = [Rgba::rgb(0, 0, 0); 8];
        let t = ClassificationTable::flood_depth("layout", colors);
        let bounds: Vec<LowerBound> = t.bands().iter().map(|b| b.lower).collect();
        assert_eq!(bounds.len(), 8);
        assert_eq!(bounds[0], LowerBound::AtLeast(20.0));
        assert_eq!(bounds[6], LowerBound::AtLeast(0.3));
        assert_eq!(bounds[7], LowerBound::Above(0.0));
    }

    #[test]
    fn test_legend_labels() {
        let legend = table().legend(128);
        assert_eq!(legend[0].0, ">=1");
        assert_eq!(legend[1].0, ">0");
        assert_eq!(legend[1].1, Rgba::new(0, 0, 255, 128));
    }
}
