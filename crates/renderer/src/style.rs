//! Classification profiles: a color table plus an alpha policy.
//!
//! Built-in profiles cover the published palettes. Additional profiles can be
//! loaded from a JSON style document:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "tables": {
//!     "custom": {
//!       "name": "Custom",
//!       "alpha": { "configurable": { "default": 204 } },
//!       "bands": [
//!         { "min": 1.0, "color": "#FF0000", "label": "1m-" },
//!         { "min": 0.0, "exclusive": true, "color": "#0000FF" }
//!       ]
//!     }
//!   }
//! }
//! ```

use crate::classify::{ClassificationBand, ClassificationTable, LowerBound};
use overlay_common::{Rgba, TileError, TileResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Name of the strict-transparency MLIT palette (opaque bands).
pub const MLIT: &str = "mlit";

/// Name of the barrier-free MLIT palette (semi-transparent bands).
pub const MLIT_BARRIER_FREE: &str = "mlit-barrier-free";

/// Name of the Tokyo detailed palette.
pub const TOKYO_DETAILED: &str = "tokyo-detailed";

/// Default alpha for semi-transparent overlays.
pub const DEFAULT_OVERLAY_ALPHA: u8 = 204;

/// How the alpha of classified pixels is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlphaPolicy {
    /// Always this alpha; requested values are ignored.
    Fixed(u8),
    /// The requested alpha, or `default` when none is requested.
    Configurable { default: u8 },
}

impl AlphaPolicy {
    pub fn resolve(&self, requested: Option<u8>) -> u8 {
        match *self {
            AlphaPolicy::Fixed(alpha) => alpha,
            AlphaPolicy::Configurable { default } => requested.unwrap_or(default),
        }
    }
}

/// A classification table with its alpha policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub name: String,
    pub description: Option<String>,
    pub table: ClassificationTable,
    pub alpha: AlphaPolicy,
}

impl Profile {
    pub fn new(table: ClassificationTable, alpha: AlphaPolicy) -> Self {
        Self {
            name: table.name().to_string(),
            description: None,
            table,
            alpha,
        }
    }

    /// Classify a value under this profile.
    ///
    /// `alpha` is only honored by configurable profiles.
    #[inline]
    pub fn classify(&self, value: f64, alpha: Option<u8>) -> Rgba {
        self.table.classify(value, self.alpha.resolve(alpha))
    }

    /// Profile A: MLIT flood-depth palette, opaque, the two lowest bands
    /// sharing one color.
    pub fn strict_transparency() -> Self {
        let table = ClassificationTable::flood_depth(
            MLIT,
            [
                Rgba::rgb(220, 122, 220),
                Rgba::rgb(242, 133, 201),
                Rgba::rgb(255, 145, 145),
                Rgba::rgb(255, 183, 183),
                Rgba::rgb(255, 216, 192),
                Rgba::rgb(248, 225, 166),
                Rgba::rgb(247, 245, 169),
                Rgba::rgb(247, 245, 169),
            ],
        );
        Self {
            description: Some("MLIT flood depth palette, opaque".to_string()),
            ..Self::new(table, AlphaPolicy::Fixed(255))
        }
    }

    /// Profile B: MLIT barrier-free palette with a distinct color per band
    /// and configurable alpha.
    pub fn configurable_alpha() -> Self {
        let table = ClassificationTable::flood_depth(
            MLIT_BARRIER_FREE,
            [
                Rgba::rgb(220, 122, 220),
                Rgba::rgb(242, 133, 201),
                Rgba::rgb(255, 145, 145),
                Rgba::rgb(255, 183, 183),
                Rgba::rgb(255, 216, 192),
                Rgba::rgb(248, 225, 166),
                Rgba::rgb(247, 245, 169),
                Rgba::rgb(255, 255, 179),
            ],
        );
        Self {
            description: Some("MLIT barrier-free palette, semi-transparent".to_string()),
            ..Self::new(
                table,
                AlphaPolicy::Configurable {
                    default: DEFAULT_OVERLAY_ALPHA,
                },
            )
        }
    }

    /// Tokyo detailed palette, which uses its own thresholds.
    pub fn tokyo_detailed() -> Self {
        let bands = [
            (LowerBound::AtLeast(5.0), Rgba::rgb(223, 115, 255), "5m-"),
            (LowerBound::AtLeast(3.0), Rgba::rgb(0, 112, 255), "3-5m"),
            (LowerBound::AtLeast(2.0), Rgba::rgb(45, 193, 223), "2-3m"),
            (LowerBound::AtLeast(1.0), Rgba::rgb(115, 255, 222), "1-2m"),
            (LowerBound::AtLeast(0.5), Rgba::rgb(77, 230, 0), "0.5-1m"),
            (LowerBound::AtLeast(0.1), Rgba::rgb(255, 255, 0), "0.1-0.5m"),
            (LowerBound::Above(0.0), Rgba::rgb(255, 255, 204), "0-0.1m"),
        ]
        .into_iter()
        .map(|(lower, color, label)| ClassificationBand::new(lower, color).with_label(label))
        .collect();

        let table = ClassificationTable::from_trusted(TOKYO_DETAILED.to_string(), bands);

        Self {
            description: Some("Tokyo detailed flood depth palette".to_string()),
            ..Self::new(
                table,
                AlphaPolicy::Configurable {
                    default: DEFAULT_OVERLAY_ALPHA,
                },
            )
        }
    }

    /// Look up a built-in profile by name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            MLIT => Some(Self::strict_transparency()),
            MLIT_BARRIER_FREE => Some(Self::configurable_alpha()),
            TOKYO_DETAILED => Some(Self::tokyo_detailed()),
            _ => None,
        }
    }

    pub fn builtin_names() -> [&'static str; 3] {
        [MLIT, MLIT_BARRIER_FREE, TOKYO_DETAILED]
    }
}

/// Style document holding named table definitions.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StyleConfig {
    #[serde(default = "default_version")]
    pub version: String,
    pub tables: HashMap<String, TableDefinition>,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// A single table definition as written in JSON.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TableDefinition {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default = "default_alpha")]
    pub alpha: AlphaPolicy,
    pub bands: Vec<BandDefinition>,
}

fn default_alpha() -> AlphaPolicy {
    AlphaPolicy::Configurable {
        default: DEFAULT_OVERLAY_ALPHA,
    }
}

/// A band as written in JSON. `exclusive` turns `>=` into `>`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BandDefinition {
    pub min: f64,
    #[serde(default)]
    pub exclusive: bool,
    pub color: String,
    pub label: Option<String>,
}

impl StyleConfig {
    /// Load style configuration from JSON string
    pub fn from_json(json_str: &str) -> TileResult<Self> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Load style configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> TileResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| TileError::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Build the profile for the table stored under `key`.
    pub fn profile(&self, key: &str) -> TileResult<Profile> {
        let def = self
            .tables
            .get(key)
            .ok_or_else(|| TileError::config(format!("table '{}' not found in style", key)))?;
        def.to_profile(key)
    }

    /// Build every profile in the document, keyed by table key.
    pub fn profiles(&self) -> TileResult<HashMap<String, Profile>> {
        self.tables
            .iter()
            .map(|(key, def)| Ok((key.clone(), def.to_profile(key)?)))
            .collect()
    }
}

impl TableDefinition {
    fn to_profile(&self, key: &str) -> TileResult<Profile> {
        let bands = self
            .bands
            .iter()
            .map(|band| {
                let color = Rgba::from_hex(&band.color).ok_or_else(|| {
                    TileError::config(format!("table '{}': invalid color '{}'", key, band.color))
                })?;
                let lower = if band.exclusive {
                    LowerBound::Above(band.min)
                } else {
                    LowerBound::AtLeast(band.min)
                };
                let mut parsed = ClassificationBand::new(lower, color);
                parsed.label = band.label.clone();
                Ok(parsed)
            })
            .collect::<TileResult<Vec<_>>>()?;

        let table = ClassificationTable::new(key, bands)?;

        Ok(Profile {
            name: self.name.clone().unwrap_or_else(|| key.to_string()),
            description: self.description.clone(),
            table,
            alpha: self.alpha,
        })
    }
}
