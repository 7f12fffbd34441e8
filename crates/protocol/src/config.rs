//! Protocol registration config (JSON).
//!
//! ```json
//! {
//!   "styles": "styles/flood.json",
//!   "protocols": [
//!     { "scheme": "shinsui", "table": "mlit" },
//!     { "scheme": "numpng", "table": "mlit-barrier-free", "alpha": 180 }
//!   ]
//! }
//! ```
//!
//! `table` names a table from the optional style document first, then a
//! built-in profile.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use overlay_common::{TileError, TileResult};
use renderer::style::{MLIT, MLIT_BARRIER_FREE};
use renderer::{Profile, StyleConfig};
use serde::{Deserialize, Serialize};

use crate::handler::OverlayProtocol;
use crate::loader::ImageLoader;
use crate::registry::{validate_scheme, ProtocolRegistry};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProtocolConfig {
    /// Style document with additional tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<PathBuf>,
    pub protocols: Vec<ProtocolEntry>,
}

/// One scheme to register.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProtocolEntry {
    pub scheme: String,
    pub table: String,
    /// Requested alpha. Ignored by fixed-alpha tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<u8>,
}

impl ProtocolEntry {
    pub fn new(scheme: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            table: table.into(),
            alpha: None,
        }
    }
}

impl Default for ProtocolConfig {
    /// `shinsui` with the opaque MLIT table, `numpng` with the barrier-free one.
    fn default() -> Self {
        Self {
            styles: None,
            protocols: vec![
                ProtocolEntry::new("shinsui", MLIT),
                ProtocolEntry::new("numpng", MLIT_BARRIER_FREE),
            ],
        }
    }
}

impl ProtocolConfig {
    pub fn from_json(json_str: &str) -> TileResult<Self> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Load from a file. A relative `styles` path is taken relative to the
    /// config file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> TileResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TileError::config(format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut config = Self::from_json(&content)?;
        if let (Some(styles), Some(dir)) = (config.styles.as_mut(), path.parent()) {
            if styles.is_relative() {
                *styles = dir.join(&*styles);
            }
        }
        Ok(config)
    }

    /// Resolve every entry to its profile, checking scheme names on the way.
    pub fn resolve(&self) -> TileResult<Vec<(ProtocolEntry, Profile)>> {
        let styles = self
            .styles
            .as_ref()
            .map(|path| StyleConfig::from_file(path))
            .transpose()?;

        let mut seen = std::collections::HashSet::new();
        self.protocols
            .iter()
            .map(|entry| {
                validate_scheme(&entry.scheme)?;
                if !seen.insert(entry.scheme.as_str()) {
                    return Err(TileError::AlreadyRegistered(entry.scheme.clone()));
                }

                let profile = match styles.as_ref() {
                    Some(styles) if styles.tables.contains_key(&entry.table) => {
                        styles.profile(&entry.table)?
                    }
                    _ => Profile::builtin(&entry.table).ok_or_else(|| {
                        TileError::config(format!(
                            "unknown table '{}' for scheme '{}'",
                            entry.table, entry.scheme
                        ))
                    })?,
                };
                Ok((entry.clone(), profile))
            })
            .collect()
    }

    /// Register every configured scheme, all sharing `loader`.
    ///
    /// All or nothing: on error the registry holds exactly the schemes it
    /// held before the call.
    pub fn register(
        &self,
        registry: &ProtocolRegistry,
        loader: Arc<dyn ImageLoader>,
    ) -> TileResult<()> {
        let resolved = self.resolve()?;
        if let Some((entry, _)) = resolved.iter().find(|(e, _)| registry.get(&e.scheme).is_some()) {
            return Err(TileError::AlreadyRegistered(entry.scheme.clone()));
        }

        let mut added: Vec<String> = Vec::with_capacity(resolved.len());
        for (entry, profile) in resolved {
            let mut handler = OverlayProtocol::new(entry.scheme.clone(), profile, loader.clone());
            if let Some(alpha) = entry.alpha {
                handler = handler.with_alpha(alpha);
            }
            if let Err(e) = registry.add_protocol(entry.scheme.clone(), Arc::new(handler)) {
                // lost a race with a concurrent registration
                for scheme in &added {
                    registry.remove_protocol(scheme);
                }
                return Err(e);
            }
            added.push(entry.scheme);
        }
        Ok(())
    }
}
