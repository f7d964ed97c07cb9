//! The asset file: one container plus the sub-objects stored with it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use stowage_container::{Container, MemoryStorage};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetFile {
    pub container: Container,
    #[serde(default)]
    pub storage: MemoryStorage,
}

impl AssetFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read asset {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse asset {}", path.display()))
    }

    /// Writes the asset as pretty JSON, via a temp file next to the target.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to encode asset")?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("failed to replace asset {}", path.display()))
    }
}
