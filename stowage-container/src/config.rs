//! Session configuration, read from an optional TOML file.
//!
//! ```toml
//! max_hierarchy_depth = 64
//! naming = "menu"
//! sort_menu_case_insensitive = true
//! ```

use crate::error::{ContainerError, ContainerResult};
use crate::registry::DEFAULT_MAX_HIERARCHY_DEPTH;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// How newly created sub-objects are named.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingStyle {
    #[default]
    /// The type's short name ("Apple" for `food::Apple`).
    Type,
    /// The last segment of the add-menu title ("Objective" for
    /// "Gameplay/Objective"), falling back to the short name.
    Menu,
}

/// Tunables for a [`crate::ContainerSession`] and registry builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Ancestor chains longer than this are treated as broken.
    pub max_hierarchy_depth: usize,
    pub naming: NamingStyle,
    pub sort_menu_case_insensitive: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            max_hierarchy_depth: DEFAULT_MAX_HIERARCHY_DEPTH,
            naming: NamingStyle::default(),
            sort_menu_case_insensitive: true,
        }
    }
}

impl ContainerConfig {
    /// Parses a config, failing on malformed input.
    pub fn from_toml_str(contents: &str) -> ContainerResult<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ContainerError::Config(e.to_string()))?;
        if config.max_hierarchy_depth == 0 {
            return Err(ContainerError::Config(
                "max_hierarchy_depth must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    /// Loads a config file if it exists.
    /// Falls back to defaults with a warning on read or parse errors.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No container config at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!("Loaded container config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!(
                        "Failed to parse container config {:?}: {}. Using defaults.",
                        path, e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read container config {:?}: {}", path, e);
                Self::default()
            }
        }
    }
}
