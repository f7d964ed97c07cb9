//! Type manifests: descriptors and declarative filters in TOML.
//!
//! ```toml
//! [[types]]
//! key = "food::Fruit"
//! category = "sub_object"
//! menu = { menu_name = "Food/Fruit" }
//! toggles = [{ pointer = "/enabled" }]
//! defaults = { enabled = true }
//!
//! [[filters]]
//! container = "food::Basket"
//! name = "basket::no_meat"
//! priority = 10
//! deny = ["food::Meat"]
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use stowage_container::{FilterEntry, TypeRegistry, TypeRegistryBuilder};
use stowage_model::{TypeDescriptor, TypeKey};
use tracing::debug;

/// A declarative filter stage. Types match an entry when they are that type
/// or derive from or implement it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FilterSpec {
    pub container: TypeKey,
    pub name: String,
    #[serde(default)]
    pub priority: i32,
    /// When non-empty, only matching candidates survive.
    #[serde(default)]
    pub allow: Vec<TypeKey>,
    /// Matching candidates are removed.
    #[serde(default)]
    pub deny: Vec<TypeKey>,
}

impl FilterSpec {
    fn into_entry(self) -> (TypeKey, FilterEntry) {
        let Self {
            container,
            name,
            priority,
            allow,
            deny,
        } = self;
        let entry = FilterEntry::new(priority, name, move |ctx, candidates| {
            let matches_any =
                |candidate: &TypeKey, keys: &[TypeKey]| keys.iter().any(|k| ctx.is_assignable(candidate, k));
            candidates.retain(|candidate| {
                (allow.is_empty() || matches_any(candidate, &allow)) && !matches_any(candidate, &deny)
            });
        });
        (container, entry)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TypeManifest {
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
}

impl TypeManifest {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid type manifest")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read type manifest {}", path.display()))?;
        let manifest = Self::from_toml_str(&contents)
            .with_context(|| format!("in {}", path.display()))?;
        debug!(
            types = manifest.types.len(),
            filters = manifest.filters.len(),
            "Loaded type manifest from {:?}",
            path
        );
        Ok(manifest)
    }

    pub fn build_registry(self, max_hierarchy_depth: usize) -> Result<TypeRegistry> {
        let mut builder = TypeRegistryBuilder::new().max_hierarchy_depth(max_hierarchy_depth);
        for descriptor in self.types {
            builder = builder.register(descriptor);
        }
        for filter in self.filters {
            let (container, entry) = filter.into_entry();
            builder = builder.register_filter(container, entry);
        }
        builder.build().context("type manifest does not form a valid registry")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_manifest_is_valid() {
        let manifest = TypeManifest::from_toml_str("").unwrap();
        assert!(manifest.types.is_empty());
        assert!(manifest.filters.is_empty());
    }

    #[test]
    fn filter_defaults() {
        let manifest = TypeManifest::from_toml_str(
            r#"
            [[filters]]
            container = "a::Box"
            name = "a::Box::any"
            "#,
        )
        .unwrap();
        let filter = &manifest.filters[0];
        assert_eq!(filter.priority, 0);
        assert!(filter.allow.is_empty());
        assert!(filter.deny.is_empty());
    }

    #[test]
    fn malformed_type_key_is_rejected() {
        let result = TypeManifest::from_toml_str(
            r#"
            [[types]]
            key = "a::::B"
            category = "sub_object"
            "#,
        );
        assert!(result.is_err());
    }
}
