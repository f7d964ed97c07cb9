//! Capability toggles: the aggregate "enabled" flag of a sub-object.
//!
//! Types declare boolean toggle fields on any level of their hierarchy. The
//! registry flattens them per type; this module reads and writes them.

use crate::registry::TypeRegistry;
use stowage_model::{SubObject, TypeKey};
use tracing::error;

/// One discovered toggle field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ToggleHandle {
    declared_on: TypeKey,
    pointer: String,
}

impl ToggleHandle {
    pub fn new(declared_on: TypeKey, pointer: impl Into<String>) -> Self {
        Self {
            declared_on,
            pointer: pointer.into(),
        }
    }

    /// The hierarchy level that declared the field.
    #[must_use]
    pub fn declared_on(&self) -> &TypeKey {
        &self.declared_on
    }

    #[must_use]
    pub fn pointer(&self) -> &str {
        &self.pointer
    }

    /// Current value; a missing or non-boolean field reads as off.
    #[must_use]
    pub fn read(&self, object: &SubObject) -> bool {
        object.get_bool(&self.pointer).unwrap_or(false)
    }
}

/// All toggle fields of `object`'s type and its ancestors, most-derived
/// first.
///
/// A broken type hierarchy is logged and yields no fields.
pub fn discover_toggle_fields(registry: &TypeRegistry, object: &SubObject) -> Vec<ToggleHandle> {
    match registry.toggle_fields(&object.type_key) {
        Ok(fields) => fields.to_vec(),
        Err(e) => {
            error!(object_id = %object.id, type_key = %object.type_key, "Toggle discovery aborted: {}", e);
            Vec::new()
        }
    }
}

/// Enabled when any field is on. No fields means not enabled.
#[must_use]
pub fn aggregate_enabled(object: &SubObject, fields: &[ToggleHandle]) -> bool {
    fields.iter().any(|field| field.read(object))
}

/// Writes `value` to every field. Returns how many fields were written.
pub fn set_aggregate_enabled(object: &mut SubObject, fields: &[ToggleHandle], value: bool) -> usize {
    fields
        .iter()
        .filter(|field| object.set_bool(&field.pointer, value))
        .count()
}
