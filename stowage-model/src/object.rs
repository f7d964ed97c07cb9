use crate::SubObjectRef;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use stowage_types::{ContainerId, ObjectId, TypeKey};

/// A sub-object as held by a storage backend.
///
/// The `data` payload is free-form JSON whose shape is defined by the
/// type's descriptor (defaults, toggle fields, owner field).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubObject {
    pub id: ObjectId,
    pub type_key: TypeKey,
    pub name: String,
    #[serde(default = "empty_object")]
    pub data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<ContainerId>,
    /// Hidden sub-objects stay in the item list but are skipped by inspectors.
    #[serde(default)]
    pub hidden: bool,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl SubObject {
    /// Creates a sub-object with a fresh id and an empty JSON object payload.
    pub fn new(type_key: TypeKey, name: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            type_key,
            name: name.into(),
            data: empty_object(),
            owner: None,
            hidden: false,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// The identity handle for this object.
    pub fn reference(&self) -> SubObjectRef {
        SubObjectRef::new(self.id, self.type_key.clone())
    }

    /// Extract a string value from `data` using a JSON pointer (e.g., "/title").
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.data.pointer(pointer).and_then(|v| v.as_str())
    }

    /// Extract a boolean value from `data` using a JSON pointer.
    pub fn get_bool(&self, pointer: &str) -> Option<bool> {
        self.data.pointer(pointer).and_then(|v| v.as_bool())
    }

    /// Extract a numeric value from `data` using a JSON pointer.
    pub fn get_number(&self, pointer: &str) -> Option<f64> {
        self.data.pointer(pointer).and_then(|v| v.as_f64())
    }

    /// Write `value` at a JSON pointer.
    ///
    /// An existing value is replaced. A missing leaf is inserted when its
    /// parent resolves to a JSON object. Returns false when the pointer
    /// cannot be resolved (missing parent, parent is a scalar or array).
    pub fn set_value(&mut self, pointer: &str, value: serde_json::Value) -> bool {
        if pointer.is_empty() {
            self.data = value;
            return true;
        }
        if let Some(slot) = self.data.pointer_mut(pointer) {
            *slot = value;
            return true;
        }
        let Some((parent, token)) = pointer.rsplit_once('/') else {
            return false;
        };
        let field = token.replace("~1", "/").replace("~0", "~");
        match self.data.pointer_mut(parent) {
            Some(serde_json::Value::Object(map)) => {
                map.insert(field, value);
                true
            }
            _ => false,
        }
    }

    /// Write a boolean at a JSON pointer. See [`SubObject::set_value`].
    pub fn set_bool(&mut self, pointer: &str, value: bool) -> bool {
        self.set_value(pointer, serde_json::Value::Bool(value))
    }

    /// Decode the payload into a typed view.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data)
    }
}
