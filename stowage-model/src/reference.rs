use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use stowage_types::{ObjectId, TypeKey};

/// A container's handle to one sub-object.
///
/// Equality and hashing use the id only: two handles to the same stored
/// object are the same reference even if one carries a stale type key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubObjectRef {
    id: ObjectId,
    #[serde(rename = "type")]
    type_key: TypeKey,
}

impl SubObjectRef {
    pub fn new(id: ObjectId, type_key: TypeKey) -> Self {
        Self { id, type_key }
    }

    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The runtime type recorded for the referenced object.
    #[must_use]
    pub fn type_key(&self) -> &TypeKey {
        &self.type_key
    }
}

impl PartialEq for SubObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SubObjectRef {}

impl Hash for SubObjectRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for SubObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.type_key)
    }
}
