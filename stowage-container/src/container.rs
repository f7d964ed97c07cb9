use serde::{Deserialize, Serialize};
use stowage_model::{ContainerId, ObjectId, SubObjectRef, TypeKey};

/// A composite asset: an ordered list of references to the sub-objects
/// stored with it.
///
/// The order of `items` is the user-visible order and is only changed by
/// reconciliation and explicit moves. A `None` entry is an unresolved
/// reference, e.g. one whose persisted record could not be decoded; it is
/// kept until the next sync drops it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    id: ContainerId,
    #[serde(rename = "type")]
    type_key: TypeKey,
    name: String,
    #[serde(default)]
    items: Vec<Option<SubObjectRef>>,
}

/// An item-list entry that has no stored counterpart right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingItem {
    pub index: usize,
    /// `None` for unresolved entries.
    pub reference: Option<SubObjectRef>,
}

impl Container {
    /// Creates an empty container of the given container type.
    pub fn new(type_key: TypeKey, name: impl Into<String>) -> Self {
        Self::from_parts(ContainerId::new(), type_key, name, Vec::new())
    }

    /// Restores a container from its persisted parts. The item list is taken
    /// as-is; call sync to bring it in line with storage.
    pub fn from_parts(
        id: ContainerId,
        type_key: TypeKey,
        name: impl Into<String>,
        items: Vec<Option<SubObjectRef>>,
    ) -> Self {
        Self {
            id,
            type_key,
            name: name.into(),
            items,
        }
    }

    #[must_use]
    pub fn id(&self) -> ContainerId {
        self.id
    }

    /// The container's concrete runtime type; selects its filter chain.
    #[must_use]
    pub fn type_key(&self) -> &TypeKey {
        &self.type_key
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn items(&self) -> &[Option<SubObjectRef>] {
        &self.items
    }

    /// Resolved references in list order.
    pub fn references(&self) -> impl Iterator<Item = &SubObjectRef> {
        self.items.iter().flatten()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn position(&self, id: ObjectId) -> Option<usize> {
        self.items
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|r| r.id() == id))
    }

    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.position(id).is_some()
    }

    pub(crate) fn items_mut(&mut self) -> &mut Vec<Option<SubObjectRef>> {
        &mut self.items
    }

    pub(crate) fn replace_items(&mut self, items: Vec<SubObjectRef>) {
        self.items = items.into_iter().map(Some).collect();
    }
}
