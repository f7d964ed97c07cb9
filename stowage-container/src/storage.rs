//! The storage seam.
//!
//! The engine only needs set membership, identity and per-object access
//! from the backend that physically keeps sub-objects next to a container.
//! Persisted layout is entirely the backend's business.

use crate::error::ContainerResult;
use serde::{Deserialize, Serialize};
use stowage_model::{ContainerId, ObjectId, SubObject, SubObjectRef};

/// Backend that stores sub-objects alongside their container.
pub trait StorageGateway {
    /// All sub-objects stored with `container`, in the backend's iteration
    /// order. Must not include the container itself.
    fn enumerate(&self, container: ContainerId) -> Vec<SubObjectRef>;

    /// Stores `object` with `container`. Attaching an already stored object
    /// moves or overwrites it.
    fn attach(&mut self, object: SubObject, container: ContainerId) -> ContainerResult<()>;

    /// Destroys a stored object. Detaching an unknown id is not an error.
    fn detach(&mut self, id: ObjectId) -> ContainerResult<()>;

    fn get(&self, id: ObjectId) -> Option<&SubObject>;

    fn get_mut(&mut self, id: ObjectId) -> Option<&mut SubObject>;

    /// Whether `id` is currently stored with `container`.
    fn is_resident(&self, container: ContainerId, id: ObjectId) -> bool {
        self.enumerate(container).iter().any(|r| r.id() == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredObject {
    container: ContainerId,
    object: SubObject,
}

/// In-memory backend. Iteration order is attach order.
///
/// Serializable, so a host can persist a whole asset (see the CLI).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStorage {
    records: Vec<StoredObject>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Objects stored with `container`, in attach order.
    pub fn objects_in(&self, container: ContainerId) -> impl Iterator<Item = &SubObject> {
        self.records
            .iter()
            .filter(move |r| r.container == container)
            .map(|r| &r.object)
    }

    /// The container an object is stored with.
    #[must_use]
    pub fn owner_of(&self, id: ObjectId) -> Option<ContainerId> {
        self.records
            .iter()
            .find(|r| r.object.id == id)
            .map(|r| r.container)
    }

    /// Removes an object behind the container's back and hands it out, the
    /// way an external tool deleting or extracting a sub-object would.
    pub fn orphan(&mut self, id: ObjectId) -> Option<SubObject> {
        let index = self.records.iter().position(|r| r.object.id == id)?;
        Some(self.records.remove(index).object)
    }

    /// Stores an object behind the container's back, the way an external
    /// tool adding a sub-object to the asset would.
    pub fn adopt(&mut self, object: SubObject, container: ContainerId) {
        self.insert(object, container);
    }

    fn insert(&mut self, object: SubObject, container: ContainerId) {
        match self.records.iter_mut().find(|r| r.object.id == object.id) {
            Some(existing) => {
                existing.container = container;
                existing.object = object;
            }
            None => self.records.push(StoredObject { container, object }),
        }
    }
}

impl StorageGateway for MemoryStorage {
    fn enumerate(&self, container: ContainerId) -> Vec<SubObjectRef> {
        self.objects_in(container).map(SubObject::reference).collect()
    }

    fn attach(&mut self, object: SubObject, container: ContainerId) -> ContainerResult<()> {
        self.insert(object, container);
        Ok(())
    }

    fn detach(&mut self, id: ObjectId) -> ContainerResult<()> {
        self.records.retain(|r| r.object.id != id);
        Ok(())
    }

    fn get(&self, id: ObjectId) -> Option<&SubObject> {
        self.records
            .iter()
            .find(|r| r.object.id == id)
            .map(|r| &r.object)
    }

    fn get_mut(&mut self, id: ObjectId) -> Option<&mut SubObject> {
        self.records
            .iter_mut()
            .find(|r| r.object.id == id)
            .map(|r| &mut r.object)
    }

    fn is_resident(&self, container: ContainerId, id: ObjectId) -> bool {
        self.records
            .iter()
            .any(|r| r.container == container && r.object.id == id)
    }
}
