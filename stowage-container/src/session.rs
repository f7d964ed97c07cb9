//! Editor session: the facade hosts talk to.
//!
//! A session owns a storage backend, a registry snapshot, the config and
//! the constraint evaluator. Every mutator goes through storage first and
//! then re-syncs the container, so reconciliation stays the single path by
//! which the item list learns about storage.

use crate::config::{ContainerConfig, NamingStyle};
use crate::constraint::{Admission, Rejection, TypeConstraintEvaluator};
use crate::container::{Container, MissingItem};
use crate::error::{ContainerError, ContainerResult};
use crate::menu::{self, MenuItem};
use crate::order::move_item;
use crate::reconcile::{SyncReport, reconcile};
use crate::registry::TypeRegistry;
use crate::storage::StorageGateway;
use crate::toggle::{self, ToggleHandle};
use std::sync::Arc;
use stowage_model::{
    SubObject, SubObjectKind, SubObjectRef, TypeCategory, TypeDescriptor, TypeKey,
};
use tracing::{debug, info, warn};

/// Result of [`ContainerSession::add_object`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added {
        item: SubObjectRef,
        report: SyncReport,
    },
    Rejected(Rejection),
}

impl AddOutcome {
    #[must_use]
    pub fn item(&self) -> Option<&SubObjectRef> {
        match self {
            Self::Added { item, .. } => Some(item),
            Self::Rejected(_) => None,
        }
    }

    #[must_use]
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Added { .. } => None,
            Self::Rejected(rejection) => Some(rejection),
        }
    }
}

/// Result of [`ContainerSession::move_object`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    pub moved: bool,
    pub report: SyncReport,
}

/// Facade over one storage backend and one registry snapshot.
pub struct ContainerSession<S: StorageGateway> {
    storage: S,
    registry: Arc<TypeRegistry>,
    config: ContainerConfig,
    evaluator: TypeConstraintEvaluator,
}

impl<S: StorageGateway> ContainerSession<S> {
    pub fn new(storage: S, registry: Arc<TypeRegistry>) -> Self {
        Self::with_config(storage, registry, ContainerConfig::default())
    }

    pub fn with_config(storage: S, registry: Arc<TypeRegistry>, config: ContainerConfig) -> Self {
        Self {
            storage,
            registry,
            config,
            evaluator: TypeConstraintEvaluator::new(),
        }
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Direct backend access, for hosts that mutate storage themselves.
    /// Call [`ContainerSession::sync`] afterwards.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Swaps in a rebuilt registry, e.g. after the type catalog changed.
    pub fn set_registry(&mut self, registry: Arc<TypeRegistry>) {
        self.registry = registry;
    }

    #[must_use]
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Creates an empty container of a registered container type.
    pub fn create_container(
        &self,
        type_key: &TypeKey,
        name: impl Into<String>,
    ) -> ContainerResult<Container> {
        match self.registry.category(type_key) {
            Some(TypeCategory::Container) => Ok(Container::new(type_key.clone(), name)),
            Some(category) => Err(ContainerError::InvalidDescriptor {
                type_key: type_key.clone(),
                reason: format!("{category:?} type cannot be used as a container"),
            }),
            None => Err(ContainerError::UnknownType(type_key.clone())),
        }
    }

    // ================================================================
    // Reconciliation
    // ================================================================

    /// Rebuilds the container's item list from storage.
    ///
    /// Stored objects whose type is (or derives from) a container type are
    /// left out of the snapshot.
    pub fn sync(&self, container: &mut Container) -> SyncReport {
        let snapshot: Vec<SubObjectRef> = self
            .storage
            .enumerate(container.id())
            .into_iter()
            .filter(|r| match self.registry.is_container_type(r.type_key()) {
                Ok(nested) => {
                    if nested {
                        debug!(object_id = %r.id(), "Skipping nested container in storage snapshot");
                    }
                    !nested
                }
                Err(_) => true,
            })
            .collect();

        let result = reconcile(container.items(), &snapshot);
        container.replace_items(result.items);

        if !result.report.is_empty() {
            debug!(
                container_id = %container.id(),
                added = result.report.added.len(),
                removed = result.report.removed.len(),
                "Container synced"
            );
        }
        result.report
    }

    // ================================================================
    // Type constraints
    // ================================================================

    pub fn can_add(&self, container: &Container, type_key: &TypeKey) -> Admission {
        self.evaluator.can_add(&self.registry, container, type_key)
    }

    pub fn can_add_as<T: SubObjectKind>(&self, container: &Container) -> Admission {
        self.can_add(container, &T::type_key())
    }

    /// Narrows `candidates` through the container's filter chain.
    pub fn filter_types(&self, container: &Container, candidates: &mut Vec<TypeKey>) {
        self.evaluator
            .filter_types(&self.registry, container, candidates);
    }

    /// Types a host can offer in its "Add Object" menu, sorted by title.
    pub fn addable_types(&self, container: &Container) -> Vec<MenuItem> {
        menu::addable_types(
            &self.evaluator,
            &self.registry,
            container,
            self.config.sort_menu_case_insensitive,
        )
    }

    // ================================================================
    // Mutators
    // ================================================================

    /// Creates a sub-object of `type_key`, stores it with the container and
    /// syncs. Disallowed types are returned as [`AddOutcome::Rejected`].
    pub fn add_object(
        &mut self,
        container: &mut Container,
        type_key: &TypeKey,
    ) -> ContainerResult<AddOutcome> {
        if let Admission::Rejected(rejection) = self.can_add(container, type_key) {
            warn!(
                container_id = %container.id(),
                type_key = %type_key,
                "Add rejected: {}",
                rejection
            );
            return Ok(AddOutcome::Rejected(rejection));
        }

        let descriptor = self
            .registry
            .descriptor(type_key)
            .ok_or_else(|| ContainerError::UnknownType(type_key.clone()))?;
        let object = self.instantiate(descriptor, container);
        let item = object.reference();

        self.storage.attach(object, container.id())?;
        let report = self.sync(container);

        info!(
            container_id = %container.id(),
            object_id = %item.id(),
            type_key = %type_key,
            "Sub-object added"
        );
        Ok(AddOutcome::Added { item, report })
    }

    pub fn add_object_as<T: SubObjectKind>(
        &mut self,
        container: &mut Container,
    ) -> ContainerResult<AddOutcome> {
        self.add_object(container, &T::type_key())
    }

    fn instantiate(&self, descriptor: &TypeDescriptor, container: &Container) -> SubObject {
        let name = match self.config.naming {
            NamingStyle::Type => descriptor.key.short_name().to_string(),
            NamingStyle::Menu => {
                let title = descriptor.menu_title();
                title
                    .rsplit('/')
                    .map(str::trim)
                    .find(|segment| !segment.is_empty())
                    .unwrap_or(descriptor.key.short_name())
                    .to_string()
            }
        };

        let mut object = SubObject::new(descriptor.key.clone(), name);
        if descriptor.defaults.is_object() {
            object.data = descriptor.defaults.clone();
        }
        if let Some(pointer) = &descriptor.owner_field {
            object.owner = Some(container.id());
            if !object.set_value(pointer, serde_json::Value::String(container.id().to_string())) {
                warn!(
                    type_key = %descriptor.key,
                    pointer = %pointer,
                    "Owner field could not be written"
                );
            }
        }
        object
    }

    /// Destroys a sub-object stored with `container` and syncs.
    ///
    /// Fails with [`ContainerError::ObjectNotFound`] when the object is not
    /// stored with this container, leaving storage untouched.
    pub fn remove_object(
        &mut self,
        container: &mut Container,
        item: &SubObjectRef,
    ) -> ContainerResult<SyncReport> {
        if !self.storage.is_resident(container.id(), item.id()) {
            warn!(
                container_id = %container.id(),
                object_id = %item.id(),
                "Remove refused: object is not stored with this container"
            );
            return Err(ContainerError::ObjectNotFound(item.id()));
        }
        self.storage.detach(item.id())?;
        let report = self.sync(container);
        info!(
            container_id = %container.id(),
            object_id = %item.id(),
            "Sub-object removed"
        );
        Ok(report)
    }

    /// Moves `item` to just before `before`, or to the end, then syncs.
    pub fn move_object(
        &mut self,
        container: &mut Container,
        item: &SubObjectRef,
        before: Option<&SubObjectRef>,
    ) -> MoveOutcome {
        let moved = move_item(container.items_mut(), item, before);
        if moved {
            info!(
                container_id = %container.id(),
                object_id = %item.id(),
                before = ?before.map(SubObjectRef::id),
                "Sub-object moved"
            );
        }
        let report = self.sync(container);
        MoveOutcome { moved, report }
    }

    /// Renames a stored sub-object. The name is trimmed and must not be empty.
    pub fn rename_object(&mut self, item: &SubObjectRef, name: &str) -> ContainerResult<()> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ContainerError::InvalidName(name.to_string()));
        }
        let object = self
            .storage
            .get_mut(item.id())
            .ok_or(ContainerError::ObjectNotFound(item.id()))?;
        info!(object_id = %item.id(), from = %object.name, to = %trimmed, "Sub-object renamed");
        object.name = trimmed.to_string();
        Ok(())
    }

    // ================================================================
    // Reads
    // ================================================================

    /// Stored object behind a reference.
    pub fn resolve(&self, item: &SubObjectRef) -> Option<&SubObject> {
        self.storage.get(item.id())
    }

    /// Entries with no stored counterpart: unresolved ones, and references
    /// storage no longer reports for this container. The next sync drops
    /// them.
    pub fn missing_items(&self, container: &Container) -> Vec<MissingItem> {
        container
            .items()
            .iter()
            .enumerate()
            .filter(|(_, slot)| match slot {
                Some(r) => !self.storage.is_resident(container.id(), r.id()),
                None => true,
            })
            .map(|(index, slot)| MissingItem {
                index,
                reference: slot.clone(),
            })
            .collect()
    }

    /// Stored, non-hidden objects in list order.
    pub fn visible_objects(&self, container: &Container) -> Vec<&SubObject> {
        container
            .references()
            .filter_map(|r| self.storage.get(r.id()))
            .filter(|object| !object.hidden)
            .collect()
    }

    pub fn get_object(
        &self,
        container: &Container,
        type_key: &TypeKey,
    ) -> ContainerResult<Option<SubObjectRef>> {
        Ok(container.get_object(&self.registry, type_key)?.cloned())
    }

    pub fn get_object_as<T: SubObjectKind>(
        &self,
        container: &Container,
    ) -> ContainerResult<Option<SubObjectRef>> {
        self.get_object(container, &T::type_key())
    }

    pub fn get_objects(
        &self,
        container: &Container,
        type_key: &TypeKey,
    ) -> ContainerResult<Vec<SubObjectRef>> {
        Ok(container
            .get_objects(&self.registry, type_key)?
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn get_objects_as<T: SubObjectKind>(
        &self,
        container: &Container,
    ) -> ContainerResult<Vec<SubObjectRef>> {
        self.get_objects(container, &T::type_key())
    }

    pub fn try_get_object(&self, container: &Container, type_key: &TypeKey) -> Option<SubObjectRef> {
        container.try_get_object(&self.registry, type_key).cloned()
    }

    pub fn try_get_object_as<T: SubObjectKind>(&self, container: &Container) -> Option<SubObjectRef> {
        self.try_get_object(container, &T::type_key())
    }

    // ================================================================
    // Toggles
    // ================================================================

    pub fn toggle_fields(&self, item: &SubObjectRef) -> ContainerResult<Vec<ToggleHandle>> {
        let object = self
            .storage
            .get(item.id())
            .ok_or(ContainerError::ObjectNotFound(item.id()))?;
        Ok(toggle::discover_toggle_fields(&self.registry, object))
    }

    /// Aggregate enabled state: any toggle field on.
    pub fn is_enabled(&self, item: &SubObjectRef) -> ContainerResult<bool> {
        let fields = self.toggle_fields(item)?;
        let object = self
            .storage
            .get(item.id())
            .ok_or(ContainerError::ObjectNotFound(item.id()))?;
        Ok(toggle::aggregate_enabled(object, &fields))
    }

    /// Writes `enabled` to every toggle field. Returns how many were written.
    pub fn set_enabled(&mut self, item: &SubObjectRef, enabled: bool) -> ContainerResult<usize> {
        let fields = self.toggle_fields(item)?;
        let object = self
            .storage
            .get_mut(item.id())
            .ok_or(ContainerError::ObjectNotFound(item.id()))?;
        let written = toggle::set_aggregate_enabled(object, &fields, enabled);
        debug!(object_id = %item.id(), enabled, written, "Toggles written");
        Ok(written)
    }
}
