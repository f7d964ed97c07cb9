//! Typed and type-erased lookups over a container's item list.
//!
//! Lookups read the in-memory list only; they never consult storage. An
//! item matches a requested type when its type is that type, derives from
//! it, or implements it (for interface types). Results follow list order.

use crate::container::Container;
use crate::error::{ContainerError, ContainerResult};
use crate::registry::TypeRegistry;
use stowage_model::{SubObjectKind, SubObjectRef, TypeCategory, TypeKey};

fn validate_lookup_type(registry: &TypeRegistry, type_key: &TypeKey) -> ContainerResult<()> {
    match registry.category(type_key) {
        Some(TypeCategory::SubObject | TypeCategory::Interface) => Ok(()),
        Some(category) => Err(ContainerError::InvalidLookupType {
            type_key: type_key.clone(),
            reason: format!("{category:?} types cannot be looked up; use a sub-object or interface type"),
        }),
        None => Err(ContainerError::InvalidLookupType {
            type_key: type_key.clone(),
            reason: "type is not registered".to_string(),
        }),
    }
}

impl Container {
    /// First item of `type_key`, or `None`.
    ///
    /// Fails when `type_key` is not a registered sub-object or interface type.
    pub fn get_object(
        &self,
        registry: &TypeRegistry,
        type_key: &TypeKey,
    ) -> ContainerResult<Option<&SubObjectRef>> {
        validate_lookup_type(registry, type_key)?;
        Ok(self
            .references()
            .find(|r| registry.is_assignable(r.type_key(), type_key)))
    }

    pub fn get_object_as<T: SubObjectKind>(
        &self,
        registry: &TypeRegistry,
    ) -> ContainerResult<Option<&SubObjectRef>> {
        self.get_object(registry, &T::type_key())
    }

    /// All items of `type_key`, in list order.
    pub fn get_objects(
        &self,
        registry: &TypeRegistry,
        type_key: &TypeKey,
    ) -> ContainerResult<Vec<&SubObjectRef>> {
        validate_lookup_type(registry, type_key)?;
        Ok(self
            .references()
            .filter(|r| registry.is_assignable(r.type_key(), type_key))
            .collect())
    }

    pub fn get_objects_as<T: SubObjectKind>(
        &self,
        registry: &TypeRegistry,
    ) -> ContainerResult<Vec<&SubObjectRef>> {
        self.get_objects(registry, &T::type_key())
    }

    /// Like [`Container::get_object`], but never fails: an invalid lookup
    /// type simply finds nothing.
    #[must_use]
    pub fn try_get_object(
        &self,
        registry: &TypeRegistry,
        type_key: &TypeKey,
    ) -> Option<&SubObjectRef> {
        self.get_object(registry, type_key).ok().flatten()
    }

    #[must_use]
    pub fn try_get_object_as<T: SubObjectKind>(
        &self,
        registry: &TypeRegistry,
    ) -> Option<&SubObjectRef> {
        self.try_get_object(registry, &T::type_key())
    }
}
