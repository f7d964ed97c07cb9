use serde::{Deserialize, Serialize};
use stowage_types::TypeKey;

/// Broad classification of a registered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCategory {
    /// Something that can be stored inside a container.
    SubObject,
    /// A container asset. Never addable to another container.
    Container,
    /// A capability several unrelated sub-object types can implement.
    Interface,
    /// Registered for completeness (e.g. referenced as a parent) but neither
    /// addable nor usable as a lookup type.
    Other,
}

/// A boolean field in a sub-object's payload that contributes to its
/// aggregate "enabled" state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToggleField {
    /// JSON pointer into `SubObject::data`, e.g. "/enabled".
    pub pointer: String,
}

impl ToggleField {
    pub fn new(pointer: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
        }
    }
}

/// Places a type in the "Add Object" menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    /// Display name; `/` separates submenus ("Gameplay/Objective").
    /// Empty means "use the type's short name".
    #[serde(default)]
    pub menu_name: String,
}

/// Declares how a type behaves inside containers.
///
/// Descriptors are plain data so they can be built in code or read from a
/// manifest. Relationships (`parent`, `interfaces`) are resolved and
/// validated when the registry is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub key: TypeKey,
    pub category: TypeCategory,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default, rename = "generic")]
    pub is_generic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<TypeKey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<TypeKey>,
    /// At most one instance of this type (or a subtype) per container.
    /// Applies to this type only; subtypes declare their own.
    #[serde(default)]
    pub disallow_multiple: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu: Option<MenuEntry>,
    /// Toggle fields declared at this level of the hierarchy.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub toggles: Vec<ToggleField>,
    /// JSON pointer that receives the owning container's id on creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_field: Option<String>,
    /// Initial payload for new instances.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub defaults: serde_json::Value,
}

impl TypeDescriptor {
    fn with_category(key: TypeKey, category: TypeCategory) -> Self {
        Self {
            key,
            category,
            is_abstract: false,
            is_generic: false,
            parent: None,
            interfaces: Vec::new(),
            disallow_multiple: false,
            menu: None,
            toggles: Vec::new(),
            owner_field: None,
            defaults: serde_json::Value::Null,
        }
    }

    /// Shorthand for a concrete sub-object type.
    pub fn sub_object(key: TypeKey) -> Self {
        Self::with_category(key, TypeCategory::SubObject)
    }

    /// Shorthand for a container type.
    pub fn container(key: TypeKey) -> Self {
        Self::with_category(key, TypeCategory::Container)
    }

    /// Shorthand for an interface (capability) type.
    pub fn interface(key: TypeKey) -> Self {
        Self::with_category(key, TypeCategory::Interface)
    }

    /// Shorthand for a type outside the sub-object category.
    pub fn other(key: TypeKey) -> Self {
        Self::with_category(key, TypeCategory::Other)
    }

    #[must_use]
    pub fn extends(mut self, parent: TypeKey) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn implements(mut self, interface: TypeKey) -> Self {
        if !self.interfaces.contains(&interface) {
            self.interfaces.push(interface);
        }
        self
    }

    #[must_use]
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    #[must_use]
    pub fn generic(mut self) -> Self {
        self.is_generic = true;
        self
    }

    #[must_use]
    pub fn disallow_multiple(mut self) -> Self {
        self.disallow_multiple = true;
        self
    }

    #[must_use]
    pub fn with_menu(mut self, menu_name: impl Into<String>) -> Self {
        self.menu = Some(MenuEntry {
            menu_name: menu_name.into(),
        });
        self
    }

    #[must_use]
    pub fn with_toggle(mut self, pointer: impl Into<String>) -> Self {
        self.toggles.push(ToggleField::new(pointer));
        self
    }

    #[must_use]
    pub fn with_owner_field(mut self, pointer: impl Into<String>) -> Self {
        self.owner_field = Some(pointer.into());
        self
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: serde_json::Value) -> Self {
        self.defaults = defaults;
        self
    }

    /// Concrete means instantiable: neither abstract nor generic.
    #[must_use]
    pub fn is_concrete(&self) -> bool {
        !self.is_abstract && !self.is_generic
    }

    /// The title shown in the add menu: the menu name, or the short type
    /// name when no (or an empty) menu name is declared.
    #[must_use]
    pub fn menu_title(&self) -> &str {
        match &self.menu {
            Some(entry) if !entry.menu_name.trim().is_empty() => entry.menu_name.trim(),
            _ => self.key.short_name(),
        }
    }
}
