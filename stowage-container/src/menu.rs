//! The "Add Object" menu: which types a host can offer for a container.

use crate::constraint::TypeConstraintEvaluator;
use crate::container::Container;
use crate::registry::TypeRegistry;
use stowage_model::{TypeCategory, TypeKey};

/// One entry of the add menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub title: String,
    pub type_key: TypeKey,
}

impl MenuItem {
    /// Title split into submenu segments ("Gameplay/Objective").
    pub fn path(&self) -> Vec<&str> {
        self.title
            .split('/')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .collect()
    }

    /// The last submenu segment.
    #[must_use]
    pub fn leaf(&self) -> &str {
        self.path().last().copied().unwrap_or(self.type_key.short_name())
    }
}

/// Menu-listed, creatable sub-object types the container's filter chain
/// keeps, sorted by title (ties by type key).
pub(crate) fn addable_types(
    evaluator: &TypeConstraintEvaluator,
    registry: &TypeRegistry,
    container: &Container,
    case_insensitive: bool,
) -> Vec<MenuItem> {
    let mut candidates: Vec<TypeKey> = registry
        .descriptors()
        .filter(|d| d.menu.is_some())
        .filter(|d| d.category == TypeCategory::SubObject && d.is_concrete())
        .filter(|d| matches!(registry.is_container_type(&d.key), Ok(false)))
        .map(|d| d.key.clone())
        .collect();

    evaluator.filter_types(registry, container, &mut candidates);

    let mut items: Vec<MenuItem> = candidates
        .into_iter()
        .filter_map(|key| {
            let title = registry.descriptor(&key)?.menu_title().to_string();
            Some(MenuItem {
                title,
                type_key: key,
            })
        })
        .collect();

    items.sort_by(|a, b| {
        let by_title = if case_insensitive {
            a.title.to_lowercase().cmp(&b.title.to_lowercase())
        } else {
            a.title.cmp(&b.title)
        };
        by_title.then_with(|| a.type_key.cmp(&b.type_key))
    });
    items
}
