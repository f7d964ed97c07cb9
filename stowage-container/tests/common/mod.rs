//! Shared fixtures: a small food hierarchy.
//!
//! ```text
//! Edible (interface)          Basket (container)
//! Food (abstract)             └── FruitBasket (container)
//! ├── Fruit : Edible          Spoon (other)
//! │   └── Apple               Jar<T> (generic)
//! └── Meat (single instance)
//!     └── Bacon
//! ```

#![allow(dead_code)]

use serde_json::json;
use stowage_container::{Container, FilterEntry, TypeRegistry, TypeRegistryBuilder};
use stowage_model::{SubObjectKind, SubObjectRef, TypeDescriptor, TypeKey};

pub const EDIBLE: &str = "food::Edible";
pub const FOOD: &str = "food::Food";
pub const FRUIT: &str = "food::Fruit";
pub const APPLE: &str = "food::Apple";
pub const MEAT: &str = "food::Meat";
pub const BACON: &str = "food::Bacon";
pub const BASKET: &str = "food::Basket";
pub const FRUIT_BASKET: &str = "food::FruitBasket";
pub const SPOON: &str = "food::Spoon";
pub const JAR: &str = "food::Jar";

pub fn key(name: &'static str) -> TypeKey {
    TypeKey::from_static(name)
}

pub struct Fruit;

impl SubObjectKind for Fruit {
    const TYPE_KEY: &'static str = FRUIT;
}

pub struct Meat;

impl SubObjectKind for Meat {
    const TYPE_KEY: &'static str = MEAT;
}

pub struct Edible;

impl SubObjectKind for Edible {
    const TYPE_KEY: &'static str = EDIBLE;
}

pub fn food_descriptors() -> Vec<TypeDescriptor> {
    vec![
        TypeDescriptor::interface(key(EDIBLE)),
        TypeDescriptor::sub_object(key(FOOD)).abstract_type(),
        Fruit::descriptor()
            .extends(key(FOOD))
            .implements(key(EDIBLE))
            .with_menu("Food/Fruit")
            .with_toggle("/enabled")
            .with_defaults(json!({ "enabled": true, "ripeness": 0.5 })),
        TypeDescriptor::sub_object(key(APPLE))
            .extends(key(FRUIT))
            .with_menu("Food/Fruit/Apple")
            .with_toggle("/render/visible")
            .with_defaults(json!({ "enabled": true, "render": { "visible": false } })),
        Meat::descriptor()
            .extends(key(FOOD))
            .disallow_multiple()
            .with_menu("Food/meat")
            .with_owner_field("/basket"),
        TypeDescriptor::sub_object(key(BACON))
            .extends(key(MEAT))
            .with_menu("Food/Meat/Bacon"),
        TypeDescriptor::container(key(BASKET)),
        TypeDescriptor::container(key(FRUIT_BASKET)).extends(key(BASKET)),
        TypeDescriptor::other(key(SPOON)),
        TypeDescriptor::sub_object(key(JAR)).generic(),
    ]
}

pub fn food_builder() -> TypeRegistryBuilder {
    food_descriptors()
        .into_iter()
        .fold(TypeRegistry::builder(), TypeRegistryBuilder::register)
}

pub fn food_registry() -> TypeRegistry {
    food_builder().build().expect("fixture registry builds")
}

/// A filter that keeps only types assignable to `target`.
pub fn keep_only(priority: i32, name: &str, target: &'static str) -> FilterEntry {
    let target = key(target);
    FilterEntry::new(priority, name, move |ctx, candidates| {
        candidates.retain(|candidate| ctx.is_assignable(candidate, &target));
    })
}

/// A container whose item list holds fresh references of the given types.
pub fn container_with(container_type: &'static str, items: &[&'static str]) -> Container {
    let items = items
        .iter()
        .map(|t| Some(SubObjectRef::new(stowage_model::ObjectId::new(), key(t))))
        .collect();
    Container::from_parts(
        stowage_model::ContainerId::new(),
        key(container_type),
        "Test Basket",
        items,
    )
}
