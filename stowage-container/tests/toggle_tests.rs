mod common;

use common::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use stowage_container::{
    TypeRegistry, aggregate_enabled, discover_toggle_fields, set_aggregate_enabled,
};
use stowage_model::{SubObject, TypeDescriptor};

fn apple(data: serde_json::Value) -> SubObject {
    SubObject::new(key(APPLE), "Apple").with_data(data)
}

// ── Discovery ────────────────────────────────────────────────────

#[test]
fn fields_are_collected_across_hierarchy_most_derived_first() {
    let registry = food_registry();
    let fields = discover_toggle_fields(&registry, &apple(json!({})));

    let found: Vec<(&str, &str)> = fields
        .iter()
        .map(|f| (f.declared_on().as_str(), f.pointer()))
        .collect();
    assert_eq!(
        found,
        vec![(APPLE, "/render/visible"), (FRUIT, "/enabled")]
    );
}

#[test]
fn redeclared_pointer_is_reported_once() {
    let registry = food_builder()
        .register(
            TypeDescriptor::sub_object(key("food::Pear"))
                .extends(key(FRUIT))
                .with_toggle("/enabled"),
        )
        .build()
        .unwrap();
    let pear = SubObject::new(key("food::Pear"), "Pear");

    let fields = discover_toggle_fields(&registry, &pear);
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].declared_on(), &key("food::Pear"));
}

#[test]
fn types_without_toggles_have_no_fields() {
    let registry = food_registry();
    let bacon = SubObject::new(key(BACON), "Bacon");
    let fields = discover_toggle_fields(&registry, &bacon);

    assert!(fields.is_empty());
    assert!(!aggregate_enabled(&bacon, &fields));
}

#[test]
fn broken_hierarchy_yields_no_fields() {
    let registry = TypeRegistry::builder()
        .register(
            TypeDescriptor::sub_object(key("loop::A"))
                .extends(key("loop::B"))
                .with_toggle("/on"),
        )
        .register(TypeDescriptor::sub_object(key("loop::B")).extends(key("loop::A")))
        .build()
        .unwrap();
    let object = SubObject::new(key("loop::A"), "A").with_data(json!({ "on": true }));

    assert!(discover_toggle_fields(&registry, &object).is_empty());
}

// ── Aggregate state ──────────────────────────────────────────────

#[test]
fn any_enabled_field_enables_the_object() {
    let registry = food_registry();
    let object = apple(json!({ "enabled": true, "render": { "visible": false } }));
    let fields = discover_toggle_fields(&registry, &object);

    assert!(aggregate_enabled(&object, &fields));
}

#[test]
fn all_fields_off_disables_the_object() {
    let registry = food_registry();
    let object = apple(json!({ "enabled": false, "render": { "visible": false } }));
    let fields = discover_toggle_fields(&registry, &object);

    assert!(!aggregate_enabled(&object, &fields));
}

#[test]
fn missing_or_non_boolean_fields_read_as_off() {
    let registry = food_registry();
    let object = apple(json!({ "enabled": "yes" }));
    let fields = discover_toggle_fields(&registry, &object);

    assert!(!aggregate_enabled(&object, &fields));
}

#[test]
fn setting_aggregate_writes_every_field() {
    let registry = food_registry();
    let mut object = apple(json!({ "enabled": true, "render": { "visible": false } }));
    let fields = discover_toggle_fields(&registry, &object);

    assert_eq!(set_aggregate_enabled(&mut object, &fields, false), 2);
    assert_eq!(object.data, json!({ "enabled": false, "render": { "visible": false } }));
    assert!(!aggregate_enabled(&object, &fields));

    assert_eq!(set_aggregate_enabled(&mut object, &fields, true), 2);
    assert_eq!(object.data, json!({ "enabled": true, "render": { "visible": true } }));
}

#[test]
fn unwritable_fields_are_not_counted() {
    let registry = food_registry();
    // `render` is missing, so `/render/visible` has no parent to insert into.
    let mut object = apple(json!({ "enabled": true }));
    let fields = discover_toggle_fields(&registry, &object);

    assert_eq!(set_aggregate_enabled(&mut object, &fields, false), 1);
    assert_eq!(object.get_bool("/enabled"), Some(false));
}
