use pretty_assertions::assert_eq;
use serde_json::json;
use stowage_model::{
    MenuEntry, ObjectId, SubObjectKind, SubObjectRef, ToggleField, TypeCategory, TypeDescriptor,
    TypeKey,
};

fn key(name: &'static str) -> TypeKey {
    TypeKey::from_static(name)
}

// ── Constructors ─────────────────────────────────────────────────

#[test]
fn shorthand_constructors_set_category() {
    assert_eq!(TypeDescriptor::sub_object(key("a::A")).category, TypeCategory::SubObject);
    assert_eq!(TypeDescriptor::container(key("a::C")).category, TypeCategory::Container);
    assert_eq!(TypeDescriptor::interface(key("a::I")).category, TypeCategory::Interface);
    assert_eq!(TypeDescriptor::other(key("a::O")).category, TypeCategory::Other);
}

#[test]
fn builder_methods_accumulate() {
    let d = TypeDescriptor::sub_object(key("food::Apple"))
        .extends(key("food::Fruit"))
        .implements(key("food::Edible"))
        .implements(key("food::Edible"))
        .disallow_multiple()
        .with_toggle("/enabled")
        .with_toggle("/visible")
        .with_owner_field("/owner")
        .with_defaults(json!({ "enabled": true }));

    assert_eq!(d.parent, Some(key("food::Fruit")));
    assert_eq!(d.interfaces, vec![key("food::Edible")]);
    assert!(d.disallow_multiple);
    assert_eq!(
        d.toggles,
        vec![ToggleField::new("/enabled"), ToggleField::new("/visible")]
    );
    assert_eq!(d.owner_field.as_deref(), Some("/owner"));
    assert!(d.is_concrete());
}

#[test]
fn abstract_and_generic_are_not_concrete() {
    assert!(!TypeDescriptor::sub_object(key("a::A")).abstract_type().is_concrete());
    assert!(!TypeDescriptor::sub_object(key("a::G")).generic().is_concrete());
}

// ── Menu titles ──────────────────────────────────────────────────

#[test]
fn menu_title_prefers_menu_name() {
    let d = TypeDescriptor::sub_object(key("tests::Fruit")).with_menu("Tests/Fruit");
    assert_eq!(d.menu_title(), "Tests/Fruit");
}

#[test]
fn menu_title_falls_back_to_short_name() {
    let d = TypeDescriptor::sub_object(key("tests::Meat")).with_menu("  ");
    assert_eq!(d.menu_title(), "Meat");
    let d = TypeDescriptor::sub_object(key("tests::Meat"));
    assert_eq!(d.menu_title(), "Meat");
}

// ── Manifest shape ───────────────────────────────────────────────

#[test]
fn deserializes_from_minimal_json() {
    let d: TypeDescriptor = serde_json::from_value(json!({
        "key": "food::Fruit",
        "category": "sub_object",
        "abstract": true
    }))
    .unwrap();
    assert!(d.is_abstract);
    assert!(d.parent.is_none());
    assert!(d.toggles.is_empty());
    assert_eq!(d.menu, None);
    assert!(d.defaults.is_null());
}

#[test]
fn menu_entry_defaults_to_empty_name() {
    let d: TypeDescriptor = serde_json::from_value(json!({
        "key": "food::Apple",
        "category": "sub_object",
        "menu": {}
    }))
    .unwrap();
    assert_eq!(d.menu, Some(MenuEntry::default()));
    assert_eq!(d.menu_title(), "Apple");
}

#[test]
fn unknown_category_is_rejected() {
    let res = serde_json::from_value::<TypeDescriptor>(json!({
        "key": "food::Apple",
        "category": "component"
    }));
    assert!(res.is_err());
}

// ── SubObjectKind / SubObjectRef ─────────────────────────────────

struct Apple;
impl SubObjectKind for Apple {
    const TYPE_KEY: &'static str = "food::Apple";
}

#[test]
fn kind_exposes_key_and_default_descriptor() {
    assert_eq!(Apple::type_key(), key("food::Apple"));
    let d = Apple::descriptor();
    assert_eq!(d.key, key("food::Apple"));
    assert_eq!(d.category, TypeCategory::SubObject);
}

#[test]
fn references_compare_by_id_only() {
    let id = ObjectId::new();
    let a = SubObjectRef::new(id, key("food::Apple"));
    let b = SubObjectRef::new(id, key("food::Pear"));
    let c = SubObjectRef::new(ObjectId::new(), key("food::Apple"));
    assert_eq!(a, b);
    assert_ne!(a, c);
}
