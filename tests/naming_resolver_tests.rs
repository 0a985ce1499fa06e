/// Naming resolver tests
///
/// Accessor lookup by field name on derived type descriptors
/// Run with: cargo test --test naming_resolver_tests

mod common;

use common::{TestDto, TestEntity};
use rustpatcher::core::ValueType;
use rustpatcher::{DefaultNamingResolver, NamingResolver, Patchable, PatcherEngine, accessors};

#[derive(Patchable, Debug, Clone, Default)]
pub struct Ticket {
    pub r#type: String,
    pub note: Option<String>,
    pub on: bool,
}

#[derive(Patchable, Debug, Clone, Default)]
pub struct Category {
    pub kind: String,
}

#[derive(Patchable, Debug, Clone, Default)]
#[patch(accessors)]
pub struct Switch {
    on: bool,
    flips: u32,
}

#[accessors]
impl Switch {
    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Returns the previous state.
    pub fn set_on(&mut self, on: bool) -> bool {
        self.flips += 1;
        std::mem::replace(&mut self.on, on)
    }

    pub fn get_flips(&self) -> u32 {
        self.flips
    }
}

#[test]
fn test_resolves_get_prefixed_getter() {
    let resolver = DefaultNamingResolver::new();
    let getter = resolver
        .resolve_getter(&TestDto::descriptor(), "age")
        .expect("get_age should resolve");

    assert_eq!(getter.member, "get_age");
    assert_eq!(getter.value_type, ValueType::of::<i32>());
    assert!(!getter.nullable);
}

#[test]
fn test_resolves_is_prefixed_bool_getter() {
    let resolver = DefaultNamingResolver::new();
    let getter = resolver
        .resolve_getter(&TestEntity::descriptor(), "active")
        .expect("is_active should resolve");

    assert_eq!(getter.member, "is_active");
    assert_eq!(getter.value_type, ValueType::of::<bool>());
}

#[test]
fn test_optional_getter_is_nullable() {
    let resolver = DefaultNamingResolver::new();
    let getter = resolver
        .resolve_getter(&TestDto::descriptor(), "full_name")
        .expect("get_full_name should resolve");

    assert_eq!(getter.value_type, ValueType::of::<String>());
    assert!(getter.nullable);
}

#[test]
fn test_getter_with_arguments_is_not_a_getter() {
    let resolver = DefaultNamingResolver::new();
    assert!(
        resolver
            .resolve_getter(&TestEntity::descriptor(), "something")
            .is_none()
    );
}

#[test]
fn test_static_accessors_are_not_resolved() {
    let resolver = DefaultNamingResolver::new();
    let descriptor = TestEntity::descriptor();
    assert!(resolver.resolve_getter(&descriptor, "static_field").is_none());
    assert!(resolver.resolve_setter(&descriptor, "static_field").is_none());
}

#[test]
fn test_resolves_public_setter() {
    let resolver = DefaultNamingResolver::new();
    let setter = resolver
        .resolve_setter(&TestEntity::descriptor(), "name")
        .expect("set_name should resolve");

    assert_eq!(setter.member, "set_name");
    assert_eq!(setter.value_type, ValueType::of::<String>());
    assert!(setter.nullable);
}

#[test]
fn test_private_setter_is_not_resolved() {
    let resolver = DefaultNamingResolver::new();
    assert!(
        resolver
            .resolve_setter(&TestEntity::descriptor(), "some_field")
            .is_none()
    );
}

#[test]
fn test_missing_accessor_is_none() {
    let resolver = DefaultNamingResolver::new();
    let descriptor = TestDto::descriptor();
    assert!(resolver.resolve_getter(&descriptor, "unknown").is_none());
    assert!(resolver.resolve_setter(&descriptor, "unknown").is_none());
}

#[test]
fn test_resolves_only_public_fields() {
    let resolver = DefaultNamingResolver::new();
    let descriptor = TestEntity::descriptor();

    let field = resolver
        .resolve_field(&descriptor, "public_field")
        .expect("public_field is public");
    assert_eq!(field.name(), "public_field");

    // Private members are described but never resolved.
    assert!(descriptor.field("name").is_some());
    assert!(resolver.resolve_field(&descriptor, "name").is_none());
}

#[test]
fn test_setter_property_from_descriptor() {
    let resolver = DefaultNamingResolver::new();
    let descriptor = TestEntity::descriptor();

    let mut properties: Vec<&str> = descriptor
        .methods()
        .iter()
        .filter_map(|method| resolver.setter_property(method))
        .collect();
    properties.sort();

    assert_eq!(
        properties,
        vec!["active", "address", "age", "birthdate", "name"]
    );
}

#[test]
fn test_raw_identifiers_are_described_without_prefix() {
    let resolver = DefaultNamingResolver::new();
    let descriptor = Ticket::descriptor();

    let names: Vec<&str> = descriptor.fields().iter().map(|field| field.name()).collect();
    assert_eq!(names, vec!["type", "note", "on"]);
    assert!(resolver.resolve_field(&descriptor, "type").is_some());
}

#[test]
fn test_explicit_mapping_from_raw_identifier() {
    let mut engine = PatcherEngine::<Ticket, Category>::default();
    engine.add_field_mapping("type", "kind");

    let ticket = Ticket {
        r#type: "bug".into(),
        ..Ticket::default()
    };
    let category = engine.map(&ticket).unwrap();

    assert_eq!(category.kind, "bug");
}

#[test]
fn test_setter_returning_a_value_is_still_a_setter() {
    let resolver = DefaultNamingResolver::new();
    let setter = resolver
        .resolve_setter(&Switch::descriptor(), "on")
        .expect("set_on should resolve");
    assert_eq!(setter.member, "set_on");

    let engine = PatcherEngine::<Ticket, Switch>::default();
    let switch = engine
        .map(&Ticket {
            on: true,
            ..Ticket::default()
        })
        .unwrap();

    assert!(switch.is_on());
    assert_eq!(switch.get_flips(), 1);
}
