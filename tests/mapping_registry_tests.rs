/// Mapping registry tests
///
/// Binding discovery per strategy, explicit mappings and path errors
/// Run with: cargo test --test mapping_registry_tests

mod common;

use common::{TestDto, TestEntity};
use rustpatcher::core::{BindingOrigin, PathSide, ValueType, take};
use rustpatcher::{DefaultMappingRegistry, MappingRegistry, MappingStrategy, Patchable, Value};

fn scanned(strategy: MappingStrategy) -> DefaultMappingRegistry<TestDto, TestEntity> {
    let mut registry = DefaultMappingRegistry::new(strategy);
    registry
        .scan_entity_mappings(&TestDto::descriptor(), &TestEntity::descriptor())
        .unwrap();
    registry
}

fn sorted_sources(registry: &DefaultMappingRegistry<TestDto, TestEntity>) -> Vec<&str> {
    let mut sources = registry.resolved_sources();
    sources.sort();
    sources
}

#[test]
fn test_methods_strategy_resolves_accessors() {
    let registry = scanned(MappingStrategy::Methods);
    assert_eq!(sorted_sources(&registry), vec!["active", "age", "birthdate"]);

    let age = registry.field_mappings("age");
    assert_eq!(age.len(), 1);
    assert_eq!(age[0].source_type(), ValueType::of::<i32>());
    assert_eq!(age[0].destination_type(), ValueType::of::<i32>());
    assert_eq!(age[0].source_member(), "get_age");
    assert_eq!(age[0].destination_member(), "set_age");
    assert_eq!(age[0].origin(), BindingOrigin::Convention);

    let active = registry.field_mappings("active");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].source_type(), ValueType::of::<bool>());
    assert_eq!(active[0].source_member(), "is_active");
    assert_eq!(active[0].destination_member(), "set_active");
}

#[test]
fn test_fields_strategy_resolves_public_members() {
    let registry = scanned(MappingStrategy::Fields);
    assert_eq!(sorted_sources(&registry), vec!["public_field"]);

    let mapping = registry.field_mappings("public_field");
    assert_eq!(mapping[0].source_type(), ValueType::of::<String>());
    assert_eq!(mapping[0].destination_type(), ValueType::of::<String>());
    assert_eq!(mapping[0].source_member(), "public_field");
}

#[test]
fn test_both_strategy_prefers_methods() {
    let registry = scanned(MappingStrategy::MethodsAndFields);
    assert_eq!(
        sorted_sources(&registry),
        vec!["active", "age", "birthdate", "public_field"]
    );

    // Source has a getter, destination only a public member.
    let mapping = registry.field_mappings("public_field");
    assert_eq!(mapping[0].source_member(), "get_public_field");
    assert_eq!(mapping[0].destination_member(), "public_field");
}

#[test]
fn test_explicit_mapping_resolves_accessors() {
    let mut registry = DefaultMappingRegistry::<TestDto, TestEntity>::new(MappingStrategy::MethodsAndFields);
    registry.register_field_mapping("full_name", "name");
    registry
        .scan_entity_mappings(&TestDto::descriptor(), &TestEntity::descriptor())
        .unwrap();

    assert!(registry.resolved_sources().contains(&"full_name"));
    let mapping = registry.field_mappings("full_name");
    assert_eq!(mapping.len(), 1);
    assert_eq!(mapping[0].source_member(), "get_full_name");
    assert_eq!(mapping[0].destination_member(), "set_name");
    assert_eq!(mapping[0].origin(), BindingOrigin::Explicit);
}

#[test]
fn test_unknown_explicit_source_is_path_error() {
    let mut registry = DefaultMappingRegistry::<TestDto, TestEntity>::new(MappingStrategy::MethodsAndFields);
    registry.register_field_mapping("name", "name");
    let err = registry
        .scan_entity_mappings(&TestDto::descriptor(), &TestEntity::descriptor())
        .unwrap_err();

    assert_eq!(err.side, PathSide::Source);
    assert_eq!(err.field, "name");
    assert_eq!(err.type_name, "TestDto");
}

#[test]
fn test_unknown_explicit_destination_is_path_error() {
    let mut registry = DefaultMappingRegistry::<TestDto, TestEntity>::new(MappingStrategy::MethodsAndFields);
    registry.register_field_mapping("full_name", "full_name");
    let err = registry
        .scan_entity_mappings(&TestDto::descriptor(), &TestEntity::descriptor())
        .unwrap_err();

    assert_eq!(err.side, PathSide::Destination);
    assert_eq!(err.type_name, "TestEntity");
    assert!(err.to_string().contains("Cannot find setter or field 'full_name'"));
}

#[test]
fn test_fan_out_and_last_destination_wins() {
    let mut registry = DefaultMappingRegistry::<TestDto, TestEntity>::new(MappingStrategy::MethodsAndFields);
    registry.register_field_mapping("full_name", "name");
    registry.register_field_mapping("full_name", "public_field");
    registry.register_field_mapping("public_field", "name");

    assert_eq!(
        registry.explicit_mappings(),
        &[
            ("full_name".to_string(), "public_field".to_string()),
            ("public_field".to_string(), "name".to_string()),
        ]
    );
}

#[test]
fn test_resolved_accessors_read_and_write() {
    let registry = scanned(MappingStrategy::Methods);
    let mapping = registry.field_mappings("age")[0].clone();

    let mut dto = TestDto::default();
    dto.set_age(20);
    let value = mapping.read(&dto).unwrap().expect("age is never null");
    assert_eq!(take::<i32>(value).unwrap(), 20);

    let mut entity = TestEntity::default();
    mapping
        .write(&mut entity, Some(Box::new(20i32) as Value))
        .unwrap();
    assert_eq!(entity.get_age(), 20);
}

#[test]
fn test_rescan_replaces_bindings() {
    let mut registry = scanned(MappingStrategy::Methods);
    assert!(registry.field_mappings("public_field").is_empty());

    registry.set_strategy(MappingStrategy::Fields);
    registry
        .scan_entity_mappings(&TestDto::descriptor(), &TestEntity::descriptor())
        .unwrap();
    assert!(registry.field_mappings("age").is_empty());
    assert_eq!(registry.field_mappings("public_field").len(), 1);
}
