//! Integration tests for the dict, YAML and JSON forms.

mod common;

use common::{list_component, registry, CompositeComponent, NoPropagation, SimpleComponent};
use qonfig::{
    CalculatorComplex, CalculatorFloat, Descriptor, Dict, Error, JsonOptions, Node, Opaque,
    Registry, Value, EMPTY_MARKER,
};

#[test]
fn test_yaml_round_trip_of_simple_node() {
    let node = Node::new::<SimpleComponent>().unwrap();
    let yaml = node.to_yaml().unwrap();
    assert_eq!(Node::from_yaml(&registry(), &yaml).unwrap(), node);
}

#[test]
fn test_yaml_round_trip_of_partial_composite() {
    let mut node = Node::new::<CompositeComponent>().unwrap();
    node.set("key3", "partially filled").unwrap();
    node.child_mut("super_key1")
        .unwrap()
        .set("key1", CalculatorFloat::from("2 * theta"))
        .unwrap();

    let restored = Node::from_yaml(&registry(), &node.to_yaml().unwrap()).unwrap();
    assert_eq!(restored, node);
    assert!(!restored.is_complete());
    assert_eq!(
        restored.child("super_key1").unwrap().get("key1").unwrap().as_str(),
        Some("2 * theta")
    );
}

#[test]
fn test_json_round_trip_of_list_component() {
    let mut node = Node::build(&list_component()).unwrap();
    node.set("key1", 4.5).unwrap();

    let json = node.to_json(&JsonOptions::default()).unwrap();
    let restored = Node::from_json(&registry(), &json).unwrap();
    assert_eq!(restored, node);

    let items = restored.get("key").unwrap().as_list().unwrap();
    assert_eq!(items.len(), 2);
    for item in items {
        let item = item.as_node().unwrap();
        assert_eq!(item.parent(), Some(restored.id()));
        assert_eq!(*item.get("key1").unwrap(), Value::Float(4.5));
    }
}

#[test]
fn test_dict_form_of_nested_node() {
    let node = Node::new::<CompositeComponent>().unwrap();
    let dict = node.to_dict(true);
    assert_eq!(dict["qonfig_name"].as_str(), Some("tests.CompositeComponent"));
    assert_eq!(dict["key2"].as_str(), Some(EMPTY_MARKER));

    let inner = dict["super_key1"].as_map().unwrap();
    assert_eq!(inner["qonfig_name"].as_str(), Some("tests.SimpleComponent"));
    assert_eq!(inner["key1"], Value::Float(1.0));
    // the composite's empty key2 was propagated into the nested component
    assert_eq!(inner["key2"].as_str(), Some(EMPTY_MARKER));

    let simple = Node::new::<SimpleComponent>().unwrap().to_dict(true);
    let key2 = simple["key2"].as_map().unwrap();
    assert_eq!(key2.len(), 3);
    assert_eq!(key2["is_calculator_complex"], Value::Bool(true));
}

#[test]
fn test_opted_out_nodes_restore_their_own_values() {
    let parent = std::sync::Arc::new(
        Descriptor::builder("tests.Holder")
            .field("key1", "documentation for key1", 2.0)
            .nested("isolated", "ignores values", Descriptor::of::<NoPropagation>())
            .build(),
    );
    let mut registry = registry();
    registry.register_descriptor(parent.clone());

    let mut node = Node::build(&parent).unwrap();
    node.child_mut("isolated").unwrap().set("key1", 8.0).unwrap();
    let restored = Node::from_yaml(&registry, &node.to_yaml().unwrap()).unwrap();
    assert_eq!(restored, node);
    assert_eq!(
        *restored.child("isolated").unwrap().get("key1").unwrap(),
        Value::Float(8.0)
    );
}

#[test]
fn test_child_override_survives_round_trip() {
    let parent = std::sync::Arc::new(
        Descriptor::builder("tests.Overriding")
            .nested("inner", "nested simple", Descriptor::of::<SimpleComponent>())
            .field("key1", "documentation for key1", 1.0)
            .build(),
    );
    let mut registry = registry();
    registry.register_descriptor(parent.clone());

    let mut node = Node::build(&parent).unwrap();
    node.set("key1", 3.0).unwrap();
    node.child_mut("inner").unwrap().set("key1", 5.0).unwrap();

    let restored = Node::from_dict(&registry, &node.to_dict(true)).unwrap();
    assert_eq!(restored, node);
    assert_eq!(*restored.get("key1").unwrap(), Value::Float(3.0));
    assert_eq!(
        *restored.child("inner").unwrap().get("key1").unwrap(),
        Value::Float(5.0)
    );
    let restored = Node::from_yaml(&registry, &node.to_yaml().unwrap()).unwrap();
    assert_eq!(restored.to_yaml().unwrap(), node.to_yaml().unwrap());
}

#[test]
fn test_short_name_resolution() {
    let mut dict = Node::new::<SimpleComponent>().unwrap().to_dict(true);
    dict.insert("qonfig_name".to_string(), Value::from("__main__.SimpleComponent"));
    let node = Node::from_dict(&registry(), &dict).unwrap();
    assert_eq!(node.qualified_name(), "tests.SimpleComponent");
}

#[test]
fn test_unregistered_component() {
    let yaml = Node::new::<SimpleComponent>().unwrap().to_yaml().unwrap();
    let err = Node::from_yaml(&Registry::new(), &yaml).unwrap_err();
    assert!(matches!(err, Error::Resolution { name } if name == "tests.SimpleComponent"));
}

#[test]
fn test_opaque_value_is_lossy() {
    let mut node = Node::new::<CompositeComponent>().unwrap();
    node.set("key2", Opaque::new(std::time::Duration::from_secs(1)))
        .unwrap();
    let restored = Node::from_json(&registry(), &node.to_json(&JsonOptions::compact()).unwrap())
        .unwrap();
    assert!(restored.get("key2").unwrap().is_empty());
}

#[test]
fn test_complex_list_entries_are_restored() {
    let mut node = Node::new::<CompositeComponent>().unwrap();
    node.set(
        "key2",
        vec![Value::from(CalculatorComplex::new(1.0, 2.0)), Value::Int(3)],
    )
    .unwrap();
    let restored = Node::from_yaml(&registry(), &node.to_yaml().unwrap()).unwrap();
    assert_eq!(restored, node);
}

#[test]
fn test_plain_mapping_values_survive() {
    let mut mapping = Dict::new();
    mapping.insert("alpha".to_string(), Value::Int(1));
    mapping.insert("beta".to_string(), Value::from("two"));

    let mut node = Node::new::<CompositeComponent>().unwrap();
    node.set("key2", mapping.clone()).unwrap();
    let restored = Node::from_yaml(&registry(), &node.to_yaml().unwrap()).unwrap();
    assert_eq!(*restored.get("key2").unwrap(), Value::Map(mapping));
}
