//! Property-based tests for node trees.

use std::sync::Arc;

use proptest::prelude::*;

use super::Node;
use crate::descriptor::Descriptor;
use crate::registry::Registry;
use crate::value::{Empty, Value};

// A chain of components, level i declaring `x{i}` (filled in or empty) and
// the shared key `tol`; `opted_out` marks levels that never receive values.
fn chain(filled: &[bool], opted_out: &[bool]) -> Arc<Descriptor> {
    let mut child: Option<Arc<Descriptor>> = None;
    for level in (0..filled.len()).rev() {
        let mut builder = Descriptor::builder(format!("props.Level{level}"))
            .field("tol", "shared tolerance", 0.5)
            .never_receives_values(level > 0 && opted_out[level]);
        builder = if filled[level] {
            builder.field(format!("x{level}"), "level value", 1.0)
        } else {
            builder.field(format!("x{level}"), "level value", Empty)
        };
        if let Some(inner) = child {
            builder = builder.nested("inner", "next level", inner);
        }
        child = Some(Arc::new(builder.build()));
    }
    child.unwrap_or_else(|| Arc::new(Descriptor::builder("props.Level0").build()))
}

fn levels() -> impl Strategy<Value = (Vec<bool>, Vec<bool>)> {
    (1usize..6).prop_flat_map(|depth| {
        (
            prop::collection::vec(any::<bool>(), depth),
            prop::collection::vec(any::<bool>(), depth),
        )
    })
}

fn tolerances(node: &Node) -> Vec<Value> {
    let mut found = vec![node.get("tol").unwrap().clone()];
    if let Ok(inner) = node.child("inner") {
        found.extend(tolerances(inner));
    }
    found
}

fn registry_for(node: &Node, registry: &mut Registry) {
    registry.register_descriptor(Arc::clone(node.descriptor()));
    for child in node.children() {
        registry_for(child, registry);
    }
}

proptest! {
    // A chain is complete exactly when every level is filled in
    #[test]
    fn completeness_matches_empty_values((filled, opted_out) in levels()) {
        let node = Node::build(&chain(&filled, &vec![false; opted_out.len()])).unwrap();
        prop_assert_eq!(node.is_complete(), filled.iter().all(|f| *f));
        prop_assert_eq!(node.missing_values().is_empty(), node.is_complete());
    }

    // A write reaches every level down to the first opted-out one
    #[test]
    fn propagation_stops_at_opt_out((filled, opted_out) in levels(), tol in 0.0f64..1.0) {
        let mut node = Node::build(&chain(&filled, &opted_out)).unwrap();
        node.set("tol", tol).unwrap();

        let blocked_from = opted_out
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, opted)| **opted)
            .map_or(filled.len(), |(level, _)| level);
        for (level, value) in tolerances(&node).into_iter().enumerate() {
            if level < blocked_from {
                prop_assert_eq!(value, Value::Float(tol));
            } else {
                prop_assert_eq!(value, Value::Float(0.5));
            }
        }
    }

    // Deep copies compare equal and detach from the source tree
    #[test]
    fn deep_copy_equals_source((filled, opted_out) in levels()) {
        let node = Node::build(&chain(&filled, &opted_out)).unwrap();
        let copy = node.deep_copy();
        prop_assert_eq!(&copy, &node);
        prop_assert!(copy.parent().is_none());
        prop_assert_ne!(copy.id(), node.id());
    }

    // Dict form round-trips for schema-only trees
    #[test]
    fn dict_round_trip((filled, opted_out) in levels(), tol in -10.0f64..10.0) {
        let mut node = Node::build(&chain(&filled, &opted_out)).unwrap();
        node.set("tol", tol).unwrap();
        let mut registry = Registry::new();
        registry_for(&node, &mut registry);

        let restored = Node::from_dict(&registry, &node.to_dict(true)).unwrap();
        prop_assert_eq!(restored, node);
    }
}
