//! Shallow and deep copies of nodes.

use std::collections::HashMap;

use super::{Entry, Node, NodeId};
use crate::value::Value;

/// Records which node of a copy corresponds to which node of its source.
///
/// One memo is shared by every node copied in a single deep copy, so parent
/// handles inside the copy point at the copied owners.
#[derive(Debug, Default)]
pub struct CopyMemo {
    copies: HashMap<NodeId, NodeId>,
}

impl CopyMemo {
    /// Creates an empty memo.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The handle of the copy made of the node with handle `source`.
    #[must_use]
    pub fn translate(&self, source: NodeId) -> Option<NodeId> {
        self.copies.get(&source).copied()
    }

    /// Number of nodes copied so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.copies.len()
    }

    /// Returns `true` if nothing was copied yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.copies.is_empty()
    }
}

fn copy_value(value: &Value, owner: NodeId, memo: &mut CopyMemo) -> Value {
    match value {
        Value::Node(node) => Value::Node(Box::new(node.copy_into(Some(owner), memo))),
        Value::List(items) => Value::List(items.iter().map(|v| copy_value(v, owner, memo)).collect()),
        Value::Map(map) => Value::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), copy_value(v, owner, memo)))
                .collect(),
        ),
        other => other.clone(),
    }
}

impl Node {
    fn copy_into(&self, parent: Option<NodeId>, memo: &mut CopyMemo) -> Self {
        let id = NodeId::next();
        memo.copies.insert(self.id, id);
        let entries = self
            .entries
            .iter()
            .map(|e| Entry {
                key: e.key.clone(),
                doc: e.doc.clone(),
                default: copy_value(&e.default, id, memo),
                value: copy_value(&e.value, id, memo),
            })
            .collect();
        Self {
            id,
            parent,
            descriptor: self.descriptor.clone(),
            name: self.name.clone(),
            entries,
            receives_values: self.receives_values,
        }
    }

    /// A copy that keeps this node's position: same descriptor and parent.
    ///
    /// Nested nodes, including list elements, are copied as well and hang
    /// below the new node.
    #[must_use]
    pub fn shallow_copy(&self) -> Self {
        self.copy_into(self.parent, &mut CopyMemo::new())
    }

    /// A detached, fully independent copy.
    ///
    /// The copy has no parent. Every nested value is copied.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        self.deep_copy_with(&mut CopyMemo::new())
    }

    /// A detached copy sharing `memo` with other copies.
    ///
    /// After the call, `memo` translates handles of this subtree to the
    /// handles of their copies.
    #[must_use]
    pub fn deep_copy_with(&self, memo: &mut CopyMemo) -> Self {
        self.copy_into(None, memo)
    }
}

impl Clone for Node {
    fn clone(&self) -> Self {
        self.shallow_copy()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::descriptor::Descriptor;

    fn tree() -> Node {
        let leaf = Arc::new(
            Descriptor::builder("tests.Leaf")
                .field("x", "coordinate", 1.0)
                .build(),
        );
        let root = Arc::new(
            Descriptor::builder("tests.Root")
                .nested("leaf", "single leaf", leaf.clone())
                .nested_list("leaves", "more leaves", vec![leaf.clone(), leaf])
                .build(),
        );
        Node::build(&root).unwrap()
    }

    #[test]
    fn test_shallow_copy_keeps_parent() {
        let root = tree();
        let leaf = root.child("leaf").unwrap();
        let copy = leaf.shallow_copy();
        assert_eq!(copy.parent(), Some(root.id()));
        assert_ne!(copy.id(), leaf.id());
        assert_eq!(&copy, leaf);
    }

    #[test]
    fn test_deep_copy_detaches() {
        let root = tree();
        let leaf = root.child("leaf").unwrap();
        let copy = leaf.deep_copy();
        assert_eq!(copy.parent(), None);
        assert_eq!(&copy, leaf);
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let root = tree();
        let mut copy = root.deep_copy();
        copy.set("x", 5.0).unwrap();
        assert_eq!(*root.child("leaf").unwrap().get("x").unwrap(), Value::Float(1.0));
        assert_eq!(*copy.child("leaf").unwrap().get("x").unwrap(), Value::Float(5.0));
    }

    #[test]
    fn test_memo_translates_nested_handles() {
        let root = tree();
        let mut memo = CopyMemo::new();
        let copy = root.deep_copy_with(&mut memo);
        // defaults hold their own node copies
        assert_eq!(memo.len(), 7);

        let source_leaf = root.child("leaf").unwrap();
        let copied_leaf = copy.child("leaf").unwrap();
        assert_eq!(memo.translate(source_leaf.id()), Some(copied_leaf.id()));
        assert_eq!(copied_leaf.parent(), Some(copy.id()));

        for item in copy.get("leaves").unwrap().as_list().unwrap() {
            assert_eq!(item.as_node().unwrap().parent(), Some(copy.id()));
        }
    }
}
