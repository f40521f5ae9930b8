//! Downward broadcast of keyed values.

use super::Node;
use crate::value::Value;

impl Node {
    /// Broadcasts `value` for `key` into the subtree below this node.
    ///
    /// Every receptive child declaring `key` stores a copy, and the
    /// broadcast continues through receptive children whether or not they
    /// declare the key. Nodes held in lists are treated like direct
    /// children. This node itself is not modified, and the child held under
    /// `key` is not entered, so a broadcast node is never pushed into copies
    /// of itself.
    ///
    /// Returns the number of descendants that stored the value.
    pub fn propagate_value(&mut self, key: &str, value: &Value) -> usize {
        let mut reached = 0;
        // the entry named `key` holds the broadcast value itself
        for entry in self.entries.iter_mut().filter(|e| e.key != key) {
            match &mut entry.value {
                Value::Node(child) => reached += child.receive(key, value),
                Value::List(items) => {
                    for item in items {
                        if let Value::Node(child) = item {
                            reached += child.receive(key, value);
                        }
                    }
                }
                _ => {}
            }
        }
        reached
    }

    fn receive(&mut self, key: &str, value: &Value) -> usize {
        if !self.receives_values() {
            return 0;
        }
        let stored = usize::from(self.store(key, value.clone()));
        stored + self.propagate_value(key, value)
    }

    /// Overwrites `key` only in descendants of a given component type.
    ///
    /// Descendants whose descriptor is `component` or declares it as an
    /// ancestor store a copy of `value`; the traversal passes through every
    /// other receptive descendant without touching it.
    ///
    /// Unlike [`Node::set`], an overwritten node does not broadcast the value
    /// to its own children: descendants of other types keep their values
    /// even below a matching node. Call [`Node::set`] on the matching node
    /// to reach its whole subtree.
    ///
    /// Returns the number of descendants that stored the value.
    pub fn propagate_overwrites(&mut self, key: &str, component: &str, value: &Value) -> usize {
        let mut reached = 0;
        for entry in self.entries.iter_mut().filter(|e| e.key != key) {
            match &mut entry.value {
                Value::Node(child) => reached += child.receive_overwrite(key, component, value),
                Value::List(items) => {
                    for item in items {
                        if let Value::Node(child) = item {
                            reached += child.receive_overwrite(key, component, value);
                        }
                    }
                }
                _ => {}
            }
        }
        reached
    }

    fn receive_overwrite(&mut self, key: &str, component: &str, value: &Value) -> usize {
        if !self.receives_values() {
            return 0;
        }
        let stored = self.descriptor.is_a(component) && self.store(key, value.clone());
        usize::from(stored) + self.propagate_overwrites(key, component, value)
    }

    /// Re-broadcasts every held value into the subtree.
    ///
    /// Does nothing for components that never receive values.
    pub fn propagate_all(&mut self) {
        if self.never_receives_values() {
            return;
        }
        let held: Vec<(String, Value)> = self
            .entries
            .iter()
            .map(|e| (e.key.clone(), e.value.clone()))
            .collect();
        for (key, value) in &held {
            self.propagate_value(key, value);
        }
    }
}
