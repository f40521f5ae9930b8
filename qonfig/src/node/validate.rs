//! Completeness and requirement checks.

use std::collections::BTreeMap;

use serde::Serialize;

use super::Node;
use crate::error::Error;
use crate::value::Value;

/// One entry of a diagnostic tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Diagnostic {
    /// A key name or requirement doc.
    Leaf(String),
    /// Diagnostics of a nested node.
    Nested(Diagnostics),
}

/// Diagnostic tree mirroring the shape of a node.
///
/// Nodes held in lists appear under `<key>_<index>`.
pub type Diagnostics = BTreeMap<String, Diagnostic>;

pub(crate) fn render_diagnostics(diagnostics: &Diagnostics) -> String {
    serde_json::to_string(diagnostics).unwrap_or_else(|_| format!("{diagnostics:?}"))
}

fn value_complete(value: &Value) -> bool {
    match value {
        Value::Empty => false,
        Value::Node(node) => node.is_complete(),
        Value::List(items) => items.iter().all(value_complete),
        _ => true,
    }
}

// Walks the same values as `value_complete`, naming list elements `<name>_<index>`.
fn collect_missing(name: &str, value: &Value, missing: &mut Diagnostics) {
    match value {
        Value::Empty => {
            missing.insert(name.to_string(), Diagnostic::Leaf(name.to_string()));
        }
        Value::Node(child) if !child.is_complete() => {
            missing.insert(name.to_string(), Diagnostic::Nested(child.missing_values()));
        }
        Value::List(items) => {
            for (index, item) in items.iter().enumerate() {
                collect_missing(&format!("{name}_{index}"), item, missing);
            }
        }
        _ => {}
    }
}

impl Node {
    /// Returns `true` if no value reachable through nested nodes and lists
    /// is the empty sentinel.
    ///
    /// Components that never receive values manage their own values and
    /// always count as complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        if self.never_receives_values() {
            return true;
        }
        self.entries.iter().all(|e| value_complete(&e.value))
    }

    /// Returns `true` if every nested node meets its requirements and every
    /// requirement declared here holds.
    #[must_use]
    pub fn meets_requirements(&self) -> bool {
        if self.never_receives_values() {
            return true;
        }
        self.children().all(Node::meets_requirements)
            && self
                .requirements()
                .iter()
                .all(|(_, requirement)| requirement.check(self))
    }

    /// Complete and meeting all requirements.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_complete() && self.meets_requirements()
    }

    /// Keys still holding the empty sentinel.
    ///
    /// Leaves map the key to itself; incomplete nested nodes map to their
    /// own diagnostics. List elements, at any depth, are named
    /// `<key>_<index>`.
    #[must_use]
    pub fn missing_values(&self) -> Diagnostics {
        let mut missing = Diagnostics::new();
        if self.never_receives_values() {
            return missing;
        }
        for entry in &self.entries {
            collect_missing(&entry.key, &entry.value, &mut missing);
        }
        missing
    }

    /// Docs of violated requirements.
    ///
    /// Nested nodes that do not meet their requirements map to their own
    /// diagnostics; violated requirements declared here map to their doc.
    #[must_use]
    pub fn violated_requirements(&self) -> Diagnostics {
        let mut violated = Diagnostics::new();
        if self.never_receives_values() {
            return violated;
        }
        for entry in &self.entries {
            match &entry.value {
                Value::Node(child) if !child.meets_requirements() => {
                    violated.insert(
                        entry.key.clone(),
                        Diagnostic::Nested(child.violated_requirements()),
                    );
                }
                Value::List(items) => {
                    for (index, item) in items.iter().enumerate() {
                        if let Value::Node(child) = item {
                            if !child.meets_requirements() {
                                violated.insert(
                                    format!("{}_{index}", entry.key),
                                    Diagnostic::Nested(child.violated_requirements()),
                                );
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        for (key, requirement) in self.requirements() {
            if !requirement.check(self) {
                violated.insert(key.clone(), Diagnostic::Leaf(requirement.doc().to_string()));
            }
        }
        violated
    }

    /// The error reported when an invalid node is used.
    #[must_use]
    pub fn incomplete_error(&self) -> Error {
        Error::IncompleteConfig {
            name: self.qualified_name().to_string(),
            missing: self.missing_values(),
            violated: self.violated_requirements(),
        }
    }
}
