//! Persisted forms of configuration nodes.
//!
//! The dict form is the hub: a mapping holding the qualified component name
//! under `qonfig_name` and one entry per declared key, with nested nodes as
//! nested mappings. YAML and JSON documents are textual encodings of it, and
//! the tabular form flattens it into a single level.
//!
//! Values outside the closed value set can not be represented and degrade to
//! the empty marker on export. Reading a document back needs a [`Registry`]
//! to turn component names into descriptors.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use qonfig::{Descriptor, Node, Registry};
//!
//! let descriptor = Arc::new(
//!     Descriptor::builder("demo.Sensor")
//!         .field("rate", "samples per second", 100)
//!         .build(),
//! );
//! let mut registry = Registry::new();
//! registry.register_descriptor(descriptor.clone());
//!
//! let node = Node::build(&descriptor)?;
//! let yaml = node.to_yaml()?;
//! assert!(yaml.contains("qonfig_name: demo.Sensor"));
//! assert_eq!(Node::from_yaml(&registry, &yaml)?, node);
//! # Ok::<(), qonfig::Error>(())
//! ```

mod tabular;
mod text;

pub use tabular::{Table, TabularOptions};
pub use text::JsonOptions;

use crate::calculator::{CalculatorComplex, CalculatorFloat};
use crate::error::{Error, Result};
use crate::node::Node;
use crate::registry::Registry;
use crate::value::{Dict, Empty, Value, COMPLEX_TAG, EMPTY_MARKER, NAME_KEY};

/// Converts a value into a form every YAML and JSON writer accepts.
///
/// Mappings and lists are converted element-wise, real scalars become their
/// number or expression, complex scalars their tagged mapping, nested nodes
/// their dict form. The empty sentinel and foreign values become the empty
/// marker string.
#[must_use]
pub fn coerce_yaml(value: &Value) -> Value {
    match value {
        Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_) => {
            value.clone()
        }
        Value::Real(CalculatorFloat::Float(x)) => Value::Float(*x),
        Value::Real(CalculatorFloat::Str(s)) => Value::String(s.clone()),
        Value::Complex(c) => Value::Map(complex_dict(c)),
        Value::Node(node) => Value::Map(node.to_dict(true)),
        Value::List(items) => Value::List(items.iter().map(coerce_yaml).collect()),
        Value::Map(map) => Value::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), coerce_yaml(v)))
                .collect(),
        ),
        Value::Empty => Value::String(EMPTY_MARKER.to_string()),
        Value::Opaque(opaque) => {
            log::debug!("Writing {} value as empty marker", opaque.type_name());
            Value::String(EMPTY_MARKER.to_string())
        }
    }
}

fn complex_dict(c: &CalculatorComplex) -> Dict {
    let mut dict = Dict::new();
    dict.insert(COMPLEX_TAG.to_string(), Value::Bool(true));
    dict.insert("real".to_string(), coerce_yaml(&Value::Real(c.real().clone())));
    dict.insert("imag".to_string(), coerce_yaml(&Value::Real(c.imag().clone())));
    dict
}

fn encode(value: &Value, enforce_yaml_compatible: bool) -> Value {
    match value {
        Value::Node(child) => Value::Map(child.to_dict(enforce_yaml_compatible)),
        Value::List(items) if value.contains_node() => Value::List(
            items
                .iter()
                .map(|item| match item {
                    Value::Node(child) => Value::Map(child.to_dict(enforce_yaml_compatible)),
                    other if enforce_yaml_compatible => coerce_yaml(other),
                    other => other.clone(),
                })
                .collect(),
        ),
        Value::Empty => Value::String(EMPTY_MARKER.to_string()),
        other if enforce_yaml_compatible => coerce_yaml(other),
        other => other.clone(),
    }
}

#[allow(clippy::cast_precision_loss)]
fn part(map: &Dict, name: &str) -> Result<CalculatorFloat> {
    match map.get(name) {
        Some(Value::Float(x)) => Ok(CalculatorFloat::Float(*x)),
        Some(Value::Int(i)) => Ok(CalculatorFloat::Float(*i as f64)),
        Some(Value::String(s)) => Ok(CalculatorFloat::Str(s.clone())),
        Some(Value::Real(r)) => Ok(r.clone()),
        _ => Err(Error::InvalidValue {
            field: name.to_string(),
            message: "complex encoding needs numeric or symbolic real and imag parts".to_string(),
        }),
    }
}

fn decode_complex(map: &Dict) -> Result<Value> {
    Ok(Value::from(CalculatorComplex::from_pair(
        part(map, "real")?,
        part(map, "imag")?,
    )))
}

// Node dicts whose component has no schema are kept as plain mappings.
fn decode_node(registry: &Registry, value: &Value, map: &Dict) -> Result<Value> {
    match Node::from_dict(registry, map) {
        Ok(node) => Ok(Value::from(node)),
        Err(err) if err.is_not_configurable() => {
            log::debug!("Keeping raw mapping: {err}");
            Ok(value.clone())
        }
        Err(err) => Err(err),
    }
}

fn decode(registry: &Registry, value: &Value) -> Result<Value> {
    match value {
        Value::Map(map) if value.is_node_dict() => decode_node(registry, value, map),
        Value::Map(map) if value.is_complex_dict() => decode_complex(map),
        Value::List(items) => items
            .iter()
            .map(|item| decode(registry, item))
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        v if v.is_empty_marker() => Ok(Value::from(Empty)),
        other => Ok(other.clone()),
    }
}

impl Node {
    /// The dict form of this node.
    ///
    /// Nested nodes become nested mappings and the empty sentinel its marker
    /// string. With `enforce_yaml_compatible` every other value is passed
    /// through [`coerce_yaml`], otherwise it is copied as is.
    #[must_use]
    pub fn to_dict(&self, enforce_yaml_compatible: bool) -> Dict {
        let mut dict = Dict::new();
        dict.insert(
            NAME_KEY.to_string(),
            Value::String(self.qualified_name().to_string()),
        );
        for (key, value) in self.values() {
            dict.insert(key.to_string(), encode(value, enforce_yaml_compatible));
        }
        dict
    }

    /// Rebuilds a node from its dict form.
    ///
    /// A fresh node is built from the descriptor named by `qonfig_name`, and
    /// every declared key present in `dict` is stored on it in declaration
    /// order. Nested documents carry their own values, so nothing is
    /// propagated while restoring and `from_dict(&n.to_dict(true)) == n`.
    /// Keys the component does not declare are ignored.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidValue`] if `qonfig_name` is missing or malformed
    /// - [`Error::Resolution`] if the name is not registered
    /// - [`Error::NotConfigurable`] if the named component has no schema
    pub fn from_dict(registry: &Registry, dict: &Dict) -> Result<Self> {
        let name = dict
            .get(NAME_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::InvalidValue {
                field: NAME_KEY.to_string(),
                message: "expected the qualified component name".to_string(),
            })?;
        let descriptor = registry.resolve(name)?;
        let mut node = Self::build(&descriptor)?;

        let keys: Vec<String> = node.keys().map(str::to_string).collect();
        for key in keys {
            if let Some(value) = dict.get(&key) {
                let decoded = decode(registry, value)?;
                node.store(&key, decoded);
            }
        }
        Ok(node)
    }

    /// Rebuilds a node from a mapping value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if `value` is not a mapping, otherwise
    /// the errors of [`Node::from_dict`].
    pub fn from_value(registry: &Registry, value: &Value) -> Result<Self> {
        let dict = value.as_map().ok_or_else(|| Error::InvalidValue {
            field: NAME_KEY.to_string(),
            message: "a configuration document must be a mapping".to_string(),
        })?;
        Self::from_dict(registry, dict)
    }
}
