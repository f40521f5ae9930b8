//! The closed set of values a configuration node can hold.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::calculator::{CalculatorComplex, CalculatorFloat};
use crate::node::Node;

/// Canonical text form of the [`Empty`] sentinel in persisted documents.
pub const EMPTY_MARKER: &str = "<empty 'Empty'>";

/// Key naming the component type in the dict form of a node.
pub const NAME_KEY: &str = "qonfig_name";

/// Tag marking the dict encoding of a complex scalar.
pub const COMPLEX_TAG: &str = "is_calculator_complex";

/// Mapping form used by the dict codec.
pub type Dict = BTreeMap<String, Value>;

/// Marker for a value that has not been provided yet.
///
/// All instances are equal to each other.
///
/// # Examples
///
/// ```
/// use qonfig::{Empty, Value};
///
/// assert_eq!(Empty, Empty);
/// assert_eq!(Value::from(Empty), Value::Empty);
/// assert_eq!(Empty.to_string(), "empty");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Empty;

impl Empty {
    /// The persisted marker string of the sentinel.
    #[must_use]
    pub const fn marker() -> &'static str {
        EMPTY_MARKER
    }
}

impl fmt::Display for Empty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "empty")
    }
}

/// A leaf value of a type outside the closed value set.
///
/// Opaque values are compared by identity and serialize lossily to the
/// empty marker.
#[derive(Clone)]
pub struct Opaque {
    type_name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Opaque {
    /// Wraps an arbitrary value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            inner: Arc::new(value),
        }
    }

    /// Name of the wrapped Rust type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrows the wrapped value if it has type `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({})", self.type_name)
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// A configuration value.
///
/// Numbers compare across representations: `Int(1)`, `Float(1.0)` and a
/// numeric `Real(1.0)` are all equal, as is a complex number with zero
/// imaginary part. A symbolic real equals the string of its expression.
#[derive(Debug, Clone)]
pub enum Value {
    /// Not provided yet.
    Empty,
    /// Explicitly nothing.
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    String(String),
    /// A real, possibly symbolic, scalar.
    Real(CalculatorFloat),
    /// A complex, possibly symbolic, scalar.
    Complex(CalculatorComplex),
    /// A nested configuration node.
    Node(Box<Node>),
    /// An ordered sequence.
    List(Vec<Value>),
    /// A string keyed mapping.
    Map(Dict),
    /// A value of a foreign type.
    Opaque(Opaque),
}

impl Value {
    /// Returns `true` for the empty sentinel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Borrows the nested node, if any.
    #[must_use]
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Mutably borrows the nested node, if any.
    pub fn as_node_mut(&mut self) -> Option<&mut Node> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Borrows the list, if any.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrows the mapping, if any.
    #[must_use]
    pub fn as_map(&self) -> Option<&Dict> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Borrows the string, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean, if any.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns any numeric real value as `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(x) => Some(*x),
            Self::Real(r) => r.as_f64(),
            _ => None,
        }
    }

    /// Returns the complex scalar, if any.
    #[must_use]
    pub fn as_complex(&self) -> Option<&CalculatorComplex> {
        match self {
            Self::Complex(c) => Some(c),
            _ => None,
        }
    }

    /// Returns `true` for a list holding at least one node.
    #[must_use]
    pub fn contains_node(&self) -> bool {
        self.as_list()
            .is_some_and(|items| items.iter().any(|item| item.as_node().is_some()))
    }

    /// Returns `true` for a mapping that is the dict form of a node.
    #[must_use]
    pub fn is_node_dict(&self) -> bool {
        self.as_map().is_some_and(|map| map.contains_key(NAME_KEY))
    }

    /// Returns `true` for a mapping that encodes a complex scalar.
    #[must_use]
    pub fn is_complex_dict(&self) -> bool {
        self.as_map()
            .and_then(|map| map.get(COMPLEX_TAG))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Returns `true` for the persisted empty marker string.
    #[must_use]
    pub fn is_empty_marker(&self) -> bool {
        self.as_str() == Some(EMPTY_MARKER)
    }
}

fn complex_equals_real(c: &CalculatorComplex, x: f64) -> bool {
    c.imag().as_f64() == Some(0.0) && c.real().as_f64() == Some(x)
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Real(a), Self::Real(b)) => a == b,
            (Self::Real(CalculatorFloat::Str(a)), Self::String(b))
            | (Self::String(b), Self::Real(CalculatorFloat::Str(a))) => a == b,
            (Self::Complex(a), Self::Complex(b)) => a == b,
            (Self::Complex(c), other) | (other, Self::Complex(c)) => {
                other.as_f64().is_some_and(|x| complex_equals_real(c, x))
            }
            (Self::Node(a), Self::Node(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Opaque(a), Self::Opaque(b)) => a == b,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

impl From<Empty> for Value {
    fn from(_: Empty) -> Self {
        Self::Empty
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<CalculatorFloat> for Value {
    fn from(value: CalculatorFloat) -> Self {
        Self::Real(value)
    }
}

impl From<CalculatorComplex> for Value {
    fn from(value: CalculatorComplex) -> Self {
        Self::Complex(value)
    }
}

impl From<Node> for Value {
    fn from(value: Node) -> Self {
        Self::Node(Box::new(value))
    }
}

impl From<Dict> for Value {
    fn from(value: Dict) -> Self {
        Self::Map(value)
    }
}

impl From<Opaque> for Value {
    fn from(value: Opaque) -> Self {
        Self::Opaque(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Empty | Self::Opaque(_) => serializer.serialize_str(EMPTY_MARKER),
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::String(s) => serializer.serialize_str(s),
            Self::Real(r) => r.serialize(serializer),
            Self::Complex(c) => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("imag", c.imag())?;
                map.serialize_entry(COMPLEX_TAG, &true)?;
                map.serialize_entry("real", c.real())?;
                map.end()
            }
            Self::Node(node) => node.to_dict(true).serialize(serializer),
            Self::List(items) => items.serialize(serializer),
            Self::Map(map) => map.serialize(serializer),
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a configuration value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Int(v))
    }

    #[allow(clippy::cast_precision_loss)]
    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(i64::try_from(v).map_or(Value::Float(v as f64), Value::Int))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let mut map = Dict::new();
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_cross_equality() {
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_eq!(Value::Real(CalculatorFloat::from(1.0)), Value::Float(1.0));
        assert_eq!(Value::Real(CalculatorFloat::from(3.0)), Value::Int(3));
        assert_ne!(Value::Int(1), Value::Float(1.5));
        assert_ne!(Value::Bool(true), Value::Int(1));
        assert_ne!(Value::String("1".into()), Value::Int(1));
    }

    #[test]
    fn test_complex_equality() {
        let i = Value::from(CalculatorComplex::new(0.0, 1.0));
        assert_eq!(i, Value::from(CalculatorComplex::new(0.0, 1.0)));
        assert_ne!(i, Value::Float(0.0));
        assert_eq!(Value::from(CalculatorComplex::new(2.0, 0.0)), Value::Int(2));
    }

    #[test]
    fn test_empty_only_equals_empty() {
        assert_eq!(Value::Empty, Value::from(Empty));
        assert_ne!(Value::Empty, Value::Null);
        assert_ne!(Value::Empty, Value::from(EMPTY_MARKER));
        assert!(Value::from(EMPTY_MARKER).is_empty_marker());
    }

    #[test]
    fn test_opaque_identity() {
        let a = Opaque::new(vec![1u8, 2, 3]);
        let b = a.clone();
        let c = Opaque::new(vec![1u8, 2, 3]);
        assert_eq!(Value::from(a.clone()), Value::from(b));
        assert_ne!(Value::from(a.clone()), Value::from(c));
        assert_eq!(a.downcast_ref::<Vec<u8>>(), Some(&vec![1, 2, 3]));
    }

    #[test]
    fn test_shape_probes() {
        let mut node_dict = Dict::new();
        node_dict.insert(NAME_KEY.to_string(), Value::from("demo.Simple"));
        assert!(Value::Map(node_dict).is_node_dict());

        let mut complex = Dict::new();
        complex.insert(COMPLEX_TAG.to_string(), Value::Bool(true));
        assert!(Value::Map(complex).is_complex_dict());

        let mut untagged = Dict::new();
        untagged.insert(COMPLEX_TAG.to_string(), Value::Bool(false));
        assert!(!Value::Map(untagged).is_complex_dict());
    }

    #[test]
    fn test_deserialize_yaml_scalars() {
        let value: Value = serde_yaml::from_str("a: 1\nb: 2.5\nc: text\nd: null\ne: [true]\n").unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map["a"], Value::Int(1));
        assert_eq!(map["b"], Value::Float(2.5));
        assert_eq!(map["c"], Value::from("text"));
        assert_eq!(map["d"], Value::Null);
        assert_eq!(map["e"], Value::from(vec![true]));
    }

    #[test]
    fn test_serialize_complex_and_empty() {
        let json = serde_json::to_string(&Value::from(vec![
            Value::Empty,
            Value::from(CalculatorComplex::new(0.0, 1.0)),
        ]))
        .unwrap();
        assert_eq!(
            json,
            r#"["<empty 'Empty'>",{"imag":1.0,"is_calculator_complex":true,"real":0.0}]"#
        );
    }
}
