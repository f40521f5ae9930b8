//! Common test utilities for integration tests.
//!
//! This module provides fixture components used throughout the qonfig
//! integration tests.

use std::sync::Arc;

use qonfig::{
    CalculatorComplex, CalculatorFloat, Configurable, Descriptor, Empty, Error, Node, Registry,
    Result, Value,
};

/// Doc of the requirement declared by [`CompositeComponent`].
#[allow(dead_code)]
pub const COMPOSITE_REQUIREMENT: &str = "It is required that super_key1['key1'] is 3 ";

fn real(config: &Node, key: &str) -> Result<CalculatorFloat> {
    match config.get(key)? {
        Value::Real(r) => Ok(r.clone()),
        Value::String(s) => Ok(CalculatorFloat::from(s.as_str())),
        other => other
            .as_f64()
            .map(CalculatorFloat::from)
            .ok_or_else(|| Error::InvalidValue {
                field: key.to_string(),
                message: format!("expected a real scalar, found {other:?}"),
            }),
    }
}

fn complex(config: &Node, key: &str) -> Result<CalculatorComplex> {
    match config.get(key)? {
        Value::Complex(c) => Ok(c.clone()),
        _ => real(config, key).map(CalculatorComplex::from),
    }
}

/// A leaf component with a real and a complex parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleComponent {
    /// Real parameter.
    pub key1: CalculatorFloat,
    /// Complex parameter.
    pub key2: CalculatorComplex,
}

impl Configurable for SimpleComponent {
    fn descriptor() -> Descriptor {
        Descriptor::builder("tests.SimpleComponent")
            .field("key1", "documentation for key1", CalculatorFloat::from(1.0))
            .field("key2", "documentation for key2", CalculatorComplex::new(0.0, 1.0))
            .build()
    }

    fn from_config(config: &Node) -> Result<Self> {
        Ok(Self {
            key1: real(config, "key1")?,
            key2: complex(config, "key2")?,
        })
    }

    fn to_config(&self) -> Result<Node> {
        let mut config = Node::new::<Self>()?;
        config.set("key1", self.key1.clone())?;
        config.set("key2", self.key2.clone())?;
        Ok(config)
    }
}

/// Same schema as [`SimpleComponent`], but ignores propagated values.
#[derive(Debug, Clone, PartialEq)]
pub struct NoPropagation {
    /// Real parameter.
    pub key1: CalculatorFloat,
}

impl Configurable for NoPropagation {
    fn descriptor() -> Descriptor {
        Descriptor::builder("tests.NoPropagation")
            .field("key1", "documentation for key1", CalculatorFloat::from(1.0))
            .field("key2", "documentation for key2", CalculatorComplex::new(0.0, 1.0))
            .never_receives_values(true)
            .build()
    }

    fn from_config(config: &Node) -> Result<Self> {
        Ok(Self {
            key1: real(config, "key1")?,
        })
    }

    fn to_config(&self) -> Result<Node> {
        let mut config = Node::new::<Self>()?;
        config.set("key1", self.key1.clone())?;
        Ok(config)
    }
}

/// A component nesting a [`SimpleComponent`] under `super_key1`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeComponent {
    /// The nested component.
    pub super_key1: SimpleComponent,
    /// Free-form value without a default.
    pub key2: Value,
    /// A label.
    pub key3: String,
}

impl Configurable for CompositeComponent {
    fn descriptor() -> Descriptor {
        Descriptor::builder("tests.CompositeComponent")
            .nested(
                "super_key1",
                "documentation for super_key1",
                Descriptor::of::<SimpleComponent>(),
            )
            .field("key2", "documentation for key2", Empty)
            .field("key3", "documentation for key3", "test")
            .requirement("super_key1", COMPOSITE_REQUIREMENT, |node| {
                node.child("super_key1")
                    .and_then(|child| child.get("key1"))
                    .is_ok_and(|key1| *key1 == Value::Int(3))
            })
            .build()
    }

    fn from_config(config: &Node) -> Result<Self> {
        Ok(Self {
            super_key1: SimpleComponent::from_config(config.child("super_key1")?)?,
            key2: config.get("key2")?.clone(),
            key3: config.get("key3")?.as_str().unwrap_or_default().to_string(),
        })
    }

    fn to_config(&self) -> Result<Node> {
        let mut config = Node::new::<Self>()?;
        config.set("super_key1", self.super_key1.to_config()?)?;
        config.set("key2", self.key2.clone())?;
        config.set("key3", self.key3.as_str())?;
        Ok(config)
    }
}

/// A component holding two [`SimpleComponent`]s in a list under `key`.
#[allow(dead_code)]
pub fn list_component() -> Arc<Descriptor> {
    Arc::new(
        Descriptor::builder("tests.ListComponent")
            .nested_list(
                "key",
                "list of simple components",
                vec![
                    Descriptor::of::<SimpleComponent>(),
                    Descriptor::of::<SimpleComponent>(),
                ],
            )
            .field("key2", "documentation for key2", CalculatorComplex::new(0.0, 1.0))
            .build(),
    )
}

/// A registry knowing every fixture component.
#[allow(dead_code)]
pub fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register::<SimpleComponent>()
        .register::<NoPropagation>()
        .register::<CompositeComponent>()
        .register_descriptor(list_component());
    registry
}
