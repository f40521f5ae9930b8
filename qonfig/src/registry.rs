//! Resolution of qualified component names to descriptors.
//!
//! Deserialized configurations name their component through the
//! `qonfig_name` entry. A [`Registry`] maps those names back to descriptors;
//! every configurable type that may appear in persisted documents registers
//! itself once at startup.

use std::collections::HashMap;
use std::sync::Arc;

use crate::descriptor::{Configurable, Descriptor};
use crate::error::{Error, Result};

/// Table of known component descriptors keyed by qualified name.
///
/// # Examples
///
/// ```
/// use qonfig::{Descriptor, Registry};
///
/// let mut registry = Registry::new();
/// registry.register_descriptor(Descriptor::builder("demo.sub.Sensor").build().into());
///
/// assert!(registry.resolve("demo.sub.Sensor").is_ok());
/// // unqualified names fall back to a unique match on the last segment
/// assert!(registry.resolve("Sensor").is_ok());
/// assert!(registry.resolve("demo.Missing").is_err());
/// ```
#[derive(Debug, Default, Clone)]
pub struct Registry {
    descriptors: HashMap<String, Arc<Descriptor>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a [`Configurable`] type, factory included.
    pub fn register<T: Configurable>(&mut self) -> &mut Self {
        self.register_descriptor(Descriptor::of::<T>())
    }

    /// Registers a descriptor under its qualified name.
    ///
    /// A later registration with the same name replaces the earlier one.
    pub fn register_descriptor(&mut self, descriptor: Arc<Descriptor>) -> &mut Self {
        let name = descriptor.name().to_string();
        if self.descriptors.insert(name.clone(), descriptor).is_some() {
            log::debug!("Replaced registration of {name}");
        }
        self
    }

    /// Returns `true` if `name` resolves exactly.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    /// Number of registered descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Resolves a qualified name to its descriptor.
    ///
    /// Exact matches win. Otherwise the last path segment of `name` is
    /// compared with the last segment of every registered name, and a single
    /// match is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Resolution`] if no descriptor, or more than one
    /// fallback candidate, matches.
    pub fn resolve(&self, name: &str) -> Result<Arc<Descriptor>> {
        if let Some(descriptor) = self.descriptors.get(name) {
            return Ok(Arc::clone(descriptor));
        }

        let short = last_segment(name);
        let mut candidates = self
            .descriptors
            .iter()
            .filter(|(registered, _)| last_segment(registered) == short);

        match (candidates.next(), candidates.next()) {
            (Some((registered, descriptor)), None) => {
                log::debug!("Resolved {name} to {registered} by type name");
                Ok(Arc::clone(descriptor))
            }
            _ => Err(Error::Resolution {
                name: name.to_string(),
            }),
        }
    }
}

fn last_segment(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(_, last)| last)
}
