//! Turning valid nodes into component instances.

use std::any::{type_name, Any};

use super::Node;
use crate::error::{Error, Result};

impl Node {
    /// Creates the configured component through the descriptor factory.
    ///
    /// The factory sees a detached deep copy of this node, so the instance
    /// can not reach back into a tree still held by the caller. With
    /// `no_copy`, or for components that never receive values, the node
    /// itself is passed.
    ///
    /// # Errors
    ///
    /// - [`Error::IncompleteConfig`] if the node is not valid
    /// - [`Error::NotConfigurable`] if the descriptor has no factory
    /// - [`Error::InstanceType`] if the factory produces something other than `T`
    /// - Any error returned by the factory
    pub fn to_instance<T: Any>(&self, no_copy: bool) -> Result<T> {
        if !self.is_valid() {
            return Err(self.incomplete_error());
        }
        let factory = self
            .descriptor
            .factory()
            .ok_or_else(|| Error::NotConfigurable {
                name: self.qualified_name().to_string(),
                reason: "no factory attached".to_string(),
            })?;

        let instance = if no_copy || self.never_receives_values() {
            factory(self)?
        } else {
            factory(&self.deep_copy())?
        };
        log::debug!("Instantiated {self}");

        instance
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| Error::InstanceType {
                expected: type_name::<T>(),
                found: self.qualified_name().to_string(),
            })
    }
}
