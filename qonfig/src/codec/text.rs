//! YAML and JSON documents.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::{Error, Result};
use crate::node::Node;
use crate::registry::Registry;
use crate::value::Value;

/// Layout of JSON output.
///
/// # Examples
///
/// ```
/// use qonfig::JsonOptions;
///
/// assert_eq!(JsonOptions::default().indent, Some(2));
/// assert_eq!(JsonOptions::compact().indent, None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonOptions {
    /// Spaces per nesting level, or `None` for a single line.
    pub indent: Option<usize>,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self { indent: Some(2) }
    }
}

impl JsonOptions {
    /// Single line output.
    #[must_use]
    pub const fn compact() -> Self {
        Self { indent: None }
    }

    /// Sets the indentation width.
    #[must_use]
    pub fn with_indent(mut self, indent: Option<usize>) -> Self {
        self.indent = indent;
        self
    }
}

impl Node {
    /// The YAML document of this node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Yaml`] if the document can not be written.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.to_dict(true))?)
    }

    /// Reads a node from a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Yaml`] for malformed documents, otherwise the errors
    /// of [`Node::from_dict`].
    pub fn from_yaml(registry: &Registry, yaml: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(yaml)?;
        Self::from_value(registry, &value)
    }

    /// The JSON document of this node.
    ///
    /// Non-ASCII text is written as is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the document can not be written.
    pub fn to_json(&self, options: &JsonOptions) -> Result<String> {
        let dict = self.to_dict(true);
        let Some(width) = options.indent else {
            return Ok(serde_json::to_string(&dict)?);
        };

        let indent = " ".repeat(width);
        let mut buf = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
        dict.serialize(&mut serializer)?;
        String::from_utf8(buf).map_err(|e| Error::InvalidValue {
            field: "json".to_string(),
            message: e.to_string(),
        })
    }

    /// Reads a node from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] for malformed documents, otherwise the errors
    /// of [`Node::from_dict`].
    pub fn from_json(registry: &Registry, json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(registry, &value)
    }
}
