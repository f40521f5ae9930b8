//! Flat single-level export.

use regex::Regex;

use super::coerce_yaml;
use crate::calculator::CalculatorFloat;
use crate::error::{Error, Result};
use crate::node::Node;
use crate::value::{Value, NAME_KEY};

/// Options for [`Node::to_tabular`].
///
/// # Examples
///
/// ```
/// use qonfig::TabularOptions;
///
/// let options = TabularOptions::default()
///     .with_valid_check(false)
///     .with_excluded_keys(["key2", r"stages_\d+_qonfig_name"]);
/// assert!(options.enforce_yaml_compatible);
/// assert_eq!(options.excluded_keys.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularOptions {
    /// Refuse to export nodes that are not valid.
    pub valid_check: bool,
    /// Regular expressions; flattened names matching one entirely are dropped.
    pub excluded_keys: Vec<String>,
    /// Coerce values into YAML compatible form.
    pub enforce_yaml_compatible: bool,
}

impl Default for TabularOptions {
    fn default() -> Self {
        Self {
            valid_check: true,
            excluded_keys: Vec::new(),
            enforce_yaml_compatible: true,
        }
    }
}

impl TabularOptions {
    /// Sets whether invalid nodes are refused.
    #[must_use]
    pub fn with_valid_check(mut self, valid_check: bool) -> Self {
        self.valid_check = valid_check;
        self
    }

    /// Sets the exclusion patterns.
    #[must_use]
    pub fn with_excluded_keys<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_keys = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets whether values are coerced into YAML compatible form.
    #[must_use]
    pub fn with_enforce_yaml_compatible(mut self, enforce: bool) -> Self {
        self.enforce_yaml_compatible = enforce;
        self
    }

    fn exclusions(&self) -> Result<Vec<Regex>> {
        self.excluded_keys
            .iter()
            .map(|pattern| {
                Regex::new(&format!("^(?:{pattern})$")).map_err(|e| Error::InvalidValue {
                    field: "excluded_keys".to_string(),
                    message: e.to_string(),
                })
            })
            .collect()
    }
}

/// A node flattened to one level of named values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    entries: Vec<(String, Value)>,
}

impl Table {
    /// Value of the flattened name `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Flattened names in export order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if every entry was excluded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names with their values in export order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Writes a header row of names and a single row of values.
    ///
    /// Strings are written as they are, everything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Csv`] or [`Error::Json`] if a cell can not be
    /// written.
    pub fn to_csv(&self, delimiter: u8) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());
        writer.write_record(self.keys())?;
        let cells = self
            .entries
            .iter()
            .map(|(_, value)| cell(value))
            .collect::<Result<Vec<_>>>()?;
        writer.write_record(&cells)?;

        let bytes = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| Error::InvalidValue {
            field: "csv".to_string(),
            message: e.to_string(),
        })
    }
}

fn cell(value: &Value) -> Result<String> {
    Ok(match value {
        Value::String(s) | Value::Real(CalculatorFloat::Str(s)) => s.clone(),
        Value::Null => String::new(),
        other => serde_json::to_string(other)?,
    })
}

impl Node {
    /// Flattens this node into a [`Table`].
    ///
    /// Keys of nested nodes are prefixed with `<key>_`, keys of nodes held in
    /// lists with `<key>_<index>_`. Exclusion patterns must match a whole
    /// flattened name and are applied after flattening.
    ///
    /// # Errors
    ///
    /// - [`Error::IncompleteConfig`] if `valid_check` is set and the node is not valid
    /// - [`Error::InvalidValue`] if an exclusion pattern is not a regular expression
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use qonfig::{Descriptor, Node, TabularOptions};
    ///
    /// let gate = Arc::new(Descriptor::builder("demo.Gate").field("key2", "duration", 1.0).build());
    /// let circuit = Arc::new(
    ///     Descriptor::builder("demo.Circuit")
    ///         .nested_list("key", "gates", vec![gate.clone(), gate])
    ///         .field("key2", "depth", 2)
    ///         .build(),
    /// );
    ///
    /// let node = Node::build(&circuit)?;
    /// let table = node.to_tabular(&TabularOptions::default().with_excluded_keys(["key2"]))?;
    /// assert!(table.get("key2").is_none());
    /// assert!(table.get("key_0_key2").is_some());
    /// assert!(table.get("key_1_qonfig_name").is_some());
    /// # Ok::<(), qonfig::Error>(())
    /// ```
    pub fn to_tabular(&self, options: &TabularOptions) -> Result<Table> {
        if options.valid_check && !self.is_valid() {
            return Err(self.incomplete_error());
        }
        let exclusions = options.exclusions()?;

        let mut entries = Vec::new();
        self.flatten_into("", options.enforce_yaml_compatible, &mut entries);
        entries.retain(|(name, _)| !exclusions.iter().any(|re| re.is_match(name)));
        Ok(Table { entries })
    }

    fn flatten_into(&self, prefix: &str, enforce: bool, out: &mut Vec<(String, Value)>) {
        out.push((
            format!("{prefix}{NAME_KEY}"),
            Value::String(self.qualified_name().to_string()),
        ));
        for (key, value) in self.values() {
            match value {
                Value::Node(child) => child.flatten_into(&format!("{prefix}{key}_"), enforce, out),
                Value::List(items) if items.iter().all(|item| item.as_node().is_some()) => {
                    for (index, child) in items.iter().filter_map(Value::as_node).enumerate() {
                        child.flatten_into(&format!("{prefix}{key}_{index}_"), enforce, out);
                    }
                }
                other if enforce => out.push((format!("{prefix}{key}"), coerce_yaml(other))),
                other => out.push((format!("{prefix}{key}"), other.clone())),
            }
        }
    }
}
