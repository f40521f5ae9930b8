//! Error types for the qonfig library.
//!
//! This module provides the error hierarchy for building, validating,
//! instantiating and serializing configuration trees, using `thiserror` for
//! ergonomic error handling.

use std::path::PathBuf;

use thiserror::Error;

use crate::node::{render_diagnostics, Diagnostics};

/// Result type alias for operations that may fail with a qonfig error.
///
/// # Examples
///
/// ```
/// use qonfig::{Error, Result};
///
/// fn example_operation() -> Result<usize> {
///     Ok(3)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the qonfig library.
#[derive(Debug, Error)]
pub enum Error {
    /// The descriptor has no schema, or the resolved type has no factory.
    #[error("{name} can not be configured: {reason}")]
    NotConfigurable {
        /// Qualified name of the offending component.
        name: String,
        /// Why the component can not be configured.
        reason: String,
    },

    /// The configuration is not valid (incomplete or violating requirements).
    #[error(
        "incomplete configuration {name}: missing values {}, violated requirements {}",
        render_diagnostics(.missing),
        render_diagnostics(.violated)
    )]
    IncompleteConfig {
        /// Qualified name of the incomplete node.
        name: String,
        /// Keys still holding the empty sentinel, mirroring tree shape.
        missing: Diagnostics,
        /// Documentation of violated requirements, mirroring tree shape.
        violated: Diagnostics,
    },

    /// A key that is not declared by the component was accessed.
    #[error("key '{key}' not in keys of {name}")]
    KeyNotFound {
        /// The requested key.
        key: String,
        /// Qualified name of the node that was accessed.
        name: String,
    },

    /// A qualified name could not be resolved to a registered descriptor.
    #[error("could not resolve component '{name}'")]
    Resolution {
        /// The unresolved qualified name.
        name: String,
    },

    /// The factory of a descriptor produced an instance of another type.
    #[error("factory of {found} does not produce instances of {expected}")]
    InstanceType {
        /// The Rust type that was requested.
        expected: &'static str,
        /// Qualified name of the descriptor that was asked.
        found: String,
    },

    /// A value in a serialized configuration or an option was malformed.
    #[error("invalid value for '{field}': {message}")]
    InvalidValue {
        /// The field holding the invalid value.
        field: String,
        /// A description of the problem.
        message: String,
    },

    /// A YAML document could not be parsed or produced.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON document could not be parsed or produced.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Delimited tabular output could not be written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An invalid filesystem path was provided.
    #[error("invalid path {}: {reason}", path.display())]
    InvalidPath {
        /// The invalid path.
        path: PathBuf,
        /// The reason the path is invalid.
        reason: String,
    },

    /// Refused to overwrite an existing file.
    #[error("file {} already exists", path.display())]
    FileExists {
        /// The existing file.
        path: PathBuf,
    },
}

impl Error {
    /// Check if error reports an invalid (incomplete) configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use qonfig::Error;
    ///
    /// let err = Error::IncompleteConfig {
    ///     name: "demo.Component".to_string(),
    ///     missing: Default::default(),
    ///     violated: Default::default(),
    /// };
    /// assert!(err.is_incomplete());
    /// ```
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::IncompleteConfig { .. })
    }

    /// Check if error reports access to an undeclared key.
    #[must_use]
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. })
    }

    /// Check if error reports a component that can not be configured.
    #[must_use]
    pub fn is_not_configurable(&self) -> bool {
        matches!(self, Self::NotConfigurable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Diagnostic;

    #[test]
    fn test_not_configurable_error() {
        let err = Error::NotConfigurable {
            name: "demo.Plain".to_string(),
            reason: "no schema declared".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("demo.Plain"));
        assert!(display.contains("no schema declared"));
        assert!(err.is_not_configurable());
    }

    #[test]
    fn test_incomplete_config_error_lists_diagnostics() {
        let mut missing = Diagnostics::new();
        missing.insert("key1".to_string(), Diagnostic::Leaf("key1".to_string()));
        let err = Error::IncompleteConfig {
            name: "demo.Simple".to_string(),
            missing,
            violated: Diagnostics::new(),
        };
        let display = format!("{err}");
        assert!(display.contains("incomplete configuration demo.Simple"));
        assert!(display.contains("\"key1\":\"key1\""));
        assert!(err.is_incomplete());
    }

    #[test]
    fn test_key_not_found_error() {
        let err = Error::KeyNotFound {
            key: "key3".to_string(),
            name: "demo.Simple".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("key3"));
        assert!(display.contains("demo.Simple"));
        assert!(err.is_key_not_found());
        assert!(!err.is_incomplete());
    }

    #[test]
    fn test_resolution_error() {
        let err = Error::Resolution {
            name: "missing.Component".to_string(),
        };
        assert!(format!("{err}").contains("missing.Component"));
    }

    #[test]
    fn test_file_exists_error() {
        let err = Error::FileExists {
            path: PathBuf::from("/tmp/config.yaml"),
        };
        let display = format!("{err}");
        assert!(display.contains("already exists"));
        assert!(display.contains("config.yaml"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(format!("{err}").contains("I/O error"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(format!("{err}").contains("JSON error"));
    }
}
