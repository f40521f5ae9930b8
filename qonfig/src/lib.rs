#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # qonfig
//!
//! Hierarchical, self-describing configuration trees.
//!
//! A configurable component declares its keys, their documentation and
//! defaults in a [`Descriptor`]. A [`Node`] built from it mirrors the
//! component's structure, nested components included, and may be filled in
//! step by step. Values written to a node reach every descendant declaring
//! the same key, completeness and requirements are checked recursively, and
//! a valid node is turned into an instance of the component.
//!
//! ## Core Types
//!
//! - [`Descriptor`] and [`Configurable`]: Component schemas
//! - [`Node`] and [`Value`]: Configuration trees and the values they hold
//! - [`Registry`]: Resolution of persisted component names
//! - [`Error`] and [`Result`]: Error handling types
//! - [`Logger`] and [`LogLevel`]: Logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use std::sync::Arc;
//! use qonfig::{Descriptor, Empty, Node, Registry};
//!
//! let solver = Arc::new(
//!     Descriptor::builder("demo.Solver")
//!         .field("tolerance", "convergence threshold", Empty)
//!         .field("max_steps", "iteration limit", 100)
//!         .build(),
//! );
//! let experiment = Arc::new(
//!     Descriptor::builder("demo.Experiment")
//!         .nested("solver", "solver settings", solver.clone())
//!         .build(),
//! );
//!
//! let mut node = Node::build(&experiment)?;
//! assert!(!node.is_valid());
//!
//! // reaches the solver although the experiment does not declare it
//! node.set("tolerance", 1e-8)?;
//! assert!(node.is_valid());
//!
//! let mut registry = Registry::new();
//! registry.register_descriptor(solver).register_descriptor(experiment);
//! let restored = Node::from_json(&registry, &node.to_json(&Default::default())?)?;
//! assert_eq!(restored, node);
//! # Ok::<(), qonfig::Error>(())
//! ```

pub mod calculator;
pub mod codec;
pub mod descriptor;
pub mod error;
pub mod io;
pub mod logging;
pub mod node;
pub mod registry;
pub mod value;

// Re-export key types at crate root for convenience
pub use calculator::{CalculatorComplex, CalculatorFloat};
pub use codec::{JsonOptions, Table, TabularOptions};
pub use descriptor::{Configurable, Descriptor, DescriptorBuilder, FieldDefault, Requirement};
pub use error::{Error, Result};
pub use logging::{init_logger, LogLevel, Logger};
pub use node::{CopyMemo, Diagnostic, Diagnostics, Node, NodeId};
pub use registry::Registry;
pub use value::{Dict, Empty, Opaque, Value, EMPTY_MARKER};
