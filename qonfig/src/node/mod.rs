//! Configuration nodes.
//!
//! A [`Node`] mirrors the structure of the component it configures. It holds
//! one value per declared key, including nested nodes for child components,
//! and may be partially filled in. Writes fan out to every receptive
//! descendant declaring the same key, validity is checked recursively, and a
//! valid node is turned into a component instance through the descriptor
//! factory.
//!
//! # Key Concepts
//!
//! ## Propagation
//!
//! Setting a key on a node that receives values broadcasts the value into
//! every descendant that declares the same key and receives values itself,
//! regardless of depth. A component can opt out for good through its
//! descriptor (`never_receives_values`), and any node can be muted locally
//! with [`Node::set_receives_values`].
//!
//! ## Tree positions
//!
//! Nodes own their children. Every node carries a unique [`NodeId`], and a
//! child remembers the id of the node holding it. The id is a handle, not a
//! pointer: resolve it against a tree with [`Node::find`].
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use qonfig::{Descriptor, Empty, Node, Value};
//!
//! let solver = Arc::new(
//!     Descriptor::builder("demo.Solver")
//!         .field("tolerance", "convergence threshold", Empty)
//!         .build(),
//! );
//! let experiment = Arc::new(
//!     Descriptor::builder("demo.Experiment")
//!         .field("tolerance", "global tolerance", Empty)
//!         .nested("solver", "solver settings", solver)
//!         .build(),
//! );
//!
//! let mut node = Node::build(&experiment)?;
//! assert!(!node.is_complete());
//!
//! node.set("tolerance", 1e-6)?;
//! assert_eq!(*node.child("solver")?.get("tolerance")?, Value::from(1e-6));
//! assert!(node.is_valid());
//! # Ok::<(), qonfig::Error>(())
//! ```

mod copy;
mod instance;
mod propagate;
mod validate;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::descriptor::{Configurable, Descriptor, FieldDefault, Requirement};
use crate::error::{Error, Result};
use crate::value::{Value, NAME_KEY};

pub use copy::CopyMemo;
pub use validate::{Diagnostic, Diagnostics};
pub(crate) use validate::render_diagnostics;

/// Unique handle of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
struct Entry {
    key: String,
    doc: String,
    default: Value,
    value: Value,
}

/// A configuration object bound to one component descriptor.
pub struct Node {
    id: NodeId,
    parent: Option<NodeId>,
    descriptor: Arc<Descriptor>,
    name: Value,
    entries: Vec<Entry>,
    receives_values: bool,
}

/// Points nodes held directly by `value` at their new owner.
fn adopt(value: &mut Value, owner: NodeId) {
    match value {
        Value::Node(node) => node.parent = Some(owner),
        Value::List(items) => {
            for item in items {
                if let Value::Node(node) = item {
                    node.parent = Some(owner);
                }
            }
        }
        _ => {}
    }
}

impl Node {
    /// Builds a node from a descriptor.
    ///
    /// Nested component defaults are built recursively, values start out as
    /// copies of the defaults, and unless the component never receives
    /// values every held value is then propagated into the fresh subtree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConfigurable`] if the descriptor, or a nested
    /// component descriptor, declares no schema.
    pub fn build(descriptor: &Arc<Descriptor>) -> Result<Self> {
        let fields = descriptor.fields().ok_or_else(|| Error::NotConfigurable {
            name: descriptor.name().to_string(),
            reason: "no configuration schema declared".to_string(),
        })?;

        let id = NodeId::next();
        let mut entries = Vec::with_capacity(fields.len());
        for field in fields {
            let mut default = match field.default() {
                FieldDefault::Value(value) => value.clone(),
                FieldDefault::Component(nested) => Value::from(Self::build(nested)?),
                FieldDefault::Components(nested) => Value::List(
                    nested
                        .iter()
                        .map(|d| Self::build(d).map(Value::from))
                        .collect::<Result<_>>()?,
                ),
            };
            adopt(&mut default, id);
            let mut value = default.clone();
            adopt(&mut value, id);
            entries.push(Entry {
                key: field.key().to_string(),
                doc: field.doc().to_string(),
                default,
                value,
            });
        }

        let mut node = Self {
            id,
            parent: None,
            descriptor: Arc::clone(descriptor),
            name: Value::String(descriptor.name().to_string()),
            entries,
            receives_values: true,
        };
        node.propagate_all();
        log::trace!("Built {node} with {} keys", node.entries.len());
        Ok(node)
    }

    /// Builds a node for a [`Configurable`] type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConfigurable`] if the schema of `T` is unusable.
    pub fn new<T: Configurable>() -> Result<Self> {
        Self::build(&Descriptor::of::<T>())
    }

    fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key == key)
    }

    fn entry_mut(&mut self, key: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.key == key)
    }

    fn key_not_found(&self, key: &str) -> Error {
        Error::KeyNotFound {
            key: key.to_string(),
            name: self.qualified_name().to_string(),
        }
    }

    /// The qualified name of the configured component.
    #[must_use]
    pub fn qualified_name(&self) -> &str {
        self.descriptor.name()
    }

    /// The descriptor this node was built from.
    #[must_use]
    pub fn descriptor(&self) -> &Arc<Descriptor> {
        &self.descriptor
    }

    /// The unique handle of this node.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The handle of the node holding this one, if any.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Declared keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.key.as_str())
    }

    /// Declared keys with their current values.
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.entries.iter().map(|e| (e.key.as_str(), &e.value))
    }

    /// Returns `true` if `key` is declared.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entry(key).is_some()
    }

    /// Number of declared keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the component declares no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current value of `key`.
    ///
    /// `name` and `qonfig_name` always resolve to the qualified name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if `key` is not declared.
    pub fn get(&self, key: &str) -> Result<&Value> {
        if key == "name" || key == NAME_KEY {
            return Ok(&self.name);
        }
        self.entry(key)
            .map(|e| &e.value)
            .ok_or_else(|| self.key_not_found(key))
    }

    /// Current value of `key`, or `fallback` if it is not declared.
    #[must_use]
    pub fn get_or<'a>(&'a self, key: &str, fallback: &'a Value) -> &'a Value {
        self.entry(key).map_or(fallback, |e| &e.value)
    }

    /// Default value of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if `key` is not declared.
    pub fn default_of(&self, key: &str) -> Result<&Value> {
        self.entry(key)
            .map(|e| &e.default)
            .ok_or_else(|| self.key_not_found(key))
    }

    /// Documentation of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if `key` is not declared.
    pub fn get_doc(&self, key: &str) -> Result<&str> {
        self.entry(key)
            .map(|e| e.doc.as_str())
            .ok_or_else(|| self.key_not_found(key))
    }

    /// Declared keys with their default values.
    pub fn defaults(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.entries.iter().map(|e| (e.key.as_str(), &e.default))
    }

    /// Declared keys with their documentation.
    pub fn docs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|e| (e.key.as_str(), e.doc.as_str()))
    }

    /// Declared requirements.
    #[must_use]
    pub fn requirements(&self) -> &[(String, Requirement)] {
        self.descriptor.requirements()
    }

    /// The nested node held by `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if `key` is not declared and
    /// [`Error::InvalidValue`] if it does not hold a node.
    pub fn child(&self, key: &str) -> Result<&Node> {
        self.get(key)?.as_node().ok_or_else(|| Error::InvalidValue {
            field: key.to_string(),
            message: "not a nested configuration".to_string(),
        })
    }

    /// Mutable access to the nested node held by `key`.
    ///
    /// Writes through this reference start propagating at the child.
    ///
    /// # Errors
    ///
    /// Same as [`Node::child`].
    pub fn child_mut(&mut self, key: &str) -> Result<&mut Node> {
        let not_found = self.key_not_found(key);
        let entry = self.entry_mut(key).ok_or(not_found)?;
        entry.value.as_node_mut().ok_or_else(|| Error::InvalidValue {
            field: key.to_string(),
            message: "not a nested configuration".to_string(),
        })
    }

    /// Stores `value` under `key` and propagates it downwards.
    ///
    /// The stored value is a copy; nested nodes in it are re-parented to
    /// this node. If this node receives values, the value is then broadcast
    /// to every receptive descendant declaring `key`.
    ///
    /// A key not declared here is still broadcast to the descendants, which
    /// lets a root set a value only its children declare.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if neither this node nor any receptive
    /// descendant declares `key`.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();

        if self.store(key, value.clone()) {
            if self.receives_values() {
                let reached = self.propagate_value(key, &value);
                log::trace!("{key} set on {self}, propagated to {reached} descendants");
            }
            return Ok(());
        }

        let reached = self.propagate_value(key, &value);
        if reached == 0 {
            return Err(self.key_not_found(key));
        }
        log::debug!("{key} not declared on {self}, propagated to {reached} descendants");
        Ok(())
    }

    /// Stores `value` under a declared key without propagating it.
    ///
    /// Returns `false` if the key is not declared here.
    pub(crate) fn store(&mut self, key: &str, mut value: Value) -> bool {
        let id = self.id;
        match self.entry_mut(key) {
            Some(entry) => {
                adopt(&mut value, id);
                entry.value = value;
                true
            }
            None => false,
        }
    }

    /// Whether values set on ancestors reach this node.
    ///
    /// This is the local switch combined with the descriptor opt-out.
    #[must_use]
    pub fn receives_values(&self) -> bool {
        self.receives_values && !self.never_receives_values()
    }

    /// Switches propagation into this node on or off.
    pub fn set_receives_values(&mut self, receives: bool) {
        self.receives_values = receives;
    }

    /// Whether the component opted out of propagation for good.
    #[must_use]
    pub fn never_receives_values(&self) -> bool {
        self.descriptor.never_receives_values()
    }

    /// Finds the node with handle `id` in this subtree.
    #[must_use]
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children().find_map(|child| child.find(id))
    }

    /// Handles from this node down to the node with handle `id`.
    ///
    /// The first element is this node's handle, the last one `id`.
    #[must_use]
    pub fn path_to(&self, id: NodeId) -> Option<Vec<NodeId>> {
        if self.id == id {
            return Some(vec![id]);
        }
        self.children().find_map(|child| {
            child.path_to(id).map(|mut path| {
                path.insert(0, self.id);
                path
            })
        })
    }

    /// Resolves the parent handle of `node` within the tree rooted here.
    #[must_use]
    pub fn parent_of<'a>(&'a self, node: &Node) -> Option<&'a Node> {
        node.parent.and_then(|parent| self.find(parent))
    }

    /// Nodes held directly, or as list elements, by this node.
    pub fn children(&self) -> impl Iterator<Item = &Node> + '_ {
        self.entries.iter().flat_map(|e| {
            let direct = e.value.as_node().into_iter();
            let listed = e
                .value
                .as_list()
                .into_iter()
                .flatten()
                .filter_map(Value::as_node);
            direct.chain(listed)
        })
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.qualified_name() == other.qualified_name()
            && self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(a, b)| a.key == b.key && a.value == b.value)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Qonfig[{}]", self.qualified_name())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.qualified_name())
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("values", &self.entries)
            .field("receives_values", &self.receives_values)
            .finish()
    }
}
