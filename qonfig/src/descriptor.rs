//! Component descriptors: the schema a configurable component exposes.
//!
//! A [`Descriptor`] names a component, declares its keys with documentation
//! and default values, optional cross-field requirements, whether the
//! component opts out of receiving propagated values, and the factory that
//! turns a valid configuration into a live instance.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use qonfig::{Descriptor, Empty, Node};
//!
//! let descriptor = Descriptor::builder("demo.Pulse")
//!     .field("duration", "length of the pulse", 1.0)
//!     .field("amplitude", "peak amplitude", Empty)
//!     .requirement("duration", "duration must be positive", |node| {
//!         node.get("duration")
//!             .ok()
//!             .and_then(|v| v.as_f64())
//!             .is_some_and(|d| d > 0.0)
//!     })
//!     .build();
//!
//! let node = Node::build(&Arc::new(descriptor)).unwrap();
//! assert!(!node.is_complete());
//! assert!(node.meets_requirements());
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::node::Node;
use crate::value::Value;

/// Predicate evaluated against the node declaring a requirement.
pub type Predicate = Arc<dyn Fn(&Node) -> bool + Send + Sync>;

/// Type-erased factory turning a valid node into a component instance.
pub type Factory = Arc<dyn Fn(&Node) -> Result<Box<dyn Any>> + Send + Sync>;

/// Default of a declared key.
#[derive(Clone)]
pub enum FieldDefault {
    /// A plain value, copied into every new node.
    Value(Value),
    /// A nested component, built afresh for every new node.
    Component(Arc<Descriptor>),
    /// A list of nested components, built afresh for every new node.
    Components(Vec<Arc<Descriptor>>),
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Component(d) => f.debug_tuple("Component").field(&d.name()).finish(),
            Self::Components(ds) => f
                .debug_tuple("Components")
                .field(&ds.iter().map(|d| d.name()).collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// A declared key with its documentation and default.
#[derive(Debug, Clone)]
pub struct Field {
    key: String,
    doc: String,
    default: FieldDefault,
}

impl Field {
    /// The declared key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Documentation of the key.
    #[must_use]
    pub fn doc(&self) -> &str {
        &self.doc
    }

    /// Default of the key.
    #[must_use]
    pub fn default(&self) -> &FieldDefault {
        &self.default
    }
}

/// A named cross-field predicate with its documentation.
#[derive(Clone)]
pub struct Requirement {
    doc: String,
    predicate: Predicate,
}

impl Requirement {
    /// Creates a requirement from a predicate.
    pub fn new(doc: impl Into<String>, predicate: impl Fn(&Node) -> bool + Send + Sync + 'static) -> Self {
        Self {
            doc: doc.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Documentation reported when the requirement is violated.
    #[must_use]
    pub fn doc(&self) -> &str {
        &self.doc
    }

    /// Evaluates the predicate against `node`.
    #[must_use]
    pub fn check(&self, node: &Node) -> bool {
        (self.predicate)(node)
    }
}

impl fmt::Debug for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Requirement").field("doc", &self.doc).finish_non_exhaustive()
    }
}

/// Schema of a configurable component.
pub struct Descriptor {
    name: String,
    fields: Option<Vec<Field>>,
    requirements: Vec<(String, Requirement)>,
    never_receives_values: bool,
    ancestors: Vec<String>,
    factory: Option<Factory>,
}

impl Descriptor {
    /// Starts a descriptor for the component with the given qualified name.
    pub fn builder(name: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder {
            inner: Self {
                name: name.into(),
                fields: Some(Vec::new()),
                requirements: Vec::new(),
                never_receives_values: false,
                ancestors: Vec::new(),
                factory: None,
            },
        }
    }

    /// A descriptor for a known type that exposes no configuration schema.
    ///
    /// Building a node from it fails with `NotConfigurable`.
    pub fn opaque(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: None,
            requirements: Vec::new(),
            never_receives_values: false,
            ancestors: Vec::new(),
            factory: None,
        }
    }

    /// The descriptor of a [`Configurable`] type with its factory attached.
    #[must_use]
    pub fn of<T: Configurable>() -> Arc<Self> {
        let mut descriptor = T::descriptor();
        let factory: Factory = Arc::new(|node: &Node| {
            T::from_config(node).map(|instance| Box::new(instance) as Box<dyn Any>)
        });
        descriptor.factory = Some(factory);
        Arc::new(descriptor)
    }

    /// The qualified component name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields, or `None` if the component has no schema.
    #[must_use]
    pub fn fields(&self) -> Option<&[Field]> {
        self.fields.as_deref()
    }

    /// Returns `true` if the component declares a schema.
    #[must_use]
    pub fn is_configurable(&self) -> bool {
        self.fields.is_some()
    }

    /// Declared requirements, keyed by requirement name.
    #[must_use]
    pub fn requirements(&self) -> &[(String, Requirement)] {
        &self.requirements
    }

    /// Whether nodes of this component ignore propagated values.
    #[must_use]
    pub fn never_receives_values(&self) -> bool {
        self.never_receives_values
    }

    /// The factory, if one was attached.
    #[must_use]
    pub fn factory(&self) -> Option<&Factory> {
        self.factory.as_ref()
    }

    /// Returns `true` if this component is `name` or declares it as ancestor.
    #[must_use]
    pub fn is_a(&self, name: &str) -> bool {
        self.name == name || self.ancestors.iter().any(|a| a == name)
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("requirements", &self.requirements)
            .field("never_receives_values", &self.never_receives_values)
            .field("ancestors", &self.ancestors)
            .field("factory", &self.factory.is_some())
            .finish()
    }
}

/// Builder for [`Descriptor`].
pub struct DescriptorBuilder {
    inner: Descriptor,
}

impl DescriptorBuilder {
    fn push_field(mut self, key: impl Into<String>, doc: impl Into<String>, default: FieldDefault) -> Self {
        let key = key.into();
        let field = Field {
            key: key.clone(),
            doc: doc.into(),
            default,
        };
        let fields = self.inner.fields.get_or_insert_with(Vec::new);
        match fields.iter_mut().find(|f| f.key == key) {
            Some(existing) => *existing = field,
            None => fields.push(field),
        }
        self
    }

    /// Declares a key with a plain default value.
    #[must_use]
    pub fn field(self, key: impl Into<String>, doc: impl Into<String>, default: impl Into<Value>) -> Self {
        self.push_field(key, doc, FieldDefault::Value(default.into()))
    }

    /// Declares a key whose default is a nested component.
    #[must_use]
    pub fn nested(self, key: impl Into<String>, doc: impl Into<String>, component: Arc<Descriptor>) -> Self {
        self.push_field(key, doc, FieldDefault::Component(component))
    }

    /// Declares a key whose default is a list of nested components.
    #[must_use]
    pub fn nested_list(
        self,
        key: impl Into<String>,
        doc: impl Into<String>,
        components: Vec<Arc<Descriptor>>,
    ) -> Self {
        self.push_field(key, doc, FieldDefault::Components(components))
    }

    /// Declares a requirement that must hold for the node to be valid.
    #[must_use]
    pub fn requirement(
        mut self,
        key: impl Into<String>,
        doc: impl Into<String>,
        predicate: impl Fn(&Node) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.inner
            .requirements
            .push((key.into(), Requirement::new(doc, predicate)));
        self
    }

    /// Opts the component out of receiving propagated values.
    #[must_use]
    pub fn never_receives_values(mut self, never: bool) -> Self {
        self.inner.never_receives_values = never;
        self
    }

    /// Declares the component a subtype of `ancestor`.
    #[must_use]
    pub fn extends(mut self, ancestor: impl Into<String>) -> Self {
        self.inner.ancestors.push(ancestor.into());
        self
    }

    /// Attaches a factory producing instances of `T`.
    #[must_use]
    pub fn factory<T: Any>(mut self, factory: impl Fn(&Node) -> Result<T> + Send + Sync + 'static) -> Self {
        let erased: Factory = Arc::new(move |node: &Node| {
            factory(node).map(|instance| Box::new(instance) as Box<dyn Any>)
        });
        self.inner.factory = Some(erased);
        self
    }

    /// Finishes the descriptor.
    #[must_use]
    pub fn build(self) -> Descriptor {
        self.inner
    }
}

/// A component that can be configured through a [`Node`].
///
/// # Examples
///
/// ```
/// use qonfig::{Configurable, Descriptor, Node, Result};
///
/// struct Detector {
///     threshold: f64,
/// }
///
/// impl Configurable for Detector {
///     fn descriptor() -> Descriptor {
///         Descriptor::builder("demo.Detector")
///             .field("threshold", "trigger level", 0.5)
///             .build()
///     }
///
///     fn from_config(config: &Node) -> Result<Self> {
///         let threshold = config.get("threshold")?.as_f64().unwrap_or_default();
///         Ok(Self { threshold })
///     }
///
///     fn to_config(&self) -> Result<Node> {
///         let mut config = Node::new::<Self>()?;
///         config.set("threshold", self.threshold)?;
///         Ok(config)
///     }
/// }
///
/// let detector: Detector = Node::new::<Detector>()?.to_instance(false)?;
/// assert_eq!(detector.threshold, 0.5);
/// # Ok::<(), qonfig::Error>(())
/// ```
pub trait Configurable: Any + Sized {
    /// The schema of the component.
    fn descriptor() -> Descriptor;

    /// Creates an instance from a valid configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration can not be turned into an instance.
    fn from_config(config: &Node) -> Result<Self>;

    /// Captures the instance state as a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration can not be built.
    fn to_config(&self) -> Result<Node>;
}
