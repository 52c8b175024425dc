//! Service registries
//!
//! A [`Registry`] maps service names to definitions. Registries form a tree:
//! a child sees every entry of its ancestors and may shadow any of them
//! without the ancestors noticing.

use crate::definition::{Definition, ServiceDefinition};
use crate::service::{Injectable, instance};
use crate::storage::Layer;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::debug;

/// A named store of service definitions.
///
/// Cloning a `Registry` yields another handle to the same node.
///
/// # Examples
///
/// ```rust
/// use hierarchy_di::{Function, Registry};
///
/// let root = Registry::new();
/// root.value("message", String::from("Hello World"))
///     .bind("greeting", Function::new("message", |args| {
///         Ok(format!("{}!", args.arg_as::<String>(0)?))
///     }));
///
/// let child = root.create();
/// child.value("message", String::from("Hello Universe"));
///
/// assert!(child.has("greeting"));
/// assert!(!root.has("nothing"));
/// ```
#[derive(Clone)]
pub struct Registry {
    layer: Arc<Layer<Arc<ServiceDefinition>>>,
}

impl Registry {
    /// Create a new root registry.
    #[inline]
    pub fn new() -> Self {
        #[cfg(feature = "logging")]
        debug!(
            target: "hierarchy_di",
            depth = 0,
            "Creating new root registry"
        );

        Self {
            layer: Layer::root(),
        }
    }

    /// Create a child registry that inherits every entry of this one.
    pub fn create(&self) -> Self {
        #[cfg(feature = "logging")]
        debug!(
            target: "hierarchy_di",
            parent_depth = self.depth(),
            parent_services = self.len(),
            "Creating child registry"
        );

        Self {
            layer: self.layer.child(),
        }
    }

    // =========================================================================
    // Registration Methods
    // =========================================================================

    /// Register a singleton service.
    ///
    /// The instance is created on first resolution and cached in the
    /// responsible scope.
    pub fn bind(&self, name: &str, definition: impl Into<Definition>) -> &Self {
        self.store(name, ServiceDefinition::new(definition.into(), true))
    }

    /// Register a factory service, created anew on every resolution.
    ///
    /// A [`Record`](crate::Record) bound this way yields a distinct record
    /// per resolution. Each one carries its own injected fields and shares
    /// the bound record as its prototype, which is never modified.
    pub fn bind_factory(&self, name: &str, definition: impl Into<Definition>) -> &Self {
        self.store(name, ServiceDefinition::new(definition.into(), false))
    }

    /// Register a constant.
    pub fn value<T: Injectable>(&self, name: &str, value: T) -> &Self {
        self.store(name, ServiceDefinition::constant(instance(value)))
    }

    /// Register every `(name, definition)` pair as a singleton service.
    pub fn bind_all<I, S, D>(&self, services: I) -> &Self
    where
        I: IntoIterator<Item = (S, D)>,
        S: AsRef<str>,
        D: Into<Definition>,
    {
        for (name, definition) in services {
            self.bind(name.as_ref(), definition);
        }
        self
    }

    /// Register every `(name, definition)` pair as a factory service.
    pub fn bind_factory_all<I, S, D>(&self, services: I) -> &Self
    where
        I: IntoIterator<Item = (S, D)>,
        S: AsRef<str>,
        D: Into<Definition>,
    {
        for (name, definition) in services {
            self.bind_factory(name.as_ref(), definition);
        }
        self
    }

    fn store(&self, name: &str, definition: ServiceDefinition) -> &Self {
        #[cfg(feature = "logging")]
        let lifetime = if definition.is_singleton() {
            "singleton"
        } else {
            "factory"
        };
        #[cfg(feature = "logging")]
        debug!(
            target: "hierarchy_di",
            service = name,
            lifetime,
            dependencies = definition.dependencies().names().count(),
            depth = self.depth(),
            shadows = self.layer.parent().is_some_and(|parent| parent.contains(name)),
            "Registering service"
        );

        self.layer.insert(name, Arc::new(definition));
        self
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Check if a name is defined here or in any ancestor.
    #[inline]
    pub fn has(&self, name: &str) -> bool {
        self.layer.contains(name)
    }

    /// The definition visible for `name`, nearest registry first.
    #[inline]
    pub fn definition(&self, name: &str) -> Option<Arc<ServiceDefinition>> {
        self.layer.get(name)
    }

    /// Every visible name: own entries in registration order, then inherited ones.
    #[inline]
    pub fn names(&self) -> Vec<String> {
        self.layer.names()
    }

    /// The parent registry, if any
    pub fn parent(&self) -> Option<Registry> {
        self.layer.parent().map(|layer| Registry {
            layer: Arc::clone(layer),
        })
    }

    /// Check if `self` is a proper ancestor of `other`.
    #[inline]
    pub fn is_ancestor_of(&self, other: &Registry) -> bool {
        self.layer.is_ancestor_of(&other.layer)
    }

    /// Check if `other` is this registry or one of its descendants.
    #[inline]
    pub fn contains_registry(&self, other: &Registry) -> bool {
        self.ptr_eq(other) || self.is_ancestor_of(other)
    }

    /// Check if two handles point at the same registry node.
    #[inline]
    pub fn ptr_eq(&self, other: &Registry) -> bool {
        Arc::ptr_eq(&self.layer, &other.layer)
    }

    /// Distance from the root registry (0 = root)
    #[inline]
    pub fn depth(&self) -> u32 {
        self.layer.depth()
    }

    /// Number of entries defined in this registry's own layer
    #[inline]
    pub fn len(&self) -> usize {
        self.layer.len()
    }

    /// Check if this registry's own layer is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layer.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("service_count", &self.len())
            .field("depth", &self.depth())
            .finish()
    }
}
