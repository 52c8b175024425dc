//! Ad-hoc injection and scope identifiers
//!
//! An [`Injector`] runs one-off definitions against a provider without
//! registering them, and hands out fresh nested scopes on demand.

use crate::definition::{Definition, ServiceDefinition};
use crate::provider::Provider;
use crate::registry::Registry;
use crate::resolver;
use crate::service::{Injectable, Instance, downcast};
use crate::{Result, Service};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "logging")]
use tracing::debug;

/// Name reported for definitions run through [`Injector::resolve`]
const ANONYMOUS: &str = "<anonymous>";

/// Unique scope identifier.
///
/// Each provider gets a unique ID for tracking and debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scope(u64);

impl Scope {
    /// Generate a new unique scope ID.
    #[inline]
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    #[inline]
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "scope-{}", self.0)
    }
}

/// Entry point for running code with injected dependencies.
///
/// Every injector owns a private child registry, so services bound through
/// [`Injector::registry`] stay invisible to the registry it was created from
/// and to sibling injectors.
///
/// # Examples
///
/// ```rust
/// use hierarchy_di::{Function, Injector, Registry};
///
/// let registry = Registry::new();
/// registry.value("message", String::from("Hello World"));
///
/// let injector = Injector::new(&registry);
/// let length = injector
///     .resolve_as::<usize>(Function::new("message", |args| {
///         Ok(args.arg_as::<String>(0)?.len())
///     }))
///     .unwrap();
/// assert_eq!(*length, 11);
/// ```
#[derive(Clone)]
pub struct Injector {
    provider: Provider,
}

impl Injector {
    /// Create an injector with a root provider over a fresh child of `registry`.
    pub fn new(registry: &Registry) -> Self {
        let provider = Provider::new(&registry.create());

        #[cfg(feature = "logging")]
        debug!(
            target: "hierarchy_di",
            scope = %provider.scope(),
            "Creating root injector"
        );

        Self { provider }
    }

    /// Create an injector over a fresh child of `registry`, layered on `parent`.
    ///
    /// Fails with `InvalidHierarchy` if `registry` does not descend from the
    /// parent provider's registry.
    pub fn scoped(registry: &Registry, parent: &Provider) -> Result<Self> {
        let provider = parent.create(&registry.create())?;

        #[cfg(feature = "logging")]
        debug!(
            target: "hierarchy_di",
            parent_scope = %parent.scope(),
            scope = %provider.scope(),
            depth = provider.depth(),
            "Creating scoped injector"
        );

        Ok(Self { provider })
    }

    /// Instantiate a definition against this injector's scope.
    ///
    /// Nothing is registered or cached under any name; every call runs the
    /// definition again.
    pub fn resolve(&self, definition: impl Into<Definition>) -> Result<Instance> {
        let definition = ServiceDefinition::new(definition.into(), true);
        resolver::instantiate(ANONYMOUS, &definition, &self.provider)
    }

    /// Instantiate a definition and downcast the result to `T`.
    #[inline]
    pub fn resolve_as<T: Injectable>(&self, definition: impl Into<Definition>) -> Result<Arc<T>> {
        downcast(ANONYMOUS, self.resolve(definition)?)
    }

    /// Resolve a registered service through this injector's provider.
    #[inline]
    pub fn get(&self, name: &str) -> Result<Service> {
        self.provider.get(name)
    }

    /// Resolve a registered service and downcast it to `T`.
    #[inline]
    pub fn get_as<T: Injectable>(&self, name: &str) -> Result<Arc<T>> {
        self.provider.get_as(name)
    }

    /// Create a nested injector over a fresh child scope of this one.
    #[inline]
    pub fn child(&self) -> Result<Injector> {
        Self::scoped(self.provider.registry(), &self.provider)
    }

    /// The provider backing this injector
    #[inline]
    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    /// The injector's private registry
    #[inline]
    pub fn registry(&self) -> &Registry {
        self.provider.registry()
    }

    /// Identifier of this injector's scope
    #[inline]
    pub fn scope(&self) -> Scope {
        self.provider.scope()
    }
}

impl std::fmt::Debug for Injector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injector")
            .field("provider", &self.provider)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Function;
    use crate::provider::{INJECTOR_SERVICE, PROVIDER_SERVICE, REGISTRY_SERVICE};

    #[test]
    fn test_scope_unique() {
        let s1 = Scope::new();
        let s2 = Scope::new();
        assert_ne!(s1, s2);
        assert_ne!(s1.id(), s2.id());
        assert!(s2.to_string().starts_with("scope-"));
    }

    #[test]
    fn test_resolve_is_not_registered() {
        let registry = Registry::new();
        registry.value("message", String::from("Hello World"));
        let injector = Injector::new(&registry);

        let greeting = injector
            .resolve_as::<String>(Function::new("message", |args| {
                Ok(format!("{}!", args.arg_as::<String>(0)?))
            }))
            .unwrap();
        assert_eq!(*greeting, "Hello World!");
        assert!(!injector.registry().has(ANONYMOUS));
        assert!(!injector.provider().is_cached(ANONYMOUS));
    }

    #[test]
    fn test_private_registry_isolated_from_parent() {
        let registry = Registry::new();
        let injector = Injector::new(&registry);
        injector.registry().value("local", 1u8);

        assert!(registry.is_ancestor_of(injector.registry()));
        assert!(!registry.has("local"));
        assert_eq!(*injector.get_as::<u8>("local").unwrap(), 1);
    }

    #[test]
    fn test_implicit_services_through_resolve() {
        let registry = Registry::new();
        let injector = Injector::new(&registry);

        let nested = injector
            .resolve(Function::erased(INJECTOR_SERVICE, |args| args.instance(0)))
            .unwrap();
        let nested = downcast::<Injector>(INJECTOR_SERVICE, nested).unwrap();
        assert!(nested.provider().parent().unwrap().ptr_eq(injector.provider()));

        let provider = injector
            .resolve(Function::erased(PROVIDER_SERVICE, |args| args.instance(0)))
            .unwrap();
        assert!(downcast::<Provider>(PROVIDER_SERVICE, provider)
            .unwrap()
            .ptr_eq(injector.provider()));

        let module = injector
            .resolve(Function::erased(REGISTRY_SERVICE, |args| args.instance(0)))
            .unwrap();
        let module = downcast::<Registry>(REGISTRY_SERVICE, module).unwrap();
        assert!(injector.registry().is_ancestor_of(&module));
    }

    #[test]
    fn test_sibling_injectors_do_not_share_overrides() {
        let registry = Registry::new();
        registry.value("message", String::from("Hello World"));
        let root = Injector::new(&registry);

        let first = root.child().unwrap();
        let second = root.child().unwrap();
        first.registry().value("message", String::from("Hello Universe"));

        assert_eq!(*first.get_as::<String>("message").unwrap(), "Hello Universe");
        assert_eq!(*second.get_as::<String>("message").unwrap(), "Hello World");
        assert_eq!(*root.get_as::<String>("message").unwrap(), "Hello World");
    }
}
