//! Resolution engine
//!
//! A [`Provider`] turns service names into instances for one registry scope.
//! Providers form the same tree as their registries and share three pieces
//! of state along it:
//!
//! - **cache**: singleton results, one own layer per provider
//! - **resolving**: in-flight markers, read through the whole ancestor chain
//! - **responsibility memo**: which names this provider had to take over
//!
//! A name is produced and cached by its *responsible* provider: the nearest
//! provider (starting at the requester) whose registry redefines the name, or
//! redefines something the name depends on. The implicit services count as
//! redefined by every child provider. Everything else is shared with
//! ancestors.

use crate::definition::ServiceDefinition;
use crate::injector::{Injector, Scope};
use crate::registry::Registry;
use crate::resolver;
use crate::service::{Injectable, Instance, downcast, instance};
use crate::storage::Layer;
use crate::{DiError, Result, Service};
use ahash::RandomState;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::{Arc, Weak};

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Implicit service: a fresh child of the provider's registry on every read
pub const REGISTRY_SERVICE: &str = "$module";
/// Implicit service: the provider resolving the request
pub const PROVIDER_SERVICE: &str = "$provider";
/// Implicit service: a new injector over a fresh child scope on every read
pub const INJECTOR_SERVICE: &str = "$injector";

struct ProviderInner {
    registry: Registry,
    /// Singleton results owned by this provider
    cache: DashMap<String, Instance, RandomState>,
    /// Names being resolved here or in any ancestor
    resolving: Arc<Layer<bool>>,
    /// Memoized answers of the responsibility walk
    responsible_for: DashMap<String, bool, RandomState>,
    parent: Option<Provider>,
    scope: Scope,
    depth: u32,
}

/// Per-scope resolution context.
///
/// Cloning a `Provider` yields another handle to the same scope.
///
/// # Examples
///
/// ```rust
/// use hierarchy_di::{Function, Provider, Registry};
///
/// let registry = Registry::new();
/// registry
///     .value("message", String::from("Hello World"))
///     .bind("greeting", Function::new("message", |args| {
///         Ok(format!("{}!", args.arg_as::<String>(0)?))
///     }));
///
/// let provider = Provider::new(&registry);
/// assert_eq!(*provider.get_as::<String>("greeting").unwrap(), "Hello World!");
///
/// let child_registry = registry.create();
/// child_registry.value("message", String::from("Hello Universe"));
/// let child = provider.create(&child_registry).unwrap();
///
/// assert_eq!(*child.get_as::<String>("greeting").unwrap(), "Hello Universe!");
/// assert_eq!(*provider.get_as::<String>("greeting").unwrap(), "Hello World!");
/// ```
#[derive(Clone)]
pub struct Provider {
    inner: Arc<ProviderInner>,
}

/// Non-owning handle to a provider, held by lazy property slots.
#[derive(Clone)]
pub(crate) struct WeakProvider(Weak<ProviderInner>);

impl WeakProvider {
    #[inline]
    pub(crate) fn upgrade(&self) -> Option<Provider> {
        self.0.upgrade().map(|inner| Provider { inner })
    }
}

impl Provider {
    /// Create a root provider for `registry`.
    pub fn new(registry: &Registry) -> Self {
        let provider = Self::with_parent(registry.clone(), None);

        #[cfg(feature = "logging")]
        debug!(
            target: "hierarchy_di",
            scope = %provider.scope(),
            registry_depth = registry.depth(),
            "Creating root provider"
        );

        provider
    }

    /// Create a child provider for `registry`.
    ///
    /// The registry must be this provider's registry or one of its
    /// descendants; anything else fails with `InvalidHierarchy`.
    pub fn create(&self, registry: &Registry) -> Result<Provider> {
        if !self.inner.registry.contains_registry(registry) {
            #[cfg(feature = "logging")]
            debug!(
                target: "hierarchy_di",
                scope = %self.scope(),
                "Refusing to create a child provider for an unrelated registry"
            );
            return Err(DiError::InvalidHierarchy);
        }

        let child = Self::with_parent(registry.clone(), Some(self.clone()));

        #[cfg(feature = "logging")]
        debug!(
            target: "hierarchy_di",
            parent_scope = %self.scope(),
            scope = %child.scope(),
            depth = child.depth(),
            "Creating child provider"
        );

        Ok(child)
    }

    fn with_parent(registry: Registry, parent: Option<Provider>) -> Self {
        let resolving = parent
            .as_ref()
            .map_or_else(Layer::root, |p| p.inner.resolving.child());
        let depth = parent.as_ref().map_or(0, |p| p.inner.depth + 1);

        Self {
            inner: Arc::new(ProviderInner {
                registry,
                cache: DashMap::with_hasher(RandomState::new()),
                resolving,
                responsible_for: DashMap::with_hasher(RandomState::new()),
                parent,
                scope: Scope::new(),
                depth,
            }),
        }
    }

    /// The registry this provider resolves from
    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// The provider this one was created from
    #[inline]
    pub fn parent(&self) -> Option<&Provider> {
        self.inner.parent.as_ref()
    }

    /// Identifier of this provider's scope
    #[inline]
    pub fn scope(&self) -> Scope {
        self.inner.scope
    }

    /// Distance from the root provider (0 = root)
    #[inline]
    pub fn depth(&self) -> u32 {
        self.inner.depth
    }

    /// Check if two handles point at the same provider.
    #[inline]
    pub fn ptr_eq(&self, other: &Provider) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Check if `name` has a definition or is one of the implicit services.
    #[inline]
    pub fn has(&self, name: &str) -> bool {
        self.inner.registry.has(name) || is_implicit(name)
    }

    /// Check if this provider's own cache holds a value for `name`.
    #[inline]
    pub fn is_cached(&self, name: &str) -> bool {
        self.inner.cache.contains_key(name)
    }

    pub(crate) fn downgrade(&self) -> WeakProvider {
        WeakProvider(Arc::downgrade(&self.inner))
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolve a service by name.
    ///
    /// A name with a definition yields [`Service::Single`]. A name without
    /// one yields every service it is a path-segment prefix of or, failing
    /// that, a suffix of, as [`Service::Many`].
    ///
    /// # Errors
    ///
    /// - `CircularDependency` if `name` is already being resolved in this
    ///   scope or an ancestor
    /// - `UnknownService` if nothing matches `name`
    /// - whatever a factory along the way returns
    pub fn get(&self, name: &str) -> Result<Service> {
        if self.inner.resolving.get(name).unwrap_or(false) {
            #[cfg(feature = "logging")]
            debug!(
                target: "hierarchy_di",
                service = name,
                scope = %self.scope(),
                "Circular dependency detected"
            );
            return Err(DiError::circular(name));
        }

        if let Some(cached) = self.cached(name) {
            #[cfg(feature = "logging")]
            trace!(
                target: "hierarchy_di",
                service = name,
                scope = %self.scope(),
                location = "own_cache",
                "Service resolved from cache"
            );
            return Ok(Service::Single(cached));
        }

        let Some(definition) = self.inner.registry.definition(name) else {
            if let Some(service) = self.implicit(name)? {
                return Ok(service);
            }
            return self.get_matching(name);
        };

        let responsible = self.responsible_provider(name);
        if !responsible.ptr_eq(self) {
            if let Some(cached) = responsible.cached(name) {
                #[cfg(feature = "logging")]
                trace!(
                    target: "hierarchy_di",
                    service = name,
                    scope = %self.scope(),
                    responsible_scope = %responsible.scope(),
                    location = "ancestor_cache",
                    "Service adopted from responsible scope"
                );
                return Ok(Service::Single(cached));
            }
        }

        responsible.produce(self, name, &definition)
    }

    /// Resolve a service and downcast it to `T`.
    #[inline]
    pub fn get_as<T: Injectable>(&self, name: &str) -> Result<Arc<T>> {
        self.get(name)?.downcast(name)
    }

    /// Resolve a service as a list of instances.
    ///
    /// An exact definition yields a one-element list; a name nothing matches
    /// yields an empty one.
    pub fn get_all(&self, name: &str) -> Result<Vec<Instance>> {
        match self.get(name) {
            Ok(service) => Ok(service.instances()),
            Err(DiError::UnknownService { name: missing }) if missing == name => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    /// Resolve a service as a list and downcast every element to `T`.
    pub fn get_all_as<T: Injectable>(&self, name: &str) -> Result<Vec<Arc<T>>> {
        self.get_all(name)?
            .into_iter()
            .map(|instance| downcast(name, instance))
            .collect()
    }

    #[inline]
    fn cached(&self, name: &str) -> Option<Instance> {
        self.inner.cache.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Instantiate `definition` in this scope on behalf of `requester`.
    fn produce(
        &self,
        requester: &Provider,
        name: &str,
        definition: &ServiceDefinition,
    ) -> Result<Service> {
        #[cfg(feature = "logging")]
        debug!(
            target: "hierarchy_di",
            service = name,
            scope = %self.scope(),
            requester_scope = %requester.scope(),
            singleton = definition.is_singleton(),
            "Resolving service"
        );

        let resolved = {
            let _guard = ResolvingGuard::enter(&self.inner.resolving, name);
            resolver::instantiate(name, definition, self)?
        };

        if definition.is_singleton() {
            self.inner
                .cache
                .insert(name.to_owned(), Arc::clone(&resolved));
            if !self.ptr_eq(requester) {
                requester
                    .inner
                    .cache
                    .insert(name.to_owned(), Arc::clone(&resolved));
            }
        }

        Ok(Service::Single(resolved))
    }

    /// Serve one of the implicit services, if `name` is one.
    fn implicit(&self, name: &str) -> Result<Option<Service>> {
        let value = match name {
            REGISTRY_SERVICE => instance(self.inner.registry.create()),
            PROVIDER_SERVICE => instance(self.clone()),
            INJECTOR_SERVICE => instance(Injector::scoped(&self.inner.registry, self)?),
            _ => return Ok(None),
        };

        #[cfg(feature = "logging")]
        trace!(
            target: "hierarchy_di",
            service = name,
            scope = %self.scope(),
            "Serving implicit service"
        );

        Ok(Some(Service::Single(value)))
    }

    // =========================================================================
    // Wildcard lookup
    // =========================================================================

    fn get_matching(&self, name: &str) -> Result<Service> {
        let matches = self.wildcard_names(name);
        if matches.is_empty() {
            #[cfg(feature = "logging")]
            debug!(
                target: "hierarchy_di",
                service = name,
                scope = %self.scope(),
                "Service not found in registry chain"
            );
            return Err(DiError::unknown(name));
        }

        #[cfg(feature = "logging")]
        trace!(
            target: "hierarchy_di",
            service = name,
            matches = matches.len(),
            "Resolving wildcard matches"
        );

        let mut instances = Vec::with_capacity(matches.len());
        for matched in &matches {
            instances.extend(self.get(matched)?.instances());
        }
        Ok(Service::Many(instances))
    }

    /// Visible names `name` is a segment prefix of or, if there are none, a segment suffix of.
    fn wildcard_names(&self, name: &str) -> Vec<String> {
        let names = self.inner.registry.names();
        let prefixed: Vec<String> = names
            .iter()
            .filter(|candidate| is_segment_prefix(name, candidate))
            .cloned()
            .collect();
        if !prefixed.is_empty() {
            return prefixed;
        }
        names
            .into_iter()
            .filter(|candidate| is_segment_suffix(name, candidate))
            .collect()
    }

    // =========================================================================
    // Responsibility
    // =========================================================================

    /// Nearest provider, from `self` toward the root, that must produce `name`.
    fn responsible_provider(&self, name: &str) -> Provider {
        let mut provider = self.clone();
        let mut visiting = HashSet::with_hasher(RandomState::new());
        while let Some(parent) = provider.inner.parent.clone() {
            if provider.is_responsible_for(name, &parent, &mut visiting) {
                break;
            }
            provider = parent;
        }

        #[cfg(feature = "logging")]
        trace!(
            target: "hierarchy_di",
            service = name,
            scope = %self.scope(),
            responsible_scope = %provider.scope(),
            "Determined responsible scope"
        );

        provider
    }

    /// Whether this provider, compared with `parent`, redefines `name` or
    /// anything `name` depends on.
    ///
    /// `visiting` holds the names on the current path so dependency cycles
    /// terminate. A negative answer is only memoized for a top-level query,
    /// since inside a cycle it may depend on a name still being visited.
    fn is_responsible_for(
        &self,
        name: &str,
        parent: &Provider,
        visiting: &mut HashSet<String, RandomState>,
    ) -> bool {
        if let Some(known) = self.inner.responsible_for.get(name).map(|entry| *entry) {
            return known;
        }

        let own = self.inner.registry.definition(name);
        let inherited = parent.inner.registry.definition(name);
        let redefined = match (&own, &inherited) {
            (Some(own), Some(inherited)) => !Arc::ptr_eq(own, inherited),
            // Implicit services are bound per scope
            (None, None) => is_implicit(name),
            _ => true,
        };
        if redefined {
            self.inner.responsible_for.insert(name.to_owned(), true);
            return true;
        }

        if !visiting.insert(name.to_owned()) {
            return false;
        }

        let dependencies: Vec<String> = match &own {
            Some(definition) => definition
                .dependencies()
                .names()
                .map(str::to_owned)
                .collect(),
            None => self.wildcard_names(name),
        };
        let responsible = dependencies
            .iter()
            .any(|dependency| self.is_responsible_for(dependency, parent, visiting));

        visiting.remove(name);
        if responsible || visiting.is_empty() {
            self.inner
                .responsible_for
                .insert(name.to_owned(), responsible);
        }
        responsible
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("scope", &self.inner.scope)
            .field("depth", &self.inner.depth)
            .field("cached", &self.inner.cache.len())
            .field("registry", &self.inner.registry)
            .finish()
    }
}

/// Marks a name as in flight in one resolving layer until dropped.
struct ResolvingGuard<'a> {
    layer: &'a Layer<bool>,
    name: &'a str,
}

impl<'a> ResolvingGuard<'a> {
    fn enter(layer: &'a Layer<bool>, name: &'a str) -> Self {
        layer.insert(name, true);
        Self { layer, name }
    }
}

impl Drop for ResolvingGuard<'_> {
    fn drop(&mut self) {
        self.layer.remove_own(self.name);
    }
}

#[inline]
fn is_implicit(name: &str) -> bool {
    matches!(name, REGISTRY_SERVICE | PROVIDER_SERVICE | INJECTOR_SERVICE)
}

/// `"route"` and `"route/"` are segment prefixes of `"route/api"`; `"rou"` is not.
fn is_segment_prefix(prefix: &str, candidate: &str) -> bool {
    candidate.len() > prefix.len()
        && candidate.starts_with(prefix)
        && (prefix.ends_with('/') || candidate[prefix.len()..].starts_with('/'))
}

/// `"route"` and `"/route"` are segment suffixes of `"api/route"`; `"ute"` is not.
fn is_segment_suffix(suffix: &str, candidate: &str) -> bool {
    candidate.len() > suffix.len()
        && candidate.ends_with(suffix)
        && (suffix.starts_with('/') || candidate[..candidate.len() - suffix.len()].ends_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{Definition, Function};
    use crate::record::{Record, inject};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn greeting_registry() -> Registry {
        let registry = Registry::new();
        registry
            .value("message", String::from("Hello World"))
            .bind("greeting", Function::new("message", |args| {
                Ok(format!("{}!", args.arg_as::<String>(0)?))
            }));
        registry
    }

    #[test]
    fn test_segment_prefix() {
        assert!(is_segment_prefix("route", "route/api"));
        assert!(is_segment_prefix("route/", "route/api"));
        assert!(!is_segment_prefix("rou", "route/api"));
        assert!(!is_segment_prefix("route", "route"));
        assert!(!is_segment_prefix("route", "router/api"));
    }

    #[test]
    fn test_segment_suffix() {
        assert!(is_segment_suffix("route", "api/route"));
        assert!(is_segment_suffix("/route", "api/route"));
        assert!(!is_segment_suffix("ute", "api/route"));
        assert!(!is_segment_suffix("route", "route"));
        assert!(!is_segment_suffix("route", "api/reroute"));
    }

    #[test]
    fn test_singleton_identity() {
        let provider = Provider::new(&greeting_registry());
        let a = provider.get("greeting").unwrap();
        let b = provider.get("greeting").unwrap();
        assert!(a.ptr_eq(&b));
        assert!(provider.is_cached("greeting"));
    }

    #[test]
    fn test_factory_runs_every_time() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let registry = Registry::new();
        registry.bind_factory(
            "counter",
            Function::new("", move |_| Ok(counter.fetch_add(1, Ordering::SeqCst) + 1)),
        );

        let provider = Provider::new(&registry);
        assert_eq!(*provider.get_as::<usize>("counter").unwrap(), 1);
        assert_eq!(*provider.get_as::<usize>("counter").unwrap(), 2);
        assert!(!provider.is_cached("counter"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_child_adopts_unshadowed_parent_value() {
        let registry = greeting_registry();
        let root = Provider::new(&registry);
        let from_root = root.get("greeting").unwrap();

        let child = root.create(&registry.create()).unwrap();
        let from_child = child.get("greeting").unwrap();
        assert!(from_root.ptr_eq(&from_child));
    }

    #[test]
    fn test_child_reresolves_dependents_of_shadowed_name() {
        let registry = greeting_registry();
        let root = Provider::new(&registry);
        assert_eq!(*root.get_as::<String>("greeting").unwrap(), "Hello World!");

        let child_registry = registry.create();
        child_registry.value("message", String::from("Hello Universe"));
        let child = root.create(&child_registry).unwrap();

        assert_eq!(*child.get_as::<String>("greeting").unwrap(), "Hello Universe!");
        assert_eq!(*root.get_as::<String>("greeting").unwrap(), "Hello World!");
        assert!(child.is_cached("greeting"));
    }

    #[test]
    fn test_transitive_dependents_are_reresolved() {
        let registry = greeting_registry();
        registry.bind("shout", Function::new("greeting", |args| {
            Ok(args.arg_as::<String>(0)?.to_uppercase())
        }));
        let root = Provider::new(&registry);
        assert_eq!(*root.get_as::<String>("shout").unwrap(), "HELLO WORLD!");

        let child_registry = registry.create();
        child_registry.value("message", String::from("Hello Universe"));
        let child = root.create(&child_registry).unwrap();
        assert_eq!(*child.get_as::<String>("shout").unwrap(), "HELLO UNIVERSE!");
    }

    #[test]
    fn test_grandchild_defers_to_nearest_responsible_scope() {
        let registry = greeting_registry();
        let root = Provider::new(&registry);

        let child_registry = registry.create();
        child_registry.value("message", String::from("Hello Universe"));
        let child = root.create(&child_registry).unwrap();

        let grandchild = child.create(&child_registry.create()).unwrap();
        let from_grandchild = grandchild.get("greeting").unwrap();
        let from_child = child.get("greeting").unwrap();

        assert!(from_child.ptr_eq(&from_grandchild));
        assert!(!root.is_cached("greeting"));
    }

    #[test]
    fn test_new_child_name_invisible_to_parent() {
        let registry = Registry::new();
        let root = Provider::new(&registry);
        let child_registry = registry.create();
        child_registry.value("extra", 1u8);
        let child = root.create(&child_registry).unwrap();

        assert_eq!(*child.get_as::<u8>("extra").unwrap(), 1);
        assert_eq!(root.get("extra").unwrap_err(), DiError::unknown("extra"));
    }

    #[test]
    fn test_create_rejects_unrelated_registry() {
        let registry = Registry::new();
        let provider = Provider::new(&registry);

        assert_eq!(
            provider.create(&Registry::new()).unwrap_err(),
            DiError::InvalidHierarchy
        );
        assert!(provider.create(&registry).is_ok());

        let child = provider.create(&registry.create()).unwrap();
        assert_eq!(
            child.create(&registry).unwrap_err(),
            DiError::InvalidHierarchy
        );
    }

    #[test]
    fn test_self_dependency_is_circular() {
        let registry = Registry::new();
        registry.bind("a", Definition::array(["a"], |_| Ok(())));
        let provider = Provider::new(&registry);

        assert_eq!(provider.get("a").unwrap_err(), DiError::circular("a"));
        // the marker is cleared after the failure
        assert_eq!(provider.get("a").unwrap_err(), DiError::circular("a"));
    }

    #[test]
    fn test_failed_resolution_caches_nothing() {
        let registry = Registry::new();
        registry.bind("needs_late", Function::new("late", |args| args.arg_as::<u8>(0).map(|n| *n)));
        let provider = Provider::new(&registry);

        assert!(provider.get("needs_late").is_err());
        assert!(!provider.is_cached("needs_late"));

        registry.value("late", 7u8);
        assert_eq!(*provider.get_as::<u8>("needs_late").unwrap(), 7);
    }

    #[test]
    fn test_wildcard_prefix_then_suffix() {
        let registry = Registry::new();
        registry.value("route/api", 1u8).value("route/auth", 2u8);
        let provider = Provider::new(&registry);
        let routes = provider.get_all_as::<u8>("route").unwrap();
        assert_eq!(routes.iter().map(|n| **n).collect::<Vec<_>>(), vec![1, 2]);

        let registry = Registry::new();
        registry.value("api/route", 3u8).value("auth/route", 4u8);
        let provider = Provider::new(&registry);
        let service = provider.get("route").unwrap();
        assert!(service.is_many());
        let routes = service.downcast_all::<u8>("route").unwrap();
        assert_eq!(routes.iter().map(|n| **n).collect::<Vec<_>>(), vec![3, 4]);

        assert!(provider.get_all("nothing").unwrap().is_empty());
        assert_eq!(provider.get_all("api/route").unwrap().len(), 1);
    }

    #[test]
    fn test_implicit_services() {
        let registry = Registry::new();
        let provider = Provider::new(&registry);
        assert!(provider.has(PROVIDER_SERVICE));

        let itself = provider.get_as::<Provider>(PROVIDER_SERVICE).unwrap();
        assert!(itself.ptr_eq(&provider));

        let first = provider.get_as::<Registry>(REGISTRY_SERVICE).unwrap();
        let second = provider.get_as::<Registry>(REGISTRY_SERVICE).unwrap();
        assert!(registry.is_ancestor_of(&first));
        assert!(!first.ptr_eq(&second));

        let injector = provider.get_as::<Injector>(INJECTOR_SERVICE).unwrap();
        assert!(injector.provider().parent().unwrap().ptr_eq(&provider));
    }

    #[test]
    fn test_implicit_dependency_resolves_in_requesting_scope() {
        let registry = Registry::new();
        registry
            .value("message", String::from("World"))
            .bind("reporter", Function::new("$provider", |args| {
                let provider = args.arg_as::<Provider>(0)?;
                Ok((*provider.get_as::<String>("message")?).clone())
            }));
        let root = Provider::new(&registry);
        assert_eq!(*root.get_as::<String>("reporter").unwrap(), "World");

        let child_registry = registry.create();
        child_registry.value("message", String::from("Universe"));
        let child = root.create(&child_registry).unwrap();

        assert_eq!(*child.get_as::<String>("reporter").unwrap(), "Universe");
        assert_eq!(*root.get_as::<String>("reporter").unwrap(), "World");
        assert!(child.is_cached("reporter"));
    }

    #[test]
    fn test_property_dependency_forces_responsibility() {
        let registry = Registry::new();
        registry
            .value("message", String::from("World"))
            .bind("post", Record::new().with_marker("body", inject("message")));
        let root = Provider::new(&registry);
        let from_root = root.get_as::<Record>("post").unwrap();
        assert_eq!(*from_root.get::<String>("body").unwrap(), "World");

        let child_registry = registry.create();
        child_registry.value("message", String::from("Universe"));
        let child = root.create(&child_registry).unwrap();

        let from_child = child.get_as::<Record>("post").unwrap();
        assert_eq!(*from_child.get::<String>("body").unwrap(), "Universe");
        assert!(!Arc::ptr_eq(&from_root, &from_child));
        assert_eq!(
            *root.get_as::<Record>("post").unwrap().get::<String>("body").unwrap(),
            "World"
        );
    }

    #[test]
    fn test_child_wildcard_reads_inherited_entries() {
        let registry = Registry::new();
        registry
            .value("route/api", 1u8)
            .value("route/auth", 2u8)
            .value("api/handler", 5u8);
        let root = Provider::new(&registry);
        let child_registry = registry.create();
        child_registry.value("route/admin", 3u8);
        let child = root.create(&child_registry).unwrap();

        let routes = child.get_all_as::<u8>("route").unwrap();
        assert_eq!(routes.iter().map(|n| **n).collect::<Vec<_>>(), vec![3, 1, 2]);
        assert_eq!(root.get_all_as::<u8>("route").unwrap().len(), 2);

        let handlers = child.get_all_as::<u8>("handler").unwrap();
        assert_eq!(handlers.iter().map(|n| **n).collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn test_dependency_cycle_in_responsibility_walk_terminates() {
        let registry = Registry::new();
        registry
            .bind("a", Definition::array(["b"], |_| Ok(1u8)))
            .bind("b", Definition::array(["a"], |_| Ok(2u8)));
        let root = Provider::new(&registry);
        let child = root.create(&registry.create()).unwrap();

        assert_eq!(child.get("a").unwrap_err(), DiError::circular("a"));
    }
}
