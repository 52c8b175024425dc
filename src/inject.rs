//! Injected property slots
//!
//! A property injection is either resolved while the instance is built
//! (`Eager`) or on its first read (`Lazy`). A lazy slot resolves through a
//! weak handle to its scope and memoizes the result, so later reads are a
//! plain cell lookup and two services may lazily reference each other.

use crate::provider::{Provider, WeakProvider};
use crate::service::Injectable;
use crate::{DiError, Result, Service};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "logging")]
use tracing::trace;

enum Slot {
    Eager(Service),
    Lazy(LazySlot),
}

struct LazySlot {
    scope: WeakProvider,
    cell: OnceCell<Service>,
    initializing: AtomicBool,
}

/// A property value supplied by the container.
///
/// Cloning is cheap and clones share the same memo cell.
#[derive(Clone)]
pub struct Injected {
    service: Arc<str>,
    slot: Arc<Slot>,
}

impl Injected {
    /// A slot holding an already resolved service
    pub(crate) fn eager(service_name: &str, service: Service) -> Self {
        Self {
            service: Arc::from(service_name),
            slot: Arc::new(Slot::Eager(service)),
        }
    }

    /// A slot that resolves `service_name` against `scope` on first read
    pub(crate) fn lazy(service_name: &str, scope: &Provider) -> Self {
        Self {
            service: Arc::from(service_name),
            slot: Arc::new(Slot::Lazy(LazySlot {
                scope: scope.downgrade(),
                cell: OnceCell::new(),
                initializing: AtomicBool::new(false),
            })),
        }
    }

    /// Name of the injected service
    #[inline]
    pub fn service_name(&self) -> &str {
        &self.service
    }

    /// Check if this slot was declared lazy
    #[inline]
    pub fn is_lazy(&self) -> bool {
        matches!(*self.slot, Slot::Lazy(_))
    }

    /// Check if the value is available without resolving anything
    pub fn is_resolved(&self) -> bool {
        match &*self.slot {
            Slot::Eager(_) => true,
            Slot::Lazy(lazy) => lazy.cell.get().is_some(),
        }
    }

    /// Read the injected service, resolving it on the first read of a lazy slot.
    pub fn get(&self) -> Result<Service> {
        match &*self.slot {
            Slot::Eager(service) => Ok(service.clone()),
            Slot::Lazy(lazy) => lazy.get(&self.service),
        }
    }

    /// Read and downcast the injected service
    #[inline]
    pub fn get_as<T: Injectable>(&self) -> Result<Arc<T>> {
        self.get()?.downcast(&self.service)
    }

    /// Read and downcast every instance of a wildcard injection
    #[inline]
    pub fn get_all_as<T: Injectable>(&self) -> Result<Vec<Arc<T>>> {
        self.get()?.downcast_all(&self.service)
    }
}

impl LazySlot {
    fn get(&self, service_name: &str) -> Result<Service> {
        if let Some(service) = self.cell.get() {
            return Ok(service.clone());
        }

        // A read of this very slot while it is being resolved is a cycle.
        if self.initializing.swap(true, Ordering::AcqRel) {
            return Err(DiError::circular(service_name));
        }

        #[cfg(feature = "logging")]
        trace!(
            target: "hierarchy_di",
            service = service_name,
            "Resolving lazily injected property on first read"
        );

        let resolved = self
            .scope
            .upgrade()
            .ok_or(DiError::ScopeDropped)
            .and_then(|provider| provider.get(service_name));
        self.initializing.store(false, Ordering::Release);

        let service = resolved?;
        Ok(self.cell.get_or_init(|| service).clone())
    }
}

impl std::fmt::Debug for Injected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injected")
            .field("service", &self.service)
            .field("lazy", &self.is_lazy())
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Registry;
    use crate::service::instance;

    #[test]
    fn test_eager_slot_is_resolved() {
        let injected = Injected::eager("answer", Service::Single(instance(42u32)));
        assert!(!injected.is_lazy());
        assert!(injected.is_resolved());
        assert_eq!(*injected.get_as::<u32>().unwrap(), 42);
    }

    #[test]
    fn test_lazy_slot_resolves_once() {
        let registry = Registry::new();
        registry.value("message", String::from("Hello World"));
        let provider = Provider::new(&registry);

        let injected = Injected::lazy("message", &provider);
        assert!(injected.is_lazy());
        assert!(!injected.is_resolved());

        let first = injected.get().unwrap();
        assert!(injected.is_resolved());
        let second = injected.clone().get().unwrap();
        assert!(first.ptr_eq(&second));
        assert_eq!(*injected.get_as::<String>().unwrap(), "Hello World");
    }

    #[test]
    fn test_lazy_slot_outliving_scope() {
        let registry = Registry::new();
        registry.value("message", String::from("Hello World"));
        let injected = {
            let provider = Provider::new(&registry);
            Injected::lazy("message", &provider)
        };

        assert_eq!(injected.get().unwrap_err(), DiError::ScopeDropped);
    }

    #[test]
    fn test_lazy_slot_failure_is_retried() {
        let registry = Registry::new();
        let provider = Provider::new(&registry);
        let injected = Injected::lazy("late", &provider);

        assert!(matches!(
            injected.get(),
            Err(DiError::UnknownService { .. })
        ));

        registry.value("late", 1u8);
        assert_eq!(*injected.get_as::<u8>().unwrap(), 1);
    }
}
