//! Resolved service values
//!
//! Services are stored type-erased and downcast at the point of use.

use crate::{DiError, Result};
use std::any::Any;
use std::sync::Arc;

/// Marker trait for types that can be registered and injected.
///
/// This is automatically implemented for all types that are `Send + Sync + 'static`.
/// You never need to implement this manually.
///
/// # Examples
///
/// ```rust
/// use hierarchy_di::Registry;
///
/// struct MyService {
///     name: String,
/// }
///
/// // No impl needed - it just works!
/// let registry = Registry::new();
/// registry.value("my_service", MyService { name: "test".into() });
/// ```
pub trait Injectable: Send + Sync + 'static {
    /// Returns the type name for debugging
    #[inline]
    fn type_name_of() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }
}

// Blanket implementation - everything that's Send + Sync + 'static is Injectable
impl<T: Send + Sync + 'static> Injectable for T {}

/// A resolved, type-erased service instance.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Erase a value into an [`Instance`].
#[inline]
pub fn instance<T: Injectable>(value: T) -> Instance {
    Arc::new(value)
}

/// Downcast an instance resolved under `name` to a concrete type.
#[inline]
pub fn downcast<T: Injectable>(name: &str, instance: Instance) -> Result<Arc<T>> {
    instance
        .downcast::<T>()
        .map_err(|_| DiError::type_mismatch::<T>(name))
}

/// The result of looking a name up in a provider.
///
/// A name with its own definition resolves to a single instance. A name that
/// only matches other names by path segment (`"route"` for `"route/api"`)
/// resolves to every match, in registration order.
#[derive(Clone)]
pub enum Service {
    /// Exact definition
    Single(Instance),
    /// Wildcard match
    Many(Vec<Instance>),
}

impl Service {
    /// The single instance, or `None` for a wildcard result.
    #[inline]
    pub fn single(&self) -> Option<&Instance> {
        match self {
            Service::Single(instance) => Some(instance),
            Service::Many(_) => None,
        }
    }

    /// All instances; a single instance yields a one-element list.
    pub fn instances(&self) -> Vec<Instance> {
        match self {
            Service::Single(instance) => vec![Arc::clone(instance)],
            Service::Many(all) => all.clone(),
        }
    }

    /// Check if this is a wildcard result
    #[inline]
    pub fn is_many(&self) -> bool {
        matches!(self, Service::Many(_))
    }

    /// Downcast the single instance to `T`.
    ///
    /// Fails with `TypeMismatch` for a wildcard result or a different type.
    pub fn downcast<T: Injectable>(&self, name: &str) -> Result<Arc<T>> {
        match self {
            Service::Single(instance) => downcast(name, Arc::clone(instance)),
            Service::Many(_) => Err(DiError::type_mismatch::<T>(name)),
        }
    }

    /// Downcast every instance to `T`.
    pub fn downcast_all<T: Injectable>(&self, name: &str) -> Result<Vec<Arc<T>>> {
        self.instances()
            .into_iter()
            .map(|instance| downcast(name, instance))
            .collect()
    }

    /// Identity comparison of two results.
    pub fn ptr_eq(&self, other: &Service) -> bool {
        match (self, other) {
            (Service::Single(a), Service::Single(b)) => Arc::ptr_eq(a, b),
            (Service::Many(a), Service::Many(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Arc::ptr_eq(x, y))
            }
            _ => false,
        }
    }
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Service::Single(_) => f.write_str("Service::Single(..)"),
            Service::Many(all) => write!(f, "Service::Many({} instances)", all.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast_single() {
        let service = Service::Single(instance(String::from("Hello World")));
        let message = service.downcast::<String>("message").unwrap();
        assert_eq!(*message, "Hello World");
    }

    #[test]
    fn test_downcast_wrong_type() {
        let service = Service::Single(instance(42u32));
        let err = service.downcast::<String>("answer").unwrap_err();
        assert!(matches!(err, DiError::TypeMismatch { .. }));
    }

    #[test]
    fn test_many_only_downcasts_as_list() {
        let service = Service::Many(vec![instance(1u8), instance(2u8)]);
        assert!(service.is_many());
        assert!(service.single().is_none());
        assert!(service.downcast::<u8>("numbers").is_err());

        let all = service.downcast_all::<u8>("numbers").unwrap();
        assert_eq!(all.iter().map(|n| **n).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_ptr_eq_is_identity() {
        let shared = instance(7i32);
        let a = Service::Single(Arc::clone(&shared));
        let b = Service::Single(shared);
        let c = Service::Single(instance(7i32));

        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }
}
