//! # Hierarchy DI - Named, Scope-Aware Dependency Injection for Rust
//!
//! A dependency injection core built around a tree of registries. Services
//! are registered by name, resolved on demand and cached in the scope that
//! is actually responsible for them.
//!
//! ## Features
//!
//! - 🌳 **Hierarchical scopes** - Child registries inherit and shadow parent entries
//! - 🎯 **Scope-aware caching** - Overriding a dependency re-resolves everything built on it
//! - 🔁 **Cycle detection** - Circular dependencies fail immediately, never hang
//! - 💉 **Call and property injection** - Positional arguments, eager or lazy fields
//! - 🔎 **Wildcard lookup** - `"route"` resolves every `"route/..."` service
//! - 📊 **Observable** - Optional tracing integration with JSON or pretty output
//!
//! ## Quick Start
//!
//! ```rust
//! use hierarchy_di::{Function, Provider, Registry};
//!
//! let registry = Registry::new();
//! registry
//!     .value("message", String::from("Hello World"))
//!     .bind("greeting", Function::new("message", |args| {
//!         Ok(format!("{}!", args.arg_as::<String>(0)?))
//!     }));
//!
//! let provider = Provider::new(&registry);
//! let greeting = provider.get_as::<String>("greeting").unwrap();
//! assert_eq!(*greeting, "Hello World!");
//! ```
//!
//! ## Service Lifetimes
//!
//! ```rust
//! use hierarchy_di::{Function, Provider, Registry};
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! static COUNTER: AtomicU64 = AtomicU64::new(0);
//!
//! let registry = Registry::new();
//!
//! // Singleton - one instance per responsible scope
//! registry.bind("config", Function::new("", |_| Ok(String::from("debug"))));
//!
//! // Factory - new instance every time
//! registry.bind_factory("request_id", Function::new("", |_| {
//!     Ok(COUNTER.fetch_add(1, Ordering::SeqCst))
//! }));
//!
//! let provider = Provider::new(&registry);
//! let first = provider.get_as::<u64>("request_id").unwrap();
//! let second = provider.get_as::<u64>("request_id").unwrap();
//! assert_ne!(*first, *second);
//! ```
//!
//! ## Scopes
//!
//! ```rust
//! use hierarchy_di::{Provider, Registry};
//!
//! let root = Registry::new();
//! root.value("app", String::from("MyApp"));
//! let provider = Provider::new(&root);
//!
//! // Per-request scope - inherits from root
//! let request = root.create();
//! request.value("request_id", String::from("req-123"));
//! let request_provider = provider.create(&request).unwrap();
//!
//! assert!(request_provider.get("app").is_ok());
//! assert!(request_provider.get("request_id").is_ok());
//!
//! // Root cannot access request-scoped services
//! assert!(provider.get("request_id").is_err());
//! ```

mod definition;
mod error;
mod inject;
mod injector;
#[cfg(feature = "logging")]
pub mod logging;
mod provider;
mod record;
mod registry;
mod resolver;
mod service;
mod storage;

pub use definition::{
    Definition, Dependencies, FactoryFn, Function, PropertyInjection, ServiceDefinition,
    parse_parameter_list,
};
pub use error::*;
pub use inject::Injected;
pub use injector::{Injector, Scope};
pub use provider::{INJECTOR_SERVICE, PROVIDER_SERVICE, Provider, REGISTRY_SERVICE};
pub use record::{Field, InjectMarker, Record, inject, inject_lazy};
pub use registry::Registry;
pub use resolver::Injection;
pub use service::{Injectable, Instance, Service, downcast, instance};

// Re-export tracing macros for convenience when logging feature is enabled
#[cfg(feature = "logging")]
pub use tracing::{debug, error, info, trace, warn};

// Re-export for convenience
pub use std::sync::Arc;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Definition, DiError, Function, Injected, Injection, Injector, Provider, Record, Registry,
        Result, Service, inject, inject_lazy,
    };
    pub use std::sync::Arc;
}
