//! Error types for dependency injection

use thiserror::Error;

/// Errors that can occur while registering or resolving named services
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiError {
    /// A service was requested while its own resolution was still in flight
    #[error(
        "Circular dependency detected. Trying to resolve {name} when it is already being resolved"
    )]
    CircularDependency { name: String },

    /// No definition and no wildcard match exists for the name
    #[error("Trying to resolve an unknown service: {name}")]
    UnknownService { name: String },

    /// A child provider was requested for a registry outside this provider's subtree
    #[error(
        "Cannot create a child provider for a registry that does not descend from the provider's registry"
    )]
    InvalidHierarchy,

    /// A resolved instance is not of the requested type
    #[error("Service {name} is not of type {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
    },

    /// A factory asked for a positional argument it never declared
    #[error("Service {service} has no injected argument at position {index}")]
    ArgumentMissing { service: String, index: usize },

    /// A record has no readable field with this name
    #[error("Record has no resolved field named {field}")]
    FieldMissing { field: String },

    /// Factory failed to create service
    #[error("Failed to create service {name}: {reason}")]
    CreationFailed { name: String, reason: String },

    /// The scope a lazy property was bound to has been dropped
    #[error("Scope has been dropped before a lazy property was read")]
    ScopeDropped,
}

impl DiError {
    /// Create an UnknownService error
    #[inline]
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownService { name: name.into() }
    }

    /// Create a CircularDependency error
    #[inline]
    pub fn circular(name: impl Into<String>) -> Self {
        Self::CircularDependency { name: name.into() }
    }

    /// Create a TypeMismatch error for the expected type `T`
    #[inline]
    pub fn type_mismatch<T: 'static>(name: impl Into<String>) -> Self {
        Self::TypeMismatch {
            name: name.into(),
            expected: std::any::type_name::<T>(),
        }
    }

    /// Create a CreationFailed error
    #[inline]
    pub fn creation_failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CreationFailed {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Name of the service the error is about, if any
    pub fn service_name(&self) -> Option<&str> {
        match self {
            Self::CircularDependency { name }
            | Self::UnknownService { name }
            | Self::TypeMismatch { name, .. }
            | Self::CreationFailed { name, .. } => Some(name),
            Self::ArgumentMissing { service, .. } => Some(service),
            Self::InvalidHierarchy | Self::FieldMissing { .. } | Self::ScopeDropped => None,
        }
    }
}

/// Result type alias for DI operations
pub type Result<T> = std::result::Result<T, DiError>;
