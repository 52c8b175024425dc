//! Records and injection markers
//!
//! A [`Record`] is a dynamic bag of named fields with an optional prototype
//! record it inherits from. Fields holding an [`InjectMarker`] declare a
//! property injection; resolving a record service yields a new record whose
//! prototype is the template and whose own fields are the injected values.

use crate::definition::PropertyInjection;
use crate::inject::Injected;
use crate::service::{Injectable, Instance, downcast, instance};
use crate::{DiError, Result, Service};
use std::collections::HashSet;
use std::sync::Arc;

/// Marks a field as "to be injected".
///
/// The service name defaults to the name of the field the marker is placed on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectMarker {
    service: Option<String>,
    lazy: bool,
}

impl InjectMarker {
    /// Inject the service named like the field itself
    #[inline]
    pub fn own_name() -> Self {
        Self::default()
    }

    /// Inject the named service
    #[inline]
    pub fn named(service: impl Into<String>) -> Self {
        Self {
            service: Some(service.into()),
            lazy: false,
        }
    }

    /// Resolve on first read instead of at construction
    #[inline]
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    /// Explicit service name, if any
    #[inline]
    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    /// Check if the marker is lazy
    #[inline]
    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    /// Turn the marker into a property injection for `property`.
    pub fn for_property(&self, property: &str) -> PropertyInjection {
        PropertyInjection {
            property: property.to_owned(),
            service: self.service.clone().unwrap_or_else(|| property.to_owned()),
            lazy: self.lazy,
        }
    }
}

/// Marker for an eagerly injected service.
#[inline]
pub fn inject(service: impl Into<String>) -> InjectMarker {
    InjectMarker::named(service)
}

/// Marker for a lazily injected service.
#[inline]
pub fn inject_lazy(service: impl Into<String>) -> InjectMarker {
    InjectMarker::named(service).lazy()
}

/// A record field
#[derive(Clone)]
pub enum Field {
    /// A plain value
    Value(Instance),
    /// A pending injection (only meaningful on templates)
    Marker(InjectMarker),
    /// An injected service, possibly not yet resolved
    Injected(Injected),
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Value(_) => f.write_str("Value(..)"),
            Field::Marker(marker) => f.debug_tuple("Marker").field(marker).finish(),
            Field::Injected(injected) => f.debug_tuple("Injected").field(injected).finish(),
        }
    }
}

/// A dynamic record with prototype inheritance.
///
/// # Examples
///
/// ```rust
/// use hierarchy_di::{Provider, Record, Registry, inject};
///
/// let registry = Registry::new();
/// registry
///     .value("message", String::from("Hello World"))
///     .bind("post", Record::new().with("title", String::from("News")).with_marker("body", inject("message")));
///
/// let provider = Provider::new(&registry);
/// let post = provider.get_as::<Record>("post").unwrap();
/// assert_eq!(*post.get::<String>("body").unwrap(), "Hello World");
/// assert_eq!(*post.get::<String>("title").unwrap(), "News");
/// ```
#[derive(Clone, Default)]
pub struct Record {
    fields: Vec<(String, Field)>,
    prototype: Option<Arc<Record>>,
}

impl Record {
    /// Create an empty record
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record inheriting every field of `prototype`
    #[inline]
    pub fn extending(prototype: Record) -> Self {
        Self {
            fields: Vec::new(),
            prototype: Some(Arc::new(prototype)),
        }
    }

    /// The record this one inherits from
    #[inline]
    pub fn prototype(&self) -> Option<&Record> {
        self.prototype.as_deref()
    }

    /// Add a value field and continue the chain
    pub fn with<T: Injectable>(mut self, name: &str, value: T) -> Self {
        self.set(name, Field::Value(instance(value)));
        self
    }

    /// Add an injection marker and continue the chain
    pub fn with_marker(mut self, name: &str, marker: InjectMarker) -> Self {
        self.set(name, Field::Marker(marker));
        self
    }

    /// Stamp an own-name marker on each of the given fields
    pub fn inject_fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.set(name.as_ref(), Field::Marker(InjectMarker::own_name()));
        }
        self
    }

    /// Set a field on this record, replacing an own field of the same name in place
    pub fn set(&mut self, name: &str, field: Field) {
        match self.fields.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, slot)) => *slot = field,
            None => self.fields.push((name.to_owned(), field)),
        }
    }

    /// The nearest field with this name along the prototype chain
    pub fn field(&self, name: &str) -> Option<&Field> {
        let mut current = Some(self);
        while let Some(record) = current {
            if let Some((_, field)) = record.fields.iter().find(|(existing, _)| existing == name) {
                return Some(field);
            }
            current = record.prototype.as_deref();
        }
        None
    }

    /// Check whether a field exists on this record or its prototypes
    #[inline]
    pub fn has(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Every field name along the chain, nearest first, each once
    pub fn names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        let mut current = Some(self);
        while let Some(record) = current {
            for (name, _) in &record.fields {
                if seen.insert(name.as_str()) {
                    names.push(name.as_str());
                }
            }
            current = record.prototype.as_deref();
        }
        names
    }

    /// Property injections declared by markers on this record or its prototypes.
    ///
    /// A field shadowed by a nearer non-marker field is not injected.
    pub fn injections(&self) -> Vec<PropertyInjection> {
        self.names()
            .into_iter()
            .filter_map(|name| match self.field(name) {
                Some(Field::Marker(marker)) => Some(marker.for_property(name)),
                _ => None,
            })
            .collect()
    }

    /// Read a field as a service; lazy injections resolve on first read.
    pub fn service(&self, name: &str) -> Result<Service> {
        match self.field(name) {
            Some(Field::Value(value)) => Ok(Service::Single(Arc::clone(value))),
            Some(Field::Injected(injected)) => injected.get(),
            Some(Field::Marker(_)) | None => Err(DiError::FieldMissing {
                field: name.to_owned(),
            }),
        }
    }

    /// Read a field and downcast it
    pub fn get<T: Injectable>(&self, name: &str) -> Result<Arc<T>> {
        match self.field(name) {
            Some(Field::Value(value)) => downcast(name, Arc::clone(value)),
            Some(Field::Injected(injected)) => injected.get_as(),
            Some(Field::Marker(_)) | None => Err(DiError::FieldMissing {
                field: name.to_owned(),
            }),
        }
    }

    /// The injected slot behind a field, if the field was injected
    pub fn injected(&self, name: &str) -> Option<&Injected> {
        match self.field(name) {
            Some(Field::Injected(injected)) => Some(injected),
            _ => None,
        }
    }

    /// Build an instance of `template` carrying the injected fields.
    pub(crate) fn instantiate(template: &Arc<Record>, injected: Vec<(String, Injected)>) -> Self {
        Self {
            fields: Self::injected_fields(injected),
            prototype: Some(Arc::clone(template)),
        }
    }

    /// Build a prototype-less instance carrying the injected fields.
    pub(crate) fn from_injected(injected: Vec<(String, Injected)>) -> Self {
        Self {
            fields: Self::injected_fields(injected),
            prototype: None,
        }
    }

    fn injected_fields(injected: Vec<(String, Injected)>) -> Vec<(String, Field)> {
        injected
            .into_iter()
            .map(|(name, slot)| (name, Field::Injected(slot)))
            .collect()
    }
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("fields", &self.fields)
            .field("has_prototype", &self.prototype.is_some())
            .finish()
    }
}
