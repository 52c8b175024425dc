//! Service definitions and dependency extraction
//!
//! A [`Definition`] is what callers hand to a registry. Binding it turns it
//! into a [`ServiceDefinition`]: the factory, its lifetime and the ordered
//! list of names it depends on.
//!
//! ## Definition shapes
//!
//! - [`Function`] - a factory with a positional parameter list
//! - [`Definition::array`] - an explicit list of names plus a factory
//! - [`Record`] - a record whose marker fields are property injections
//! - [`Definition::constant`] - a value returned as is

use crate::record::Record;
use crate::resolver::Injection;
use crate::service::{Injectable, Instance, instance};
use crate::Result;
use std::any::TypeId;
use std::sync::Arc;

/// Type-erased factory function
pub type FactoryFn = Arc<dyn Fn(&Injection<'_>) -> Result<Instance> + Send + Sync>;

/// A property to fill with a resolved service after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyInjection {
    /// Field the service is attached to
    pub property: String,
    /// Service to resolve
    pub service: String,
    /// Resolve on first read instead of at construction
    pub lazy: bool,
}

/// Everything a definition needs from its scope, in declared order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
    /// Names resolved into positional arguments
    pub call_injection: Vec<String>,
    /// Properties attached to the created instance
    pub property_injection: Vec<PropertyInjection>,
}

impl Dependencies {
    /// No dependencies at all
    #[inline]
    pub fn none() -> Self {
        Self::default()
    }

    /// Every service name this definition reads: call names, then property services.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.call_injection
            .iter()
            .map(String::as_str)
            .chain(self.property_injection.iter().map(|p| p.service.as_str()))
    }

    /// Check if there is nothing to inject
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.call_injection.is_empty() && self.property_injection.is_empty()
    }
}

/// A factory with a positional parameter list.
///
/// Call-injection names come from the explicit [`Function::requires`] list
/// when one is set, otherwise from the declared signature. Property
/// injections come from markers on the instance template.
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
/// ```
#[derive(Clone)]
pub struct Function {
    signature: String,
    requires: Option<Vec<String>>,
    template: Option<Record>,
    factory: FactoryFn,
}

impl Function {
    /// Create a function from a parameter list and a factory.
    ///
    /// A factory returning `()` produces the created instance record, so
    /// constructor-style functions only need to touch their properties.
    pub fn new<T, F>(signature: &str, factory: F) -> Self
    where
        T: Injectable,
        F: Fn(&Injection<'_>) -> Result<T> + Send + Sync + 'static,
    {
        Self::erased(signature, move |injection| {
            let value = factory(injection)?;
            if TypeId::of::<T>() == TypeId::of::<()>() {
                return Ok(injection.this_instance());
            }
            Ok(instance(value))
        })
    }

    /// Create a function whose factory returns an already erased instance.
    ///
    /// Useful to hand out an injected instance unchanged.
    pub fn erased<F>(signature: &str, factory: F) -> Self
    where
        F: Fn(&Injection<'_>) -> Result<Instance> + Send + Sync + 'static,
    {
        Self {
            signature: signature.to_owned(),
            requires: None,
            template: None,
            factory: Arc::new(factory),
        }
    }

    /// Override the parameter list with explicit service names
    pub fn requires<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Set the template record instances are created from
    pub fn template(mut self, template: Record) -> Self {
        self.template = Some(template);
        self
    }

    /// Stamp own-name markers for the given properties on the template
    pub fn inject_properties<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let template = self.template.take().unwrap_or_default();
        self.template = Some(template.inject_fields(names));
        self
    }

    /// The call-injection names this function will receive
    pub fn parameters(&self) -> Vec<String> {
        self.requires
            .clone()
            .unwrap_or_else(|| parse_parameter_list(&self.signature))
    }
}

/// A service definition as supplied at registration time.
#[derive(Clone)]
pub enum Definition {
    /// A value returned unchanged
    Constant(Instance),
    /// A factory with a parameter list
    Function(Function),
    /// Dependency names plus a factory; no property injection
    Array {
        names: Vec<String>,
        factory: FactoryFn,
    },
    /// A record template with marker fields
    Record(Record),
}

impl Definition {
    /// A constant definition
    #[inline]
    pub fn constant<T: Injectable>(value: T) -> Self {
        Definition::Constant(instance(value))
    }

    /// An array-notation definition: names in order, then the factory.
    pub fn array<I, S, T, F>(names: I, factory: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        T: Injectable,
        F: Fn(&Injection<'_>) -> Result<T> + Send + Sync + 'static,
    {
        Definition::Array {
            names: names.into_iter().map(Into::into).collect(),
            factory: Arc::new(move |injection| Ok(instance(factory(injection)?))),
        }
    }

    /// Extract the dependency lists of this definition.
    pub fn dependencies(&self) -> Dependencies {
        match self {
            Definition::Constant(_) => Dependencies::none(),
            Definition::Function(function) => Dependencies {
                call_injection: function.parameters(),
                property_injection: function
                    .template
                    .as_ref()
                    .map(Record::injections)
                    .unwrap_or_default(),
            },
            Definition::Array { names, .. } => Dependencies {
                call_injection: names.clone(),
                property_injection: Vec::new(),
            },
            Definition::Record(record) => Dependencies {
                call_injection: Vec::new(),
                property_injection: record.injections(),
            },
        }
    }
}

impl From<Function> for Definition {
    #[inline]
    fn from(function: Function) -> Self {
        Definition::Function(function)
    }
}

impl From<Record> for Definition {
    #[inline]
    fn from(record: Record) -> Self {
        Definition::Record(record)
    }
}

impl std::fmt::Debug for Definition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Definition::Constant(_) => "Constant",
            Definition::Function(_) => "Function",
            Definition::Array { .. } => "Array",
            Definition::Record(_) => "Record",
        };
        f.debug_struct("Definition")
            .field("kind", &kind)
            .field("dependencies", &self.dependencies())
            .finish()
    }
}

/// How a stored definition produces its instance
pub(crate) enum Factory {
    /// Return the captured value
    Constant(Instance),
    /// Create a new record from the template
    Record(Arc<Record>),
    /// Call the factory with an instance created from the optional template
    Call {
        template: Option<Arc<Record>>,
        factory: FactoryFn,
    },
}

/// A registered service: factory, lifetime and dependencies.
///
/// Stored behind an `Arc`; two definitions are "the same" only when they are
/// the same allocation.
pub struct ServiceDefinition {
    factory: Factory,
    singleton: bool,
    dependencies: Dependencies,
}

impl ServiceDefinition {
    /// Build a stored definition from a registration-time definition
    pub fn new(definition: Definition, singleton: bool) -> Self {
        let dependencies = definition.dependencies();
        let factory = match definition {
            Definition::Constant(value) => Factory::Constant(value),
            Definition::Record(record) => Factory::Record(Arc::new(record)),
            Definition::Function(function) => Factory::Call {
                template: function.template.map(Arc::new),
                factory: function.factory,
            },
            Definition::Array { factory, .. } => Factory::Call {
                template: None,
                factory,
            },
        };
        Self {
            factory,
            singleton,
            dependencies,
        }
    }

    /// A singleton constant with no dependencies
    #[inline]
    pub fn constant(value: Instance) -> Self {
        Self {
            factory: Factory::Constant(value),
            singleton: true,
            dependencies: Dependencies::none(),
        }
    }

    /// Check if one instance is cached per responsible scope
    #[inline]
    pub fn is_singleton(&self) -> bool {
        self.singleton
    }

    /// Dependencies in declared order
    #[inline]
    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    #[inline]
    pub(crate) fn factory(&self) -> &Factory {
        &self.factory
    }
}

impl std::fmt::Debug for ServiceDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceDefinition")
            .field("singleton", &self.singleton)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// Split a declared parameter list into service names.
///
/// Accepts either a bare list (`"message, greeting"`) or a signature with
/// parentheses (`"fn(message, greeting)"`). Block comments are stripped
/// before splitting.
pub fn parse_parameter_list(signature: &str) -> Vec<String> {
    let stripped = strip_block_comments(signature);
    let list = match (stripped.find('('), stripped.rfind(')')) {
        (Some(open), Some(close)) if open < close => &stripped[open + 1..close],
        _ => stripped.as_str(),
    };
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

fn strip_block_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            // unterminated comment swallows the rest
            None => rest = "",
        }
    }
    out.push_str(rest);
    out
}
