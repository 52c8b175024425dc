//! Instantiation protocol
//!
//! Turns a [`ServiceDefinition`] into an instance against a scope: positional
//! dependencies first, then property slots, then the factory.

use crate::definition::{Factory, PropertyInjection, ServiceDefinition};
use crate::inject::Injected;
use crate::provider::Provider;
use crate::record::Record;
use crate::service::{Injectable, Instance, instance};
use crate::{DiError, Result, Service};
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::trace;

/// What a factory receives: its resolved positional arguments and the
/// instance record carrying its injected properties.
pub struct Injection<'a> {
    service: &'a str,
    names: &'a [String],
    args: Vec<Service>,
    this: Arc<Record>,
}

impl<'a> Injection<'a> {
    pub(crate) fn new(
        service: &'a str,
        names: &'a [String],
        args: Vec<Service>,
        this: Arc<Record>,
    ) -> Self {
        Self {
            service,
            names,
            args,
            this,
        }
    }

    /// Name of the service being created
    #[inline]
    pub fn service_name(&self) -> &str {
        self.service
    }

    /// Number of positional arguments
    #[inline]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Check if there are no positional arguments
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Positional argument as resolved
    pub fn arg(&self, index: usize) -> Result<&Service> {
        self.args.get(index).ok_or_else(|| DiError::ArgumentMissing {
            service: self.service.to_owned(),
            index,
        })
    }

    /// Positional argument downcast to `T`
    pub fn arg_as<T: Injectable>(&self, index: usize) -> Result<Arc<T>> {
        self.arg(index)?.downcast(&self.names[index])
    }

    /// Every instance of a wildcard argument, downcast to `T`
    pub fn arg_all<T: Injectable>(&self, index: usize) -> Result<Vec<Arc<T>>> {
        self.arg(index)?.downcast_all(&self.names[index])
    }

    /// Positional argument as an erased single instance
    pub fn instance(&self, index: usize) -> Result<Instance> {
        match self.arg(index)? {
            Service::Single(instance) => Ok(Arc::clone(instance)),
            Service::Many(_) => Err(DiError::TypeMismatch {
                name: self.names[index].clone(),
                expected: "single instance",
            }),
        }
    }

    /// The instance record the properties were attached to
    #[inline]
    pub fn this(&self) -> &Arc<Record> {
        &self.this
    }

    /// The instance record as an erased instance
    #[inline]
    pub fn this_instance(&self) -> Instance {
        Arc::clone(&self.this) as Instance
    }

    /// Injected property downcast to `T`
    #[inline]
    pub fn property<T: Injectable>(&self, name: &str) -> Result<Arc<T>> {
        self.this.get(name)
    }

    /// Injected property slot, for factories that keep lazy slots around
    pub fn injected(&self, name: &str) -> Option<Injected> {
        self.this.injected(name).cloned()
    }
}

/// Create an instance of `definition`, resolving every dependency against `scope`.
pub(crate) fn instantiate(
    name: &str,
    definition: &ServiceDefinition,
    scope: &Provider,
) -> Result<Instance> {
    let dependencies = definition.dependencies();

    #[cfg(feature = "logging")]
    trace!(
        target: "hierarchy_di",
        service = name,
        scope = %scope.scope(),
        call_injection = dependencies.call_injection.len(),
        property_injection = dependencies.property_injection.len(),
        "Instantiating service"
    );

    let args = dependencies
        .call_injection
        .iter()
        .map(|dependency| scope.get(dependency))
        .collect::<Result<Vec<_>>>()?;

    let properties = dependencies
        .property_injection
        .iter()
        .map(|property| inject_property(property, scope))
        .collect::<Result<Vec<_>>>()?;

    match definition.factory() {
        Factory::Constant(value) => Ok(Arc::clone(value)),
        Factory::Record(template) => Ok(instance(Record::instantiate(template, properties))),
        Factory::Call { template, factory } => {
            let this = match template {
                Some(template) => Record::instantiate(template, properties),
                None => Record::from_injected(properties),
            };
            let injection = Injection::new(
                name,
                &dependencies.call_injection,
                args,
                Arc::new(this),
            );
            factory(&injection)
        }
    }
}

fn inject_property(property: &PropertyInjection, scope: &Provider) -> Result<(String, Injected)> {
    let slot = if property.lazy {
        Injected::lazy(&property.service, scope)
    } else {
        Injected::eager(&property.service, scope.get(&property.service)?)
    };
    Ok((property.property.clone(), slot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{Definition, Function};
    use crate::record::{inject, inject_lazy};
    use crate::Registry;

    fn scope() -> Provider {
        let registry = Registry::new();
        registry
            .value("message", String::from("Hello World"))
            .value("answer", 42u32);
        Provider::new(&registry)
    }

    #[test]
    fn test_constant_is_returned_unchanged() {
        let value = instance(String::from("const"));
        let definition = ServiceDefinition::constant(Arc::clone(&value));
        let resolved = instantiate("const", &definition, &scope()).unwrap();
        assert!(Arc::ptr_eq(&value, &resolved));
    }

    #[test]
    fn test_call_injection_in_declared_order() {
        let definition = ServiceDefinition::new(
            Function::new("answer, message", |args| {
                Ok(format!("{} {}", args.arg_as::<u32>(0)?, args.arg_as::<String>(1)?))
            })
            .into(),
            true,
        );
        let resolved = instantiate("joined", &definition, &scope()).unwrap();
        assert_eq!(*resolved.downcast::<String>().unwrap(), "42 Hello World");
    }

    #[test]
    fn test_properties_attached_before_factory_runs() {
        let template = Record::new().with_marker("message", inject("message"));
        let definition = ServiceDefinition::new(
            Function::new("", |args| {
                assert_eq!(*args.property::<String>("message")?, "Hello World");
                Ok(())
            })
            .template(template)
            .into(),
            true,
        );

        let resolved = instantiate("post", &definition, &scope()).unwrap();
        let post = resolved.downcast::<Record>().unwrap();
        assert_eq!(*post.get::<String>("message").unwrap(), "Hello World");
    }

    #[test]
    fn test_record_gets_new_instance_with_template_prototype() {
        let definition = ServiceDefinition::new(
            Record::new()
                .with("kind", String::from("post"))
                .with_marker("body", inject("message"))
                .with_marker("later", inject_lazy("answer"))
                .into(),
            true,
        );
        let resolved = instantiate("post", &definition, &scope()).unwrap();
        let post = resolved.downcast::<Record>().unwrap();

        assert_eq!(*post.get::<String>("kind").unwrap(), "post");
        assert_eq!(*post.get::<String>("body").unwrap(), "Hello World");
        let later = post.injected("later").unwrap();
        assert!(!later.is_resolved());
        assert_eq!(*later.get_as::<u32>().unwrap(), 42);
    }

    #[test]
    fn test_missing_argument_position() {
        let definition = ServiceDefinition::new(
            Function::new("message", |args| args.arg_as::<String>(3).map(|_| ())).into(),
            true,
        );
        let err = instantiate("broken", &definition, &scope()).unwrap_err();
        assert_eq!(
            err,
            DiError::ArgumentMissing {
                service: "broken".into(),
                index: 3
            }
        );
    }

    #[test]
    fn test_unknown_dependency_fails() {
        let definition = ServiceDefinition::new(Definition::array(["nope"], |_| Ok(0u8)), true);
        let err = instantiate("needs_nope", &definition, &scope()).unwrap_err();
        assert_eq!(err, DiError::unknown("nope"));

        let definition = ServiceDefinition::new(
            Record::new().with_marker("body", inject("nope")).into(),
            true,
        );
        let err = instantiate("post", &definition, &scope()).unwrap_err();
        assert_eq!(err, DiError::unknown("nope"));
    }

    #[test]
    fn test_factory_record_is_new_per_resolution() {
        let registry = Registry::new();
        registry
            .value("message", String::from("Hello World"))
            .bind_factory("post", Record::new().with_marker("body", inject("message")));
        let provider = Provider::new(&registry);

        let first = provider.get_as::<Record>("post").unwrap();
        let second = provider.get_as::<Record>("post").unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(std::ptr::eq(
            first.prototype().unwrap(),
            second.prototype().unwrap()
        ));
        assert!(first.prototype().unwrap().injected("body").is_none());
        assert_eq!(*second.get::<String>("body").unwrap(), "Hello World");
    }
}
