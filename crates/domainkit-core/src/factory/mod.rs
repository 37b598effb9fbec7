//! Object construction from loosely-typed input.
//!
//! The factory looks up a type's declared argument schema, fills it from a
//! context map (falling back to declared defaults), builds nested objects
//! for class-typed parameters, and invokes the type's constructor
//! positionally.

mod arguments;
mod entity_aware;
mod generator;
mod mapping;
mod reference;
mod resolver;


use crate::{
    error::{DomainError, ErrorClass},
    model::ObjectBlueprint,
    obs::sink::{self, MetricsEvent},
    registry::{CONSTRUCTOR, TypeRegistry},
    traits::Construct,
    types::Instance,
    value::{Context, Value},
};
use std::{fmt, rc::Rc};
use thiserror::Error as ThisError;

// re-exports
pub use arguments::Arguments;
pub use entity_aware::EntityAwareFactory;
pub use generator::{DefaultGenerator, IdentifierGenerator, SequenceGenerator, UlidGenerator};
pub use mapping::{ClassMapping, ClassMappingConfig};
pub use reference::ReferenceFactory;
pub use resolver::ArgumentResolver;

/// Context key a scalar is placed under when it feeds a class-typed parameter.
pub const SCALAR_KEY: &str = "value";

///
/// FactoryError
///

#[derive(Debug, ThisError)]
pub enum FactoryError {
    #[error("invalid target '{path}': {issue}")]
    InvalidTarget { path: String, issue: TargetIssue },

    #[error("no value available for argument '{param}' of '{path}::{method}'")]
    MissingArgument {
        path: String,
        method: String,
        param: String,
    },

    #[error("argument '{param}' of '{path}' expects {expected}, found {found}")]
    ArgumentMismatch {
        path: String,
        param: String,
        expected: String,
        found: String,
    },

    #[error("invalid class mapping '{from}' -> '{to}': {issue}")]
    InvalidMapping {
        from: String,
        to: String,
        issue: MappingIssue,
    },

    #[error("expected an instance of '{expected}', built '{found}'")]
    UnexpectedType { expected: String, found: String },
}

impl FactoryError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidTarget { .. } => ErrorClass::Unsupported,
            Self::MissingArgument { .. } | Self::ArgumentMismatch { .. } => {
                ErrorClass::InvalidInput
            }
            Self::InvalidMapping { .. } | Self::UnexpectedType { .. } => {
                ErrorClass::InvariantViolation
            }
        }
    }
}

///
/// TargetIssue
///
/// Why a path cannot be built.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TargetIssue {
    UnknownType,
    UnknownMethod(String),
    Abstract,
    NotConstructible,
    NoIdentity,
    NotAnIdentifier,
}

impl fmt::Display for TargetIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType => write!(f, "type is not registered"),
            Self::UnknownMethod(method) => write!(f, "method '{method}' does not exist"),
            Self::Abstract => write!(f, "type is abstract"),
            Self::NotConstructible => write!(f, "constructor is not public"),
            Self::NoIdentity => write!(f, "type has no identity descriptor"),
            Self::NotAnIdentifier => write!(f, "type is not an identifier"),
        }
    }
}

///
/// MappingIssue
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MappingIssue {
    Duplicate,
    UnknownTarget,
    AbstractTarget,
    NotAssignable,
}

impl fmt::Display for MappingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Duplicate => "source is mapped more than once",
            Self::UnknownTarget => "target is not registered",
            Self::AbstractTarget => "target is abstract",
            Self::NotAssignable => "target does not implement source",
        };
        write!(f, "{label}")
    }
}

///
/// NestedFactory
///
/// Builds the object behind a class-typed parameter.
/// `value` is the raw input given for that parameter; it is never an
/// already-built instance.
///

pub trait NestedFactory {
    fn create_nested(&self, path: &str, value: Value) -> Result<Instance, DomainError>;
}

/// Turn a raw parameter value into the context used to build it.
///
/// Maps are used as-is, `Null` becomes an empty context, and any other
/// value is placed under [`SCALAR_KEY`].
#[must_use]
pub fn nested_context(value: Value) -> Context {
    match value {
        Value::Map(ctx) => ctx,
        Value::Null => Context::new(),
        other => Context::new().with(SCALAR_KEY, other),
    }
}

///
/// ObjectFactory
///
/// Builds registered types from context maps, honouring a class mapping.
/// Acts as its own nested factory unless another one is passed to
/// [`ObjectFactory::create_with`].
///

#[derive(Debug)]
pub struct ObjectFactory {
    registry: Rc<TypeRegistry>,
    resolver: ArgumentResolver,
    mapping: ClassMapping,
}

impl ObjectFactory {
    #[must_use]
    pub fn new(registry: Rc<TypeRegistry>) -> Self {
        Self::with_mapping(registry, ClassMapping::empty())
    }

    #[must_use]
    pub fn with_mapping(registry: Rc<TypeRegistry>, mapping: ClassMapping) -> Self {
        Self {
            resolver: ArgumentResolver::new(Rc::clone(&registry)),
            registry,
            mapping,
        }
    }

    #[must_use]
    pub const fn registry(&self) -> &Rc<TypeRegistry> {
        &self.registry
    }

    #[must_use]
    pub const fn resolver(&self) -> &ArgumentResolver {
        &self.resolver
    }

    #[must_use]
    pub const fn mapping(&self) -> &ClassMapping {
        &self.mapping
    }

    /// Concrete path that would be built for `path`.
    #[must_use]
    pub fn resolve_class<'a>(&'a self, path: &'a str) -> &'a str {
        self.mapping.resolve(path)
    }

    /// Build `path` through its constructor.
    pub fn create(&self, path: &str, context: Context) -> Result<Instance, DomainError> {
        self.create_with(path, CONSTRUCTOR, context, self)
    }

    /// Build `T` (or whatever `T::PATH` is mapped to) and return it typed.
    pub fn create_as<T: Construct>(&self, context: Context) -> Result<Rc<T>, DomainError> {
        let instance = self.create(T::PATH, context)?;
        let found = instance.path();

        instance.downcast::<T>().map_err(|_| {
            FactoryError::UnexpectedType {
                expected: T::PATH.to_string(),
                found: found.to_string(),
            }
            .into()
        })
    }

    /// Build `path` through a named construction method.
    pub fn create_via(
        &self,
        path: &str,
        method: &str,
        context: Context,
    ) -> Result<Instance, DomainError> {
        self.create_with(path, method, context, self)
    }

    /// Build `path` through `method`, delegating class-typed parameters
    /// to `nested`.
    pub fn create_with(
        &self,
        path: &str,
        method: &str,
        context: Context,
        nested: &dyn NestedFactory,
    ) -> Result<Instance, DomainError> {
        let concrete = self.mapping.resolve(path);
        let entry = self
            .registry
            .try_get(concrete)
            .ok_or_else(|| invalid_target(concrete, TargetIssue::UnknownType))?;

        if entry.is_abstract() {
            return Err(invalid_target(concrete, TargetIssue::Abstract));
        }
        if method == CONSTRUCTOR && !entry.is_constructible() {
            return Err(invalid_target(concrete, TargetIssue::NotConstructible));
        }

        let blueprint = self.resolver.resolve(entry.path, method)?;
        let method_entry = entry.method(method).ok_or_else(|| {
            invalid_target(concrete, TargetIssue::UnknownMethod(method.to_string()))
        })?;

        let values = self.resolve_arguments(&blueprint, context, nested)?;
        let instance = method_entry.invoke(&mut Arguments::new(entry.path, values))?;

        sink::record(MetricsEvent::FactoryCreate { path: entry.path });

        Ok(instance)
    }

    /// Fill a blueprint from `context`, in declaration order.
    ///
    /// Unknown context keys are ignored. A given value for a class-typed
    /// parameter whose class is known (directly or through the mapping) is
    /// built by `nested`; everything else is passed through unchanged.
    pub fn resolve_arguments(
        &self,
        blueprint: &ObjectBlueprint,
        mut context: Context,
        nested: &dyn NestedFactory,
    ) -> Result<Vec<(&'static str, Value)>, DomainError> {
        let mut values = Vec::with_capacity(blueprint.len());

        for arg in &blueprint.arguments {
            let (value, given) = match (context.remove(arg.name), &arg.default) {
                (Some(value), _) => (value, true),
                (None, Some(default)) => (default.clone(), false),
                (None, None) => {
                    return Err(FactoryError::MissingArgument {
                        path: blueprint.path.to_string(),
                        method: blueprint.method.clone(),
                        param: arg.name.to_string(),
                    }
                    .into());
                }
            };

            let value = match arg.declared.class_path() {
                Some(class) if given && !value.is_instance() && self.is_known(class) => {
                    Value::Object(nested.create_nested(class, value)?)
                }
                _ => value,
            };

            values.push((arg.name, value));
        }

        Ok(values)
    }

    /// Identity-only placeholder of `path`; see [`ReferenceFactory`].
    pub fn reference(&self, path: &str, identity: &Value) -> Result<Instance, DomainError> {
        self.references().reference(path, identity)
    }

    #[must_use]
    pub fn references(&self) -> ReferenceFactory<'_> {
        ReferenceFactory::new(&self.registry, &self.mapping)
    }

    fn is_known(&self, class: &str) -> bool {
        self.registry.contains(self.mapping.resolve(class))
    }
}

impl NestedFactory for ObjectFactory {
    fn create_nested(&self, path: &str, value: Value) -> Result<Instance, DomainError> {
        self.create(path, nested_context(value))
    }
}

pub(crate) fn invalid_target(path: &str, issue: TargetIssue) -> DomainError {
    FactoryError::InvalidTarget {
        path: path.to_string(),
        issue,
    }
    .into()
}
