use crate::{
    error::DomainError,
    factory::{
        DefaultGenerator, IdentifierGenerator, NestedFactory, ObjectFactory, TargetIssue,
        invalid_target, nested_context,
    },
    identity::IdentityNormalizer,
    registry::{CONSTRUCTOR, IdentifierEntry},
    types::{Identifier, Instance},
    value::{Context, Value},
};
use std::{fmt, rc::Rc};

///
/// EntityAwareFactory
///
/// Persistence-aware front for an [`ObjectFactory`].
///
/// Serves as the nested factory for everything it builds: a class-typed
/// parameter naming an entity and given only that entity's identity becomes
/// a reference instead of a freshly built object, and an identifier-typed
/// parameter given a raw value becomes that identifier.
///

pub struct EntityAwareFactory {
    inner: Rc<ObjectFactory>,
    generator: Box<dyn IdentifierGenerator>,
}

impl EntityAwareFactory {
    #[must_use]
    pub fn new(inner: Rc<ObjectFactory>) -> Self {
        Self::with_generator(inner, DefaultGenerator::default())
    }

    #[must_use]
    pub fn with_generator(
        inner: Rc<ObjectFactory>,
        generator: impl IdentifierGenerator + 'static,
    ) -> Self {
        Self {
            inner,
            generator: Box::new(generator),
        }
    }

    #[must_use]
    pub fn inner(&self) -> &ObjectFactory {
        &self.inner
    }

    pub fn create(&self, path: &str, context: Context) -> Result<Instance, DomainError> {
        self.inner.create_with(path, CONSTRUCTOR, context, self)
    }

    pub fn create_via(
        &self,
        path: &str,
        method: &str,
        context: Context,
    ) -> Result<Instance, DomainError> {
        self.inner.create_with(path, method, context, self)
    }

    pub fn reference(&self, path: &str, identity: &Value) -> Result<Instance, DomainError> {
        self.inner.reference(path, identity)
    }

    /// Typed identifier of `path` built from `value`.
    ///
    /// An identifier object of the same type is returned as-is.
    pub fn identify(&self, path: &str, value: Value) -> Result<Instance, DomainError> {
        let (kind, entry) = self.identifier_entry(path)?;

        if let Value::Object(instance) = &value
            && instance.path() == kind
        {
            return Ok(instance.clone());
        }

        let identifier = Identifier::from_value(kind, entry.backing, &value)?;

        Ok((entry.wrap)(identifier))
    }

    /// Fresh identifier of `path` from the configured generator.
    pub fn next_identifier(&self, path: &str) -> Result<Instance, DomainError> {
        let (kind, entry) = self.identifier_entry(path)?;
        let identifier = self.generator.generate(kind, entry.backing)?;

        Ok((entry.wrap)(identifier))
    }

    fn identifier_entry(
        &self,
        path: &str,
    ) -> Result<(&'static str, IdentifierEntry), DomainError> {
        let concrete = self.inner.resolve_class(path);
        let entry = self
            .inner
            .registry()
            .try_get(concrete)
            .ok_or_else(|| invalid_target(concrete, TargetIssue::UnknownType))?;

        entry
            .identifier()
            .map(|identifier| (entry.path, *identifier))
            .ok_or_else(|| invalid_target(concrete, TargetIssue::NotAnIdentifier))
    }
}

impl NestedFactory for EntityAwareFactory {
    fn create_nested(&self, path: &str, value: Value) -> Result<Instance, DomainError> {
        let concrete = self.inner.resolve_class(path);

        if let Some(entry) = self.inner.registry().try_get(concrete) {
            if let Some(descriptor) = entry.descriptor()
                && IdentityNormalizer::new(entry.path, descriptor).is_identity(&value)
            {
                return self.inner.reference(concrete, &value);
            }

            if entry.identifier().is_some() && !matches!(value, Value::Map(_)) {
                return self.identify(concrete, value);
            }
        }

        self.inner
            .create_with(path, CONSTRUCTOR, nested_context(value), self)
    }
}

impl fmt::Debug for EntityAwareFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityAwareFactory")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}
