use crate::{
    error::DomainError,
    factory::{ClassMapping, TargetIssue, invalid_target},
    identity::IdentityNormalizer,
    obs::sink::{self, MetricsEvent},
    registry::TypeRegistry,
    types::Instance,
    value::Value,
};

///
/// ReferenceFactory
///
/// Builds identity-only placeholders for lazy associations.
///
/// The placeholder carries the identity fields and nothing else; it is a
/// valid key for repository matching, not a usable domain object.
/// Missing identity parts are left empty rather than rejected.
///

#[derive(Clone, Copy, Debug)]
pub struct ReferenceFactory<'a> {
    registry: &'a TypeRegistry,
    mapping: &'a ClassMapping,
}

impl<'a> ReferenceFactory<'a> {
    #[must_use]
    pub const fn new(registry: &'a TypeRegistry, mapping: &'a ClassMapping) -> Self {
        Self { registry, mapping }
    }

    /// Build a placeholder of `path` from a scalar, identifier, positional
    /// list, or field map.
    pub fn reference(&self, path: &str, identity: &Value) -> Result<Instance, DomainError> {
        let concrete = self.mapping.resolve(path);
        let entry = self
            .registry
            .try_get(concrete)
            .ok_or_else(|| invalid_target(concrete, TargetIssue::UnknownType))?;

        let (Some(descriptor), Some(build)) = (entry.descriptor(), entry.reference_fn()) else {
            return Err(invalid_target(concrete, TargetIssue::NoIdentity));
        };

        let identity =
            IdentityNormalizer::new(entry.path, descriptor).to_partial_identity(identity)?;
        let instance = build(&identity)?;

        sink::record(MetricsEvent::FactoryReference { path: entry.path });

        Ok(instance)
    }
}
