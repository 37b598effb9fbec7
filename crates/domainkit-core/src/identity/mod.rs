//! Module: identity
//! Responsibility: canonical identity tuples and identifier comparison.
//! Does not own: identity declaration (see `model::identity`) or storage.
//! Boundary: every identity comparison made by a repository backend goes
//! through this module.
//!
//! Invariants:
//! - An identity holds exactly one canonical value per descriptor field,
//!   in descriptor order.
//! - Canonical values never contain typed identifiers; an empty identifier
//!   canonicalizes to `Null`.
//! - Values of different runtime types are never coerced into equality.

#[cfg(test)]
mod tests;

use crate::{
    error::{DomainError, ErrorClass},
    model::{IdentityDescriptor, IdentityField, IdentityKind},
    traits::{DomainObject, Entity, FieldValue},
    types::{IdBacking, Identifier},
    value::{Context, Value, canonical_eq},
};
use derive_more::Deref;
use std::fmt;
use thiserror::Error as ThisError;

///
/// IdentityError
///

#[derive(Debug, ThisError)]
pub enum IdentityError {
    #[error("identifier of type '{kind}' cannot be empty text")]
    EmptyIdentifier { kind: &'static str },

    #[error("value of type '{found}' is not a valid '{kind}' identifier")]
    InvalidIdentifierValue { kind: &'static str, found: String },

    #[error("identity of '{path}' has {expected} field(s), {found} value(s) given")]
    ArityMismatch {
        path: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("identity value {index} of '{path}' cannot be read as {expected}")]
    MalformedIdentity {
        path: &'static str,
        index: usize,
        expected: &'static str,
    },

    #[error("'{path}' does not expose identity field '{field}'")]
    UnknownField {
        path: &'static str,
        field: &'static str,
    },

    #[error("identifiers of type '{kind}' cannot be generated from {backing:?} values")]
    UnsupportedGeneration {
        kind: &'static str,
        backing: IdBacking,
    },
}

impl IdentityError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::EmptyIdentifier { .. }
            | Self::InvalidIdentifierValue { .. }
            | Self::ArityMismatch { .. }
            | Self::MalformedIdentity { .. } => ErrorClass::InvalidInput,
            Self::UnsupportedGeneration { .. } => ErrorClass::Unsupported,
            Self::UnknownField { .. } => ErrorClass::InvariantViolation,
        }
    }

    pub(crate) fn invalid_value(kind: &'static str, value: &Value) -> Self {
        Self::InvalidIdentifierValue {
            kind,
            found: value.type_name().to_string(),
        }
    }
}

///
/// Identity
///
/// Ordered canonical identity tuple.
///

#[derive(Clone, Debug, Default, Deref, PartialEq)]
pub struct Identity(Vec<Value>);

impl Identity {
    #[must_use]
    pub const fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// True when no part is empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(|value| !value.is_null())
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.0
    }

    /// Key form used for storage and matching: the single value of a
    /// one-field identity, a list otherwise.
    #[must_use]
    pub fn into_key(mut self) -> Value {
        if self.0.len() == 1 {
            self.0.remove(0)
        } else {
            Value::List(self.0)
        }
    }

    /// Identity part `index` converted to `T`.
    ///
    /// Used by `Entity::reference` implementations to rebuild typed fields.
    pub fn decode<T: FieldValue>(
        &self,
        path: &'static str,
        index: usize,
    ) -> Result<T, DomainError> {
        self.0.get(index).and_then(T::from_value).ok_or_else(|| {
            IdentityError::MalformedIdentity {
                path,
                index,
                expected: std::any::type_name::<T>(),
            }
            .into()
        })
    }

    /// Pair each part with its descriptor field name.
    #[must_use]
    pub fn to_fields(&self, descriptor: IdentityDescriptor) -> Context {
        descriptor.names().zip(self.0.iter().cloned()).collect()
    }
}

impl From<Vec<Value>> for Identity {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ")")
    }
}

///
/// IdentityNormalizer
///
/// Canonicalizes raw identity input for one entity type.
///

#[derive(Clone, Copy, Debug)]
pub struct IdentityNormalizer {
    path: &'static str,
    descriptor: IdentityDescriptor,
}

impl IdentityNormalizer {
    #[must_use]
    pub const fn new(path: &'static str, descriptor: IdentityDescriptor) -> Self {
        Self { path, descriptor }
    }

    #[must_use]
    pub const fn of<E: Entity>() -> Self {
        Self::new(E::PATH, E::IDENTITY)
    }

    /// Normalizer for the runtime type of `object`, when it is an entity.
    #[must_use]
    pub fn for_object(object: &dyn DomainObject) -> Option<Self> {
        object
            .identity_descriptor()
            .map(|descriptor| Self::new(object.type_path(), descriptor))
    }

    #[must_use]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    #[must_use]
    pub const fn descriptor(&self) -> IdentityDescriptor {
        self.descriptor
    }

    /// Strict identity conversion.
    ///
    /// - a field map must name exactly the descriptor fields
    /// - a single scalar or identifier is accepted for one-field descriptors
    /// - a positional list must match the descriptor arity, or the call is
    ///   rejected as a usage error
    ///
    /// Returns `None` when the input cannot be read as an identity of this
    /// type, including identifiers of the wrong kind.
    pub fn to_identity(&self, raw: &Value) -> Result<Option<Identity>, DomainError> {
        let fields = self.descriptor.fields();

        let values = match raw {
            Value::List(items) => {
                self.check_arity(items.len())?;
                fields
                    .iter()
                    .zip(items)
                    .map(|(field, value)| canonical_part(field, value).ok())
                    .collect::<Option<Vec<_>>>()
            }
            Value::Map(ctx) => {
                if !self.descriptor.matches_keys(ctx) {
                    return Ok(None);
                }
                fields
                    .iter()
                    .map(|field| {
                        ctx.get(field.name)
                            .and_then(|value| canonical_part(field, value).ok())
                    })
                    .collect::<Option<Vec<_>>>()
            }
            Value::Object(instance) if instance.as_identifier().is_none() => None,
            value => match fields {
                [field] => canonical_part(field, value).ok().map(|v| vec![v]),
                _ => None,
            },
        };

        Ok(values.map(Identity))
    }

    /// Lenient conversion used for references.
    ///
    /// Map keys outside the descriptor are ignored and missing parts are
    /// left empty; a scalar fills the first part. A positional list must
    /// still match the descriptor arity.
    pub fn to_partial_identity(&self, raw: &Value) -> Result<Identity, DomainError> {
        let fields = self.descriptor.fields();

        let values = match raw {
            Value::List(items) => {
                self.check_arity(items.len())?;
                fields
                    .iter()
                    .zip(items)
                    .map(|(field, value)| canonical_part(field, value))
                    .collect::<Result<Vec<_>, _>>()?
            }
            Value::Map(ctx) => fields
                .iter()
                .map(|field| {
                    ctx.get(field.name)
                        .map_or(Ok(Value::Null), |value| canonical_part(field, value))
                })
                .collect::<Result<Vec<_>, _>>()?,
            value => {
                let mut values = Vec::with_capacity(fields.len());
                for (i, field) in fields.iter().enumerate() {
                    values.push(if i == 0 {
                        canonical_part(field, value)?
                    } else {
                        Value::Null
                    });
                }
                values
            }
        };

        Ok(Identity(values))
    }

    /// True when `raw` converts to an identity with no empty part.
    #[must_use]
    pub fn is_identity(&self, raw: &Value) -> bool {
        matches!(self.to_identity(raw), Ok(Some(identity)) if identity.is_complete())
    }

    /// Positional identities must supply exactly one value per field.
    pub fn check_arity(&self, found: usize) -> Result<(), DomainError> {
        let expected = self.descriptor.len();
        if found == expected {
            Ok(())
        } else {
            Err(IdentityError::ArityMismatch {
                path: self.path,
                expected,
                found,
            }
            .into())
        }
    }

    /// Identity currently held by `object`.
    pub fn identity_of(&self, object: &dyn DomainObject) -> Result<Identity, DomainError> {
        self.descriptor
            .fields()
            .iter()
            .map(|field| {
                object
                    .field(field.name)
                    .map(|value| normalize_identifier(&value))
                    .ok_or_else(|| {
                        IdentityError::UnknownField {
                            path: self.path,
                            field: field.name,
                        }
                        .into()
                    })
            })
            .collect::<Result<Vec<_>, DomainError>>()
            .map(Identity)
    }

    /// True when `object` holds the complete identity `identity`.
    #[must_use]
    pub fn matches(&self, object: &dyn DomainObject, identity: &Identity) -> bool {
        identity.is_complete()
            && self
                .descriptor
                .names()
                .zip(identity.iter())
                .all(|(name, wanted)| {
                    object
                        .field(name)
                        .is_some_and(|stored| values_match(&stored, wanted))
                })
    }
}

/// Canonical value of one identity part.
fn canonical_part(field: &IdentityField, value: &Value) -> Result<Value, DomainError> {
    match field.kind {
        IdentityKind::Identifier { kind, backing } => {
            Ok(Identifier::from_value(kind, backing, value)?.to_value())
        }
        IdentityKind::Scalar => Ok(normalize_identifier(value)),
    }
}

/// Underlying value of a typed identifier (`Null` when empty); any other
/// value is returned unchanged.
#[must_use]
pub fn normalize_identifier(value: &Value) -> Value {
    value
        .as_identifier()
        .map_or_else(|| value.clone(), Identifier::to_value)
}

/// True for `Null` and for identifiers with no value.
#[must_use]
pub fn is_empty_identifier(value: &Value) -> bool {
    match value.as_identifier() {
        Some(identifier) => identifier.is_empty(),
        None => value.is_null(),
    }
}

/// Field-filter match between a stored value and a wanted value.
///
/// - `Null` (or an empty identifier) matches a stored `Null` or empty identifier
/// - a list matches when the stored value equals the whole list or any element
/// - two identifiers compare by kind and value
/// - an entity compares as its identity key, so a reference matches the
///   entity it points to
/// - anything else compares canonically after unwrapping identifiers
#[must_use]
pub fn values_match(stored: &Value, wanted: &Value) -> bool {
    if is_empty_identifier(wanted) {
        return is_empty_identifier(stored);
    }

    match wanted {
        Value::List(options) => {
            single_match(stored, wanted)
                || options.iter().any(|option| values_match(stored, option))
        }
        _ => single_match(stored, wanted),
    }
}

fn single_match(stored: &Value, wanted: &Value) -> bool {
    match (stored.as_identifier(), wanted.as_identifier()) {
        (Some(a), Some(b)) => a == b,
        _ => canonical_eq(&match_form(stored), &match_form(wanted)),
    }
}

fn match_form(value: &Value) -> Value {
    if let Value::Object(instance) = value
        && let Some(normalizer) = IdentityNormalizer::for_object(instance.as_object())
        && let Ok(identity) = normalizer.identity_of(instance.as_object())
    {
        return identity.into_key();
    }

    normalize_identifier(value)
}
