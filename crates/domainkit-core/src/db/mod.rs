//! Repository engine: one find/exists/save/delete protocol, two backends.
//!
//! Backends differ only in how rows are matched and persisted. Identity
//! canonicalization and not-found reporting are shared here so both
//! produce the same observable behavior.

pub mod memory;
pub mod relational;


use crate::{
    collection::Collection,
    error::{DomainError, ErrorClass},
    identity::{Identity, IdentityNormalizer},
    obs::sink::{ExecKind, Span},
    traits::Entity,
    value::{Context, Value},
};
use std::{fmt, rc::Rc};
use thiserror::Error as ThisError;

// re-exports
pub use memory::{InMemoryRepository, InMemoryStore};
pub use relational::{BackendError, Criterion, QueryBuilder, RelationalRepository, Row, Window};

///
/// RepositoryError
///

#[derive(Debug, ThisError)]
pub enum RepositoryError {
    #[error("no fields given to filter '{path}'")]
    MissingCriteria { path: &'static str },

    #[error("entity '{path}' not found for {lookup}")]
    EntityNotFound { path: &'static str, lookup: Lookup },

    #[error("duplicate entity '{path}' with identity {identity}")]
    DuplicateEntity {
        path: &'static str,
        identity: Identity,
    },

    #[error("unknown field '{field}' for entity '{path}'")]
    UnknownField { path: &'static str, field: String },

    #[error("backend failure for '{path}': {source}")]
    Backend {
        path: &'static str,
        source: BackendError,
    },
}

impl RepositoryError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::MissingCriteria { .. } | Self::UnknownField { .. } => ErrorClass::InvalidInput,
            Self::EntityNotFound { .. } => ErrorClass::NotFound,
            Self::DuplicateEntity { .. } => ErrorClass::Conflict,
            Self::Backend { .. } => ErrorClass::InvariantViolation,
        }
    }
}

///
/// Lookup
///
/// What a failed lookup was asked for.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Lookup {
    /// A normalized identity.
    Identity(Identity),
    /// Input that could not be read as an identity.
    Raw(Value),
    /// A field filter that is not an identity.
    Fields(Context),
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity(identity) => write!(f, "identity {identity}"),
            Self::Raw(value) => write!(f, "identity {value}"),
            Self::Fields(fields) => write!(f, "fields {fields}"),
        }
    }
}

///
/// RepositoryEngine
///
/// Persistence protocol for one entity type.
///
/// `limit == 0` means unbounded. Only `EntityNotFound` is absorbed (by the
/// `exists*` methods); every other error propagates unchanged.
///

pub trait RepositoryEngine<E: Entity> {
    /// Every stored entity, in the backend's stable order.
    fn find_all(&self, offset: usize, limit: usize) -> Result<Collection<Rc<E>>, DomainError>;

    /// Entities matching every entry of `fields`.
    fn find_all_by_fields(
        &self,
        fields: &Context,
        offset: usize,
        limit: usize,
    ) -> Result<Collection<Rc<E>>, DomainError>;

    /// Entity holding a normalized identity.
    fn find_by_identity(&self, identity: &Identity) -> Result<Rc<E>, DomainError>;

    /// Store `entity`; a no-op when this exact entity is already stored.
    fn save(&self, entity: &Rc<E>) -> Result<(), DomainError>;

    /// Remove `entity`; a no-op when it is not stored.
    fn delete(&self, entity: &Rc<E>) -> Result<(), DomainError>;

    /// Entity with the given identity (scalar, identifier, list, or field map).
    fn find(&self, identity: &Value) -> Result<Rc<E>, DomainError> {
        let mut span = Span::<E>::new(ExecKind::Load);

        let found = match IdentityNormalizer::of::<E>().to_identity(identity)? {
            Some(normalized) => self.find_by_identity(&normalized)?,
            None => return Err(not_found::<E>(Lookup::Raw(identity.clone()))),
        };
        span.set_rows(1);

        Ok(found)
    }

    /// First entity matching `fields`.
    fn find_by_fields(&self, fields: &Context) -> Result<Rc<E>, DomainError> {
        self.find_all_by_fields(fields, 0, 1)?
            .into_iter()
            .next()
            .ok_or_else(|| not_found_by_fields::<E>(fields))
    }

    fn exists(&self, identity: &Value) -> Result<bool, DomainError> {
        let _span = Span::<E>::new(ExecKind::Exists);

        absorb_not_found(self.find(identity))
    }

    fn exists_by_fields(&self, fields: &Context) -> Result<bool, DomainError> {
        let _span = Span::<E>::new(ExecKind::Exists);

        absorb_not_found(self.find_by_fields(fields))
    }
}

fn absorb_not_found<T>(result: Result<T, DomainError>) -> Result<bool, DomainError> {
    match result {
        Ok(_) => Ok(true),
        Err(err) if err.is_not_found() => Ok(false),
        Err(err) => Err(err),
    }
}

pub(crate) fn not_found<E: Entity>(lookup: Lookup) -> DomainError {
    RepositoryError::EntityNotFound {
        path: E::PATH,
        lookup,
    }
    .into()
}

/// Not-found error for a field filter.
///
/// A filter naming exactly the identity fields reports the attempted
/// identity; anything else reports the raw fields.
pub(crate) fn not_found_by_fields<E: Entity>(fields: &Context) -> DomainError {
    let normalizer = IdentityNormalizer::of::<E>();
    let identity = if E::IDENTITY.matches_keys(fields) {
        normalizer
            .to_identity(&Value::Map(fields.clone()))
            .ok()
            .flatten()
    } else {
        None
    };

    not_found::<E>(identity.map_or_else(|| Lookup::Fields(fields.clone()), Lookup::Identity))
}

/// Reject filter fields the entity does not declare.
///
/// Checked before any row is read, so an empty table reports the same
/// error as a full one.
pub(crate) fn check_filter_fields<E: Entity>(fields: &Context) -> Result<(), DomainError> {
    let params = E::parameters();
    let unknown = fields
        .keys()
        .find(|name| params.iter().all(|param| param.name != name.as_str()));

    match unknown {
        Some(field) => Err(RepositoryError::UnknownField {
            path: E::PATH,
            field: field.clone(),
        }
        .into()),
        None => Ok(()),
    }
}

pub(crate) fn missing_criteria<E: Entity>() -> DomainError {
    RepositoryError::MissingCriteria { path: E::PATH }.into()
}

pub(crate) fn duplicate<E: Entity>(identity: Identity) -> DomainError {
    RepositoryError::DuplicateEntity {
        path: E::PATH,
        identity,
    }
    .into()
}

/// Apply an offset/limit window (`limit == 0` is unbounded).
pub(crate) fn window<T>(items: Vec<T>, offset: usize, limit: usize) -> Vec<T> {
    let take = if limit == 0 { usize::MAX } else { limit };

    items.into_iter().skip(offset).take(take).collect()
}
