use crate::{
    collection::CollectionError, db::RepositoryError, factory::FactoryError,
    identity::IdentityError, registry::RegistryError, value::ValueError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// DomainError
///
/// Structured runtime error with a stable classification.
/// The typed cause (if any) lives in `detail`; `class` and `origin` are
/// derived from it so callers can branch without matching every variant.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct DomainError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    /// The variant (if present) must correspond to `origin`.
    pub detail: Option<ErrorDetail>,
}

impl DomainError {
    /// Construct an error without a structured detail payload.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    fn with_detail(class: ErrorClass, origin: ErrorOrigin, detail: ErrorDetail) -> Self {
        Self {
            class,
            origin,
            message: detail.to_string(),
            detail: Some(detail),
        }
    }

    /// Construct a factory-origin invariant violation.
    pub(crate) fn factory_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Factory,
            message.into(),
        )
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self.detail,
            Some(ErrorDetail::Repository(RepositoryError::EntityNotFound { .. }))
        )
    }

    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(
            self.detail,
            Some(ErrorDetail::Repository(RepositoryError::DuplicateEntity { .. }))
        )
    }

    #[must_use]
    pub const fn is_invalid_target(&self) -> bool {
        matches!(
            self.detail,
            Some(ErrorDetail::Factory(FactoryError::InvalidTarget { .. }))
        )
    }

    #[must_use]
    pub const fn is_missing_argument(&self) -> bool {
        matches!(
            self.detail,
            Some(ErrorDetail::Factory(FactoryError::MissingArgument { .. }))
        )
    }

    #[must_use]
    pub const fn is_missing_criteria(&self) -> bool {
        matches!(
            self.detail,
            Some(ErrorDetail::Repository(RepositoryError::MissingCriteria { .. }))
        )
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`DomainError`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Registry(RegistryError),
    #[error("{0}")]
    Factory(FactoryError),
    #[error("{0}")]
    Identity(IdentityError),
    #[error("{0}")]
    Repository(RepositoryError),
    #[error("{0}")]
    Collection(CollectionError),
    #[error("{0}")]
    Value(ValueError),
}

impl From<RegistryError> for DomainError {
    fn from(err: RegistryError) -> Self {
        Self::with_detail(err.class(), ErrorOrigin::Registry, ErrorDetail::Registry(err))
    }
}

impl From<FactoryError> for DomainError {
    fn from(err: FactoryError) -> Self {
        Self::with_detail(err.class(), ErrorOrigin::Factory, ErrorDetail::Factory(err))
    }
}

impl From<IdentityError> for DomainError {
    fn from(err: IdentityError) -> Self {
        Self::with_detail(err.class(), ErrorOrigin::Identity, ErrorDetail::Identity(err))
    }
}

impl From<RepositoryError> for DomainError {
    fn from(err: RepositoryError) -> Self {
        Self::with_detail(
            err.class(),
            ErrorOrigin::Repository,
            ErrorDetail::Repository(err),
        )
    }
}

impl From<CollectionError> for DomainError {
    fn from(err: CollectionError) -> Self {
        Self::with_detail(
            err.class(),
            ErrorOrigin::Collection,
            ErrorDetail::Collection(err),
        )
    }
}

impl From<ValueError> for DomainError {
    fn from(err: ValueError) -> Self {
        Self::with_detail(err.class(), ErrorOrigin::Value, ErrorDetail::Value(err))
    }
}

///
/// ErrorClass
/// Error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    NotFound,
    Conflict,
    InvalidInput,
    Unsupported,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::InvalidInput => "invalid_input",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Registry,
    Factory,
    Identity,
    Repository,
    Collection,
    Value,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Registry => "registry",
            Self::Factory => "factory",
            Self::Identity => "identity",
            Self::Repository => "repository",
            Self::Collection => "collection",
            Self::Value => "value",
        };
        write!(f, "{label}")
    }
}
