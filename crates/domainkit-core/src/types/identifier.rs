use crate::{error::DomainError, identity::IdentityError, value::Value};
use std::fmt;

///
/// IdBacking
///
/// Primitive representation behind an identifier type.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IdBacking {
    Int,
    Text,
}

///
/// IdValue
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum IdValue {
    Int(i64),
    Text(String),
}

impl IdValue {
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(i) => Value::Int(*i),
            Self::Text(s) => Value::Text(s.clone()),
        }
    }
}

///
/// Identifier
///
/// Type-tagged, possibly empty domain identifier.
///
/// An empty identifier means "not yet assigned". It equals nothing,
/// including itself, which is why this type implements `PartialEq` only.
///

#[derive(Clone, Debug)]
pub struct Identifier {
    kind: &'static str,
    value: Option<IdValue>,
}

impl Identifier {
    /// An unassigned identifier of the given kind.
    #[must_use]
    pub const fn empty(kind: &'static str) -> Self {
        Self { kind, value: None }
    }

    #[must_use]
    pub const fn int(kind: &'static str, value: i64) -> Self {
        Self {
            kind,
            value: Some(IdValue::Int(value)),
        }
    }

    /// Text-backed identifier; the empty string is rejected.
    pub fn text(kind: &'static str, value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.is_empty() {
            return Err(IdentityError::EmptyIdentifier { kind }.into());
        }

        Ok(Self {
            kind,
            value: Some(IdValue::Text(value)),
        })
    }

    /// Build an identifier of `kind` from loosely-typed input.
    ///
    /// `Null` yields an empty identifier, an identifier of the same kind is
    /// passed through, and integers are accepted for text-backed kinds.
    pub fn from_value(
        kind: &'static str,
        backing: IdBacking,
        value: &Value,
    ) -> Result<Self, DomainError> {
        if let Some(id) = value.as_identifier() {
            return if id.kind == kind {
                Ok(id.clone())
            } else {
                Err(IdentityError::invalid_value(kind, value).into())
            };
        }

        match (backing, value) {
            (_, Value::Null) => Ok(Self::empty(kind)),
            (IdBacking::Text, Value::Text(s)) => Self::text(kind, s.as_str()),
            (IdBacking::Text, Value::Int(i)) => Self::text(kind, i.to_string()),
            (IdBacking::Text, Value::Uint(u)) => Self::text(kind, u.to_string()),
            (IdBacking::Int, Value::Int(_) | Value::Uint(_)) => value
                .as_int()
                .map(|i| Self::int(kind, i))
                .ok_or_else(|| IdentityError::invalid_value(kind, value).into()),
            _ => Err(IdentityError::invalid_value(kind, value).into()),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    #[must_use]
    pub const fn value(&self) -> Option<&IdValue> {
        self.value.as_ref()
    }

    /// Canonical underlying value; `Null` when empty.
    #[must_use]
    pub fn to_value(&self) -> Value {
        self.value.as_ref().map_or(Value::Null, IdValue::to_value)
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        match (&self.value, &other.value) {
            (Some(a), Some(b)) => self.kind == other.kind && a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(IdValue::Int(i)) => write!(f, "{i}"),
            Some(IdValue::Text(s)) => write!(f, "{s}"),
            None => Ok(()),
        }
    }
}
