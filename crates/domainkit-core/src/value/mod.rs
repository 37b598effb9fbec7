mod compare;
mod context;
mod json;


use crate::{
    error::ErrorClass,
    types::{Identifier, Instance},
};
use std::fmt;
use thiserror::Error as ThisError;

// re-exports
pub use compare::canonical_eq;
pub use context::Context;

///
/// ValueError
///
/// Failures raised when a runtime value has no meaning for the consumer
/// it was handed to.
///

#[derive(Debug, ThisError)]
pub enum ValueError {
    #[error("value of type '{type_name}' has no storage representation")]
    UnsupportedValueType { type_name: String },
}

impl ValueError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::UnsupportedValueType { .. } => ErrorClass::Unsupported,
        }
    }

    pub(crate) fn unsupported(value: &Value) -> Self {
        Self::UnsupportedValueType {
            type_name: value.type_name().to_string(),
        }
    }
}

///
/// Value
///
/// Loosely-typed input and field data.
///
/// Null        → absent / SQL NULL; also the canonical form of an empty identifier.
/// Identifier  → a typed domain identifier (possibly empty).
/// Object      → an already-constructed domain object, compared by reference.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
    Identifier(Identifier),
    /// Ordered list of values.
    /// In field filters a list means "any of".
    List(Vec<Self>),
    /// Named values; doubles as a nested construction context.
    Map(Context),
    Object(Instance),
}

impl Value {
    ///
    /// TYPES
    ///

    /// Short runtime type label used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Identifier(id) => id.kind(),
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Object(instance) => instance.path(),
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True for values the factory must not rebuild: constructed objects
    /// and typed identifiers.
    #[must_use]
    pub const fn is_instance(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Identifier(_))
    }

    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Null
                | Self::Bool(_)
                | Self::Int(_)
                | Self::Uint(_)
                | Self::Float(_)
                | Self::Text(_)
        )
    }

    ///
    /// ACCESSORS
    ///

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Uint(u) if *u <= i64::MAX as u64 => Some(*u as i64),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_map(&self) -> Option<&Context> {
        match self {
            Self::Map(ctx) => Some(ctx),
            _ => None,
        }
    }

    /// Typed identifier carried by this value, either directly or through
    /// a constructed identifier object.
    #[must_use]
    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            Self::Identifier(id) => Some(id),
            Self::Object(instance) => instance.as_identifier(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Uint(u) => write!(f, "{u}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "\"{s}\""),
            Self::Identifier(id) => write!(f, "{}(\"{id}\")", id.kind()),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Map(ctx) => write!(f, "{ctx}"),
            Self::Object(instance) => write!(f, "<{}>", instance.path()),
        }
    }
}

///
/// CONVERSIONS
///

macro_rules! impl_value_from {
    ( $( $ty:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_value_from! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Uint,
    u16 => Uint,
    u32 => Uint,
    u64 => Uint,
    f32 => Float,
    f64 => Float,
    String => Text,
    Identifier => Identifier,
    Context => Map,
    Instance => Object,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
