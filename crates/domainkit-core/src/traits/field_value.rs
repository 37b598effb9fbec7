use crate::{
    traits::DomainObject,
    types::{Identifier, Instance},
    value::{Context, Value},
};
use std::rc::Rc;

///
/// FieldValue
///
/// Conversion boundary between typed fields and loosely-typed values.
/// Constructors use `from_value` to read their arguments; objects use
/// `to_value` to expose fields to stores and filters.
///

pub trait FieldValue {
    fn to_value(&self) -> Value;

    #[must_use]
    fn from_value(value: &Value) -> Option<Self>
    where
        Self: Sized;
}

impl FieldValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FieldValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FieldValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl FieldValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    #[allow(clippy::cast_precision_loss)]
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as Self),
            Value::Uint(v) => Some(*v as Self),
            _ => None,
        }
    }
}

impl FieldValue for Identifier {
    fn to_value(&self) -> Value {
        Value::Identifier(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_identifier().cloned()
    }
}

impl FieldValue for Instance {
    fn to_value(&self) -> Value {
        Value::Object(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(instance) => Some(instance.clone()),
            _ => None,
        }
    }
}

impl FieldValue for Context {
    fn to_value(&self) -> Value {
        Value::Map(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Map(ctx) => Some(ctx.clone()),
            Value::Null => Some(Self::new()),
            _ => None,
        }
    }
}

// Shared handle to a constructed object of a known type.
impl<T: DomainObject> FieldValue for Rc<T> {
    fn to_value(&self) -> Value {
        Value::Object(Instance::from_rc(Self::clone(self)))
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(instance) => instance.clone().downcast::<T>().ok(),
            _ => None,
        }
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        if value.is_null() {
            return Some(None);
        }

        T::from_value(value).map(Some)
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldValue::to_value).collect())
    }

    fn from_value(value: &Value) -> Option<Self> {
        let Value::List(items) = value else {
            return None;
        };

        let mut out = Self::with_capacity(items.len());
        for item in items {
            out.push(T::from_value(item)?);
        }

        Some(out)
    }
}

// impl_field_value
// Integers accept either signed or unsigned input when the value fits.
macro_rules! impl_field_value {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl FieldValue for $type {
                fn to_value(&self) -> Value {
                    Value::$variant((*self).into())
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::Int(v) => (*v).try_into().ok(),
                        Value::Uint(v) => (*v).try_into().ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_field_value!(
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Uint,
    u16 => Uint,
    u32 => Uint,
    u64 => Uint,
);
