use crate::{
    error::DomainError,
    factory::FactoryError,
    traits::FieldValue,
    value::Value,
};
use std::{any::type_name, vec};

///
/// Arguments
///
/// Resolved, positional argument list handed to a construction method.
/// Methods consume it in declaration order with `take`.
///

#[derive(Debug)]
pub struct Arguments {
    path: &'static str,
    values: vec::IntoIter<(&'static str, Value)>,
}

impl Arguments {
    #[must_use]
    pub fn new(path: &'static str, values: Vec<(&'static str, Value)>) -> Self {
        Self {
            path,
            values: values.into_iter(),
        }
    }

    /// Path of the type being built.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// Number of arguments not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// Take the next argument as a raw value.
    pub fn take_value(&mut self) -> Result<Value, DomainError> {
        self.values.next().map(|(_, value)| value).ok_or_else(|| {
            DomainError::factory_invariant(format!(
                "construction of '{}' read past its declared arguments",
                self.path
            ))
        })
    }

    /// Take the next argument converted to `T`.
    pub fn take<T: FieldValue>(&mut self) -> Result<T, DomainError> {
        let (name, value) = self.values.next().ok_or_else(|| {
            DomainError::factory_invariant(format!(
                "construction of '{}' read past its declared arguments",
                self.path
            ))
        })?;

        T::from_value(&value).ok_or_else(|| {
            FactoryError::ArgumentMismatch {
                path: self.path.to_string(),
                param: name.to_string(),
                expected: type_name::<T>().to_string(),
                found: value.type_name().to_string(),
            }
            .into()
        })
    }
}
