//! Attribute-value storage slots.
//!
//! An attribute value keeps its payload in one of several typed columns so
//! a row store can index each primitive type separately. Only primitive
//! runtime types have a column; everything else is rejected up front.

use crate::{
    error::DomainError,
    value::{Value, ValueError},
};
use sha2::{Digest, Sha256};

const CHECKSUM_DOMAIN_TAG: &[u8] = b"domainkit:attribute-value:v1";

///
/// AttributeValue
///
/// Typed-slot holder for a single primitive value.
/// At most one slot is set; all empty means `Null`.
///

#[derive(Clone, Debug, PartialEq)]
pub struct AttributeValue {
    bool_value: Option<bool>,
    int_value: Option<i64>,
    float_value: Option<f64>,
    text_value: Option<String>,
    checksum: [u8; 32],
}

impl AttributeValue {
    pub fn new(value: impl Into<Value>) -> Result<Self, DomainError> {
        let mut attribute = Self {
            bool_value: None,
            int_value: None,
            float_value: None,
            text_value: None,
            checksum: checksum(&Value::Null),
        };
        attribute.change_value(value)?;

        Ok(attribute)
    }

    /// Replace the stored value.
    ///
    /// On error the previous value is kept.
    pub fn change_value(&mut self, value: impl Into<Value>) -> Result<(), DomainError> {
        let value = value.into();
        let slots = Slots::split(&value)?;

        self.bool_value = slots.bool_value;
        self.int_value = slots.int_value;
        self.float_value = slots.float_value;
        self.text_value = slots.text_value;
        self.checksum = checksum(&self.value());

        Ok(())
    }

    /// Stored value, read back from whichever slot is set.
    #[must_use]
    pub fn value(&self) -> Value {
        self.bool_value
            .map(Value::Bool)
            .or_else(|| self.int_value.map(Value::Int))
            .or_else(|| self.float_value.map(Value::Float))
            .or_else(|| self.text_value.clone().map(Value::Text))
            .unwrap_or_default()
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.bool_value.is_none()
            && self.int_value.is_none()
            && self.float_value.is_none()
            && self.text_value.is_none()
    }

    #[must_use]
    pub const fn bool_value(&self) -> Option<bool> {
        self.bool_value
    }

    #[must_use]
    pub const fn int_value(&self) -> Option<i64> {
        self.int_value
    }

    #[must_use]
    pub const fn float_value(&self) -> Option<f64> {
        self.float_value
    }

    #[must_use]
    pub fn text_value(&self) -> Option<&str> {
        self.text_value.as_deref()
    }

    /// SHA-256 over the value's type label and canonical bytes.
    #[must_use]
    pub const fn checksum(&self) -> [u8; 32] {
        self.checksum
    }
}

#[derive(Default)]
struct Slots {
    bool_value: Option<bool>,
    int_value: Option<i64>,
    float_value: Option<f64>,
    text_value: Option<String>,
}

impl Slots {
    fn split(value: &Value) -> Result<Self, ValueError> {
        let mut slots = Self::default();
        match value {
            Value::Null => {}
            Value::Bool(v) => slots.bool_value = Some(*v),
            Value::Int(v) => slots.int_value = Some(*v),
            Value::Uint(v) => {
                let int = i64::try_from(*v).map_err(|_| ValueError::unsupported(value))?;
                slots.int_value = Some(int);
            }
            Value::Float(v) => slots.float_value = Some(*v),
            Value::Text(v) => slots.text_value = Some(v.clone()),
            other => return Err(ValueError::unsupported(other)),
        }

        Ok(slots)
    }
}

fn checksum(value: &Value) -> [u8; 32] {
    let (label, bytes): (&[u8], Vec<u8>) = match value {
        Value::Bool(v) => (b"bool", vec![u8::from(*v)]),
        Value::Int(v) => (b"int", v.to_be_bytes().to_vec()),
        Value::Float(v) => (b"float", v.to_bits().to_be_bytes().to_vec()),
        Value::Text(v) => (b"text", v.as_bytes().to_vec()),
        _ => (b"null", Vec::new()),
    };

    let mut hasher = Sha256::new();
    hasher.update(CHECKSUM_DOMAIN_TAG);
    write_framed(&mut hasher, label);
    write_framed(&mut hasher, &bytes);

    hasher.finalize().into()
}

fn write_framed(hasher: &mut Sha256, bytes: &[u8]) {
    let len = u32::try_from(bytes.len()).unwrap_or(u32::MAX);
    hasher.update(len.to_be_bytes());
    hasher.update(bytes);
}
