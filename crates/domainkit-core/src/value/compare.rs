use crate::value::Value;

/// Strict equality over canonical values.
///
/// - integers compare numerically across `Int` / `Uint`
/// - identifiers compare by kind and value; empty identifiers equal nothing
/// - objects compare by reference
/// - every other cross-variant pair is unequal (no text/number coercion)
#[must_use]
pub fn canonical_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Int(a), Value::Uint(b)) | (Value::Uint(b), Value::Int(a)) => {
            u64::try_from(*a).is_ok_and(|a| a == *b)
        }
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| canonical_eq(x, y))
        }
        (Value::Map(a), Value::Map(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|((ka, va), (kb, vb))| ka == kb && canonical_eq(va, vb))
        }
        (Value::Identifier(_) | Value::Object(_), Value::Identifier(_) | Value::Object(_)) => {
            match (left.as_identifier(), right.as_identifier()) {
                (Some(a), Some(b)) => a == b,
                (None, None) => left == right,
                _ => false,
            }
        }
        _ => left == right,
    }
}
