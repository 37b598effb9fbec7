use crate::value::{Context, Value};
use serde_json::Value as JsonValue;

// JSON payloads are the most common loosely-typed construction input.
impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Self::Uint(u)
                } else {
                    n.as_f64().map_or(Self::Null, Self::Float)
                }
            }
            JsonValue::String(s) => Self::Text(s),
            JsonValue::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            JsonValue::Object(map) => Self::Map(map.into_iter().collect()),
        }
    }
}

impl Context {
    /// Build a context from a JSON object; any other JSON shape yields `None`.
    #[must_use]
    pub fn from_json(json: JsonValue) -> Option<Self> {
        match Value::from(json) {
            Value::Map(ctx) => Some(ctx),
            _ => None,
        }
    }
}
