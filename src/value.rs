//! The `Value` tree produced by [`crate::loads`] and consumed by
//! [`crate::dumps`].

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// An insertion-order-preserving object. Order is observable by the
/// serializer (spec: "insertion order preserved and observable").
pub type Object = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    /// Includes `+inf`, `-inf` and NaN.
    Float(f64),
    String(String),
    List(Vec<Value>),
    Object(Object),
}

impl Value {
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Float(f) if f.is_nan())
    }
}

/// Inserts `key` into `object`, raising `DuplicatedKey` (rather than
/// overwriting) if it is already present. Centralizing this check here
/// keeps the "no duplicate keys, including across import merges"
/// invariant enforced from a single call site.
pub(crate) fn insert_unique(object: &mut Object, key: String, value: Value, line: usize) -> Result<()> {
    if object.contains_key(&key) {
        return Err(Error::DuplicatedKey { key, line });
    }
    object.insert(key, value);
    Ok(())
}

/// Renders `value` the way string interpolation stringifies a referenced
/// variable (spec 4.2): booleans/null/numbers in their canonical text
/// form, strings verbatim; lists and objects are not valid interpolation
/// targets.
pub(crate) fn stringify_for_interpolation(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some("null".to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(crate::serializer::format_float(*f)),
        Value::String(s) => Some(s.clone()),
        Value::List(_) | Value::Object(_) => None,
    }
}
