//! The decoded JSON value tree.

use indexmap::IndexMap;

/// A JSON value.
///
/// Spec: <https://www.json.org/json-en.html>
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// literal characters `null`
    Null,

    /// literal characters `true` or `false`
    Bool(bool),

    /// a number, either integer or floating point
    Number(f64),

    /// a string of characters wrapped in double quotes
    String(String),

    /// an array of values
    Array(Vec<Value>),

    /// an object with key-value pairs, in source order; duplicate keys keep
    /// the first occurrence's position and the last occurrence's value
    Object(IndexMap<String, Value>),
}

impl Value {
    pub fn kind_desc(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}
