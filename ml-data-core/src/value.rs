//! Structured data records flowing through a pipeline
//!
//! A [`Value`] is the unit a transformation receives and returns. Multi-component
//! datasets (for example parallel source/target text) carry a [`Value::List`] with
//! one entry per component, and most transformations produce a [`Value::Map`]
//! of named fields.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single data record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing value
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// Signed integer value
    Int(i64),

    /// Floating point value
    Float(f64),

    /// UTF-8 string value
    String(String),

    /// Ordered sequence, used for tuples of components
    List(Vec<Value>),

    /// Named fields
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Name of the variant, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the `index`-th element of a list value
    pub fn get(&self, index: usize) -> Result<&Value> {
        let items = self.as_list()?;
        items
            .get(index)
            .ok_or_else(|| Error::out_of_bounds(index, items.len()))
    }

    /// Get a named field of a map value
    pub fn field(&self, name: &str) -> Result<&Value> {
        self.as_map()?
            .get(name)
            .ok_or_else(|| Error::KeyNotFound(name.to_string()))
    }

    /// Borrow the elements of a list value
    pub fn as_list(&self) -> Result<&[Value]> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(Error::TypeMismatch(format!(
                "expected list, got {}",
                other.type_name()
            ))),
        }
    }

    /// Take the elements of a list value
    pub fn into_list(self) -> Result<Vec<Value>> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(Error::TypeMismatch(format!(
                "expected list, got {}",
                other.type_name()
            ))),
        }
    }

    /// Borrow the fields of a map value
    pub fn as_map(&self) -> Result<&BTreeMap<String, Value>> {
        match self {
            Value::Map(fields) => Ok(fields),
            other => Err(Error::TypeMismatch(format!(
                "expected map, got {}",
                other.type_name()
            ))),
        }
    }

    /// Take the fields of a map value
    pub fn into_map(self) -> Result<BTreeMap<String, Value>> {
        match self {
            Value::Map(fields) => Ok(fields),
            other => Err(Error::TypeMismatch(format!(
                "expected map, got {}",
                other.type_name()
            ))),
        }
    }

    /// Get the integer payload, if any
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the string payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{self:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                // u64 beyond i64::MAX and real numbers both land here
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => {
                Value::Map(fields.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn test_from_json() {
        let value = Value::from(json!({
            "ids": [1, 2, 3],
            "text": "hello",
            "score": 0.5,
            "mask": null
        }));

        let fields = value.as_map().unwrap();
        assert_eq!(fields.len(), 4);
        assert_eq!(
            fields["ids"],
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert_eq!(fields["text"], Value::from("hello"));
        assert_eq!(fields["score"], Value::Float(0.5));
        assert!(fields["mask"].is_null());
    }

    #[test]
    fn test_serde_roundtrip_untagged() {
        let value: Value = [("id", Value::Int(7)), ("name", Value::from("x"))]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"id":7,"name":"x"}"#);

        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    #[test_case(Value::Null, "null")]
    #[test_case(Value::Bool(true), "bool")]
    #[test_case(Value::Int(1), "int")]
    #[test_case(Value::Float(1.5), "float")]
    #[test_case(Value::from("s"), "string")]
    #[test_case(Value::List(vec![]), "list")]
    #[test_case(Value::Map(BTreeMap::new()), "map")]
    fn test_type_name(value: Value, expected: &str) {
        assert_eq!(value.type_name(), expected);
    }

    #[test]
    fn test_list_access() {
        let value = Value::List(vec![Value::Int(1), Value::from("a")]);
        assert_eq!(value.get(1).unwrap().as_str(), Some("a"));
        assert!(matches!(
            value.get(2),
            Err(Error::IndexOutOfBounds { index: 2, len: 2 })
        ));
        assert!(matches!(Value::Int(1).get(0), Err(Error::TypeMismatch(_))));
    }

    #[test]
    fn test_map_access() {
        let value: Value = [("a", 1)].into_iter().collect();
        assert_eq!(value.field("a").unwrap().as_i64(), Some(1));
        assert!(matches!(value.field("b"), Err(Error::KeyNotFound(_))));
        assert!(matches!(
            Value::Null.into_map(),
            Err(Error::TypeMismatch(_))
        ));
    }
}
