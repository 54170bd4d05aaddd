//! Opaque parameter bags passed between legacy clients and the session
//!
//! An `Extras` bag is a string-keyed map of loosely typed values. Readers
//! distinguish a missing key (`Ok(None)`) from a key holding the wrong type
//! (`Err(ExtrasError::TypeMismatch)`), which is how a malformed legacy bundle
//! is detected.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ExtrasError;

/// String-keyed bag of loosely typed values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Extras(Map<String, Value>);

impl Extras {
    /// Create an empty bag
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert a raw value
    pub fn put(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn put_bool(&mut self, key: impl Into<String>, value: bool) {
        self.put(key, Value::Bool(value));
    }

    pub fn put_int(&mut self, key: impl Into<String>, value: i32) {
        self.put(key, Value::from(value));
    }

    pub fn put_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.put(key, Value::String(value.into()));
    }

    /// Builder-style [`put_bool`](Self::put_bool)
    pub fn with_bool(mut self, key: impl Into<String>, value: bool) -> Self {
        self.put_bool(key, value);
        self
    }

    /// Builder-style [`put_int`](Self::put_int)
    pub fn with_int(mut self, key: impl Into<String>, value: i32) -> Self {
        self.put_int(key, value);
        self
    }

    /// Builder-style [`put_string`](Self::put_string)
    pub fn with_string(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.put_string(key, value);
        self
    }

    /// Builder-style raw insert
    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.put(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Read a boolean, `Ok(None)` when absent
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ExtrasError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(value)) => Ok(Some(*value)),
            Some(_) => Err(mismatch(key, "bool")),
        }
    }

    /// Read a 32-bit integer, `Ok(None)` when absent
    ///
    /// Numbers outside the `i32` range count as a type mismatch.
    pub fn get_int(&self, key: &str) -> Result<Option<i32>, ExtrasError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(number)) => number
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| mismatch(key, "int")),
            Some(_) => Err(mismatch(key, "int")),
        }
    }

    /// Read a 32-bit integer, falling back to `default` when absent
    pub fn get_int_or(&self, key: &str, default: i32) -> Result<i32, ExtrasError> {
        Ok(self.get_int(key)?.unwrap_or(default))
    }

    /// Read a string slice, `Ok(None)` when absent
    pub fn get_string(&self, key: &str) -> Result<Option<&str>, ExtrasError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.as_str())),
            Some(_) => Err(mismatch(key, "string")),
        }
    }

    /// Copy every entry of `other` into this bag, overwriting duplicates
    pub fn merge(&mut self, other: &Extras) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

fn mismatch(key: &str, expected: &'static str) -> ExtrasError {
    ExtrasError::TypeMismatch {
        key: key.to_string(),
        expected,
    }
}

impl From<Map<String, Value>> for Extras {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_key_is_none() {
        let extras = Extras::new();
        assert_eq!(extras.get_int("page"), Ok(None));
        assert_eq!(extras.get_bool("recent"), Ok(None));
        assert_eq!(extras.get_int_or("page", -1), Ok(-1));
    }

    #[test]
    fn test_typed_reads() {
        let extras = Extras::new()
            .with_int("page", 2)
            .with_bool("recent", true)
            .with_string("name", "jazz");

        assert_eq!(extras.get_int("page"), Ok(Some(2)));
        assert_eq!(extras.get_bool("recent"), Ok(Some(true)));
        assert_eq!(extras.get_string("name"), Ok(Some("jazz")));
        assert_eq!(extras.len(), 3);
    }

    #[test]
    fn test_type_mismatch_is_error() {
        let extras = Extras::new()
            .with_string("page", "two")
            .with_value("size", json!(1u64 << 40));

        assert!(matches!(
            extras.get_int("page"),
            Err(ExtrasError::TypeMismatch { .. })
        ));
        // Out of i32 range
        assert!(extras.get_int("size").is_err());
        assert!(extras.get_bool("page").is_err());
    }

    #[test]
    fn test_merge_overwrites() {
        let mut base = Extras::new().with_int("a", 1).with_int("b", 2);
        let other = Extras::new().with_int("b", 3).with_int("c", 4);
        base.merge(&other);

        assert_eq!(base.get_int("a"), Ok(Some(1)));
        assert_eq!(base.get_int("b"), Ok(Some(3)));
        assert_eq!(base.get_int("c"), Ok(Some(4)));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let extras = Extras::new().with_int("page", 1);
        let json = serde_json::to_string(&extras).unwrap();
        assert_eq!(json, r#"{"page":1}"#);
    }
}
