// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Loosely-typed wire values.
//!
//! Topic publications and procedure results arrive as positional (`args`)
//! and keyword (`kwargs`) arguments whose shape is only known by convention.
//! [`Value`] keeps them as a small tagged tree, and [`Fields`] offers
//! fallible extraction that reports *where* a payload deviated from the
//! expected shape.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Positional arguments of a call or publication.
pub type Args = Vec<Value>;

/// Keyword arguments of a call or publication.
pub type Kwargs = BTreeMap<String, Value>;

/// A dynamically-typed wire value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Short name of the variant, used in decode errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers widen to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            // CORRECTNESS: coordinates and headings fit comfortably in f64's mantissa
            #[allow(clippy::cast_precision_loss)]
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key when this value is a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Parse a JSON document into a value.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Serialize the value as compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json() {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "<{}>", self.kind()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

/// Build a [`Value::Map`] from `key => value` pairs.
#[macro_export]
macro_rules! map {
    () => { $crate::Value::Map(::std::collections::BTreeMap::new()) };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = ::std::collections::BTreeMap::new();
        $( map.insert(::std::string::String::from($key), $crate::Value::from($value)); )+
        $crate::Value::Map(map)
    }};
}

/// Fallible field reader over a map-shaped payload.
///
/// Every accessor reports failures with the dotted path of the offending
/// field, e.g. `route.stations[2].stop_code`.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    path: &'a str,
    map: &'a BTreeMap<String, Value>,
}

impl<'a> Fields<'a> {
    /// Open `value` as a map, failing if it has any other shape.
    pub fn new(path: &'a str, value: &'a Value) -> Result<Self, DecodeError> {
        match value {
            Value::Map(map) => Ok(Fields { path, map }),
            other => Err(DecodeError::new(path, "map", other)),
        }
    }

    pub fn path(&self) -> &'a str {
        self.path
    }

    fn child(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        }
    }

    /// The raw value of `key`, treating an explicit `null` as absent.
    pub fn raw(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    pub fn required_str(&self, key: &str) -> Result<String, DecodeError> {
        match self.raw(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(DecodeError::new(self.child(key), "string", other)),
            None => Err(DecodeError::missing(self.child(key), "string")),
        }
    }

    pub fn optional_str(&self, key: &str) -> Result<Option<String>, DecodeError> {
        match self.raw(key) {
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(DecodeError::new(self.child(key), "string", other)),
            None => Ok(None),
        }
    }

    pub fn optional_bool(&self, key: &str) -> Result<Option<bool>, DecodeError> {
        match self.raw(key) {
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(DecodeError::new(self.child(key), "bool", other)),
            None => Ok(None),
        }
    }

    pub fn optional_f64(&self, key: &str) -> Result<Option<f64>, DecodeError> {
        match self.raw(key) {
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| DecodeError::new(self.child(key), "number", value)),
            None => Ok(None),
        }
    }

    pub fn optional_u32(&self, key: &str) -> Result<Option<u32>, DecodeError> {
        match self.raw(key) {
            Some(value) => value
                .as_i64()
                .and_then(|i| u32::try_from(i).ok())
                .map(Some)
                .ok_or_else(|| DecodeError::new(self.child(key), "unsigned integer", value)),
            None => Ok(None),
        }
    }

    /// Decode an optional array, applying `decode` to every element.
    ///
    /// Absent keys yield `Ok(None)`, which callers must keep distinct from
    /// `Ok(Some(vec![]))`.
    pub fn optional_list<T>(
        &self,
        key: &str,
        decode: impl Fn(&str, &Value) -> Result<T, DecodeError>,
    ) -> Result<Option<Vec<T>>, DecodeError> {
        let Some(value) = self.raw(key) else {
            return Ok(None);
        };
        let path = self.child(key);
        decode_list(&path, value, decode).map(Some)
    }

    /// Decode an optional nested value with `decode`.
    pub fn optional_with<T>(
        &self,
        key: &str,
        decode: impl Fn(&str, &Value) -> Result<T, DecodeError>,
    ) -> Result<Option<T>, DecodeError> {
        match self.raw(key) {
            Some(value) => decode(&self.child(key), value).map(Some),
            None => Ok(None),
        }
    }

    /// Decode a required nested value with `decode`.
    pub fn required_with<T>(
        &self,
        key: &str,
        expected: &'static str,
        decode: impl Fn(&str, &Value) -> Result<T, DecodeError>,
    ) -> Result<T, DecodeError> {
        match self.raw(key) {
            Some(value) => decode(&self.child(key), value),
            None => Err(DecodeError::missing(self.child(key), expected)),
        }
    }
}

/// Decode every element of an array-shaped value.
pub fn decode_list<T>(
    path: &str,
    value: &Value,
    decode: impl Fn(&str, &Value) -> Result<T, DecodeError>,
) -> Result<Vec<T>, DecodeError> {
    let items = value
        .as_array()
        .ok_or_else(|| DecodeError::new(path, "array", value))?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| decode(&format!("{}[{}]", path, index), item))
        .collect()
}

/// Decode a bare string value.
pub fn decode_string(path: &str, value: &Value) -> Result<String, DecodeError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| DecodeError::new(path, "string", value))
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
