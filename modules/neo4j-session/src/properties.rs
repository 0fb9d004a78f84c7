use std::collections::BTreeMap;

use neo4rs::{BoltBoolean, BoltFloat, BoltInteger, BoltMap, BoltString, BoltType};
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// Scalar node property. Nested lists/maps are out of scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl PropertyValue {
    pub fn to_bolt(&self) -> BoltType {
        match self {
            PropertyValue::Boolean(b) => BoltType::Boolean(BoltBoolean::new(*b)),
            PropertyValue::Integer(i) => BoltType::Integer(BoltInteger::new(*i)),
            PropertyValue::Float(f) => BoltType::Float(BoltFloat::new(*f)),
            PropertyValue::String(s) => BoltType::String(BoltString::from(s.as_str())),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Integer(i)
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        PropertyValue::Integer(i as i64)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Boolean(b)
    }
}

/// Property map for a node descriptor. Ordered so generated WHERE clauses are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, PropertyValue>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert: `Properties::new().with("name", "Alice").with("age", 30)`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// The whole map as a single Bolt map parameter.
    pub fn to_bolt(&self) -> BoltType {
        BoltType::Map(BoltMap::from_iter(
            self.0
                .iter()
                .map(|(k, v)| (BoltString::from(k.as_str()), v.to_bolt())),
        ))
    }

    /// Build from a JSON object of scalars, e.g. `{"name": "Alice", "age": 30}`.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let Some(object) = value.as_object() else {
            return Err(GraphError::Decode(format!(
                "properties must be a JSON object, got {value}"
            )));
        };
        // Untagged decoding would quietly turn these into lossy floats.
        for (key, v) in object {
            if let serde_json::Value::Number(n) = v {
                if n.is_u64() && n.as_i64().is_none() {
                    return Err(GraphError::Decode(format!(
                        "property {key:?}: integer {n} does not fit in i64"
                    )));
                }
            }
        }
        serde_json::from_value(value).map_err(|e| GraphError::Decode(e.to_string()))
    }
}

impl<K, V> FromIterator<(K, V)> for Properties
where
    K: Into<String>,
    V: Into<PropertyValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
