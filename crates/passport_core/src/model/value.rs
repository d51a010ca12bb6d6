//! Schema-less field values stored inside layers.
//!
//! # Responsibility
//! - Represent arbitrary structured content as a closed set of tagged values.
//! - Convert losslessly to and from JSON for display and host exchange.
//!
//! # Invariants
//! - `FieldMap` preserves insertion order.
//! - Numbers keep their JSON representation (`12` stays `12`, `12.4` stays `12.4`).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Ordered mapping from field name to value.
pub type FieldMap = IndexMap<String, FieldValue>;

/// One structured value stored in a layer.
///
/// Serialized untagged so the JSON form is the plain value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    List(Vec<FieldValue>),
    Map(FieldMap),
}

impl FieldValue {
    /// Builds a text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Builds a number value; returns `Null` for NaN/infinite input.
    pub fn number(value: f64) -> Self {
        Number::from_f64(value).map_or(Self::Null, Self::Number)
    }

    /// Returns the JSON form of this value.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(value) => Value::Bool(*value),
            Self::Number(value) => Value::Number(value.clone()),
            Self::Text(value) => Value::String(value.clone()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(fields) => Value::Object(field_map_to_json(fields)),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(value) => Self::Bool(value),
            Value::Number(value) => Self::Number(value),
            Value::String(value) => Self::Text(value),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(fields) => Self::Map(field_map_from_json(fields)),
        }
    }
}

/// Converts a JSON object into an ordered field map.
pub fn field_map_from_json(fields: Map<String, Value>) -> FieldMap {
    fields
        .into_iter()
        .map(|(name, value)| (name, FieldValue::from(value)))
        .collect()
}

/// Converts an ordered field map into a JSON object, keeping order.
pub fn field_map_to_json(fields: &FieldMap) -> Map<String, Value> {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect()
}
