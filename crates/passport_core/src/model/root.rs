//! Shared root snapshot and the tagged storage boundary.
//!
//! # Responsibility
//! - Describe the two named root entries of a room (`marketingLayer`, `dppLayer`).
//! - Decode host-provided snapshots into tagged `StoredValue`s.
//!
//! # Invariants
//! - Decoding one root entry never fails the whole snapshot: an entry that is
//!   not a well-formed tagged value is kept as `StoredValue::Malformed`.
//! - A missing root entry decodes as `StoredValue::Absent`.

use crate::model::value::{FieldMap, FieldValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Root entry name of the marketing layer.
pub const MARKETING_LAYER_KEY: &str = "marketingLayer";
/// Root entry name of the DPP layer.
pub const DPP_LAYER_KEY: &str = "dppLayer";
/// Root entry name carrying the store revision counter.
pub const REVISION_KEY: &str = "revision";

/// Runtime shape of one root entry as reported by the document store.
///
/// Wire form: `{"tag": "collection" | "object" | "absent" | "malformed", "value": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", content = "value", rename_all = "snake_case")]
pub enum StoredValue {
    /// Replicated keyed collection; entry order is insertion order.
    Collection(FieldMap),
    /// Replicated structured object.
    Object(FieldMap),
    /// No entry under this root key.
    #[default]
    Absent,
    /// Entry exists but has no container shape the store could identify.
    Malformed(Value),
}

impl StoredValue {
    /// Decodes one tagged wire value, keeping undecodable input as `Malformed`.
    pub fn from_wire(raw: Value) -> Self {
        match serde_json::from_value::<StoredValue>(raw.clone()) {
            Ok(value) => value,
            Err(_) => Self::Malformed(raw),
        }
    }

    /// Stable tag name, mainly for diagnostics.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Collection(_) => "collection",
            Self::Object(_) => "object",
            Self::Absent => "absent",
            Self::Malformed(_) => "malformed",
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// One keyed-collection entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketingEntry {
    pub key: String,
    pub value: FieldValue,
}

/// Atomic read of one room's shared root.
///
/// All render state must be derived from one `RootSnapshot` value; callers
/// never combine fields from two different snapshots.
///
/// Deserializing goes through `from_value`, so serde callers get the same
/// per-entry tolerance as `from_json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct RootSnapshot {
    /// Monotonic store revision; `0` for a fresh or host-provided snapshot.
    pub revision: u64,
    #[serde(rename = "marketingLayer")]
    pub marketing_layer: StoredValue,
    #[serde(rename = "dppLayer")]
    pub dpp_layer: StoredValue,
}

impl TryFrom<Value> for RootSnapshot {
    type Error = SnapshotError;

    fn try_from(raw: Value) -> Result<Self, Self::Error> {
        Self::from_value(raw)
    }
}

impl RootSnapshot {
    /// Creates an empty root where both layers are absent.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decodes a host-provided JSON snapshot.
    ///
    /// # Errors
    /// - Returns `SnapshotError::InvalidJson` when the input is not JSON.
    /// - Returns `SnapshotError::NotAnObject` when the root is not a JSON object.
    ///
    /// Individual layer entries never cause an error; see `StoredValue::from_wire`.
    pub fn from_json(input: &str) -> Result<Self, SnapshotError> {
        let raw: Value = serde_json::from_str(input)
            .map_err(|err| SnapshotError::InvalidJson(err.to_string()))?;
        Self::from_value(raw)
    }

    /// Decodes a JSON value already parsed by the caller.
    pub fn from_value(raw: Value) -> Result<Self, SnapshotError> {
        let kind = json_kind(&raw);
        let Value::Object(mut root) = raw else {
            return Err(SnapshotError::NotAnObject(kind));
        };

        let revision = root
            .get(REVISION_KEY)
            .and_then(Value::as_u64)
            .unwrap_or_default();
        let marketing_layer = root
            .remove(MARKETING_LAYER_KEY)
            .map_or(StoredValue::Absent, StoredValue::from_wire);
        let dpp_layer = root
            .remove(DPP_LAYER_KEY)
            .map_or(StoredValue::Absent, StoredValue::from_wire);

        Ok(Self {
            revision,
            marketing_layer,
            dpp_layer,
        })
    }
}

/// Snapshot decoding errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    InvalidJson(String),
    NotAnObject(&'static str),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson(details) => write!(f, "snapshot is not valid json: {details}"),
            Self::NotAnObject(kind) => {
                write!(f, "snapshot root must be a json object, got {kind}")
            }
        }
    }
}

impl Error for SnapshotError {}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::{RootSnapshot, SnapshotError, StoredValue};
    use serde_json::json;

    #[test]
    fn missing_entries_decode_as_absent() {
        let snapshot = RootSnapshot::from_value(json!({})).expect("empty root should decode");
        assert_eq!(snapshot, RootSnapshot::empty());
    }

    #[test]
    fn unknown_tag_is_kept_as_malformed() {
        let raw = json!({"tag": "live_list", "value": [1, 2]});
        assert_eq!(StoredValue::from_wire(raw.clone()), StoredValue::Malformed(raw));
    }

    #[test]
    fn untagged_plain_object_is_malformed() {
        let raw = json!({"k1": {"text": "Hello"}});
        assert!(matches!(
            StoredValue::from_wire(raw),
            StoredValue::Malformed(_)
        ));
    }

    #[test]
    fn absent_tag_needs_no_value() {
        assert_eq!(
            StoredValue::from_wire(json!({"tag": "absent"})),
            StoredValue::Absent
        );
    }

    #[test]
    fn rejects_non_object_root() {
        let err = RootSnapshot::from_json("[1,2]").expect_err("array root must fail");
        assert_eq!(err, SnapshotError::NotAnObject("array"));
    }

    #[test]
    fn serde_decoding_keeps_untagged_layer_as_malformed() {
        let snapshot: RootSnapshot = serde_json::from_str(
            r#"{"marketingLayer":{"k1":{"text":"Hello"}},"dppLayer":{"tag":"object","value":{}}}"#,
        )
        .expect("one bad layer must not reject the snapshot");
        assert!(matches!(snapshot.marketing_layer, StoredValue::Malformed(_)));
        assert_eq!(snapshot.dpp_layer, StoredValue::Object(Default::default()));
    }

    #[test]
    fn reads_revision_when_present() {
        let snapshot = RootSnapshot::from_value(json!({"revision": 7}))
            .expect("root with revision should decode");
        assert_eq!(snapshot.revision, 7);
    }
}
