//! Stored value -> render state reconciliation.
//!
//! # Invariants
//! - `marketingLayer` is only ever populated from `StoredValue::Collection`.
//! - `dppLayer` is only ever populated from `StoredValue::Object`.
//! - Any other shape yields `RenderState::Absent`.

use crate::layer::RenderState;
use crate::model::root::{MarketingEntry, RootSnapshot, StoredValue};
use crate::model::value::FieldMap;

/// Render states of both layers derived from one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStates {
    pub marketing: RenderState<Vec<MarketingEntry>>,
    pub dpp: RenderState<FieldMap>,
}

/// Reconciles both layers from a single atomic snapshot.
pub fn reconcile_root(snapshot: &RootSnapshot) -> LayerStates {
    LayerStates {
        marketing: reconcile_marketing(&snapshot.marketing_layer),
        dpp: reconcile_dpp(&snapshot.dpp_layer),
    }
}

/// Reconciles the marketing layer.
///
/// A structured object stored where a keyed collection is expected is treated
/// exactly like a missing layer.
pub fn reconcile_marketing(value: &StoredValue) -> RenderState<Vec<MarketingEntry>> {
    match value {
        StoredValue::Collection(entries) if entries.is_empty() => RenderState::EmptyPresent,
        StoredValue::Collection(entries) => RenderState::Populated(
            entries
                .iter()
                .map(|(key, value)| MarketingEntry {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect(),
        ),
        StoredValue::Object(_) | StoredValue::Absent | StoredValue::Malformed(_) => {
            RenderState::Absent
        }
    }
}

/// Reconciles the DPP layer.
pub fn reconcile_dpp(value: &StoredValue) -> RenderState<FieldMap> {
    match value {
        StoredValue::Object(fields) if fields.is_empty() => RenderState::EmptyPresent,
        StoredValue::Object(fields) => RenderState::Populated(fields.clone()),
        StoredValue::Collection(_) | StoredValue::Absent | StoredValue::Malformed(_) => {
            RenderState::Absent
        }
    }
}
