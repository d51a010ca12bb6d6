//! Layer schema, reconciliation and rendering.
//!
//! # Responsibility
//! - Name the two independently permissioned layers of a room.
//! - Reduce a stored layer value to a three-way render state.
//! - Turn a render state plus edit permission into a presentation model.
//!
//! # Invariants
//! - Every function in this module is pure and total: no I/O, no panics.
//! - Malformed shapes degrade to the absent state silently.

pub mod reconcile;
pub mod render;

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One of the two layers composed into a passport view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Brand/marketing content drawn behind the passport data.
    Marketing,
    /// Regulatory Digital Product Passport data drawn on top.
    Dpp,
}

impl LayerKind {
    /// Stable string id used in logs and wire payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Marketing => "marketing",
            Self::Dpp => "dpp",
        }
    }

    /// Fixed stacking position; higher values are drawn on top.
    pub fn z_index(self) -> u8 {
        match self {
            Self::Marketing => 0,
            Self::Dpp => 1,
        }
    }
}

impl Display for LayerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reconciled state of one layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "content", rename_all = "snake_case")]
pub enum RenderState<T> {
    /// No usable value is stored (missing or wrong shape).
    Absent,
    /// A valid container exists but holds nothing yet.
    EmptyPresent,
    /// A valid container with at least one entry.
    Populated(T),
}

impl<T> RenderState<T> {
    /// Short state name for diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::EmptyPresent => "empty_present",
            Self::Populated(_) => "populated",
        }
    }
}
