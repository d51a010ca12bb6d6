//! Layer renderers.
//!
//! # Responsibility
//! - Map `(RenderState, can_edit)` to a framework-neutral `LayerView`.
//! - Own the fixed placeholder texts of both layers.
//!
//! # Invariants
//! - `Absent` never shows the editor region, whatever the permission.
//! - `EmptyPresent` shows the editor only when `RenderOptions` opts in.
//! - Rendering never fails; an unserializable payload falls back to the
//!   absent placeholder.

use crate::layer::{LayerKind, RenderState};
use crate::model::root::MarketingEntry;
use crate::model::value::FieldMap;
use serde::{Deserialize, Serialize};

/// Marketing layer placeholder when the layer is missing or wrong-shaped.
pub const MARKETING_ABSENT_TEXT: &str = "Marketing layer - Marketing team can add content here";
/// Marketing layer placeholder when the collection exists but is empty.
pub const MARKETING_EMPTY_TEXT: &str = "Marketing layer - Add content here";
/// DPP layer placeholder when the layer is missing or wrong-shaped.
pub const DPP_ABSENT_TEXT: &str = "DPP Layer - Digital Product Passport data will appear here";
/// DPP layer placeholder when the object exists but has no fields.
pub const DPP_EMPTY_TEXT: &str = "DPP Layer - Load or create DPP data";
/// Heading shown above populated passport data.
pub const DPP_HEADING: &str = "Digital Product Passport";

/// Presentation switches shared by both renderers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Surface the editor region for present-but-empty layers.
    ///
    /// Off by default: the editor is only offered once content exists.
    pub editor_on_empty_layer: bool,
}

/// Framework-neutral presentation of one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerView {
    pub layer: LayerKind,
    pub z_index: u8,
    /// Render-state label (`absent|empty_present|populated`).
    pub state: &'static str,
    pub body: LayerBody,
    /// Whether the edit affordance region is exposed.
    pub editor_visible: bool,
}

/// Visible content of one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerBody {
    Placeholder { text: &'static str },
    MarketingItems { items: Vec<RenderedItem> },
    PassportData { heading: &'static str, pretty: String },
}

/// One marketing entry rendered as compact JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedItem {
    pub key: String,
    pub text: String,
}

/// Renders the marketing layer.
pub fn render_marketing(
    state: &RenderState<Vec<MarketingEntry>>,
    can_edit: bool,
    options: RenderOptions,
) -> LayerView {
    match state {
        RenderState::Absent => absent_view(LayerKind::Marketing, MARKETING_ABSENT_TEXT),
        RenderState::EmptyPresent => empty_view(
            LayerKind::Marketing,
            MARKETING_EMPTY_TEXT,
            can_edit && options.editor_on_empty_layer,
        ),
        RenderState::Populated(entries) => {
            let items = entries
                .iter()
                .map(|entry| {
                    serde_json::to_string(&entry.value).map(|text| RenderedItem {
                        key: entry.key.clone(),
                        text,
                    })
                })
                .collect::<Result<Vec<_>, _>>();
            match items {
                Ok(items) => LayerView {
                    layer: LayerKind::Marketing,
                    z_index: LayerKind::Marketing.z_index(),
                    state: state.label(),
                    body: LayerBody::MarketingItems { items },
                    editor_visible: can_edit,
                },
                Err(_) => absent_view(LayerKind::Marketing, MARKETING_ABSENT_TEXT),
            }
        }
    }
}

/// Renders the DPP layer.
pub fn render_dpp(state: &RenderState<FieldMap>, can_edit: bool, options: RenderOptions) -> LayerView {
    match state {
        RenderState::Absent => absent_view(LayerKind::Dpp, DPP_ABSENT_TEXT),
        RenderState::EmptyPresent => empty_view(
            LayerKind::Dpp,
            DPP_EMPTY_TEXT,
            can_edit && options.editor_on_empty_layer,
        ),
        RenderState::Populated(fields) => match serde_json::to_string_pretty(fields) {
            Ok(pretty) => LayerView {
                layer: LayerKind::Dpp,
                z_index: LayerKind::Dpp.z_index(),
                state: state.label(),
                body: LayerBody::PassportData {
                    heading: DPP_HEADING,
                    pretty,
                },
                editor_visible: can_edit,
            },
            Err(_) => absent_view(LayerKind::Dpp, DPP_ABSENT_TEXT),
        },
    }
}

fn absent_view(layer: LayerKind, text: &'static str) -> LayerView {
    LayerView {
        layer,
        z_index: layer.z_index(),
        state: "absent",
        body: LayerBody::Placeholder { text },
        editor_visible: false,
    }
}

fn empty_view(layer: LayerKind, text: &'static str, editor_visible: bool) -> LayerView {
    LayerView {
        layer,
        z_index: layer.z_index(),
        state: "empty_present",
        body: LayerBody::Placeholder { text },
        editor_visible,
    }
}
