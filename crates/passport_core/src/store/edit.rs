//! Edit intents against the two layers.
//!
//! # Responsibility
//! - Describe mutations the edit affordance may request.
//! - Gate each intent on the resolved permission of its layer.
//! - Compute the next root snapshot for an authorized intent.
//!
//! # Invariants
//! - An `AuthorizedEdit` can only be built through `authorize_edit`.
//! - Applying an edit never reshapes a wrong-shaped layer; it fails instead.
//! - Applying to an absent layer creates the layer container.

use crate::layer::LayerKind;
use crate::model::root::{RootSnapshot, StoredValue};
use crate::model::value::{FieldMap, FieldValue};
use crate::policy::LayerPermissions;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type EditResult<T> = Result<T, EditError>;

/// Mutation requested by an editor.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerEdit {
    /// Inserts or replaces a marketing entry; `None` generates a fresh key.
    UpsertMarketingEntry {
        key: Option<String>,
        value: FieldValue,
    },
    RemoveMarketingEntry {
        key: String,
    },
    SetDppField {
        name: String,
        value: FieldValue,
    },
    RemoveDppField {
        name: String,
    },
}

impl LayerEdit {
    /// Layer this edit mutates.
    pub fn layer(&self) -> LayerKind {
        match self {
            Self::UpsertMarketingEntry { .. } | Self::RemoveMarketingEntry { .. } => {
                LayerKind::Marketing
            }
            Self::SetDppField { .. } | Self::RemoveDppField { .. } => LayerKind::Dpp,
        }
    }
}

/// Edit that passed the permission gate, with any generated key filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizedEdit {
    edit: LayerEdit,
}

impl AuthorizedEdit {
    pub fn layer(&self) -> LayerKind {
        self.edit.layer()
    }
}

/// Checks permission and fills in generated keys for one edit intent.
///
/// # Errors
/// - `EditError::PermissionDenied` when the edit's layer is not editable.
/// - `EditError::EmptyKey` when a key or field name is blank.
pub fn authorize_edit(edit: LayerEdit, permissions: &LayerPermissions) -> EditResult<AuthorizedEdit> {
    let layer = edit.layer();
    if !permissions.allows(layer) {
        return Err(EditError::PermissionDenied(layer));
    }

    let edit = match edit {
        LayerEdit::UpsertMarketingEntry { key: None, value } => LayerEdit::UpsertMarketingEntry {
            key: Some(Uuid::new_v4().to_string()),
            value,
        },
        LayerEdit::UpsertMarketingEntry {
            key: Some(key),
            value,
        } => LayerEdit::UpsertMarketingEntry {
            key: Some(check_key(key, layer)?),
            value,
        },
        LayerEdit::RemoveMarketingEntry { key } => LayerEdit::RemoveMarketingEntry {
            key: check_key(key, layer)?,
        },
        LayerEdit::SetDppField { name, value } => LayerEdit::SetDppField {
            name: check_key(name, layer)?,
            value,
        },
        LayerEdit::RemoveDppField { name } => LayerEdit::RemoveDppField {
            name: check_key(name, layer)?,
        },
    };

    Ok(AuthorizedEdit { edit })
}

/// Returns the snapshot that results from applying `edit` to `current`.
///
/// The returned snapshot carries `current.revision + 1`.
pub fn apply_edit(current: &RootSnapshot, edit: &AuthorizedEdit) -> EditResult<RootSnapshot> {
    let mut next = current.clone();
    next.revision = current.revision.saturating_add(1);

    match &edit.edit {
        LayerEdit::UpsertMarketingEntry { key, value } => {
            let key = key.clone().unwrap_or_default();
            let entries = collection_for_write(&mut next.marketing_layer)?;
            entries.insert(key, value.clone());
        }
        LayerEdit::RemoveMarketingEntry { key } => {
            let entries = existing_container(
                &mut next.marketing_layer,
                LayerKind::Marketing,
                key,
            )?;
            remove_existing(entries, LayerKind::Marketing, key)?;
        }
        LayerEdit::SetDppField { name, value } => {
            let fields = object_for_write(&mut next.dpp_layer)?;
            fields.insert(name.clone(), value.clone());
        }
        LayerEdit::RemoveDppField { name } => {
            let fields = existing_container(&mut next.dpp_layer, LayerKind::Dpp, name)?;
            remove_existing(fields, LayerKind::Dpp, name)?;
        }
    }

    Ok(next)
}

/// Keys are opaque: only blank ones are rejected, others pass unchanged.
fn check_key(value: String, layer: LayerKind) -> EditResult<String> {
    if value.trim().is_empty() {
        return Err(EditError::EmptyKey(layer));
    }
    Ok(value)
}

fn collection_for_write(slot: &mut StoredValue) -> EditResult<&mut FieldMap> {
    if slot.is_absent() {
        *slot = StoredValue::Collection(FieldMap::new());
    }
    match slot {
        StoredValue::Collection(entries) => Ok(entries),
        other => Err(EditError::LayerShapeMismatch {
            layer: LayerKind::Marketing,
            found: other.tag(),
        }),
    }
}

fn object_for_write(slot: &mut StoredValue) -> EditResult<&mut FieldMap> {
    if slot.is_absent() {
        *slot = StoredValue::Object(FieldMap::new());
    }
    match slot {
        StoredValue::Object(fields) => Ok(fields),
        other => Err(EditError::LayerShapeMismatch {
            layer: LayerKind::Dpp,
            found: other.tag(),
        }),
    }
}

fn existing_container<'a>(
    slot: &'a mut StoredValue,
    layer: LayerKind,
    key: &str,
) -> EditResult<&'a mut FieldMap> {
    match (layer, slot) {
        (_, StoredValue::Absent) => Err(EditError::EntryNotFound {
            layer,
            key: key.to_string(),
        }),
        (LayerKind::Marketing, StoredValue::Collection(entries)) => Ok(entries),
        (LayerKind::Dpp, StoredValue::Object(fields)) => Ok(fields),
        (_, other) => Err(EditError::LayerShapeMismatch {
            layer,
            found: other.tag(),
        }),
    }
}

fn remove_existing(map: &mut FieldMap, layer: LayerKind, key: &str) -> EditResult<()> {
    // shift_remove keeps the display order of the remaining entries.
    match map.shift_remove(key) {
        Some(_) => Ok(()),
        None => Err(EditError::EntryNotFound {
            layer,
            key: key.to_string(),
        }),
    }
}

/// Edit gate and apply errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// The viewer may not edit this layer.
    PermissionDenied(LayerKind),
    /// Identity is still loading; permissions cannot be resolved yet.
    IdentityPending,
    EmptyKey(LayerKind),
    /// Stored layer has a shape edits cannot target.
    LayerShapeMismatch {
        layer: LayerKind,
        found: &'static str,
    },
    EntryNotFound {
        layer: LayerKind,
        key: String,
    },
}

impl Display for EditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied(layer) => write!(f, "edit permission denied for layer: {layer}"),
            Self::IdentityPending => write!(f, "viewer identity is not resolved yet"),
            Self::EmptyKey(layer) => write!(f, "entry key must not be empty for layer: {layer}"),
            Self::LayerShapeMismatch { layer, found } => {
                write!(f, "layer `{layer}` has unexpected stored shape: {found}")
            }
            Self::EntryNotFound { layer, key } => {
                write!(f, "entry not found in layer `{layer}`: {key}")
            }
        }
    }
}

impl Error for EditError {}
