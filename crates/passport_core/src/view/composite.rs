//! Composite passport view.
//!
//! # Invariants
//! - Holds no state; output depends only on the inputs of one call.
//! - `Suspended` while identity is pending; partial permission states are
//!   never rendered.
//! - Layers are always ordered marketing (background) then DPP (foreground).

use crate::layer::reconcile::reconcile_root;
use crate::layer::render::{render_dpp, render_marketing, LayerView, RenderOptions};
use crate::model::root::RootSnapshot;
use crate::policy::{ExplicitGrants, LayerPermissions, PermissionPolicy};
use crate::session::identity::IdentityState;
use serde::Serialize;

/// Inputs that stay fixed for the lifetime of one mounted view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassportConfig {
    pub grants: ExplicitGrants,
    pub policy: PermissionPolicy,
    pub options: RenderOptions,
}

impl PassportConfig {
    pub fn with_grants(grants: ExplicitGrants) -> Self {
        Self {
            grants,
            ..Self::default()
        }
    }
}

/// Both layers rendered from one snapshot with resolved permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedPassport {
    pub revision: u64,
    pub identity_label: Option<String>,
    pub permissions: LayerPermissions,
    /// Bottom-to-top: `[marketing, dpp]`.
    pub layers: [LayerView; 2],
}

impl ComposedPassport {
    pub fn marketing(&self) -> &LayerView {
        &self.layers[0]
    }

    pub fn dpp(&self) -> &LayerView {
        &self.layers[1]
    }
}

/// Output of the composite view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PassportView {
    Suspended,
    Resolved(ComposedPassport),
}

impl PassportView {
    pub fn resolved(&self) -> Option<&ComposedPassport> {
        match self {
            Self::Resolved(passport) => Some(passport),
            Self::Suspended => None,
        }
    }
}

/// Composes the passport view from one snapshot and the current identity.
pub fn compose_passport(
    snapshot: &RootSnapshot,
    identity: &IdentityState,
    config: &PassportConfig,
) -> PassportView {
    if identity.is_pending() {
        return PassportView::Suspended;
    }

    let identity_label = identity.label();
    let permissions = config.policy.resolve(config.grants, identity_label);
    let states = reconcile_root(snapshot);

    PassportView::Resolved(ComposedPassport {
        revision: snapshot.revision,
        identity_label: identity_label.map(str::to_string),
        permissions,
        layers: [
            render_marketing(&states.marketing, permissions.marketing, config.options),
            render_dpp(&states.dpp, permissions.dpp, config.options),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::{compose_passport, PassportConfig, PassportView};
    use crate::layer::LayerKind;
    use crate::model::root::RootSnapshot;
    use crate::session::identity::IdentityState;

    #[test]
    fn pending_identity_suspends() {
        let view = compose_passport(
            &RootSnapshot::empty(),
            &IdentityState::Pending,
            &PassportConfig::default(),
        );
        assert_eq!(view, PassportView::Suspended);
    }

    #[test]
    fn layers_are_stacked_marketing_first() {
        let view = compose_passport(
            &RootSnapshot::empty(),
            &IdentityState::anonymous(),
            &PassportConfig::default(),
        );
        let passport = view.resolved().expect("anonymous identity resolves");
        assert_eq!(passport.marketing().layer, LayerKind::Marketing);
        assert_eq!(passport.dpp().layer, LayerKind::Dpp);
        assert!(passport.marketing().z_index < passport.dpp().z_index);
    }
}
