//! Per-layer edit permission policy.
//!
//! # Responsibility
//! - Resolve `(explicit grant, identity label)` into an edit flag per layer.
//! - Carry the policy as versioned, validated configuration so a rule's mode
//!   can change without touching call sites.
//!
//! # Invariants
//! - Resolution is pure: no I/O, no logging, no clock.
//! - A missing identity label never matches any marker.
//! - An explicit grant always allows editing.

use crate::layer::LayerKind;
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Only supported policy schema version.
pub const POLICY_VERSION_V1: u32 = 1;
/// Identity marker that signals marketing-team membership.
pub const MARKETING_IDENTITY_MARKER: &str = "marketing";
/// Identity marker that signals passport-team membership.
pub const DPP_IDENTITY_MARKER: &str = "dpp";

/// How one layer rule decides when no explicit grant is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyMode {
    /// Allow when the identity label contains the marker (case-insensitive).
    IdentityMarker,
    /// Allow everyone. Placeholder until group-based authorization exists.
    Open,
}

/// Edit rule for one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerRule {
    pub mode: PolicyMode,
    /// Marker searched in the identity label; kept for `Open` rules too so the
    /// mode can be switched back without re-deriving it.
    pub identity_marker: String,
}

impl LayerRule {
    pub fn identity_marker(marker: impl Into<String>) -> Self {
        Self {
            mode: PolicyMode::IdentityMarker,
            identity_marker: marker.into(),
        }
    }

    pub fn open(marker: impl Into<String>) -> Self {
        Self {
            mode: PolicyMode::Open,
            identity_marker: marker.into(),
        }
    }

    /// Returns whether this rule grants edit access.
    pub fn allows(&self, explicit_grant: bool, identity_label: Option<&str>) -> bool {
        if explicit_grant {
            return true;
        }
        let marker_matched = identity_label
            .is_some_and(|label| contains_ignore_case(label, self.identity_marker.as_str()));
        match self.mode {
            PolicyMode::IdentityMarker => marker_matched,
            PolicyMode::Open => true,
        }
    }
}

/// Caller-provided edit grants, one per layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplicitGrants {
    pub marketing_can_edit: bool,
    pub dpp_can_edit: bool,
}

impl ExplicitGrants {
    pub fn for_layer(&self, layer: LayerKind) -> bool {
        match layer {
            LayerKind::Marketing => self.marketing_can_edit,
            LayerKind::Dpp => self.dpp_can_edit,
        }
    }
}

/// Resolved edit flags for both layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LayerPermissions {
    pub marketing: bool,
    pub dpp: bool,
}

impl LayerPermissions {
    pub fn allows(&self, layer: LayerKind) -> bool {
        match layer {
            LayerKind::Marketing => self.marketing,
            LayerKind::Dpp => self.dpp,
        }
    }
}

/// Versioned permission policy for both layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionPolicy {
    pub version: u32,
    pub marketing: LayerRule,
    pub dpp: LayerRule,
}

impl Default for PermissionPolicy {
    /// Current product policy: marketing by identity marker, passport open.
    fn default() -> Self {
        Self {
            version: POLICY_VERSION_V1,
            marketing: LayerRule::identity_marker(MARKETING_IDENTITY_MARKER),
            dpp: LayerRule::open(DPP_IDENTITY_MARKER),
        }
    }
}

impl PermissionPolicy {
    /// Loads and validates a policy from JSON configuration.
    ///
    /// # Errors
    /// - `PolicyError::InvalidJson` when the input does not match the schema.
    /// - Any `validate()` error.
    pub fn from_json(input: &str) -> Result<Self, PolicyError> {
        let policy: Self =
            serde_json::from_str(input).map_err(|err| PolicyError::InvalidJson(err.to_string()))?;
        policy.validate()?;
        info!(
            "event=policy_loaded module=policy status=ok version={} marketing_mode={:?} dpp_mode={:?}",
            policy.version, policy.marketing.mode, policy.dpp.mode
        );
        Ok(policy)
    }

    /// Validates declaration-level policy invariants.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.version != POLICY_VERSION_V1 {
            return Err(PolicyError::UnsupportedVersion(self.version));
        }
        for layer in [LayerKind::Marketing, LayerKind::Dpp] {
            if self.rule(layer).identity_marker.trim().is_empty() {
                return Err(PolicyError::EmptyIdentityMarker(layer));
            }
        }
        Ok(())
    }

    pub fn rule(&self, layer: LayerKind) -> &LayerRule {
        match layer {
            LayerKind::Marketing => &self.marketing,
            LayerKind::Dpp => &self.dpp,
        }
    }

    /// Resolves edit permission for one layer.
    pub fn can_edit(
        &self,
        layer: LayerKind,
        explicit_grant: bool,
        identity_label: Option<&str>,
    ) -> bool {
        self.rule(layer).allows(explicit_grant, identity_label)
    }

    /// Resolves edit permission for both layers at once.
    pub fn resolve(&self, grants: ExplicitGrants, identity_label: Option<&str>) -> LayerPermissions {
        LayerPermissions {
            marketing: self.can_edit(
                LayerKind::Marketing,
                grants.marketing_can_edit,
                identity_label,
            ),
            dpp: self.can_edit(LayerKind::Dpp, grants.dpp_can_edit, identity_label),
        }
    }
}

/// Policy configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    InvalidJson(String),
    UnsupportedVersion(u32),
    EmptyIdentityMarker(LayerKind),
}

impl Display for PolicyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson(details) => write!(f, "permission policy is invalid: {details}"),
            Self::UnsupportedVersion(version) => write!(
                f,
                "permission policy version is unsupported: {version} (expected {POLICY_VERSION_V1})"
            ),
            Self::EmptyIdentityMarker(layer) => {
                write!(f, "identity marker must not be empty for layer: {layer}")
            }
        }
    }
}

impl Error for PolicyError {}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::{contains_ignore_case, LayerRule};

    #[test]
    fn case_insensitive_match_handles_mixed_case() {
        assert!(contains_ignore_case("Marketing Team", "marketing"));
        assert!(contains_ignore_case("team-DPP-eu", "dpp"));
        assert!(!contains_ignore_case("Sales", "marketing"));
    }

    #[test]
    fn identity_marker_rule_denies_without_identity() {
        let rule = LayerRule::identity_marker("marketing");
        assert!(!rule.allows(false, None));
        assert!(rule.allows(true, None));
    }
}
