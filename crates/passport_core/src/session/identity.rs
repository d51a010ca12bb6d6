//! Viewer identity signal from the collaboration session.
//!
//! # Responsibility
//! - Model the suspend/resolve lifecycle of the session identity.
//! - Expose the identity label used as a heuristic permission signal.
//!
//! # Invariants
//! - `Resolved(None)` ("no identity") is a resolved state, not a pending one.
//! - A resolved identity without a name yields no label.

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

/// Display identity of the current viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerIdentity {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl ViewerIdentity {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }
}

/// Identity lifecycle as seen by the composite view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IdentityState {
    /// Session info not yet available; rendering suspends.
    #[default]
    Pending,
    /// Session answered, possibly with no identity.
    Resolved(Option<ViewerIdentity>),
}

impl IdentityState {
    pub fn anonymous() -> Self {
        Self::Resolved(None)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::Resolved(Some(ViewerIdentity::named(name)))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns the identity label, if the session resolved one.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Resolved(Some(identity)) => identity.name.as_deref(),
            Self::Resolved(None) | Self::Pending => None,
        }
    }
}

/// Source of the current viewer identity.
pub trait IdentityResolver: Send + Sync {
    fn identity(&self) -> IdentityState;
}

impl IdentityResolver for IdentityState {
    fn identity(&self) -> IdentityState {
        self.clone()
    }
}

/// Mutable identity cell updated by the host when the session answers.
#[derive(Debug, Default)]
pub struct SessionIdentity {
    state: Mutex<IdentityState>,
}

impl SessionIdentity {
    /// Creates a cell in the pending state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the identity state.
    pub fn set(&self, state: IdentityState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Marks the session resolved with the given identity.
    pub fn resolve(&self, identity: Option<ViewerIdentity>) {
        self.set(IdentityState::Resolved(identity));
    }
}

impl IdentityResolver for SessionIdentity {
    fn identity(&self) -> IdentityState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::{IdentityResolver, IdentityState, SessionIdentity, ViewerIdentity};

    #[test]
    fn session_identity_starts_pending_and_resolves() {
        let cell = SessionIdentity::new();
        assert!(cell.identity().is_pending());

        cell.resolve(Some(ViewerIdentity::named("DPP Auditor")));
        assert_eq!(cell.identity().label(), Some("DPP Auditor"));
    }

    #[test]
    fn nameless_identity_has_no_label() {
        let state = IdentityState::Resolved(Some(ViewerIdentity {
            id: Some("user-1".to_string()),
            name: None,
        }));
        assert!(!state.is_pending());
        assert_eq!(state.label(), None);
    }
}
