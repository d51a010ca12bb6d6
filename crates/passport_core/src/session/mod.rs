//! Live passport session over a document store.
//!
//! # Responsibility
//! - Bind one room's store, the viewer identity and view configuration.
//! - Recompose the passport view on every storage notification.
//! - Route edit intents through the permission gate into the store.
//!
//! # Invariants
//! - Each composed view is derived from exactly one snapshot.
//! - Edits are refused while identity is pending.
//! - Dropping a `SessionWatch` ends its subscription.

pub mod identity;

use crate::model::root::RootSnapshot;
use crate::policy::LayerPermissions;
use crate::session::identity::IdentityResolver;
use crate::store::edit::{authorize_edit, EditError, EditResult, LayerEdit};
use crate::store::{DocumentStore, SubscriptionId};
use crate::view::composite::{compose_passport, PassportConfig, PassportView};
use log::warn;
use std::sync::Arc;

/// One mounted passport view for a room.
pub struct PassportSession {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityResolver>,
    config: PassportConfig,
}

impl PassportSession {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityResolver>,
        config: PassportConfig,
    ) -> Self {
        Self {
            store,
            identity,
            config,
        }
    }

    /// Composes the view from a fresh snapshot and the current identity.
    ///
    /// Hosts call this when the identity signal changes; storage changes are
    /// delivered through `watch`.
    pub fn render(&self) -> PassportView {
        compose_passport(&self.store.snapshot(), &self.identity.identity(), &self.config)
    }

    /// Resolved permissions, or `None` while identity is pending.
    pub fn permissions(&self) -> Option<LayerPermissions> {
        let identity = self.identity.identity();
        if identity.is_pending() {
            return None;
        }
        Some(self.config.policy.resolve(self.config.grants, identity.label()))
    }

    /// Subscribes `on_render` to every storage change of the room.
    pub fn watch<F>(&self, on_render: F) -> SessionWatch
    where
        F: Fn(PassportView) + Send + Sync + 'static,
    {
        let identity = Arc::clone(&self.identity);
        let config = self.config.clone();
        let id = self.store.subscribe(Box::new(move |snapshot: &RootSnapshot| {
            on_render(compose_passport(snapshot, &identity.identity(), &config));
        }));
        SessionWatch {
            store: Arc::clone(&self.store),
            id,
        }
    }

    /// Authorizes and applies one edit intent.
    ///
    /// # Errors
    /// - `EditError::IdentityPending` while identity is unresolved.
    /// - Gate errors from `authorize_edit` and apply errors from the store.
    pub fn edit(&self, edit: LayerEdit) -> EditResult<RootSnapshot> {
        let permissions = self.permissions().ok_or(EditError::IdentityPending)?;
        let layer = edit.layer();
        let authorized = authorize_edit(edit, &permissions).map_err(|err| {
            warn!(
                "event=edit_denied module=session status=error room={} layer={} error={}",
                self.store.room_id(),
                layer,
                err
            );
            err
        })?;
        self.store.apply(authorized)
    }
}

/// Active storage subscription of a session.
pub struct SessionWatch {
    store: Arc<dyn DocumentStore>,
    id: SubscriptionId,
}

impl Drop for SessionWatch {
    fn drop(&mut self) {
        self.store.unsubscribe(self.id);
    }
}
