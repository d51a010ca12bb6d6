//! In-process document store.
//!
//! Stands in for the replicated-storage service when the core is embedded
//! without a live sync backend, and backs the integration tests.
//!
//! # Invariants
//! - Listeners observe strictly increasing revisions; a snapshot that loses
//!   the race to a newer one is skipped, never delivered late.
//! - Listeners must not write to the same store from inside the callback.

use crate::model::root::RootSnapshot;
use crate::store::edit::{apply_edit, AuthorizedEdit, EditResult};
use crate::store::{DocumentStore, StorageListener, SubscriptionId};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

type SharedListener = Arc<dyn Fn(&RootSnapshot) + Send + Sync>;

/// Mutex-guarded root plus a listener table.
pub struct MemoryDocumentStore {
    room_id: String,
    root: Mutex<RootSnapshot>,
    listeners: Mutex<BTreeMap<SubscriptionId, SharedListener>>,
    /// Highest revision handed to listeners; held for the whole delivery.
    delivered_revision: Mutex<u64>,
    next_subscription_id: AtomicU64,
}

impl MemoryDocumentStore {
    /// Creates a store whose layers are both absent.
    pub fn new(room_id: impl Into<String>) -> Self {
        Self::with_root(room_id, RootSnapshot::empty())
    }

    /// Creates a store seeded with an initial root.
    pub fn with_root(room_id: impl Into<String>, root: RootSnapshot) -> Self {
        Self {
            room_id: room_id.into(),
            delivered_revision: Mutex::new(root.revision),
            root: Mutex::new(root),
            listeners: Mutex::new(BTreeMap::new()),
            next_subscription_id: AtomicU64::new(1),
        }
    }

    /// Replaces the whole root, as a remote replica update would.
    ///
    /// The stored revision is bumped past the current one so revisions stay
    /// monotonic regardless of the incoming value.
    pub fn replace_root(&self, mut root: RootSnapshot) -> RootSnapshot {
        {
            let mut current = self.root.lock().unwrap_or_else(PoisonError::into_inner);
            root.revision = current.revision.saturating_add(1);
            *current = root.clone();
        }
        debug!(
            "event=root_replaced module=store room={} revision={}",
            self.room_id, root.revision
        );
        self.notify(&root);
        root
    }

    /// Number of active subscriptions.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn notify(&self, root: &RootSnapshot) {
        let mut delivered = self
            .delivered_revision
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if root.revision <= *delivered {
            debug!(
                "event=notify_skipped module=store room={} revision={} delivered={}",
                self.room_id, root.revision, *delivered
            );
            return;
        }

        // Listeners run outside the root and listener locks so they may read
        // or unsubscribe.
        let listeners: Vec<SharedListener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for listener in listeners {
            listener(root);
        }
        *delivered = root.revision;
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn room_id(&self) -> &str {
        &self.room_id
    }

    fn snapshot(&self) -> RootSnapshot {
        self.root
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn subscribe(&self, listener: StorageListener) -> SubscriptionId {
        let id = self.next_subscription_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::from(listener));
        debug!(
            "event=store_subscribed module=store room={} subscription={}",
            self.room_id, id
        );
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    fn apply(&self, edit: AuthorizedEdit) -> EditResult<RootSnapshot> {
        let next = {
            let mut current = self.root.lock().unwrap_or_else(PoisonError::into_inner);
            match apply_edit(&current, &edit) {
                Ok(next) => {
                    *current = next.clone();
                    next
                }
                Err(err) => {
                    warn!(
                        "event=edit_rejected module=store status=error room={} layer={} error={}",
                        self.room_id,
                        edit.layer(),
                        err
                    );
                    return Err(err);
                }
            }
        };

        info!(
            "event=edit_applied module=store status=ok room={} layer={} revision={}",
            self.room_id,
            edit.layer(),
            next.revision
        );
        self.notify(&next);
        Ok(next)
    }
}
