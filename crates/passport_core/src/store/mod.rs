//! Shared document store boundary.
//!
//! # Responsibility
//! - Define the contract this core needs from the replicated-storage service:
//!   atomic root snapshots, push notifications, and a serialized write path.
//! - Provide an in-process implementation for embedding and tests.
//!
//! # Invariants
//! - The store is the only writer-serialization point for both layers.
//! - Listeners receive the snapshot that triggered the notification, so render
//!   state is always derived from one atomic read.

pub mod edit;
pub mod memory;

use crate::model::root::RootSnapshot;
use crate::store::edit::{AuthorizedEdit, EditResult};

/// Handle returned by `DocumentStore::subscribe`.
pub type SubscriptionId = u64;

/// Callback invoked with the new root after every storage change.
pub type StorageListener = Box<dyn Fn(&RootSnapshot) + Send + Sync>;

/// Replicated root storage for one room.
pub trait DocumentStore: Send + Sync {
    fn room_id(&self) -> &str;
    fn snapshot(&self) -> RootSnapshot;
    fn subscribe(&self, listener: StorageListener) -> SubscriptionId;
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
    fn apply(&self, edit: AuthorizedEdit) -> EditResult<RootSnapshot>;
}
