//! Shared-root data model for one collaborative room.
//!
//! # Responsibility
//! - Define the tagged value shapes the document store hands to core.
//! - Keep field maps order-preserving so display order is stable.
//!
//! # Invariants
//! - A root entry is always exactly one `StoredValue` variant.
//! - Wrong-shaped or undecodable entries become `StoredValue::Malformed`,
//!   never a decode error for the whole snapshot.

pub mod root;
pub mod value;
