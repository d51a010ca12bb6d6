//! Composed views over the two layers.
//!
//! # Responsibility
//! - Stack the marketing and DPP renderers in a fixed order.
//! - Replace the whole document view with an error view on upstream failure.
//! - Decode error payloads delivered through routing.

pub mod composite;
pub mod document;
pub mod route_error;
