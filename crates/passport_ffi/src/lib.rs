//! Host-facing bridge for the passport core.

pub mod api;
