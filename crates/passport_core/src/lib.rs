//! Core model for layered collaborative passport documents.
//!
//! A room's shared root carries two independently permissioned layers: a
//! marketing layer (keyed collection) and a Digital Product Passport layer
//! (structured object). This crate reconciles them into render states,
//! resolves edit permissions, and composes the stacked view.

pub mod layer;
pub mod logging;
pub mod model;
pub mod policy;
pub mod session;
pub mod store;
pub mod supervisor;
pub mod view;

pub use layer::reconcile::{reconcile_dpp, reconcile_marketing, reconcile_root, LayerStates};
pub use layer::render::{
    render_dpp, render_marketing, LayerBody, LayerView, RenderOptions, RenderedItem,
    DPP_ABSENT_TEXT, DPP_EMPTY_TEXT, DPP_HEADING, MARKETING_ABSENT_TEXT, MARKETING_EMPTY_TEXT,
};
pub use layer::{LayerKind, RenderState};
pub use logging::{init_logging, logging_status, LoggingError};
pub use model::root::{
    MarketingEntry, RootSnapshot, SnapshotError, StoredValue, DPP_LAYER_KEY, MARKETING_LAYER_KEY,
};
pub use model::value::{FieldMap, FieldValue};
pub use policy::{
    ExplicitGrants, LayerPermissions, LayerRule, PermissionPolicy, PolicyError, PolicyMode,
};
pub use session::identity::{IdentityResolver, IdentityState, SessionIdentity, ViewerIdentity};
pub use session::{PassportSession, SessionWatch};
pub use store::edit::{apply_edit, authorize_edit, AuthorizedEdit, EditError, EditResult, LayerEdit};
pub use store::memory::MemoryDocumentStore;
pub use store::{DocumentStore, StorageListener, SubscriptionId};
pub use supervisor::{supervise, SubsystemFailure, Supervised};
pub use view::composite::{compose_passport, ComposedPassport, PassportConfig, PassportView};
pub use view::document::{
    document_page_config, render_document_page, resolve_document, DocumentDescriptor,
    DocumentFetchResult, DocumentPage, DocumentPageInput, ErrorData,
};
pub use view::route_error::{decode_route_error, resolve_route_error, RouteErrorDecodeError};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
