//! FFI use-case API for host UI calls.
//!
//! # Responsibility
//! - Expose passport rendering and room edits as sync, string-based calls.
//! - Translate core errors into stable response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - View payloads are JSON strings produced by the core's serde models.
//! - In-process rooms live until `room_close` or process exit.

use passport_core::{
    compose_passport, core_version as core_version_inner, document_page_config,
    init_logging as init_logging_inner, ping as ping_inner,
    render_document_page as render_document_page_inner,
    resolve_document, resolve_route_error as resolve_route_error_inner, supervise,
    DocumentDescriptor, DocumentFetchResult, DocumentPageInput, ErrorData, ExplicitGrants,
    FieldValue, IdentityState, LayerEdit, MemoryDocumentStore, PassportConfig,
    PassportSession, RootSnapshot,
};
use log::info;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex, PoisonError};

static ROOMS: Lazy<Mutex<BTreeMap<String, Arc<MemoryDocumentStore>>>> =
    Lazy::new(|| Mutex::new(BTreeMap::new()));

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory for rolling log files.
/// - Idempotent for identical input; conflicting re-init returns an error.
/// - Returns empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Render response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResponse {
    /// Whether rendering produced a view.
    pub ok: bool,
    /// Serialized view model on success.
    pub view_json: Option<String>,
    /// Diagnostics message; empty on success.
    pub message: String,
}

impl RenderResponse {
    fn from_view(view: &impl Serialize) -> Self {
        match serde_json::to_string(view) {
            Ok(json) => Self {
                ok: true,
                view_json: Some(json),
                message: String::new(),
            },
            Err(err) => Self::failure(format!("view serialization failed: {err}")),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            view_json: None,
            message: message.into(),
        }
    }
}

/// Edit response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditResponse {
    pub ok: bool,
    /// Store revision after the edit.
    pub revision: Option<u64>,
    pub message: String,
}

impl EditResponse {
    fn success(revision: u64) -> Self {
        Self {
            ok: true,
            revision: Some(revision),
            message: "Edit applied.".to_string(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            revision: None,
            message: message.into(),
        }
    }
}

/// Route error as exposed to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteError {
    pub kind: String,
    pub message: String,
}

/// Identity input shared by render and edit calls.
///
/// `pending = true` means the session has not answered yet; otherwise
/// `name = None` is a resolved anonymous viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerInput {
    pub pending: bool,
    pub name: Option<String>,
}

/// Renders the composite passport from a host-provided snapshot.
///
/// # FFI contract
/// - Sync call, pure computation.
/// - Malformed layer entries render as placeholders; only an unreadable
///   snapshot document fails.
#[flutter_rust_bridge::frb(sync)]
pub fn render_passport(
    snapshot_json: String,
    viewer: ViewerInput,
    marketing_can_edit: bool,
    dpp_can_edit: bool,
) -> RenderResponse {
    contained("render_passport", || {
        let snapshot = match RootSnapshot::from_json(snapshot_json.as_str()) {
            Ok(snapshot) => snapshot,
            Err(err) => return RenderResponse::failure(format!("render_passport failed: {err}")),
        };
        let config = PassportConfig::with_grants(ExplicitGrants {
            marketing_can_edit,
            dpp_can_edit,
        });
        let view = compose_passport(&snapshot, &identity_state(&viewer), &config);
        RenderResponse::from_view(&view)
    })
}

/// Renders the document page: error view, loading skeleton, or passport.
///
/// # FFI contract
/// - `document_json`: `DocumentDescriptor` JSON, or `None` while loading.
/// - `fetch_error_json`: `ErrorData` JSON from the fetch collaborator.
/// - `route_error`: raw percent-encoded route payload.
/// - `snapshot_json` is only read when the passport is shown; error and
///   loading pages render whatever it holds.
#[flutter_rust_bridge::frb(sync)]
pub fn render_document_page(
    room_id: String,
    document_json: Option<String>,
    fetch_error_json: Option<String>,
    route_error: Option<String>,
    snapshot_json: String,
    viewer: ViewerInput,
) -> RenderResponse {
    contained("render_document_page", || {
        let fetched = match parse_fetch_result(document_json, fetch_error_json) {
            Ok(fetched) => fetched,
            Err(message) => return RenderResponse::failure(message),
        };
        let document = match resolve_document(route_error.as_deref(), fetched) {
            Ok(document) => document,
            Err(page) => return RenderResponse::from_view(&page),
        };
        let snapshot = match RootSnapshot::from_json(snapshot_json.as_str()) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                return RenderResponse::failure(format!("render_document_page failed: {err}"))
            }
        };
        let identity = identity_state(&viewer);

        let page = render_document_page_inner(
            DocumentPageInput {
                room_id: room_id.as_str(),
                fetched: Ok(Some(document)),
                route_error: None,
                snapshot: &snapshot,
                identity: &identity,
            },
            &document_page_config(),
        );
        RenderResponse::from_view(&page)
    })
}

/// Decodes a percent-encoded route error payload.
///
/// Returns `None` for missing/blank input and a generic error for payloads
/// that cannot be decoded.
#[flutter_rust_bridge::frb(sync)]
pub fn resolve_route_error(raw: Option<String>) -> Option<RouteError> {
    resolve_route_error_inner(raw.as_deref()).map(|error| RouteError {
        kind: error.kind,
        message: error.message,
    })
}

/// Renders the passport of an in-process room.
#[flutter_rust_bridge::frb(sync)]
pub fn room_render(
    room_id: String,
    viewer: ViewerInput,
    marketing_can_edit: bool,
    dpp_can_edit: bool,
) -> RenderResponse {
    contained("room_render", || {
        let session = room_session(
            room_id.as_str(),
            &viewer,
            ExplicitGrants {
                marketing_can_edit,
                dpp_can_edit,
            },
        );
        RenderResponse::from_view(&session.render())
    })
}

/// Inserts or replaces one marketing entry in an in-process room.
///
/// # FFI contract
/// - `key = None` generates a fresh entry key.
/// - `value_json` is any JSON value.
#[flutter_rust_bridge::frb(sync)]
pub fn room_upsert_marketing_entry(
    room_id: String,
    viewer: ViewerInput,
    marketing_can_edit: bool,
    key: Option<String>,
    value_json: String,
) -> EditResponse {
    let value = match parse_field_value(value_json.as_str()) {
        Ok(value) => value,
        Err(message) => return EditResponse::failure(message),
    };
    let grants = ExplicitGrants {
        marketing_can_edit,
        dpp_can_edit: false,
    };
    run_room_edit(
        room_id.as_str(),
        &viewer,
        grants,
        LayerEdit::UpsertMarketingEntry { key, value },
    )
}

/// Sets one DPP field in an in-process room.
#[flutter_rust_bridge::frb(sync)]
pub fn room_set_dpp_field(
    room_id: String,
    viewer: ViewerInput,
    dpp_can_edit: bool,
    name: String,
    value_json: String,
) -> EditResponse {
    let value = match parse_field_value(value_json.as_str()) {
        Ok(value) => value,
        Err(message) => return EditResponse::failure(message),
    };
    let grants = ExplicitGrants {
        marketing_can_edit: false,
        dpp_can_edit,
    };
    run_room_edit(
        room_id.as_str(),
        &viewer,
        grants,
        LayerEdit::SetDppField { name, value },
    )
}

/// Runs one render call, converting a panic into a failure envelope.
fn contained(operation: &str, render: impl FnOnce() -> RenderResponse) -> RenderResponse {
    supervise(
        operation,
        || Ok::<_, Infallible>(render()),
        |failure| RenderResponse::failure(format!("{operation} failed: {failure}")),
    )
    .into_value()
}

/// Drops an in-process room and its storage.
///
/// # FFI contract
/// - Returns `true` when a room was open under `room_id`.
/// - Sessions already holding the store keep it until they finish.
#[flutter_rust_bridge::frb(sync)]
pub fn room_close(room_id: String) -> bool {
    let room_id = room_id.trim();
    let removed = ROOMS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(room_id)
        .is_some();
    if removed {
        info!("event=room_closed module=ffi status=ok room_id={room_id}");
    }
    removed
}

fn run_room_edit(
    room_id: &str,
    viewer: &ViewerInput,
    grants: ExplicitGrants,
    edit: LayerEdit,
) -> EditResponse {
    match room_session(room_id, viewer, grants).edit(edit) {
        Ok(snapshot) => EditResponse::success(snapshot.revision),
        Err(err) => EditResponse::failure(format!("room edit failed: {err}")),
    }
}

fn room_session(room_id: &str, viewer: &ViewerInput, grants: ExplicitGrants) -> PassportSession {
    PassportSession::new(
        room_store(room_id),
        Arc::new(identity_state(viewer)),
        PassportConfig::with_grants(grants),
    )
}

fn room_store(room_id: &str) -> Arc<MemoryDocumentStore> {
    let room_id = room_id.trim();
    let mut rooms = ROOMS.lock().unwrap_or_else(PoisonError::into_inner);
    let store = rooms.entry(room_id.to_string()).or_insert_with(|| {
        info!("event=room_opened module=ffi status=ok room_id={room_id}");
        Arc::new(MemoryDocumentStore::new(room_id))
    });
    Arc::clone(store)
}

fn identity_state(viewer: &ViewerInput) -> IdentityState {
    if viewer.pending {
        return IdentityState::Pending;
    }
    match viewer.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => IdentityState::named(name),
        _ => IdentityState::anonymous(),
    }
}

fn parse_field_value(value_json: &str) -> Result<FieldValue, String> {
    serde_json::from_str::<serde_json::Value>(value_json)
        .map(FieldValue::from)
        .map_err(|err| format!("value is not valid json: {err}"))
}

fn parse_fetch_result(
    document_json: Option<String>,
    fetch_error_json: Option<String>,
) -> Result<DocumentFetchResult, String> {
    if let Some(raw) = fetch_error_json {
        let error = serde_json::from_str::<ErrorData>(raw.as_str())
            .map_err(|err| format!("fetch error is not valid error json: {err}"))?;
        return Ok(Err(error));
    }
    match document_json {
        Some(raw) => serde_json::from_str::<DocumentDescriptor>(raw.as_str())
            .map(|document| Ok(Some(document)))
            .map_err(|err| format!("document is not valid json: {err}")),
        None => Ok(Ok(None)),
    }
}
