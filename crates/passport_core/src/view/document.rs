//! Document page composition.
//!
//! # Responsibility
//! - Choose between the error view, the loading skeleton and the layered
//!   passport for one document page.
//!
//! # Invariants
//! - Any error replaces the whole page; layers are never rendered next to it.
//! - A route error takes precedence over a fetch error.

use crate::model::root::RootSnapshot;
use crate::policy::ExplicitGrants;
use crate::session::identity::IdentityState;
use crate::view::composite::{compose_passport, PassportConfig, PassportView};
use crate::view::route_error::resolve_route_error;
use serde::{Deserialize, Serialize};

/// Structured error produced by the document fetch or routing collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorData {
    pub kind: String,
    pub message: String,
}

impl ErrorData {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Document metadata returned by the fetch collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Result handed over by the document fetch collaborator.
pub type DocumentFetchResult = Result<Option<DocumentDescriptor>, ErrorData>;

/// Inputs of one document page render.
#[derive(Debug, Clone)]
pub struct DocumentPageInput<'a> {
    /// Room the page's collaboration session is bound to.
    pub room_id: &'a str,
    pub fetched: DocumentFetchResult,
    /// Raw route error payload, still percent-encoded.
    pub route_error: Option<&'a str>,
    pub snapshot: &'a RootSnapshot,
    pub identity: &'a IdentityState,
}

/// Top-level page model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum DocumentPage {
    Error {
        error: ErrorData,
    },
    /// Document not loaded yet; only the header skeleton is shown.
    Loading,
    Document {
        document: DocumentDescriptor,
        room_id: String,
        passport: PassportView,
    },
}

/// Passport configuration used by the document page: both layers granted.
pub fn document_page_config() -> PassportConfig {
    PassportConfig::with_grants(ExplicitGrants {
        marketing_can_edit: true,
        dpp_can_edit: true,
    })
}

/// Settles the page without touching room storage.
///
/// Returns the document to render the passport for, or the finished error
/// or loading page. Callers that decode storage lazily run this first.
pub fn resolve_document(
    route_error: Option<&str>,
    fetched: DocumentFetchResult,
) -> Result<DocumentDescriptor, DocumentPage> {
    if let Some(error) = resolve_route_error(route_error) {
        return Err(DocumentPage::Error { error });
    }

    match fetched {
        Err(error) => Err(DocumentPage::Error { error }),
        Ok(None) => Err(DocumentPage::Loading),
        Ok(Some(document)) => Ok(document),
    }
}

/// Renders one document page.
pub fn render_document_page(input: DocumentPageInput<'_>, config: &PassportConfig) -> DocumentPage {
    match resolve_document(input.route_error, input.fetched) {
        Ok(document) => DocumentPage::Document {
            document,
            room_id: input.room_id.to_string(),
            passport: compose_passport(input.snapshot, input.identity, config),
        },
        Err(page) => page,
    }
}
