use passport_core::{
    compose_passport, document_page_config, render_document_page, DocumentDescriptor,
    DocumentPage, DocumentPageInput, ErrorData, ExplicitGrants, IdentityState, LayerBody,
    PassportConfig, PassportView, RootSnapshot, DPP_ABSENT_TEXT, MARKETING_ABSENT_TEXT,
};
use serde_json::json;

fn snapshot(value: serde_json::Value) -> RootSnapshot {
    RootSnapshot::from_value(value).expect("snapshot fixture should decode")
}

fn no_grants() -> PassportConfig {
    PassportConfig::with_grants(ExplicitGrants {
        marketing_can_edit: false,
        dpp_can_edit: false,
    })
}

#[test]
fn marketing_team_sees_editor_on_populated_marketing_layer() {
    let root = snapshot(json!({
        "marketingLayer": {"tag": "collection", "value": {"k1": {"text": "Hello"}}}
    }));
    let view = compose_passport(&root, &IdentityState::named("Marketing Team"), &no_grants());
    let passport = view.resolved().expect("named identity resolves");

    let marketing = passport.marketing();
    assert_eq!(marketing.state, "populated");
    assert!(marketing.editor_visible);
    let LayerBody::MarketingItems { items } = &marketing.body else {
        panic!("marketing layer should render items");
    };
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].key, "k1");
    assert_eq!(items[0].text, r#"{"text":"Hello"}"#);

    let dpp = passport.dpp();
    assert_eq!(dpp.state, "absent");
    assert_eq!(dpp.body, LayerBody::Placeholder { text: DPP_ABSENT_TEXT });
    assert!(!dpp.editor_visible);
    assert!(passport.permissions.dpp, "dpp permission is open even when hidden");
}

#[test]
fn anonymous_viewer_gets_dpp_editor_under_open_policy() {
    let root = snapshot(json!({
        "dppLayer": {"tag": "object", "value": {"co2": 12.4, "origin": "FR"}}
    }));
    let view = compose_passport(&root, &IdentityState::anonymous(), &no_grants());
    let passport = view.resolved().expect("no identity still resolves");

    let dpp = passport.dpp();
    assert_eq!(dpp.state, "populated");
    assert!(dpp.editor_visible);
    let LayerBody::PassportData { pretty, .. } = &dpp.body else {
        panic!("dpp layer should render passport data");
    };
    assert_eq!(pretty, "{\n  \"co2\": 12.4,\n  \"origin\": \"FR\"\n}");

    let marketing = passport.marketing();
    assert_eq!(marketing.state, "absent");
    assert_eq!(
        marketing.body,
        LayerBody::Placeholder {
            text: MARKETING_ABSENT_TEXT
        }
    );
    assert!(!passport.permissions.marketing);
}

#[test]
fn pending_identity_suspends_whole_view() {
    let root = snapshot(json!({
        "dppLayer": {"tag": "object", "value": {"co2": 12.4}}
    }));
    let view = compose_passport(&root, &IdentityState::Pending, &no_grants());
    assert_eq!(view, PassportView::Suspended);
}

#[test]
fn fetch_error_replaces_document_view() {
    let root = snapshot(json!({
        "dppLayer": {"tag": "object", "value": {"co2": 12.4}}
    }));
    let identity = IdentityState::named("Marketing Team");
    let page = render_document_page(
        DocumentPageInput {
            room_id: "doc-42",
            fetched: Err(ErrorData::new("not_found", "Document doc-42 does not exist")),
            route_error: None,
            snapshot: &root,
            identity: &identity,
        },
        &document_page_config(),
    );

    assert_eq!(
        page,
        DocumentPage::Error {
            error: ErrorData::new("not_found", "Document doc-42 does not exist"),
        }
    );
}

#[test]
fn route_error_wins_over_loaded_document() {
    let root = RootSnapshot::empty();
    let identity = IdentityState::anonymous();
    let page = render_document_page(
        DocumentPageInput {
            room_id: "doc-42",
            fetched: Ok(Some(DocumentDescriptor {
                id: "doc-42".to_string(),
                name: Some("Jacket".to_string()),
            })),
            route_error: Some(
                "%7B%22kind%22%3A%22forbidden%22%2C%22message%22%3A%22No%20access%22%7D",
            ),
            snapshot: &root,
            identity: &identity,
        },
        &document_page_config(),
    );

    assert_eq!(
        page,
        DocumentPage::Error {
            error: ErrorData::new("forbidden", "No access"),
        }
    );
}

#[test]
fn malformed_route_error_shows_generic_error() {
    let root = RootSnapshot::empty();
    let identity = IdentityState::anonymous();
    let page = render_document_page(
        DocumentPageInput {
            room_id: "doc-42",
            fetched: Ok(None),
            route_error: Some("%7Bnot-json"),
            snapshot: &root,
            identity: &identity,
        },
        &document_page_config(),
    );

    let DocumentPage::Error { error } = page else {
        panic!("malformed route error must still show an error view");
    };
    assert_eq!(error.kind, "invalid_error_payload");
}

#[test]
fn missing_document_without_error_is_loading() {
    let root = RootSnapshot::empty();
    let identity = IdentityState::anonymous();
    let page = render_document_page(
        DocumentPageInput {
            room_id: "doc-42",
            fetched: Ok(None),
            route_error: Some(""),
            snapshot: &root,
            identity: &identity,
        },
        &document_page_config(),
    );
    assert_eq!(page, DocumentPage::Loading);
}

#[test]
fn document_page_grants_both_layers() {
    let root = snapshot(json!({
        "marketingLayer": {"tag": "collection", "value": {"hero": "Spring"}},
        "dppLayer": {"tag": "object", "value": {"origin": "FR"}}
    }));
    let identity = IdentityState::named("Guest");
    let page = render_document_page(
        DocumentPageInput {
            room_id: "doc-42",
            fetched: Ok(Some(DocumentDescriptor {
                id: "doc-42".to_string(),
                name: None,
            })),
            route_error: None,
            snapshot: &root,
            identity: &identity,
        },
        &document_page_config(),
    );

    let DocumentPage::Document {
        document,
        room_id,
        passport,
    } = page
    else {
        panic!("loaded document should render the passport");
    };
    assert_eq!(document.id, "doc-42");
    assert_eq!(room_id, "doc-42");
    let passport = passport.resolved().expect("identity is resolved");
    assert!(passport.marketing().editor_visible);
    assert!(passport.dpp().editor_visible);
}

#[test]
fn passport_view_serializes_with_status_tag() {
    let view = compose_passport(
        &RootSnapshot::empty(),
        &IdentityState::anonymous(),
        &no_grants(),
    );
    let json = serde_json::to_value(&view).expect("view should serialize");
    assert_eq!(json["status"], "resolved");
    assert_eq!(json["layers"][0]["layer"], "marketing");
    assert_eq!(json["layers"][0]["body"]["kind"], "placeholder");
    assert_eq!(json["layers"][1]["layer"], "dpp");

    let suspended = serde_json::to_value(PassportView::Suspended).expect("serialize");
    assert_eq!(suspended, json!({"status": "suspended"}));
}
