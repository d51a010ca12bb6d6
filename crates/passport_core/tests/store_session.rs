use passport_core::{
    reconcile_root, DocumentStore, EditError, ExplicitGrants, FieldValue, IdentityResolver,
    IdentityState, LayerBody, LayerEdit, LayerKind, MemoryDocumentStore, PassportConfig,
    PassportSession, PassportView, RenderState, RootSnapshot, SessionIdentity, StoredValue,
    ViewerIdentity,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

fn session_with(
    store: Arc<MemoryDocumentStore>,
    identity: IdentityState,
) -> PassportSession {
    PassportSession::new(store, Arc::new(identity), PassportConfig::default())
}

#[test]
fn first_marketing_edit_creates_the_collection() {
    let store = Arc::new(MemoryDocumentStore::new("room-1"));
    let session = session_with(Arc::clone(&store), IdentityState::named("Marketing Team"));

    let next = session
        .edit(LayerEdit::UpsertMarketingEntry {
            key: Some("k1".to_string()),
            value: FieldValue::from(json!({"text": "Hello"})),
        })
        .expect("marketing edit should apply");

    assert_eq!(next.revision, 1);
    let RenderState::Populated(entries) = reconcile_root(&store.snapshot()).marketing else {
        panic!("marketing layer should be populated after first edit");
    };
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key, "k1");
}

#[test]
fn marketing_edit_is_denied_without_marker_or_grant() {
    let store = Arc::new(MemoryDocumentStore::new("room-1"));
    let session = session_with(Arc::clone(&store), IdentityState::named("Sales"));

    let err = session
        .edit(LayerEdit::UpsertMarketingEntry {
            key: None,
            value: FieldValue::text("Hello"),
        })
        .expect_err("sales may not edit marketing");
    assert_eq!(err, EditError::PermissionDenied(LayerKind::Marketing));
    assert_eq!(store.snapshot(), RootSnapshot::empty());
}

#[test]
fn explicit_grant_allows_marketing_edit_for_anyone() {
    let store = Arc::new(MemoryDocumentStore::new("room-1"));
    let session = PassportSession::new(
        Arc::clone(&store) as Arc<dyn DocumentStore>,
        Arc::new(IdentityState::anonymous()),
        PassportConfig::with_grants(ExplicitGrants {
            marketing_can_edit: true,
            dpp_can_edit: false,
        }),
    );

    session
        .edit(LayerEdit::UpsertMarketingEntry {
            key: None,
            value: FieldValue::text("Hello"),
        })
        .expect("granted edit should apply");
    assert!(matches!(
        store.snapshot().marketing_layer,
        StoredValue::Collection(_)
    ));
}

#[test]
fn edits_wait_for_identity() {
    let store = Arc::new(MemoryDocumentStore::new("room-1"));
    let identity = Arc::new(SessionIdentity::new());
    let session = PassportSession::new(
        Arc::clone(&store) as Arc<dyn DocumentStore>,
        Arc::clone(&identity) as Arc<dyn IdentityResolver>,
        PassportConfig::default(),
    );

    let err = session
        .edit(LayerEdit::SetDppField {
            name: "co2".to_string(),
            value: FieldValue::number(12.4),
        })
        .expect_err("pending identity must refuse edits");
    assert_eq!(err, EditError::IdentityPending);
    assert_eq!(session.render(), PassportView::Suspended);

    identity.resolve(None);
    session
        .edit(LayerEdit::SetDppField {
            name: "co2".to_string(),
            value: FieldValue::number(12.4),
        })
        .expect("open dpp policy allows anonymous edit");
    assert!(session.render().resolved().is_some());
}

#[test]
fn watch_recomposes_on_every_notification() {
    let store = Arc::new(MemoryDocumentStore::new("room-1"));
    let session = session_with(Arc::clone(&store), IdentityState::named("DPP Auditor"));
    let seen: Arc<Mutex<Vec<PassportView>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let watch = session.watch(move |view| {
        sink.lock().expect("sink lock").push(view);
    });

    session
        .edit(LayerEdit::SetDppField {
            name: "origin".to_string(),
            value: FieldValue::text("FR"),
        })
        .expect("dpp edit should apply");
    store.replace_root(RootSnapshot::empty());

    {
        let views = seen.lock().expect("views lock");
        assert_eq!(views.len(), 2);
        let first = views[0].resolved().expect("resolved view");
        assert_eq!(first.revision, 1);
        assert_eq!(first.dpp().state, "populated");
        let second = views[1].resolved().expect("resolved view");
        assert_eq!(second.revision, 2);
        assert_eq!(second.dpp().state, "absent");
    }

    drop(watch);
    assert_eq!(store.listener_count(), 0);
    store.replace_root(RootSnapshot::empty());
    assert_eq!(seen.lock().expect("views lock").len(), 2);
}

#[test]
fn removing_last_dpp_field_leaves_empty_present_layer() {
    let store = Arc::new(MemoryDocumentStore::new("room-1"));
    let session = session_with(Arc::clone(&store), IdentityState::anonymous());

    session
        .edit(LayerEdit::SetDppField {
            name: "co2".to_string(),
            value: FieldValue::number(12.4),
        })
        .expect("set should apply");
    session
        .edit(LayerEdit::RemoveDppField {
            name: "co2".to_string(),
        })
        .expect("remove should apply");

    let passport = session.render();
    let passport = passport.resolved().expect("resolved view");
    assert_eq!(passport.dpp().state, "empty_present");
    assert!(matches!(passport.dpp().body, LayerBody::Placeholder { .. }));
    assert!(!passport.dpp().editor_visible);
}

#[test]
fn remote_plain_object_in_marketing_slot_blocks_edits_and_renders_absent() {
    let mut remote = RootSnapshot::empty();
    remote.marketing_layer = StoredValue::Object(
        match FieldValue::from(json!({"k1": {"text": "Hello"}})) {
            FieldValue::Map(fields) => fields,
            other => panic!("fixture must be a map, got {other:?}"),
        },
    );
    let store = Arc::new(MemoryDocumentStore::with_root("room-1", remote));
    let session = session_with(Arc::clone(&store), IdentityState::named("Marketing Team"));

    let passport = session.render();
    assert_eq!(
        passport.resolved().expect("resolved view").marketing().state,
        "absent"
    );

    let err = session
        .edit(LayerEdit::UpsertMarketingEntry {
            key: Some("k2".to_string()),
            value: FieldValue::text("World"),
        })
        .expect_err("wrong-shaped layer must not be rewritten");
    assert_eq!(
        err,
        EditError::LayerShapeMismatch {
            layer: LayerKind::Marketing,
            found: "object",
        }
    );
}

#[test]
fn upsert_keeps_existing_entry_position() {
    let store = Arc::new(MemoryDocumentStore::new("room-1"));
    let session = session_with(Arc::clone(&store), IdentityState::named("marketing"));

    for (key, text) in [("a", "one"), ("b", "two"), ("a", "uno")] {
        session
            .edit(LayerEdit::UpsertMarketingEntry {
                key: Some(key.to_string()),
                value: FieldValue::text(text),
            })
            .expect("upsert should apply");
    }

    let RenderState::Populated(entries) = reconcile_root(&store.snapshot()).marketing else {
        panic!("collection should be populated");
    };
    let pairs: Vec<(&str, &FieldValue)> = entries
        .iter()
        .map(|entry| (entry.key.as_str(), &entry.value))
        .collect();
    assert_eq!(
        pairs,
        vec![("a", &FieldValue::text("uno")), ("b", &FieldValue::text("two"))]
    );
}

#[test]
fn session_identity_changes_are_picked_up_by_render() {
    let store = Arc::new(MemoryDocumentStore::new("room-1"));
    let identity = Arc::new(SessionIdentity::new());
    let session = PassportSession::new(
        Arc::clone(&store) as Arc<dyn DocumentStore>,
        Arc::clone(&identity) as Arc<dyn IdentityResolver>,
        PassportConfig::default(),
    );
    assert!(session.permissions().is_none());

    identity.resolve(Some(ViewerIdentity::named("Sales")));
    let permissions = session.permissions().expect("identity resolved");
    assert!(!permissions.marketing);

    identity.resolve(Some(ViewerIdentity::named("Marketing Lead")));
    let permissions = session.permissions().expect("identity resolved");
    assert!(permissions.marketing);
}
