//! Session controller tests: data flow, navigation, submission and host
//! callbacks.

use std::sync::Arc;

use ntest::timeout;
use serde_json::{json, Map, Value};

use form_engine_core::{ComponentRegistry, DisplayMode, FormData, FormDocument, FormMode};
use form_engine_runtime::{
    create_session, EventOutcome, FormEvent, FormHost, FormMeta, FormSession,
};

/// Host recording every callback.
#[derive(Default)]
struct RecordingHost {
    data_changes: Vec<Arc<FormData>>,
    page_changes: Vec<(usize, usize)>,
    submissions: Vec<Arc<FormData>>,
    metas: Vec<FormMeta>,
}

impl FormHost for RecordingHost {
    fn on_data_change(&mut self, form_data: &Arc<FormData>) {
        self.data_changes.push(Arc::clone(form_data));
    }

    fn on_page_change(&mut self, index: usize, total_pages: usize) {
        self.page_changes.push((index, total_pages));
    }

    fn on_submit(&mut self, form_data: &Arc<FormData>) {
        self.submissions.push(Arc::clone(form_data));
    }

    fn on_meta_change(&mut self, meta: &FormMeta) {
        self.metas.push(meta.clone());
    }
}

fn two_page_document() -> FormDocument {
    FormDocument::from_value(json!({
        "type": "form",
        "title": "Registration",
        "children": [
            {"type": "page", "id": "account", "title": "Account", "children": [
                {"type": "email", "id": "email", "label": "Email *"},
                {"type": "checkbox", "id": "newsletter"}
            ]},
            {"type": "page", "id": "profile", "children": [
                {"type": "text", "id": "topics", "hidden": true,
                 "rules": [{"when": {"field": "newsletter", "is": true}, "then": [{"set": {"hidden": false}}]}]}
            ]}
        ]
    }))
    .unwrap()
}

fn data(v: Value) -> FormData {
    v.as_object().cloned().unwrap_or_default()
}

fn recording_session() -> FormSession<RecordingHost> {
    FormSession::builder(two_page_document(), ComponentRegistry::with_builtins())
        .host(RecordingHost::default())
        .build()
}

#[test]
fn test_initial_state() {
    let session = create_session(
        two_page_document(),
        ComponentRegistry::with_builtins(),
        None,
        None,
    );
    assert_eq!(session.current_page_index(), 0);
    assert_eq!(session.total_pages(), 2);
    assert!(session.is_multi_page());
    assert!(session.form_data().is_empty());
    assert_eq!(session.mode(), FormMode::Edit);
}

#[test]
fn test_build_announces_meta_and_first_page() {
    let session = recording_session();
    assert_eq!(session.host().metas.len(), 1);
    assert_eq!(session.host().metas[0].form_title, "Registration");
    assert_eq!(session.host().metas[0].page_count, 2);
    assert_eq!(session.host().page_changes, vec![(0, 2)]);
    assert!(session.host().data_changes.is_empty());

    let single = FormSession::builder(two_page_document(), ComponentRegistry::with_builtins())
        .display(DisplayMode::Singlepage)
        .host(RecordingHost::default())
        .build();
    assert_eq!(single.host().metas.len(), 1);
    assert!(single.host().page_changes.is_empty());

    let controlled = FormSession::builder(two_page_document(), ComponentRegistry::with_builtins())
        .controlled_page(1)
        .host(RecordingHost::default())
        .build();
    assert_eq!(controlled.host().page_changes, vec![(1, 2)]);
}

/// Two pages: next moves to page 1, submit is only forwarded there.
#[test]
#[timeout(5000)]
fn test_two_page_navigation_and_submit() {
    let mut session = recording_session();

    assert_eq!(session.on_submit(), EventOutcome::Ignored);
    assert!(session.host().submissions.is_empty());

    assert_eq!(session.on_navigate_next(), EventOutcome::PageChanged(1));
    assert_eq!(session.current_page_index(), 1);
    assert_eq!(session.on_navigate_next(), EventOutcome::Ignored);
    assert_eq!(session.current_page_index(), 1);

    assert_eq!(session.on_submit(), EventOutcome::Submitted);
    assert_eq!(session.host().submissions.len(), 1);
    assert_eq!(session.host().page_changes, vec![(0, 2), (1, 2)]);

    assert_eq!(session.on_navigate_prev(), EventOutcome::PageChanged(0));
    assert_eq!(session.on_navigate_prev(), EventOutcome::Ignored);
    assert_eq!(session.current_page_index(), 0);
}

#[test]
fn test_data_changes_replace_the_snapshot() {
    let mut session = FormSession::builder(two_page_document(), ComponentRegistry::with_builtins())
        .initial_data(data(json!({"email": "a@b.c", "newsletter": false})))
        .host(RecordingHost::default())
        .build();

    let before = Arc::clone(session.form_data());
    session.on_data_change("newsletter", json!(true));
    session.on_data_change("email", json!("x@y.z"));

    assert!(!Arc::ptr_eq(&before, session.form_data()));
    assert_eq!(*before, data(json!({"email": "a@b.c", "newsletter": false})));
    assert_eq!(
        **session.form_data(),
        data(json!({"email": "x@y.z", "newsletter": true}))
    );
    assert_eq!(session.host().data_changes.len(), 2);
    assert_eq!(session.dynamic_props()["topics"]["hidden"], json!(false));
}

#[test]
#[timeout(5000)]
fn test_render_reflects_page_and_rules() {
    let mut session = recording_session();

    let tree = session.render().unwrap();
    assert!(tree.find("account").is_some());
    assert!(tree.find("profile").is_none());
    let form = tree.as_element().unwrap();
    assert_eq!(form.props["onNavigateNext"], json!({"event": "navigate_next"}));

    session.dispatch(FormEvent::DataChange {
        field: "newsletter".to_string(),
        value: Some(json!(true)),
    });
    session.dispatch(FormEvent::NavigateNext);
    let tree = session.render().unwrap();
    assert!(tree.find("account").is_none());
    assert!(tree.find("topics").is_some());
    assert_eq!(
        tree.as_element().unwrap().props["onSubmit"],
        json!({"event": "submit"})
    );
}

#[test]
fn test_data_change_binding_without_value_is_ignored() {
    let mut session = FormSession::builder(two_page_document(), ComponentRegistry::with_builtins())
        .initial_data(data(json!({"email": "a@b.c"})))
        .host(RecordingHost::default())
        .build();

    let tree = session.render().unwrap();
    let binding = tree.find("email").unwrap().props["onChange"].clone();
    let echoed: FormEvent = serde_json::from_value(binding).unwrap();
    assert_eq!(session.dispatch(echoed), EventOutcome::Ignored);
    assert_eq!(session.form_data().get("email"), Some(&json!("a@b.c")));
    assert!(session.host().data_changes.is_empty());

    let cleared: FormEvent =
        serde_json::from_value(json!({"event": "data_change", "field": "email", "value": null}))
            .unwrap();
    assert_eq!(session.dispatch(cleared), EventOutcome::DataChanged);
    assert_eq!(session.form_data().get("email"), Some(&Value::Null));
}

#[test]
fn test_singlepage_mode_renders_all_pages_and_always_submits() {
    let mut session = FormSession::builder(two_page_document(), ComponentRegistry::with_builtins())
        .display(DisplayMode::Singlepage)
        .host(RecordingHost::default())
        .build();

    assert!(!session.is_multi_page());
    assert_eq!(session.total_pages(), 1);
    assert_eq!(session.on_navigate_next(), EventOutcome::Ignored);

    let tree = session.render().unwrap();
    assert!(tree.find("account").is_some());
    assert!(tree.find("profile").is_some());

    assert_eq!(session.on_submit(), EventOutcome::Submitted);
    assert_eq!(session.host().submissions.len(), 1);
}

#[test]
fn test_controlled_page_forwards_navigation() {
    let mut session = FormSession::builder(two_page_document(), ComponentRegistry::with_builtins())
        .controlled_page(0)
        .host(RecordingHost::default())
        .build();

    assert_eq!(session.on_navigate_next(), EventOutcome::PageRequested(1));
    // the host has not moved yet
    assert_eq!(session.current_page_index(), 0);
    assert_eq!(session.host().page_changes, vec![(0, 2), (1, 2)]);

    session.set_controlled_page(Some(1));
    assert_eq!(session.current_page_index(), 1);

    session.set_controlled_page(None);
    assert!(!session.is_controlled());
    assert_eq!(session.on_navigate_prev(), EventOutcome::PageChanged(0));
}

#[test]
fn test_go_to_page_ignores_out_of_range() {
    let mut session = recording_session();
    assert_eq!(session.go_to_page(5), EventOutcome::Ignored);
    assert_eq!(session.go_to_page(0), EventOutcome::Ignored);
    assert_eq!(
        session.dispatch(FormEvent::GoToPage { index: 1 }),
        EventOutcome::PageChanged(1)
    );
    assert_eq!(session.host().metas.last().map(|m| m.current_page_index), Some(1));
}

#[test]
fn test_meta_titles() {
    let session = recording_session();
    let meta = session.meta();
    assert_eq!(meta.form_title, "Registration");
    assert_eq!(meta.page_count, 2);
    assert_eq!(meta.page_titles, vec!["Account".to_string(), "Page 2".to_string()]);
    assert_eq!(meta.current_page_title.as_deref(), Some("Account"));
}

#[test]
fn test_form_mode_comes_from_context() {
    let mut context = Map::new();
    context.insert("formMode".to_string(), json!("view"));
    context.insert("role".to_string(), json!("auditor"));
    let session = FormSession::builder(two_page_document(), ComponentRegistry::with_builtins())
        .form_context(context)
        .build();

    assert_eq!(session.mode(), FormMode::View);
    assert!(!session.form_context().contains_key("formMode"));
    assert_eq!(session.form_context().get("role"), Some(&json!("auditor")));

    let tree = session.render().unwrap();
    assert_eq!(tree.find("email").unwrap().props["disabled"], json!(true));
}

#[test]
fn test_reset_clears_data_explicitly() {
    let mut session = recording_session();
    session.on_data_change("email", json!("a@b.c"));
    session.on_navigate_next();
    session.on_submit();

    // submission leaves state alone
    assert_eq!(session.form_data().len(), 1);
    session.reset(None);
    assert!(session.form_data().is_empty());
    assert_eq!(session.current_page_index(), 1);
}
