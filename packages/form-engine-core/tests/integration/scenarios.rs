//! End-to-end render scenarios: rule engine + dynamic renderer over whole
//! schema documents.

use ntest::timeout;
use serde_json::{json, Map, Value};

use form_engine_core::render::Navigation;
use form_engine_core::{
    compute_dynamic_props, ComponentDefinition, ComponentKind, ComponentRegistry,
    DynamicRenderer, EngineConfig, FormData, FormDocument, RenderContext, RenderNode,
    RuleEngine,
};
use form_engine_core::schema::{ConfigShape, FieldKind};

fn data(v: Value) -> FormData {
    v.as_object().cloned().unwrap_or_default()
}

fn render_pass(
    registry: &ComponentRegistry,
    doc: &FormDocument,
    form_data: &FormData,
    navigation: Option<Navigation>,
) -> RenderNode {
    let config = EngineConfig::default();
    let dynamic = RuleEngine::new(&config).compute(doc.root(), form_data);
    let context = Map::new();
    let ctx = RenderContext::new(form_data, &dynamic, &context).with_navigation(navigation);
    DynamicRenderer::new(registry, &config)
        .render(doc.root(), &ctx)
        .expect("root renders")
}

const SHIPPING: &str = r#"
type: form
title: Checkout
children:
  - type: page
    id: contact
    title: Contact
    children:
      - type: email
        id: email
        label: Email *
      - type: checkbox
        id: ship_elsewhere
        checkboxLabel: Ship to a different address
  - type: page
    id: shipping
    title: Shipping
    children:
      - type: text
        id: street
        label: Street
        hidden: true
        rules:
          - when: { field: ship_elsewhere, is: true }
            then:
              - set: { hidden: false, label: "Street *" }
              - log: ["shipping address requested"]
      - type: select
        id: speed
        label: Speed
        options:
          - { value: std, label: Standard }
          - { value: exp, label: Express }
        condition: { "!!": [{ var: formData.email }] }
"#;

/// Setting the controlling checkbox reveals the dependent field on the
/// second page; clearing it removes the field again.
#[test]
#[timeout(5000)]
fn test_rule_driven_reveal_across_pages() {
    let registry = ComponentRegistry::with_builtins();
    let doc = FormDocument::from_yaml_str(SHIPPING).unwrap();
    let second_page = Some(Navigation {
        current_page_index: 1,
        total_pages: 2,
    });

    let tree = render_pass(&registry, &doc, &data(json!({})), second_page);
    assert!(tree.find("street").is_none());
    assert!(tree.find("contact").is_none());
    assert!(tree.find("shipping").is_some());

    let tree = render_pass(
        &registry,
        &doc,
        &data(json!({"ship_elsewhere": true})),
        second_page,
    );
    let street = tree.find("street").unwrap();
    // Overrides skip the label normalizer, so the raw label is shown as set
    assert_eq!(street.props.get("label"), Some(&json!("Street *")));
}

#[test]
#[timeout(5000)]
fn test_condition_on_other_field_gates_select() {
    let registry = ComponentRegistry::with_builtins();
    let doc = FormDocument::from_yaml_str(SHIPPING).unwrap();

    let tree = render_pass(&registry, &doc, &data(json!({"email": ""})), None);
    assert!(tree.find("speed").is_none());

    let tree = render_pass(&registry, &doc, &data(json!({"email": "a@b.c"})), None);
    let speed = tree.find("speed").unwrap();
    assert_eq!(speed.props["options"][1]["label"], json!("Express"));
}

#[test]
#[timeout(5000)]
fn test_checkbox_reveals_hidden_text_field() {
    let registry = ComponentRegistry::with_builtins();
    let doc = FormDocument::from_value(json!({"type": "form", "children": [
        {"type": "page", "id": "p1", "children": [
            {"id": "f", "type": "checkbox"},
            {"id": "g", "type": "text", "hidden": true,
             "rules": [{"when": {"field": "f", "is": true}, "then": [{"set": {"hidden": false}}]}]}
        ]}
    ]}))
    .unwrap();

    let on = data(json!({"f": true}));
    let props = compute_dynamic_props(doc.root(), &on);
    assert_eq!(props["g"]["hidden"], json!(false));
    assert!(render_pass(&registry, &doc, &on, None).find("g").is_some());

    let off = data(json!({"f": false}));
    assert!(render_pass(&registry, &doc, &off, None).find("g").is_none());
}

#[test]
#[timeout(5000)]
fn test_failures_stay_local_across_the_tree() {
    let registry = ComponentRegistry::with_builtins();
    let doc = FormDocument::from_value(json!({"type": "form", "id": "root", "children": [
        {"type": "page", "id": "p1", "children": [
            {"type": "text", "id": "a"},
            {"type": "bogus"},
            {"type": "radiogroup", "id": "r", "options": "nope"},
            {"type": "text", "id": "b"}
        ]},
        {"type": "html", "id": "footer", "content": "<small>fine print</small>"}
    ]}))
    .unwrap();

    let tree = render_pass(&registry, &doc, &FormData::new(), None);
    let fallback_paths: Vec<&str> = tree
        .iter()
        .filter_map(RenderNode::as_fallback)
        .map(|f| f.path.as_str())
        .collect();
    assert_eq!(
        fallback_paths,
        vec!["children[0].children[1]", "children[0].children[2]"]
    );
    for id in ["root", "p1", "a", "b", "footer"] {
        assert!(tree.find(id).is_some(), "{} should render", id);
    }
}

/// A host type registered next to the built-ins renders through the same
/// pipeline, including rules targeting it.
#[test]
#[timeout(5000)]
fn test_host_registered_type() {
    let registry = ComponentRegistry::with_builtins();
    registry.register(
        "rating",
        ComponentDefinition::from_shape(
            ComponentKind::Field,
            ConfigShape::field().required("max", FieldKind::PositiveInteger),
        ),
    );
    let doc = FormDocument::from_value(json!({"type": "form", "children": [
        {"type": "rating", "id": "stars", "max": 5,
         "rules": [{"when": {"field": "expert", "is": true}, "then": [{"set": {"max": 10}}]}]}
    ]}))
    .unwrap();

    let tree = render_pass(&registry, &doc, &data(json!({"expert": true})), None);
    let stars = tree.find("stars").unwrap();
    assert_eq!(stars.component, "rating");
    assert_eq!(stars.props.get("max"), Some(&json!(10)));

    let report = doc.validate(&registry, &EngineConfig::default());
    assert!(report.is_ok(), "{:?}", report.errors);
}

#[test]
#[timeout(5000)]
fn test_independent_registries_do_not_interfere() {
    let stock = ComponentRegistry::with_builtins();
    let trimmed = ComponentRegistry::with_builtins();
    trimmed.remove("checkbox");

    let doc = FormDocument::from_value(json!({"type": "form", "children": [
        {"type": "checkbox", "id": "agree"}
    ]}))
    .unwrap();
    assert!(!render_pass(&stock, &doc, &FormData::new(), None).children()[0].is_fallback());
    assert!(render_pass(&trimmed, &doc, &FormData::new(), None).children()[0].is_fallback());
}
