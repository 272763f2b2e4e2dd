use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use super::*;
use crate::config::FormMode;
use crate::registry::{ComponentDefinition, ComponentKind};
use crate::render::{ElementRenderer, LeafRenderer, Props, RenderNode};
use crate::rules::{compute_dynamic_props, DynamicPropsMap};
use crate::schema::ConfigShape;
use crate::value::FormData;

fn render_with(
    registry: &ComponentRegistry,
    config: &EngineConfig,
    schema: &Value,
    data: Value,
) -> Option<RenderNode> {
    let data: FormData = data.as_object().cloned().unwrap_or_default();
    let dynamic = compute_dynamic_props(schema, &data);
    let context = Map::new();
    let ctx = RenderContext::new(&data, &dynamic, &context);
    DynamicRenderer::new(registry, config).render(schema, &ctx)
}

fn render(schema: &Value, data: Value) -> Option<RenderNode> {
    let registry = ComponentRegistry::with_builtins();
    render_with(&registry, &EngineConfig::default(), schema, data)
}

fn ids(node: &RenderNode) -> Vec<&str> {
    node.iter().filter_map(RenderNode::id).collect()
}

/// Form with one page holding `f` and a rule-revealed `g`.
fn reveal_schema() -> Value {
    json!({"type": "form", "children": [
        {"type": "page", "id": "p1", "children": [
            {"id": "f", "type": "checkbox"},
            {"id": "g", "type": "text", "hidden": true,
             "rules": [{"when": {"field": "f", "is": true}, "then": [{"set": {"hidden": false}}]}]}
        ]}
    ]})
}

/// Each node without conditions or rules renders exactly once, in order.
#[test]
fn test_every_node_rendered_once_in_document_order() {
    let visits = Arc::new(Mutex::new(Vec::new()));
    let registry = ComponentRegistry::with_builtins();
    let seen = Arc::clone(&visits);
    registry.register(
        "box",
        ComponentDefinition::from_shape(ComponentKind::Container, ConfigShape::container())
            .with_renderer(move |component: &str, props: Props| -> Option<RenderNode> {
                if let Some(Value::String(id)) = props.get("id") {
                    seen.lock().push(id.clone());
                }
                ElementRenderer.render(component, props)
            }),
    );

    let schema = json!({"type": "box", "id": "a", "children": [
        {"type": "box", "id": "b", "children": [
            {"type": "box", "id": "c"},
            {"type": "box", "id": "d"}
        ]},
        {"type": "box", "id": "e"}
    ]});
    let tree = render_with(&registry, &EngineConfig::default(), &schema, json!({})).unwrap();

    assert_eq!(ids(&tree), vec!["a", "b", "c", "d", "e"]);
    let mut visited = visits.lock().clone();
    visited.sort();
    assert_eq!(visited, vec!["a", "b", "c", "d", "e"]);
}

#[test]
fn test_default_props_carry_config_fields() {
    let registry = ComponentRegistry::new();
    registry.register(
        "badge",
        ComponentDefinition::from_shape(
            ComponentKind::Static,
            ConfigShape::node().required("text", crate::schema::FieldKind::String),
        ),
    );
    let tree = render_with(
        &registry,
        &EngineConfig::default(),
        &json!({"type": "badge", "id": "b", "text": "new"}),
        json!({}),
    )
    .unwrap();
    let element = tree.as_element().unwrap();
    assert_eq!(element.component, "badge");
    assert_eq!(element.props.get("text"), Some(&json!("new")));
    assert!(element.children.is_empty());
}

#[test]
fn test_rule_reveals_hidden_field() {
    let schema = reveal_schema();

    let shown = render(&schema, json!({"f": true})).unwrap();
    assert!(shown.find("g").is_some());

    let hidden = render(&schema, json!({"f": false})).unwrap();
    assert!(hidden.find("g").is_none());
    assert!(hidden.find("f").is_some());
}

#[test]
fn test_false_condition_removes_whole_subtree() {
    let schema = json!({"type": "form", "children": [
        {"type": "page", "id": "extra",
         "condition": {"==": [{"var": "formData.more"}, true]},
         "children": [{"type": "text", "id": "details"}]},
        {"type": "text", "id": "name"}
    ]});

    let tree = render(&schema, json!({"more": false})).unwrap();
    assert_eq!(ids(&tree), vec!["form-engine-root", "name"]);

    let tree = render(&schema, json!({"more": true})).unwrap();
    assert_eq!(ids(&tree), vec!["form-engine-root", "extra", "details", "name"]);
}

#[test]
fn test_condition_reads_host_context() {
    let schema = json!({"type": "form", "children": [
        {"type": "html", "id": "admin-note", "content": "internal",
         "condition": {"===": [{"var": "context.role"}, "admin"]}}
    ]});
    let registry = ComponentRegistry::with_builtins();
    let renderer = DynamicRenderer::new(&registry, &EngineConfig::default());
    let data = FormData::new();
    let dynamic = DynamicPropsMap::new();

    let mut context = Map::new();
    context.insert("role".to_string(), json!("admin"));
    let ctx = RenderContext::new(&data, &dynamic, &context);
    assert!(renderer.render(&schema, &ctx).unwrap().find("admin-note").is_some());

    context.insert("role".to_string(), json!("guest"));
    let ctx = RenderContext::new(&data, &dynamic, &context);
    assert!(renderer.render(&schema, &ctx).unwrap().find("admin-note").is_none());
}

#[test]
fn test_unknown_type_two_levels_deep_is_local() {
    let schema = json!({"type": "form", "children": [
        {"type": "page", "id": "p1", "children": [
            {"type": "text", "id": "before"},
            {"type": "bogus", "id": "mystery"},
            {"type": "text", "id": "after"}
        ]}
    ]});
    let tree = render(&schema, json!({})).unwrap();

    let page = tree.find("p1").unwrap();
    assert_eq!(page.children.len(), 3);
    let fallback = page.children[1].as_fallback().unwrap();
    assert_eq!(fallback.path, "children[0].children[1]");
    assert!(fallback.message.contains("Component type \"bogus\" not registered"));
    assert_eq!(fallback.config, json!({"type": "bogus", "id": "mystery"}));
    assert!(tree.find("before").is_some());
    assert!(tree.find("after").is_some());
}

#[test]
fn test_invalid_config_renders_fallback_with_field_path() {
    let schema = json!({"type": "form", "children": [
        {"type": "text", "id": "ok"},
        {"type": "select", "id": "country", "options": [{"value": "us", "label": 1}]},
        "not a node"
    ]});
    let tree = render(&schema, json!({})).unwrap();
    let fallbacks: Vec<&str> = tree
        .iter()
        .filter_map(RenderNode::as_fallback)
        .map(|f| f.error.path())
        .collect();
    assert_eq!(fallbacks, vec!["children[1].options[0].label", "children[2]"]);
    assert!(tree.find("ok").is_some());
}

#[test]
fn test_rejected_override_renders_fallback() {
    let schema = json!({"type": "form", "children": [
        {"type": "text", "id": "t",
         "rules": [{"when": {"field": "x", "is": 1}, "then": [{"set": {"label": ["not", "a", "string"]}}]}]}
    ]});
    let tree = render(&schema, json!({"x": 1})).unwrap();
    let fallback = tree.children()[0].as_fallback().unwrap();
    assert!(matches!(fallback.error, SchemaError::OverrideRejected { .. }));
    assert_eq!(fallback.path, "children[0]");

    let tree = render(&schema, json!({"x": 2})).unwrap();
    assert!(tree.find("t").is_some());
}

#[test]
fn test_override_keys_outside_the_config_reach_the_leaf() {
    let schema = json!({"type": "form", "children": [
        {"type": "text", "id": "t", "label": "Name",
         "rules": [{"when": {"field": "vip", "is": true},
                    "then": [{"set": {"label": "VIP name", "badge": "gold"}}]}]}
    ]});
    let tree = render(&schema, json!({"vip": true})).unwrap();
    let field = tree.find("t").unwrap();
    assert_eq!(field.props.get("label"), Some(&json!("VIP name")));
    assert_eq!(field.props.get("badge"), Some(&json!("gold")));
}

#[test]
fn test_root_id_and_hidden_root() {
    let tree = render(&json!({"type": "form", "id": "signup"}), json!({})).unwrap();
    assert_eq!(tree.id(), Some("signup"));

    let config = EngineConfig {
        root_id: "app-form".to_string(),
        ..Default::default()
    };
    let registry = ComponentRegistry::with_builtins();
    let tree = render_with(&registry, &config, &json!({"type": "form"}), json!({})).unwrap();
    assert_eq!(tree.id(), Some("app-form"));

    assert!(render(&json!({"type": "form", "hidden": true}), json!({})).is_none());
}

#[test]
fn test_leaf_returning_none_renders_nothing() {
    let registry = ComponentRegistry::with_builtins();
    registry.register(
        "spacer",
        ComponentDefinition::from_shape(ComponentKind::Static, ConfigShape::node())
            .with_renderer(|_: &str, _: Props| -> Option<RenderNode> { None }),
    );
    let schema = json!({"type": "form", "children": [{"type": "spacer"}, {"type": "text", "id": "a"}]});
    let tree = render_with(&registry, &EngineConfig::default(), &schema, json!({})).unwrap();
    assert_eq!(tree.children().len(), 1);
}

#[test]
fn test_nesting_beyond_max_depth_falls_back() {
    let config = EngineConfig {
        max_depth: 1,
        ..Default::default()
    };
    let registry = ComponentRegistry::with_builtins();
    let schema = json!({"type": "form", "children": [
        {"type": "page", "id": "p", "children": [{"type": "text", "id": "deep"}]}
    ]});
    let tree = render_with(&registry, &config, &schema, json!({})).unwrap();
    let page = tree.find("p").unwrap();
    assert!(matches!(
        page.children[0].as_fallback().map(|f| &f.error),
        Some(SchemaError::TooDeep { max: 1, .. })
    ));
}

#[test]
fn test_view_mode_reaches_field_props() {
    let schema = json!({"type": "form", "children": [{"type": "text", "id": "name"}]});
    let registry = ComponentRegistry::with_builtins();
    let data = FormData::new();
    let dynamic = DynamicPropsMap::new();
    let context = Map::new();
    let ctx = RenderContext::new(&data, &dynamic, &context).with_mode(FormMode::View);
    let tree = DynamicRenderer::new(&registry, &EngineConfig::default())
        .render(&schema, &ctx)
        .unwrap();
    assert_eq!(tree.find("name").unwrap().props.get("disabled"), Some(&json!(true)));
}

#[test]
fn test_render_tree_serializes_with_kind_tags() {
    let schema = json!({"type": "form", "children": [{"type": "bogus"}]});
    let tree = render(&schema, json!({})).unwrap();
    let out = serde_json::to_value(&tree).unwrap();
    assert_eq!(out["kind"], json!("element"));
    assert_eq!(out["component"], json!("form"));
    assert_eq!(out["children"][0]["kind"], json!("fallback"));
    assert_eq!(out["children"][0]["path"], json!("children[0]"));
}
