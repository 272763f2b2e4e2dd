use serde_json::Value;

use super::{Fallback, Props, RenderChildren, RenderContext, RenderNode};
use crate::condition;
use crate::config::EngineConfig;
use crate::registry::ComponentRegistry;
use crate::schema::{NodePath, SchemaError, SchemaValidator, ValidatedNode};

/// Turns a raw schema tree into render instructions.
///
/// Failures stay local: a node that cannot be rendered becomes a
/// [`RenderNode::Fallback`] at its position while its siblings and
/// ancestors render normally.
#[derive(Debug, Clone)]
pub struct DynamicRenderer<'r> {
    validator: SchemaValidator<'r>,
    max_depth: usize,
    root_id: String,
}

impl<'r> DynamicRenderer<'r> {
    pub fn new(registry: &'r ComponentRegistry, config: &EngineConfig) -> Self {
        Self {
            validator: SchemaValidator::new(registry, config),
            max_depth: config.max_depth,
            root_id: config.root_id.clone(),
        }
    }

    /// Renders a schema root.
    ///
    /// A root element without an `id` prop receives the configured root id.
    ///
    /// # Returns
    /// `None` when the root is hidden or its condition is false.
    pub fn render(&self, root: &Value, ctx: &RenderContext<'_>) -> Option<RenderNode> {
        let mut node = self.render_node(root, &NodePath::root(), ctx)?;
        if let RenderNode::Element(element) = &mut node {
            element
                .props
                .entry("id")
                .or_insert_with(|| Value::String(self.root_id.clone()));
        }
        let fallbacks = node.iter().filter(|n| n.is_fallback()).count();
        tracing::debug!(nodes = node.iter().count(), fallbacks, "render pass complete");
        Some(node)
    }

    /// Renders one node located at `path`, then its subtree.
    pub fn render_node(
        &self,
        raw: &Value,
        path: &NodePath,
        ctx: &RenderContext<'_>,
    ) -> Option<RenderNode> {
        if path.level() > self.max_depth {
            let error = SchemaError::TooDeep {
                path: path.to_string(),
                max: self.max_depth,
            };
            return Some(fallback(raw, path, error));
        }

        let node = match self.validator.validate(raw) {
            Ok(node) => node,
            Err(e) => return Some(fallback(raw, path, e.at(&path.to_string()))),
        };

        let node = match self.merge_dynamic_props(node, ctx) {
            Ok(node) => node,
            Err(e) => return Some(fallback(raw, path, e.at(&path.to_string()))),
        };

        if node.config.is_hidden()
            || !condition::evaluate(node.config.condition(), ctx.form_data, ctx.form_context)
        {
            return None;
        }

        let walker = ChildWalker {
            renderer: self,
            ctx,
            parent: path,
        };
        let mut props = match node.definition.transform_props() {
            Some(transform) => transform(&node.config, ctx, &walker),
            None => {
                let children = node
                    .config
                    .children()
                    .map(|children| walker.render_children(children))
                    .unwrap_or_default();
                Props::from_config(&node.config).with_children(children)
            }
        };
        for (key, value) in node.extra {
            props.values.insert(key, value);
        }

        node.definition
            .renderer()
            .render(node.config.type_name(), props)
    }

    fn merge_dynamic_props(
        &self,
        node: ValidatedNode,
        ctx: &RenderContext<'_>,
    ) -> Result<ValidatedNode, SchemaError> {
        let overrides = node
            .config
            .id()
            .and_then(|id| ctx.dynamic_props.get(id))
            .filter(|overrides| !overrides.is_empty());
        match overrides {
            Some(overrides) => self.validator.apply_overrides(&node, overrides),
            None => Ok(node),
        }
    }
}

fn fallback(raw: &Value, path: &NodePath, error: SchemaError) -> RenderNode {
    tracing::error!(path = %path, error = %error, "component rendered as fallback");
    RenderNode::Fallback(Fallback {
        path: path.to_string(),
        message: error.to_string(),
        config: raw.clone(),
        error,
    })
}

/// Children callback handed to prop transforms.
struct ChildWalker<'a, 'r> {
    renderer: &'a DynamicRenderer<'r>,
    ctx: &'a RenderContext<'a>,
    parent: &'a NodePath,
}

impl RenderChildren for ChildWalker<'_, '_> {
    fn render_child(&self, index: usize, child: &Value) -> Option<RenderNode> {
        self.renderer
            .render_node(child, &self.parent.child(index), self.ctx)
    }
}
