use serde_json::Value;

use super::typed_validator;
use crate::registry::{ComponentDefinition, ComponentKind, ComponentRegistry};
use crate::render::{ElementRenderer, FormEvent, Props, RenderChildren, RenderContext};
use crate::schema::{is_page, ComponentConfig, ConfigShape, FieldKind};

/// HTML elements that cannot hold content.
pub const VOID_ELEMENTS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const DEFAULT_SUBMIT_TEXT: &str = "Submit";

pub(super) fn register_layout_components(registry: &ComponentRegistry) {
    registry.register(
        "form",
        ComponentDefinition::new(
            ComponentKind::Container,
            typed_validator(
                ConfigShape::container()
                    .optional("title", FieldKind::String)
                    .optional("display", FieldKind::OneOf(&["multipage", "singlepage"]))
                    .optional("submitButtonText", FieldKind::String)
                    .optional("submitButtonClassName", FieldKind::String)
                    .optional("className", FieldKind::String)
                    .optional("style", FieldKind::Object),
                ComponentConfig::Form,
            ),
            ElementRenderer,
        )
        .with_transform_props(form_props),
    );

    registry.register(
        "page",
        ComponentDefinition::new(
            ComponentKind::Container,
            typed_validator(
                ConfigShape::container()
                    .optional("title", FieldKind::String)
                    .optional("className", FieldKind::String)
                    .optional("style", FieldKind::Object),
                ComponentConfig::Page,
            ),
            ElementRenderer,
        )
        .with_transform_props(page_props),
    );

    registry.register(
        "html",
        ComponentDefinition::new(
            ComponentKind::Static,
            typed_validator(
                ConfigShape::node()
                    .required("content", FieldKind::String)
                    .optional("tag", FieldKind::String)
                    .optional("className", FieldKind::String)
                    .optional("style", FieldKind::Object),
                ComponentConfig::Html,
            ),
            ElementRenderer,
        )
        .with_transform_props(html_props),
    );
}

/// Root form. In multi-page mode only the current page renders.
fn form_props(
    config: &ComponentConfig,
    ctx: &RenderContext<'_>,
    walker: &dyn RenderChildren,
) -> Props {
    let ComponentConfig::Form(form) = config else {
        return Props::from_config(config);
    };
    let props = Props::new()
        .with_opt("id", form.meta.id.as_deref())
        .with_opt("title", form.title.as_deref())
        .with_opt("className", form.class_name.as_deref())
        .with_opt("style", form.style.clone())
        .with(
            "submitButtonText",
            form.submit_button_text.as_deref().unwrap_or(DEFAULT_SUBMIT_TEXT),
        )
        .with_opt(
            "submitButtonClassName",
            form.submit_button_class_name.as_deref(),
        );

    let Some(nav) = ctx.navigation else {
        return props
            .with("isMultiPage", false)
            .with("onSubmit", FormEvent::Submit.binding())
            .with_children(walker.render_children(&form.children));
    };

    let mut page_index = 0;
    let mut children = Vec::new();
    for (index, child) in form.children.iter().enumerate() {
        if is_page(child) {
            let current = page_index == nav.current_page_index;
            page_index += 1;
            if !current {
                continue;
            }
        }
        children.extend(walker.render_child(index, child));
    }

    let mut props = props
        .with("isMultiPage", true)
        .with("currentPageIndex", nav.current_page_index)
        .with("totalPages", nav.total_pages)
        .with("isFirstPage", nav.is_first_page())
        .with("isLastPage", nav.is_last_page())
        .with_children(children);
    if !nav.is_first_page() {
        props.set("onNavigatePrev", FormEvent::NavigatePrev.binding());
    }
    if nav.is_last_page() {
        props.set("onSubmit", FormEvent::Submit.binding());
    } else {
        props.set("onNavigateNext", FormEvent::NavigateNext.binding());
    }
    props
}

fn page_props(
    config: &ComponentConfig,
    _: &RenderContext<'_>,
    walker: &dyn RenderChildren,
) -> Props {
    let ComponentConfig::Page(page) = config else {
        return Props::from_config(config);
    };
    Props::new()
        .with_opt("id", page.meta.id.as_deref())
        .with_opt("title", page.title.as_deref())
        .with_opt("className", page.class_name.as_deref())
        .with_opt("style", page.style.clone())
        .with_children(walker.render_children(&page.children))
}

fn html_props(
    config: &ComponentConfig,
    _: &RenderContext<'_>,
    _: &dyn RenderChildren,
) -> Props {
    let ComponentConfig::Html(html) = config else {
        return Props::from_config(config);
    };
    let tag = html
        .tag
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "div".to_string());
    let content = (!VOID_ELEMENTS.contains(&tag.as_str())).then(|| html.content.clone());

    Props::new()
        .with_opt("id", html.meta.id.as_deref())
        .with("tag", tag)
        .with_opt("content", content)
        .with_opt("className", html.class_name.as_deref())
        .with_opt("style", html.style.clone())
}
