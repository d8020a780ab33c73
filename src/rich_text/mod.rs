//! Rich-text resolver - turns raw rich-text values into final text.
//!
//! # Passes
//!
//! ```text
//! raw value
//!   -> link pass          fill href slots from the element's link map
//!   -> embedded pass      replace <object> markers with rendered items,
//!                         recursing into the rendered text (cycle-guarded)
//!   -> text resolvers     caller post-processing, in registration order
//! final text
//! ```
//!
//! An embedded item is rendered by, in order: the inline resolver registered
//! for the shape its content type maps to, the first template resolver that
//! supports it, or the default inline resolver (subject to
//! [`DefaultInlinePolicy`]). When none applies, or the codename is missing
//! from the closure, or it is already being rendered further up the same
//! path, the marker is kept verbatim.

pub mod links;
pub mod markup;
pub mod template;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::any::Any;
use tracing::trace;

use crate::error::Result;
use crate::model::{ContentGraph, ContentItem, Element, RichTextElement};
use crate::projection::Projector;
use crate::registry::TypeRegistry;
use links::{LinkResolvers, TextResolverFn};
use markup::{EmbeddedMarker, EMBEDDED_RE};
use template::{TemplateModel, TemplateResolver};

/// Whether the default inline resolver renders items no other resolver
/// handles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultInlinePolicy {
    /// Render them with the default resolver, when one is registered.
    #[default]
    Apply,
    /// Keep their markers.
    PreserveMarker,
}

/// Rich-text resolution settings. Read-only while resolving.
#[derive(Default)]
pub struct RichTextResolver {
    links: LinkResolvers,
    text_resolvers: Vec<TextResolverFn>,
    template_resolvers: Vec<Box<dyn TemplateResolver>>,
    model_variables: Map<String, Value>,
    default_policy: DefaultInlinePolicy,
}

/// One top-level resolution: the graph and the element being resolved.
struct Pass<'a> {
    registry: &'a TypeRegistry,
    graph: &'a ContentGraph,
    element: &'a Element,
}

impl RichTextResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn links(&self) -> &LinkResolvers {
        &self.links
    }

    pub fn links_mut(&mut self) -> &mut LinkResolvers {
        &mut self.links
    }

    pub fn add_text_resolver(&mut self, resolver: TextResolverFn) {
        self.text_resolvers.push(resolver);
    }

    pub fn add_template_resolver(&mut self, resolver: Box<dyn TemplateResolver>) {
        self.template_resolvers.push(resolver);
    }

    /// Variables added to every template model.
    pub fn set_model_variable(&mut self, name: impl Into<String>, value: Value) {
        self.model_variables.insert(name.into(), value);
    }

    pub fn default_policy(&self) -> DefaultInlinePolicy {
        self.default_policy
    }

    pub fn set_default_policy(&mut self, policy: DefaultInlinePolicy) {
        self.default_policy = policy;
    }

    /// Fully resolve one element. `None` when it is not rich text.
    ///
    /// Embedded items are looked up in the closure of the graph owning the
    /// element. An element owned by another graph, or by none, keeps its
    /// embedded-item markers.
    pub fn resolve(
        &self,
        registry: &TypeRegistry,
        graph: &ContentGraph,
        element: &Element,
    ) -> Result<Option<String>> {
        let Some(rich) = element.as_rich_text() else {
            return Ok(None);
        };
        let pass = Pass {
            registry,
            graph,
            element,
        };
        let linked = self.links.resolve(rich);
        let embedded = if graph.owner_of(element).is_some() {
            self.resolve_embedded(&pass, &linked, &[])?
        } else {
            trace!(
                element = element.codename(),
                graph = %graph.id(),
                "Element not owned by graph, keeping embedded markers"
            );
            linked
        };
        Ok(Some(self.post_process(embedded)))
    }

    /// Copy of `item` with every rich-text element fully resolved.
    pub fn resolve_item(
        &self,
        registry: &TypeRegistry,
        graph: &ContentGraph,
        item: &ContentItem,
    ) -> Result<ContentItem> {
        let mut resolved = Vec::new();
        for element in item.elements().values() {
            if let Some(text) = self.resolve(registry, graph, element)? {
                resolved.push(element.with_rich_text_value(text));
            }
        }
        Ok(item.with_elements(resolved))
    }

    fn post_process(&self, text: String) -> String {
        self.text_resolvers
            .iter()
            .fold(text, |text, resolver| resolver(text))
    }

    /// Replace every embedded-item marker in `text`. `visited` holds the
    /// codenames being rendered on the current path.
    fn resolve_embedded(&self, pass: &Pass<'_>, text: &str, visited: &[String]) -> Result<String> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in EMBEDDED_RE.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&text[last..whole.start()]);
            match self.render_marker(pass, &caps["attrs"], visited)? {
                Some(rendered) => out.push_str(&rendered),
                None => out.push_str(whole.as_str()),
            }
            last = whole.end();
        }
        out.push_str(&text[last..]);
        Ok(out)
    }

    fn render_marker(
        &self,
        pass: &Pass<'_>,
        attrs: &str,
        visited: &[String],
    ) -> Result<Option<String>> {
        let marker = EmbeddedMarker::parse(attrs);
        let Some(codename) = marker.codename else {
            trace!(attrs, "Embedded marker without codename");
            return Ok(None);
        };
        if visited.contains(&codename) {
            trace!(codename = %codename, "Embedded item already on path, keeping marker");
            return Ok(None);
        }
        let Some(item) = pass.graph.lookup(&codename) else {
            trace!(codename = %codename, "Embedded item not in response, keeping marker");
            return Ok(None);
        };

        let item = self.resolve_item_links(item);
        let Some(rendered) = self.render_item(pass, &item)? else {
            trace!(codename = %codename, "No resolver for embedded item, keeping marker");
            return Ok(None);
        };

        let mut nested = visited.to_vec();
        nested.push(codename);
        self.resolve_embedded(pass, &rendered, &nested).map(Some)
    }

    /// Copy of `item` with the link pass applied to its rich-text elements.
    fn resolve_item_links(&self, item: &ContentItem) -> ContentItem {
        let resolved = item
            .elements()
            .values()
            .filter_map(|element| {
                element
                    .as_rich_text()
                    .map(|rich: &RichTextElement| element.with_rich_text_value(self.links.resolve(rich)))
            })
            .collect();
        item.with_elements(resolved)
    }

    fn render_item(&self, pass: &Pass<'_>, item: &ContentItem) -> Result<Option<String>> {
        let projector = Projector::new(pass.registry);
        let view = pass.graph.closure().without(item.codename());

        if let Some(shape) = pass.registry.shape_for(item.content_type()) {
            if let Some(resolver) = pass.registry.inline_resolver_for(shape) {
                let value = projector.convert_shape(shape, item, &view)?;
                let instance: &dyn Any = &*value;
                if let Some(rendered) = resolver(instance) {
                    trace!(codename = item.codename(), shape = shape.type_name(), "Inline resolver");
                    return Ok(Some(rendered));
                }
            }
        }

        if !self.template_resolvers.is_empty() {
            let mut variables = self.model_variables.clone();
            variables.insert("parent".to_string(), serde_json::to_value(pass.element)?);
            let model = TemplateModel {
                item: item.clone(),
                projection: projector.convert_dynamic(item, &view)?,
                variables,
            };
            if let Some(resolver) = self.template_resolvers.iter().find(|r| r.supports(&model)) {
                trace!(codename = item.codename(), "Template resolver");
                return resolver.resolve(&model).map(Some);
            }
        }

        match (self.default_policy, pass.registry.default_inline_resolver()) {
            (DefaultInlinePolicy::Apply, Some(resolver)) => {
                trace!(codename = item.codename(), "Default inline resolver");
                Ok(Some(resolver(item)))
            }
            _ => Ok(None),
        }
    }
}
