//! DeliveryEngine - the caller-facing surface of the resolution core.
//!
//! Configure once (`&mut self`), then share across threads and resolve
//! (`&self`) any number of independent graphs concurrently.
//!
//! ```ignore
//! let mut engine = DeliveryEngine::new();
//! engine.register::<Article>()?;
//! engine.set_content_link_resolver(|link| format!("/{}", link.url_slug));
//!
//! let graph = engine.resolve_graph(&response.into_graph())?;
//! let article: Article = engine.cast_root(&graph)?.unwrap();
//! ```

use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::config::ResolverConfig;
use crate::error::Result;
use crate::model::{ContentGraph, ContentItem, Element, Link};
use crate::projection::{ContentShape, DynamicItem, Projector};
use crate::registry::TypeRegistry;
use crate::rich_text::template::TemplateResolver;
use crate::rich_text::{DefaultInlinePolicy, RichTextResolver};

/// Type registry plus rich-text resolution settings.
#[derive(Default)]
pub struct DeliveryEngine {
    registry: TypeRegistry,
    rich_text: RichTextResolver,
}

impl std::fmt::Debug for DeliveryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryEngine")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl DeliveryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with the policy, templates and model variables of `config`.
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        let mut engine = Self::new();
        engine.set_default_inline_policy(config.default_inline_resolver);
        for (name, value) in &config.model_variables {
            engine.set_model_variable(name.clone(), value.clone());
        }
        if config.has_templates() {
            let resolver = config.template_resolver()?;
            debug!(
                templates = resolver.content_types().count(),
                "Loaded inline templates"
            );
            engine.add_template_resolver(resolver);
        }
        Ok(engine)
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    pub fn rich_text(&self) -> &RichTextResolver {
        &self.rich_text
    }

    // ========================================================================
    // CONFIGURATION
    // ========================================================================

    pub fn register_type<T: ContentShape>(&mut self, tag: impl Into<String>) {
        self.registry.register_type::<T>(tag);
    }

    pub fn register<T: ContentShape>(&mut self) -> Result<()> {
        self.registry.register::<T>()
    }

    pub fn register_inline_resolver<T, F>(&mut self, resolver: F)
    where
        T: ContentShape,
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.registry.register_inline_resolver::<T, F>(resolver);
    }

    pub fn register_default_inline_resolver<F>(&mut self, resolver: F)
    where
        F: Fn(&ContentItem) -> String + Send + Sync + 'static,
    {
        self.registry.register_default_inline_resolver(resolver);
    }

    pub fn set_content_link_resolver<F>(&mut self, resolver: F)
    where
        F: Fn(&Link) -> String + Send + Sync + 'static,
    {
        self.rich_text.links_mut().content = Some(Arc::new(resolver));
    }

    pub fn set_broken_link_resolver<F>(&mut self, resolver: F)
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.rich_text.links_mut().broken = Some(Arc::new(resolver));
    }

    /// Append a post-processing step. Steps run in registration order.
    pub fn add_text_resolver<F>(&mut self, resolver: F)
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        self.rich_text.add_text_resolver(Arc::new(resolver));
    }

    pub fn add_template_resolver(&mut self, resolver: impl TemplateResolver + 'static) {
        self.rich_text.add_template_resolver(Box::new(resolver));
    }

    pub fn set_model_variable(&mut self, name: impl Into<String>, value: Value) {
        self.rich_text.set_model_variable(name, value);
    }

    pub fn set_default_inline_policy(&mut self, policy: DefaultInlinePolicy) {
        self.rich_text.set_default_policy(policy);
    }

    // ========================================================================
    // PROJECTION
    // ========================================================================

    pub fn projector(&self) -> Projector<'_> {
        Projector::new(&self.registry)
    }

    /// Convert one item of `graph` into shape `T`. Root items see the whole
    /// closure; a linked item sees the closure without itself.
    pub fn convert<T: ContentShape>(&self, graph: &ContentGraph, item: &ContentItem) -> Result<T> {
        let view = graph.closure().without(item.codename());
        self.projector().convert::<T>(item, &view)
    }

    /// Convert one item of `graph` by content-type dispatch.
    pub fn convert_dynamic(&self, graph: &ContentGraph, item: &ContentItem) -> Result<DynamicItem> {
        let view = graph.closure().without(item.codename());
        self.projector().convert_dynamic(item, &view)
    }

    /// Convert the first root item. `None` for an empty listing.
    pub fn cast_root<T: ContentShape>(&self, graph: &ContentGraph) -> Result<Option<T>> {
        graph
            .root()
            .map(|item| self.convert::<T>(graph, item))
            .transpose()
    }

    /// Convert every root item.
    pub fn cast_items<T: ContentShape>(&self, graph: &ContentGraph) -> Result<Vec<T>> {
        graph
            .roots()
            .iter()
            .map(|item| self.convert::<T>(graph, item))
            .collect()
    }

    // ========================================================================
    // RICH TEXT
    // ========================================================================

    /// Fully resolve one element of `graph`. `None` when it is not rich text.
    pub fn resolve_rich_text(&self, graph: &ContentGraph, element: &Element) -> Result<Option<String>> {
        self.rich_text.resolve(&self.registry, graph, element)
    }

    /// Copy of `item` with its rich-text elements resolved.
    pub fn resolve_item(&self, graph: &ContentGraph, item: &ContentItem) -> Result<ContentItem> {
        self.rich_text.resolve_item(&self.registry, graph, item)
    }

    /// Copy of `graph` whose root items have their rich text resolved. The
    /// closure is left as decoded.
    pub fn resolve_graph(&self, graph: &ContentGraph) -> Result<ContentGraph> {
        let roots = graph
            .roots()
            .iter()
            .map(|item| self.resolve_item(graph, item))
            .collect::<Result<Vec<_>>>()?;
        Ok(graph.with_roots(roots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_engine_is_send_sync() {
        assert_send_sync::<DeliveryEngine>();
    }

    #[test]
    fn test_from_config_applies_policy() {
        let config = ResolverConfig::from_yaml_str("default_inline_resolver: preserve_marker").unwrap();
        let engine = DeliveryEngine::from_config(&config).unwrap();
        assert_eq!(
            engine.rich_text().default_policy(),
            DefaultInlinePolicy::PreserveMarker
        );
    }
}
