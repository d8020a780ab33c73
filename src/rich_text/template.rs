//! Template-based rendering of embedded items.
//!
//! When no inline resolver is registered for an embedded item's shape, the
//! resolver builds a [`TemplateModel`] and asks each configured
//! [`TemplateResolver`] in turn whether it supports it. The first that does
//! renders the item.

use handlebars::Handlebars;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

use crate::error::{DeliveryError, Result};
use crate::model::ContentItem;
use crate::projection::DynamicItem;

/// Everything a template resolver sees of one embedded item.
#[derive(Debug)]
pub struct TemplateModel {
    /// The embedded item, with its own links already resolved.
    pub item: ContentItem,
    /// The item converted by content-type dispatch.
    pub projection: DynamicItem,
    /// Variables: `parent` (the rich-text element being resolved) plus any
    /// configured defaults.
    pub variables: Map<String, Value>,
}

impl TemplateModel {
    pub fn content_type(&self) -> &str {
        self.item.content_type()
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }
}

/// Renders embedded items from a [`TemplateModel`].
pub trait TemplateResolver: Send + Sync {
    fn supports(&self, model: &TemplateModel) -> bool;

    fn resolve(&self, model: &TemplateModel) -> Result<String>;
}

/// Handlebars templates keyed by content type.
///
/// Templates render against `{ "model": <item as flat JSON>, ..variables }`.
pub struct HandlebarsTemplateResolver {
    handlebars: Handlebars<'static>,
    content_types: BTreeSet<String>,
}

impl HandlebarsTemplateResolver {
    pub fn new() -> Self {
        Self {
            handlebars: Handlebars::new(),
            content_types: BTreeSet::new(),
        }
    }

    /// Register (or replace) the template for `content_type`.
    pub fn register_template(&mut self, content_type: &str, source: &str) -> Result<()> {
        self.handlebars
            .register_template_string(content_type, source)
            .map_err(|e| DeliveryError::Template {
                content_type: content_type.to_string(),
                message: e.to_string(),
            })?;
        debug!(content_type, "Registered inline template");
        self.content_types.insert(content_type.to_string());
        Ok(())
    }

    /// Register every `*.hbs` file in `dir`, keyed by file stem.
    pub fn register_template_dir(&mut self, dir: &Path) -> Result<usize> {
        let mut count = 0;
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("hbs") {
                continue;
            }
            let Some(content_type) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let source = std::fs::read_to_string(&path)?;
            self.register_template(content_type, &source)?;
            count += 1;
        }
        Ok(count)
    }

    pub fn has_template(&self, content_type: &str) -> bool {
        self.content_types.contains(content_type)
    }

    pub fn content_types(&self) -> impl Iterator<Item = &str> {
        self.content_types.iter().map(String::as_str)
    }
}

impl Default for HandlebarsTemplateResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateResolver for HandlebarsTemplateResolver {
    fn supports(&self, model: &TemplateModel) -> bool {
        self.has_template(model.content_type())
    }

    fn resolve(&self, model: &TemplateModel) -> Result<String> {
        let mut data = model.variables.clone();
        data.insert("model".to_string(), model.item.to_template_value());
        self.handlebars
            .render(model.content_type(), &Value::Object(data))
            .map_err(|e| DeliveryError::Template {
                content_type: model.content_type().to_string(),
                message: e.to_string(),
            })
    }
}
