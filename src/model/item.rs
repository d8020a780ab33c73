//! Content items and their system metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::element::{Asset, Element, ElementValue};
use super::graph::GraphId;
use super::keyed::KeyedMap;

/// Identity and classification metadata of a content item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct System {
    /// Opaque item id.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    pub codename: String,
    /// Language tag.
    #[serde(default)]
    pub language: String,
    /// Content-type tag.
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(default)]
    pub sitemap_locations: Vec<String>,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_step: Option<String>,
}

impl System {
    pub fn new(codename: impl Into<String>, content_type: impl Into<String>) -> Self {
        let codename = codename.into();
        Self {
            name: codename.clone(),
            codename,
            content_type: content_type.into(),
            ..Default::default()
        }
    }
}

/// One content entry: metadata plus an ordered map of elements.
///
/// Items are immutable once decoded; the only wiring applied afterwards is the
/// owning-graph id and the elements' owning-item codename, set by
/// [`ContentGraph::attach`](super::graph::ContentGraph::attach).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    system: System,
    #[serde(default)]
    elements: KeyedMap<Element>,
    #[serde(skip)]
    graph: Option<GraphId>,
}

impl ContentItem {
    pub fn new(system: System, elements: impl IntoIterator<Item = Element>) -> Self {
        let elements = elements
            .into_iter()
            .map(|e| (e.codename().to_string(), e))
            .collect();
        Self {
            system,
            elements,
            graph: None,
        }
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    pub fn codename(&self) -> &str {
        &self.system.codename
    }

    /// Content-type tag from the system block.
    pub fn content_type(&self) -> &str {
        &self.system.content_type
    }

    pub fn elements(&self) -> &KeyedMap<Element> {
        &self.elements
    }

    pub fn element(&self, codename: &str) -> Option<&Element> {
        self.elements.get(codename)
    }

    /// Graph this item was attached to, if any.
    pub fn graph_id(&self) -> Option<GraphId> {
        self.graph
    }

    /// Text value of a text-shaped element. Absent when the element is
    /// missing or holds a non-text variant.
    pub fn text_value(&self, codename: &str) -> Option<&str> {
        self.element(codename).and_then(|e| e.value().as_text())
    }

    /// Assets of an asset element. Empty when the element is missing or holds
    /// another variant.
    pub fn asset_list(&self, codename: &str) -> &[Asset] {
        match self.element(codename).map(Element::value) {
            Some(ElementValue::AssetList { value }) => value,
            _ => &[],
        }
    }

    /// Flat JSON view used as a template model: `system` plus every element
    /// value keyed by codename.
    pub fn to_template_value(&self) -> Value {
        let mut map = Map::new();
        map.insert(
            "system".to_string(),
            serde_json::to_value(&self.system).unwrap_or(Value::Null),
        );
        for (codename, element) in self.elements.iter() {
            map.insert(codename.to_string(), element_json(element.value()));
        }
        Value::Object(map)
    }

    pub(crate) fn attach(&mut self, graph: GraphId) {
        self.graph = Some(graph);
        let owner = self.system.codename.clone();
        for (key, element) in self.elements.iter_mut() {
            element.attach(key, &owner, graph);
        }
    }

    /// Copy of this item with the given elements swapped in by codename.
    pub(crate) fn with_elements(&self, replaced: Vec<Element>) -> Self {
        let mut copy = self.clone();
        for element in replaced {
            copy.elements.insert(element.codename().to_string(), element);
        }
        copy
    }
}

fn element_json(value: &ElementValue) -> Value {
    match value {
        ElementValue::Text { value } | ElementValue::UrlSlug { value } => {
            Value::String(value.clone())
        }
        ElementValue::RichText(rich) => Value::String(rich.value.clone()),
        ElementValue::Number { value } => value
            .map(|d| Value::String(d.to_string()))
            .unwrap_or(Value::Null),
        ElementValue::DateTime { value } => value
            .map(|d| Value::String(d.to_rfc3339()))
            .unwrap_or(Value::Null),
        ElementValue::MultipleChoice { value, .. } => {
            serde_json::to_value(value).unwrap_or(Value::Null)
        }
        ElementValue::AssetList { value } => serde_json::to_value(value).unwrap_or(Value::Null),
        ElementValue::LinkedItemList { value } => {
            serde_json::to_value(value).unwrap_or(Value::Null)
        }
        ElementValue::Taxonomy { value, .. } => serde_json::to_value(value).unwrap_or(Value::Null),
    }
}
