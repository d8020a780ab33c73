//! Element model - the typed fields of a content item.
//!
//! Serializes in the delivery API shape: the element's `type` tag selects the
//! variant and the remaining members carry its payload.
//!
//! ```text
//! "title": { "type": "text", "name": "Title", "value": "Coffee" }
//! "body":  { "type": "rich_text", "name": "Body", "value": "<p>..</p>",
//!            "links": {..}, "images": {..}, "modular_content": [..] }
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::graph::GraphId;
use super::keyed::KeyedMap;

/// One typed field of a content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Display name.
    #[serde(default)]
    name: String,
    /// Element codename. Filled from the element map key on attach when the
    /// payload omits it.
    #[serde(default)]
    codename: String,
    /// Codename of the owning item, set when the item is attached to a graph.
    #[serde(skip)]
    owner: Option<String>,
    #[serde(skip)]
    graph: Option<GraphId>,
    #[serde(flatten)]
    value: ElementValue,
}

impl Element {
    /// Create a detached element. Name and codename start out identical.
    pub fn new(codename: impl Into<String>, value: ElementValue) -> Self {
        let codename = codename.into();
        Self {
            name: codename.clone(),
            codename,
            owner: None,
            graph: None,
            value,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn codename(&self) -> &str {
        &self.codename
    }

    /// Codename of the item this element belongs to.
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Graph the owning item was attached to.
    pub fn graph_id(&self) -> Option<GraphId> {
        self.graph
    }

    pub fn value(&self) -> &ElementValue {
        &self.value
    }

    /// Wire type tag of the element (`text`, `rich_text`, ...).
    pub fn kind(&self) -> &'static str {
        self.value.kind()
    }

    pub fn as_rich_text(&self) -> Option<&RichTextElement> {
        match &self.value {
            ElementValue::RichText(rich) => Some(rich),
            _ => None,
        }
    }

    /// Copy of this element with its rich-text value replaced. Other variants
    /// are returned unchanged.
    pub(crate) fn with_rich_text_value(&self, value: String) -> Self {
        let mut copy = self.clone();
        if let ElementValue::RichText(rich) = &mut copy.value {
            rich.value = value;
        }
        copy
    }

    /// Wire the back-reference to the owning item. Idempotent.
    pub(crate) fn attach(&mut self, key: &str, owner: &str, graph: GraphId) {
        if self.codename.is_empty() {
            self.codename = key.to_string();
        }
        if self.name.is_empty() {
            self.name = self.codename.clone();
        }
        self.owner = Some(owner.to_string());
        self.graph = Some(graph);
    }
}

/// Tagged union over the element variants of the delivery API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementValue {
    Text {
        #[serde(default, deserialize_with = "null_as_default")]
        value: String,
    },
    RichText(RichTextElement),
    Number {
        #[serde(default)]
        value: Option<Decimal>,
    },
    MultipleChoice {
        #[serde(default, deserialize_with = "null_as_default")]
        value: Vec<MultipleChoiceOption>,
        /// Full option catalogue, present on content type responses.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<Vec<MultipleChoiceOption>>,
    },
    DateTime {
        #[serde(default)]
        value: Option<DateTime<Utc>>,
    },
    #[serde(rename = "asset")]
    AssetList {
        #[serde(default, deserialize_with = "null_as_default")]
        value: Vec<Asset>,
    },
    #[serde(rename = "modular_content")]
    LinkedItemList {
        #[serde(default, deserialize_with = "null_as_default")]
        value: Vec<String>,
    },
    Taxonomy {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        taxonomy_group: Option<String>,
        #[serde(default, deserialize_with = "null_as_default")]
        value: Vec<Taxonomy>,
    },
    UrlSlug {
        #[serde(default, deserialize_with = "null_as_default")]
        value: String,
    },
}

impl ElementValue {
    /// Wire type tag of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::RichText(_) => "rich_text",
            Self::Number { .. } => "number",
            Self::MultipleChoice { .. } => "multiple_choice",
            Self::DateTime { .. } => "date_time",
            Self::AssetList { .. } => "asset",
            Self::LinkedItemList { .. } => "modular_content",
            Self::Taxonomy { .. } => "taxonomy",
            Self::UrlSlug { .. } => "url_slug",
        }
    }

    /// String value of the text-shaped variants (text, rich text, URL slug).
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { value } | Self::UrlSlug { value } => Some(value),
            Self::RichText(rich) => Some(&rich.value),
            _ => None,
        }
    }

    /// Codenames of a linked-items element.
    pub fn linked_item_codenames(&self) -> Option<&[String]> {
        match self {
            Self::LinkedItemList { value } => Some(value),
            _ => None,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    pub fn number(value: Decimal) -> Self {
        Self::Number { value: Some(value) }
    }

    pub fn linked_items<I, S>(codenames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::LinkedItemList {
            value: codenames.into_iter().map(Into::into).collect(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// RICH TEXT
// ============================================================================

/// Raw rich-text value plus the maps its inline markup refers to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichTextElement {
    /// Raw markup containing link and embedded-item markers.
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
    /// Link targets keyed by the marker's `data-item-id`. `None` when the
    /// response carries no link map, in which case link markers stay as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<KeyedMap<Link>>,
    /// Inline images keyed by image id.
    #[serde(default)]
    pub images: KeyedMap<Image>,
    /// Codenames of embedded items, in document order.
    #[serde(
        default,
        rename = "modular_content",
        alias = "linked_items",
        deserialize_with = "null_as_default"
    )]
    pub linked_items: Vec<String>,
}

impl RichTextElement {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_link(mut self, id: impl Into<String>, link: Link) -> Self {
        self.links.get_or_insert_with(KeyedMap::new).insert(id, link);
        self
    }

    pub fn with_linked_items<I, S>(mut self, codenames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.linked_items = codenames.into_iter().map(Into::into).collect();
        self
    }
}

/// Target of a rich-text link marker. Present even when the referenced item
/// itself was not included in the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Content type of the linked item.
    #[serde(rename = "type")]
    pub content_type: String,
    pub codename: String,
    #[serde(default)]
    pub url_slug: String,
}

impl Link {
    pub fn new(
        content_type: impl Into<String>,
        codename: impl Into<String>,
        url_slug: impl Into<String>,
    ) -> Self {
        Self {
            content_type: content_type.into(),
            codename: codename.into(),
            url_slug: url_slug.into(),
        }
    }
}

/// Inline image of a rich-text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub image_id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

// ============================================================================
// VALUE PAYLOADS
// ============================================================================

/// Asset descriptor of an asset element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    /// MIME type.
    #[serde(rename = "type")]
    pub mime_type: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub renditions: KeyedMap<AssetRendition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRendition {
    pub rendition_id: String,
    pub preset_id: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleChoiceOption {
    pub name: String,
    pub codename: String,
}

/// Taxonomy term, possibly with child terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub name: String,
    pub codename: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub terms: Vec<Taxonomy>,
}
