//! Kontent Delivery - content graph resolution for a headless-CMS delivery SDK.
//!
//! Takes the decoded graph of a delivery response (root items plus the closure
//! of linked items they reference) and derives:
//! - rich text with link and embedded-item markers resolved to final text
//! - caller-defined, strongly-typed shapes populated from generic items
//!
//! Both tolerate cyclic graphs (A embeds B, B embeds A).
//!
//! # Architecture
//!
//! ```text
//! DeliveryEngine
//! ├── TypeRegistry          content-type tag <-> ContentShape, inline resolvers
//! ├── Projector             ContentItem -> T via T::bindings()
//! └── RichTextResolver      link pass -> embedded pass -> text resolvers
//!         └── renders embedded items via inline resolver | template | default
//!
//! ContentGraph
//! ├── roots: [ContentItem]
//! └── linked_items: KeyedMap<codename -> ContentItem>
//! ```
//!
//! # Example
//!
//! ```
//! use kontent_delivery::{ContentItemResponse, DeliveryEngine};
//!
//! let json = r#"{
//!   "item": {
//!     "system": { "codename": "home", "type": "home" },
//!     "elements": {
//!       "body": {
//!         "type": "rich_text",
//!         "value": "<p><object type=\"application/kenticocloud\" data-type=\"item\" data-codename=\"tweet\"></object></p>",
//!         "modular_content": ["tweet"]
//!       }
//!     }
//!   },
//!   "modular_content": {
//!     "tweet": {
//!       "system": { "codename": "tweet", "type": "tweet" },
//!       "elements": { "text": { "type": "text", "value": "Fresh beans" } }
//!     }
//!   }
//! }"#;
//!
//! let response: ContentItemResponse = serde_json::from_str(json).unwrap();
//! let graph = response.into_graph();
//!
//! let mut engine = DeliveryEngine::new();
//! engine.register_default_inline_resolver(|item| {
//!     format!("<q>{}</q>", item.text_value("text").unwrap_or_default())
//! });
//!
//! let body = graph.root().unwrap().element("body").unwrap();
//! let html = engine.resolve_rich_text(&graph, body).unwrap();
//! assert_eq!(html.as_deref(), Some("<p><q>Fresh beans</q></p>"));
//! ```

// Lets `#[derive(ContentShape)]` expand to `::kontent_delivery::..` paths
// inside this crate too.
extern crate self as kontent_delivery;

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod projection;
pub mod registry;
pub mod rich_text;

pub use config::ResolverConfig;
pub use engine::DeliveryEngine;
pub use error::{DeliveryError, Result};
pub use kontent_delivery_macros::ContentShape;
pub use model::{
    Asset, ClosureView, ContentGraph, ContentItem, ContentItemResponse,
    ContentItemsListingResponse, Element, ElementValue, KeyedMap, Link, Pagination,
    RichTextElement, System,
};
pub use projection::{ContentShape, DynamicItem, FieldBinding, FromElement, Projector};
pub use registry::{ShapeDescriptor, TypeRegistry};
pub use rich_text::template::{HandlebarsTemplateResolver, TemplateModel, TemplateResolver};
pub use rich_text::{DefaultInlinePolicy, RichTextResolver};
