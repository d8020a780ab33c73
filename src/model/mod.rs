//! Graph model - items, elements and the linked-item closure of a response.

mod element;
mod graph;
mod item;
mod keyed;
mod response;

pub use element::{
    Asset, AssetRendition, Element, ElementValue, Image, Link, MultipleChoiceOption,
    RichTextElement, Taxonomy,
};
pub use graph::{ClosureView, ContentGraph, GraphId};
pub use item::{ContentItem, System};
pub use keyed::KeyedMap;
pub use response::{ContentItemResponse, ContentItemsListingResponse, Pagination};
