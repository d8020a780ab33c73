//! Procedural macros for kontent-delivery
//!
//! This crate provides one macro:
//! - `#[derive(ContentShape)]` - Build the static field-binding table of a
//!   projection target shape

use proc_macro::TokenStream;

mod content_shape;

/// Derive macro for projection target shapes.
///
/// Generates a `ContentShape` impl whose `bindings()` table is built once, on
/// first use. The struct must also implement `Default`.
///
/// # Attributes
///
/// - `#[kontent(content_type = "...")]` (struct) - Content-type tag the shape declares
/// - `#[kontent(element = "...")]` - Bind to this element codename first
/// - `#[kontent(linked_item = "...")]` - Bind to this linked item (or linked-items
///   element, for collections) first
/// - `#[kontent(read_only)]` - Field has no write accessor; never assigned
/// - `#[kontent(skip)]` - Leave the field out of the table
/// - `#[kontent(value)]` / `#[kontent(shape)]` - Override the inferred slot kind
///
/// # Slot inference
///
/// | Field type                                   | Slot                        |
/// |----------------------------------------------|-----------------------------|
/// | `System`                                     | system block                |
/// | `String`, `Decimal`, `f64`, `DateTime<Utc>`, `RichTextElement`, `Element` | element value |
/// | `Vec<String>`, `Vec<Asset>`, `Vec<Taxonomy>`, `Vec<MultipleChoiceOption>` | element value |
/// | `ContentItem` / `DynamicItem`                | one linked item             |
/// | `Vec<..>` / `KeyedMap<..>` of items          | linked-item collection      |
/// | any other type                               | one linked item of that shape |
///
/// `Option<X>` is inferred from `X` and assigned `Some(value)`.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, Default, ContentShape)]
/// #[kontent(content_type = "article")]
/// pub struct Article {
///     pub system: System,
///     #[kontent(element = "title")]
///     pub headline: String,
///     pub post_date: Option<DateTime<Utc>>,
///     pub related_articles: Vec<Article>,
/// }
/// ```
#[proc_macro_derive(ContentShape, attributes(kontent))]
pub fn derive_content_shape(input: TokenStream) -> TokenStream {
    content_shape::derive_content_shape_impl(input)
}
