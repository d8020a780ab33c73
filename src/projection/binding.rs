//! Field-binding tables and element value extraction.
//!
//! A target shape describes each of its fields once, as a [`FieldBinding`]:
//! the field name, optional explicit element / linked-item codenames, and a
//! slot saying what kind of value the field holds and how to assign it. The
//! table is built once per shape (usually by `#[derive(ContentShape)]`) and
//! read by the [`Projector`](super::Projector) on every conversion.
//!
//! ```text
//! Slot              rules tried (first match wins)
//! ----------------  ---------------------------------------------------
//! System            always the item's own system block
//! Value             explicit element -> implicit element (field name)
//! Linked            explicit linked item -> implicit linked item
//! Collection        explicit linked-item list -> every visible item
//!                   (filtered by the element type's content type)
//! ReadOnly          skipped
//! ```

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::LazyLock;

use super::{ContentShape, DynamicItem, Projector};
use crate::error::Result;
use crate::model::{
    Asset, ClosureView, ContentItem, Element, ElementValue, KeyedMap, MultipleChoiceOption,
    RichTextElement, System, Taxonomy,
};
use crate::registry::ShapeDescriptor;

static CAMEL_BOUNDARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([A-Z]+)").unwrap());

/// Element codename a field name implicitly binds to: `productName` and
/// `product_name` both become `product_name`.
pub fn codename_candidate(field: &str) -> String {
    CAMEL_BOUNDARY_RE
        .replace_all(field.trim_start_matches("r#"), "${1}_${2}")
        .to_lowercase()
}

// ============================================================================
// VALUE EXTRACTION
// ============================================================================

/// The element variant does not fit the field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueMismatch;

/// Conversion from an element to a field value.
///
/// `Ok(None)` means the element holds no value (a `null` number or date); the
/// field keeps its zero value. `Err(ValueMismatch)` means the element variant
/// cannot be assigned to this type at all.
pub trait FromElement: Sized + 'static {
    /// Element kinds accepted, as reported in errors.
    const ACCEPTS: &'static str;

    fn from_element(element: &Element) -> std::result::Result<Option<Self>, ValueMismatch>;
}

impl FromElement for String {
    const ACCEPTS: &'static str = "text, rich_text or url_slug";

    fn from_element(element: &Element) -> std::result::Result<Option<Self>, ValueMismatch> {
        element
            .value()
            .as_text()
            .map(|s| Some(s.to_string()))
            .ok_or(ValueMismatch)
    }
}

impl FromElement for Decimal {
    const ACCEPTS: &'static str = "number";

    fn from_element(element: &Element) -> std::result::Result<Option<Self>, ValueMismatch> {
        match element.value() {
            ElementValue::Number { value } => Ok(*value),
            _ => Err(ValueMismatch),
        }
    }
}

impl FromElement for f64 {
    const ACCEPTS: &'static str = "number";

    fn from_element(element: &Element) -> std::result::Result<Option<Self>, ValueMismatch> {
        Decimal::from_element(element).map(|value| value.and_then(|d| d.to_f64()))
    }
}

impl FromElement for DateTime<Utc> {
    const ACCEPTS: &'static str = "date_time";

    fn from_element(element: &Element) -> std::result::Result<Option<Self>, ValueMismatch> {
        match element.value() {
            ElementValue::DateTime { value } => Ok(*value),
            _ => Err(ValueMismatch),
        }
    }
}

impl FromElement for Vec<Asset> {
    const ACCEPTS: &'static str = "asset";

    fn from_element(element: &Element) -> std::result::Result<Option<Self>, ValueMismatch> {
        match element.value() {
            ElementValue::AssetList { value } => Ok(Some(value.clone())),
            _ => Err(ValueMismatch),
        }
    }
}

impl FromElement for Vec<MultipleChoiceOption> {
    const ACCEPTS: &'static str = "multiple_choice";

    fn from_element(element: &Element) -> std::result::Result<Option<Self>, ValueMismatch> {
        match element.value() {
            ElementValue::MultipleChoice { value, .. } => Ok(Some(value.clone())),
            _ => Err(ValueMismatch),
        }
    }
}

impl FromElement for Vec<Taxonomy> {
    const ACCEPTS: &'static str = "taxonomy";

    fn from_element(element: &Element) -> std::result::Result<Option<Self>, ValueMismatch> {
        match element.value() {
            ElementValue::Taxonomy { value, .. } => Ok(Some(value.clone())),
            _ => Err(ValueMismatch),
        }
    }
}

/// Codenames of a linked-items element.
impl FromElement for Vec<String> {
    const ACCEPTS: &'static str = "modular_content";

    fn from_element(element: &Element) -> std::result::Result<Option<Self>, ValueMismatch> {
        match element.value() {
            ElementValue::LinkedItemList { value } => Ok(Some(value.clone())),
            _ => Err(ValueMismatch),
        }
    }
}

impl FromElement for RichTextElement {
    const ACCEPTS: &'static str = "rich_text";

    fn from_element(element: &Element) -> std::result::Result<Option<Self>, ValueMismatch> {
        element.as_rich_text().cloned().map(Some).ok_or(ValueMismatch)
    }
}

impl FromElement for Element {
    const ACCEPTS: &'static str = "any element";

    fn from_element(element: &Element) -> std::result::Result<Option<Self>, ValueMismatch> {
        Ok(Some(element.clone()))
    }
}

// ============================================================================
// BINDINGS
// ============================================================================

pub(crate) type ValueFn<S> =
    Box<dyn Fn(&mut S, &Element) -> std::result::Result<(), ValueMismatch> + Send + Sync>;

pub(crate) type LinkedFn<S> = Box<
    dyn Fn(&Projector<'_>, &mut S, &ContentItem, &ClosureView<'_>) -> Result<()> + Send + Sync,
>;

pub(crate) type CollectionFn<S> = Box<
    dyn Fn(&Projector<'_>, &mut S, &[&ContentItem], &ClosureView<'_>) -> Result<()>
        + Send
        + Sync,
>;

/// Element type of a collection field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementKind {
    /// Native items: every visible entry, unconverted.
    Item,
    /// Every visible entry, converted by content-type dispatch.
    Dynamic,
    /// Entries whose content type maps to this shape.
    Shape(ShapeDescriptor),
}

pub(crate) enum Slot<S> {
    System(fn(&mut S, System)),
    Value {
        accepts: &'static str,
        assign: ValueFn<S>,
    },
    Linked(LinkedFn<S>),
    Collection {
        kind: ElementKind,
        assign: CollectionFn<S>,
    },
    ReadOnly,
}

/// How one field of shape `S` is populated from a content item.
pub struct FieldBinding<S> {
    field: &'static str,
    candidate: String,
    element: Option<&'static str>,
    linked_item: Option<&'static str>,
    pub(crate) slot: Slot<S>,
}

fn linked_fn<S, F>(f: F) -> LinkedFn<S>
where
    F: Fn(&Projector<'_>, &mut S, &ContentItem, &ClosureView<'_>) -> Result<()>
        + Send
        + Sync
        + 'static,
{
    Box::new(f)
}

fn collection_fn<S, F>(f: F) -> CollectionFn<S>
where
    F: Fn(&Projector<'_>, &mut S, &[&ContentItem], &ClosureView<'_>) -> Result<()>
        + Send
        + Sync
        + 'static,
{
    Box::new(f)
}

impl<S: ContentShape> FieldBinding<S> {
    fn with_slot(field: &'static str, slot: Slot<S>) -> Self {
        Self {
            field,
            candidate: codename_candidate(field),
            element: None,
            linked_item: None,
            slot,
        }
    }

    /// Field holding the item's system block.
    pub fn system(field: &'static str, set: fn(&mut S, System)) -> Self {
        Self::with_slot(field, Slot::System(set))
    }

    /// Field holding an element value.
    pub fn element<V: FromElement>(field: &'static str, set: fn(&mut S, V)) -> Self {
        let assign: ValueFn<S> = Box::new(move |target: &mut S, element: &Element| {
            if let Some(value) = V::from_element(element)? {
                set(target, value);
            }
            Ok(())
        });
        Self::with_slot(
            field,
            Slot::Value {
                accepts: V::ACCEPTS,
                assign,
            },
        )
    }

    /// Field holding one linked item converted to shape `T`.
    pub fn linked_item<T: ContentShape>(field: &'static str, set: fn(&mut S, T)) -> Self {
        Self::with_slot(
            field,
            Slot::Linked(linked_fn(move |p, target: &mut S, item, view| {
                set(target, p.convert::<T>(item, view)?);
                Ok(())
            })),
        )
    }

    /// Field holding one linked item as a native item.
    pub fn linked_content_item(field: &'static str, set: fn(&mut S, ContentItem)) -> Self {
        Self::with_slot(
            field,
            Slot::Linked(linked_fn(move |_, target: &mut S, item, _| {
                set(target, item.clone());
                Ok(())
            })),
        )
    }

    /// Field holding one linked item converted by content-type dispatch.
    pub fn linked_dynamic(field: &'static str, set: fn(&mut S, DynamicItem)) -> Self {
        Self::with_slot(
            field,
            Slot::Linked(linked_fn(move |p, target: &mut S, item, view| {
                set(target, p.convert_dynamic(item, view)?);
                Ok(())
            })),
        )
    }

    /// List of linked items of shape `T`, in source order.
    pub fn list<T: ContentShape>(field: &'static str, set: fn(&mut S, Vec<T>)) -> Self {
        Self::with_slot(
            field,
            Slot::Collection {
                kind: ElementKind::Shape(ShapeDescriptor::of::<T>()),
                assign: collection_fn(move |p, target: &mut S, entries, view| {
                    let mut out = Vec::with_capacity(entries.len());
                    for item in entries {
                        out.push(p.convert::<T>(item, &view.without(item.codename()))?);
                    }
                    set(target, out);
                    Ok(())
                }),
            },
        )
    }

    /// List of every visible linked item, unconverted.
    pub fn content_item_list(field: &'static str, set: fn(&mut S, Vec<ContentItem>)) -> Self {
        Self::with_slot(
            field,
            Slot::Collection {
                kind: ElementKind::Item,
                assign: collection_fn(move |_, target: &mut S, entries, _| {
                    set(target, entries.iter().map(|item| (*item).clone()).collect());
                    Ok(())
                }),
            },
        )
    }

    /// List of every visible linked item, converted by content-type dispatch.
    pub fn dynamic_list(field: &'static str, set: fn(&mut S, Vec<DynamicItem>)) -> Self {
        Self::with_slot(
            field,
            Slot::Collection {
                kind: ElementKind::Dynamic,
                assign: collection_fn(move |p, target: &mut S, entries, view| {
                    let mut out = Vec::with_capacity(entries.len());
                    for item in entries {
                        out.push(p.convert_dynamic(item, &view.without(item.codename()))?);
                    }
                    set(target, out);
                    Ok(())
                }),
            },
        )
    }

    /// Map of linked items of shape `T`, keyed by codename in source order.
    pub fn map<T: ContentShape>(field: &'static str, set: fn(&mut S, KeyedMap<T>)) -> Self {
        Self::with_slot(
            field,
            Slot::Collection {
                kind: ElementKind::Shape(ShapeDescriptor::of::<T>()),
                assign: collection_fn(move |p, target: &mut S, entries, view| {
                    let mut out = KeyedMap::new();
                    for item in entries {
                        let value = p.convert::<T>(item, &view.without(item.codename()))?;
                        out.insert(item.codename(), value);
                    }
                    set(target, out);
                    Ok(())
                }),
            },
        )
    }

    /// Map of every visible linked item, unconverted.
    pub fn content_item_map(field: &'static str, set: fn(&mut S, KeyedMap<ContentItem>)) -> Self {
        Self::with_slot(
            field,
            Slot::Collection {
                kind: ElementKind::Item,
                assign: collection_fn(move |_, target: &mut S, entries, _| {
                    set(
                        target,
                        entries
                            .iter()
                            .map(|item| (item.codename(), (*item).clone()))
                            .collect(),
                    );
                    Ok(())
                }),
            },
        )
    }

    /// Map of every visible linked item, converted by content-type dispatch.
    pub fn dynamic_map(field: &'static str, set: fn(&mut S, KeyedMap<DynamicItem>)) -> Self {
        Self::with_slot(
            field,
            Slot::Collection {
                kind: ElementKind::Dynamic,
                assign: collection_fn(move |p, target: &mut S, entries, view| {
                    let mut out = KeyedMap::new();
                    for item in entries {
                        let value = p.convert_dynamic(item, &view.without(item.codename()))?;
                        out.insert(item.codename(), value);
                    }
                    set(target, out);
                    Ok(())
                }),
            },
        )
    }

    /// Field with no write accessor. Listed so the projector can report it,
    /// never assigned.
    pub fn read_only(field: &'static str) -> Self {
        Self::with_slot(field, Slot::ReadOnly)
    }

    /// Bind to this element codename ahead of the field-name match.
    pub fn bind_element(mut self, codename: &'static str) -> Self {
        self.element = Some(codename);
        self
    }

    /// Bind to this linked item (or linked-items element, for collections)
    /// ahead of the implicit match.
    pub fn bind_linked_item(mut self, codename: &'static str) -> Self {
        self.linked_item = Some(codename);
        self
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Codename the field name implicitly binds to.
    pub fn candidate(&self) -> &str {
        &self.candidate
    }

    pub fn element_codename(&self) -> Option<&'static str> {
        self.element
    }

    pub fn linked_item_codename(&self) -> Option<&'static str> {
        self.linked_item
    }
}
