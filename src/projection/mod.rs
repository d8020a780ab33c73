//! Projection engine - converts generic content items into caller-defined
//! shapes.
//!
//! A shape is any `Default` struct implementing [`ContentShape`]. Its field
//! table ([`FieldBinding`]) replaces runtime field enumeration: conversion
//! starts from `T::default()` and walks the table, populating each field from
//! the first binding rule that matches.
//!
//! Projection never resolves rich text. Embedded markers are left raw so that
//! rendering an embedded item (which projects it) cannot recurse back into
//! projection; call [`RichTextResolver`](crate::rich_text::RichTextResolver)
//! first when resolved text is wanted in the projected fields.

mod binding;

pub use binding::{codename_candidate, ElementKind, FieldBinding, FromElement, ValueMismatch};

use std::any::Any;
use std::fmt;
use tracing::{debug, error, trace};

use crate::error::{DeliveryError, Result};
use crate::model::{ClosureView, ContentItem};
use crate::registry::{ShapeDescriptor, TypeRegistry};
use binding::Slot;

/// A caller-defined target shape.
pub trait ContentShape: Default + Send + Sync + 'static {
    /// Content-type tag the shape declares for itself, if any.
    fn content_type() -> Option<&'static str> {
        None
    }

    /// Static field-binding table.
    fn bindings() -> &'static [FieldBinding<Self>];
}

/// Result of converting an item by content-type dispatch.
pub enum DynamicItem {
    /// No shape is registered for the item's content type.
    Native(ContentItem),
    /// Instance of the shape registered for the content type.
    Typed {
        content_type: String,
        shape: &'static str,
        value: Box<dyn Any + Send + Sync>,
    },
}

impl DynamicItem {
    pub fn content_type(&self) -> &str {
        match self {
            Self::Native(item) => item.content_type(),
            Self::Typed { content_type, .. } => content_type,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native(_))
    }

    pub fn as_native(&self) -> Option<&ContentItem> {
        match self {
            Self::Native(item) => Some(item),
            Self::Typed { .. } => None,
        }
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            Self::Native(item) => (item as &dyn Any).downcast_ref::<T>(),
            Self::Typed { value, .. } => value.downcast_ref::<T>(),
        }
    }

    /// Take the typed instance out, or get `self` back when it holds another
    /// shape. A native item is never downcast; use [`Self::into_native`].
    pub fn downcast<T: 'static>(self) -> std::result::Result<T, Self> {
        match self {
            Self::Native(item) => Err(Self::Native(item)),
            Self::Typed {
                content_type,
                shape,
                value,
            } => value.downcast::<T>().map(|v| *v).map_err(|value| Self::Typed {
                content_type,
                shape,
                value,
            }),
        }
    }

    pub fn into_native(self) -> Option<ContentItem> {
        match self {
            Self::Native(item) => Some(item),
            Self::Typed { .. } => None,
        }
    }
}

impl fmt::Debug for DynamicItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(item) => f.debug_tuple("Native").field(&item.codename()).finish(),
            Self::Typed {
                content_type,
                shape,
                ..
            } => f
                .debug_struct("Typed")
                .field("content_type", content_type)
                .field("shape", shape)
                .finish(),
        }
    }
}

/// Runs conversions against one registry.
#[derive(Debug, Clone, Copy)]
pub struct Projector<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> Projector<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// Convert `item` into shape `T`, with `view` as the linked items it may
    /// reference.
    pub fn convert<T: ContentShape>(&self, item: &ContentItem, view: &ClosureView<'_>) -> Result<T> {
        let mut target = T::default();
        for binding in T::bindings() {
            self.bind(binding, &mut target, item, view)?;
        }
        Ok(target)
    }

    /// Convert `item` into a registered shape known only by descriptor.
    pub fn convert_shape(
        &self,
        shape: &ShapeDescriptor,
        item: &ContentItem,
        view: &ClosureView<'_>,
    ) -> Result<Box<dyn Any + Send + Sync>> {
        shape.convert(self, item, view)
    }

    /// Convert `item` into whatever shape its content type is registered to,
    /// falling back to the native item.
    pub fn convert_dynamic(&self, item: &ContentItem, view: &ClosureView<'_>) -> Result<DynamicItem> {
        match self.registry.shape_for(item.content_type()) {
            Some(shape) => Ok(DynamicItem::Typed {
                content_type: item.content_type().to_string(),
                shape: shape.type_name(),
                value: self.convert_shape(shape, item, view)?,
            }),
            None => {
                trace!(
                    codename = item.codename(),
                    content_type = item.content_type(),
                    "No shape registered, keeping native item"
                );
                Ok(DynamicItem::Native(item.clone()))
            }
        }
    }

    fn bind<S: ContentShape>(
        &self,
        binding: &FieldBinding<S>,
        target: &mut S,
        item: &ContentItem,
        view: &ClosureView<'_>,
    ) -> Result<()> {
        match &binding.slot {
            Slot::System(set) => set(target, item.system().clone()),
            Slot::ReadOnly => {
                debug!(
                    shape = std::any::type_name::<S>(),
                    field = binding.field(),
                    "Field has no write accessor, skipping"
                );
            }
            Slot::Value { accepts, assign } => {
                let element = binding
                    .element_codename()
                    .and_then(|codename| item.element(codename))
                    .or_else(|| item.element(binding.candidate()));
                let Some(element) = element else {
                    trace!(field = binding.field(), codename = item.codename(), "No element matched");
                    return Ok(());
                };
                if assign(target, element).is_err() {
                    let err = DeliveryError::FieldType {
                        shape: std::any::type_name::<S>(),
                        field: binding.field(),
                        codename: element.codename().to_string(),
                        expected: *accepts,
                        found: element.kind(),
                    };
                    error!(code = err.code(), "{}", err);
                    return Err(err);
                }
            }
            Slot::Linked(assign) => {
                let linked = binding
                    .linked_item_codename()
                    .and_then(|codename| view.get(codename))
                    .or_else(|| view.get(binding.candidate()));
                if let Some(linked) = linked {
                    trace!(field = binding.field(), linked = linked.codename(), "Linked item matched");
                    assign(self, target, linked, &view.without(linked.codename()))?;
                }
            }
            Slot::Collection { kind, assign } => {
                let entries = match explicit_entries(binding, item, view) {
                    Some(entries) => entries,
                    None => view.iter().map(|(_, linked)| linked).collect(),
                };
                if let Some(entries) = self.filter_by_kind(kind, entries) {
                    trace!(field = binding.field(), count = entries.len(), "Collection matched");
                    assign(self, target, &entries, view)?;
                } else {
                    debug!(
                        shape = std::any::type_name::<S>(),
                        field = binding.field(),
                        "Collection element type has no content type, skipping"
                    );
                }
            }
        }
        Ok(())
    }

    /// Entries a collection of `kind` admits. `None` when the element type
    /// maps to no content type at all.
    fn filter_by_kind<'g>(
        &self,
        kind: &ElementKind,
        entries: Vec<&'g ContentItem>,
    ) -> Option<Vec<&'g ContentItem>> {
        match kind {
            ElementKind::Item | ElementKind::Dynamic => Some(entries),
            ElementKind::Shape(shape) => {
                let declared: Option<&str> = shape.declared_tag();
                let tag = declared.or_else(|| self.registry.tag_for_shape(shape))?;
                Some(
                    entries
                        .into_iter()
                        .filter(|linked| linked.content_type() == tag)
                        .collect(),
                )
            }
        }
    }
}

/// Visible items listed by the collection's explicitly bound linked-items
/// element, in element order.
fn explicit_entries<'g, S: ContentShape>(
    binding: &FieldBinding<S>,
    item: &ContentItem,
    view: &ClosureView<'g>,
) -> Option<Vec<&'g ContentItem>> {
    let codename = binding.linked_item_codename()?;
    let codenames = item.element(codename)?.value().linked_item_codenames()?;
    Some(codenames.iter().filter_map(|c| view.get(c)).collect())
}
