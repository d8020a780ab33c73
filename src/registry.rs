//! Type Registry - content-type tags to target shapes, plus inline renderers.
//!
//! Populated once while configuring the engine and read-only afterwards.
//! Every mapping is last-write-wins per key: re-registering a tag replaces its
//! shape, re-registering a shape under another tag replaces its tag.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::{DeliveryError, Result};
use crate::model::{ClosureView, ContentItem};
use crate::projection::{ContentShape, Projector};

type ConvertFn =
    fn(&Projector<'_>, &ContentItem, &ClosureView<'_>) -> Result<Box<dyn Any + Send + Sync>>;

/// Renders a converted instance (passed type-erased) to an inline fragment.
pub type InlineResolverFn = Arc<dyn Fn(&dyn Any) -> Option<String> + Send + Sync>;

/// Renders a native item to an inline fragment.
pub type DefaultInlineResolverFn = Arc<dyn Fn(&ContentItem) -> String + Send + Sync>;

fn convert_boxed<T: ContentShape>(
    projector: &Projector<'_>,
    item: &ContentItem,
    view: &ClosureView<'_>,
) -> Result<Box<dyn Any + Send + Sync>> {
    Ok(Box::new(projector.convert::<T>(item, view)?))
}

/// Runtime handle on a [`ContentShape`] type.
#[derive(Clone, Copy)]
pub struct ShapeDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    declared_tag: Option<&'static str>,
    convert: ConvertFn,
}

impl ShapeDescriptor {
    pub fn of<T: ContentShape>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            declared_tag: T::content_type(),
            convert: convert_boxed::<T>,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Tag the shape declares for itself.
    pub fn declared_tag(&self) -> Option<&'static str> {
        self.declared_tag
    }

    pub(crate) fn convert(
        &self,
        projector: &Projector<'_>,
        item: &ContentItem,
        view: &ClosureView<'_>,
    ) -> Result<Box<dyn Any + Send + Sync>> {
        (self.convert)(projector, item, view)
    }
}

impl PartialEq for ShapeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ShapeDescriptor {}

impl fmt::Debug for ShapeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeDescriptor")
            .field("type_name", &self.type_name)
            .field("declared_tag", &self.declared_tag)
            .finish()
    }
}

/// Bidirectional tag/shape mapping and per-shape inline resolvers.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    shapes_by_tag: HashMap<String, ShapeDescriptor>,
    tags_by_shape: HashMap<TypeId, String>,
    inline_resolvers: HashMap<TypeId, InlineResolverFn>,
    default_inline_resolver: Option<DefaultInlineResolverFn>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `tag` to shape `T`.
    pub fn register_type<T: ContentShape>(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        let shape = ShapeDescriptor::of::<T>();
        debug!(tag = %tag, shape = shape.type_name(), "Registering content type");
        self.tags_by_shape.insert(shape.type_id, tag.clone());
        self.shapes_by_tag.insert(tag, shape);
    }

    /// Map shape `T` under the tag it declares.
    pub fn register<T: ContentShape>(&mut self) -> Result<()> {
        match T::content_type() {
            Some(tag) => {
                self.register_type::<T>(tag);
                Ok(())
            }
            None => Err(DeliveryError::MissingContentType {
                shape: type_name::<T>(),
            }),
        }
    }

    pub fn shape_for(&self, tag: &str) -> Option<&ShapeDescriptor> {
        self.shapes_by_tag.get(tag)
    }

    pub fn tag_for<T: 'static>(&self) -> Option<&str> {
        self.tags_by_shape.get(&TypeId::of::<T>()).map(String::as_str)
    }

    pub fn tag_for_shape(&self, shape: &ShapeDescriptor) -> Option<&str> {
        self.tags_by_shape.get(&shape.type_id).map(String::as_str)
    }

    /// Render instances of shape `T` with `resolver` when they are embedded
    /// in rich text. One resolver per shape.
    pub fn register_inline_resolver<T, F>(&mut self, resolver: F)
    where
        T: ContentShape,
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        debug!(shape = type_name::<T>(), "Registering inline resolver");
        let erased: InlineResolverFn =
            Arc::new(move |value: &dyn Any| value.downcast_ref::<T>().map(&resolver));
        self.inline_resolvers.insert(TypeId::of::<T>(), erased);
    }

    /// Fallback renderer over native items.
    pub fn register_default_inline_resolver<F>(&mut self, resolver: F)
    where
        F: Fn(&ContentItem) -> String + Send + Sync + 'static,
    {
        debug!("Registering default inline resolver");
        self.default_inline_resolver = Some(Arc::new(resolver));
    }

    pub fn inline_resolver_for(&self, shape: &ShapeDescriptor) -> Option<&InlineResolverFn> {
        self.inline_resolvers.get(&shape.type_id)
    }

    pub fn default_inline_resolver(&self) -> Option<&DefaultInlineResolverFn> {
        self.default_inline_resolver.as_ref()
    }

    /// Registered tags and their shapes, sorted by tag.
    pub fn registered_types(&self) -> Vec<(&str, ShapeDescriptor)> {
        let mut types: Vec<_> = self
            .shapes_by_tag
            .iter()
            .map(|(tag, shape)| (tag.as_str(), *shape))
            .collect();
        types.sort_by(|a, b| a.0.cmp(b.0));
        types
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.registered_types())
            .field("inline_resolvers", &self.inline_resolvers.len())
            .field("default_inline_resolver", &self.default_inline_resolver.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::FieldBinding;

    #[derive(Debug, Default)]
    struct Article {
        title: String,
    }

    impl ContentShape for Article {
        fn content_type() -> Option<&'static str> {
            Some("article")
        }

        fn bindings() -> &'static [FieldBinding<Self>] {
            static BINDINGS: std::sync::LazyLock<Vec<FieldBinding<Article>>> =
                std::sync::LazyLock::new(|| {
                    vec![FieldBinding::<Article>::element::<String>("title", |s, v| {
                        s.title = v
                    })]
                });
            &BINDINGS
        }
    }

    #[derive(Debug, Default)]
    struct Untagged;

    impl ContentShape for Untagged {
        fn bindings() -> &'static [FieldBinding<Self>] {
            &[]
        }
    }

    #[test]
    fn test_register_uses_declared_tag() {
        let mut registry = TypeRegistry::new();
        registry.register::<Article>().unwrap();
        assert_eq!(registry.tag_for::<Article>(), Some("article"));
        assert_eq!(
            registry.shape_for("article"),
            Some(&ShapeDescriptor::of::<Article>())
        );
    }

    #[test]
    fn test_register_without_tag_fails() {
        let mut registry = TypeRegistry::new();
        let err = registry.register::<Untagged>().unwrap_err();
        assert_eq!(err.code(), "MISSING_CONTENT_TYPE");
        assert!(registry.registered_types().is_empty());
    }

    #[test]
    fn test_last_write_wins_per_key() {
        let mut registry = TypeRegistry::new();
        registry.register_type::<Article>("article");
        registry.register_type::<Untagged>("article");
        assert_eq!(
            registry.shape_for("article"),
            Some(&ShapeDescriptor::of::<Untagged>())
        );

        registry.register_type::<Article>("blog_post");
        assert_eq!(registry.tag_for::<Article>(), Some("blog_post"));
        let tags: Vec<_> = registry.registered_types().iter().map(|(t, _)| *t).collect();
        assert_eq!(tags, vec!["article", "blog_post"]);
    }

    #[test]
    fn test_inline_resolver_receives_typed_instance() {
        let mut registry = TypeRegistry::new();
        registry.register_inline_resolver::<Article, _>(|a| format!("<h1>{}</h1>", a.title));
        registry.register_inline_resolver::<Article, _>(|a| format!("<h2>{}</h2>", a.title));

        let resolver = registry
            .inline_resolver_for(&ShapeDescriptor::of::<Article>())
            .unwrap();
        let article = Article {
            title: "Roasting".into(),
        };
        assert_eq!(
            resolver(&article as &dyn Any),
            Some("<h2>Roasting</h2>".to_string())
        );
        assert_eq!(resolver(&Untagged as &dyn Any), None);
        assert!(registry
            .inline_resolver_for(&ShapeDescriptor::of::<Untagged>())
            .is_none());
    }
}
