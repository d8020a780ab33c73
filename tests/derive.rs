//! `#[derive(ContentShape)]` against decoded delivery responses.

mod helpers;

use helpers::init_tracing;
use kontent_delivery::model::{MultipleChoiceOption, Taxonomy};
use kontent_delivery::{
    Asset, ContentItem, ContentItemResponse, ContentShape, DeliveryEngine, DynamicItem, Element,
    KeyedMap, RichTextElement,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use serde_json::json;

type Price = Decimal;

#[allow(non_snake_case)]
#[derive(Debug, Default, ContentShape)]
#[kontent(content_type = "grinder")]
struct Product {
    productName: String,
    r#type: String,
    #[kontent(value)]
    price: Price,
    weight: f64,
    description: Option<RichTextElement>,
    #[kontent(element = "description")]
    raw_description: Option<Element>,
    image: Vec<Asset>,
    processing: Vec<MultipleChoiceOption>,
    origin: Vec<Taxonomy>,
    accessories: Vec<String>,
    #[kontent(read_only)]
    computed: String,
    #[kontent(skip)]
    cache: Vec<u8>,
    linked: KeyedMap<ContentItem>,
    dispatched: KeyedMap<DynamicItem>,
}

#[derive(Debug, Default, ContentShape)]
#[kontent(content_type = "filter")]
struct Filter {
    size: String,
}

mod catalogue {
    use kontent_delivery::ContentShape;

    /// Catalogue entry sharing its name with the asset element value.
    #[derive(Debug, Default, ContentShape)]
    #[kontent(content_type = "filter")]
    pub struct Asset {
        pub size: String,
    }
}

#[derive(Debug, Default, ContentShape)]
#[kontent(content_type = "grinder")]
struct Bundle {
    #[kontent(shape, linked_item = "accessories")]
    parts: Vec<catalogue::Asset>,
    image: Vec<Asset>,
}

fn response() -> ContentItemResponse {
    serde_json::from_value(json!({
        "item": {
            "system": {
                "id": "8f1a3b0e-2c4d-4e5f-9a6b-7c8d9e0f1a2b",
                "name": "Hario Skerton",
                "codename": "skerton",
                "language": "en-US",
                "type": "grinder",
                "sitemap_locations": [],
                "last_modified": "2019-03-27T13:21:11.38Z"
            },
            "elements": {
                "product_name": { "type": "text", "name": "Product name", "value": "Hario Skerton" },
                "type": { "type": "text", "name": "Type", "value": "manual" },
                "price": { "type": "number", "name": "Price", "value": 49.9 },
                "weight": { "type": "number", "name": "Weight", "value": 2.5 },
                "description": {
                    "type": "rich_text",
                    "name": "Description",
                    "images": {},
                    "links": {},
                    "modular_content": [],
                    "value": "<p>Ceramic burrs.</p>"
                },
                "image": {
                    "type": "asset",
                    "name": "Image",
                    "value": [{
                        "name": "skerton.jpg",
                        "type": "image/jpeg",
                        "size": 40211,
                        "description": null,
                        "url": "https://assets.example.com/skerton.jpg"
                    }]
                },
                "processing": {
                    "type": "multiple_choice",
                    "name": "Processing",
                    "value": [{ "name": "Manual", "codename": "manual" }]
                },
                "origin": {
                    "type": "taxonomy",
                    "name": "Origin",
                    "taxonomy_group": "origins",
                    "value": [{ "name": "Japan", "codename": "japan", "terms": [] }]
                },
                "accessories": {
                    "type": "modular_content",
                    "name": "Accessories",
                    "value": ["paper_filter"]
                },
                "computed": { "type": "text", "name": "Computed", "value": "never assigned" }
            }
        },
        "modular_content": {
            "paper_filter": {
                "system": { "codename": "paper_filter", "type": "filter" },
                "elements": {
                    "size": { "type": "text", "name": "Size", "value": "02" }
                }
            }
        }
    }))
    .unwrap()
}

#[test]
fn test_derived_shape_populates_every_value_kind() {
    init_tracing();
    let graph = response().into_graph();
    let product: Product = DeliveryEngine::new().cast_root(&graph).unwrap().unwrap();

    assert_eq!(product.productName, "Hario Skerton");
    assert_eq!(product.r#type, "manual");
    assert_eq!(product.price, Decimal::new(499, 1));
    assert_eq!(product.weight, 2.5);
    assert_eq!(
        product.description.map(|d| d.value),
        Some("<p>Ceramic burrs.</p>".to_string())
    );
    let raw = product.raw_description.unwrap();
    assert_eq!(raw.kind(), "rich_text");
    assert_eq!(raw.name(), "Description");
    assert_eq!(raw.owner(), Some("skerton"));
    assert_eq!(product.image[0].url, "https://assets.example.com/skerton.jpg");
    assert_eq!(product.processing[0].codename, "manual");
    assert_eq!(product.origin[0].name, "Japan");
    assert_eq!(product.accessories, vec!["paper_filter".to_string()]);
}

#[test]
fn test_read_only_and_skipped_fields_are_untouched() {
    let graph = response().into_graph();
    let product: Product = DeliveryEngine::new().cast_root(&graph).unwrap().unwrap();
    assert_eq!(product.computed, "");
    assert!(product.cache.is_empty());
}

#[test]
fn test_derived_maps_hold_linked_items() {
    let mut engine = DeliveryEngine::new();
    engine.register::<Filter>().unwrap();
    let graph = response().into_graph();

    let product: Product = engine.cast_root(&graph).unwrap().unwrap();
    assert_eq!(
        product.linked.get("paper_filter").and_then(|f| f.text_value("size")),
        Some("02")
    );
    let filter = product
        .dispatched
        .get("paper_filter")
        .and_then(|f| f.downcast_ref::<Filter>())
        .unwrap();
    assert_eq!(filter.size, "02");
}

#[test]
fn test_binding_table() {
    let bindings = Product::bindings();
    let fields: Vec<_> = bindings.iter().map(|b| b.field()).collect();
    assert_eq!(
        fields,
        vec![
            "productName",
            "type",
            "price",
            "weight",
            "description",
            "raw_description",
            "image",
            "processing",
            "origin",
            "accessories",
            "computed",
            "linked",
            "dispatched",
        ]
    );

    assert_eq!(bindings[0].candidate(), "product_name");
    assert_eq!(bindings[1].candidate(), "type");
    assert_eq!(bindings[5].element_codename(), Some("description"));
    assert_eq!(bindings[0].element_codename(), None);
    assert_eq!(Product::content_type(), Some("grinder"));
}

#[test]
fn test_register_uses_declared_content_type() {
    let mut engine = DeliveryEngine::new();
    engine.register::<Product>().unwrap();
    engine.register::<Filter>().unwrap();

    let tags: Vec<_> = engine
        .registry()
        .registered_types()
        .into_iter()
        .map(|(tag, shape)| {
            let short = shape.type_name().rsplit("::").next().map(str::to_string);
            (tag.to_string(), short)
        })
        .collect();
    assert_eq!(
        tags,
        vec![
            ("filter".to_string(), Some("Filter".to_string())),
            ("grinder".to_string(), Some("Product".to_string())),
        ]
    );
    assert_eq!(engine.registry().tag_for::<Product>(), Some("grinder"));
}

#[test]
fn test_shape_attribute_overrides_value_type_name() {
    let graph = response().into_graph();
    let bundle: Bundle = DeliveryEngine::new().cast_root(&graph).unwrap().unwrap();

    let sizes: Vec<_> = bundle.parts.iter().map(|part| part.size.as_str()).collect();
    assert_eq!(sizes, vec!["02"]);
    assert_eq!(bundle.image[0].name, "skerton.jpg");

    let bindings = Bundle::bindings();
    assert_eq!(bindings[0].linked_item_codename(), Some("accessories"));
}
