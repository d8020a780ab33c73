//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use kontent_delivery::{
    ContentGraph, ContentItem, Element, ElementValue, KeyedMap, Link, RichTextElement, System,
};

/// Route test logs through the test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("kontent_delivery=debug")
        .with_test_writer()
        .try_init();
}

/// Embedded-item marker for `codename`.
pub fn marker(codename: &str) -> String {
    format!(
        r#"<object type="application/kenticocloud" data-type="item" data-rel="component" data-codename="{}"></object>"#,
        codename
    )
}

/// Link marker pointing at link-map entry `id`.
pub fn link_marker(id: &str, label: &str) -> String {
    format!(r#"<a data-item-id="{}" href="">{}</a>"#, id, label)
}

pub fn text(codename: &str, value: &str) -> Element {
    Element::new(codename, ElementValue::text(value))
}

/// Rich-text element whose embedded items are the markers found in `value`.
pub fn rich_text(codename: &str, value: &str, embedded: &[&str]) -> Element {
    rich_text_with_links(codename, value, embedded, &[])
}

pub fn rich_text_with_links(
    codename: &str,
    value: &str,
    embedded: &[&str],
    links: &[(&str, Link)],
) -> Element {
    let mut rich = RichTextElement::new(value).with_linked_items(embedded.iter().copied());
    for (id, link) in links {
        rich = rich.with_link(*id, link.clone());
    }
    Element::new(codename, ElementValue::RichText(rich))
}

pub fn item(codename: &str, content_type: &str, elements: Vec<Element>) -> ContentItem {
    ContentItem::new(System::new(codename, content_type), elements)
}

/// Single-item graph; `linked` keeps its order as the closure order.
pub fn graph(root: ContentItem, linked: Vec<ContentItem>) -> ContentGraph {
    ContentGraph::single(root, closure(linked))
}

pub fn closure(linked: Vec<ContentItem>) -> KeyedMap<ContentItem> {
    linked
        .into_iter()
        .map(|item| (item.codename().to_string(), item))
        .collect()
}

/// Body text of a rich-text element named `body`.
pub fn body_text(item: &ContentItem) -> String {
    item.text_value("body").unwrap_or_default().to_string()
}
