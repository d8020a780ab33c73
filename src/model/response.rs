//! Delivery response shapes and their conversion into a [`ContentGraph`].

use serde::{Deserialize, Serialize};

use super::graph::ContentGraph;
use super::item::ContentItem;
use super::keyed::KeyedMap;

/// Response of a single-item request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItemResponse {
    pub item: ContentItem,
    /// Linked-item closure keyed by codename.
    #[serde(default)]
    pub modular_content: KeyedMap<ContentItem>,
}

impl ContentItemResponse {
    pub fn into_graph(self) -> ContentGraph {
        ContentGraph::single(self.item, self.modular_content)
    }
}

/// Paging metadata of a listing response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub count: u32,
    /// URL of the next page; empty on the last page.
    #[serde(default)]
    pub next_page: String,
}

impl Pagination {
    pub fn has_next_page(&self) -> bool {
        !self.next_page.is_empty()
    }
}

/// Response of a listing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItemsListingResponse {
    #[serde(default)]
    pub items: Vec<ContentItem>,
    #[serde(default)]
    pub modular_content: KeyedMap<ContentItem>,
    #[serde(default)]
    pub pagination: Pagination,
}

impl ContentItemsListingResponse {
    /// Build the graph, returning the pagination alongside it.
    pub fn into_graph(self) -> (ContentGraph, Pagination) {
        (
            ContentGraph::listing(self.items, self.modular_content),
            self.pagination,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn system(codename: &str, content_type: &str) -> serde_json::Value {
        json!({
            "id": codename,
            "name": codename,
            "codename": codename,
            "language": "en-US",
            "type": content_type,
            "sitemap_locations": [],
            "last_modified": "2019-03-27T13:21:11.38Z"
        })
    }

    #[test]
    fn test_single_response_into_graph() {
        let response: ContentItemResponse = serde_json::from_value(json!({
            "item": {
                "system": system("home", "home"),
                "elements": {
                    "title": { "type": "text", "name": "Title", "value": "Home" }
                }
            },
            "modular_content": {
                "hero": { "system": system("hero", "hero_unit"), "elements": {} }
            }
        }))
        .unwrap();

        let graph = response.into_graph();
        assert_eq!(graph.root().unwrap().codename(), "home");
        assert!(graph.lookup("hero").is_some());
        assert_eq!(
            graph.root().unwrap().element("title").unwrap().owner(),
            Some("home")
        );
    }

    #[test]
    fn test_listing_response_keeps_pagination() {
        let response: ContentItemsListingResponse = serde_json::from_value(json!({
            "items": [
                { "system": system("a", "article"), "elements": {} },
                { "system": system("b", "article"), "elements": {} }
            ],
            "modular_content": {},
            "pagination": {
                "skip": 0,
                "limit": 2,
                "count": 2,
                "next_page": "https://deliver.example.com/items?skip=2&limit=2"
            }
        }))
        .unwrap();

        let (graph, pagination) = response.into_graph();
        assert_eq!(graph.roots().len(), 2);
        assert!(pagination.has_next_page());
        assert_eq!(pagination.count, 2);
    }
}
