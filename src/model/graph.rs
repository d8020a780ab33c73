//! Content graph - root items plus the closure of linked items returned with
//! them in one response.
//!
//! # Architecture
//!
//! ```text
//! ContentGraph
//! ├── id (GraphId, stamped on every attached item)
//! ├── roots: [ContentItem]
//! └── linked_items: KeyedMap<codename -> ContentItem>   (the closure arena)
//!     └── Element.owner -> owning item codename
//! ```
//!
//! Items never own each other. Every reference (embedded markers, linked item
//! lists, links) is a codename key into the closure arena, so a cyclic graph
//! (A embeds B, B embeds A) carries no ownership cycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::element::Element;
use super::item::ContentItem;
use super::keyed::KeyedMap;

/// Identity of one decoded response graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphId(Uuid);

impl GraphId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "graph_{}", self.0)
    }
}

/// A root item (or list of root items) plus its linked-item closure.
#[derive(Debug, Clone)]
pub struct ContentGraph {
    id: GraphId,
    roots: Vec<ContentItem>,
    linked_items: KeyedMap<ContentItem>,
}

impl ContentGraph {
    /// Graph for a single-item response.
    pub fn single(item: ContentItem, linked_items: KeyedMap<ContentItem>) -> Self {
        Self::listing(vec![item], linked_items)
    }

    /// Graph for a listing response.
    pub fn listing(roots: Vec<ContentItem>, linked_items: KeyedMap<ContentItem>) -> Self {
        let mut graph = Self {
            id: GraphId::new(),
            roots,
            linked_items,
        };
        graph.attach();
        graph
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    /// First root item.
    pub fn root(&self) -> Option<&ContentItem> {
        self.roots.first()
    }

    pub fn roots(&self) -> &[ContentItem] {
        &self.roots
    }

    pub fn linked_items(&self) -> &KeyedMap<ContentItem> {
        &self.linked_items
    }

    /// Linked item with this codename, if the response included it. Absence is
    /// expected (depth-limited responses) and is not an error.
    pub fn lookup(&self, codename: &str) -> Option<&ContentItem> {
        self.linked_items.get(codename)
    }

    /// Any item of the graph by codename, roots first.
    pub fn find(&self, codename: &str) -> Option<&ContentItem> {
        self.roots
            .iter()
            .find(|item| item.codename() == codename)
            .or_else(|| self.lookup(codename))
    }

    /// Item owning the given element. `None` for elements of another graph
    /// and for detached elements.
    pub fn owner_of(&self, element: &Element) -> Option<&ContentItem> {
        if element.graph_id() != Some(self.id) {
            return None;
        }
        element.owner().and_then(|codename| self.find(codename))
    }

    /// True when the item was attached to this graph.
    pub fn contains(&self, item: &ContentItem) -> bool {
        item.graph_id() == Some(self.id)
    }

    /// The full closure, visible to a root item.
    pub fn closure(&self) -> ClosureView<'_> {
        ClosureView::new(&self.linked_items)
    }

    /// Wire back-references: every item gets this graph's id, every element
    /// its owning item's codename. Idempotent.
    pub fn attach(&mut self) {
        let id = self.id;
        for item in self.roots.iter_mut() {
            item.attach(id);
        }
        for (_, item) in self.linked_items.iter_mut() {
            item.attach(id);
        }
    }

    /// Copy of this graph with its root items replaced. Keeps the graph id.
    pub(crate) fn with_roots(&self, roots: Vec<ContentItem>) -> Self {
        let mut graph = Self {
            id: self.id,
            roots,
            linked_items: self.linked_items.clone(),
        };
        graph.attach();
        graph
    }
}

/// The subset of a graph's closure visible to one projection step.
///
/// Recursing into a linked item hides that item from its own nested view, so
/// a projection can never re-expand an item on the path that led to it.
#[derive(Debug, Clone)]
pub struct ClosureView<'g> {
    items: &'g KeyedMap<ContentItem>,
    excluded: Vec<String>,
}

impl<'g> ClosureView<'g> {
    pub fn new(items: &'g KeyedMap<ContentItem>) -> Self {
        Self {
            items,
            excluded: Vec::new(),
        }
    }

    pub fn get(&self, codename: &str) -> Option<&'g ContentItem> {
        if self.is_excluded(codename) {
            return None;
        }
        self.items.get(codename)
    }

    pub fn contains(&self, codename: &str) -> bool {
        self.get(codename).is_some()
    }

    /// Visible entries in closure order.
    pub fn iter(&self) -> impl Iterator<Item = (&'g str, &'g ContentItem)> + '_ {
        self.items
            .iter()
            .filter(move |(codename, _)| !self.is_excluded(codename))
    }

    /// View with one more codename hidden.
    pub fn without(&self, codename: &str) -> Self {
        let mut excluded = self.excluded.clone();
        if !self.is_excluded(codename) {
            excluded.push(codename.to_string());
        }
        Self {
            items: self.items,
            excluded,
        }
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_excluded(&self, codename: &str) -> bool {
        self.excluded.iter().any(|c| c == codename)
    }
}
