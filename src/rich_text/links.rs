//! Link pass - fills the `href` slot of link markers.

use regex::Captures;
use std::sync::Arc;
use tracing::trace;

use super::markup::{splice_href, LINK_RE};
use crate::model::{KeyedMap, Link, RichTextElement};

/// Maps a resolved link target to a URL.
pub type ContentLinkResolverFn = Arc<dyn Fn(&Link) -> String + Send + Sync>;

/// Produces the URL of a link whose target is missing.
pub type BrokenLinkResolverFn = Arc<dyn Fn() -> String + Send + Sync>;

/// Post-processes fully resolved rich text.
pub type TextResolverFn = Arc<dyn Fn(String) -> String + Send + Sync>;

/// URL resolvers used by the link pass.
#[derive(Clone, Default)]
pub struct LinkResolvers {
    pub content: Option<ContentLinkResolverFn>,
    pub broken: Option<BrokenLinkResolverFn>,
}

impl LinkResolvers {
    /// URL for the entry `id` of `links`. Without a content-link resolver
    /// every link is treated as broken.
    fn url_for(&self, links: &KeyedMap<Link>, id: &str) -> String {
        match (links.get(id), &self.content) {
            (Some(link), Some(resolve)) => resolve(link),
            (link, _) => {
                trace!(id, found = link.is_some(), "Using broken link URL");
                self.broken.as_ref().map(|resolve| resolve()).unwrap_or_default()
            }
        }
    }

    /// Resolve every link marker of `rich`'s own value.
    pub fn resolve(&self, rich: &RichTextElement) -> String {
        self.resolve_text(rich, &rich.value)
    }

    /// Resolve link markers in `text` against `rich`'s link map. Text is
    /// returned unchanged when the element has no link map.
    pub fn resolve_text(&self, rich: &RichTextElement, text: &str) -> String {
        let Some(links) = &rich.links else {
            trace!("No link map, keeping link markers");
            return text.to_string();
        };
        LINK_RE
            .replace_all(text, |caps: &Captures| {
                splice_href(&caps[0], &self.url_for(links, &caps["id"]))
            })
            .into_owned()
    }
}
