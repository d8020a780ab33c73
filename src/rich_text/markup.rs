//! Inline markup grammar of rich-text values.
//!
//! ```text
//! link marker      <a data-item-id="{link id}" href="">..</a>
//! embedded item    <object type="application/kenticocloud" data-type="item"
//!                          data-rel="component" data-codename="{codename}"></object>
//! ```

use regex::Regex;
use std::sync::LazyLock;

/// Opening tag of a link marker; `id` is the link-map key.
pub(crate) static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<a[^>]+?data-item-id="(?P<id>[^"]+)"[^>]*>"#).unwrap());

/// Complete embedded-item marker; `attrs` holds its data attributes.
pub(crate) static EMBEDDED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<object type="application/kenticocloud" (?P<attrs>[^>]+)></object>"#).unwrap()
});

static DATA_ATTRIBUTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(data-\w+)="(\w+)""#).unwrap());

/// Data attributes of an embedded-item marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedMarker {
    pub data_type: Option<String>,
    pub rel: Option<String>,
    pub codename: Option<String>,
}

impl EmbeddedMarker {
    /// Parse the attribute section of a marker. Unknown attributes are ignored.
    pub fn parse(attrs: &str) -> Self {
        let mut marker = Self::default();
        for caps in DATA_ATTRIBUTE_RE.captures_iter(attrs) {
            let value = Some(caps[2].to_string());
            match &caps[1] {
                "data-type" => marker.data_type = value,
                "data-rel" => marker.rel = value,
                "data-codename" => marker.codename = value,
                _ => {}
            }
        }
        marker
    }
}

/// Escape a URL for an attribute value. Markup-significant and non-ASCII
/// characters become numeric character references.
pub fn escape_href(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '"' | '&' | '<' | '>' | '\'' => out.push_str(&format!("&#{};", c as u32)),
            c if !c.is_ascii() => out.push_str(&format!("&#{};", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Fill the empty `href` slot of a link marker's opening tag.
pub(crate) fn splice_href(marker: &str, url: &str) -> String {
    marker.replacen(r#"href="""#, &format!(r#"href="{}""#, escape_href(url)), 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_embedded_marker() {
        let text = r#"<p><object type="application/kenticocloud" data-type="item" data-rel="component" data-codename="tweet_1"></object></p>"#;
        let caps = EMBEDDED_RE.captures(text).unwrap();
        let marker = EmbeddedMarker::parse(&caps["attrs"]);
        assert_eq!(marker.codename.as_deref(), Some("tweet_1"));
        assert_eq!(marker.data_type.as_deref(), Some("item"));
        assert_eq!(marker.rel.as_deref(), Some("component"));
    }

    #[test]
    fn test_link_marker_captures_id() {
        let text = r#"Read <a data-item-id="65f05f9a" href="">this</a>."#;
        let caps = LINK_RE.captures(text).unwrap();
        assert_eq!(&caps["id"], "65f05f9a");
        assert_eq!(&caps[0], r#"<a data-item-id="65f05f9a" href="">"#);
    }

    #[test]
    fn test_escape_href() {
        assert_eq!(escape_href("/articles/on-roasts"), "/articles/on-roasts");
        assert_eq!(escape_href(r#"/a?x=1&y="2""#), "/a?x=1&#38;y=&#34;2&#34;");
        assert_eq!(escape_href("/<b>'"), "/&#60;b&#62;&#39;");
        assert_eq!(escape_href("/caf\u{e9}"), "/caf&#233;");
    }

    #[test]
    fn test_splice_href_only_fills_empty_slot() {
        assert_eq!(
            splice_href(r#"<a data-item-id="x" href="">"#, "/coffee"),
            r#"<a data-item-id="x" href="/coffee">"#
        );
        assert_eq!(
            splice_href(r#"<a data-item-id="x" href="/kept">"#, "/coffee"),
            r#"<a data-item-id="x" href="/kept">"#
        );
    }
}
