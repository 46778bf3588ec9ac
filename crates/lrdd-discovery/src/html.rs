//! `<link>` discovery in HTML documents
//!
//! This is a tolerant regex scan rather than an HTML parse: documents found
//! in the wild are often malformed, and only `<head>` links matter here.
//! Comments, scripts and other markup inside `<head>` are not understood.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;
use xrd::Link;

/// `<head>` contents; an unterminated head runs to `<body` or the end
static HEAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<head(?:\s[^>]*)?>(.*?)(?:</head\s*>|<body[\s>]|\z)").unwrap()
});

static LINK_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<link\s[^>]*>").unwrap());

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\s([a-z][a-z0-9_:\-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^"'\s>]+))"#).unwrap()
});

/// Extract the `<link>` elements of the document head, one link per
/// relation type. Relative hrefs are resolved against `base` when given.
/// A document without a `<head>` yields no links.
pub fn parse_head_links(html: &str, base: Option<&Url>) -> Vec<Link> {
    let Some(head) = HEAD_RE.captures(html).and_then(|c| c.get(1)) else {
        return Vec::new();
    };

    let mut links = Vec::new();
    for tag in LINK_TAG_RE.find_iter(head.as_str()) {
        let mut rel = None;
        let mut href = None;
        let mut media_type = None;

        for attr in ATTR_RE.captures_iter(tag.as_str()) {
            let value = attr
                .get(2)
                .or_else(|| attr.get(3))
                .or_else(|| attr.get(4))
                .map(|m| decode_entities(m.as_str().trim()));
            match attr[1].to_ascii_lowercase().as_str() {
                "rel" if rel.is_none() => rel = value,
                "href" if href.is_none() => href = value,
                "type" if media_type.is_none() => media_type = value,
                _ => {}
            }
        }

        let (Some(rel), Some(href)) = (rel, href) else {
            continue;
        };
        let href = match base {
            Some(base) => base.join(&href).map(|u| u.to_string()).unwrap_or(href),
            None => href,
        };

        for token in rel.split_whitespace() {
            let mut link = Link::new(token, href.clone());
            link.media_type = media_type.clone();
            links.push(link);
        }
    }

    links
}

/// Decode the handful of entities that show up in attribute values
fn decode_entities(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
