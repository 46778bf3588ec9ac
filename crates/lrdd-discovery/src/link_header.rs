//! RFC 8288 `Link` header parsing
//!
//! Handles comma-separated link values, quoted and bare parameters and
//! space-separated relation lists. Extension parameters other than `rel`,
//! `type` and `title` are ignored.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;
use xrd::Link;

static LINK_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<([^>]*)>((?:\s*;\s*[^;,=\s]+(?:\s*=\s*(?:"[^"]*"|[^;,\s]*))?)*)"#).unwrap()
});

static PARAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#";\s*([^;,=\s]+)(?:\s*=\s*(?:"([^"]*)"|([^;,\s]*)))?"#).unwrap()
});

/// Parse one `Link` header value into links, one per relation type.
///
/// Relative targets are resolved against `base` when given.
pub fn parse_link_header(value: &str, base: Option<&Url>) -> Vec<Link> {
    let mut links = Vec::new();

    for caps in LINK_VALUE_RE.captures_iter(value) {
        let target = caps[1].trim();
        let href = match base {
            Some(base) => base
                .join(target)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| target.to_string()),
            None => target.to_string(),
        };

        let mut rels: Vec<String> = Vec::new();
        let mut media_type = None;
        let mut title = None;

        for param in PARAM_RE.captures_iter(&caps[2]) {
            let name = param[1].to_ascii_lowercase();
            let value = param
                .get(2)
                .or_else(|| param.get(3))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();

            // First occurrence wins for each parameter
            match name.as_str() {
                "rel" if rels.is_empty() => {
                    rels = value.split_whitespace().map(str::to_string).collect();
                }
                "type" if media_type.is_none() => media_type = Some(value),
                "title" if title.is_none() => title = Some(value),
                _ => {}
            }
        }

        for rel in rels {
            let mut link = Link::new(rel, href.clone());
            link.media_type = media_type.clone();
            if let Some(title) = &title {
                link = link.with_title(None, title.clone());
            }
            links.push(link);
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_link() {
        let links = parse_link_header(
            r#"<https://example.org/xrd?uri=https%3A%2F%2Fexample.org%2Falice>; rel="lrdd"; type="application/xrd+xml""#,
            None,
        );
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].rel, "lrdd");
        assert_eq!(
            links[0].href.as_deref(),
            Some("https://example.org/xrd?uri=https%3A%2F%2Fexample.org%2Falice")
        );
        assert_eq!(links[0].media_type.as_deref(), Some("application/xrd+xml"));
    }

    #[test]
    fn test_multiple_links_and_bare_params() {
        let links = parse_link_header(
            r#"<https://example.org/a>; rel=next, <https://example.org/b>;rel="lrdd describedby";type=application/jrd+json"#,
            None,
        );
        let pairs: Vec<_> = links
            .iter()
            .map(|l| (l.rel.as_str(), l.href.as_deref().unwrap()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("next", "https://example.org/a"),
                ("lrdd", "https://example.org/b"),
                ("describedby", "https://example.org/b"),
            ]
        );
        assert_eq!(links[1].media_type.as_deref(), Some("application/jrd+json"));
    }

    #[test]
    fn test_comma_inside_quoted_title() {
        let links = parse_link_header(
            r#"<https://example.org/a>; title="one, two"; rel="lrdd""#,
            None,
        );
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].titles[0].value, "one, two");
    }

    #[test]
    fn test_relative_target_resolved() {
        let base = Url::parse("https://example.org/users/alice").unwrap();
        let links = parse_link_header(r#"</xrd/alice>; rel="lrdd""#, Some(&base));
        assert_eq!(links[0].href.as_deref(), Some("https://example.org/xrd/alice"));
    }

    #[test]
    fn test_link_without_rel_is_skipped() {
        assert!(parse_link_header("<https://example.org/a>; type=\"text/html\"", None).is_empty());
        assert!(parse_link_header("garbage", None).is_empty());
    }
}
