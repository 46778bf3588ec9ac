//! In-memory resource descriptor model
//!
//! A descriptor names a subject, a set of aliases for it and an ordered list
//! of typed links. Link order is significant: clients pick the first link
//! matching the relation they look for.

use crate::TEMPLATE_PLACEHOLDER;

/// A `<Property>` element (XRD) or an entry of a `properties` object (JRD)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub type_uri: String,
    pub value: Option<String>,
}

impl Property {
    pub fn new(type_uri: impl Into<String>, value: Option<String>) -> Self {
        Self {
            type_uri: type_uri.into(),
            value,
        }
    }
}

/// A human-readable link title, optionally tagged with a language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title {
    pub lang: Option<String>,
    pub value: String,
}

/// A link from the subject to a related resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    pub rel: String,
    pub href: Option<String>,
    pub media_type: Option<String>,
    pub template: Option<String>,
    pub titles: Vec<Title>,
    pub properties: Vec<Property>,
}

impl Link {
    /// Link pointing at a concrete target
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: Some(href.into()),
            ..Default::default()
        }
    }

    /// Link whose target is computed by substituting `{uri}` in `template`
    pub fn template(rel: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            template: Some(template.into()),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_title(mut self, lang: Option<&str>, title: impl Into<String>) -> Self {
        self.titles.push(Title {
            lang: lang.map(str::to_string),
            value: title.into(),
        });
        self
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// True when the link carries a template containing the `{uri}` placeholder
    pub fn is_template(&self) -> bool {
        self.template
            .as_deref()
            .is_some_and(|t| t.contains(TEMPLATE_PLACEHOLDER))
    }
}

/// XRD / JRD resource descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceDescriptor {
    subject: Option<String>,
    aliases: Vec<String>,
    properties: Vec<Property>,
    links: Vec<Link>,
}

impl ResourceDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subject(subject: impl Into<String>) -> Self {
        let mut xrd = Self::new();
        xrd.set_subject(subject);
        xrd
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Set the subject. An alias equal to the new subject is dropped so the
    /// subject never appears among its own aliases.
    pub fn set_subject(&mut self, subject: impl Into<String>) {
        let subject = subject.into();
        self.aliases.retain(|a| *a != subject);
        self.subject = Some(subject);
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Add an alias. Duplicates and the subject itself are ignored.
    pub fn add_alias(&mut self, alias: impl Into<String>) {
        let alias = alias.into();
        if self.subject.as_deref() == Some(alias.as_str()) || self.aliases.contains(&alias) {
            return;
        }
        self.aliases.push(alias);
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn add_property(&mut self, property: Property) {
        self.properties.push(property);
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn add_link(&mut self, link: Link) {
        self.links.push(link);
    }

    /// Keep only the links whose relation is listed in `rels`
    pub fn retain_rels<S: AsRef<str>>(&mut self, rels: &[S]) {
        self.links
            .retain(|l| rels.iter().any(|rel| rel.as_ref() == l.rel));
    }

    /// First link with the given relation
    pub fn find_link(&self, rel: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.rel == rel)
    }

    /// Subject followed by the aliases, in order
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.subject.as_deref().into_iter().chain(self.aliases.iter().map(String::as_str))
    }

    /// Whether `identifier` is the subject or one of the aliases
    pub fn describes(&self, identifier: &str) -> bool {
        self.identifiers().any(|id| id == identifier)
    }

    pub fn into_links(self) -> Vec<Link> {
        self.links
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_alias_skips_duplicates_and_subject() {
        let mut xrd = ResourceDescriptor::with_subject("acct:alice@example.org");
        xrd.add_alias("https://example.org/alice");
        xrd.add_alias("https://example.org/alice");
        xrd.add_alias("acct:alice@example.org");
        xrd.add_alias("https://example.org/users/1");

        assert_eq!(
            xrd.aliases(),
            &["https://example.org/alice", "https://example.org/users/1"]
        );
    }

    #[test]
    fn test_set_subject_removes_matching_alias() {
        let mut xrd = ResourceDescriptor::new();
        xrd.add_alias("acct:alice@example.org");
        xrd.add_alias("https://example.org/alice");
        xrd.set_subject("https://example.org/alice");

        assert_eq!(xrd.subject(), Some("https://example.org/alice"));
        assert_eq!(xrd.aliases(), &["acct:alice@example.org"]);
    }

    #[test]
    fn test_links_keep_insertion_order() {
        let mut xrd = ResourceDescriptor::new();
        xrd.add_link(Link::new("self", "https://example.org/a"));
        xrd.add_link(Link::new("lrdd", "https://example.org/b"));
        xrd.add_link(Link::new("lrdd", "https://example.org/c"));

        let rels: Vec<_> = xrd.links().iter().map(|l| l.rel.as_str()).collect();
        assert_eq!(rels, vec!["self", "lrdd", "lrdd"]);
        assert_eq!(
            xrd.find_link("lrdd").and_then(|l| l.href.as_deref()),
            Some("https://example.org/b")
        );
    }

    #[test]
    fn test_is_template() {
        let link = Link::template("lrdd", "https://example.org/xrd?uri={uri}");
        assert!(link.is_template());

        let no_placeholder = Link::template("lrdd", "https://example.org/xrd");
        assert!(!no_placeholder.is_template());

        assert!(!Link::new("lrdd", "https://example.org/xrd").is_template());
    }

    #[test]
    fn test_describes() {
        let mut xrd = ResourceDescriptor::with_subject("acct:bob@example.org");
        xrd.add_alias("https://example.org/bob");

        assert!(xrd.describes("acct:bob@example.org"));
        assert!(xrd.describes("https://example.org/bob"));
        assert!(!xrd.describes("https://evil.example/bob"));
    }

    #[test]
    fn test_retain_rels() {
        let mut xrd = ResourceDescriptor::new();
        xrd.add_link(Link::new("self", "https://example.org/a"));
        xrd.add_link(Link::new("lrdd", "https://example.org/b"));
        xrd.add_link(Link::new("self", "https://example.org/c"));
        xrd.retain_rels(&["self"]);
        let hrefs: Vec<_> = xrd.links().iter().filter_map(|l| l.href.as_deref()).collect();
        assert_eq!(hrefs, vec!["https://example.org/a", "https://example.org/c"]);
    }
}
