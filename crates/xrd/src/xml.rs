//! XRD 1.0 XML codec

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::descriptor::{Link, Property, ResourceDescriptor, Title};
use crate::error::{Result, XrdError};

/// XRD 1.0 namespace
pub const XRD_NAMESPACE: &str = "http://docs.oasis-open.org/ns/xri/xrd-1.0";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Serialize a descriptor as an XRD 1.0 document
pub fn to_xml(xrd: &ResourceDescriptor) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!(
        "<XRD xmlns=\"{XRD_NAMESPACE}\" xmlns:xsi=\"{XSI_NAMESPACE}\">\n"
    ));

    if let Some(subject) = xrd.subject() {
        out.push_str(&format!("  <Subject>{}</Subject>\n", escape(subject)));
    }
    for alias in xrd.aliases() {
        out.push_str(&format!("  <Alias>{}</Alias>\n", escape(alias.as_str())));
    }
    for property in xrd.properties() {
        write_property(&mut out, property, "  ");
    }
    for link in xrd.links() {
        write_link(&mut out, link);
    }

    out.push_str("</XRD>\n");
    out
}

fn write_link(out: &mut String, link: &Link) {
    out.push_str(&format!("  <Link rel=\"{}\"", escape(link.rel.as_str())));
    if let Some(media_type) = &link.media_type {
        out.push_str(&format!(" type=\"{}\"", escape(media_type.as_str())));
    }
    if let Some(href) = &link.href {
        out.push_str(&format!(" href=\"{}\"", escape(href.as_str())));
    }
    if let Some(template) = &link.template {
        out.push_str(&format!(" template=\"{}\"", escape(template.as_str())));
    }

    if link.titles.is_empty() && link.properties.is_empty() {
        out.push_str("/>\n");
        return;
    }

    out.push_str(">\n");
    for title in &link.titles {
        match &title.lang {
            Some(lang) => out.push_str(&format!(
                "    <Title xml:lang=\"{}\">{}</Title>\n",
                escape(lang.as_str()),
                escape(title.value.as_str())
            )),
            None => out.push_str(&format!(
                "    <Title>{}</Title>\n",
                escape(title.value.as_str())
            )),
        }
    }
    for property in &link.properties {
        write_property(out, property, "    ");
    }
    out.push_str("  </Link>\n");
}

fn write_property(out: &mut String, property: &Property, indent: &str) {
    let type_uri = escape(property.type_uri.as_str());
    match &property.value {
        Some(value) => out.push_str(&format!(
            "{indent}<Property type=\"{type_uri}\">{}</Property>\n",
            escape(value.as_str())
        )),
        None => out.push_str(&format!(
            "{indent}<Property type=\"{type_uri}\" xsi:nil=\"true\"/>\n"
        )),
    }
}

/// Element whose text content is being collected
enum Field {
    Subject,
    Alias,
    Title(Option<String>),
    Property { type_uri: String, nil: bool },
}

/// Parse an XRD 1.0 document. The first `XRD` element is used wherever
/// it appears, so documents wrapped in `XRDS` are accepted.
pub fn from_xml(bytes: &[u8]) -> Result<ResourceDescriptor> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| XrdError::Malformed(format!("document is not UTF-8: {}", e)))?;

    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut xrd = ResourceDescriptor::new();
    let mut seen_root = false;
    let mut link: Option<Link> = None;
    let mut field: Option<Field> = None;
    let mut buf = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"XRD" if !seen_root => seen_root = true,
                    _ if !seen_root => {}
                    b"Link" => link = Some(link_from_element(&e)?),
                    b"Subject" => field = Some(Field::Subject),
                    b"Alias" => field = Some(Field::Alias),
                    b"Title" => field = Some(Field::Title(attribute(&e, b"lang")?)),
                    b"Property" => field = Some(property_field(&e)?),
                    _ => {}
                }
                buf.clear();
            }
            Event::Empty(e) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"XRD" if !seen_root => {
                        seen_root = true;
                        break;
                    }
                    _ if !seen_root => {}
                    b"Link" => {
                        let empty = link_from_element(&e)?;
                        xrd.add_link(empty);
                    }
                    b"Property" => {
                        if let Field::Property { type_uri, nil } = property_field(&e)? {
                            let value = (!nil).then(String::new);
                            push_property(&mut xrd, link.as_mut(), Property { type_uri, value });
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(t) => {
                if field.is_some() {
                    buf.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if field.is_some() {
                    buf.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(e) => {
                let value = std::mem::take(&mut buf).trim().to_string();
                match (e.local_name().as_ref(), field.take()) {
                    (b"Subject", Some(Field::Subject)) => xrd.set_subject(value),
                    (b"Alias", Some(Field::Alias)) => xrd.add_alias(value),
                    (b"Title", Some(Field::Title(lang))) => {
                        if let Some(link) = link.as_mut() {
                            link.titles.push(Title { lang, value });
                        }
                    }
                    (b"Property", Some(Field::Property { type_uri, nil })) => {
                        let value = (!nil).then_some(value);
                        push_property(&mut xrd, link.as_mut(), Property { type_uri, value });
                    }
                    (b"Link", _) => {
                        if let Some(done) = link.take() {
                            xrd.add_link(done);
                        }
                    }
                    (b"XRD", _) if seen_root => break,
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(missing_root());
    }
    Ok(xrd)
}

fn missing_root() -> XrdError {
    XrdError::Malformed("missing XRD root element".to_string())
}

fn push_property(xrd: &mut ResourceDescriptor, link: Option<&mut Link>, property: Property) {
    match link {
        Some(link) => link.properties.push(property),
        None => xrd.add_property(property),
    }
}

fn link_from_element(e: &BytesStart<'_>) -> Result<Link> {
    let rel = attribute(e, b"rel")?
        .ok_or_else(|| XrdError::Malformed("Link element without rel".to_string()))?;
    Ok(Link {
        rel,
        href: attribute(e, b"href")?,
        media_type: attribute(e, b"type")?,
        template: attribute(e, b"template")?,
        ..Default::default()
    })
}

fn property_field(e: &BytesStart<'_>) -> Result<Field> {
    let type_uri = attribute(e, b"type")?
        .ok_or_else(|| XrdError::Malformed("Property element without type".to_string()))?;
    let nil = attribute(e, b"nil")?.is_some_and(|v| v == "true");
    Ok(Field::Property { type_uri, nil })
}

/// Value of the attribute with the given local name
fn attribute(e: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == local {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST_META: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<XRD xmlns="http://docs.oasis-open.org/ns/xri/xrd-1.0">
  <Link rel="lrdd" type="application/xrd+xml"
        template="https://example.org/.well-known/webfinger?resource={uri}"/>
</XRD>"#;

    #[test]
    fn test_parses_host_meta() {
        let xrd = from_xml(HOST_META.as_bytes()).unwrap();
        assert_eq!(xrd.subject(), None);
        assert_eq!(xrd.links().len(), 1);
        let link = &xrd.links()[0];
        assert_eq!(link.rel, "lrdd");
        assert_eq!(link.media_type.as_deref(), Some("application/xrd+xml"));
        assert!(link.is_template());
    }

    #[test]
    fn test_parses_full_document() {
        let doc = r#"<?xml version="1.0"?>
<XRD xmlns="http://docs.oasis-open.org/ns/xri/xrd-1.0"
     xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <Expires>2030-01-01T00:00:00Z</Expires>
  <Subject>acct:alice@example.org</Subject>
  <Alias>https://example.org/alice</Alias>
  <Alias>acct:alice@example.org</Alias>
  <Property type="http://example.org/ns/flag" xsi:nil="true"/>
  <Link rel="http://webfinger.net/rel/profile-page" type="text/html"
        href="https://example.org/alice?a=1&amp;b=2">
    <Title xml:lang="en">Alice's page</Title>
    <Property type="http://example.org/ns/p">value</Property>
  </Link>
  <Link rel="self" href="https://example.org/users/1"></Link>
</XRD>"#;

        let xrd = from_xml(doc.as_bytes()).unwrap();
        assert_eq!(xrd.subject(), Some("acct:alice@example.org"));
        assert_eq!(xrd.aliases(), &["https://example.org/alice"]);
        assert_eq!(xrd.properties().len(), 1);
        assert_eq!(xrd.properties()[0].value, None);

        let page = &xrd.links()[0];
        assert_eq!(page.href.as_deref(), Some("https://example.org/alice?a=1&b=2"));
        assert_eq!(page.titles[0].lang.as_deref(), Some("en"));
        assert_eq!(page.titles[0].value, "Alice's page");
        assert_eq!(page.properties[0].value.as_deref(), Some("value"));
        assert_eq!(xrd.links()[1].rel, "self");
    }

    #[test]
    fn test_serialized_document_parses_back() {
        let mut xrd = ResourceDescriptor::with_subject("acct:bob@example.org");
        xrd.add_alias("https://example.org/bob");
        xrd.add_property(Property::new("http://example.org/ns/x", None));
        xrd.add_link(
            Link::template("lrdd", "https://example.org/wf?resource={uri}&x=<y>")
                .with_type("application/jrd+json")
                .with_title(Some("en"), "Lookup"),
        );

        let xml = to_xml(&xrd);
        assert!(xml.contains("&amp;x=&lt;y&gt;"));
        assert!(xml.contains("xsi:nil=\"true\""));
        assert_eq!(from_xml(xml.as_bytes()).unwrap(), xrd);
    }

    #[test]
    fn test_rejects_other_root() {
        let err = from_xml(b"<html><head></head></html>").unwrap_err();
        assert!(err.to_string().contains("missing XRD root"));
    }

    #[test]
    fn test_first_xrd_inside_xrds() {
        let doc = r#"<?xml version="1.0"?>
<XRDS xmlns="xri://$xrds">
  <XRD xmlns="http://docs.oasis-open.org/ns/xri/xrd-1.0">
    <Link rel="lrdd" template="https://example.org/xrd?uri={uri}"/>
  </XRD>
  <XRD xmlns="http://docs.oasis-open.org/ns/xri/xrd-1.0">
    <Link rel="other" href="https://example.org/other"/>
  </XRD>
</XRDS>"#;
        let xrd = from_xml(doc.as_bytes()).unwrap();
        assert_eq!(xrd.links().len(), 1);
        assert_eq!(xrd.links()[0].rel, "lrdd");
    }

    #[test]
    fn test_rejects_link_without_rel() {
        let doc = r#"<XRD xmlns="http://docs.oasis-open.org/ns/xri/xrd-1.0"><Link href="x"/></XRD>"#;
        assert!(from_xml(doc.as_bytes()).is_err());
    }

    #[test]
    fn test_rejects_empty_input() {
        assert!(from_xml(b"").is_err());
    }
}
