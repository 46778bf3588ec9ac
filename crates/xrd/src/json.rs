//! JRD (RFC 7033 JSON Resource Descriptor) codec

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::descriptor::{Link, Property, ResourceDescriptor, Title};
use crate::error::Result;

/// Language tag used for titles without an explicit language
const UNDETERMINED_LANG: &str = "und";

#[derive(Debug, Serialize, Deserialize)]
struct JrdDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    aliases: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    properties: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    links: Option<Vec<JrdLink>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JrdLink {
    rel: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    titles: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    properties: Option<Map<String, Value>>,
}

/// Serialize a descriptor as a JRD object
pub fn to_json(xrd: &ResourceDescriptor) -> Result<String> {
    let doc = JrdDocument {
        subject: xrd.subject().map(str::to_string),
        aliases: Some(xrd.aliases().to_vec()),
        properties: properties_to_map(xrd.properties()),
        links: Some(xrd.links().iter().map(link_to_jrd).collect()),
    };
    Ok(serde_json::to_string(&doc)?)
}

/// Parse a JRD object
pub fn from_json(bytes: &[u8]) -> Result<ResourceDescriptor> {
    let doc: JrdDocument = serde_json::from_slice(bytes)?;

    let mut xrd = ResourceDescriptor::new();
    if let Some(subject) = doc.subject {
        xrd.set_subject(subject);
    }
    for alias in doc.aliases.unwrap_or_default() {
        xrd.add_alias(alias);
    }
    for property in map_to_properties(doc.properties) {
        xrd.add_property(property);
    }
    for link in doc.links.unwrap_or_default() {
        xrd.add_link(jrd_to_link(link));
    }
    Ok(xrd)
}

fn link_to_jrd(link: &Link) -> JrdLink {
    let titles = if link.titles.is_empty() {
        None
    } else {
        Some(
            link.titles
                .iter()
                .map(|t| {
                    let lang = t.lang.clone().unwrap_or_else(|| UNDETERMINED_LANG.to_string());
                    (lang, Value::String(t.value.clone()))
                })
                .collect(),
        )
    };

    JrdLink {
        rel: link.rel.clone(),
        media_type: link.media_type.clone(),
        href: link.href.clone(),
        template: link.template.clone(),
        titles,
        properties: properties_to_map(&link.properties),
    }
}

fn jrd_to_link(jrd: JrdLink) -> Link {
    let titles = jrd
        .titles
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(lang, value)| {
            let value = value.as_str()?.to_string();
            let lang = (lang != UNDETERMINED_LANG).then_some(lang);
            Some(Title { lang, value })
        })
        .collect();

    Link {
        rel: jrd.rel,
        href: jrd.href,
        media_type: jrd.media_type,
        template: jrd.template,
        titles,
        properties: map_to_properties(jrd.properties),
    }
}

fn properties_to_map(properties: &[Property]) -> Option<Map<String, Value>> {
    if properties.is_empty() {
        return None;
    }
    Some(
        properties
            .iter()
            .map(|p| {
                let value = p.value.clone().map(Value::String).unwrap_or(Value::Null);
                (p.type_uri.clone(), value)
            })
            .collect(),
    )
}

fn map_to_properties(map: Option<Map<String, Value>>) -> Vec<Property> {
    map.unwrap_or_default()
        .into_iter()
        .map(|(type_uri, value)| {
            let value = match value {
                Value::Null => None,
                Value::String(s) => Some(s),
                other => Some(other.to_string()),
            };
            Property { type_uri, value }
        })
        .collect()
}
