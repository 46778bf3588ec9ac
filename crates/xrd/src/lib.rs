//! XRD / JRD Resource Descriptors
//!
//! In-memory model of the resource descriptor documents used by WebFinger
//! (RFC 7033) and host-meta / LRDD (RFC 6415), with an XRD 1.0 XML codec,
//! a JRD JSON codec and `Accept`-based content negotiation.

pub mod descriptor;
pub mod error;
pub mod format;
pub mod json;
pub mod xml;

pub use descriptor::{Link, Property, ResourceDescriptor, Title};
pub use error::{Result, XrdError};
pub use format::{Format, JRD_MIME, JRD_MIME_LEGACY, XRD_MIME};

/// Link relation for LRDD descriptor services
pub const LRDD_REL: &str = "lrdd";

/// Placeholder substituted with the queried identifier in link templates
pub const TEMPLATE_PLACEHOLDER: &str = "{uri}";

impl ResourceDescriptor {
    /// Serialize as an XRD 1.0 XML document
    pub fn to_xml(&self) -> String {
        xml::to_xml(self)
    }

    /// Serialize as a JRD object
    pub fn to_json(&self) -> Result<String> {
        json::to_json(self)
    }

    /// Serialize in the given format
    pub fn render(&self, format: Format) -> Result<String> {
        match format {
            Format::Xml => Ok(self.to_xml()),
            Format::Json => self.to_json(),
        }
    }

    /// Parse a descriptor document.
    ///
    /// With a format hint only that codec is used. Without one the leading
    /// character decides (`<` for XML, `{` for JSON); anything else is tried
    /// as XML first and then as JSON.
    pub fn parse(bytes: &[u8], hint: Option<Format>) -> Result<Self> {
        match hint.or_else(|| sniff(bytes)) {
            Some(Format::Xml) => xml::from_xml(bytes),
            Some(Format::Json) => json::from_json(bytes),
            None => xml::from_xml(bytes).or_else(|_| json::from_json(bytes)),
        }
    }
}

/// Guess the format from the first significant byte, skipping a UTF-8 BOM
fn sniff(bytes: &[u8]) -> Option<Format> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'<') => Some(Format::Xml),
        Some(b'{') => Some(Format::Json),
        _ => None,
    }
}
