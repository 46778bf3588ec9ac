//! Wire formats and content negotiation

/// XML resource descriptor media type
pub const XRD_MIME: &str = "application/xrd+xml";
/// JSON resource descriptor media type
pub const JRD_MIME: &str = "application/jrd+json";
/// Legacy JSON media type, accepted on input but never emitted
pub const JRD_MIME_LEGACY: &str = "application/json";

/// Descriptor serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Xml,
    Json,
}

impl Format {
    /// Media type emitted for this format
    pub fn content_type(self) -> &'static str {
        match self {
            Format::Xml => XRD_MIME,
            Format::Json => JRD_MIME,
        }
    }

    /// Map a `Content-Type` / media range to a format, ignoring parameters
    pub fn from_media_type(value: &str) -> Option<Self> {
        match bare_mime(value).as_str() {
            XRD_MIME | "application/xml" | "text/xml" => Some(Format::Xml),
            JRD_MIME | JRD_MIME_LEGACY => Some(Format::Json),
            _ => None,
        }
    }

    /// Map a route suffix such as `json` or `xml`
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xml" => Some(Format::Xml),
            "json" => Some(Format::Json),
            _ => None,
        }
    }

    /// Pick the client's most preferred supported format from an `Accept`
    /// header, falling back to `default` when nothing supported is listed.
    ///
    /// Ranges are ordered by their `q` weight (stable, so equal weights keep
    /// the client's order). Ranges with `q=0` are refused. Wildcards express
    /// no preference and therefore select the default.
    pub fn negotiate(accept: Option<&str>, default: Format) -> Format {
        let Some(accept) = accept else {
            return default;
        };

        let mut ranges: Vec<(f32, &str)> = accept
            .split(',')
            .filter_map(|range| {
                let mut parts = range.split(';');
                let mime = parts.next()?.trim();
                if mime.is_empty() {
                    return None;
                }
                let q = parts
                    .filter_map(|p| p.split_once('='))
                    .filter(|(name, _)| name.trim().eq_ignore_ascii_case("q"))
                    .find_map(|(_, q)| q.trim().parse::<f32>().ok())
                    .unwrap_or(1.0);
                Some((q, mime))
            })
            .filter(|(q, _)| *q > 0.0)
            .collect();

        ranges.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        ranges
            .into_iter()
            .find_map(|(_, mime)| Format::from_media_type(mime))
            .unwrap_or(default)
    }
}

/// Lowercased media type without parameters
pub fn bare_mime(value: &str) -> String {
    value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
