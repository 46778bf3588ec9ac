//! Identifier normalization
//!
//! Identifiers are `acct:` URIs, absolute URLs or opaque URIs. A bare
//! `user@domain` is taken to mean `acct:user@domain`; nothing else is
//! rewritten. Malformed input is passed through untouched and fails later,
//! during discovery.

use regex::Regex;
use std::sync::LazyLock;

use xrd::TEMPLATE_PLACEHOLDER;

const ACCT_SCHEME: &str = "acct:";

static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").unwrap());

static ACCT_LIKE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@/]+@[^\s@/]+$").unwrap());

/// Canonicalize a raw identifier
pub fn normalize(raw: &str) -> String {
    let raw = raw.trim();
    if !SCHEME_RE.is_match(raw) && ACCT_LIKE_RE.is_match(raw) {
        return format!("{ACCT_SCHEME}{raw}");
    }
    raw.to_string()
}

/// Whether the identifier uses the `acct:` scheme
pub fn is_acct(id: &str) -> bool {
    id.get(..ACCT_SCHEME.len())
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case(ACCT_SCHEME))
}

/// Split `acct:user@domain` into `(user, domain)`
pub fn acct_parts(id: &str) -> Option<(&str, &str)> {
    if !is_acct(id) {
        return None;
    }
    let (user, domain) = id[ACCT_SCHEME.len()..].rsplit_once('@')?;
    if user.is_empty() || domain.is_empty() {
        return None;
    }
    Some((user, domain))
}

/// Substitute the percent-encoded identifier for `{uri}` in a link template
pub fn apply_template(template: &str, id: &str) -> String {
    template.replace(TEMPLATE_PLACEHOLDER, &urlencoding::encode(id))
}

/// Whether the identifier is an absolute `http:` or `https:` URL
pub fn is_http_url(id: &str) -> bool {
    url::Url::parse(id)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}
