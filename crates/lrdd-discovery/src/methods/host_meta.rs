use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, warn};
use xrd::{Format, Link, ResourceDescriptor, XRD_MIME};

use super::DiscoveryMethod;
use crate::error::{DiscoveryError, Result};
use crate::fetch::Fetcher;
use crate::identifier::acct_parts;

const HOST_META_PATH: &str = "/.well-known/host-meta";

/// RFC 6415 host-meta.
///
/// Accounts try HTTPS and then plain HTTP; URLs only use their own scheme.
pub struct HostMetaMethod;

impl HostMetaMethod {
    /// `(scheme, authority)` pairs to try, in order
    fn candidates(identifier: &str) -> Option<Vec<(String, String)>> {
        if let Some((_, domain)) = acct_parts(identifier) {
            return Some(vec![
                ("https".to_string(), domain.to_string()),
                ("http".to_string(), domain.to_string()),
            ]);
        }

        let url = url::Url::parse(identifier).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        let host = url.host_str()?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        Some(vec![(url.scheme().to_string(), authority)])
    }
}

#[async_trait]
impl DiscoveryMethod for HostMetaMethod {
    fn name(&self) -> &'static str {
        "host-meta"
    }

    async fn discover(&self, identifier: &str, fetcher: &Fetcher) -> Result<Vec<Link>> {
        let Some(candidates) = Self::candidates(identifier) else {
            return Err(DiscoveryError::Permanent(format!(
                "host-meta is not applicable to {}",
                identifier
            )));
        };

        for (scheme, authority) in &candidates {
            let url = format!("{}://{}{}", scheme, authority, HOST_META_PATH);
            let response = match fetcher.fetch(&url, Method::GET, Some(XRD_MIME)).await {
                Ok(response) => response,
                Err(e) if e.is_forbidden() => return Err(e),
                Err(e) => {
                    debug!(url = %url, error = %e, "host-meta fetch failed");
                    continue;
                }
            };

            let hint = response.content_type().and_then(Format::from_media_type);
            match ResourceDescriptor::parse(&response.body, hint) {
                Ok(descriptor) => return Ok(descriptor.into_links()),
                Err(e) => warn!(url = %url, error = %e, "Unparseable host-meta document"),
            }
        }

        Err(DiscoveryError::Transient(format!(
            "no usable host-meta for {}",
            identifier
        )))
    }
}
