use async_trait::async_trait;
use tracing::debug;
use xrd::{Link, JRD_MIME, LRDD_REL, TEMPLATE_PLACEHOLDER};

use super::DiscoveryMethod;
use crate::error::{DiscoveryError, Result};
use crate::fetch::Fetcher;
use crate::identifier::acct_parts;

/// RFC 7033 WebFinger.
///
/// Builds the well-known query template for the account's domain without
/// any HTTP traffic; the orchestrator fetches it.
pub struct WebFingerMethod;

#[async_trait]
impl DiscoveryMethod for WebFingerMethod {
    fn name(&self) -> &'static str {
        "webfinger"
    }

    async fn discover(&self, identifier: &str, fetcher: &Fetcher) -> Result<Vec<Link>> {
        let Some((_, domain)) = acct_parts(identifier) else {
            return Err(DiscoveryError::Permanent(format!(
                "WebFinger is not applicable to {}",
                identifier
            )));
        };

        if !fetcher.resolves(host_of(domain)).await {
            return Err(DiscoveryError::Permanent(format!(
                "domain {} does not resolve",
                domain
            )));
        }

        let template = format!(
            "https://{}/.well-known/webfinger?resource={}",
            domain, TEMPLATE_PLACEHOLDER
        );
        debug!(identifier, template = %template, "WebFinger template");

        Ok(vec![Link::template(LRDD_REL, template).with_type(JRD_MIME)])
    }
}

/// Strip a `:port` suffix, keeping bracketed IPv6 literals intact
fn host_of(domain: &str) -> &str {
    if let Some(end) = domain.find(']') {
        return &domain[..=end];
    }
    match domain.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => domain,
    }
}
