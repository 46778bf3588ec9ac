use async_trait::async_trait;
use reqwest::Method;
use xrd::Link;

use super::DiscoveryMethod;
use crate::error::{DiscoveryError, Result};
use crate::fetch::Fetcher;
use crate::html::parse_head_links;
use crate::identifier::is_http_url;

/// `<link>` elements in the `<head>` of the resource's HTML page
pub struct LinkHtmlMethod;

#[async_trait]
impl DiscoveryMethod for LinkHtmlMethod {
    fn name(&self) -> &'static str {
        "link-html"
    }

    async fn discover(&self, identifier: &str, fetcher: &Fetcher) -> Result<Vec<Link>> {
        if !is_http_url(identifier) {
            return Err(DiscoveryError::Permanent(format!(
                "HTML link discovery is not applicable to {}",
                identifier
            )));
        }

        let response = fetcher
            .fetch(identifier, Method::GET, Some("text/html"))
            .await?;
        let base = url::Url::parse(identifier).ok();
        let html = String::from_utf8_lossy(&response.body);

        Ok(parse_head_links(&html, base.as_ref()))
    }
}
