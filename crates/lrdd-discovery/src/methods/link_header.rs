use async_trait::async_trait;
use reqwest::header::LINK;
use reqwest::Method;
use xrd::{Link, LRDD_REL};

use super::DiscoveryMethod;
use crate::error::{DiscoveryError, Result};
use crate::fetch::Fetcher;
use crate::identifier::is_http_url;
use crate::link_header::parse_link_header;

/// RFC 8288 `Link` response header of a `HEAD` request on the resource
pub struct LinkHeaderMethod;

#[async_trait]
impl DiscoveryMethod for LinkHeaderMethod {
    fn name(&self) -> &'static str {
        "link-header"
    }

    async fn discover(&self, identifier: &str, fetcher: &Fetcher) -> Result<Vec<Link>> {
        if !is_http_url(identifier) {
            return Err(DiscoveryError::Permanent(format!(
                "Link header discovery is not applicable to {}",
                identifier
            )));
        }

        let response = fetcher.fetch(identifier, Method::HEAD, None).await?;
        let base = url::Url::parse(identifier).ok();

        let mut links: Vec<Link> = response
            .headers
            .get_all(LINK)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| parse_link_header(value, base.as_ref()))
            .collect();

        if links.is_empty() {
            return Err(DiscoveryError::Permanent("no Link header found".to_string()));
        }

        let index = links.iter().position(|l| l.rel == LRDD_REL).unwrap_or(0);
        Ok(vec![links.swap_remove(index)])
    }
}
