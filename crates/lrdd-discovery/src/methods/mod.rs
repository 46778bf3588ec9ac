//! Discovery strategies
//!
//! Each method turns an identifier into candidate links. The orchestrator
//! tries them in order and picks the first `lrdd` link from the first method
//! that yields one.

use async_trait::async_trait;
use std::sync::Arc;
use xrd::Link;

use crate::error::Result;
use crate::fetch::Fetcher;

mod host_meta;
mod link_header;
mod link_html;
mod webfinger;

pub use host_meta::HostMetaMethod;
pub use link_header::LinkHeaderMethod;
pub use link_html::LinkHtmlMethod;
pub use webfinger::WebFingerMethod;

/// A way of locating the descriptor service for an identifier
#[async_trait]
pub trait DiscoveryMethod: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Candidate links for a normalized identifier
    async fn discover(&self, identifier: &str, fetcher: &Fetcher) -> Result<Vec<Link>>;
}

/// WebFinger, host-meta, `Link` header, then HTML `<link>`
pub fn default_methods() -> Vec<Arc<dyn DiscoveryMethod>> {
    vec![
        Arc::new(WebFingerMethod),
        Arc::new(HostMetaMethod),
        Arc::new(LinkHeaderMethod),
        Arc::new(LinkHtmlMethod),
    ]
}
