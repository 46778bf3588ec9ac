//! WebFinger / LRDD discovery
//!
//! Resolves an identifier (`acct:user@domain`, a profile URL or any other
//! URI) to the resource descriptor that describes it. Four methods are
//! tried in order: WebFinger, host-meta, the HTTP `Link` header and HTML
//! `<link>` elements. The first method that yields a descriptor whose
//! subject or aliases include the identifier wins.
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let discovery = lrdd_discovery::Discovery::new()?;
//! let descriptor = discovery.lookup("alice@example.org").await?;
//! println!("{}", descriptor.to_xml());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod discovery;
pub mod error;
pub mod fetch;
pub mod html;
pub mod identifier;
pub mod link_header;
pub mod methods;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use cache::CachingDiscovery;
pub use discovery::{get_service, AliasAugmenter, Discovery, DiscoveryBuilder};
pub use error::{DiscoveryError, LookupError, Result};
pub use fetch::{AllowAll, Fetcher, HostBlocklist, UrlPolicy};
pub use methods::{
    default_methods, DiscoveryMethod, HostMetaMethod, LinkHeaderMethod, LinkHtmlMethod,
    WebFingerMethod,
};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, TransportError};
