//! Shared fetch helper used by every discovery method

use reqwest::{Method, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DiscoveryError, Result};
use crate::transport::{HttpResponse, HttpTransport};

/// Decides whether a URL may be fetched at all.
///
/// Consulted before any network call; a refusal fails the current
/// discovery method without touching the network.
pub trait UrlPolicy: Send + Sync {
    fn permits(&self, url: &url::Url) -> bool;
}

/// Policy that allows every URL
pub struct AllowAll;

impl UrlPolicy for AllowAll {
    fn permits(&self, _url: &url::Url) -> bool {
        true
    }
}

/// Policy refusing a set of hosts and their subdomains
pub struct HostBlocklist {
    hosts: Vec<String>,
}

impl HostBlocklist {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            hosts: hosts
                .into_iter()
                .map(|h| h.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }
}

impl UrlPolicy for HostBlocklist {
    fn permits(&self, url: &url::Url) -> bool {
        let Some(host) = url.host_str() else {
            return true;
        };
        let host = host.to_ascii_lowercase();
        !self.hosts.iter().any(|blocked| {
            host == *blocked
                || host
                    .strip_suffix(blocked.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

/// Issues requests through the transport with a veto check and a bounded
/// timeout, mapping HTTP failures onto `DiscoveryError`
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn HttpTransport>,
    policy: Arc<dyn UrlPolicy>,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        policy: Arc<dyn UrlPolicy>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            policy,
            timeout,
        }
    }

    /// Fetch `url`, succeeding only on HTTP 200
    pub async fn fetch(
        &self,
        url: &str,
        method: Method,
        accept: Option<&str>,
    ) -> Result<HttpResponse> {
        let parsed = url::Url::parse(url)
            .map_err(|e| DiscoveryError::Permanent(format!("invalid URL {}: {}", url, e)))?;
        if !self.policy.permits(&parsed) {
            info!(url, "Fetch vetoed by URL policy");
            return Err(DiscoveryError::Permanent(format!("fetch of {} vetoed", url)));
        }

        debug!(url, method = %method, "Fetching");
        let response = tokio::time::timeout(
            self.timeout,
            self.transport.request(method, url, accept),
        )
        .await
        .map_err(|_| DiscoveryError::Transient(format!("timed out fetching {}", url)))?
        .map_err(|e| DiscoveryError::Transient(format!("fetching {} failed: {}", url, e)))?;

        match response.status {
            StatusCode::OK => Ok(response),
            StatusCode::FORBIDDEN => Err(DiscoveryError::Forbidden(format!(
                "{} returned status 403",
                url
            ))),
            status => Err(DiscoveryError::Transient(format!(
                "{} returned status {}",
                url, status
            ))),
        }
    }

    /// Whether `host` can be resolved by the transport. A lookup that
    /// outlives the fetch timeout counts as unresolvable.
    pub async fn resolves(&self, host: &str) -> bool {
        match tokio::time::timeout(self.timeout, self.transport.resolves(host)).await {
            Ok(resolves) => resolves,
            Err(_) => {
                info!(host, "Timed out resolving host");
                false
            }
        }
    }
}
