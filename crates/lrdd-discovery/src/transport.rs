//! HTTP transport capability
//!
//! Discovery only needs GET and HEAD with a status, headers and a body.
//! The trait keeps the orchestrator independent of the HTTP client so that
//! callers can plug in their own (or a fake one in tests).

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Method, StatusCode};
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;

const DEFAULT_USER_AGENT: &str = concat!("lrdd-discovery/", env!("CARGO_PKG_VERSION"));

/// A received HTTP response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// `Content-Type` header, if present and valid
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
}

#[derive(Debug)]
pub enum TransportError {
    Http(Box<reqwest::Error>),
    InvalidRequest(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Http(err) => write!(f, "HTTP error: {}", err),
            TransportError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Http(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Http(Box::new(err))
    }
}

/// Performs HTTP requests on behalf of the discovery methods
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue `method url`, optionally with an `Accept` header
    async fn request(
        &self,
        method: Method,
        url: &str,
        accept: Option<&str>,
    ) -> Result<HttpResponse, TransportError>;

    /// Whether `host` is a literal IP address or resolves through DNS
    async fn resolves(&self, host: &str) -> bool {
        if host.trim_matches(&['[', ']'][..]).parse::<IpAddr>().is_ok() {
            return true;
        }
        match tokio::net::lookup_host((host, 443)).await {
            Ok(mut addrs) => addrs.next().is_some(),
            Err(e) => {
                debug!(host, error = %e, "Host lookup failed");
                false
            }
        }
    }
}

/// `HttpTransport` backed by a reqwest client
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport with the given request timeout and user agent
    pub fn new(timeout: Duration, user_agent: Option<&str>) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn request(
        &self,
        method: Method,
        url: &str,
        accept: Option<&str>,
    ) -> Result<HttpResponse, TransportError> {
        let mut request = self.client.request(method, url);
        if let Some(accept) = accept {
            let value = HeaderValue::from_str(accept)
                .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
            request = request.header(ACCEPT, value);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
