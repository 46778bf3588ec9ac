//! In-memory transport for tests

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::transport::{HttpResponse, HttpTransport, TransportError};

enum Canned {
    Response(HttpResponse),
    Stall,
}

/// Serves canned responses keyed by method and URL; anything else is a 404.
/// Every request is recorded as `"METHOD url"`.
pub(crate) struct MockTransport {
    routes: HashMap<(Method, String), Canned>,
    hosts: HashSet<String>,
    stalled_hosts: HashSet<String>,
    requests: Mutex<Vec<String>>,
    accepts: Mutex<Vec<Option<String>>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self {
            routes: HashMap::new(),
            hosts: HashSet::new(),
            stalled_hosts: HashSet::new(),
            requests: Mutex::new(Vec::new()),
            accepts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn respond(
        self,
        method: Method,
        url: &str,
        status: u16,
        content_type: &str,
        body: &str,
    ) -> Self {
        self.respond_with_headers(method, url, status, &[("content-type", content_type)], body)
    }

    pub(crate) fn respond_with_headers(
        mut self,
        method: Method,
        url: &str,
        status: u16,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Self {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.append(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        let response = HttpResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: map,
            body: body.as_bytes().to_vec(),
        };
        self.routes
            .insert((method, url.to_string()), Canned::Response(response));
        self
    }

    /// Requests to `url` never complete
    pub(crate) fn stall(mut self, url: &str) -> Self {
        self.routes.insert((Method::GET, url.to_string()), Canned::Stall);
        self
    }

    /// Mark `host` as resolvable
    pub(crate) fn with_host(mut self, host: &str) -> Self {
        self.hosts.insert(host.to_string());
        self
    }

    /// Lookups of `host` never complete
    pub(crate) fn stall_host(mut self, host: &str) -> Self {
        self.stalled_hosts.insert(host.to_string());
        self
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn accepts(&self) -> Vec<Option<String>> {
        self.accepts.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn request(
        &self,
        method: Method,
        url: &str,
        accept: Option<&str>,
    ) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(format!("{} {}", method, url));
        self.accepts.lock().unwrap().push(accept.map(str::to_string));

        match self.routes.get(&(method, url.to_string())) {
            Some(Canned::Response(response)) => Ok(response.clone()),
            Some(Canned::Stall) => std::future::pending().await,
            None => {
                let mut headers = HeaderMap::new();
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
                Ok(HttpResponse {
                    status: StatusCode::NOT_FOUND,
                    headers,
                    body: Vec::new(),
                })
            }
        }
    }

    async fn resolves(&self, host: &str) -> bool {
        if self.stalled_hosts.contains(host) {
            return std::future::pending().await;
        }
        self.hosts.contains(host) || host.parse::<std::net::IpAddr>().is_ok()
    }
}
