//! Discovery orchestrator
//!
//! Runs the configured methods in order until one of them leads to a
//! descriptor that actually describes the requested identifier.

use reqwest::Method;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use xrd::{Format, Link, ResourceDescriptor, LRDD_REL};

use crate::error::{DiscoveryError, LookupError};
use crate::fetch::{AllowAll, Fetcher, UrlPolicy};
use crate::identifier::{apply_template, normalize};
use crate::methods::{default_methods, DiscoveryMethod};
use crate::transport::{HttpTransport, ReqwestTransport, TransportError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Proposes extra aliases for a successfully discovered identifier
pub type AliasAugmenter = Arc<dyn Fn(&str, &ResourceDescriptor) -> Vec<String> + Send + Sync>;

/// First link with the given relation type
pub fn get_service<'a>(links: &'a [Link], rel: &str) -> Option<&'a Link> {
    links.iter().find(|link| link.rel == rel)
}

/// Resolves identifiers to resource descriptors
pub struct Discovery {
    methods: Vec<Arc<dyn DiscoveryMethod>>,
    fetcher: Fetcher,
    augmenter: Option<AliasAugmenter>,
}

impl Discovery {
    /// Discovery with the default methods over a reqwest transport
    pub fn new() -> Result<Self, TransportError> {
        Self::builder().build()
    }

    pub fn builder() -> DiscoveryBuilder {
        DiscoveryBuilder::default()
    }

    /// Names of the configured methods, in the order they are tried
    pub fn method_names(&self) -> Vec<&'static str> {
        self.methods.iter().map(|m| m.name()).collect()
    }

    /// Find the descriptor for `identifier`.
    ///
    /// Methods are tried in order and the first validated descriptor is
    /// returned. An HTTP 403 from any fetch stops the lookup.
    pub async fn lookup(&self, identifier: &str) -> Result<ResourceDescriptor, LookupError> {
        let id = normalize(identifier);
        if id.is_empty() {
            return Err(LookupError::MalformedIdentifier(identifier.to_string()));
        }

        for method in &self.methods {
            match self.try_method(method.as_ref(), &id).await {
                Ok(descriptor) => {
                    info!(identifier = %id, method = method.name(), "Discovered descriptor");
                    return Ok(descriptor);
                }
                Err(e) if e.is_forbidden() => {
                    warn!(identifier = %id, method = method.name(), error = %e, "Discovery aborted");
                    return Err(LookupError::Aborted {
                        identifier: id,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    debug!(identifier = %id, method = method.name(), error = %e, "Discovery method failed");
                }
            }
        }

        info!(identifier = %id, "No discovery method succeeded");
        Err(LookupError::Failed { identifier: id })
    }

    /// `lookup`, abandoned as soon as `cancel` completes
    pub async fn lookup_until<F>(
        &self,
        identifier: &str,
        cancel: F,
    ) -> Result<ResourceDescriptor, LookupError>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                let id = normalize(identifier);
                info!(identifier = %id, "Discovery cancelled");
                Err(LookupError::Cancelled { identifier: id })
            }
            result = self.lookup(identifier) => result,
        }
    }

    /// `lookup` bounded by an overall deadline
    pub async fn lookup_within(
        &self,
        identifier: &str,
        deadline: Duration,
    ) -> Result<ResourceDescriptor, LookupError> {
        self.lookup_until(identifier, tokio::time::sleep(deadline))
            .await
    }

    /// Every identifier known to refer to the same resource: the subject
    /// and aliases of the discovered descriptor, plus anything the alias
    /// augmenter proposes. Empty when discovery fails.
    pub async fn profile_aliases(&self, identifier: &str) -> Vec<String> {
        let descriptor = match self.lookup(identifier).await {
            Ok(descriptor) => descriptor,
            Err(e) => {
                debug!(identifier, error = %e, "No aliases");
                return Vec::new();
            }
        };

        let mut aliases: Vec<String> = descriptor.identifiers().map(str::to_string).collect();
        if let Some(augmenter) = &self.augmenter {
            for alias in augmenter(&normalize(identifier), &descriptor) {
                if !aliases.contains(&alias) {
                    aliases.push(alias);
                }
            }
        }
        aliases
    }

    async fn try_method(
        &self,
        method: &dyn DiscoveryMethod,
        id: &str,
    ) -> Result<ResourceDescriptor, DiscoveryError> {
        let links = method.discover(id, &self.fetcher).await?;
        let link = get_service(&links, LRDD_REL)
            .ok_or_else(|| DiscoveryError::Permanent(format!("no {} link", LRDD_REL)))?;

        let url = match (&link.template, &link.href) {
            (Some(template), _) => apply_template(template, id),
            (None, Some(href)) => href.clone(),
            (None, None) => {
                return Err(DiscoveryError::Permanent(format!(
                    "{} link has neither template nor href",
                    LRDD_REL
                )))
            }
        };

        let response = self
            .fetcher
            .fetch(&url, Method::GET, link.media_type.as_deref())
            .await?;
        let hint = response.content_type().and_then(Format::from_media_type);
        let descriptor = ResourceDescriptor::parse(&response.body, hint)?;

        if !descriptor.describes(id) {
            warn!(
                identifier = %id,
                url = %url,
                subject = descriptor.subject().unwrap_or_default(),
                "Descriptor does not describe the requested identifier, discarding"
            );
            return Err(DiscoveryError::Permanent(format!(
                "descriptor at {} does not describe {}",
                url, id
            )));
        }

        Ok(descriptor)
    }
}

/// Configures a `Discovery`
pub struct DiscoveryBuilder {
    transport: Option<Arc<dyn HttpTransport>>,
    policy: Arc<dyn UrlPolicy>,
    methods: Vec<Arc<dyn DiscoveryMethod>>,
    timeout: Duration,
    user_agent: Option<String>,
    augmenter: Option<AliasAugmenter>,
}

impl Default for DiscoveryBuilder {
    fn default() -> Self {
        Self {
            transport: None,
            policy: Arc::new(AllowAll),
            methods: default_methods(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            augmenter: None,
        }
    }
}

impl DiscoveryBuilder {
    /// Use a custom transport instead of the reqwest one
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Timeout applied to every fetch
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn policy(mut self, policy: Arc<dyn UrlPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the method list
    pub fn methods(mut self, methods: Vec<Arc<dyn DiscoveryMethod>>) -> Self {
        self.methods = methods;
        self
    }

    pub fn prepend_method(mut self, method: Arc<dyn DiscoveryMethod>) -> Self {
        self.methods.insert(0, method);
        self
    }

    pub fn append_method(mut self, method: Arc<dyn DiscoveryMethod>) -> Self {
        self.methods.push(method);
        self
    }

    pub fn alias_augmenter<F>(mut self, augmenter: F) -> Self
    where
        F: Fn(&str, &ResourceDescriptor) -> Vec<String> + Send + Sync + 'static,
    {
        self.augmenter = Some(Arc::new(augmenter));
        self
    }

    pub fn build(self) -> Result<Discovery, TransportError> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(
                self.timeout,
                self.user_agent.as_deref(),
            )?),
        };

        Ok(Discovery {
            methods: self.methods,
            fetcher: Fetcher::new(transport, self.policy, self.timeout),
            augmenter: self.augmenter,
        })
    }
}
