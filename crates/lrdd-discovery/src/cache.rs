//! Caching wrapper around `Discovery`

use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use xrd::ResourceDescriptor;

use crate::discovery::Discovery;
use crate::error::LookupError;
use crate::identifier::normalize;

/// Cache TTL in seconds (1 hour)
const CACHE_TTL_SECS: u64 = 3600;
const CACHE_CAPACITY: u64 = 10_000;

/// Remembers successful lookups, keyed by normalized identifier.
/// Failures are never cached.
pub struct CachingDiscovery {
    inner: Discovery,
    cache: Cache<String, Arc<ResourceDescriptor>>,
}

impl CachingDiscovery {
    pub fn new(inner: Discovery) -> Self {
        Self::with_ttl(inner, Duration::from_secs(CACHE_TTL_SECS))
    }

    pub fn with_ttl(inner: Discovery, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(ttl)
            .build();
        Self { inner, cache }
    }

    pub async fn lookup(&self, identifier: &str) -> Result<Arc<ResourceDescriptor>, LookupError> {
        let key = normalize(identifier);
        if let Some(cached) = self.cache.get(&key).await {
            debug!(identifier = %key, "Descriptor cache hit");
            return Ok(cached);
        }

        let descriptor = Arc::new(self.inner.lookup(&key).await?);
        self.cache.insert(key, descriptor.clone()).await;
        Ok(descriptor)
    }

    /// Drop a cached descriptor
    pub async fn invalidate(&self, identifier: &str) {
        self.cache.invalidate(&normalize(identifier)).await;
    }

    pub fn inner(&self) -> &Discovery {
        &self.inner
    }
}
