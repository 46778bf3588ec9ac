//! Maps an inbound WebFinger `resource` to a local actor or note

use lrdd_discovery::identifier::{acct_parts, is_acct, is_http_url};
use regex::Regex;
use std::fmt;
use std::sync::{Arc, LazyLock};
use tracing::debug;
use xrd::ResourceDescriptor;

use crate::config::Config;
use crate::error::StoreError;
use crate::resource::{ActorResource, NoteResource, ResourceHook, WebfingerResource};
use crate::store::ResourceStore;
use crate::types::Actor;

static NICKNAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9_]{1,64}$").unwrap());

/// `/{nickname}`, `/@{nickname}` or `/user/{id}`
static LOCAL_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(?:@?(?P<nickname>[A-Za-z0-9_]{1,64})|user/(?P<id>[0-9]{1,18}))/?$").unwrap()
});

#[derive(Debug)]
pub enum ResolveError {
    NotFound(String),
    /// `acct:` identifier for another domain
    UnsupportedRemoteProfile(String),
    /// `acct:` identifier without a usable user and domain
    AmbiguousProtocol(String),
    Store(StoreError),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::NotFound(resource) => write!(f, "Unknown resource: {}", resource),
            ResolveError::UnsupportedRemoteProfile(resource) => {
                write!(f, "Not a local resource: {}", resource)
            }
            ResolveError::AmbiguousProtocol(resource) => {
                write!(f, "Cannot parse resource: {}", resource)
            }
            ResolveError::Store(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ResolveError {
    fn from(err: StoreError) -> Self {
        ResolveError::Store(err)
    }
}

/// Lowercased nickname, if it is a valid one
pub fn canonical_nickname(raw: &str) -> Option<String> {
    let nickname = raw.trim().to_ascii_lowercase();
    NICKNAME_RE.is_match(&nickname).then_some(nickname)
}

pub struct LocalResourceResolver {
    store: Arc<dyn ResourceStore>,
    domain: String,
    site_url: String,
    legacy_http: bool,
    hooks: Vec<Arc<dyn ResourceHook>>,
}

impl LocalResourceResolver {
    pub fn new(store: Arc<dyn ResourceStore>, config: &Config) -> Self {
        Self {
            store,
            domain: config.site_domain.clone(),
            site_url: config.site_url.clone(),
            legacy_http: config.legacy_http_aliases,
            hooks: Vec::new(),
        }
    }

    /// Register a hook run on every descriptor built by `describe`
    pub fn with_hook(mut self, hook: Arc<dyn ResourceHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn store(&self) -> &dyn ResourceStore {
        self.store.as_ref()
    }

    /// Classify and look up `raw`
    pub async fn resolve(&self, raw: &str) -> Result<WebfingerResource, ResolveError> {
        let resource = raw.trim();

        if is_acct(resource) {
            return self.resolve_acct(resource).await;
        }

        let actor = if is_http_url(resource) {
            self.store.actor_by_profile_url(resource).await?
        } else {
            self.resolve_local_path(resource).await?
        };
        if let Some(actor) = actor {
            return Ok(self.actor_resource(actor));
        }

        if let Some(note) = self.store.note_by_uri(resource).await? {
            return Ok(WebfingerResource::Note(NoteResource::new(note)));
        }

        debug!(resource, "Resource not found");
        Err(ResolveError::NotFound(resource.to_string()))
    }

    /// Descriptor for a resolved resource, with hooks applied
    pub fn describe(&self, resource: &WebfingerResource) -> ResourceDescriptor {
        let mut xrd = resource.to_descriptor(self.legacy_http);
        for hook in &self.hooks {
            hook.extend(resource, &mut xrd);
        }
        xrd
    }

    pub fn actor_resource(&self, actor: Actor) -> WebfingerResource {
        WebfingerResource::Actor(ActorResource::new(
            actor,
            self.domain.clone(),
            self.site_url.clone(),
        ))
    }

    async fn resolve_acct(&self, resource: &str) -> Result<WebfingerResource, ResolveError> {
        let (user, domain) = acct_parts(resource)
            .ok_or_else(|| ResolveError::AmbiguousProtocol(resource.to_string()))?;

        if !domain.eq_ignore_ascii_case(&self.domain) {
            return Err(ResolveError::UnsupportedRemoteProfile(resource.to_string()));
        }

        let nickname = canonical_nickname(user)
            .ok_or_else(|| ResolveError::NotFound(resource.to_string()))?;

        match self.store.local_actor_by_nickname(&nickname).await? {
            Some(actor) => Ok(self.actor_resource(actor)),
            None => Err(ResolveError::NotFound(resource.to_string())),
        }
    }

    /// Match bare local paths, optionally prefixed with the site domain
    async fn resolve_local_path(&self, resource: &str) -> Result<Option<Actor>, ResolveError> {
        let path = match resource.get(..self.domain.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(&self.domain) => {
                &resource[self.domain.len()..]
            }
            _ => resource,
        };

        let Some(caps) = LOCAL_PATH_RE.captures(path) else {
            return Ok(None);
        };

        if let Some(nickname) = caps.name("nickname") {
            let nickname = nickname.as_str().to_ascii_lowercase();
            return Ok(self.store.local_actor_by_nickname(&nickname).await?);
        }
        match caps.name("id").and_then(|id| id.as_str().parse::<i64>().ok()) {
            Some(id) => Ok(self.store.local_actor_by_id(id).await?),
            None => Ok(None),
        }
    }
}
