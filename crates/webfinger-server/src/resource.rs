//! Local resources answered for by WebFinger

use xrd::{Link, ResourceDescriptor, JRD_MIME, TEMPLATE_PLACEHOLDER};

use crate::types::{Actor, Note};

pub const REL_PROFILE_PAGE: &str = "http://webfinger.net/rel/profile-page";
pub const REL_XFN: &str = "http://gmpg.org/xfn/11";
pub const REL_AVATAR: &str = "http://webfinger.net/rel/avatar";
pub const REL_SUBSCRIBE: &str = "http://ostatus.org/schema/1.0/subscribe";

const ACTIVITY_JSON: &str = "application/activity+json";
const FOAF_MIME: &str = "application/rdf+xml";
const HTML_MIME: &str = "text/html";

/// Adds links or properties to every descriptor the server builds
pub trait ResourceHook: Send + Sync {
    fn extend(&self, resource: &WebfingerResource, descriptor: &mut ResourceDescriptor);
}

/// An actor, either local or a known remote one
#[derive(Debug, Clone)]
pub struct ActorResource {
    actor: Actor,
    domain: String,
    site_url: String,
}

impl ActorResource {
    pub fn new(actor: Actor, domain: impl Into<String>, site_url: impl Into<String>) -> Self {
        Self {
            actor,
            domain: domain.into(),
            site_url: site_url.into(),
        }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    fn subject(&self) -> String {
        if self.actor.local {
            format!("acct:{}@{}", self.actor.nickname, self.domain)
        } else {
            self.actor.uri.clone()
        }
    }

    fn aliases(&self) -> Vec<String> {
        vec![self.actor.profile_url.clone(), self.actor.uri.clone()]
    }

    fn populate(&self, xrd: &mut ResourceDescriptor) {
        let actor = &self.actor;

        let mut profile_page = Link::new(REL_PROFILE_PAGE, &actor.profile_url).with_type(HTML_MIME);
        if let Some(name) = &actor.name {
            profile_page = profile_page.with_title(None, name);
        }
        xrd.add_link(profile_page);
        xrd.add_link(Link::new(REL_XFN, &actor.profile_url).with_type(HTML_MIME));
        if actor.local {
            xrd.add_link(
                Link::new(
                    "describedby",
                    format!("{}/{}/foaf", self.site_url, actor.nickname),
                )
                .with_type(FOAF_MIME),
            );
        }
        xrd.add_link(Link::new("self", &actor.uri).with_type(ACTIVITY_JSON));
        if let Some(avatar) = &actor.avatar_url {
            xrd.add_link(Link::new(REL_AVATAR, avatar));
        }
        if actor.local {
            xrd.add_link(Link::template(
                REL_SUBSCRIBE,
                format!(
                    "{}/main/ostatussub?profile={}",
                    self.site_url, TEMPLATE_PLACEHOLDER
                ),
            ));
        }
    }
}

/// A note (federated post)
#[derive(Debug, Clone)]
pub struct NoteResource {
    note: Note,
}

impl NoteResource {
    pub fn new(note: Note) -> Self {
        Self { note }
    }

    pub fn note(&self) -> &Note {
        &self.note
    }

    fn populate(&self, xrd: &mut ResourceDescriptor) {
        let note = &self.note;
        if let Some(url) = &note.url {
            xrd.add_link(Link::new("alternate", url).with_type(HTML_MIME));
        }
        xrd.add_link(Link::new("self", &note.uri).with_type(ACTIVITY_JSON));
        if let Some(author) = &note.author_profile_url {
            xrd.add_link(Link::new("author", author).with_type(HTML_MIME));
        }
    }
}

/// Something this server can describe
#[derive(Debug, Clone)]
pub enum WebfingerResource {
    Actor(ActorResource),
    Note(NoteResource),
}

impl WebfingerResource {
    pub fn subject(&self) -> String {
        match self {
            WebfingerResource::Actor(actor) => actor.subject(),
            WebfingerResource::Note(note) => note.note.uri.clone(),
        }
    }

    /// Alternative identifiers, in preference order
    pub fn aliases(&self) -> Vec<String> {
        match self {
            WebfingerResource::Actor(actor) => actor.aliases(),
            WebfingerResource::Note(note) => note.note.url.iter().cloned().collect(),
        }
    }

    /// Add the resource's links to `xrd`
    pub fn populate(&self, xrd: &mut ResourceDescriptor) {
        match self {
            WebfingerResource::Actor(actor) => actor.populate(xrd),
            WebfingerResource::Note(note) => note.populate(xrd),
        }
    }

    /// Build the descriptor: subject, aliases, then links.
    ///
    /// With `legacy_http` every `https:` alias is followed by its `http:`
    /// twin. The subject is never rewritten and gets no twin.
    pub fn to_descriptor(&self, legacy_http: bool) -> ResourceDescriptor {
        let subject = self.subject();
        let mut xrd = ResourceDescriptor::with_subject(subject.clone());
        for alias in self.aliases() {
            if alias == subject {
                continue;
            }
            let twin = legacy_http
                .then(|| alias.strip_prefix("https://").map(|rest| format!("http://{}", rest)))
                .flatten();
            xrd.add_alias(alias);
            if let Some(twin) = twin {
                xrd.add_alias(twin);
            }
        }
        self.populate(&mut xrd);
        xrd
    }
}

/// `lrdd` templates advertised by host-meta, JRD first
pub fn host_meta(site_url: &str) -> ResourceDescriptor {
    let template = format!(
        "{}/.well-known/webfinger?resource={}",
        site_url, TEMPLATE_PLACEHOLDER
    );
    let mut xrd = ResourceDescriptor::new();
    xrd.add_link(Link::template(xrd::LRDD_REL, template.clone()).with_type(JRD_MIME));
    xrd.add_link(Link::template(xrd::LRDD_REL, template).with_type(xrd::XRD_MIME));
    xrd
}
