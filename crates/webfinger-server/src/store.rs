//! Actor and note lookup

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::error::{ServerError, StoreError};
use crate::types::{Actor, Note, Seed};

/// Read access to the actors and notes the server answers for
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Local actor by canonical (lowercase) nickname
    async fn local_actor_by_nickname(&self, nickname: &str) -> Result<Option<Actor>, StoreError>;

    /// Local actor by numeric id
    async fn local_actor_by_id(&self, id: i64) -> Result<Option<Actor>, StoreError>;

    /// Actor whose profile page or actor URI is exactly `url`
    async fn actor_by_profile_url(&self, url: &str) -> Result<Option<Actor>, StoreError>;

    /// Note whose URI is exactly `uri`
    async fn note_by_uri(&self, uri: &str) -> Result<Option<Note>, StoreError>;
}

/// Store holding everything in memory, typically loaded from a seed file
#[derive(Debug, Default)]
pub struct MemoryStore {
    actors: Vec<Actor>,
    notes: Vec<Note>,
    by_nickname: HashMap<String, usize>,
    by_id: HashMap<i64, usize>,
    by_url: HashMap<String, usize>,
    notes_by_uri: HashMap<String, usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: Seed) -> Self {
        let mut store = Self::new();
        for actor in seed.actors {
            store.insert_actor(actor);
        }
        for note in seed.notes {
            store.insert_note(note);
        }
        store
    }

    /// Load a JSON seed file of actors and notes
    pub async fn load_seed(path: &Path) -> Result<Self, ServerError> {
        let contents = tokio::fs::read_to_string(path).await?;
        let seed: Seed = serde_json::from_str(&contents)?;
        info!(
            path = %path.display(),
            actors = seed.actors.len(),
            notes = seed.notes.len(),
            "Loaded directory seed"
        );
        Ok(Self::from_seed(seed))
    }

    pub fn insert_actor(&mut self, actor: Actor) {
        let index = self.actors.len();
        if actor.local {
            self.by_nickname
                .insert(actor.nickname.to_ascii_lowercase(), index);
            self.by_id.insert(actor.id, index);
        }
        self.by_url.insert(actor.profile_url.clone(), index);
        self.by_url.entry(actor.uri.clone()).or_insert(index);
        self.actors.push(actor);
    }

    pub fn insert_note(&mut self, note: Note) {
        self.notes_by_uri.insert(note.uri.clone(), self.notes.len());
        self.notes.push(note);
    }

    fn actor_at(&self, index: Option<&usize>) -> Option<Actor> {
        index.and_then(|&i| self.actors.get(i)).cloned()
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn local_actor_by_nickname(&self, nickname: &str) -> Result<Option<Actor>, StoreError> {
        Ok(self.actor_at(self.by_nickname.get(nickname)))
    }

    async fn local_actor_by_id(&self, id: i64) -> Result<Option<Actor>, StoreError> {
        Ok(self.actor_at(self.by_id.get(&id)))
    }

    async fn actor_by_profile_url(&self, url: &str) -> Result<Option<Actor>, StoreError> {
        Ok(self.actor_at(self.by_url.get(url)))
    }

    async fn note_by_uri(&self, uri: &str) -> Result<Option<Note>, StoreError> {
        Ok(self
            .notes_by_uri
            .get(uri)
            .and_then(|&i| self.notes.get(i))
            .cloned())
    }
}
