use serde::{Deserialize, Serialize};

/// A local or remote account known to this site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub nickname: String,
    /// Canonical ActivityPub identifier of the actor
    pub uri: String,
    /// Human-readable profile page
    pub profile_url: String,
    #[serde(default = "default_local")]
    pub local: bool,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Display name, used as the profile page title
    #[serde(default)]
    pub name: Option<String>,
}

fn default_local() -> bool {
    true
}

/// A federated post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub uri: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub author_profile_url: Option<String>,
}

/// Contents of a directory seed file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub actors: Vec<Actor>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_defaults() {
        let seed: Seed = serde_json::from_str(
            r#"{"actors":[{"id":1,"nickname":"alice","uri":"https://example.org/users/alice","profile_url":"https://example.org/alice"}]}"#,
        )
        .unwrap();
        assert_eq!(seed.actors.len(), 1);
        assert!(seed.actors[0].local);
        assert!(seed.actors[0].avatar_url.is_none());
        assert!(seed.notes.is_empty());
    }

    #[test]
    fn test_note_optional_fields() {
        let note: Note =
            serde_json::from_str(r#"{"id":7,"uri":"tag:example.org,2024:note/7"}"#).unwrap();
        assert_eq!(note.id, 7);
        assert!(note.url.is_none());
        assert!(note.author_profile_url.is_none());
    }
}
