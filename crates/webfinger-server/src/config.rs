use std::env;
use std::path::PathBuf;

/// Server configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Domain local `acct:` identifiers live under
    pub site_domain: String,
    /// Base URL of the site, without a trailing slash
    pub site_url: String,
    /// Add an `http:` twin after every `https:` alias
    pub legacy_http_aliases: bool,
    /// Send `Access-Control-Allow-Origin: *` on discovery routes
    pub discovery_cors: bool,
    /// Nickname of the actor described by `/main/ownerxrd`
    pub site_owner: Option<String>,
    /// Identifier that replaces the owner's subject in `/main/ownerxrd`
    pub owner_alias: Option<String>,
    /// JSON file with the actors and notes to serve
    pub seed_path: Option<PathBuf>,
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Parse configuration from an arbitrary variable source
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = var("PORT").and_then(|p| p.parse().ok()).unwrap_or(3005);

        let site_domain = var("SITE_DOMAIN")
            .map(|d| d.trim().to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| "localhost".to_string());

        let site_url = var("SITE_URL")
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| format!("https://{}", site_domain));

        let legacy_http_aliases = var("LEGACY_HTTP_ALIASES")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        let discovery_cors = var("DISCOVERY_CORS")
            .map(|v| parse_flag(&v))
            .unwrap_or(true);

        let site_owner = var("SITE_OWNER").filter(|v| !v.trim().is_empty());
        let owner_alias = var("WEBFINGER_OWNER").filter(|v| !v.trim().is_empty());
        let seed_path = var("DIRECTORY_SEED").map(PathBuf::from);

        Self {
            port,
            site_domain,
            site_url,
            legacy_http_aliases,
            discovery_cors,
            site_owner,
            owner_alias,
            seed_path,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
