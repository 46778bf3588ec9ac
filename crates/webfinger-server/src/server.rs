//! HTTP server for the discovery endpoints
//!
//! Provides /.well-known/host-meta, /.well-known/webfinger, /main/ownerxrd
//! and /health.

use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderMap, Method},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};
use xrd::{Format, ResourceDescriptor};

use crate::config::Config;
use crate::error::AppError;
use crate::resolver::{canonical_nickname, LocalResourceResolver};
use crate::resource;
use crate::types::HealthResponse;

/// Shared state for the HTTP server
pub struct AppState {
    pub config: Config,
    pub resolver: LocalResourceResolver,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Config, resolver: LocalResourceResolver) -> Self {
        Self {
            config,
            resolver,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<AppState>;

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    let discovery = Router::new()
        .route("/.well-known/host-meta", get(host_meta))
        .route("/.well-known/host-meta.json", get(host_meta_json))
        .route("/.well-known/host-meta.xml", get(host_meta_xml))
        .route("/.well-known/webfinger", get(webfinger))
        .route("/.well-known/webfinger.json", get(webfinger_json))
        .route("/.well-known/webfinger.xml", get(webfinger_xml))
        .route("/main/ownerxrd", get(owner_xrd));

    let discovery = if state.config.discovery_cors {
        discovery.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET]),
        )
    } else {
        discovery
    };

    Router::new()
        .route("/health", get(health))
        .merge(discovery)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: SharedState, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
    })
}

fn accept(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::ACCEPT).and_then(|v| v.to_str().ok())
}

fn respond(xrd: &ResourceDescriptor, format: Format) -> Result<Response, AppError> {
    let body = xrd.render(format)?;
    Ok(([(header::CONTENT_TYPE, format.content_type())], body).into_response())
}

async fn host_meta(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let format = Format::negotiate(accept(&headers), Format::Xml);
    respond(&resource::host_meta(&state.config.site_url), format)
}

async fn host_meta_json(State(state): State<SharedState>) -> Result<Response, AppError> {
    respond(&resource::host_meta(&state.config.site_url), Format::Json)
}

async fn host_meta_xml(State(state): State<SharedState>) -> Result<Response, AppError> {
    respond(&resource::host_meta(&state.config.site_url), Format::Xml)
}

async fn webfinger(
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let format = Format::negotiate(accept(&headers), Format::Json);
    serve_webfinger(&state, query.as_deref(), format).await
}

async fn webfinger_json(
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    serve_webfinger(&state, query.as_deref(), Format::Json).await
}

async fn webfinger_xml(
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    serve_webfinger(&state, query.as_deref(), Format::Xml).await
}

/// `resource` and any number of `rel` query parameters
#[derive(Debug, Default)]
struct WebfingerQuery {
    resource: Option<String>,
    rels: Vec<String>,
}

impl WebfingerQuery {
    fn parse(query: Option<&str>) -> Self {
        let mut parsed = Self::default();
        let pairs = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes());
        for (key, value) in pairs {
            match key.as_ref() {
                "resource" if parsed.resource.is_none() => {
                    parsed.resource = Some(value.into_owned());
                }
                "rel" => parsed.rels.push(value.into_owned()),
                _ => {}
            }
        }
        parsed
    }
}

async fn serve_webfinger(
    state: &AppState,
    query: Option<&str>,
    format: Format,
) -> Result<Response, AppError> {
    let query = WebfingerQuery::parse(query);
    let resource = query
        .resource
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing resource parameter".to_string()))?;

    let resolved = state.resolver.resolve(&resource).await.inspect_err(|e| {
        debug!(resource = %resource, error = %e, "WebFinger resolution failed");
    })?;

    let mut xrd = state.resolver.describe(&resolved);
    if !query.rels.is_empty() {
        xrd.retain_rels(&query.rels);
    }
    respond(&xrd, format)
}

/// Descriptor of the site owner.
///
/// The owner's profile URL (or the configured alias override) becomes the
/// subject and the usual subject moves to the aliases.
async fn owner_xrd(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let nickname = state
        .config
        .site_owner
        .as_deref()
        .and_then(canonical_nickname)
        .ok_or_else(|| AppError::NotFound("No site owner configured".to_string()))?;

    let actor = state
        .resolver
        .store()
        .local_actor_by_nickname(&nickname)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Unknown site owner: {}", nickname)))?;

    let subject = state
        .config
        .owner_alias
        .clone()
        .unwrap_or_else(|| actor.profile_url.clone());
    let resource = state.resolver.actor_resource(actor);
    let mut xrd = state.resolver.describe(&resource);
    xrd.set_subject(subject);
    xrd.add_alias(resource.subject());

    let format = Format::negotiate(accept(&headers), Format::Xml);
    respond(&xrd, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::{Actor, Note, Seed};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::collections::HashMap;
    use tower::ServiceExt;

    fn seed() -> Seed {
        Seed {
            actors: vec![Actor {
                id: 1,
                nickname: "alice".to_string(),
                uri: "https://example.org/users/alice".to_string(),
                profile_url: "https://example.org/alice".to_string(),
                local: true,
                avatar_url: None,
                name: Some("Alice".to_string()),
            }],
            notes: vec![Note {
                id: 2,
                uri: "https://example.org/notes/2".to_string(),
                url: None,
                author_profile_url: None,
            }],
        }
    }

    fn create_test_router(vars: &[(&str, &str)]) -> Router {
        let mut vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        vars.entry("SITE_DOMAIN".to_string())
            .or_insert_with(|| "example.org".to_string());
        let config = Config::from_vars(|key| vars.get(key).cloned());

        let store = Arc::new(MemoryStore::from_seed(seed()));
        let resolver = LocalResourceResolver::new(store, &config);
        create_router(Arc::new(AppState::new(config, resolver)))
    }

    async fn get(router: Router, uri: &str, accept: Option<&str>) -> Response {
        let mut request = Request::builder()
            .uri(uri)
            .header(header::ORIGIN, "https://client.example");
        if let Some(accept) = accept {
            request = request.header(header::ACCEPT, accept);
        }
        router
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    fn content_type(response: &Response) -> &str {
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    async fn body_string(response: Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        serde_json::from_str(&body_string(response).await).unwrap()
    }

    const ALICE: &str = "/.well-known/webfinger?resource=acct%3Aalice%40example.org";

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = get(create_test_router(&[]), "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert!(json["uptime_secs"].as_u64().is_some());
    }

    #[tokio::test]
    async fn test_webfinger_defaults_to_jrd() {
        for accept in [None, Some("text/html"), Some("*/*")] {
            let response = get(create_test_router(&[]), ALICE, accept).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(content_type(&response), "application/jrd+json");

            let json = body_json(response).await;
            assert_eq!(json["subject"], "acct:alice@example.org");
            assert_eq!(json["aliases"][0], "https://example.org/alice");
        }
    }

    #[tokio::test]
    async fn test_webfinger_negotiates_xrd() {
        let response = get(
            create_test_router(&[]),
            ALICE,
            Some("application/jrd+json;q=0.5, application/xrd+xml"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(content_type(&response), "application/xrd+xml");
        let body = body_string(response).await;
        assert!(body.contains("<Subject>acct:alice@example.org</Subject>"));
    }

    #[tokio::test]
    async fn test_suffix_forces_format() {
        let uri = "/.well-known/webfinger.xml?resource=acct%3Aalice%40example.org";
        let response = get(create_test_router(&[]), uri, Some("application/jrd+json")).await;
        assert_eq!(content_type(&response), "application/xrd+xml");

        let uri = "/.well-known/webfinger.json?resource=acct%3Aalice%40example.org";
        let response = get(create_test_router(&[]), uri, Some("application/xrd+xml")).await;
        assert_eq!(content_type(&response), "application/jrd+json");
    }

    #[tokio::test]
    async fn test_webfinger_rel_filter() {
        let uri = format!("{}&rel=self&rel=http%3A%2F%2Fgmpg.org%2Fxfn%2F11", ALICE);
        let json = body_json(get(create_test_router(&[]), &uri, None).await).await;
        let rels: Vec<_> = json["links"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["rel"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(rels, vec!["http://gmpg.org/xfn/11", "self"]);
    }

    #[tokio::test]
    async fn test_missing_resource_is_bad_request() {
        for uri in ["/.well-known/webfinger", "/.well-known/webfinger?resource="] {
            let response = get(create_test_router(&[]), uri, None).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let json = body_json(response).await;
            assert!(json["error"].as_str().is_some());
        }
    }

    #[tokio::test]
    async fn test_unknown_and_remote_accounts_are_not_found() {
        for resource in ["acct%3Anobody%40example.org", "acct%3Aalice%40other.example"] {
            let uri = format!("/.well-known/webfinger?resource={}", resource);
            let response = get(create_test_router(&[]), &uri, None).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }

        let response = get(
            create_test_router(&[]),
            "/.well-known/webfinger?resource=acct%3Aalice",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_note_resource() {
        let uri = "/.well-known/webfinger?resource=https%3A%2F%2Fexample.org%2Fnotes%2F2";
        let json = body_json(get(create_test_router(&[]), uri, None).await).await;
        assert_eq!(json["subject"], "https://example.org/notes/2");
        assert_eq!(json["links"][0]["rel"], "self");
    }

    #[tokio::test]
    async fn test_legacy_http_aliases() {
        let router = create_test_router(&[("LEGACY_HTTP_ALIASES", "true")]);
        let json = body_json(get(router, ALICE, None).await).await;
        assert_eq!(json["subject"], "acct:alice@example.org");
        assert_eq!(json["aliases"][1], "http://example.org/alice");
    }

    #[tokio::test]
    async fn test_cors_header() {
        let response = get(create_test_router(&[]), ALICE, None).await;
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );

        let response = get(create_test_router(&[("DISCOVERY_CORS", "false")]), ALICE, None).await;
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_host_meta() {
        let response = get(create_test_router(&[]), "/.well-known/host-meta", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(content_type(&response), "application/xrd+xml");
        let body = body_string(response).await;
        assert!(body.contains(r#"rel="lrdd""#));
        assert!(body.contains("https://example.org/.well-known/webfinger?resource={uri}"));

        let response = get(
            create_test_router(&[]),
            "/.well-known/host-meta",
            Some("application/json"),
        )
        .await;
        assert_eq!(content_type(&response), "application/jrd+json");

        let response = get(create_test_router(&[]), "/.well-known/host-meta.json", None).await;
        let json = body_json(response).await;
        assert!(json.get("subject").is_none());
        assert_eq!(json["links"][0]["type"], "application/jrd+json");
    }

    #[tokio::test]
    async fn test_owner_xrd() {
        let router = create_test_router(&[("SITE_OWNER", "Alice")]);
        let response = get(router, "/main/ownerxrd", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(content_type(&response), "application/xrd+xml");
        let body = body_string(response).await;
        assert!(body.contains("<Subject>https://example.org/alice</Subject>"));
        assert!(body.contains("<Alias>acct:alice@example.org</Alias>"));

        let router = create_test_router(&[
            ("SITE_OWNER", "alice"),
            ("WEBFINGER_OWNER", "https://owner.example/me"),
        ]);
        let response = get(router, "/main/ownerxrd", Some("application/jrd+json")).await;
        let json = body_json(response).await;
        assert_eq!(json["subject"], "https://owner.example/me");
        assert!(json["aliases"]
            .as_array()
            .unwrap()
            .iter()
            .any(|a| a == "acct:alice@example.org"));
    }

    #[tokio::test]
    async fn test_owner_xrd_without_owner() {
        let response = get(create_test_router(&[]), "/main/ownerxrd", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_query_parsing() {
        let query = WebfingerQuery::parse(Some(
            "resource=acct%3Aa%40b&rel=self&resource=ignored&rel=x+y",
        ));
        assert_eq!(query.resource.as_deref(), Some("acct:a@b"));
        assert_eq!(query.rels, vec!["self", "x y"]);
        assert!(WebfingerQuery::parse(None).resource.is_none());
    }
}
