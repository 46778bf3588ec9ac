//! WebFinger server
//!
//! Answers WebFinger (RFC 7033) and host-meta (RFC 6415) queries for the
//! actors and notes of a single site, in JRD or XRD depending on the
//! client's `Accept` header.

pub mod config;
pub mod error;
pub mod resolver;
pub mod resource;
pub mod server;
pub mod store;
pub mod types;

pub use config::Config;
pub use error::{AppError, ServerError, StoreError};
pub use resolver::{LocalResourceResolver, ResolveError};
pub use resource::{ActorResource, NoteResource, ResourceHook, WebfingerResource};
pub use server::{create_router, start_server, AppState, SharedState};
pub use store::{MemoryStore, ResourceStore};
