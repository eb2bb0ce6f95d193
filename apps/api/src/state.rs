use std::sync::Arc;

use sqlx::PgPool;

use crate::admin::auth::AuthKeys;
use crate::config::Config;
use crate::storage::BlobStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// S3 in production; tests swap in the in-memory store.
    pub blobs: Arc<dyn BlobStore>,
    pub config: Config,
    pub auth: AuthKeys,
}
