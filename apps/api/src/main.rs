mod admin;
mod config;
mod cv;
mod db;
mod errors;
mod models;
mod pdf;
mod public;
mod render;
mod routes;
mod state;
mod storage;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::admin::auth::AuthKeys;
use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::S3BlobStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Fails on missing required env vars
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Hoja de Vida v{}", env!("CARGO_PKG_VERSION"));

    // PostgreSQL, with migrations applied
    let db = create_pool(&config.database_url).await?;

    // Blob storage (S3 / MinIO)
    let blobs = S3BlobStore::from_config(&config).await?;

    let auth = AuthKeys::new(&config.jwt_secret, config.admin_token_ttl_secs);
    info!(
        "Admin login enabled for '{}' (token TTL {}s)",
        config.admin_username, config.admin_token_ttl_secs
    );

    let state = AppState {
        db,
        blobs: Arc::new(blobs),
        config: config.clone(),
        auth,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the admin front end has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
