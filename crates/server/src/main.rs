//! swcache server entry point.
//!
//! Boots the service worker against the configured SQLite store and origin,
//! then serves it as an MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use swcache_client::{FetchConfig, HttpFetcher};
use swcache_core::{AppConfig, CacheDb};
use swcache_worker::{ScopedHost, ServiceWorker, WorkerConfig};
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let worker_config = WorkerConfig::from_app(&config)?;
    let db = CacheDb::open(&config.db_path).await?;
    let network = Arc::new(HttpFetcher::new(FetchConfig::from(&config))?);

    tracing::info!(
        origin = %config.origin,
        version = %config.cache_version,
        db = %config.db_path.display(),
        "Starting swcache server on stdio transport"
    );

    let worker = Arc::new(ServiceWorker::new(worker_config, db.clone(), network, Arc::new(ScopedHost)));
    let handler = handler::SwCacheServer::new(worker);
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;
    db.close().await?;

    Ok(())
}
