//! Worker fixtures for tool tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rmcp::model::CallToolResult;
use swcache_client::Network;
use swcache_core::{AppConfig, CacheDb, CachedResponse, Error, Request};
use swcache_worker::{ScopedHost, ServiceWorker, WorkerConfig};

/// Answers every request with 200 and the request path as body.
pub(crate) struct EchoNetwork {
    pub(crate) online: AtomicBool,
}

impl EchoNetwork {
    pub(crate) fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl Network for EchoNetwork {
    async fn fetch(&self, request: &Request) -> Result<CachedResponse, Error> {
        if !self.online.load(Ordering::SeqCst) {
            return Err(Error::Network("offline".into()));
        }
        Ok(CachedResponse::new(request.url.as_str(), 200, request.url.path()))
    }
}

pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        origin: "https://site.test".into(),
        static_assets: vec!["/index.html".into(), "/assets/site.css".into()],
        pages: vec!["/about.html".into()],
        ..Default::default()
    }
}

pub(crate) async fn worker() -> (Arc<ServiceWorker>, Arc<EchoNetwork>) {
    let db = CacheDb::open_in_memory().await.unwrap();
    let network = Arc::new(EchoNetwork { online: AtomicBool::new(true) });
    let config = WorkerConfig::from_app(&test_config()).unwrap();
    let worker = Arc::new(ServiceWorker::new(config, db, network.clone(), Arc::new(ScopedHost)));
    (worker, network)
}

pub(crate) async fn activated_worker() -> (Arc<ServiceWorker>, Arc<EchoNetwork>) {
    let (worker, network) = worker().await;
    worker.install().await.unwrap();
    worker.activate().await.unwrap();
    (worker, network)
}

/// Parse the JSON text payload of a tool result.
pub(crate) fn output_json(result: CallToolResult) -> serde_json::Value {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    let text = content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
