//! In-process test doubles for the network and host.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use swcache_client::Network;
use swcache_core::{AppConfig, CacheDb, CachedResponse, Destination, Error, Request};

use crate::config::WorkerConfig;
use crate::host::{Host, HostSignal};
use crate::strategy::Dispatcher;
use crate::worker::ServiceWorker;

pub(crate) const ORIGIN: &str = "https://site.test";

/// Scripted network: serves registered URLs, 404 for everything else.
pub(crate) struct StubNetwork {
    responses: Mutex<HashMap<String, CachedResponse>>,
    online: AtomicBool,
    calls: AtomicUsize,
}

impl StubNetwork {
    pub(crate) fn new() -> Self {
        Self { responses: Mutex::new(HashMap::new()), online: AtomicBool::new(true), calls: AtomicUsize::new(0) }
    }

    pub(crate) fn serve(&self, path: &str, status: u16, body: &str) {
        let url = format!("{ORIGIN}{path}");
        let response = CachedResponse::new(url.clone(), status, body.as_bytes());
        self.responses.lock().unwrap().insert(url, response);
    }

    pub(crate) fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Network for StubNetwork {
    async fn fetch(&self, request: &Request) -> Result<CachedResponse, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.online.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("{}: offline", request.url)));
        }

        let url = request.url.to_string();
        let response = self.responses.lock().unwrap().get(&url).cloned();
        Ok(response.unwrap_or_else(|| CachedResponse::not_found(url)))
    }
}

/// Host that buffers signals until a test drains them.
#[derive(Debug, Default)]
pub(crate) struct RecordingHost {
    signals: Mutex<Vec<HostSignal>>,
}

impl RecordingHost {
    /// Take every buffered signal, oldest first.
    pub(crate) fn drain(&self) -> Vec<HostSignal> {
        std::mem::take(&mut *self.signals.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Host for RecordingHost {
    fn signal(&self, signal: HostSignal) {
        self.signals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(signal);
    }
}

pub(crate) fn app_config(static_assets: &[&str], pages: &[&str]) -> AppConfig {
    AppConfig {
        origin: ORIGIN.into(),
        static_assets: static_assets.iter().map(|s| s.to_string()).collect(),
        pages: pages.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

pub(crate) struct Harness {
    pub(crate) worker: ServiceWorker,
    pub(crate) db: CacheDb,
    pub(crate) network: Arc<StubNetwork>,
    pub(crate) host: Arc<RecordingHost>,
}

impl Harness {
    pub(crate) async fn new(app: AppConfig) -> Self {
        Self::with_db(app, CacheDb::open_in_memory().await.unwrap())
    }

    pub(crate) fn with_db(app: AppConfig, db: CacheDb) -> Self {
        let network = Arc::new(StubNetwork::new());
        let host = Arc::new(RecordingHost::default());
        let config = WorkerConfig::from_app(&app).unwrap();
        let worker = ServiceWorker::new(config, db.clone(), network.clone(), host.clone());
        Self { worker, db, network, host }
    }

    /// A worker that went through install and activate; manifests must be servable.
    pub(crate) async fn activated(app: AppConfig) -> Self {
        let harness = Self::new(app).await;
        harness.worker.install().await.unwrap();
        harness.worker.activate().await.unwrap();
        harness.host.drain();
        harness
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{ORIGIN}{path}")
    }

    pub(crate) fn request(&self, path: &str, destination: Destination) -> Request {
        Request::get(self.worker.config().resolve(path).unwrap(), destination)
    }

    pub(crate) fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(self.worker.config(), &self.db, &*self.network)
    }
}
