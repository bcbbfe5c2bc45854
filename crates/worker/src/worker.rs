use std::sync::Arc;

use swcache_client::Network;
use swcache_core::{CacheDb, Request};
use tokio::sync::RwLock;

use crate::config::WorkerConfig;
use crate::host::Host;
use crate::lifecycle::WorkerState;
use crate::strategy::{Dispatcher, Served};

/// One worker version: its build configuration, the shared partition store,
/// the network it falls back to, and the host it signals.
pub struct ServiceWorker {
    config: Arc<WorkerConfig>,
    db: CacheDb,
    network: Arc<dyn Network>,
    host: Arc<dyn Host>,
    pub(crate) state: RwLock<WorkerState>,
}

impl ServiceWorker {
    pub fn new(config: WorkerConfig, db: CacheDb, network: Arc<dyn Network>, host: Arc<dyn Host>) -> Self {
        Self { config: Arc::new(config), db, network, host, state: RwLock::new(WorkerState::Parsed) }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    pub(crate) fn network(&self) -> &dyn Network {
        &*self.network
    }

    pub(crate) fn host(&self) -> &dyn Host {
        &*self.host
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    /// Fetch hook.
    ///
    /// Returns `None` when the worker declines the request and the host should
    /// perform its default network handling: non-GET methods, non-http(s)
    /// schemes, or a worker that is not active yet.
    pub async fn handle_fetch(&self, request: &Request) -> Option<Served> {
        if !request.is_http() || !request.is_get() {
            tracing::debug!(url = %request.url, method = %request.method, "passing request through");
            return None;
        }

        let state = self.state().await;
        if state != WorkerState::Activated {
            tracing::debug!(url = %request.url, %state, "worker not active, passing request through");
            return None;
        }

        Some(Dispatcher::new(&self.config, &self.db, self.network()).dispatch(request).await)
    }
}
