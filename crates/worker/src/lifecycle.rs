//! Install and activate phases.
//!
//! Install precaches the static and page manifests, all-or-nothing, and asks
//! the host to skip waiting. Activate deletes every partition the current
//! build does not own and asks the host to claim open pages. Both are safe
//! to repeat.

use std::fmt;

use futures::future::try_join_all;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::{CachedResponse, Destination, Error, Request};
use url::Url;

use crate::host::HostSignal;
use crate::worker::ServiceWorker;

/// Lifecycle state of one worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Install failed; no pages are controlled until a later install succeeds.
    Redundant,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InstallReport {
    pub static_entries: usize,
    pub page_entries: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ActivationReport {
    pub deleted: Vec<String>,
    pub retained: Vec<String>,
}

impl ServiceWorker {
    /// Precache both manifests, then signal `SkipWaiting`.
    ///
    /// Every manifest URL is fetched before anything is written; one transport
    /// failure or non-2xx status fails the whole install and leaves no new
    /// partition behind. A failed first install marks the worker redundant;
    /// a redundant worker may be installed again from scratch.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        let previous = {
            let mut state = self.state.write().await;
            let previous = *state;
            match previous {
                WorkerState::Installing | WorkerState::Activating => {
                    return Err(Error::InvalidState(format!("cannot install a worker that is {previous}")));
                }
                WorkerState::Parsed | WorkerState::Installed | WorkerState::Redundant => {
                    *state = WorkerState::Installing
                }
                WorkerState::Activated => {}
            }
            previous
        };
        tracing::info!("installing worker");

        match self.precache().await {
            Ok(report) => {
                if previous != WorkerState::Activated {
                    *self.state.write().await = WorkerState::Installed;
                }
                tracing::info!(
                    static_entries = report.static_entries,
                    page_entries = report.page_entries,
                    "install complete"
                );
                self.host().signal(HostSignal::SkipWaiting);
                Ok(report)
            }
            Err(e) => {
                tracing::error!(error = %e, "install failed");
                if previous != WorkerState::Activated {
                    *self.state.write().await =
                        if previous == WorkerState::Installed { WorkerState::Installed } else { WorkerState::Redundant };
                }
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<InstallReport, Error> {
        let config = self.config();
        let names = &config.partitions;

        let (statics, pages) =
            tokio::try_join!(self.fetch_manifest(&config.static_assets), self.fetch_manifest(&config.pages))?;
        let report = InstallReport { static_entries: statics.len(), page_entries: pages.len() };

        let created: Vec<&str> = {
            let mut created = Vec::new();
            for name in [names.static_assets.as_str(), names.dynamic.as_str()] {
                if !self.db().has_partition(name).await? {
                    created.push(name);
                }
            }
            created
        };

        let written = async {
            self.db().put_entries(&names.static_assets, "GET", statics).await?;
            self.db().put_entries(&names.dynamic, "GET", pages).await
        }
        .await;

        if let Err(e) = written {
            for name in created {
                if let Err(cleanup) = self.db().delete_partition(name).await {
                    tracing::warn!(partition = name, error = %cleanup, "failed to remove partially installed partition");
                }
            }
            return Err(Error::InstallFailed(e.to_string()));
        }

        Ok(report)
    }

    async fn fetch_manifest(&self, urls: &[Url]) -> Result<Vec<CachedResponse>, Error> {
        try_join_all(urls.iter().map(|url| async move {
            let request = Request::get(url.clone(), Destination::Other);
            let response = self
                .network()
                .fetch(&request)
                .await
                .map_err(|e| Error::InstallFailed(format!("{url}: {e}")))?;

            if !response.is_success() {
                return Err(Error::InstallFailed(format!("{url}: status {}", response.status)));
            }

            Ok(CachedResponse { url: url.to_string(), ..response })
        }))
        .await
    }

    /// Delete stale partitions, then signal `ClaimClients`.
    ///
    /// A partition that fails to delete is logged and skipped.
    pub async fn activate(&self) -> Result<ActivationReport, Error> {
        let previous = {
            let mut state = self.state.write().await;
            let previous = *state;
            match previous {
                WorkerState::Installed | WorkerState::Activated => *state = WorkerState::Activating,
                _ => return Err(Error::InvalidState(format!("cannot activate a worker that is {previous}"))),
            }
            previous
        };
        tracing::info!("activating worker");

        let existing = match self.db().list_partitions().await {
            Ok(existing) => existing,
            Err(e) => {
                *self.state.write().await = previous;
                return Err(e);
            }
        };

        let names = &self.config().partitions;
        let mut report = ActivationReport { deleted: Vec::new(), retained: Vec::new() };
        for name in existing {
            if names.is_expected(&name) {
                report.retained.push(name);
                continue;
            }

            tracing::info!(partition = %name, "deleting stale partition");
            match self.db().delete_partition(&name).await {
                Ok(_) => report.deleted.push(name),
                Err(e) => tracing::warn!(partition = %name, error = %e, "failed to delete stale partition, skipping"),
            }
        }

        *self.state.write().await = WorkerState::Activated;
        tracing::info!(deleted = report.deleted.len(), retained = report.retained.len(), "activation complete");
        self.host().signal(HostSignal::ClaimClients);

        Ok(report)
    }
}
