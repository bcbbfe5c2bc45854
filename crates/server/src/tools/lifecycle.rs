//! worker_install and worker_activate tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_worker::{HostSignal, ScopedHost, ServiceWorker, WorkerState};

use super::json_result;

/// Output structure for worker_install tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InstallOutput {
    /// Entries precached into the static partition.
    pub static_entries: usize,
    /// Entries precached into the dynamic partition.
    pub page_entries: usize,
    pub state: WorkerState,
    pub signals: Vec<HostSignal>,
}

/// Output structure for worker_activate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ActivateOutput {
    /// Stale partitions removed.
    pub deleted: Vec<String>,
    /// Live partitions kept.
    pub retained: Vec<String>,
    pub state: WorkerState,
    pub signals: Vec<HostSignal>,
}

/// Implementation of the worker_install tool.
pub async fn install_impl(worker: &ServiceWorker) -> Result<CallToolResult, McpError> {
    let (report, signals) = ScopedHost::capture(worker.install()).await;
    let report = report?;
    json_result(&InstallOutput {
        static_entries: report.static_entries,
        page_entries: report.page_entries,
        state: worker.state().await,
        signals,
    })
}

/// Implementation of the worker_activate tool.
pub async fn activate_impl(worker: &ServiceWorker) -> Result<CallToolResult, McpError> {
    let (report, signals) = ScopedHost::capture(worker.activate()).await;
    let report = report?;
    json_result(&ActivateOutput {
        deleted: report.deleted,
        retained: report.retained,
        state: worker.state().await,
        signals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{output_json, worker};

    #[tokio::test]
    async fn test_install_then_activate() {
        let (worker, _) = worker().await;

        let install = output_json(install_impl(&worker).await.unwrap());
        assert_eq!(install["static_entries"], 2);
        assert_eq!(install["page_entries"], 1);
        assert_eq!(install["state"], "installed");
        assert_eq!(install["signals"], serde_json::json!([{ "signal": "skip_waiting" }]));

        worker.db().open_partition("swcache-static-v0.1.0").await.unwrap();
        let activate = output_json(activate_impl(&worker).await.unwrap());
        assert_eq!(activate["deleted"], serde_json::json!(["swcache-static-v0.1.0"]));
        assert_eq!(activate["state"], "activated");
        assert_eq!(activate["signals"], serde_json::json!([{ "signal": "claim_clients" }]));
    }

    #[tokio::test]
    async fn test_install_offline_fails() {
        let (worker, network) = worker().await;
        network.set_online(false);

        let err = install_impl(&worker).await.unwrap_err();
        assert_eq!(err.code.0, -32009);
    }

    #[tokio::test]
    async fn test_activate_without_install_fails() {
        let (worker, _) = worker().await;
        let err = activate_impl(&worker).await.unwrap_err();
        assert_eq!(err.code.0, -32010);
    }
}
