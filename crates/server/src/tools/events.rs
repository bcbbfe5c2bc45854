//! worker_push, worker_notification_click and worker_sync tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_worker::{HostSignal, ScopedHost, ServiceWorker};

use super::json_result;

/// Input parameters for worker_push tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PushParams {
    /// Text payload of the push message, used as the notification body.
    #[serde(default)]
    pub payload: Option<String>,
}

/// Input parameters for worker_notification_click tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NotificationClickParams {
    /// The action button chosen, if any ("explore" or "close").
    #[serde(default)]
    pub action: Option<String>,
}

/// Input parameters for worker_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SyncParams {
    /// The sync tag that fired.
    pub tag: String,
}

/// Output shared by the event tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EventOutput {
    /// Whether the worker acted on the event.
    pub handled: bool,
    pub signals: Vec<HostSignal>,
}

/// Implementation of the worker_push tool.
pub async fn push_impl(worker: &ServiceWorker, params: PushParams) -> Result<CallToolResult, McpError> {
    let (_, signals) = ScopedHost::capture(async { worker.handle_push(params.payload.as_deref()) }).await;
    json_result(&EventOutput { handled: true, signals })
}

/// Implementation of the worker_notification_click tool.
pub async fn notification_click_impl(
    worker: &ServiceWorker, params: NotificationClickParams,
) -> Result<CallToolResult, McpError> {
    let ((), signals) =
        ScopedHost::capture(async { worker.handle_notification_click(params.action.as_deref()) }).await;
    json_result(&EventOutput { handled: true, signals })
}

/// Implementation of the worker_sync tool.
pub async fn sync_impl(worker: &ServiceWorker, params: SyncParams) -> Result<CallToolResult, McpError> {
    let (handled, signals) = ScopedHost::capture(worker.handle_sync(&params.tag)).await;
    json_result(&EventOutput { handled, signals })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{output_json, worker};

    fn push(text: &str) -> PushParams {
        PushParams { payload: Some(text.into()) }
    }

    #[tokio::test]
    async fn test_push_emits_notification() {
        let (worker, _) = worker().await;
        let out = output_json(push_impl(&worker, push("Open late today")).await.unwrap());

        let signal = &out["signals"][0];
        assert_eq!(signal["signal"], "show_notification");
        assert_eq!(signal["body"], "Open late today");
        assert_eq!(signal["title"], "swcache");
    }

    #[tokio::test]
    async fn test_concurrent_pushes_keep_their_own_signals() {
        let (worker, _) = worker().await;
        let (first, second) = tokio::join!(push_impl(&worker, push("first")), push_impl(&worker, push("second")));

        let first = output_json(first.unwrap());
        let second = output_json(second.unwrap());
        assert_eq!(first["signals"].as_array().unwrap().len(), 1);
        assert_eq!(first["signals"][0]["body"], "first");
        assert_eq!(second["signals"].as_array().unwrap().len(), 1);
        assert_eq!(second["signals"][0]["body"], "second");
    }

    #[tokio::test]
    async fn test_notification_click() {
        let (worker, _) = worker().await;
        let params = NotificationClickParams { action: Some("close".into()) };
        let out = output_json(notification_click_impl(&worker, params).await.unwrap());
        assert_eq!(out["handled"], true);
        assert_eq!(
            out["signals"],
            serde_json::json!([{ "signal": "close_notification" }, { "signal": "open_window", "url": "/" }])
        );
    }

    #[tokio::test]
    async fn test_sync_unknown_tag() {
        let (worker, _) = worker().await;
        let out = output_json(sync_impl(&worker, SyncParams { tag: "newsletter".into() }).await.unwrap());
        assert_eq!(out["handled"], false);
    }
}
