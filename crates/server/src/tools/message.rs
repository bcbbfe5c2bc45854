//! worker_message tool implementation.
//!
//! Delivers a page control message (SKIP_WAITING, GET_CACHE_SIZE, CLEAR_CACHE).

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_worker::{ControlMessage, ControlReply, HostSignal, ScopedHost, ServiceWorker};

use super::json_result;

/// Input parameters for worker_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerMessageParams {
    /// Message discriminator. Unrecognised values are ignored.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Output structure for worker_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerMessageOutput {
    /// Reply posted on the message's reply channel, if the message has one.
    pub reply: Option<ControlReply>,
    pub signals: Vec<HostSignal>,
}

/// Implementation of the worker_message tool.
pub async fn message_impl(
    worker: &ServiceWorker, params: WorkerMessageParams,
) -> Result<CallToolResult, McpError> {
    let (reply, signals) = ScopedHost::capture(worker.handle_message(ControlMessage::parse(&params.kind))).await;
    json_result(&WorkerMessageOutput { reply: reply?, signals })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{activated_worker, output_json};

    fn msg(kind: &str) -> WorkerMessageParams {
        WorkerMessageParams { kind: kind.into() }
    }

    #[test]
    fn test_params_use_type_field() {
        let params: WorkerMessageParams = serde_json::from_str(r#"{"type":"CLEAR_CACHE"}"#).unwrap();
        assert_eq!(params.kind, "CLEAR_CACHE");
    }

    #[tokio::test]
    async fn test_cache_size_then_clear() {
        let (worker, _) = activated_worker().await;

        let size = output_json(message_impl(&worker, msg("GET_CACHE_SIZE")).await.unwrap());
        let expected = ("/index.html".len() + "/assets/site.css".len() + "/about.html".len()) as u64;
        assert_eq!(size["reply"], serde_json::json!({ "size": expected }));

        let cleared = output_json(message_impl(&worker, msg("CLEAR_CACHE")).await.unwrap());
        assert_eq!(cleared["reply"], serde_json::json!({ "success": true }));

        let size = output_json(message_impl(&worker, msg("GET_CACHE_SIZE")).await.unwrap());
        assert_eq!(size["reply"], serde_json::json!({ "size": 0 }));
    }

    #[tokio::test]
    async fn test_skip_waiting_and_unknown() {
        let (worker, _) = activated_worker().await;

        let out = output_json(message_impl(&worker, msg("SKIP_WAITING")).await.unwrap());
        assert!(out["reply"].is_null());
        assert_eq!(out["signals"], serde_json::json!([{ "signal": "skip_waiting" }]));

        let out = output_json(message_impl(&worker, msg("REFRESH_EVERYTHING")).await.unwrap());
        assert!(out["reply"].is_null());
        assert_eq!(out["signals"], serde_json::json!([]));
    }
}
