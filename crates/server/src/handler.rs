//! MCP server handler implementation.
//!
//! Every tool forwards one platform event to the shared [`ServiceWorker`].
//! Host signals the worker raises while a call runs are captured per call
//! and returned in that call's result.
use std::sync::Arc;

use crate::tools::{
    NotificationClickParams, PushParams, SyncParams, WorkerFetchParams, WorkerMessageParams, cache::list_impl,
    events::{notification_click_impl, push_impl, sync_impl},
    fetch::fetch_impl,
    lifecycle::{activate_impl, install_impl},
    message::message_impl,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use swcache_worker::ServiceWorker;

/// The main MCP server handler for swcache.
#[derive(Clone)]
pub struct SwCacheServer {
    worker: Arc<ServiceWorker>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
#[tool_router]
impl SwCacheServer {
    /// Create a handler around a worker built with a `ScopedHost`.
    pub fn new(worker: Arc<ServiceWorker>) -> Self {
        Self { worker, tool_router: Self::tool_router() }
    }

    /// Intercept a request the way a page fetch would be.
    #[tool(
        description = "Route a request through the worker. Returns the category, strategy outcome (cache, network or fallback) and the response with a base64 body."
    )]
    async fn worker_fetch(&self, params: Parameters<WorkerFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.worker, params.0).await
    }

    #[tool(description = "Run the install step: precache the static asset and page manifests into the current partitions.")]
    async fn worker_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.worker).await
    }

    #[tool(description = "Run the activate step: delete stale partitions and claim open pages.")]
    async fn worker_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.worker).await
    }

    /// Deliver a page control message.
    #[tool(description = "Post a control message (SKIP_WAITING, GET_CACHE_SIZE, CLEAR_CACHE) to the worker.")]
    async fn worker_message(&self, params: Parameters<WorkerMessageParams>) -> Result<CallToolResult, McpError> {
        message_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a push message. The worker shows a notification with the payload as its body.")]
    async fn worker_push(&self, params: Parameters<PushParams>) -> Result<CallToolResult, McpError> {
        push_impl(&self.worker, params.0).await
    }

    #[tool(description = "Report a click on a worker notification, optionally on one of its action buttons.")]
    async fn worker_notification_click(
        &self, params: Parameters<NotificationClickParams>,
    ) -> Result<CallToolResult, McpError> {
        notification_click_impl(&self.worker, params.0).await
    }

    #[tool(description = "Fire a background sync tag. Only \"background-sync\" is handled.")]
    async fn worker_sync(&self, params: Parameters<SyncParams>) -> Result<CallToolResult, McpError> {
        sync_impl(&self.worker, params.0).await
    }

    /// List cache partitions and their stored URLs.
    #[tool(description = "List every cache partition, whether it belongs to the current version, and the URLs it holds.")]
    async fn cache_list(&self) -> Result<CallToolResult, McpError> {
        list_impl(&self.worker).await
    }
}

impl ServerHandler for SwCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "swcache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::worker;

    #[tokio::test]
    async fn test_router_lists_every_tool() {
        let (worker, _) = worker().await;
        let server = SwCacheServer::new(worker);

        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "cache_list",
                "worker_activate",
                "worker_fetch",
                "worker_install",
                "worker_message",
                "worker_notification_click",
                "worker_push",
                "worker_sync",
            ]
        );
    }

    #[tokio::test]
    async fn test_server_info() {
        let (worker, _) = worker().await;
        let info = SwCacheServer::new(worker).get_info();
        assert_eq!(info.server_info.name, "swcache");
    }
}
