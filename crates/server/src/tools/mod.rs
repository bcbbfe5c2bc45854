//! MCP tool implementations.
//!
//! Each tool forwards one platform event to the worker and returns its
//! outcome as pretty-printed JSON, together with any host signals the event
//! produced.

pub mod cache;
pub mod events;
pub mod fetch;
pub mod lifecycle;
pub mod message;

#[cfg(test)]
pub(crate) mod testing;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::error::ToolError;

pub use events::{NotificationClickParams, PushParams, SyncParams};
pub use fetch::WorkerFetchParams;
pub use message::WorkerMessageParams;

/// Wrap a serializable output as a successful tool result.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| ToolError::Output(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
