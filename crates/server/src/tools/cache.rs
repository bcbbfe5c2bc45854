//! cache_list tool implementation.
//!
//! Lists every partition with the URLs stored in it.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_worker::ServiceWorker;

use super::json_result;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PartitionListing {
    pub name: String,
    /// Whether the partition belongs to the current build.
    pub live: bool,
    pub urls: Vec<String>,
}

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListOutput {
    pub partitions: Vec<PartitionListing>,
    /// Total stored body bytes across all partitions.
    pub size: u64,
}

/// Implementation of the cache_list tool.
pub async fn list_impl(worker: &ServiceWorker) -> Result<CallToolResult, McpError> {
    let db = worker.db();
    let names = &worker.config().partitions;

    let mut partitions = Vec::new();
    for name in db.list_partitions().await? {
        let urls = db.entry_urls(&name).await?;
        partitions.push(PartitionListing { live: names.is_expected(&name), name, urls });
    }

    json_result(&CacheListOutput { partitions, size: db.total_size().await? })
}
