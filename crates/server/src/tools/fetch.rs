//! worker_fetch tool implementation.
//!
//! Runs the worker's fetch hook for one page request.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::UrlError;
use swcache_core::{Destination, Error, Request};
use swcache_worker::{Category, ResponseSource, ServiceWorker};

use super::json_result;
use crate::error::ToolError;

/// Input parameters for worker_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchParams {
    /// Request URL, absolute or relative to the site origin.
    pub url: String,

    /// HTTP method (default: GET). Only GET requests are intercepted.
    #[serde(default = "default_method")]
    pub method: String,

    /// The request's declared destination: image, document, script, style,
    /// font, or empty.
    #[serde(default)]
    pub destination: String,
}

fn default_method() -> String {
    "GET".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// Output structure for worker_fetch tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchOutput {
    /// False when the worker declined and the host should fetch normally.
    pub intercepted: bool,
    pub category: Option<Category>,
    pub source: Option<ResponseSource>,
    pub status: Option<u16>,
    pub headers: Vec<Header>,
    /// Response body, base64-encoded.
    pub body_base64: Option<String>,
    /// Body size in bytes.
    pub size: Option<u64>,
}

/// Implementation of the worker_fetch tool.
pub async fn fetch_impl(worker: &ServiceWorker, params: WorkerFetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(ToolError::InvalidInput("url cannot be empty".into()).into());
    }

    let url = match worker.config().resolve(&params.url) {
        Ok(url) => url,
        Err(UrlError::UnsupportedScheme(scheme)) => {
            tracing::debug!(scheme, "not intercepting non-http request");
            return json_result(&WorkerFetchOutput::default());
        }
        Err(e) => return Err(Error::InvalidUrl(e.to_string()).into()),
    };

    let destination: Destination = params.destination.parse().unwrap_or_default();
    let request = Request::new(&params.method, url, destination);

    let output = match worker.handle_fetch(&request).await {
        Some(served) => WorkerFetchOutput {
            intercepted: true,
            category: Some(served.category),
            source: Some(served.source),
            status: Some(served.response.status),
            size: Some(served.response.size()),
            body_base64: Some(STANDARD.encode(&served.response.body)),
            headers: served
                .response
                .headers
                .into_iter()
                .map(|(name, value)| Header { name, value })
                .collect(),
        },
        None => WorkerFetchOutput::default(),
    };

    json_result(&output)
}
