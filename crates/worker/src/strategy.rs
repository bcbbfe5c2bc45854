//! Caching strategies.
//!
//! Two strategies are applied per request category:
//!
//! - **Cache-first** (images, static assets): serve a stored entry without
//!   touching the network; on a miss fetch, store 2xx responses, return the
//!   live response.
//! - **Network-first** (documents, dynamic content): fetch, store 2xx
//!   responses, return them; on failure serve the stored entry, then the
//!   category's fallback.
//!
//! A single dispatch writes at most one entry to exactly one partition and
//! never deletes anything. Partition read or write failures behave like a
//! cache miss. Concurrent misses for the same resource are not coalesced;
//! the later write replaces the earlier one.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::Network;
use swcache_core::{CacheDb, CachedResponse, Request};
use url::Url;

use crate::classify::{Category, classify};
use crate::config::WorkerConfig;

const OFFLINE_PAGE_BODY: &str = "Page not available offline";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Cache,
    Network,
    /// Placeholder, offline document, or a synthesized 404.
    Fallback,
}

/// Outcome of handling one intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub category: Category,
    pub source: ResponseSource,
    pub response: CachedResponse,
}

impl Served {
    fn new(category: Category, source: ResponseSource, response: CachedResponse) -> Self {
        Self { category, source, response }
    }
}

/// Runs the strategy matching a request's category against the partition store.
pub struct Dispatcher<'a> {
    config: &'a WorkerConfig,
    db: &'a CacheDb,
    network: &'a dyn Network,
}

impl<'a> Dispatcher<'a> {
    pub fn new(config: &'a WorkerConfig, db: &'a CacheDb, network: &'a dyn Network) -> Self {
        Self { config, db, network }
    }

    /// Classify and serve a request. Never fails: every failure path ends in a fallback.
    pub async fn dispatch(&self, request: &Request) -> Served {
        let category = classify(request.destination, &request.url);
        tracing::debug!(url = %request.url, %category, "dispatching request");

        match category.strategy() {
            Strategy::CacheFirst => self.cache_first(request, category).await,
            Strategy::NetworkFirst => self.network_first(request, category).await,
        }
    }

    async fn cache_first(&self, request: &Request, category: Category) -> Served {
        if let Some(hit) = self.lookup(request, category).await {
            tracing::debug!(url = %request.url, "cache hit");
            return Served::new(category, ResponseSource::Cache, hit);
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_success() {
                    self.store(request, category, &response).await;
                }
                Served::new(category, ResponseSource::Network, response)
            }
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "cache-first request failed");
                match category {
                    Category::Image => self.image_fallback(request).await,
                    _ => Served::new(category, ResponseSource::Fallback, CachedResponse::not_found(request.url.as_str())),
                }
            }
        }
    }

    async fn network_first(&self, request: &Request, category: Category) -> Served {
        let live = match self.network.fetch(request).await {
            Ok(response) if response.is_success() => {
                self.store(request, category, &response).await;
                return Served::new(category, ResponseSource::Network, response);
            }
            Ok(response) => {
                tracing::debug!(url = %request.url, status = response.status, "network answered with failure status");
                Some(response)
            }
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "network failed, trying cache");
                None
            }
        };

        if let Some(hit) = self.lookup(request, category).await {
            return Served::new(category, ResponseSource::Cache, hit);
        }

        match (category, live) {
            (Category::Document, _) => self.offline_document(request).await,
            (_, Some(response)) => Served::new(category, ResponseSource::Network, response),
            (_, None) => Served::new(category, ResponseSource::Fallback, CachedResponse::not_found(request.url.as_str())),
        }
    }

    async fn lookup(&self, request: &Request, category: Category) -> Option<CachedResponse> {
        let order = self.config.partitions.lookup_order(category);
        self.match_in(&order, &request.method, &request.url).await
    }

    async fn match_in(&self, partitions: &[String], method: &str, url: &Url) -> Option<CachedResponse> {
        match self.db.match_any(partitions, method, url.as_str()).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "cache lookup failed, treating as miss");
                None
            }
        }
    }

    async fn store(&self, request: &Request, category: Category, response: &CachedResponse) {
        let partition = self.config.partitions.for_category(category);
        let mut stored = response.clone();
        stored.url = request.url.to_string();

        if let Err(e) = self.db.put_entry(partition, &request.method, &stored).await {
            tracing::warn!(url = %request.url, partition, error = %e, "cache write failed");
        }
    }

    async fn image_fallback(&self, request: &Request) -> Served {
        let live = self.config.partitions.expected().map(String::from);
        let response = self
            .match_in(&live, "GET", &self.config.image_placeholder)
            .await
            .unwrap_or_else(|| CachedResponse::not_found(request.url.as_str()));
        Served::new(Category::Image, ResponseSource::Fallback, response)
    }

    async fn offline_document(&self, request: &Request) -> Served {
        let order = self.config.partitions.lookup_order(Category::StaticAsset);
        let response = match self.match_in(&order, "GET", &self.config.offline_document).await {
            Some(document) => document,
            None => CachedResponse::new(request.url.as_str(), 404, OFFLINE_PAGE_BODY)
                .with_header("Content-Type", "text/html; charset=utf-8"),
        };
        Served::new(Category::Document, ResponseSource::Fallback, response)
    }
}
