//! Page-to-worker control messages.
//!
//! Each message carries a `type` discriminator. Messages are independent of
//! each other; unknown types are logged and ignored so older workers keep
//! working with newer pages.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::Error;

use crate::host::HostSignal;
use crate::worker::ServiceWorker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlMessage {
    SkipWaiting,
    GetCacheSize,
    ClearCache,
    Unknown(String),
}

impl ControlMessage {
    /// Map a `type` discriminator to a message. Matching is exact.
    pub fn parse(kind: &str) -> Self {
        match kind {
            "SKIP_WAITING" => ControlMessage::SkipWaiting,
            "GET_CACHE_SIZE" => ControlMessage::GetCacheSize,
            "CLEAR_CACHE" => ControlMessage::ClearCache,
            other => ControlMessage::Unknown(other.to_string()),
        }
    }
}

/// Reply posted back on the message's reply channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ControlReply {
    CacheSize { size: u64 },
    Cleared { success: bool },
}

impl ServiceWorker {
    /// Handle one control message. `Ok(None)` means the message has no reply.
    pub async fn handle_message(&self, message: ControlMessage) -> Result<Option<ControlReply>, Error> {
        match message {
            ControlMessage::SkipWaiting => {
                self.host().signal(HostSignal::SkipWaiting);
                Ok(None)
            }
            ControlMessage::GetCacheSize => {
                let size = self.db().total_size().await?;
                tracing::debug!(size, "reporting cache size");
                Ok(Some(ControlReply::CacheSize { size }))
            }
            ControlMessage::ClearCache => {
                let deleted = self.db().delete_all_partitions().await?;
                tracing::info!(deleted, "cleared all partitions");
                Ok(Some(ControlReply::Cleared { success: true }))
            }
            ControlMessage::Unknown(kind) => {
                tracing::warn!(kind = %kind, "unknown control message");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::ResponseSource;
    use crate::testing::{Harness, app_config};
    use swcache_core::{CachedResponse, Destination};

    #[test]
    fn test_parse() {
        assert_eq!(ControlMessage::parse("SKIP_WAITING"), ControlMessage::SkipWaiting);
        assert_eq!(ControlMessage::parse("GET_CACHE_SIZE"), ControlMessage::GetCacheSize);
        assert_eq!(ControlMessage::parse("CLEAR_CACHE"), ControlMessage::ClearCache);
        assert_eq!(ControlMessage::parse("clear_cache"), ControlMessage::Unknown("clear_cache".into()));
    }

    #[test]
    fn test_reply_shapes() {
        let size = serde_json::to_value(ControlReply::CacheSize { size: 42 }).unwrap();
        assert_eq!(size, serde_json::json!({ "size": 42 }));

        let cleared = serde_json::to_value(ControlReply::Cleared { success: true }).unwrap();
        assert_eq!(cleared, serde_json::json!({ "success": true }));
    }

    #[tokio::test]
    async fn test_skip_waiting_signals_host() {
        let h = Harness::new(app_config(&[], &[])).await;
        let reply = h.worker.handle_message(ControlMessage::SkipWaiting).await.unwrap();
        assert!(reply.is_none());
        assert_eq!(h.host.drain(), vec![HostSignal::SkipWaiting]);
    }

    #[tokio::test]
    async fn test_cache_size_grows_by_entry_size() {
        let h = Harness::new(app_config(&[], &[])).await;
        let before = h.worker.handle_message(ControlMessage::GetCacheSize).await.unwrap();
        assert_eq!(before, Some(ControlReply::CacheSize { size: 0 }));

        let entry = CachedResponse::new(h.url("/assets/a.css"), 200, vec![b'x'; 1234]);
        h.db.put_entry("anything-v1", "GET", &entry).await.unwrap();

        let after = h.worker.handle_message(ControlMessage::GetCacheSize).await.unwrap();
        assert_eq!(after, Some(ControlReply::CacheSize { size: 1234 }));
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        let h = Harness::activated(app_config(&[], &[])).await;
        h.network.serve("/assets/css/site.css", 200, "body{}");
        let request = h.request("/assets/css/site.css", Destination::Style);

        h.worker.handle_fetch(&request).await.unwrap();
        h.worker.handle_fetch(&request).await.unwrap();
        assert_eq!(h.network.calls(), 1);

        let reply = h.worker.handle_message(ControlMessage::ClearCache).await.unwrap();
        assert_eq!(reply, Some(ControlReply::Cleared { success: true }));
        assert!(h.db.list_partitions().await.unwrap().is_empty());

        let served = h.worker.handle_fetch(&request).await.unwrap();
        assert_eq!(served.source, ResponseSource::Network);
        assert_eq!(h.network.calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_message_is_noop() {
        let h = Harness::new(app_config(&[], &[])).await;
        let reply = h
            .worker
            .handle_message(ControlMessage::Unknown("PING".into()))
            .await
            .unwrap();
        assert!(reply.is_none());
        assert!(h.host.drain().is_empty());
    }
}
