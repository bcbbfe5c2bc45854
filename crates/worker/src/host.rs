//! Effects the worker asks its host platform to carry out.

use std::cell::RefCell;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::hooks::Notification;

/// A request from the worker to the embedding platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum HostSignal {
    /// Promote this worker version to active without waiting for old clients to close.
    SkipWaiting,
    /// Take control of every open page without a reload.
    ClaimClients,
    ShowNotification(Notification),
    /// Dismiss the notification the user interacted with.
    CloseNotification,
    OpenWindow { url: String },
}

/// Receiver of [`HostSignal`]s.
pub trait Host: Send + Sync {
    fn signal(&self, signal: HostSignal);
}

tokio::task_local! {
    static SIGNALS: RefCell<Vec<HostSignal>>;
}

/// Host that hands every signal to the capture scope it was raised in.
///
/// Concurrent scopes never see each other's signals. A signal raised outside
/// any scope is logged and dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScopedHost;

impl ScopedHost {
    /// Run `fut`, returning its output together with every signal raised while it ran.
    pub async fn capture<F: Future>(fut: F) -> (F::Output, Vec<HostSignal>) {
        SIGNALS
            .scope(RefCell::new(Vec::new()), async move {
                let output = fut.await;
                let signals = SIGNALS.with(RefCell::take);
                (output, signals)
            })
            .await
    }
}

impl Host for ScopedHost {
    fn signal(&self, signal: HostSignal) {
        tracing::debug!(?signal, "host signal");
        if SIGNALS.try_with(|signals| signals.borrow_mut().push(signal)).is_err() {
            tracing::warn!("host signal raised outside a capture scope, dropping");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capture_collects_in_order() {
        let host = ScopedHost;
        let (value, signals) = ScopedHost::capture(async {
            host.signal(HostSignal::SkipWaiting);
            host.signal(HostSignal::ClaimClients);
            7
        })
        .await;

        assert_eq!(value, 7);
        assert_eq!(signals, vec![HostSignal::SkipWaiting, HostSignal::ClaimClients]);
    }

    #[tokio::test]
    async fn test_concurrent_captures_are_isolated() {
        let host = ScopedHost;
        let first = ScopedHost::capture(async {
            host.signal(HostSignal::SkipWaiting);
            tokio::task::yield_now().await;
            host.signal(HostSignal::ClaimClients);
        });
        let second = ScopedHost::capture(async {
            tokio::task::yield_now().await;
            host.signal(HostSignal::CloseNotification);
        });

        let ((_, a), (_, b)) = tokio::join!(first, second);
        assert_eq!(a, vec![HostSignal::SkipWaiting, HostSignal::ClaimClients]);
        assert_eq!(b, vec![HostSignal::CloseNotification]);
    }

    #[tokio::test]
    async fn test_signal_outside_scope_is_dropped() {
        ScopedHost.signal(HostSignal::SkipWaiting);
        let ((), signals) = ScopedHost::capture(async {}).await;
        assert!(signals.is_empty());
    }

    #[test]
    fn test_signal_serialization() {
        let json = serde_json::to_value(HostSignal::OpenWindow { url: "/".into() }).unwrap();
        assert_eq!(json, serde_json::json!({ "signal": "open_window", "url": "/" }));

        let json = serde_json::to_value(HostSignal::SkipWaiting).unwrap();
        assert_eq!(json, serde_json::json!({ "signal": "skip_waiting" }));
    }
}
