//! Push, notification-click and background-sync hooks.
//!
//! These sit beside the caching core: they only translate platform events
//! into host signals.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::host::HostSignal;
use crate::worker::ServiceWorker;

/// Sync tag the page registers for deferred work.
pub const BACKGROUND_SYNC_TAG: &str = "background-sync";

const DEFAULT_PUSH_BODY: &str = "New update available";
const VIBRATE_PATTERN: [u32; 3] = [100, 50, 100];
const EXPLORE_ACTION: &str = "explore";
const CLOSE_ACTION: &str = "close";

/// A button on a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

/// Notification the host should display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    /// Milliseconds since the Unix epoch at which the push arrived.
    pub date_of_arrival: i64,
    pub actions: Vec<NotificationAction>,
}

impl ServiceWorker {
    /// Build and show the notification for a push message.
    pub fn handle_push(&self, payload: Option<&str>) -> Notification {
        let settings = &self.config().notification;
        let body = payload
            .filter(|text| !text.is_empty())
            .unwrap_or(DEFAULT_PUSH_BODY);

        let action = |action: &str, title: &str| NotificationAction {
            action: action.into(),
            title: title.into(),
            icon: settings.icon.clone(),
        };

        let notification = Notification {
            title: settings.title.clone(),
            body: body.to_string(),
            icon: settings.icon.clone(),
            badge: settings.icon.clone(),
            vibrate: VIBRATE_PATTERN.to_vec(),
            date_of_arrival: chrono::Utc::now().timestamp_millis(),
            actions: vec![action(EXPLORE_ACTION, "See more"), action(CLOSE_ACTION, "Close")],
        };

        tracing::info!(has_payload = payload.is_some(), "push received");
        self.host().signal(HostSignal::ShowNotification(notification.clone()));
        notification
    }

    /// Dismiss the clicked notification and open the site root.
    ///
    /// Every click opens the root, including one on the "close" action.
    pub fn handle_notification_click(&self, action: Option<&str>) {
        self.host().signal(HostSignal::CloseNotification);
        tracing::info!(action = action.unwrap_or(""), "notification clicked, opening site root");
        self.host().signal(HostSignal::OpenWindow { url: "/".into() });
    }

    /// Run the deferred-work routine for a fired sync tag.
    ///
    /// Returns false for tags this worker does not own. Failures inside the
    /// routine are logged, never propagated.
    pub async fn handle_sync(&self, tag: &str) -> bool {
        if tag != BACKGROUND_SYNC_TAG {
            tracing::debug!(tag, "ignoring unknown sync tag");
            return false;
        }

        tracing::info!(tag, "background sync triggered");
        match self.db().list_partitions().await {
            Ok(partitions) => tracing::info!(partitions = partitions.len(), "background sync completed"),
            Err(e) => tracing::warn!(error = %e, "background sync failed"),
        }
        true
    }
}
