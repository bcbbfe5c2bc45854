//! Request interception and cache partition management for swcache.
//!
//! The worker classifies every intercepted request, runs the caching strategy
//! that matches its category against the partition store, and drives the
//! install/activate lifecycle plus the page-facing control messages.

pub mod classify;
pub mod config;
pub mod hooks;
pub mod host;
pub mod lifecycle;
pub mod message;
pub mod strategy;
mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use classify::{Category, classify};
pub use config::{PartitionNames, WorkerConfig};
pub use hooks::{BACKGROUND_SYNC_TAG, Notification, NotificationAction};
pub use host::{Host, HostSignal, ScopedHost};
pub use lifecycle::{ActivationReport, InstallReport, WorkerState};
pub use message::{ControlMessage, ControlReply};
pub use strategy::{Dispatcher, ResponseSource, Served, Strategy};
pub use worker::ServiceWorker;
