//! Core types and shared functionality for swcache.
//!
//! This crate provides:
//! - Cache partition store with SQLite backend
//! - The request model shared by the network and worker layers
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod request;

pub use cache::{CacheDb, CachedResponse};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use request::{Destination, Request};
