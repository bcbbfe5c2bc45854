//! SQLite-backed cache partition store.
//!
//! This module provides named, versioned partitions of stored responses using
//! SQLite with async access via tokio-rusqlite. It supports:
//!
//! - Request identity keys using SHA-256 hashing
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Whole-partition deletion (entries cascade with their partition)

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod partitions;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::CachedResponse;
