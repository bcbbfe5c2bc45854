//! Network side of swcache.
//!
//! This crate resolves request URLs against the site origin and performs the
//! actual network fetches the worker's strategies fall back to.

pub mod fetch;

pub use fetch::{FetchConfig, HttpFetcher, Network, UrlError, is_storable_header, resolve};
