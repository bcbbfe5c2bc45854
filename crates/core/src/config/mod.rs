//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SWCACHE_*)
//! 2. TOML config file (if SWCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SWCACHE_*)
/// 2. TOML config file (if SWCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via SWCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for network requests.
    ///
    /// Set via SWCACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via SWCACHE_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Client-level network timeout in milliseconds.
    ///
    /// Set via SWCACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Site origin that relative request and manifest paths resolve against.
    ///
    /// Set via SWCACHE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Leading component of every partition name.
    ///
    /// Set via SWCACHE_CACHE_PREFIX environment variable.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Build version appended to every partition name.
    ///
    /// Set via SWCACHE_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Build-time assets precached into the static partition on install.
    ///
    /// Set via SWCACHE_STATIC_ASSETS environment variable (TOML array syntax).
    #[serde(default = "default_static_assets")]
    pub static_assets: Vec<String>,

    /// Pages precached into the dynamic partition on install.
    ///
    /// Set via SWCACHE_PAGES environment variable (TOML array syntax).
    #[serde(default = "default_pages")]
    pub pages: Vec<String>,

    /// Document served to navigations when both network and cache miss.
    ///
    /// Set via SWCACHE_OFFLINE_DOCUMENT environment variable.
    #[serde(default = "default_offline_document")]
    pub offline_document: String,

    /// Image served when an image request cannot be satisfied.
    ///
    /// Set via SWCACHE_IMAGE_PLACEHOLDER environment variable.
    #[serde(default = "default_image_placeholder")]
    pub image_placeholder: String,

    /// Notification title for push messages.
    ///
    /// Set via SWCACHE_APP_NAME environment variable.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Icon and badge used on push notifications.
    ///
    /// Set via SWCACHE_NOTIFICATION_ICON environment variable.
    #[serde(default = "default_notification_icon")]
    pub notification_icon: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./swcache.sqlite")
}

fn default_user_agent() -> String {
    "swcache/0.1".into()
}

fn default_max_bytes() -> usize {
    10_485_760 // 10MB
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_cache_prefix() -> String {
    "swcache".into()
}

fn default_cache_version() -> String {
    "v1.0.0".into()
}

fn default_static_assets() -> Vec<String> {
    [
        "/",
        "/index.html",
        "/manifest.json",
        "/assets/css/index.css",
        "/assets/css/accessibility.css",
        "/assets/js/lazy-loading.js",
        "/assets/js/ux-enhancements.js",
        "/assets/images/logo.jpg",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_pages() -> Vec<String> {
    ["/services.html", "/about.html", "/contact.html", "/faq.html"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_offline_document() -> String {
    "/index.html".into()
}

fn default_image_placeholder() -> String {
    "/assets/images/placeholder.png".into()
}

fn default_app_name() -> String {
    "swcache".into()
}

fn default_notification_icon() -> String {
    "/assets/images/logo.jpg".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            origin: default_origin(),
            cache_prefix: default_cache_prefix(),
            cache_version: default_cache_version(),
            static_assets: default_static_assets(),
            pages: default_pages(),
            offline_document: default_offline_document(),
            image_placeholder: default_image_placeholder(),
            app_name: default_app_name(),
            notification_icon: default_notification_icon(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Full partition name for one partition kind, e.g. `swcache-static-v1.0.0`.
    pub fn partition_name(&self, kind: &str) -> String {
        format!("{}-{}-{}", self.cache_prefix, kind, self.cache_version)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SWCACHE_`
    /// 2. TOML file from `SWCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SWCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SWCACHE_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
