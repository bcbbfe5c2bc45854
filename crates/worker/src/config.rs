//! Immutable per-build worker configuration.
//!
//! Everything a handler needs to know about the current build (partition
//! names, precache manifests, fallbacks) is resolved once at startup and
//! passed down by reference.

use swcache_client::resolve;
use swcache_core::{AppConfig, Error};
use url::Url;

use crate::classify::Category;

/// The three live partition names for the current build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionNames {
    pub static_assets: String,
    pub dynamic: String,
    pub images: String,
}

impl PartitionNames {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            static_assets: config.partition_name("static"),
            dynamic: config.partition_name("dynamic"),
            images: config.partition_name("images"),
        }
    }

    /// Every name that survives activation.
    pub fn expected(&self) -> [&str; 3] {
        [self.static_assets.as_str(), self.dynamic.as_str(), self.images.as_str()]
    }

    pub fn is_expected(&self, name: &str) -> bool {
        self.expected().contains(&name)
    }

    /// The partition a category writes to.
    pub fn for_category(&self, category: Category) -> &str {
        match category {
            Category::Image => &self.images,
            Category::StaticAsset => &self.static_assets,
            Category::Document | Category::Dynamic => &self.dynamic,
        }
    }

    /// Lookup order for a category.
    ///
    /// Images are only looked up in the image partition. Every other category
    /// checks its own partition first, then the other live ones.
    pub fn lookup_order(&self, category: Category) -> Vec<String> {
        let own = self.for_category(category);
        if category == Category::Image {
            return vec![own.to_string()];
        }
        std::iter::once(own)
            .chain(self.expected().into_iter().filter(|name| *name != own))
            .map(String::from)
            .collect()
    }
}

/// Notification appearance for push messages.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub title: String,
    pub icon: String,
}

/// Resolved configuration the worker's handlers run against.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub origin: Url,
    pub partitions: PartitionNames,
    /// Precached into the static partition on install.
    pub static_assets: Vec<Url>,
    /// Precached into the dynamic partition on install.
    pub pages: Vec<Url>,
    pub offline_document: Url,
    pub image_placeholder: Url,
    pub notification: NotificationConfig,
}

impl WorkerConfig {
    /// Resolve every configured path against the origin.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` for the first path that does not resolve to
    /// an http(s) URL.
    pub fn from_app(config: &AppConfig) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.origin)))?;
        let resolve_all = |paths: &[String]| -> Result<Vec<Url>, Error> {
            paths.iter().map(|p| resolve_path(&origin, p)).collect()
        };

        Ok(Self {
            partitions: PartitionNames::from_config(config),
            static_assets: resolve_all(&config.static_assets)?,
            pages: resolve_all(&config.pages)?,
            offline_document: resolve_path(&origin, &config.offline_document)?,
            image_placeholder: resolve_path(&origin, &config.image_placeholder)?,
            notification: NotificationConfig {
                title: config.app_name.clone(),
                icon: resolve_path(&origin, &config.notification_icon)?.path().to_string(),
            },
            origin,
        })
    }

    /// Resolve a request URL as seen by the page.
    pub fn resolve(&self, input: &str) -> Result<Url, swcache_client::UrlError> {
        resolve(&self.origin, input)
    }
}

fn resolve_path(origin: &Url, path: &str) -> Result<Url, Error> {
    resolve(origin, path).map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))
}
