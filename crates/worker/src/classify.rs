//! Resource classification.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::Destination;
use url::Url;

use crate::strategy::Strategy;

/// File extensions served as immutable, cache-busted build assets.
const STATIC_EXTENSIONS: &[&str] = &["css", "js", "woff", "woff2"];

/// Path segment under which bundled assets live.
const ASSETS_SEGMENT: &str = "assets";

/// What kind of resource a request is after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Image,
    Document,
    StaticAsset,
    Dynamic,
}

impl Category {
    /// The caching strategy this category is served with.
    pub fn strategy(self) -> Strategy {
        match self {
            Category::Image | Category::StaticAsset => Strategy::CacheFirst,
            Category::Document | Category::Dynamic => Strategy::NetworkFirst,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Image => "image",
            Category::Document => "document",
            Category::StaticAsset => "static_asset",
            Category::Dynamic => "dynamic",
        })
    }
}

/// Classify a request. Total and deterministic.
///
/// The declared destination wins over the URL shape: an image served from
/// `/assets/` is still an image.
pub fn classify(destination: Destination, url: &Url) -> Category {
    match destination {
        Destination::Image => Category::Image,
        Destination::Document => Category::Document,
        _ if is_static_asset(url) => Category::StaticAsset,
        _ => Category::Dynamic,
    }
}

fn is_static_asset(url: &Url) -> bool {
    let mut segments = match url.path_segments() {
        Some(segments) => segments.peekable(),
        None => return false,
    };

    let mut last = "";
    while let Some(segment) = segments.next() {
        if segments.peek().is_some() && segment == ASSETS_SEGMENT {
            return true;
        }
        last = segment;
    }

    last.rsplit_once('.')
        .map(|(_, ext)| STATIC_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse("https://site.test").unwrap().join(path).unwrap()
    }

    #[test]
    fn test_image_destination_wins() {
        assert_eq!(classify(Destination::Image, &url("/assets/images/logo.jpg")), Category::Image);
        assert_eq!(classify(Destination::Image, &url("/api/avatar")), Category::Image);
    }

    #[test]
    fn test_document_destination_wins() {
        assert_eq!(classify(Destination::Document, &url("/faq.html")), Category::Document);
        assert_eq!(classify(Destination::Document, &url("/assets/legacy.js")), Category::Document);
    }

    #[test]
    fn test_assets_segment() {
        assert_eq!(classify(Destination::Other, &url("/assets/data/menu.json")), Category::StaticAsset);
        assert_eq!(classify(Destination::Style, &url("/assets/css/index.css")), Category::StaticAsset);
    }

    #[test]
    fn test_assets_must_be_a_directory() {
        assert_eq!(classify(Destination::Other, &url("/assets")), Category::Dynamic);
        assert_eq!(classify(Destination::Other, &url("/my-assets/x.json")), Category::Dynamic);
    }

    #[test]
    fn test_static_extensions() {
        assert_eq!(classify(Destination::Script, &url("/bundle.js")), Category::StaticAsset);
        assert_eq!(classify(Destination::Style, &url("/site.CSS")), Category::StaticAsset);
        assert_eq!(classify(Destination::Font, &url("/fonts/a.woff2?v=3")), Category::StaticAsset);
        assert_eq!(classify(Destination::Font, &url("/fonts/a.woff")), Category::StaticAsset);
    }

    #[test]
    fn test_json_is_not_js() {
        assert_eq!(classify(Destination::Other, &url("/manifest.json")), Category::Dynamic);
    }

    #[test]
    fn test_dynamic_fallthrough() {
        assert_eq!(classify(Destination::Other, &url("/api/orders?id=4")), Category::Dynamic);
        assert_eq!(classify(Destination::Other, &url("/")), Category::Dynamic);
    }

    #[test]
    fn test_strategy_selection() {
        assert_eq!(Category::Image.strategy(), Strategy::CacheFirst);
        assert_eq!(Category::StaticAsset.strategy(), Strategy::CacheFirst);
        assert_eq!(Category::Document.strategy(), Strategy::NetworkFirst);
        assert_eq!(Category::Dynamic.strategy(), Strategy::NetworkFirst);
    }
}
