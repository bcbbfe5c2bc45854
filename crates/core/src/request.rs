//! Intercepted request model.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

/// The platform's declared destination for a request.
///
/// Parsed case-insensitively; anything unrecognised (including the empty
/// string browsers send for `fetch()` calls) becomes [`Destination::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Image,
    Document,
    Script,
    Style,
    Font,
    #[default]
    #[serde(other)]
    Other,
}

impl FromStr for Destination {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "image" => Destination::Image,
            "document" => Destination::Document,
            "script" => Destination::Script,
            "style" => Destination::Style,
            "font" => Destination::Font,
            _ => Destination::Other,
        })
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Destination::Image => "image",
            Destination::Document => "document",
            Destination::Script => "script",
            Destination::Style => "style",
            Destination::Font => "font",
            Destination::Other => "other",
        };
        f.write_str(s)
    }
}

/// A request seen by the worker's fetch hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Upper-case HTTP method.
    pub method: String,
    /// Absolute, fragment-less URL.
    pub url: Url,
    pub destination: Destination,
}

impl Request {
    /// Build a request with an explicit method; the method is upper-cased.
    pub fn new(method: &str, url: Url, destination: Destination) -> Self {
        Self { method: method.trim().to_ascii_uppercase(), url, destination }
    }

    /// Shorthand for a `GET` request.
    pub fn get(url: Url, destination: Destination) -> Self {
        Self::new("GET", url, destination)
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Whether the URL uses a scheme the worker is allowed to intercept.
    pub fn is_http(&self) -> bool {
        matches!(self.url.scheme(), "http" | "https")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_parse_case_insensitive() {
        assert_eq!("IMAGE".parse::<Destination>().unwrap(), Destination::Image);
        assert_eq!(" document ".parse::<Destination>().unwrap(), Destination::Document);
    }

    #[test]
    fn test_destination_unknown_is_other() {
        assert_eq!("".parse::<Destination>().unwrap(), Destination::Other);
        assert_eq!("audioworklet".parse::<Destination>().unwrap(), Destination::Other);
    }

    #[test]
    fn test_destination_serde() {
        let d: Destination = serde_json::from_str("\"style\"").unwrap();
        assert_eq!(d, Destination::Style);
        let d: Destination = serde_json::from_str("\"manifest\"").unwrap();
        assert_eq!(d, Destination::Other);
    }

    #[test]
    fn test_request_method_normalized() {
        let url = Url::parse("https://example.com/").unwrap();
        let req = Request::new("post", url, Destination::Other);
        assert_eq!(req.method, "POST");
        assert!(!req.is_get());
    }

    #[test]
    fn test_request_scheme_check() {
        let req = Request::get(Url::parse("chrome-extension://abc/x.js").unwrap(), Destination::Script);
        assert!(!req.is_http());
        let req = Request::get(Url::parse("http://example.com/x.js").unwrap(), Destination::Script);
        assert!(req.is_http());
    }
}
