//! Adapter configuration.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use restmap_http::ReqwestTransport;

use crate::naming::{Pluralizer, UrlBuilder};
use crate::translator::DEFAULT_SINCE_KEY;
use crate::Error;

/// Everything the adapter needs to know about the backend's conventions.
///
/// Loaded once and never mutated; the plural override table in particular is
/// fixed for the lifetime of the adapter.
///
/// ```
/// use restmap_adapter::AdapterConfig;
///
/// let config = AdapterConfig::from_json_str(r#"{
///     "base_url": "https://api.example.com",
///     "namespace": "api",
///     "plurals": {"person": "people"}
/// }"#).unwrap();
///
/// assert_eq!(config.since, "next");
/// assert_eq!(config.url_builder().build_url("person", None), "/api/people/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Root URL of the backend, used by [`AdapterConfig::transport`].
    pub base_url: Option<String>,

    /// Prefix joined in front of every resource path. Empty by default, which
    /// produces paths rooted at `/`.
    pub host: String,

    /// Optional path segment between the host and the resource name.
    pub namespace: Option<String>,

    /// Explicit plural forms, consulted before the default rule.
    pub plurals: BTreeMap<String, String>,

    /// Payload key carrying the pagination cursor.
    pub since: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            host: String::new(),
            namespace: None,
            plurals: BTreeMap::new(),
            since: DEFAULT_SINCE_KEY.to_string(),
            timeout_secs: 30,
        }
    }
}

impl AdapterConfig {
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::Config {
            message: e.to_string(),
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        log::debug!("Reading adapter config from {}...", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn url_builder(&self) -> UrlBuilder {
        UrlBuilder::new(
            self.host.clone(),
            self.namespace.clone(),
            Pluralizer::new(self.plurals.clone()),
        )
    }

    /// A reqwest transport rooted at `base_url`.
    pub fn transport(&self) -> Result<ReqwestTransport, Error> {
        let base_url = self.base_url.as_deref().ok_or_else(|| Error::Config {
            message: "base_url is required to build a transport".to_string(),
        })?;
        Ok(ReqwestTransport::new(base_url, self.timeout())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = AdapterConfig::default();
        assert_eq!(config.since, "next");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.plurals.is_empty());
        assert_eq!(config.url_builder().build_url("widget", None), "/widgets/");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = AdapterConfig::from_json_str(r#"{"namespace": "v2"}"#).unwrap();
        assert_eq!(config.namespace.as_deref(), Some("v2"));
        assert_eq!(config.since, "next");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn invalid_json_is_config_error() {
        let err = AdapterConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"base_url": "http://localhost:8000", "plurals": {{"child": "children"}}}}"#
        )
        .unwrap();

        let config = AdapterConfig::from_path(file.path()).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.url_builder().pluralizer().pluralize("child"), "children");
        assert!(config.transport().is_ok());
    }

    #[test]
    fn transport_requires_base_url() {
        let err = AdapterConfig::default().transport().err().unwrap();
        assert!(matches!(err, Error::Config { .. }));
    }
}
