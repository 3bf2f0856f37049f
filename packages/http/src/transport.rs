//! HTTP execution abstraction.
//!
//! The adapter only ever talks to a [`Transport`], so tests can swap in a
//! mock and never touch the network.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use url::Url;

use crate::error::Error;
use crate::types::{HttpRequest, HttpResponse};

/// Executes one HTTP request.
///
/// A non-2xx status is still `Ok`: only failures that produced no response at
/// all (connection refused, timeout, bad URL) are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Error>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        self.as_ref().execute(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        self.as_ref().execute(request).await
    }
}

/// Production transport using reqwest.
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
    default_headers: HashMap<String, String>,
}

impl ReqwestTransport {
    /// Create a transport rooted at `base_url` with the given request timeout.
    ///
    /// A path on `base_url` (e.g. `https://host/backend`) is kept as a mount
    /// prefix for every relative request path.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            default_headers: HashMap::new(),
        })
    }

    /// Create with default timeout of 30 seconds.
    pub fn with_default_timeout(base_url: &str) -> Result<Self, Error> {
        Self::new(base_url, Duration::from_secs(30))
    }

    /// Add a default header that will be sent with every request
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn resolve(&self, path: &str) -> Result<Url, Error> {
        if path.starts_with("http://") || path.starts_with("https://") {
            Ok(Url::parse(path)?)
        } else {
            Ok(self.base_url.join(path.trim_start_matches('/'))?)
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        let url = self.resolve(&request.path)?;
        let method: http::Method = request.method.into();

        let mut headers = HeaderMap::new();
        for (name, value) in self.default_headers.iter().chain(request.headers.iter()) {
            headers.insert(
                HeaderName::try_from(name.as_str())?,
                HeaderValue::try_from(value.as_str())?,
            );
        }

        let mut req_builder = self.client.request(method, url).headers(headers);

        if !request.query.is_empty() {
            req_builder = req_builder.query(&request.query);
        }

        if let Some(body) = &request.body {
            req_builder = req_builder.json(body);
        }

        let response = req_builder.send().await?;

        let status = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or("Unknown")
            .to_string();

        let mut resp_headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                resp_headers.insert(name.to_string(), v.to_string());
            }
        }

        let body_text = response.text().await?;

        Ok(HttpResponse {
            status,
            status_text,
            headers: resp_headers,
            body_text,
        })
    }
}
