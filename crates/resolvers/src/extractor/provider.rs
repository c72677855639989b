//! Shared outbound-request plumbing for provider adapters.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use tracing::debug;

use super::default::DEFAULT_UA;
use super::error::ResolveError;
use crate::media::Extraction;

/// Optional credential pair for providers with an authenticated tier.
///
/// Both halves must be present or authenticated mode stays disabled;
/// a half-configured pair never produces partially-authenticated
/// requests.
#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    pub api_key: String,
    pub api_host: String,
}

impl ProviderCredentials {
    /// Read `RESOLVER_API_KEY` / `RESOLVER_API_HOST`. Returns `None`
    /// unless both are set and non-empty.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("RESOLVER_API_KEY").ok()?;
        let api_host = std::env::var("RESOLVER_API_HOST").ok()?;
        if api_key.trim().is_empty() || api_host.trim().is_empty() {
            return None;
        }
        Some(Self { api_key, api_host })
    }
}

/// Base client wrapper used by every adapter: one reqwest client plus
/// browser-mimicking platform headers.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    pub name: &'static str,
    pub client: Client,
    headers: HeaderMap,
}

impl ProviderClient {
    pub fn new(name: &'static str, client: Client) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(reqwest::header::USER_AGENT, HeaderValue::from_static(DEFAULT_UA));
        headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );

        Self {
            name,
            client,
            headers,
        }
    }

    #[inline]
    pub fn set_referer_static(&mut self, referer: &'static str) {
        self.headers
            .insert(reqwest::header::REFERER, HeaderValue::from_static(referer));
    }

    #[inline]
    pub fn set_origin_static(&mut self, origin: &'static str) {
        self.headers
            .insert(reqwest::header::ORIGIN, HeaderValue::from_static(origin));
    }

    /// Insert an arbitrary header; invalid names/values are skipped.
    pub fn add_header_str(&mut self, key: &str, value: &str) {
        match (HeaderName::from_bytes(key.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => {
                debug!(provider = self.name, header = key, "Invalid header; skipping");
            }
        }
    }

    /// Attach the credential pair as `x-api-key` / `x-api-host`.
    /// No-op without a full pair by construction of
    /// [`ProviderCredentials`].
    pub fn authenticate(&mut self, creds: &ProviderCredentials) {
        self.add_header_str("x-api-key", &creds.api_key);
        self.add_header_str("x-api-host", &creds.api_host);
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url).headers(self.headers.clone())
    }
}

/// One concrete extraction strategy for one platform.
///
/// Each call performs exactly one outbound request (plus at most one
/// cross-reference request when the first response's structure
/// demands it) and must never assume shape-consistency of the
/// provider's payload beyond its minimal envelope.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Stable identifier, e.g. `"tiktok-v2"`.
    fn source_version(&self) -> &'static str;

    async fn extract(&self, url: &str) -> Result<Extraction, ResolveError>;
}
