use crate::error::{Result, ScanError};
use reqwest::Client;
use reqwest::header::{ACCEPT, CONNECTION, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const CRAWL_USER_AGENT: &str = "Mozilla/5.0";
pub const PROBE_USER_AGENT: &str = "Mozilla/5.0 (XSS-Scanner)";
pub const DEFAULT_CRAWL_TIMEOUT_SECS: u64 = 10;
pub const PROBE_TIMEOUT_SECS: u64 = 12;
const MAX_REDIRECTS: usize = 10;

/// Request policy shared by every fetch a [`Fetcher`] makes.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub timeout: Duration,
    pub user_agent: String,
    pub headers: HeaderMap,
}

impl FetchPolicy {
    /// Policy used while crawling seed pages.
    pub fn crawl(timeout: Duration) -> Self {
        Self {
            timeout,
            user_agent: CRAWL_USER_AGENT.to_string(),
            headers: HeaderMap::new(),
        }
    }

    /// Policy used while probing for reflections.
    pub fn probe() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(CONNECTION, HeaderValue::from_static("close"));
        Self {
            timeout: Duration::from_secs(PROBE_TIMEOUT_SECS),
            user_agent: PROBE_USER_AGENT.to_string(),
            headers,
        }
    }
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self::crawl(Duration::from_secs(DEFAULT_CRAWL_TIMEOUT_SECS))
    }
}

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: HeaderMap,
    pub body: String,
}

impl FetchedPage {
    /// Empty or whitespace-only body.
    pub fn is_blank(&self) -> bool {
        self.body.trim().is_empty()
    }

    /// Lower-cased content type, empty when the header is missing.
    pub fn content_type_lower(&self) -> String {
        self.content_type
            .as_deref()
            .unwrap_or("")
            .to_ascii_lowercase()
    }
}

/// GET-only HTTP client with TLS verification disabled.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(policy: FetchPolicy) -> Result<Self> {
        let client = Client::builder()
            .user_agent(policy.user_agent)
            .default_headers(policy.headers)
            .timeout(policy.timeout)
            .danger_accept_invalid_certs(true)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| ScanError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        debug!("Fetching {}", url);

        let target =
            Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;
        let response = self.client.get(target).send().await?;

        let final_url = response.url().to_string();
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        // Undecodable bytes are replaced rather than rejected
        let body = response.text().await?;

        Ok(FetchedPage {
            url: final_url,
            status,
            content_type,
            headers,
            body,
        })
    }
}
