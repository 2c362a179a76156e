//! HTTP page renderer
//!
//! This module fetches pages over HTTP and hands the HTML to the markdown
//! renderer, including:
//! - Building HTTP clients with proper user agent strings
//! - Mapping HTTP and network failures onto unsuccessful renders
//! - Rejecting non-HTML responses
//! - Reusing the last fetched page across the selector cascade

use crate::config::UserAgentConfig;
use crate::renderer::markdown::render_html;
use crate::renderer::{PageRenderer, RenderConfig, RenderError, RenderResult};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Optional whole-request timeout
///
/// # Example
///
/// ```no_run
/// use docs_harvest::config::UserAgentConfig;
/// use docs_harvest::renderer::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "docs-harvest".to_string(),
///     crawler_version: "0.1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "ops@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, None).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Option<Duration>,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout.unwrap_or(Duration::from_secs(30)))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// An HTML page as served, after redirects
#[derive(Debug, Clone)]
struct FetchedPage {
    url: Url,
    body: String,
}

/// Outcome of the most recent fetch, keyed by the requested URL
struct LastFetch {
    requested: Url,
    page: Option<FetchedPage>,
}

/// Renders pages by fetching them over HTTP and converting the HTML locally
///
/// The last fetch is kept, so consecutive renders of one URL under different
/// selectors share a single request. Links are resolved against the URL the
/// server answered from after redirects, not the requested one.
pub struct HttpRenderer {
    client: Client,
    origin: Url,
    last_fetch: Mutex<Option<LastFetch>>,
}

impl HttpRenderer {
    /// Creates a renderer for pages on `origin`
    pub fn new(
        user_agent: &UserAgentConfig,
        origin: Url,
        timeout: Option<Duration>,
    ) -> Result<Self, RenderError> {
        let client = build_http_client(user_agent, timeout)?;
        Ok(Self::with_client(client, origin))
    }

    /// Creates a renderer around an existing client
    pub fn with_client(client: Client, origin: Url) -> Self {
        Self {
            client,
            origin,
            last_fetch: Mutex::new(None),
        }
    }

    /// Returns the page for `url`, fetching it unless it was the last one fetched
    async fn page(&self, url: &Url) -> Option<FetchedPage> {
        if let Some(cached) = self.cached(url) {
            tracing::trace!("Reusing fetched body of {}", url);
            return cached;
        }

        let page = self.fetch_html(url).await;
        if let Ok(mut last) = self.last_fetch.lock() {
            *last = Some(LastFetch {
                requested: url.clone(),
                page: page.clone(),
            });
        }
        page
    }

    fn cached(&self, url: &Url) -> Option<Option<FetchedPage>> {
        let last = self.last_fetch.lock().ok()?;
        let page = last
            .as_ref()
            .filter(|fetch| &fetch.requested == url)
            .map(|fetch| fetch.page.clone());
        page
    }

    /// Fetches the HTML of `url`, or None when the page is unusable
    async fn fetch_html(&self, url: &Url) -> Option<FetchedPage> {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                if e.is_timeout() {
                    tracing::warn!("Request timeout for {}", url);
                } else if e.is_connect() {
                    tracing::warn!("Connection refused for {}", url);
                } else {
                    tracing::warn!("Request to {} failed: {}", url, e);
                }
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("HTTP {} for {}", status.as_u16(), url);
            return None;
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.is_empty() && !content_type.contains("text/html") {
            tracing::debug!("Expected HTML from {}, got {}", url, content_type);
            return None;
        }

        let served_url = response.url().clone();
        if &served_url != url {
            tracing::debug!("{} served from {}", url, served_url);
        }

        match response.text().await {
            Ok(body) => Some(FetchedPage {
                url: served_url,
                body,
            }),
            Err(e) => {
                tracing::warn!("Failed to read body of {}: {}", url, e);
                None
            }
        }
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, url: &str, config: &RenderConfig) -> Result<RenderResult, RenderError> {
        let page_url = Url::parse(url).map_err(|e| RenderError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        match self.page(&page_url).await {
            Some(page) => render_html(&page.body, &page.url, &self.origin, config),
            None => Ok(RenderResult::failed()),
        }
    }
}
