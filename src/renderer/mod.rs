//! Page rendering collaborators
//!
//! The crawl core never touches HTML itself. It asks a [`PageRenderer`] to
//! fetch a URL under a [`RenderConfig`] and gets back markdown-ish text plus the
//! links found on the page. This module defines that seam and ships:
//! - [`HttpRenderer`]: fetches with reqwest and renders with scraper
//! - [`TimeoutRenderer`]: bounds every call of an inner renderer

mod http;
mod markdown;

pub use http::{build_http_client, HttpRenderer};
pub use markdown::render_html;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors a renderer may raise
///
/// Unreachable pages are not errors: they come back as a [`RenderResult`]
/// with `success == false`. Errors are reserved for inputs that can never
/// succeed, such as a malformed URL or an unparsable selector.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Malformed URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Invalid selector '{selector}'")]
    InvalidSelector { selector: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Options narrowing what a render call extracts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderConfig {
    /// CSS selector narrowing the extraction scope (`None` = whole document)
    pub selector: Option<String>,

    /// Tag names dropped from the output
    pub excluded_tags: Vec<String>,

    /// Selectors whose matches are dropped from the output
    pub excluded_selectors: Vec<String>,

    /// Renders with fewer words than this report `success == false`
    pub min_word_count: usize,

    /// Drop links leaving the site origin
    pub exclude_external_links: bool,
}

/// Tags stripped from article bodies
const CONTENT_EXCLUDED_TAGS: &[&str] = &["nav", "header", "footer", "button", "svg"];

/// UI chrome stripped from article bodies
const CONTENT_EXCLUDED_SELECTORS: &[&str] = &[
    "div[data-feedback-inline]",
    "nav[aria-label='pagination']",
    "[class*='code-block_actions']",
    "[class*='code-block_copyButton']",
    "[class*='switcher_container']",
    "button[aria-label]",
    "svg",
    ".nextra-breadcrumb",
];

impl RenderConfig {
    /// Relaxed profile used for link discovery: whole document, all links
    pub fn discovery() -> Self {
        Self {
            selector: None,
            min_word_count: 1,
            exclude_external_links: false,
            ..Self::default()
        }
    }

    /// Profile used to read a page title through `selector`
    pub fn metadata(selector: &str) -> Self {
        Self {
            selector: Some(selector.to_string()),
            min_word_count: 1,
            ..Self::default()
        }
    }

    /// Strict profile used to read the article body through `selector`
    pub fn content(selector: &str) -> Self {
        Self {
            selector: Some(selector.to_string()),
            excluded_tags: CONTENT_EXCLUDED_TAGS.iter().map(|s| s.to_string()).collect(),
            excluded_selectors: CONTENT_EXCLUDED_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_word_count: 5,
            exclude_external_links: true,
        }
    }
}

/// A link reported by the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLink {
    pub href: String,
}

impl RenderedLink {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }
}

/// Outcome of a render call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderResult {
    /// Whether the page was fetched and met the config's thresholds
    pub success: bool,

    /// Rendered markdown text
    pub markdown: String,

    /// Links pointing inside the site origin
    pub internal_links: Vec<RenderedLink>,

    /// Links leaving the site origin (empty when excluded)
    pub external_links: Vec<RenderedLink>,
}

impl RenderResult {
    /// A successful render with no links
    pub fn ok(markdown: impl Into<String>) -> Self {
        Self {
            success: true,
            markdown: markdown.into(),
            ..Self::default()
        }
    }

    /// An unsuccessful render
    pub fn failed() -> Self {
        Self::default()
    }

    pub fn with_internal_links<I, S>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.internal_links = links.into_iter().map(RenderedLink::new).collect();
        self
    }

    /// True when the render succeeded with non-blank text
    pub fn has_text(&self) -> bool {
        self.success && !self.markdown.trim().is_empty()
    }
}

/// Capability to render a page under a given configuration
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Renders `url`
    ///
    /// Must not fail for unreachable pages; those return `success == false`.
    async fn render(&self, url: &str, config: &RenderConfig) -> Result<RenderResult, RenderError>;
}

#[async_trait]
impl<R: PageRenderer + ?Sized> PageRenderer for std::sync::Arc<R> {
    async fn render(&self, url: &str, config: &RenderConfig) -> Result<RenderResult, RenderError> {
        (**self).render(url, config).await
    }
}

/// Wraps a renderer so no single call can stall the crawl
///
/// A call exceeding the limit is reported as an unsuccessful render.
pub struct TimeoutRenderer<R> {
    inner: R,
    limit: Option<Duration>,
}

impl<R: PageRenderer> TimeoutRenderer<R> {
    pub fn new(inner: R, limit: Option<Duration>) -> Self {
        Self { inner, limit }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

#[async_trait]
impl<R: PageRenderer> PageRenderer for TimeoutRenderer<R> {
    async fn render(&self, url: &str, config: &RenderConfig) -> Result<RenderResult, RenderError> {
        let Some(limit) = self.limit else {
            return self.inner.render(url, config).await;
        };

        match tokio::time::timeout(limit, self.inner.render(url, config)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("Render of {} timed out after {:?}", url, limit);
                Ok(RenderResult::failed())
            }
        }
    }
}
