//! Content extraction pipeline
//!
//! Turns one URL into one [`ScrapeOutcome`]. Both passes walk the same static
//! selector cascade, from the documentation container down to the whole body,
//! and stop at the first selector that renders non-empty text:
//!
//! 1. Metadata pass (relaxed profile): title, breadcrumb, filename
//! 2. Content pass (strict profile): article body, cleaned of links and URLs
//!
//! Renderer errors never escape [`scrape_page`]; they become
//! [`ScrapeOutcome::Failed`].

mod clean;

pub use clean::{clean_markdown, extract_title, DEFAULT_TITLE};

use crate::output::Artifact;
use crate::renderer::{PageRenderer, RenderConfig, RenderError, RenderResult};
use crate::state::{ScrapeOutcome, SkipReason};
use crate::storage::ArtifactStore;
use crate::url::{derive_breadcrumb, derive_filename, derive_url_title, DocUrl};
use chrono::Utc;

/// Selectors tried in order, most specific first
pub const SELECTOR_CASCADE: &[&str] = &[
    "div.prose[data-docs='true']",
    "main",
    "article",
    ".content",
    "body",
];

/// Page metadata gathered by the metadata pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub page_title: String,
    pub breadcrumb_path: String,
    pub url_title: String,
    pub source_url: DocUrl,
    pub filename: String,
}

/// Settings the pipeline needs from the run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Breadcrumb of the documentation root page
    pub root_label: String,

    /// Cleaned bodies shorter than this many characters are skipped
    pub min_content_length: usize,
}

/// Runs the selector cascade
///
/// Returns the first successful render with non-blank text, `Ok(None)` when
/// every selector rendered nothing, and the last error when every selector
/// errored.
async fn render_cascade<R, F>(
    renderer: &R,
    url: &DocUrl,
    profile: F,
) -> Result<Option<(&'static str, RenderResult)>, RenderError>
where
    R: PageRenderer + ?Sized,
    F: Fn(&str) -> RenderConfig,
{
    let mut last_error = None;
    let mut any_answer = false;

    for &selector in SELECTOR_CASCADE {
        match renderer.render(url.as_str(), &profile(selector)).await {
            Ok(result) => {
                any_answer = true;
                if result.has_text() {
                    return Ok(Some((selector, result)));
                }
            }
            Err(e) => {
                tracing::debug!("Selector '{}' failed on {}: {}", selector, url, e);
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if !any_answer => Err(e),
        _ => Ok(None),
    }
}

/// Extracts title, breadcrumb and filename for a page
///
/// # Returns
///
/// * `Ok(Some(Metadata))` - A selector rendered text
/// * `Ok(None)` - No selector rendered text
/// * `Err(RenderError)` - Every selector raised an error
pub async fn extract_metadata<R>(
    renderer: &R,
    url: &DocUrl,
    root_label: &str,
) -> Result<Option<Metadata>, RenderError>
where
    R: PageRenderer + ?Sized,
{
    let Some((selector, result)) = render_cascade(renderer, url, RenderConfig::metadata).await?
    else {
        tracing::warn!("Could not extract any content from {}", url);
        return Ok(None);
    };

    tracing::debug!("Metadata for {} extracted using '{}'", url, selector);

    let page_title = extract_title(&result.markdown);
    Ok(Some(Metadata {
        filename: derive_filename(url.as_str(), &page_title),
        breadcrumb_path: derive_breadcrumb(url.as_str(), root_label),
        url_title: derive_url_title(url.as_str()),
        source_url: url.clone(),
        page_title,
    }))
}

/// Extracts the cleaned article body of a page
///
/// # Returns
///
/// * `Ok(Ok(text))` - Cleaned body of at least `min_content_length` characters
/// * `Ok(Err(SkipReason))` - Nothing rendered, or too little text survived
/// * `Err(RenderError)` - Every selector raised an error
pub async fn extract_content<R>(
    renderer: &R,
    url: &DocUrl,
    min_content_length: usize,
) -> Result<Result<String, SkipReason>, RenderError>
where
    R: PageRenderer + ?Sized,
{
    let Some((selector, result)) = render_cascade(renderer, url, RenderConfig::content).await?
    else {
        tracing::warn!("Failed to extract content from {}", url);
        return Ok(Err(SkipReason::NotFound));
    };

    tracing::debug!("Content for {} extracted using '{}'", url, selector);

    let cleaned = clean_markdown(&result.markdown);
    let cleaned = cleaned.trim();
    let length = cleaned.chars().count();
    if length < min_content_length {
        tracing::warn!(
            "Skipping {}: insufficient content ({} chars)",
            url,
            length
        );
        return Ok(Err(SkipReason::InsufficientContent));
    }

    Ok(Ok(cleaned.to_string()))
}

/// Scrapes one page into an artifact
///
/// # Arguments
///
/// * `renderer` - Page renderer
/// * `store` - Artifact store receiving the file
/// * `url` - Canonical page URL
/// * `section` - Name of the section being crawled
/// * `options` - Root label and minimum content length
///
/// # Returns
///
/// The outcome; the artifact carries the filename actually written.
pub async fn scrape_page<R>(
    renderer: &R,
    store: &mut dyn ArtifactStore,
    url: &DocUrl,
    section: &str,
    options: &ExtractOptions,
) -> ScrapeOutcome
where
    R: PageRenderer + ?Sized,
{
    let metadata = match extract_metadata(renderer, url, &options.root_label).await {
        Ok(Some(metadata)) => metadata,
        Ok(None) => return ScrapeOutcome::Skipped(SkipReason::NotFound),
        Err(e) => {
            tracing::warn!("Error scraping {}: {}", url, e);
            return ScrapeOutcome::Failed(e.to_string());
        }
    };

    let content = match extract_content(renderer, url, options.min_content_length).await {
        Ok(Ok(content)) => content,
        Ok(Err(reason)) => return ScrapeOutcome::Skipped(reason),
        Err(e) => {
            tracing::warn!("Error scraping {}: {}", url, e);
            return ScrapeOutcome::Failed(e.to_string());
        }
    };

    let mut artifact = Artifact {
        filename: metadata.filename,
        title: metadata.page_title,
        breadcrumb: metadata.breadcrumb_path,
        source_url: metadata.source_url,
        scraped_at: Utc::now(),
        content,
    };

    match store.write(&artifact, section) {
        Ok(filename) => {
            tracing::debug!("Saved {} as {}", url, filename);
            artifact.filename = filename;
            ScrapeOutcome::Scraped(artifact)
        }
        Err(e) => {
            tracing::warn!("Failed to save {}: {}", url, e);
            ScrapeOutcome::Failed(e.to_string())
        }
    }
}
