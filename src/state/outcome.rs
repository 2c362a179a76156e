/// Per-page scrape outcomes
///
/// Every URL handed to the extraction pipeline ends in exactly one of these
/// outcomes. Failures are values, never propagated errors.
use crate::output::Artifact;
use std::fmt;

/// Why a page was skipped without an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// No selector in the cascade produced rendered text
    NotFound,

    /// Text was found but fell below the minimum content length
    InsufficientContent,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InsufficientContent => "insufficient_content",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of scraping a single page
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeOutcome {
    // ===== Terminal Success =====
    /// The page was extracted and its artifact written
    Scraped(Artifact),

    // ===== Terminal Skip =====
    /// The page yielded no usable text
    Skipped(SkipReason),

    // ===== Terminal Error =====
    /// The renderer or the artifact store raised an unexpected error
    Failed(String),
}

impl ScrapeOutcome {
    /// Returns true if this represents a successful scrape
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Scraped(_))
    }

    /// Returns true if the page was skipped (counted as failed by the crawl)
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    /// Returns true if an unexpected error occurred
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The written artifact, if any
    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            Self::Scraped(artifact) => Some(artifact),
            _ => None,
        }
    }

    /// Short label used in logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Scraped(_) => "scraped",
            Self::Skipped(reason) => reason.as_str(),
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for ScrapeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scraped(artifact) => write!(f, "scraped as {}", artifact.filename),
            Self::Skipped(reason) => write!(f, "skipped ({})", reason),
            Self::Failed(message) => write!(f, "failed: {}", message),
        }
    }
}
