//! Run reports
//!
//! This module holds the per-section and per-run accounting the orchestrator
//! returns, and formats it for the terminal.

use crate::storage::Checkpoint;
use crate::url::DocUrl;
use chrono::{DateTime, Utc};

/// Maximum number of failed URLs listed in a report
pub const FAILED_URLS_SHOWN: usize = 10;

/// Accounting for one section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionStats {
    /// Section name
    pub name: String,

    /// In-section URLs found by discovery
    pub discovered: usize,

    /// Deepest BFS level reached by discovery
    pub max_depth: u32,

    /// Pages scraped into artifacts
    pub scraped: u32,

    /// Pages that failed or were skipped
    pub failed: u32,

    /// Pages skipped because an earlier section or run already visited them
    pub duplicates: u32,

    /// False when the budget or a cancellation stopped the section early
    pub completed: bool,
}

impl SectionStats {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Summary of a crawl run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Total successful scrapes, including those restored from a checkpoint
    pub scraped_count: u32,

    /// Every URL in the failed set, sorted
    pub failed: Vec<DocUrl>,

    /// Sections processed by this run, in order
    pub sections: Vec<SectionStats>,

    /// The page budget stopped the run
    pub budget_exhausted: bool,

    /// A shutdown request stopped the run
    pub cancelled: bool,

    /// The run picked up an interrupted checkpoint
    pub resumed: bool,
}

impl CrawlReport {
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// True when every section ran to completion
    pub fn is_complete(&self) -> bool {
        !self.budget_exhausted && !self.cancelled
    }
}

/// Formats a report for the terminal
///
/// # Arguments
///
/// * `report` - The report to format
///
/// # Returns
///
/// A multi-line summary listing section totals and at most
/// [`FAILED_URLS_SHOWN`] failed URLs
pub fn format_report(report: &CrawlReport) -> String {
    let mut out = String::new();

    out.push_str("=== Crawl Summary ===\n\n");

    let status = if report.cancelled {
        "cancelled"
    } else if report.budget_exhausted {
        "stopped at page budget"
    } else {
        "complete"
    };
    out.push_str(&format!("Status: {}\n", status));
    if report.resumed {
        out.push_str("Resumed from checkpoint: yes\n");
    }
    out.push_str(&format!(
        "Duration: {} seconds\n",
        report.duration_seconds()
    ));
    out.push_str(&format!("Successfully scraped: {} pages\n", report.scraped_count));
    out.push_str(&format!("Failed to scrape: {} pages\n\n", report.failed.len()));

    if !report.sections.is_empty() {
        out.push_str("Sections:\n");
        for (i, section) in report.sections.iter().enumerate() {
            out.push_str(&format!(
                "  {}. {}: {} discovered (depth {}), {} scraped, {} failed, {} duplicates{}\n",
                i + 1,
                section.name,
                section.discovered,
                section.max_depth,
                section.scraped,
                section.failed,
                section.duplicates,
                if section.completed { "" } else { " [partial]" }
            ));
        }
        out.push('\n');
    }

    if !report.failed.is_empty() {
        out.push_str("Failed URLs:\n");
        for url in report.failed.iter().take(FAILED_URLS_SHOWN) {
            out.push_str(&format!("  - {}\n", url));
        }
        if report.failed.len() > FAILED_URLS_SHOWN {
            out.push_str(&format!(
                "  ... and {} more\n",
                report.failed.len() - FAILED_URLS_SHOWN
            ));
        }
    }

    out
}

/// Prints a report to stdout
pub fn print_report(report: &CrawlReport) {
    print!("{}", format_report(report));
}

/// Formats a saved checkpoint for the terminal
pub fn format_checkpoint_status(checkpoint: &Checkpoint) -> String {
    let mut out = String::new();

    out.push_str("=== Checkpoint Status ===\n\n");
    if checkpoint.completed {
        out.push_str("State: completed\n");
        if let Some(time) = checkpoint.completion_time {
            out.push_str(&format!("Completed at: {}\n", time.to_rfc3339()));
        }
    } else {
        out.push_str("State: in progress (resumable)\n");
        if let Some(section) = &checkpoint.current_section {
            out.push_str(&format!(
                "Current section: {} ({})\n",
                section,
                checkpoint.section_progress.as_deref().unwrap_or("?")
            ));
        }
    }
    out.push_str(&format!(
        "Last updated: {}\n",
        checkpoint.last_updated.to_rfc3339()
    ));
    out.push_str(&format!("Scraped: {} pages\n", checkpoint.scraped_count));
    out.push_str(&format!("Visited: {} URLs\n", checkpoint.visited.len()));
    out.push_str(&format!("Failed: {} URLs\n", checkpoint.failed.len()));

    for url in checkpoint.failed.iter().take(FAILED_URLS_SHOWN) {
        out.push_str(&format!("  - {}\n", url));
    }
    if checkpoint.failed.len() > FAILED_URLS_SHOWN {
        out.push_str(&format!(
            "  ... and {} more\n",
            checkpoint.failed.len() - FAILED_URLS_SHOWN
        ));
    }

    out
}
