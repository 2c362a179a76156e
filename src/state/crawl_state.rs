//! Global crawl state owned by the orchestrator

use crate::config::BudgetMode;
use crate::state::ScrapeOutcome;
use crate::url::DocUrl;
use std::collections::BTreeSet;

/// Process-wide crawl progress
///
/// Tracks which URLs have been handed to the extraction pipeline, which of
/// them failed, and how many produced artifacts. A URL enters `visited`
/// before its fetch starts and never leaves it, so no later section can
/// queue it again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlState {
    visited: BTreeSet<DocUrl>,
    failed: BTreeSet<DocUrl>,
    scraped_count: u32,
    current_section_index: usize,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds state from a persisted checkpoint
    pub fn restore<V, F>(visited: V, failed: F, scraped_count: u32, section_index: usize) -> Self
    where
        V: IntoIterator<Item = DocUrl>,
        F: IntoIterator<Item = DocUrl>,
    {
        let visited: BTreeSet<DocUrl> = visited.into_iter().collect();
        // Failed URLs were visited by construction
        let failed: BTreeSet<DocUrl> = failed.into_iter().collect();
        let visited = visited.union(&failed).cloned().collect();

        Self {
            visited,
            failed,
            scraped_count,
            current_section_index: section_index,
        }
    }

    /// Marks `url` as visited
    ///
    /// Returns false when the URL was already visited, in which case the
    /// caller must not scrape it.
    pub fn try_visit(&mut self, url: &DocUrl) -> bool {
        self.visited.insert(url.clone())
    }

    pub fn is_visited(&self, url: &DocUrl) -> bool {
        self.visited.contains(url)
    }

    /// Folds a scrape outcome into the counters
    pub fn record(&mut self, url: &DocUrl, outcome: &ScrapeOutcome) {
        if outcome.is_success() {
            self.scraped_count += 1;
        } else {
            self.failed.insert(url.clone());
        }
    }

    pub fn enter_section(&mut self, index: usize) {
        self.current_section_index = index;
    }

    /// Checks the page budget
    ///
    /// `Scraped` counts successful scrapes, `Attempts` counts every visited
    /// URL. `None` means unlimited.
    pub fn budget_reached(&self, max_pages: Option<u32>, mode: BudgetMode) -> bool {
        let Some(max) = max_pages else {
            return false;
        };

        let used = match mode {
            BudgetMode::Scraped => self.scraped_count,
            BudgetMode::Attempts => self.attempts(),
        };
        used >= max
    }

    pub fn visited(&self) -> &BTreeSet<DocUrl> {
        &self.visited
    }

    pub fn failed(&self) -> &BTreeSet<DocUrl> {
        &self.failed
    }

    pub fn scraped_count(&self) -> u32 {
        self.scraped_count
    }

    /// Number of scrape attempts, one per visited URL
    pub fn attempts(&self) -> u32 {
        u32::try_from(self.visited.len()).unwrap_or(u32::MAX)
    }

    pub fn current_section_index(&self) -> usize {
        self.current_section_index
    }
}
