//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: global visited/failed sets, scrape counter and section cursor
//! - `ScrapeOutcome`: the terminal result of scraping one page
//! - `SkipReason`: why a page produced no artifact

mod crawl_state;
mod outcome;

// Re-export main types
pub use crawl_state::CrawlState;
pub use outcome::{ScrapeOutcome, SkipReason};
