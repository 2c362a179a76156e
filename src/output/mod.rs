//! Output module for artifacts and crawl reports
//!
//! This module handles:
//! - Rendering scraped pages as frontmatter-tagged artifacts
//! - Parsing artifacts back into metadata and body
//! - Formatting per-section and per-run summaries

mod artifact;
pub mod report;

pub use artifact::{parse_frontmatter, Artifact, ParsedArtifact, SCRAPED_DATE_FORMAT};
pub use report::{
    format_checkpoint_status, format_report, print_report, CrawlReport, SectionStats,
    FAILED_URLS_SHOWN,
};
