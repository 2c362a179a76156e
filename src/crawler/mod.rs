//! Crawler module for crawl orchestration
//!
//! This module wires the pieces of a crawl together:
//! - Building the HTTP page renderer from configuration
//! - Running sections through discovery and extraction
//! - Checkpointing and resumption

mod coordinator;

pub use coordinator::Coordinator;

use crate::config::Config;
use crate::output::CrawlReport;
use crate::renderer::{HttpRenderer, TimeoutRenderer};
use crate::url::parse_site_url;
use crate::{ConfigError, HarvestError};
use std::time::Duration;

/// Renderer used by the command-line crawler
pub type DefaultRenderer = TimeoutRenderer<HttpRenderer>;

/// Builds the HTTP renderer described by the configuration
///
/// `render-timeout-secs` bounds both the HTTP request and the whole render
/// call.
pub fn build_renderer(config: &Config) -> Result<DefaultRenderer, HarvestError> {
    let origin = parse_site_url(&config.site.origin)
        .map_err(|e| ConfigError::InvalidUrl(format!("site origin: {}", e)))?;
    let timeout = config.crawler.render_timeout_secs.map(Duration::from_secs);

    let http = HttpRenderer::new(&config.user_agent, origin, timeout)?;
    Ok(TimeoutRenderer::new(http, timeout))
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP renderer
/// 2. Resume from the checkpoint unless `fresh` is set
/// 3. Discover and scrape every section in order
/// 4. Write the final checkpoint
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `config_hash` - Hash of the configuration file
/// * `fresh` - Ignore any existing checkpoint
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished, stopped at the budget, or was cancelled
/// * `Err(HarvestError)` - Crawl could not start or a checkpoint write failed
///
/// # Example
///
/// ```no_run
/// use docs_harvest::config::load_config_with_hash;
/// use docs_harvest::crawler::crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("config.toml"))?;
/// let report = crawl(config, Some(hash), false).await?;
/// println!("{} pages scraped", report.scraped_count);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    config: Config,
    config_hash: Option<String>,
    fresh: bool,
) -> Result<CrawlReport, HarvestError> {
    let renderer = build_renderer(&config)?;
    let mut coordinator = Coordinator::new(config, renderer, config_hash, fresh)?;
    coordinator.run().await
}
