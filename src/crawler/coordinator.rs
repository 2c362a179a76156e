//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop, including:
//! - Restoring state from an interrupted run's checkpoint
//! - Driving the ordered sections through discovery and extraction
//! - Enforcing the global page budget and cross-section dedup
//! - Periodic and final checkpoints
//! - Graceful shutdown on request

use crate::config::Config;
use crate::extract::{scrape_page, ExtractOptions};
use crate::frontier::{discover_section_links, DiscoveryLimits};
use crate::output::{CrawlReport, SectionStats};
use crate::renderer::PageRenderer;
use crate::state::CrawlState;
use crate::storage::{
    ArtifactStore, Checkpoint, CheckpointStore, FsArtifactStore, JsonCheckpointStore,
};
use crate::url::{canonicalize, parse_site_url};
use crate::{ConfigError, HarvestError};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;

/// Main crawler coordinator structure
///
/// Owns the [`CrawlState`] for the whole run. Nothing else mutates it.
pub struct Coordinator<R> {
    config: Arc<Config>,
    renderer: R,
    origin: Url,
    checkpoints: Box<dyn CheckpointStore>,
    artifacts: Box<dyn ArtifactStore>,
    state: CrawlState,
    config_hash: Option<String>,
    resumed: bool,
    shutdown: Arc<AtomicBool>,
}

impl<R: PageRenderer> Coordinator<R> {
    /// Creates a coordinator writing into the configured output directory
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `renderer` - Page renderer used for discovery and extraction
    /// * `config_hash` - Hash of the configuration file, stored in checkpoints
    /// * `fresh` - Ignore any existing checkpoint
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - The output directory or checkpoint could not be read
    pub fn new(
        config: Config,
        renderer: R,
        config_hash: Option<String>,
        fresh: bool,
    ) -> Result<Self, HarvestError> {
        let checkpoints = JsonCheckpointStore::new(config.checkpoint_path());
        let artifacts = FsArtifactStore::new(config.output_dir(), config.output.collision_policy)?;

        Self::with_stores(
            config,
            renderer,
            Box::new(checkpoints),
            Box::new(artifacts),
            config_hash,
            fresh,
        )
    }

    /// Creates a coordinator around explicit stores
    pub fn with_stores(
        config: Config,
        renderer: R,
        checkpoints: Box<dyn CheckpointStore>,
        artifacts: Box<dyn ArtifactStore>,
        config_hash: Option<String>,
        fresh: bool,
    ) -> Result<Self, HarvestError> {
        let origin = parse_site_url(&config.site.origin)
            .map_err(|e| ConfigError::InvalidUrl(format!("site origin: {}", e)))?;

        let (state, resumed) = if fresh {
            tracing::info!("Starting fresh crawl (ignoring previous checkpoint)");
            (CrawlState::new(), false)
        } else {
            match checkpoints.load()? {
                Some(checkpoint) if !checkpoint.completed => {
                    if let (Some(saved), Some(current)) = (&checkpoint.config_hash, &config_hash)
                    {
                        if saved != current {
                            tracing::warn!(
                                "Configuration changed since the checkpoint was written ({} -> {})",
                                saved,
                                current
                            );
                        }
                    }
                    tracing::info!(
                        "Resuming interrupted crawl: {} scraped, {} visited, section {}",
                        checkpoint.scraped_count,
                        checkpoint.visited.len(),
                        checkpoint.current_section_index + 1
                    );
                    (checkpoint.to_state(), true)
                }
                Some(_) => {
                    tracing::info!("Previous crawl completed, starting new run");
                    (CrawlState::new(), false)
                }
                None => {
                    tracing::info!("No checkpoint found, starting new run");
                    (CrawlState::new(), false)
                }
            }
        };

        Ok(Self {
            config: Arc::new(config),
            renderer,
            origin,
            checkpoints,
            artifacts,
            state,
            config_hash,
            resumed,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Flag that stops the crawl after the current page when set
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    pub fn is_resumed(&self) -> bool {
        self.resumed
    }

    /// Runs the main crawl loop
    ///
    /// For each section from the current cursor on:
    /// 1. Discovers the section's URLs breadth-first
    /// 2. Scrapes every URL not yet visited by any section
    /// 3. Checkpoints after every `checkpoint-interval` successful scrapes
    ///
    /// Stops early when the page budget is reached or shutdown is requested.
    /// A finished or budget-stopped run writes a completed checkpoint; a
    /// cancelled run writes a resumable one.
    ///
    /// # Errors
    ///
    /// Checkpoint I/O errors abort the run. Per-page failures never do.
    pub async fn run(&mut self) -> Result<CrawlReport, HarvestError> {
        let started_at = Utc::now();
        let start_time = std::time::Instant::now();
        let config = Arc::clone(&self.config);
        let crawler = &config.crawler;
        let sections = &config.sections;

        let limits = DiscoveryLimits {
            max_depth: crawler.max_depth,
            max_nodes: crawler.max_nodes,
        };
        let options = ExtractOptions {
            root_label: config.site.root_label.clone(),
            min_content_length: crawler.min_content_length,
        };

        tracing::info!(
            "Starting crawl: {} sections, budget {}",
            sections.len(),
            crawler
                .max_pages
                .map_or_else(|| "unlimited".to_string(), |max| max.to_string())
        );

        let mut section_reports = Vec::new();
        let mut budget_exhausted = false;
        let mut cancelled = false;
        let start_index = self.state.current_section_index();

        for (index, section) in sections.iter().enumerate().skip(start_index) {
            self.state.enter_section(index);

            if self.budget_reached() {
                tracing::info!("Reached max pages limit ({:?})", crawler.max_pages);
                budget_exhausted = true;
                break;
            }
            if self.shutdown_requested() {
                cancelled = true;
                break;
            }

            tracing::info!(
                "Section {}/{}: {} ({})",
                index + 1,
                sections.len(),
                section.name,
                section.url
            );

            let seed = canonicalize(&section.url);
            let discovery = discover_section_links(
                &self.renderer,
                &seed,
                &self.origin,
                &limits,
                &self.shutdown,
            )
            .await;
            discovery.log_summary(&section.name);

            let mut stats = SectionStats::new(&section.name);
            stats.discovered = discovery.len();
            stats.max_depth = discovery.max_depth;
            stats.completed = true;

            let total = discovery.len();
            for (position, url) in discovery.urls().enumerate() {
                if self.budget_reached() {
                    tracing::info!("Reached max pages limit ({:?})", crawler.max_pages);
                    budget_exhausted = true;
                    stats.completed = false;
                    break;
                }
                if self.shutdown_requested() {
                    cancelled = true;
                    stats.completed = false;
                    break;
                }

                if !self.state.try_visit(url) {
                    stats.duplicates += 1;
                    continue;
                }

                tracing::debug!(
                    "[{}.{}/{}] Scraping {}",
                    index + 1,
                    position + 1,
                    total,
                    url
                );

                let outcome = scrape_page(
                    &self.renderer,
                    self.artifacts.as_mut(),
                    url,
                    &section.name,
                    &options,
                )
                .await;
                self.state.record(url, &outcome);

                if outcome.is_success() {
                    stats.scraped += 1;
                    let scraped = self.state.scraped_count();
                    tracing::info!("Scraped {} ({})", url, outcome);

                    if scraped % 10 == 0 {
                        let rate = scraped as f64 / start_time.elapsed().as_secs_f64().max(1e-9);
                        tracing::info!(
                            "Progress: {} pages scraped, {} failed, {:.2} pages/sec",
                            scraped,
                            self.state.failed().len(),
                            rate
                        );
                    }

                    if scraped % crawler.checkpoint_interval.max(1) == 0 {
                        self.save_checkpoint(false)?;
                    }
                } else {
                    stats.failed += 1;
                    tracing::warn!("Could not scrape {}: {}", url, outcome);
                }
            }

            if discovery.truncated && self.shutdown_requested() {
                cancelled = true;
                stats.completed = false;
            }

            tracing::info!(
                "Section '{}' done: {} scraped, {} failed, {} duplicates, {} total scraped",
                section.name,
                stats.scraped,
                stats.failed,
                stats.duplicates,
                self.state.scraped_count()
            );
            section_reports.push(stats);

            if budget_exhausted || cancelled {
                break;
            }
        }

        if cancelled {
            tracing::info!("Crawl cancelled, writing resumable checkpoint");
            self.save_checkpoint(false)?;
        } else {
            self.save_checkpoint(true)?;
        }

        tracing::info!(
            "Crawl finished: {} pages scraped, {} failed in {:?}",
            self.state.scraped_count(),
            self.state.failed().len(),
            start_time.elapsed()
        );

        Ok(CrawlReport {
            started_at,
            finished_at: Utc::now(),
            scraped_count: self.state.scraped_count(),
            failed: self.state.failed().iter().cloned().collect(),
            sections: section_reports,
            budget_exhausted,
            cancelled,
            resumed: self.resumed,
        })
    }

    fn budget_reached(&self) -> bool {
        self.state
            .budget_reached(self.config.crawler.max_pages, self.config.crawler.budget_mode)
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Writes the current state; failures are fatal to the run
    fn save_checkpoint(&mut self, completed: bool) -> Result<(), HarvestError> {
        let sections = &self.config.sections;
        let hash = self.config_hash.as_deref();
        let checkpoint = if completed {
            Checkpoint::completed(&self.state, sections, hash)
        } else {
            Checkpoint::progress(&self.state, sections, hash)
        };

        self.checkpoints.save(&checkpoint).map_err(|e| {
            tracing::error!("Failed to write checkpoint: {}", e);
            HarvestError::from(e)
        })?;

        tracing::info!(
            "Progress saved ({} scraped{})",
            checkpoint.scraped_count,
            if completed { ", completed" } else { "" }
        );
        Ok(())
    }
}
