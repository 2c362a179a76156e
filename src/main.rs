//! docs-harvest main entry point
//!
//! This is the command-line interface for the docs-harvest documentation crawler.

use anyhow::{Context, Result};
use clap::Parser;
use docs_harvest::config::{load_config_with_hash, Config};
use docs_harvest::crawler::{build_renderer, Coordinator};
use docs_harvest::output::{format_checkpoint_status, print_report};
use docs_harvest::storage::{CheckpointStore, JsonCheckpointStore};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tracing_subscriber::EnvFilter;

/// docs-harvest: a resumable, section-scoped documentation crawler
///
/// docs-harvest walks each configured section of a documentation site
/// breadth-first, writes one frontmatter-tagged text file per page, and
/// checkpoints its progress so an interrupted crawl can pick up where it
/// stopped.
#[derive(Parser, Debug)]
#[command(name = "docs-harvest")]
#[command(version)]
#[command(about = "A resumable documentation site crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Resume an interrupted crawl (default behavior)
    #[arg(long, conflicts_with = "fresh")]
    resume: bool,

    /// Start a fresh crawl, ignoring the checkpoint
    #[arg(long, conflicts_with = "resume")]
    fresh: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "status")]
    dry_run: bool,

    /// Show the saved checkpoint and exit
    #[arg(long, conflicts_with = "dry_run")]
    status: bool,

    /// Override the page budget from the config file
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    max_pages: Option<u32>,

    /// Override the output directory from the config file
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = Some(max_pages);
    }
    if let Some(output) = &cli.output {
        config.output.directory = output.to_string_lossy().into_owned();
    }

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.status {
        handle_status(&config)?;
    } else {
        if cli.resume {
            tracing::info!(
                "Resuming from checkpoint {}",
                config.checkpoint_path().display()
            );
        }
        handle_crawl(config, config_hash, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("docs_harvest=info,warn"),
            1 => EnvFilter::new("docs_harvest=debug,info"),
            2 => EnvFilter::new("docs_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the validated configuration
fn handle_dry_run(config: &Config) {
    println!("=== docs-harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    match config.crawler.max_pages {
        Some(max) => println!("  Max pages: {} ({:?})", max, config.crawler.budget_mode),
        None => println!("  Max pages: unlimited"),
    }
    println!(
        "  Checkpoint every: {} scraped pages",
        config.crawler.checkpoint_interval
    );
    println!(
        "  Minimum content length: {} chars",
        config.crawler.min_content_length
    );
    if let Some(depth) = config.crawler.max_depth {
        println!("  Max discovery depth: {}", depth);
    }
    if let Some(nodes) = config.crawler.max_nodes {
        println!("  Max URLs per section: {}", nodes);
    }
    if let Some(secs) = config.crawler.render_timeout_secs {
        println!("  Render timeout: {}s", secs);
    }

    println!("\nSite:");
    println!("  Origin: {}", config.site.origin);
    println!("  Root label: {}", config.site.root_label);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Directory: {}", config.output_dir().display());
    println!("  Checkpoint: {}", config.checkpoint_path().display());
    println!("  Collision policy: {:?}", config.output.collision_policy);

    println!("\nSections ({}):", config.sections.len());
    for (i, section) in config.sections.iter().enumerate() {
        println!("  {}. {} ({})", i + 1, section.name, section.url);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --status mode: shows the saved checkpoint
fn handle_status(config: &Config) -> Result<()> {
    let path = config.checkpoint_path();
    println!("Checkpoint: {}\n", path.display());

    let store = JsonCheckpointStore::new(&path);
    match store
        .load()
        .with_context(|| format!("Failed to read checkpoint {}", path.display()))?
    {
        Some(checkpoint) => print!("{}", format_checkpoint_status(&checkpoint)),
        None => println!("No checkpoint found; the next run starts from scratch."),
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: String, fresh: bool) -> Result<()> {
    tracing::info!(
        "Sections: {}, output: {}",
        config.sections.len(),
        config.output_dir().display()
    );

    let renderer = build_renderer(&config).context("Failed to build page renderer")?;
    let mut coordinator = Coordinator::new(config, renderer, Some(config_hash), fresh)
        .context("Failed to initialize crawl")?;

    // Ctrl-C lets the current page finish, then checkpoints
    let shutdown = coordinator.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current page");
            shutdown.store(true, Ordering::SeqCst);
        }
    });

    let report = coordinator.run().await.context("Crawl failed")?;
    print_report(&report);

    Ok(())
}
