use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for docs-harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub site: SiteConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(rename = "section", default)]
    pub sections: Vec<Section>,
}

impl Config {
    /// Directory that receives the page artifacts
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.output.directory)
    }

    /// Full path of the checkpoint document
    pub fn checkpoint_path(&self) -> PathBuf {
        self.output_dir().join(&self.output.checkpoint_file)
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Global page budget; `None` means unlimited
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<u32>,

    /// Number of successful scrapes between checkpoint writes
    #[serde(rename = "checkpoint-interval", default = "default_checkpoint_interval")]
    pub checkpoint_interval: u32,

    /// Cleaned content shorter than this (in characters) is skipped
    #[serde(rename = "min-content-length", default = "default_min_content_length")]
    pub min_content_length: usize,

    /// What the page budget counts
    #[serde(rename = "budget-mode", default)]
    pub budget_mode: BudgetMode,

    /// Optional BFS depth ceiling for section discovery
    #[serde(rename = "max-depth", default)]
    pub max_depth: Option<u32>,

    /// Optional ceiling on pages explored per section discovery
    #[serde(rename = "max-nodes", default)]
    pub max_nodes: Option<usize>,

    /// Optional hard timeout for a single renderer call (seconds)
    #[serde(rename = "render-timeout-secs", default)]
    pub render_timeout_secs: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: None,
            checkpoint_interval: default_checkpoint_interval(),
            min_content_length: default_min_content_length(),
            budget_mode: BudgetMode::default(),
            max_depth: None,
            max_nodes: None,
            render_timeout_secs: None,
        }
    }
}

fn default_checkpoint_interval() -> u32 {
    10
}

fn default_min_content_length() -> usize {
    50
}

/// Selects which counter the page budget is enforced against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetMode {
    /// Stop once this many pages were scraped successfully
    #[default]
    Scraped,
    /// Stop once this many scrapes were attempted, successful or not
    Attempts,
}

/// Site-wide settings shared by every section
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Origin that relative links are resolved against (e.g. `https://nextjs.org`)
    pub origin: String,

    /// Breadcrumb label used for the documentation root page
    #[serde(rename = "root-label", default = "default_root_label")]
    pub root_label: String,
}

fn default_root_label() -> String {
    crate::url::DEFAULT_ROOT_LABEL.to_string()
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the user agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory where artifacts and the checkpoint are written
    pub directory: String,

    /// Checkpoint file name, relative to `directory`
    #[serde(rename = "checkpoint-file", default = "default_checkpoint_file")]
    pub checkpoint_file: String,

    /// How two pages deriving the same filename are handled
    #[serde(rename = "collision-policy", default)]
    pub collision_policy: CollisionPolicy,
}

fn default_checkpoint_file() -> String {
    "_crawl_progress.json".to_string()
}

/// Filename collision policy for artifacts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Last writer wins
    Overwrite,
    /// Append `_2`, `_3`, ... when a filename is owned by another URL
    #[default]
    Suffix,
    /// Prefix every filename with the slugified section name
    SectionPrefix,
}

/// A documentation section: a named seed URL crawled as one BFS closure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Human-readable section name
    pub name: String,

    /// Seed URL of the section subtree
    pub url: String,
}

impl Section {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}
