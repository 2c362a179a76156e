//! Section frontier: per-section breadth-first link discovery
//!
//! Starting from a section's seed, every explored page is rendered with the
//! relaxed discovery profile and its same-origin links are classified. Links
//! inside the section join the discovered set and the FIFO queue once. A
//! page is marked explored when it is dequeued, and a URL already explored
//! or queued is never queued again, so no URL is fetched twice per section.

mod links;

pub use links::candidate_links;

use crate::renderer::{PageRenderer, RenderConfig};
use crate::url::{belongs_to_section, DocUrl};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use url::Url;

/// Number of URLs shown per depth in the discovery summary
const SAMPLE_PER_DEPTH: usize = 3;

/// A discovered URL and its BFS distance from the section seed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrontierEntry {
    pub url: DocUrl,
    pub depth: u32,
}

/// Optional ceilings bounding a pathological section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryLimits {
    /// Pages at this depth are kept but not expanded
    pub max_depth: Option<u32>,

    /// Maximum number of discovered URLs, seed included
    pub max_nodes: Option<usize>,
}

impl DiscoveryLimits {
    fn allows_depth(&self, depth: u32) -> bool {
        self.max_depth.map_or(true, |max| depth <= max)
    }

    fn allows_nodes(&self, count: usize) -> bool {
        self.max_nodes.map_or(true, |max| count < max)
    }
}

/// Result of discovering one section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionDiscovery {
    /// Discovered URLs sorted by (depth, path segments, URL)
    pub entries: Vec<FrontierEntry>,

    /// Deepest level explored
    pub max_depth: u32,

    /// Pages rendered during discovery
    pub fetched: usize,

    /// Renders that failed or errored
    pub fetch_failures: usize,

    /// A ceiling or a shutdown request cut discovery short
    pub truncated: bool,
}

impl SectionDiscovery {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn urls(&self) -> impl Iterator<Item = &DocUrl> {
        self.entries.iter().map(|entry| &entry.url)
    }

    /// Groups the discovered URLs by depth, preserving order
    pub fn by_depth(&self) -> BTreeMap<u32, Vec<&DocUrl>> {
        let mut groups: BTreeMap<u32, Vec<&DocUrl>> = BTreeMap::new();
        for entry in &self.entries {
            groups.entry(entry.depth).or_default().push(&entry.url);
        }
        groups
    }

    /// Logs totals and a sample of the first URLs at each depth
    pub fn log_summary(&self, section: &str) {
        tracing::info!(
            "Section '{}' discovery complete: {} links, maximum depth {}{}",
            section,
            self.entries.len(),
            self.max_depth,
            if self.truncated { " (truncated)" } else { "" }
        );

        for (depth, urls) in self.by_depth() {
            tracing::info!("  Depth {}: {} links", depth, urls.len());
            for url in urls.iter().take(SAMPLE_PER_DEPTH) {
                tracing::info!("    - {}", url);
            }
            if urls.len() > SAMPLE_PER_DEPTH {
                tracing::info!("    ... and {} more", urls.len() - SAMPLE_PER_DEPTH);
            }
        }
    }
}

/// Discovers every in-section URL reachable from `seed`
///
/// # Arguments
///
/// * `renderer` - Page renderer used with the discovery profile
/// * `seed` - Canonical seed URL of the section
/// * `origin` - Site origin; other origins are ignored
/// * `limits` - Optional depth and node ceilings
/// * `shutdown` - Checked before each render; when set, discovery stops early
///
/// # Returns
///
/// The seed plus every discovered in-section URL, sorted by
/// `(depth, path segments, URL)`. Render failures are logged and contribute
/// no children.
pub async fn discover_section_links<R>(
    renderer: &R,
    seed: &DocUrl,
    origin: &Url,
    limits: &DiscoveryLimits,
    shutdown: &AtomicBool,
) -> SectionDiscovery
where
    R: PageRenderer + ?Sized,
{
    let config = RenderConfig::discovery();

    let mut explored: HashSet<DocUrl> = HashSet::new();
    let mut queued: HashSet<DocUrl> = HashSet::new();
    let mut queue: VecDeque<DocUrl> = VecDeque::new();
    let mut depth_of: HashMap<DocUrl, u32> = HashMap::new();
    let mut discovery = SectionDiscovery::default();

    depth_of.insert(seed.clone(), 0);
    queued.insert(seed.clone());
    queue.push_back(seed.clone());

    while let Some(current) = queue.pop_front() {
        queued.remove(&current);
        if !explored.insert(current.clone()) {
            continue;
        }

        if shutdown.load(Ordering::SeqCst) {
            tracing::info!("Shutdown requested, stopping discovery");
            discovery.truncated = true;
            break;
        }

        let depth = depth_of.get(&current).copied().unwrap_or(0);
        discovery.max_depth = discovery.max_depth.max(depth);

        if !limits.allows_depth(depth + 1) {
            tracing::debug!("Not expanding {} at depth {}", current, depth);
            discovery.truncated = true;
            continue;
        }

        let Ok(page) = Url::parse(current.as_str()) else {
            tracing::warn!("Skipping unparsable URL {}", current);
            discovery.fetch_failures += 1;
            continue;
        };

        tracing::debug!("Exploring (depth {}): {}", depth, current);
        discovery.fetched += 1;

        let result = match renderer.render(current.as_str(), &config).await {
            Ok(result) if result.success => result,
            Ok(_) => {
                tracing::warn!("Failed to fetch {}", current);
                discovery.fetch_failures += 1;
                continue;
            }
            Err(e) => {
                tracing::warn!("Error exploring {}: {}", current, e);
                discovery.fetch_failures += 1;
                continue;
            }
        };

        let mut new_links = 0;
        for link in candidate_links(&result, &page, origin) {
            if !belongs_to_section(&link, seed) {
                continue;
            }
            if explored.contains(&link) || queued.contains(&link) {
                continue;
            }
            if !limits.allows_nodes(depth_of.len()) {
                discovery.truncated = true;
                break;
            }

            depth_of.insert(link.clone(), depth + 1);
            queued.insert(link.clone());
            queue.push_back(link);
            new_links += 1;
        }

        if new_links > 0 {
            tracing::debug!("Found {} new section links on {}", new_links, current);
        }
    }

    let mut entries: Vec<FrontierEntry> = depth_of
        .into_iter()
        .map(|(url, depth)| FrontierEntry { url, depth })
        .collect();
    entries.sort_by(|a, b| {
        (a.depth, a.url.segment_count(), &a.url).cmp(&(b.depth, b.url.segment_count(), &b.url))
    });
    discovery.entries = entries;

    discovery
}
