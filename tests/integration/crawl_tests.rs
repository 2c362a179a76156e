//! Integration tests for the crawl coordinator
//!
//! These tests drive full crawls against a scripted in-memory renderer and a
//! temporary output directory.

use async_trait::async_trait;
use docs_harvest::config::{
    BudgetMode, CollisionPolicy, Config, CrawlerConfig, OutputConfig, Section, SiteConfig,
    UserAgentConfig,
};
use docs_harvest::crawler::Coordinator;
use docs_harvest::output::parse_frontmatter;
use docs_harvest::renderer::{PageRenderer, RenderConfig, RenderError, RenderResult};
use docs_harvest::state::CrawlState;
use docs_harvest::storage::{
    Checkpoint, CheckpointStore, FsArtifactStore, JsonCheckpointStore, StorageResult,
};
use docs_harvest::url::{canonicalize, DocUrl};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const ORIGIN: &str = "https://site.test";

/// A page the scripted renderer knows about
#[derive(Clone)]
enum ScriptedPage {
    /// Renders `markdown` under every selector and reports `links` on discovery
    Ok {
        markdown: String,
        links: Vec<String>,
    },
    /// Every render call errors
    Broken,
}

/// Renderer answering from a fixed URL -> page table
#[derive(Default)]
struct ScriptedRenderer {
    pages: HashMap<String, ScriptedPage>,
    calls: Mutex<Vec<String>>,
    /// Flag raised once this many content renders have happened
    stop_after: Mutex<Option<(usize, Arc<AtomicBool>)>>,
}

impl ScriptedRenderer {
    fn page(mut self, url: &str, markdown: &str, links: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            ScriptedPage::Ok {
                markdown: markdown.to_string(),
                links: links.iter().map(|l| l.to_string()).collect(),
            },
        );
        self
    }

    fn broken(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), ScriptedPage::Broken);
        self
    }

    /// Raises `flag` as soon as `count` content renders have been served
    fn stop_after_content_calls(&self, count: usize, flag: Arc<AtomicBool>) {
        *self.stop_after.lock().unwrap() = Some((count, flag));
    }

    /// URLs rendered with a content profile, in call order
    fn content_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageRenderer for ScriptedRenderer {
    async fn render(&self, url: &str, config: &RenderConfig) -> Result<RenderResult, RenderError> {
        if config.exclude_external_links {
            let mut calls = self.calls.lock().unwrap();
            calls.push(url.to_string());
            if let Some((count, flag)) = self.stop_after.lock().unwrap().as_ref() {
                if calls.len() >= *count {
                    flag.store(true, Ordering::SeqCst);
                }
            }
        }

        match self.pages.get(url) {
            Some(ScriptedPage::Ok { markdown, links }) => {
                if config.selector.is_none() {
                    Ok(RenderResult::ok(markdown.clone()).with_internal_links(links.clone()))
                } else {
                    Ok(RenderResult::ok(markdown.clone()))
                }
            }
            Some(ScriptedPage::Broken) => Err(RenderError::InvalidSelector {
                selector: config.selector.clone().unwrap_or_default(),
            }),
            None => Ok(RenderResult::failed()),
        }
    }
}

/// Checkpoint store keeping every saved document in memory
#[derive(Clone, Default)]
struct RecordingCheckpointStore {
    saved: Arc<Mutex<Vec<Checkpoint>>>,
}

impl CheckpointStore for RecordingCheckpointStore {
    fn load(&self) -> StorageResult<Option<Checkpoint>> {
        Ok(self.saved.lock().unwrap().last().cloned())
    }

    fn save(&mut self, checkpoint: &Checkpoint) -> StorageResult<()> {
        self.saved.lock().unwrap().push(checkpoint.clone());
        Ok(())
    }
}

fn url(path: &str) -> String {
    format!("{}{}", ORIGIN, path)
}

fn body(topic: &str) -> String {
    format!(
        "# {}\n\nThis page explains {} in enough words to pass every content threshold.",
        topic, topic
    )
}

/// Creates a test configuration writing into `dir`
fn create_test_config(dir: &Path, sections: Vec<Section>) -> Config {
    Config {
        crawler: CrawlerConfig::default(),
        site: SiteConfig {
            origin: ORIGIN.to_string(),
            root_label: "Docs".to_string(),
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            directory: dir.to_string_lossy().into_owned(),
            checkpoint_file: "_crawl_progress.json".to_string(),
            collision_policy: CollisionPolicy::Suffix,
        },
        sections,
    }
}

fn artifact_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".txt"))
        .collect();
    names.sort();
    names
}

fn load_checkpoint(dir: &Path) -> Checkpoint {
    JsonCheckpointStore::new(dir.join("_crawl_progress.json"))
        .load()
        .unwrap()
        .expect("checkpoint should exist")
}

#[tokio::test]
async fn test_docs_root_page_becomes_introduction() {
    let dir = TempDir::new().unwrap();
    let renderer = ScriptedRenderer::default().page(
        &url("/docs"),
        "# Intro\nHello world, this is enough content text.",
        &[],
    );

    let mut config = create_test_config(dir.path(), vec![Section::new("Root", url("/docs"))]);
    config.crawler.min_content_length = 20;
    config.crawler.max_pages = Some(1);

    let mut coordinator = Coordinator::new(config, renderer, None, false).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.scraped_count, 1);
    assert!(report.failed.is_empty());
    assert!(report.is_complete());
    assert_eq!(artifact_files(dir.path()), vec!["introduction.txt"]);

    let text = std::fs::read_to_string(dir.path().join("introduction.txt")).unwrap();
    let parsed = parse_frontmatter(&text);
    assert_eq!(parsed.get("title"), Some("Intro"));
    assert_eq!(parsed.get("path"), Some("Docs"));
    assert_eq!(parsed.get("source_url"), Some(url("/docs").as_str()));
    assert!(parsed.body.contains("Hello world"));

    let length: usize = parsed.get("content_length").unwrap().parse().unwrap();
    assert_eq!(length, parsed.body.trim_end().chars().count());

    let checkpoint = load_checkpoint(dir.path());
    assert!(checkpoint.completed);
    assert_eq!(checkpoint.scraped_count, 1);
    assert!(checkpoint.failed.is_empty());
}

#[tokio::test]
async fn test_default_threshold_skips_short_page() {
    let dir = TempDir::new().unwrap();
    let renderer = ScriptedRenderer::default().page(
        &url("/docs"),
        "# Intro\nHello world, this is enough content text.",
        &[],
    );

    let config = create_test_config(dir.path(), vec![Section::new("Root", url("/docs"))]);
    let mut coordinator = Coordinator::new(config, renderer, None, false).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.scraped_count, 0);
    assert_eq!(report.failed, vec![canonicalize(&url("/docs"))]);
    assert!(artifact_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_unrenderable_page_is_failed_and_crawl_continues() {
    let dir = TempDir::new().unwrap();
    // The renderer reports success=false for every selector on the first seed
    let renderer =
        ScriptedRenderer::default().page(&url("/docs/app/working"), &body("Working"), &[]);

    let config = create_test_config(
        dir.path(),
        vec![
            Section::new("Missing", url("/docs/app/missing")),
            Section::new("Working", url("/docs/app/working")),
        ],
    );

    let mut coordinator = Coordinator::new(config, renderer, None, false).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.failed, vec![canonicalize(&url("/docs/app/missing"))]);
    assert_eq!(report.scraped_count, 1);
    assert_eq!(artifact_files(dir.path()), vec!["app_working.txt"]);
}

#[tokio::test]
async fn test_broken_page_is_failed_and_crawl_continues() {
    let dir = TempDir::new().unwrap();
    let renderer = ScriptedRenderer::default()
        .broken(&url("/docs/app/broken"))
        .page(&url("/docs/app/working"), &body("Working"), &[]);

    let config = create_test_config(
        dir.path(),
        vec![
            Section::new("Broken", url("/docs/app/broken")),
            Section::new("Working", url("/docs/app/working")),
        ],
    );

    let mut coordinator = Coordinator::new(config, renderer, None, false).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.failed, vec![canonicalize(&url("/docs/app/broken"))]);
    assert_eq!(report.scraped_count, 1);
    assert_eq!(artifact_files(dir.path()), vec!["app_working.txt"]);
    assert_eq!(report.sections.len(), 2);
    assert_eq!(report.sections[0].failed, 1);
    assert_eq!(report.sections[1].scraped, 1);
}

#[tokio::test]
async fn test_page_shared_by_two_sections_is_scraped_once() {
    let dir = TempDir::new().unwrap();
    let renderer = Arc::new(
        ScriptedRenderer::default()
            .page(&url("/docs/app"), &body("App"), &["/docs/app/routing"])
            .page(&url("/docs/app/routing"), &body("Routing"), &[]),
    );

    let config = create_test_config(
        dir.path(),
        vec![
            Section::new("App", url("/docs/app")),
            Section::new("Routing", url("/docs/app/routing")),
        ],
    );

    let mut coordinator = Coordinator::new(config, Arc::clone(&renderer), None, false).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.scraped_count, 2);
    assert_eq!(report.sections[1].scraped, 0);
    assert_eq!(report.sections[1].duplicates, 1);
    assert_eq!(artifact_files(dir.path()), vec!["app.txt", "app_routing.txt"]);

    // Only the first section scraped the shared page
    let routing_calls = renderer
        .content_calls()
        .into_iter()
        .filter(|u| u == &url("/docs/app/routing"))
        .count();
    assert_eq!(routing_calls, 1);
}

#[tokio::test]
async fn test_budget_stops_at_exact_count() {
    let dir = TempDir::new().unwrap();
    let renderer = ScriptedRenderer::default()
        .page(
            &url("/docs/app"),
            &body("App"),
            &["/docs/app/a", "/docs/app/b", "/docs/app/c"],
        )
        .page(&url("/docs/app/a"), &body("A"), &[])
        .page(&url("/docs/app/b"), &body("B"), &[])
        .page(&url("/docs/app/c"), &body("C"), &[]);

    let mut config = create_test_config(dir.path(), vec![Section::new("App", url("/docs/app"))]);
    config.crawler.max_pages = Some(2);

    let mut coordinator = Coordinator::new(config, renderer, None, false).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.scraped_count, 2);
    assert!(report.budget_exhausted);
    assert_eq!(artifact_files(dir.path()).len(), 2);

    let checkpoint = load_checkpoint(dir.path());
    assert!(checkpoint.completed);
    assert_eq!(checkpoint.scraped_count, 2);
}

#[tokio::test]
async fn test_attempt_budget_counts_failures() {
    let dir = TempDir::new().unwrap();
    let renderer = ScriptedRenderer::default()
        .page(
            &url("/docs/app"),
            &body("App"),
            &["/docs/app/a", "/docs/app/b"],
        )
        .broken(&url("/docs/app/a"))
        .page(&url("/docs/app/b"), &body("B"), &[]);

    let mut config = create_test_config(dir.path(), vec![Section::new("App", url("/docs/app"))]);
    config.crawler.max_pages = Some(2);
    config.crawler.budget_mode = BudgetMode::Attempts;

    let mut coordinator = Coordinator::new(config, renderer, None, false).unwrap();
    let report = coordinator.run().await.unwrap();

    assert!(report.budget_exhausted);
    assert_eq!(report.scraped_count, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(coordinator.state().attempts(), 2);
}

#[tokio::test]
async fn test_checkpoints_never_regress() {
    let dir = TempDir::new().unwrap();
    let renderer = ScriptedRenderer::default()
        .page(
            &url("/docs/app"),
            &body("App"),
            &["/docs/app/a", "/docs/app/b"],
        )
        .page(&url("/docs/app/a"), &body("A"), &[])
        .page(&url("/docs/app/b"), &body("B"), &[]);

    let mut config = create_test_config(dir.path(), vec![Section::new("App", url("/docs/app"))]);
    config.crawler.checkpoint_interval = 1;

    let checkpoints = RecordingCheckpointStore::default();
    let artifacts = FsArtifactStore::new(dir.path(), CollisionPolicy::Suffix).unwrap();
    let mut coordinator = Coordinator::with_stores(
        config,
        renderer,
        Box::new(checkpoints.clone()),
        Box::new(artifacts),
        None,
        false,
    )
    .unwrap();

    coordinator.run().await.unwrap();

    let saved = checkpoints.saved.lock().unwrap();
    let counts: Vec<u32> = saved.iter().map(|c| c.scraped_count).collect();
    assert_eq!(counts, vec![1, 2, 3, 3]);
    assert!(counts.windows(2).all(|w| w[0] <= w[1]));

    let last = saved.last().unwrap();
    assert!(last.completed);
    assert!(last.completion_time.is_some());
    assert_eq!(last.sections.as_ref().map(Vec::len), Some(1));
    assert!(saved[..saved.len() - 1].iter().all(|c| !c.completed));
    assert_eq!(saved[0].section_progress.as_deref(), Some("1/1"));
}

#[tokio::test]
async fn test_resume_skips_visited_pages() {
    let dir = TempDir::new().unwrap();
    let sections = vec![
        Section::new("App", url("/docs/app")),
        Section::new("Guides", url("/docs/guides")),
    ];

    // A previous run finished the first section and was interrupted
    let previous = CrawlState::restore([canonicalize(&url("/docs/app"))], Vec::<DocUrl>::new(), 1, 1);
    JsonCheckpointStore::new(dir.path().join("_crawl_progress.json"))
        .save(&Checkpoint::progress(&previous, &sections, None))
        .unwrap();

    let renderer = Arc::new(
        ScriptedRenderer::default()
            .page(&url("/docs/app"), &body("App"), &[])
            .page(&url("/docs/guides"), &body("Guides"), &["/docs/app"]),
    );

    let config = create_test_config(dir.path(), sections);
    let mut coordinator = Coordinator::new(config, Arc::clone(&renderer), None, false).unwrap();
    assert!(coordinator.is_resumed());

    let report = coordinator.run().await.unwrap();

    assert!(report.resumed);
    assert_eq!(report.scraped_count, 2);
    assert_eq!(artifact_files(dir.path()), vec!["guides.txt"]);
    assert!(!renderer.content_calls().contains(&url("/docs/app")));
    assert!(load_checkpoint(dir.path()).completed);
}

#[tokio::test]
async fn test_cancelled_crawl_resumes_where_it_stopped() {
    let dir = TempDir::new().unwrap();
    let build_renderer = || {
        Arc::new(
            ScriptedRenderer::default()
                .page(
                    &url("/docs/app"),
                    &body("App"),
                    &["/docs/app/a", "/docs/app/b", "/docs/app/c"],
                )
                .page(&url("/docs/app/a"), &body("A"), &[])
                .page(&url("/docs/app/b"), &body("B"), &[])
                .page(&url("/docs/app/c"), &body("C"), &[]),
        )
    };
    let sections = vec![Section::new("App", url("/docs/app"))];

    // First run: shutdown arrives while the second page is being scraped
    let renderer = build_renderer();
    let mut coordinator = Coordinator::new(
        create_test_config(dir.path(), sections.clone()),
        Arc::clone(&renderer),
        None,
        false,
    )
    .unwrap();
    renderer.stop_after_content_calls(2, coordinator.shutdown_handle());

    let report = coordinator.run().await.unwrap();
    assert!(report.cancelled);
    assert_eq!(report.scraped_count, 2);
    assert_eq!(artifact_files(dir.path()), vec!["app.txt", "app_a.txt"]);

    let checkpoint = load_checkpoint(dir.path());
    assert!(!checkpoint.completed);
    assert_eq!(checkpoint.scraped_count, 2);
    assert_eq!(checkpoint.current_section_index, 0);
    assert_eq!(
        checkpoint.visited,
        vec![canonicalize(&url("/docs/app")), canonicalize(&url("/docs/app/a"))]
    );

    // Second run picks up the remaining pages only
    let renderer = build_renderer();
    let mut coordinator = Coordinator::new(
        create_test_config(dir.path(), sections),
        Arc::clone(&renderer),
        None,
        false,
    )
    .unwrap();
    assert!(coordinator.is_resumed());

    let report = coordinator.run().await.unwrap();
    assert!(report.is_complete());
    assert_eq!(report.scraped_count, 4);
    assert_eq!(report.sections[0].duplicates, 2);
    assert_eq!(
        renderer.content_calls(),
        vec![url("/docs/app/b"), url("/docs/app/c")]
    );
    assert_eq!(
        artifact_files(dir.path()),
        vec!["app.txt", "app_a.txt", "app_b.txt", "app_c.txt"]
    );
    assert!(load_checkpoint(dir.path()).completed);
}

#[tokio::test]
async fn test_fresh_run_ignores_checkpoint() {
    let dir = TempDir::new().unwrap();
    let sections = vec![Section::new("App", url("/docs/app"))];

    let previous = CrawlState::restore([canonicalize(&url("/docs/app"))], Vec::<DocUrl>::new(), 1, 0);
    JsonCheckpointStore::new(dir.path().join("_crawl_progress.json"))
        .save(&Checkpoint::progress(&previous, &sections, None))
        .unwrap();

    let renderer = ScriptedRenderer::default().page(&url("/docs/app"), &body("App"), &[]);
    let config = create_test_config(dir.path(), sections);
    let mut coordinator = Coordinator::new(config, renderer, None, true).unwrap();
    assert!(!coordinator.is_resumed());

    let report = coordinator.run().await.unwrap();
    assert_eq!(report.scraped_count, 1);
    assert_eq!(artifact_files(dir.path()), vec!["app.txt"]);
}

#[tokio::test]
async fn test_filename_collision_gets_suffix() {
    let dir = TempDir::new().unwrap();
    let renderer = ScriptedRenderer::default()
        .page(
            &url("/docs/app"),
            &body("App"),
            &["/docs/app/a-b", "/docs/app/a_b"],
        )
        .page(&url("/docs/app/a-b"), &body("Dashed"), &[])
        .page(&url("/docs/app/a_b"), &body("Underscored"), &[]);

    let config = create_test_config(dir.path(), vec![Section::new("App", url("/docs/app"))]);
    let mut coordinator = Coordinator::new(config, renderer, None, false).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.scraped_count, 3);
    assert_eq!(
        artifact_files(dir.path()),
        vec!["app.txt", "app_a_b.txt", "app_a_b_2.txt"]
    );

    let sources: Vec<String> = ["app_a_b.txt", "app_a_b_2.txt"]
        .iter()
        .map(|name| {
            let text = std::fs::read_to_string(dir.path().join(name)).unwrap();
            parse_frontmatter(&text).get("source_url").unwrap().to_string()
        })
        .collect();
    assert_ne!(sources[0], sources[1]);
}

#[tokio::test]
async fn test_every_artifact_has_wellformed_frontmatter() {
    let dir = TempDir::new().unwrap();
    let renderer = ScriptedRenderer::default()
        .page(
            &url("/docs/app"),
            &body("App"),
            &["/docs/app/building-your-application"],
        )
        .page(
            &url("/docs/app/building-your-application"),
            "# Building \"Your\" App\n\nSee [routing](https://site.test/docs/app/routing) for \
             everything about building and shipping applications.",
            &[],
        );

    let config = create_test_config(dir.path(), vec![Section::new("App", url("/docs/app"))]);
    let mut coordinator = Coordinator::new(config, renderer, None, false).unwrap();
    coordinator.run().await.unwrap();

    for name in artifact_files(dir.path()) {
        let text = std::fs::read_to_string(dir.path().join(&name)).unwrap();
        assert!(text.starts_with("---\n"), "{} lacks frontmatter", name);

        let parsed = parse_frontmatter(&text);
        for key in ["title", "path", "source_url", "scraped_date", "content_length"] {
            assert!(parsed.get(key).is_some(), "{} missing {}", name, key);
        }
        assert!(!parsed.body.contains("https://"), "{} kept a URL", name);
    }

    let text = std::fs::read_to_string(dir.path().join("app_building_your_application.txt")).unwrap();
    let parsed = parse_frontmatter(&text);
    assert_eq!(parsed.get("path"), Some("App / Building Your Application"));
    assert_eq!(parsed.get("title"), Some("Building 'Your' App"));
}
