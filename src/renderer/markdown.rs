//! HTML to markdown conversion
//!
//! This module turns a fetched HTML document into the lightweight markdown
//! the extraction pipeline consumes:
//! - Narrowing to the configured selector
//! - Dropping excluded tags and selectors
//! - Converting headings, paragraphs, lists, code and links
//! - Splitting `a[href]` links into internal and external sets

use crate::renderer::{RenderConfig, RenderError, RenderResult, RenderedLink};
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;
use url::Url;

/// Tags never rendered, whatever the configuration says
const ALWAYS_SKIPPED: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Tags rendered as standalone blocks
const BLOCK_TAGS: &[&str] = &[
    "p",
    "div",
    "section",
    "article",
    "main",
    "aside",
    "blockquote",
    "figure",
    "table",
    "thead",
    "tbody",
    "ul",
    "ol",
    "dl",
    "dt",
    "dd",
    "header",
    "footer",
    "nav",
    "details",
    "summary",
];

/// Renders an HTML document under `config`
///
/// # Arguments
///
/// * `html` - The HTML content
/// * `page_url` - The URL the document was fetched from, used to resolve links
/// * `origin` - The site origin separating internal from external links
/// * `config` - Selector, exclusions and thresholds to apply
///
/// # Returns
///
/// * `Ok(RenderResult)` - `success == false` when the selector matches nothing
///   or the text has fewer words than `config.min_word_count`
/// * `Err(RenderError)` - A configured selector could not be parsed
///
/// # Example
///
/// ```
/// use docs_harvest::renderer::{render_html, RenderConfig};
/// use url::Url;
///
/// let html = r#"<html><body><main><h1>Intro</h1><p>Hello <a href="/docs/a">world</a></p></main></body></html>"#;
/// let page = Url::parse("https://ex.org/docs").unwrap();
/// let origin = Url::parse("https://ex.org").unwrap();
///
/// let result = render_html(html, &page, &origin, &RenderConfig::metadata("main")).unwrap();
/// assert!(result.success);
/// assert!(result.markdown.starts_with("# Intro"));
/// assert_eq!(result.internal_links[0].href, "https://ex.org/docs/a");
/// ```
pub fn render_html(
    html: &str,
    page_url: &Url,
    origin: &Url,
    config: &RenderConfig,
) -> Result<RenderResult, RenderError> {
    let document = Html::parse_document(html);

    let scope = match &config.selector {
        Some(selector) => {
            let parsed = parse_selector(selector)?;
            match document.select(&parsed).next() {
                Some(element) => element,
                None => {
                    tracing::debug!("Selector '{}' matched nothing on {}", selector, page_url);
                    return Ok(RenderResult::failed());
                }
            }
        }
        None => document.root_element(),
    };

    let mut exclusions = Vec::new();
    for tag in &config.excluded_tags {
        exclusions.push(parse_selector(tag)?);
    }
    for selector in &config.excluded_selectors {
        exclusions.push(parse_selector(selector)?);
    }

    let excluded_ids: HashSet<_> = exclusions
        .iter()
        .flat_map(|selector| document.select(selector))
        .map(|element| element.id())
        .collect();
    let is_excluded = |element: &ElementRef| {
        excluded_ids.contains(&element.id())
            || ALWAYS_SKIPPED.contains(&element.value().name())
    };

    let mut writer = MarkdownWriter::new(page_url);
    writer.element(scope, &is_excluded);
    let markdown = writer.finish();

    let (internal_links, external_links) =
        collect_links(scope, page_url, origin, config.exclude_external_links, &is_excluded);

    let words = markdown.split_whitespace().count();
    let success = words > 0 && words >= config.min_word_count;
    if !success {
        tracing::debug!(
            "Render of {} produced {} words (minimum {})",
            page_url,
            words,
            config.min_word_count
        );
    }

    Ok(RenderResult {
        success,
        markdown,
        internal_links,
        external_links,
    })
}

fn parse_selector(selector: &str) -> Result<Selector, RenderError> {
    Selector::parse(selector).map_err(|_| RenderError::InvalidSelector {
        selector: selector.to_string(),
    })
}

/// Splits the `a[href]` links under `scope` into internal and external sets
fn collect_links<'a, F>(
    scope: ElementRef<'a>,
    page_url: &Url,
    origin: &Url,
    exclude_external: bool,
    is_excluded: &F,
) -> (Vec<RenderedLink>, Vec<RenderedLink>)
where
    F: Fn(&ElementRef<'a>) -> bool,
{
    let mut internal = Vec::new();
    let mut external = Vec::new();
    let mut seen = HashSet::new();

    let Ok(anchor) = Selector::parse("a[href]") else {
        return (internal, external);
    };

    for element in scope.select(&anchor) {
        if element.ancestors().filter_map(ElementRef::wrap).any(|a| is_excluded(&a))
            || is_excluded(&element)
        {
            continue;
        }

        let Some(absolute) = element.value().attr("href").and_then(|h| absolute_href(h, page_url))
        else {
            continue;
        };

        if !seen.insert(absolute.to_string()) {
            continue;
        }

        if absolute.origin() == origin.origin() {
            internal.push(RenderedLink::new(absolute.as_str()));
        } else if !exclude_external {
            external.push(RenderedLink::new(absolute.as_str()));
        }
    }

    (internal, external)
}

/// Resolves an href to an absolute http(s) URL
fn absolute_href(href: &str, page_url: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let absolute = page_url.join(href).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(absolute),
        _ => None,
    }
}

/// Accumulates markdown while walking the DOM
struct MarkdownWriter<'u> {
    out: String,
    page_url: &'u Url,
}

impl<'u> MarkdownWriter<'u> {
    fn new(page_url: &'u Url) -> Self {
        Self {
            out: String::new(),
            page_url,
        }
    }

    fn element<'a, F>(&mut self, element: ElementRef<'a>, is_excluded: &F)
    where
        F: Fn(&ElementRef<'a>) -> bool,
    {
        if is_excluded(&element) {
            return;
        }

        let name = element.value().name();
        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse::<usize>().unwrap_or(1);
                self.block_break();
                self.out.push_str(&"#".repeat(level));
                self.out.push(' ');
                self.children(element, is_excluded);
                self.block_break();
            }
            "li" => {
                self.line_break();
                self.out.push_str("- ");
                self.children(element, is_excluded);
                self.line_break();
            }
            "tr" => {
                self.line_break();
                self.children(element, is_excluded);
                self.line_break();
            }
            "td" | "th" => {
                self.children(element, is_excluded);
                self.space();
            }
            "pre" => {
                let code: String = element.text().collect();
                self.block_break();
                self.out.push_str("```\n");
                self.out.push_str(code.trim_end_matches('\n'));
                self.out.push_str("\n```");
                self.block_break();
            }
            "code" => {
                let code: String = element.text().collect();
                let code = code.trim();
                if !code.is_empty() {
                    self.out.push('`');
                    self.out.push_str(code);
                    self.out.push('`');
                }
            }
            "a" => self.link(element, is_excluded),
            "br" => self.line_break(),
            "hr" => self.block_break(),
            "img" | "svg" | "iframe" | "input" | "select" => {}
            _ if BLOCK_TAGS.contains(&name) => {
                self.block_break();
                self.children(element, is_excluded);
                self.block_break();
            }
            _ => self.children(element, is_excluded),
        }
    }

    fn children<'a, F>(&mut self, element: ElementRef<'a>, is_excluded: &F)
    where
        F: Fn(&ElementRef<'a>) -> bool,
    {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.text(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.element(child, is_excluded);
                    }
                }
                _ => {}
            }
        }
    }

    fn link<'a, F>(&mut self, element: ElementRef<'a>, is_excluded: &F)
    where
        F: Fn(&ElementRef<'a>) -> bool,
    {
        let mut inner = MarkdownWriter::new(self.page_url);
        inner.children(element, is_excluded);
        let label = inner.finish();
        let label = label.split_whitespace().collect::<Vec<_>>().join(" ");

        if label.is_empty() {
            return;
        }

        match element
            .value()
            .attr("href")
            .and_then(|h| absolute_href(h, self.page_url))
        {
            Some(target) => {
                self.out.push('[');
                self.out.push_str(&label);
                self.out.push_str("](");
                self.out.push_str(target.as_str());
                self.out.push(')');
            }
            None => self.text(&label),
        }
    }

    /// Appends text with whitespace runs collapsed to one space
    fn text(&mut self, text: &str) {
        for c in text.chars() {
            if c.is_whitespace() {
                self.space();
            } else {
                self.out.push(c);
            }
        }
    }

    fn space(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with(' ') && !self.out.ends_with('\n') {
            self.out.push(' ');
        }
    }

    fn line_break(&mut self) {
        self.trim_trailing_spaces();
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn block_break(&mut self) {
        self.trim_trailing_spaces();
        if self.out.is_empty() || self.out.ends_with("\n\n") {
            return;
        }
        if self.out.ends_with('\n') {
            self.out.push('\n');
        } else {
            self.out.push_str("\n\n");
        }
    }

    fn trim_trailing_spaces(&mut self) {
        let trimmed = self.out.trim_end_matches(' ').len();
        self.out.truncate(trimmed);
    }

    fn finish(self) -> String {
        let mut lines = Vec::new();
        let mut blank_run = 0;
        for line in self.out.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                blank_run += 1;
                if blank_run > 1 {
                    continue;
                }
            } else {
                blank_run = 0;
            }
            lines.push(line);
        }
        lines.join("\n").trim().to_string()
    }
}
