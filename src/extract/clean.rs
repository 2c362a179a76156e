//! Text post-processing for rendered markdown

use regex::Regex;
use std::sync::LazyLock;

/// Title used when a page yields no heading or text line
pub const DEFAULT_TITLE: &str = "Documentation";

static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());

static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"{}|\\^`\[\]]*"#).unwrap());

static LEVEL_ONE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#\s+(.+)$").unwrap());

/// Unwraps markdown links to their text, then drops bare URLs
///
/// ```
/// use docs_harvest::extract::clean_markdown;
///
/// let cleaned = clean_markdown("See [the guide](https://x/docs/guide) or https://x/raw.");
/// assert_eq!(cleaned, "See the guide or .");
/// ```
pub fn clean_markdown(text: &str) -> String {
    let unwrapped = MARKDOWN_LINK.replace_all(text, "$1");
    BARE_URL.replace_all(&unwrapped, "").into_owned()
}

/// Picks a page title from rendered markdown
///
/// The first level-1 heading wins. Otherwise the first non-empty line with
/// leading `#` removed, and finally [`DEFAULT_TITLE`].
pub fn extract_title(markdown: &str) -> String {
    if let Some(caps) = LEVEL_ONE_HEADING.captures(markdown) {
        let title = caps[1].trim();
        if !title.is_empty() {
            return title.to_string();
        }
    }

    markdown
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.trim_start_matches('#').trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}
