//! Artifact rendering and frontmatter parsing
//!
//! An artifact is a text file made of a frontmatter block followed by a blank
//! line and the cleaned page body:
//!
//! ```text
//! ---
//! title: "Caching"
//! path: "App / Guides / Caching"
//! source_url: "https://nextjs.org/docs/app/guides/caching"
//! scraped_date: "2024-05-01 12:00:00"
//! content_length: 1234
//! ---
//!
//! ...body...
//! ```

use crate::url::DocUrl;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Timestamp format of the `scraped_date` field
pub const SCRAPED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DELIMITER: &str = "---";

/// One scraped page, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub filename: String,
    pub title: String,
    pub breadcrumb: String,
    pub source_url: DocUrl,
    pub scraped_at: DateTime<Utc>,
    pub content: String,
}

impl Artifact {
    /// Length of the body in characters
    pub fn content_length(&self) -> usize {
        self.content.chars().count()
    }

    /// Renders the file contents
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.content.len() + 256);
        out.push_str(DELIMITER);
        out.push('\n');
        out.push_str(&format!("title: \"{}\"\n", quoted_value(&self.title)));
        out.push_str(&format!("path: \"{}\"\n", quoted_value(&self.breadcrumb)));
        out.push_str(&format!("source_url: \"{}\"\n", self.source_url));
        out.push_str(&format!(
            "scraped_date: \"{}\"\n",
            self.scraped_at.format(SCRAPED_DATE_FORMAT)
        ));
        out.push_str(&format!("content_length: {}\n", self.content_length()));
        out.push_str(DELIMITER);
        out.push_str("\n\n");
        out.push_str(&self.content);
        out
    }
}

/// Frontmatter values must stay on one line and inside their quotes
fn quoted_value(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '"' => '\'',
            '\n' | '\r' => ' ',
            c => c,
        })
        .collect()
}

/// An artifact read back from disk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArtifact {
    pub metadata: BTreeMap<String, String>,
    pub body: String,
}

impl ParsedArtifact {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// Parses frontmatter-delimited text into metadata and body
///
/// Keys and values are trimmed and surrounding double quotes are stripped.
/// Text without a leading `---` block yields empty metadata and the whole
/// text as body.
///
/// # Examples
///
/// ```
/// use docs_harvest::output::parse_frontmatter;
///
/// let parsed = parse_frontmatter("---\ntitle: \"Intro\"\ncontent_length: 5\n---\n\nHello");
/// assert_eq!(parsed.get("title"), Some("Intro"));
/// assert_eq!(parsed.get("content_length"), Some("5"));
/// assert_eq!(parsed.body, "Hello");
/// ```
pub fn parse_frontmatter(text: &str) -> ParsedArtifact {
    let Some(rest) = text.strip_prefix(DELIMITER) else {
        return ParsedArtifact {
            metadata: BTreeMap::new(),
            body: text.trim().to_string(),
        };
    };

    let Some((header, body)) = rest.split_once(DELIMITER) else {
        return ParsedArtifact {
            metadata: BTreeMap::new(),
            body: text.trim().to_string(),
        };
    };

    let metadata = header
        .trim()
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| {
            (
                key.trim().to_string(),
                value.trim().trim_matches('"').to_string(),
            )
        })
        .collect();

    ParsedArtifact {
        metadata,
        body: body.trim().to_string(),
    }
}
