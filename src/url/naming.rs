//! Deterministic artifact naming derived from URL structure

use crate::url::canonicalize;

/// Extension appended to every artifact filename
pub const ARTIFACT_EXTENSION: &str = "txt";

/// Filename stem used whenever nothing better can be derived
pub const FALLBACK_STEM: &str = "unknown";

/// Breadcrumb label of the documentation root page
pub const DEFAULT_ROOT_LABEL: &str = "Documentation";

const INTRODUCTION_STEM: &str = "introduction";
const INDEX_STEM: &str = "index";

/// Titles too generic to name the root page after
const GENERIC_TITLES: &[&str] = &[
    "documentation",
    "docs",
    "home",
    "intro",
    "introduction",
    "overview",
];

/// Derives the artifact filename for a page
///
/// The path below `/docs/` is flattened into a stem: `/` and `-` become `_`,
/// runs of `_` collapse, and leading/trailing `_` are trimmed. The docs root
/// itself is named after its title, or `introduction` when the title is
/// generic. URLs outside `/docs` fall back to `unknown`. The result always ends
/// in [`ARTIFACT_EXTENSION`].
///
/// # Examples
///
/// ```
/// use docs_harvest::url::derive_filename;
///
/// assert_eq!(
///     derive_filename("https://nextjs.org/docs/app/api-reference/next-config-js", "next.config.js"),
///     "app_api_reference_next_config_js.txt"
/// );
/// assert_eq!(derive_filename("https://nextjs.org/docs", "Intro"), "introduction.txt");
/// assert_eq!(derive_filename("https://nextjs.org/blog", "Blog"), "unknown.txt");
/// ```
pub fn derive_filename(url: &str, page_title: &str) -> String {
    let stem = match docs_relative_path(url) {
        None => FALLBACK_STEM.to_string(),
        Some(rest) if rest.is_empty() => title_stem(page_title),
        Some(rest) => {
            let stem = slugify(&rest);
            if stem.is_empty() {
                INDEX_STEM.to_string()
            } else {
                stem
            }
        }
    };

    format!("{}.{}", stem, ARTIFACT_EXTENSION)
}

/// Derives the human-readable breadcrumb for a page
///
/// ```
/// use docs_harvest::url::derive_breadcrumb;
///
/// assert_eq!(
///     derive_breadcrumb("https://nextjs.org/docs/app/building-your-application", "Docs"),
///     "App / Building Your Application"
/// );
/// assert_eq!(derive_breadcrumb("https://nextjs.org/docs", "Docs"), "Docs");
/// ```
pub fn derive_breadcrumb(url: &str, root_label: &str) -> String {
    match docs_relative_path(url) {
        Some(rest) if !rest.is_empty() => rest
            .split('/')
            .filter(|part| !part.is_empty())
            .map(|part| title_case(&part.replace('-', " ")))
            .collect::<Vec<_>>()
            .join(" / "),
        _ => root_label.to_string(),
    }
}

/// Derives a title from the last path segment (`"Unknown"` if there is none)
pub fn derive_url_title(url: &str) -> String {
    let canonical = canonicalize(url);
    canonical
        .path()
        .rsplit('/')
        .find(|part| !part.is_empty())
        .map(|part| title_case(&part.replace('-', " ")))
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Turns free text into a filename-safe stem
///
/// `/`, `-`, whitespace, and any other character that is not alphanumeric,
/// `_` or `.` become `_`; runs of `_` collapse and the ends are trimmed.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let mapped = if c.is_alphanumeric() || c == '.' { c } else { '_' };
        if mapped == '_' && out.ends_with('_') {
            continue;
        }
        out.push(mapped);
    }
    out.trim_matches(|c| c == '_' || c == '.').to_string()
}

/// Title-cases text: every alphabetic run starts upper-case, the rest lower-case
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Returns the part of the URL path below the docs root
///
/// `Some("")` for the docs root itself, `None` when the URL is not under it.
fn docs_relative_path(url: &str) -> Option<String> {
    let canonical = canonicalize(url);
    let path = canonical.path();

    // The first `/docs/` wins, so a trailing `docs` segment is an ordinary page
    if let Some(idx) = path.find("/docs/") {
        return Some(path[idx + "/docs/".len()..].trim_matches('/').to_string());
    }

    path.ends_with("/docs").then(String::new)
}

fn title_stem(page_title: &str) -> String {
    let lowered = page_title.trim().to_lowercase();
    if lowered.is_empty()
        || GENERIC_TITLES.contains(&lowered.as_str())
        || lowered.ends_with(" documentation")
    {
        return INTRODUCTION_STEM.to_string();
    }

    let stem = slugify(&lowered);
    if stem.is_empty() {
        INTRODUCTION_STEM.to_string()
    } else {
        stem
    }
}
