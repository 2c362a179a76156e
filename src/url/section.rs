use crate::url::DocUrl;

/// Path of the documentation root page
pub const DOCS_ROOT_PATH: &str = "/docs";

/// Checks whether a URL belongs to the section seeded at `section_seed`
///
/// Both URLs must share the same origin. A seed whose path is exactly
/// [`DOCS_ROOT_PATH`] is a single page: it matches only itself. Any other seed
/// matches its own path and every path below it, compared segment-wise so
/// that `/docs/app/guides` does not match `/docs/app/guides-extra`.
///
/// # Examples
///
/// ```
/// use docs_harvest::url::{belongs_to_section, canonicalize};
///
/// let seed = canonicalize("https://x/docs/app/guides");
/// assert!(belongs_to_section(&canonicalize("https://x/docs/app/guides/sub"), &seed));
/// assert!(!belongs_to_section(&canonicalize("https://x/docs/app/guides-extra"), &seed));
/// ```
pub fn belongs_to_section(url: &DocUrl, section_seed: &DocUrl) -> bool {
    if url.origin() != section_seed.origin() {
        return false;
    }

    let url_path = url.path();
    let seed_path = section_seed.path();

    if seed_path == DOCS_ROOT_PATH {
        return url_path == DOCS_ROOT_PATH;
    }

    url_path == seed_path
        || url_path
            .strip_prefix(seed_path)
            .is_some_and(|rest| rest.starts_with('/'))
}
