//! URL handling module for docs-harvest
//!
//! This module provides canonicalization, section classification, link resolution,
//! and the deterministic naming rules (filenames, breadcrumbs) derived from a
//! page's path.

mod naming;
mod normalize;
mod section;

use crate::{UrlError, UrlResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

// Re-export main functions
pub use naming::{
    derive_breadcrumb, derive_filename, derive_url_title, slugify, title_case, ARTIFACT_EXTENSION,
    DEFAULT_ROOT_LABEL, FALLBACK_STEM,
};
pub use normalize::canonicalize;
pub use section::{belongs_to_section, DOCS_ROOT_PATH};

/// A canonical documentation URL
///
/// Values are only produced by [`canonicalize`], so two `DocUrl`s are equal
/// iff their canonical forms are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocUrl(String);

impl DocUrl {
    pub(crate) fn from_canonical(url: String) -> Self {
        Self(url)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the path component (`""` when the URL has none)
    ///
    /// ```
    /// use docs_harvest::url::canonicalize;
    ///
    /// assert_eq!(canonicalize("https://nextjs.org/docs/app").path(), "/docs/app");
    /// assert_eq!(canonicalize("https://nextjs.org").path(), "");
    /// ```
    pub fn path(&self) -> &str {
        let after_scheme = match self.0.find("://") {
            Some(idx) => idx + 3,
            None => return self.0.as_str(),
        };

        match self.0[after_scheme..].find('/') {
            Some(idx) => &self.0[after_scheme + idx..],
            None => "",
        }
    }

    /// Returns everything before the path (`scheme://host[:port]`)
    pub fn origin(&self) -> &str {
        let path_len = self.path().len();
        &self.0[..self.0.len() - path_len]
    }

    /// Number of non-empty path segments
    pub fn segment_count(&self) -> usize {
        self.path().split('/').filter(|s| !s.is_empty()).count()
    }
}

impl fmt::Display for DocUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parses an absolute HTTP(S) URL that names a host
///
/// Used for the configured site origin and section seeds.
///
/// ```
/// use docs_harvest::url::parse_site_url;
///
/// assert!(parse_site_url("https://nextjs.org").is_ok());
/// assert!(parse_site_url("ftp://nextjs.org").is_err());
/// assert!(parse_site_url("nextjs.org/docs").is_err());
/// ```
pub fn parse_site_url(raw: &str) -> UrlResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(format!("'{}': {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlError::InvalidScheme(other.to_string())),
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Resolves a link href found on `base` into a canonical same-origin URL
///
/// Returns None if the link should be excluded:
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - Fragment-only links (same page anchors)
/// - Links that fail to resolve
/// - Links that leave the site origin
///
/// # Examples
///
/// ```
/// use docs_harvest::url::resolve_link;
/// use url::Url;
///
/// let origin = Url::parse("https://nextjs.org").unwrap();
/// let base = Url::parse("https://nextjs.org/docs/app").unwrap();
///
/// let url = resolve_link("/docs/app/guides/#intro", &base, &origin).unwrap();
/// assert_eq!(url.as_str(), "https://nextjs.org/docs/app/guides");
/// assert!(resolve_link("https://vercel.com/docs", &base, &origin).is_none());
/// ```
pub fn resolve_link(href: &str, base: &Url, origin: &Url) -> Option<DocUrl> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute = base.join(href).ok()?;
    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }

    if absolute.origin() != origin.origin() {
        return None;
    }

    Some(canonicalize(absolute.as_str()))
}
