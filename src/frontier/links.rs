//! Candidate link collection for discovery

use crate::renderer::RenderResult;
use crate::url::{resolve_link, DocUrl};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use url::Url;

static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());

/// Collects the canonical same-origin links of a rendered page
///
/// Unions the renderer's internal-link list with links parsed out of the
/// markdown body. Both are resolved against `page`, the canonical URL, which
/// has no trailing slash. Renderers should report absolute hrefs, resolved
/// against the URL the page was actually served from; [`HttpRenderer`] does.
///
/// [`HttpRenderer`]: crate::renderer::HttpRenderer
pub fn candidate_links(result: &RenderResult, page: &Url, origin: &Url) -> BTreeSet<DocUrl> {
    let structured = result.internal_links.iter().map(|link| link.href.as_str());
    let inline = MARKDOWN_LINK
        .captures_iter(&result.markdown)
        .filter_map(|caps| caps.get(2))
        .map(|m| m.as_str());

    structured
        .chain(inline)
        .filter_map(|href| resolve_link(href, page, origin))
        .collect()
}
