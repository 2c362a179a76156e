use crate::url::DocUrl;

/// Path rewrites applied during canonicalization: legacy router pages are
/// folded onto their app-router equivalents so both spellings dedup together.
const PATH_REWRITES: &[(&str, &str)] = &[("/docs/pages/", "/docs/app/")];

/// Canonicalizes a raw URL string into the form used for every equality check
///
/// # Canonicalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Drop the fragment (everything from `#`)
/// 3. Drop the query string (everything from `?`)
/// 4. Strip trailing slashes and any whitespace mixed in with them
/// 5. Rewrite `/docs/pages/` segments to `/docs/app/` (a trailing `/docs/pages`
///    segment is rewritten as well)
///
/// The function never fails and is idempotent.
///
/// # Examples
///
/// ```
/// use docs_harvest::url::canonicalize;
///
/// let url = canonicalize("https://x/docs/pages/a/b/?q=1#frag");
/// assert_eq!(url.as_str(), "https://x/docs/app/a/b");
/// assert_eq!(canonicalize(url.as_str()), url);
/// ```
pub fn canonicalize(raw: &str) -> DocUrl {
    let trimmed = raw.trim();

    // Steps 2 & 3: split yields at least one piece, so the prefix always exists
    let without_fragment = trimmed.split('#').next().unwrap_or_default();
    let without_query = without_fragment.split('?').next().unwrap_or_default();

    // Step 4, together with whitespace left in front of the stripped parts
    let mut url = without_query
        .trim_end_matches(|c: char| c == '/' || c.is_whitespace())
        .to_string();

    // Step 5
    for (from, to) in PATH_REWRITES {
        if url.contains(from) {
            url = url.replace(from, to);
        }

        let from_tail = from.trim_end_matches('/');
        if url.ends_with(from_tail) {
            let keep = url.len() - from_tail.len();
            url = format!("{}{}", &url[..keep], to.trim_end_matches('/'));
        }
    }

    DocUrl::from_canonical(url)
}
