//! Topic link recognition and canonicalization
//!
//! Topic links are recognized from their raw `href` (a path under the trend
//! prefix) and resolved against the configured site root. The canonical form
//! drops the fragment so `#section` anchors do not defeat deduplication.

use url::Url;

/// Whether `href` points to a topic page below `prefix`
///
/// The bare prefix itself (the trends index) is not a topic link.
///
/// # Examples
///
/// ```
/// use trendscope::crawler::url::is_topic_href;
///
/// assert!(is_topic_href("/trends/fashion/", "/trends/"));
/// assert!(!is_topic_href("/trends/", "/trends/"));
/// assert!(!is_topic_href("/ideas/", "/trends/"));
/// ```
pub fn is_topic_href(href: &str, prefix: &str) -> bool {
    href.starts_with(prefix) && href != prefix
}

/// Resolve `href` against `base` and strip the fragment
///
/// Returns `None` when the reference cannot be resolved.
pub fn canonicalize(base: &Url, href: &str) -> Option<Url> {
    let mut url = base.join(href).ok()?;
    url.set_fragment(None);
    Some(url)
}

/// Last non-empty segment of the path in `href`
///
/// Query strings and fragments are ignored.
///
/// # Examples
///
/// ```
/// use trendscope::crawler::url::trailing_segment;
///
/// assert_eq!(trailing_segment("/trends/home-decor/"), "home-decor");
/// assert_eq!(trailing_segment("/trends/travel?ref=nav"), "travel");
/// ```
pub fn trailing_segment(href: &str) -> String {
    let path = href
        .split(&['?', '#'][..])
        .next()
        .unwrap_or_default()
        .trim_matches('/');

    path.rsplit('/').next().unwrap_or_default().to_string()
}
