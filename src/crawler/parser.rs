//! HTML link extraction
//!
//! This module parses fetched HTML and returns the hyperlinks a crawl may
//! follow: absolute, fragment-free, and on the same origin as the page.

use crate::url::{canonicalize, same_origin};
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Extracts same-origin links from HTML content
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document, resolved against `base_url`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - Fragment-only links (same page anchors)
/// - Links whose scheme, host or port differ from `base_url`
///
/// Fragments are stripped from the results, and duplicates collapse since the
/// result is a set.
///
/// # Example
///
/// ```
/// use navtree::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/about">About</a><a href="https://other.com/">Elsewhere</a>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let links = extract_links(html, &base_url);
/// assert_eq!(links.len(), 1);
/// assert!(links.contains("https://example.com/about"));
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> BTreeSet<String> {
    let document = Html::parse_document(html);
    let mut links = BTreeSet::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        // Skip if it has the download attribute
        if element.value().attr("download").is_some() {
            continue;
        }

        if let Some(href) = element.value().attr("href") {
            if let Some(absolute_url) = resolve_link(href, base_url) {
                links.insert(absolute_url);
            }
        }
    }

    links
}

/// Resolves a link href to an absolute same-origin URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) or cross-origin URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
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

    let joined = base_url.join(href).ok()?;
    let absolute_url = canonicalize(joined.as_str()).ok()?;

    if same_origin(base_url, &absolute_url) {
        Some(absolute_url.to_string())
    } else {
        None
    }
}
