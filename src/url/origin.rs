use crate::UrlError;
use url::Url;

/// Parses a URL into the form used as a crawl dedup key
///
/// The URL must be absolute, use HTTP or HTTPS, and carry a host. The
/// fragment is dropped since `/page#a` and `/page#b` name the same document;
/// everything else is kept as the URL parser serializes it.
///
/// # Examples
///
/// ```
/// use navtree::url::canonicalize;
///
/// let url = canonicalize("https://Example.com/docs#intro").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs");
/// ```
pub fn canonicalize(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);
    Ok(url)
}

/// Returns true when both URLs share scheme, host and effective port
///
/// # Examples
///
/// ```
/// use url::Url;
/// use navtree::url::same_origin;
///
/// let base = Url::parse("https://example.com/a").unwrap();
/// assert!(same_origin(&base, &Url::parse("https://example.com/b?q=1").unwrap()));
/// assert!(!same_origin(&base, &Url::parse("http://example.com/a").unwrap()));
/// assert!(!same_origin(&base, &Url::parse("https://blog.example.com/").unwrap()));
/// ```
pub fn same_origin(base: &Url, candidate: &Url) -> bool {
    base.scheme() == candidate.scheme()
        && host_key(base).is_some()
        && host_key(base) == host_key(candidate)
        && base.port_or_known_default() == candidate.port_or_known_default()
}

fn host_key(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_canonicalize_strips_fragment() {
        let url = canonicalize("https://example.com/page#section").unwrap();
        assert_eq!(url.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_canonicalize_keeps_query() {
        let url = canonicalize("https://example.com/search?q=rust").unwrap();
        assert_eq!(url.as_str(), "https://example.com/search?q=rust");
    }

    #[test]
    fn test_canonicalize_rejects_other_schemes() {
        assert!(matches!(
            canonicalize("ftp://example.com/file"),
            Err(UrlError::InvalidScheme(_))
        ));
        assert!(matches!(
            canonicalize("mailto:someone@example.com"),
            Err(UrlError::InvalidScheme(_))
        ));
    }

    #[test]
    fn test_canonicalize_rejects_relative() {
        assert!(matches!(canonicalize("/relative"), Err(UrlError::Parse(_))));
    }

    #[test]
    fn test_same_origin_paths_and_queries() {
        let base = parse("https://example.com/");
        assert!(same_origin(&base, &parse("https://example.com/deep/page")));
        assert!(same_origin(&base, &parse("https://EXAMPLE.com/?a=b")));
    }

    #[test]
    fn test_same_origin_default_port() {
        let base = parse("https://example.com/");
        assert!(same_origin(&base, &parse("https://example.com:443/x")));
        assert!(!same_origin(&base, &parse("https://example.com:8443/x")));
    }

    #[test]
    fn test_cross_origin() {
        let base = parse("https://example.com/");
        assert!(!same_origin(&base, &parse("http://example.com/")));
        assert!(!same_origin(&base, &parse("https://other.com/")));
        assert!(!same_origin(&base, &parse("https://www.example.com/")));
    }
}
