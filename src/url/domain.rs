use url::Url;

/// Extracts the domain from a page URL
///
/// The host is lowercased. URLs without a host (`file://` pages, for
/// instance) yield `None`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use image_gleaner::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("file:///tmp/page.html").unwrap();
/// assert_eq!(extract_domain(&url), None);
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}
