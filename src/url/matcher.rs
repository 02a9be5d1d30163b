/// Checks if a host matches an allow-list entry
///
/// A host matches when it equals the entry, or when it is a subdomain of the
/// entry (ends with `"." + entry`). There is no explicit wildcard syntax:
/// every entry implicitly covers its subdomains.
///
/// # Examples
///
/// ```
/// use image_gleaner::url::matches_domain;
///
/// assert!(matches_domain("example.com", "example.com"));
/// assert!(matches_domain("example.com", "blog.example.com"));
/// assert!(matches_domain("example.com", "api.v2.example.com"));
/// assert!(!matches_domain("example.com", "myexample.com"));
/// ```
pub fn matches_domain(entry: &str, host: &str) -> bool {
    if host == entry {
        return true;
    }

    // An empty entry would otherwise match any host ending in a dot
    if entry.is_empty() {
        return false;
    }

    host.ends_with(&format!(".{}", entry))
}
