/// Derives a download filename from a URL
///
/// Takes everything after the last `/` and percent-decodes it. A segment
/// that is not valid percent-encoded UTF-8 is returned as-is. The result is
/// not sanitised; callers writing to disk must do that themselves.
///
/// # Examples
///
/// ```
/// use image_gleaner::url::filename_from_url;
///
/// assert_eq!(filename_from_url("https://x/a/cat%20pic.png"), "cat pic.png");
/// assert_eq!(filename_from_url("https://x/"), "");
/// ```
pub fn filename_from_url(url: &str) -> String {
    let segment = url.rsplit('/').next().unwrap_or(url);

    match urlencoding::decode(segment) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => segment.to_string(),
    }
}
