/// File extensions recognised as downloadable images
pub const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".tiff", ".svg",
];

/// Checks whether a URL denotes a downloadable image
///
/// The whole URL string is compared case-insensitively against
/// [`IMAGE_EXTENSIONS`] by suffix. Query strings and fragments are not
/// stripped, so `a.png?x=1` is not an image link.
///
/// # Examples
///
/// ```
/// use image_gleaner::url::is_image_url;
///
/// assert!(is_image_url("https://x/a.PNG"));
/// assert!(!is_image_url("https://x/a.png?x=1"));
/// assert!(!is_image_url(""));
/// ```
pub fn is_image_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_extension_matches() {
        for ext in IMAGE_EXTENSIONS {
            let url = format!("https://example.com/picture{}", ext);
            assert!(is_image_url(&url), "expected {} to match", url);
        }
    }

    #[test]
    fn test_uppercase_extension() {
        assert!(is_image_url("https://x/a.PNG"));
        assert!(is_image_url("https://x/photo.JpEg"));
    }

    #[test]
    fn test_query_string_does_not_match() {
        assert!(!is_image_url("https://x/a.png?x=1"));
        assert!(!is_image_url("https://x/a.jpg#top"));
    }

    #[test]
    fn test_non_image_extensions() {
        assert!(!is_image_url("https://x/page.html"));
        assert!(!is_image_url("https://x/video.webm"));
        assert!(!is_image_url("https://x/archive.tif"));
        assert!(!is_image_url("https://x/"));
    }

    #[test]
    fn test_extension_must_be_suffix() {
        assert!(!is_image_url("https://x/a.png/view"));
        assert!(!is_image_url("https://x/apng"));
    }

    #[test]
    fn test_empty_and_bare_extension() {
        assert!(!is_image_url(""));
        assert!(is_image_url(".gif"));
    }
}
