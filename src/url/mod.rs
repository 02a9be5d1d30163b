//! URL handling module for Image Gleaner
//!
//! This module provides image URL classification, domain extraction,
//! allow-list matching, and filename derivation for downloads.

mod classifier;
mod domain;
mod filename;
mod matcher;

use crate::config::WILDCARD_DOMAIN;

// Re-export main functions
pub use classifier::{is_image_url, IMAGE_EXTENSIONS};
pub use domain::extract_domain;
pub use filename::filename_from_url;
pub use matcher::matches_domain;

/// Decides whether scanning is active on the given host
///
/// The allow-list entry `"*"` enables every host. Otherwise the host must
/// equal an entry or be a subdomain of one.
///
/// # Arguments
///
/// * `current_host` - The lowercase host of the page being scanned
/// * `allow_list` - The configured allow-list
///
/// # Examples
///
/// ```
/// use image_gleaner::url::is_domain_allowed;
///
/// let allow = vec!["example.com".to_string()];
/// assert!(is_domain_allowed("example.com", &allow));
/// assert!(is_domain_allowed("img.example.com", &allow));
/// assert!(!is_domain_allowed("evilexample.com", &allow));
/// assert!(is_domain_allowed("anything.org", &["*".to_string()]));
/// ```
pub fn is_domain_allowed(current_host: &str, allow_list: &[String]) -> bool {
    if allow_list.iter().any(|entry| entry == WILDCARD_DOMAIN) {
        return true;
    }

    allow_list
        .iter()
        .any(|entry| matches_domain(entry, current_host))
}
