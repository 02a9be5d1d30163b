//! Link scanner
//!
//! Walks the anchors of a loaded page and picks out the ones that link
//! directly to image files. Scanning only reads the document; keeping the
//! on-page controls in sync with the result is the overlay's job.

mod candidate;

pub use candidate::{CandidateLink, CandidateSet};

use crate::config::ScannerConfig;
use crate::page::{Anchor, Document};
use crate::url::is_image_url;

/// Rules deciding which anchors count as image links
#[derive(Debug, Clone)]
pub struct ScanRules {
    /// Anchors with this class link to a detail page, not a raw image
    pub thumbnail_class: String,
}

impl ScanRules {
    pub fn new(thumbnail_class: impl Into<String>) -> Self {
        Self {
            thumbnail_class: thumbnail_class.into(),
        }
    }

    /// Returns true if the anchor must be skipped regardless of its URL
    pub fn excludes(&self, anchor: &Anchor) -> bool {
        anchor.has_class(&self.thumbnail_class)
    }

    /// Returns true if the anchor is a candidate image link
    pub fn accepts(&self, anchor: &Anchor) -> bool {
        !self.excludes(anchor) && is_image_url(anchor.target())
    }
}

impl Default for ScanRules {
    fn default() -> Self {
        Self::from(&ScannerConfig::default())
    }
}

impl From<&ScannerConfig> for ScanRules {
    fn from(config: &ScannerConfig) -> Self {
        Self::new(config.thumbnail_class.clone())
    }
}

/// Lists every candidate link in document order, one entry per anchor
pub fn scan_links(document: &Document, rules: &ScanRules) -> Vec<CandidateLink> {
    document
        .anchors
        .iter()
        .filter(|anchor| {
            let accepted = rules.accepts(anchor);
            tracing::trace!("Anchor {} accepted={}", anchor.key, accepted);
            accepted
        })
        .map(|anchor| CandidateLink {
            url: anchor.target().to_string(),
            anchor: anchor.key.clone(),
        })
        .collect()
}

/// Computes the set of distinct image URLs on the page
///
/// # Example
///
/// ```
/// use image_gleaner::page::Document;
/// use image_gleaner::scanner::{scan, ScanRules};
/// use url::Url;
///
/// let html = r#"
///     <a href="/a.png">a</a>
///     <a href="/a.png">same image again</a>
///     <a class="fileThumb" href="/b.png">thumbnail</a>
///     <a href="/page.html">page</a>"#;
/// let doc = Document::parse(html, Url::parse("https://example.com/").unwrap());
/// let set = scan(&doc, &ScanRules::default());
/// assert_eq!(set.len(), 1);
/// assert!(set.contains("https://example.com/a.png"));
/// ```
pub fn scan(document: &Document, rules: &ScanRules) -> CandidateSet {
    scan_links(document, rules)
        .into_iter()
        .map(|link| link.url)
        .collect()
}
