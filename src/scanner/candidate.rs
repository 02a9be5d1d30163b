use crate::page::AnchorKey;
use std::collections::HashSet;

/// An image link found on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    /// The image URL
    pub url: String,

    /// The anchor the URL came from
    pub anchor: AnchorKey,
}

/// The distinct image URLs visible at one scan instant
///
/// URLs keep the order in which they first appear in the document, which is
/// also the order a bulk download submits them in.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    urls: Vec<String>,
    seen: HashSet<String>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a URL, returning false if it was already present
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if !self.seen.insert(url.clone()) {
            return false;
        }
        self.urls.push(url);
        true
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// URLs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }

    pub fn into_urls(self) -> Vec<String> {
        self.urls
    }
}

impl FromIterator<String> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = Self::new();
        for url in iter {
            set.insert(url);
        }
        set
    }
}
