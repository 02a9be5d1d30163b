//! HTML document model
//!
//! A [`Document`] is the parsed anchor list of one load of a page. Anchors
//! keep the identity they had on previous loads of the same page through
//! their [`AnchorKey`], which lets controls attached to them survive reloads.

use crate::url::extract_domain;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::fmt;
use url::Url;

/// Identity of an anchor across reloads of the same page
///
/// Anchors are identified by their resolved target and class list, plus the
/// position of the anchor among the anchors sharing both, in document order.
/// Adding or removing unrelated links does not change an anchor's key, and
/// neither does a thumbnail link to the same target coming or going.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorKey {
    /// Resolved target URL (empty when the anchor has no `href`)
    pub href: String,

    /// Class names, sorted and space separated
    pub classes: String,

    /// Index among anchors with the same `href` and `classes`
    pub occurrence: usize,
}

impl fmt::Display for AnchorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.classes.is_empty() {
            write!(f, "{}#{}", self.href, self.occurrence)
        } else {
            write!(f, "{} ({})#{}", self.href, self.classes, self.occurrence)
        }
    }
}

/// One `<a>` element of a loaded page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Identity of this anchor
    pub key: AnchorKey,

    /// Absolute target URL, resolved the way a browser resolves `link.href`
    pub href: Option<String>,

    /// Class names from the `class` attribute
    pub classes: Vec<String>,
}

impl Anchor {
    /// Returns the target URL, or an empty string for anchors without `href`
    pub fn target(&self) -> &str {
        self.href.as_deref().unwrap_or("")
    }

    /// Returns true if the anchor carries the given class
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// A parsed page: its location and every anchor in document order
#[derive(Debug, Clone)]
pub struct Document {
    /// Location the document was loaded from (after redirects)
    pub url: Url,

    /// All anchors, in document order
    pub anchors: Vec<Anchor>,
}

impl Document {
    /// Parses HTML content into a document
    ///
    /// Every `<a>` element is kept, including those without `href`.
    /// Relative targets are resolved against `<base href>` when present,
    /// otherwise against `url`. Targets that cannot be resolved are kept
    /// verbatim. Query strings and fragments are preserved.
    ///
    /// # Example
    ///
    /// ```
    /// use image_gleaner::page::Document;
    /// use url::Url;
    ///
    /// let html = r#"<a href="/img/cat.png">cat</a><a class="fileThumb" href="b.jpg">b</a>"#;
    /// let url = Url::parse("https://example.com/board/").unwrap();
    /// let doc = Document::parse(html, url);
    /// assert_eq!(doc.anchors.len(), 2);
    /// assert_eq!(doc.anchors[0].target(), "https://example.com/img/cat.png");
    /// assert_eq!(doc.anchors[1].target(), "https://example.com/board/b.jpg");
    /// assert!(doc.anchors[1].has_class("fileThumb"));
    /// ```
    pub fn parse(html: &str, url: Url) -> Self {
        let html = Html::parse_document(html);
        let base = extract_base(&html, &url);

        let mut occurrences: HashMap<(String, String), usize> = HashMap::new();
        let mut anchors = Vec::new();

        if let Ok(a_selector) = Selector::parse("a") {
            for element in html.select(&a_selector) {
                let href = element
                    .value()
                    .attr("href")
                    .map(|raw| resolve_href(raw, &base));

                let classes: Vec<String> = element
                    .value()
                    .classes()
                    .map(|c| c.to_string())
                    .collect();

                let mut key_classes = classes.clone();
                key_classes.sort();
                key_classes.dedup();
                let key_href = href.clone().unwrap_or_default();
                let key_classes = key_classes.join(" ");
                let occurrence = occurrences
                    .entry((key_href.clone(), key_classes.clone()))
                    .or_insert(0);
                let key = AnchorKey {
                    href: key_href,
                    classes: key_classes,
                    occurrence: *occurrence,
                };
                *occurrence += 1;

                anchors.push(Anchor {
                    key,
                    href,
                    classes,
                });
            }
        }

        Self { url, anchors }
    }

    /// Returns the lowercase host of the page, or an empty string if it has none
    pub fn host(&self) -> String {
        extract_domain(&self.url).unwrap_or_default()
    }

    /// Finds an anchor by key
    pub fn anchor(&self, key: &AnchorKey) -> Option<&Anchor> {
        self.anchors.iter().find(|a| &a.key == key)
    }
}

/// Determines the base URL for relative links
fn extract_base(html: &Html, url: &Url) -> Url {
    let Ok(base_selector) = Selector::parse("base[href]") else {
        return url.clone();
    };

    html.select(&base_selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| url.join(href.trim()).ok())
        .unwrap_or_else(|| url.clone())
}

/// Resolves an `href` attribute against the base URL
///
/// Mirrors `HTMLAnchorElement.href`: surrounding whitespace is stripped and
/// an unresolvable value is returned unchanged.
fn resolve_href(raw: &str, base: &Url) -> String {
    let href = raw.trim();

    match base.join(href) {
        Ok(absolute) => absolute.to_string(),
        Err(_) => href.to_string(),
    }
}
