//! Page module: loading and modelling the page being watched
//!
//! This module contains:
//! - The document model (anchors with stable identities)
//! - HTTP fetching of page HTML
//! - Page sources that reload the page on every scan

mod document;
mod fetcher;
mod source;

pub use document::{Anchor, AnchorKey, Document};
pub use fetcher::{build_http_client, fetch_page, FetchedPage};
pub use source::{open_source, FilePageSource, HttpPageSource, PageSource};
