//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made by Image Gleaner:
//! - Building the shared HTTP client with a proper user agent string
//! - Fetching page HTML for scanning
//! - Error classification into [`PageError`]

use crate::config::UserAgentConfig;
use crate::PageError;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed when loading a page or image
const MAX_REDIRECTS: usize = 10;

/// A page body together with the URL it was finally served from
#[derive(Debug)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,

    /// Page body content
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use image_gleaner::config::UserAgentConfig;
/// use image_gleaner::page::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    // Format: Name/Version
    let user_agent = format!("{}/{}", config.name, config.version);

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page for scanning
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with HTML (or no) Content-Type | `Ok(FetchedPage)` |
/// | 2xx with other Content-Type | `PageError::ContentMismatch` |
/// | Non-2xx status | `PageError::HttpStatus` |
/// | Timeout, connection or body error | `PageError::Network` |
pub async fn fetch_page(client: &Client, url: &Url) -> Result<FetchedPage, PageError> {
    let network = |source: reqwest::Error| PageError::Network {
        url: url.to_string(),
        source,
    };

    let response = client.get(url.clone()).send().await.map_err(network)?;

    let status = response.status();
    let final_url = response.url().clone();

    if !status.is_success() {
        return Err(PageError::HttpStatus {
            url: final_url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_html_content_type(&content_type) {
        return Err(PageError::ContentMismatch {
            url: final_url.to_string(),
            content_type,
        });
    }

    let body = response.text().await.map_err(network)?;

    Ok(FetchedPage { final_url, body })
}

/// Returns true for HTML media types, or when the server sent none
fn is_html_content_type(content_type: &str) -> bool {
    let lower = content_type.to_lowercase();
    lower.is_empty() || lower.contains("text/html") || lower.contains("application/xhtml+xml")
}
