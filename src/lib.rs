//! Image Gleaner: finds image links on a web page and downloads them
//!
//! This crate watches a page for `<a>` links pointing at image files, keeps a
//! per-link download control and a bulk download control in sync with what
//! the page currently shows, and downloads images in staggered batches with
//! a single completion notification per batch.

pub mod config;
pub mod download;
pub mod notify;
pub mod overlay;
pub mod page;
pub mod scanner;
pub mod session;
pub mod url;

use thiserror::Error;

/// Main error type for Image Gleaner operations
#[derive(Debug, Error)]
pub enum GleanerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Page error: {0}")]
    Page(#[from] PageError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// Errors raised while loading a page to scan
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Request to {url} failed: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Expected HTML from {url}, got {content_type}")]
    ContentMismatch { url: String, content_type: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid page location: {0}")]
    InvalidLocation(String),
}

/// Result type alias for Image Gleaner operations
pub type Result<T> = std::result::Result<T, GleanerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for page loading
pub type PageResult<T> = std::result::Result<T, PageError>;

// Re-export commonly used types
pub use config::Config;
pub use download::{DownloadCoordinator, DownloadOutcome};
pub use scanner::{scan, CandidateSet};
pub use url::{is_domain_allowed, is_image_url};
