//! Configuration module for Image Gleaner
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional. Missing keys fall back to defaults: every
//! domain allowed, `fileThumb` exclusion class, 2 second scans, 500ms
//! stagger and 5 second notifications.
//!
//! # Example
//!
//! ```no_run
//! use image_gleaner::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("gleaner.toml")).unwrap();
//! println!("Scanning every {}ms", config.scanner.scan_interval);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, DownloadConfig, DownloadMode, NotificationConfig, ScannerConfig, UserAgentConfig,
    WILDCARD_DOMAIN,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
