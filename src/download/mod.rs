//! Download module: getting images onto disk
//!
//! This module contains:
//! - The provider interface plus the HTTP and best-effort providers
//! - Per-batch completion counters
//! - The coordinator that staggers batch items and reports completion

mod batch;
mod coordinator;
mod error;
mod http;
mod provider;

pub use batch::{BatchId, BatchReport, DownloadBatch};
pub use coordinator::{BatchHandle, DownloadCoordinator};
pub use error::{DownloadError, DownloadResult};
pub use http::{sanitize_filename, HttpDownloadProvider};
pub use provider::{BestEffortProvider, DownloadOutcome, DownloadProvider, DownloadRequest};
