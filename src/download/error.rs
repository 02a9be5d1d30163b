use thiserror::Error;

/// Errors raised while transferring a single image
///
/// These never leave the provider: they are turned into
/// [`DownloadOutcome::Failure`](crate::download::DownloadOutcome) and only
/// surface to the user through the batch's aggregate message.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Request to {url} failed: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Not a local file URL: {0}")]
    InvalidFileUrl(String),

    #[error("No free filename for {0} in the output directory")]
    NameExhausted(String),
}

/// Result type for download operations
pub type DownloadResult<T> = Result<T, DownloadError>;
