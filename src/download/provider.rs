//! Download provider interface and the best-effort fallback provider

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// One image to download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Image URL
    pub url: String,

    /// Name to save the image under (already percent-decoded)
    pub filename: String,
}

/// Terminal result of one download request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The image was saved (`path` is `None` when the provider cannot tell where)
    Success { path: Option<PathBuf> },

    /// The image could not be saved
    Failure { reason: String },
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Performs downloads outside of page navigation
///
/// Every call to [`download`](DownloadProvider::download) must resolve to
/// exactly one outcome. Providers never prompt for a save location.
#[async_trait]
pub trait DownloadProvider: Send + Sync {
    /// Downloads one image
    async fn download(&self, request: DownloadRequest) -> DownloadOutcome;

    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Waits for transfers the provider is still running in the background
    async fn flush(&self) {}
}

/// Fallback provider used when no download API with completion reporting
/// is available
///
/// Each request is handed to a detached task and reported as a success
/// straight away, since there is no completion signal to wait for. Real
/// failures are only logged.
pub struct BestEffortProvider {
    inner: Arc<dyn DownloadProvider>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl BestEffortProvider {
    /// Wraps the provider that performs the actual transfer
    pub fn new(inner: Arc<dyn DownloadProvider>) -> Self {
        Self {
            inner,
            pending: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DownloadProvider for BestEffortProvider {
    async fn download(&self, request: DownloadRequest) -> DownloadOutcome {
        let inner = self.inner.clone();
        let handle = tokio::spawn(async move {
            let url = request.url.clone();
            if let DownloadOutcome::Failure { reason } = inner.download(request).await {
                tracing::warn!("Background download of {} failed: {}", url, reason);
            }
        });

        if let Ok(mut pending) = self.pending.lock() {
            pending.retain(|h| !h.is_finished());
            pending.push(handle);
        }

        DownloadOutcome::Success { path: None }
    }

    fn name(&self) -> &'static str {
        "best-effort"
    }

    async fn flush(&self) {
        let handles: Vec<JoinHandle<()>> = match self.pending.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(_) => return,
        };

        for handle in handles {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DownloadProvider for FailingProvider {
        async fn download(&self, _request: DownloadRequest) -> DownloadOutcome {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            self.calls.fetch_add(1, Ordering::SeqCst);
            DownloadOutcome::Failure {
                reason: "HTTP 404".to_string(),
            }
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn request(name: &str) -> DownloadRequest {
        DownloadRequest {
            url: format!("https://example.com/{}", name),
            filename: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_best_effort_reports_success_immediately() {
        let inner = Arc::new(FailingProvider {
            calls: AtomicUsize::new(0),
        });
        let provider = BestEffortProvider::new(inner.clone());

        let outcome = provider.download(request("a.png")).await;
        assert_eq!(outcome, DownloadOutcome::Success { path: None });
        assert_eq!(inner.calls.load(Ordering::SeqCst), 0);

        provider.flush().await;
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_flush_waits_for_every_transfer() {
        let inner = Arc::new(FailingProvider {
            calls: AtomicUsize::new(0),
        });
        let provider = BestEffortProvider::new(inner.clone());

        for name in ["a.png", "b.png", "c.png"] {
            provider.download(request(name)).await;
        }
        provider.flush().await;

        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_outcome_is_success() {
        assert!(DownloadOutcome::Success { path: None }.is_success());
        assert!(!DownloadOutcome::Failure {
            reason: "x".to_string()
        }
        .is_success());
    }
}
