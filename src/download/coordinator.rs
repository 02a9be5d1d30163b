//! Download coordinator - batch dispatch and completion tracking
//!
//! This module turns user actions into download batches:
//! - Deriving filenames and building provider requests
//! - Staggering the start of successive batch items
//! - Counting terminal outcomes per batch
//! - Emitting exactly one aggregate notification per batch

use crate::download::batch::{BatchId, BatchReport, DownloadBatch};
use crate::download::provider::{DownloadOutcome, DownloadProvider, DownloadRequest};
use crate::notify::Notifier;
use crate::url::filename_from_url;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;

/// Everything the items of one batch share
struct BatchRun {
    batch: DownloadBatch,
    provider: Arc<dyn DownloadProvider>,
    notifier: Arc<dyn Notifier>,
    done: Mutex<Option<oneshot::Sender<BatchReport>>>,
}

impl BatchRun {
    /// Runs one item: waits for its start time, downloads, records the outcome
    async fn run_item(self: Arc<Self>, url: String, start_at: Instant) -> DownloadOutcome {
        tokio::time::sleep_until(start_at).await;

        let request = DownloadRequest {
            filename: filename_from_url(&url),
            url,
        };
        tracing::debug!(
            "Batch {}: downloading {} as {:?}",
            self.batch.id(),
            request.url,
            request.filename
        );

        let outcome = self.provider.download(request).await;
        self.complete_item(&outcome);
        outcome
    }

    fn complete_item(&self, outcome: &DownloadOutcome) {
        let Some(report) = self.batch.record(outcome) else {
            return;
        };

        tracing::info!(
            "Batch {} finished: {} of {} images saved",
            report.id,
            report.succeeded(),
            report.total
        );
        self.notifier.notify(&report.message());

        let sender = match self.done.lock() {
            Ok(mut done) => done.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(sender) = sender {
            // Nobody waiting on the handle is fine
            let _ = sender.send(report);
        }
    }
}

/// Handle to a dispatched batch
///
/// The batch runs to completion whether or not the handle is kept.
#[derive(Debug)]
pub struct BatchHandle {
    id: BatchId,
    total: usize,
    report: oneshot::Receiver<BatchReport>,
}

impl BatchHandle {
    pub fn id(&self) -> BatchId {
        self.id
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Waits until every item has a terminal outcome
    ///
    /// Returns `None` only if the batch's tasks were torn down early, for
    /// example when the runtime shuts down.
    pub async fn wait(self) -> Option<BatchReport> {
        self.report.await.ok()
    }
}

/// Issues downloads and reports batch completion
///
/// Every download belongs to its own batch with its own counters, so
/// batches that overlap in time never affect each other's notification.
pub struct DownloadCoordinator {
    provider: Arc<dyn DownloadProvider>,
    notifier: Arc<dyn Notifier>,
    stagger: Duration,
    next_batch_id: AtomicU64,
}

impl DownloadCoordinator {
    /// Creates a new coordinator
    ///
    /// # Arguments
    ///
    /// * `provider` - Performs the individual downloads
    /// * `notifier` - Receives the aggregate message of each batch
    /// * `stagger` - Delay between the starts of successive batch items
    pub fn new(
        provider: Arc<dyn DownloadProvider>,
        notifier: Arc<dyn Notifier>,
        stagger: Duration,
    ) -> Self {
        Self {
            provider,
            notifier,
            stagger,
            next_batch_id: AtomicU64::new(1),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    fn start_batch(&self, total: usize) -> (Arc<BatchRun>, oneshot::Receiver<BatchReport>) {
        let id = self.next_batch_id.fetch_add(1, Ordering::SeqCst);
        let (sender, receiver) = oneshot::channel();

        let run = Arc::new(BatchRun {
            batch: DownloadBatch::new(id, total),
            provider: self.provider.clone(),
            notifier: self.notifier.clone(),
            done: Mutex::new(Some(sender)),
        });

        (run, receiver)
    }

    /// Downloads a single image as a batch of one
    ///
    /// Completion goes through the same notification path as bulk batches.
    pub async fn download_one(&self, url: &str) -> DownloadOutcome {
        let (run, _report) = self.start_batch(1);
        tracing::info!(
            "Batch {}: downloading 1 image via {}",
            run.batch.id(),
            self.provider.name()
        );

        run.run_item(url.to_string(), Instant::now()).await
    }

    /// Dispatches a batch and returns without waiting for it
    ///
    /// Item `n` (0-based) starts no earlier than `n × stagger` after the
    /// call; once started, items run concurrently and may finish in any
    /// order. An empty list creates no batch.
    ///
    /// Must be called from within a tokio runtime.
    pub fn download_batch(&self, urls: Vec<String>) -> Option<BatchHandle> {
        if urls.is_empty() {
            return None;
        }

        let total = urls.len();
        let (run, report) = self.start_batch(total);
        let id = run.batch.id();
        tracing::info!(
            "Batch {}: downloading {} images via {}, {:?} apart",
            id,
            total,
            self.provider.name(),
            self.stagger
        );

        let started = Instant::now();
        for (index, url) in urls.into_iter().enumerate() {
            let start_at = item_start(started, self.stagger, index);
            tokio::spawn(run.clone().run_item(url, start_at));
        }

        Some(BatchHandle { id, total, report })
    }

    /// Waits for transfers the provider still runs in the background
    pub async fn flush(&self) {
        self.provider.flush().await;
    }
}

/// Start time of the `index`th batch item; saturates instead of overflowing
fn item_start(started: Instant, stagger: Duration, index: usize) -> Instant {
    let delay = stagger.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX));
    started
        .checked_add(delay)
        .unwrap_or_else(|| started + FAR_FUTURE)
}

/// Stand-in for start times that do not fit in an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Submitted(String, Duration),
        Completed(String),
        Notified(String),
    }

    type EventLog = Arc<Mutex<Vec<Event>>>;

    /// Provider whose items take a scripted time and outcome
    struct ScriptedProvider {
        script: HashMap<String, (Duration, bool)>,
        origin: Instant,
        log: EventLog,
    }

    #[async_trait]
    impl DownloadProvider for ScriptedProvider {
        async fn download(&self, request: DownloadRequest) -> DownloadOutcome {
            self.log.lock().unwrap().push(Event::Submitted(
                request.filename.clone(),
                Instant::now() - self.origin,
            ));

            let (delay, ok) = self
                .script
                .get(&request.url)
                .copied()
                .unwrap_or((Duration::ZERO, true));
            tokio::time::sleep(delay).await;

            self.log
                .lock()
                .unwrap()
                .push(Event::Completed(request.filename.clone()));

            if ok {
                DownloadOutcome::Success { path: None }
            } else {
                DownloadOutcome::Failure {
                    reason: "scripted failure".to_string(),
                }
            }
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    struct LogNotifier {
        log: EventLog,
    }

    impl Notifier for LogNotifier {
        fn notify(&self, message: &str) {
            self.log
                .lock()
                .unwrap()
                .push(Event::Notified(message.to_string()));
        }
    }

    fn url(name: &str) -> String {
        format!("https://img.example.com/{}", name)
    }

    fn coordinator(script: &[(&str, u64, bool)]) -> (DownloadCoordinator, EventLog) {
        let log: EventLog = Arc::new(Mutex::new(Vec::new()));
        let provider = ScriptedProvider {
            script: script
                .iter()
                .map(|(name, ms, ok)| (url(name), (Duration::from_millis(*ms), *ok)))
                .collect(),
            origin: Instant::now(),
            log: log.clone(),
        };
        let notifier = LogNotifier { log: log.clone() };
        let coordinator = DownloadCoordinator::new(
            Arc::new(provider),
            Arc::new(notifier),
            Duration::from_millis(500),
        );
        (coordinator, log)
    }

    fn completions_and_notices(log: &EventLog) -> Vec<Event> {
        log.lock()
            .unwrap()
            .iter()
            .filter(|e| !matches!(e, Event::Submitted(..)))
            .cloned()
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_reverse_completion_single_notification() {
        // Starts at 0, 500, 1000ms; finishes at 3000, 2500, 1010ms
        let (coordinator, log) =
            coordinator(&[("1.png", 3000, true), ("2.png", 2000, true), ("3.png", 10, true)]);

        let handle = coordinator
            .download_batch(vec![url("1.png"), url("2.png"), url("3.png")])
            .unwrap();
        let report = handle.wait().await.unwrap();

        assert_eq!(
            completions_and_notices(&log),
            vec![
                Event::Completed("3.png".to_string()),
                Event::Completed("2.png".to_string()),
                Event::Completed("1.png".to_string()),
                Event::Notified("All 3 images downloaded successfully!".to_string()),
            ]
        );
        assert_eq!(report.total, 3);
        assert!(!report.had_failure());
    }

    #[tokio::test(start_paused = true)]
    async fn test_middle_failure_degrades_message() {
        let (coordinator, log) =
            coordinator(&[("1.png", 10, true), ("2.png", 10, false), ("3.png", 10, true)]);

        let report = coordinator
            .download_batch(vec![url("1.png"), url("2.png"), url("3.png")])
            .unwrap()
            .wait()
            .await
            .unwrap();

        assert_eq!(report.failed, 1);
        let notices: Vec<Event> = completions_and_notices(&log)
            .into_iter()
            .filter(|e| matches!(e, Event::Notified(_)))
            .collect();
        assert_eq!(
            notices,
            vec![Event::Notified(
                "Download completed with some errors".to_string()
            )]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_items_are_staggered() {
        let (coordinator, log) = coordinator(&[]);
        let urls: Vec<String> = (0..4).map(|i| url(&format!("{}.png", i))).collect();

        coordinator.download_batch(urls).unwrap().wait().await.unwrap();

        let submissions: Vec<(String, Duration)> = log
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                Event::Submitted(name, at) => Some((name.clone(), *at)),
                _ => None,
            })
            .collect();

        assert_eq!(submissions.len(), 4);
        for (name, at) in submissions {
            let index: u32 = name.trim_end_matches(".png").parse().unwrap();
            assert!(
                at >= Duration::from_millis(500) * index,
                "{} submitted after {:?}",
                name,
                at
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_batches_are_independent() {
        let (coordinator, log) = coordinator(&[
            ("a1.png", 4000, true),
            ("a2.png", 4000, true),
            ("b1.png", 10, false),
        ]);

        let first = coordinator
            .download_batch(vec![url("a1.png"), url("a2.png")])
            .unwrap();
        let second = coordinator.download_batch(vec![url("b1.png")]).unwrap();
        assert_ne!(first.id(), second.id());

        let second_report = second.wait().await.unwrap();
        let first_report = first.wait().await.unwrap();

        assert_eq!(second_report.total, 1);
        assert!(second_report.had_failure());
        assert_eq!(first_report.total, 2);
        assert!(!first_report.had_failure());

        let notices: Vec<Event> = completions_and_notices(&log)
            .into_iter()
            .filter(|e| matches!(e, Event::Notified(_)))
            .collect();
        assert_eq!(
            notices,
            vec![
                Event::Notified("Download completed with some errors".to_string()),
                Event::Notified("All 2 images downloaded successfully!".to_string()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_one_uses_batch_path() {
        let (coordinator, log) = coordinator(&[("cat%20pic.png", 10, true)]);

        let outcome = coordinator.download_one(&url("cat%20pic.png")).await;

        assert!(outcome.is_success());
        assert_eq!(
            completions_and_notices(&log),
            vec![
                Event::Completed("cat pic.png".to_string()),
                Event::Notified("All 1 images downloaded successfully!".to_string()),
            ]
        );
    }

    #[test]
    fn test_item_start_saturates() {
        let started = Instant::now();
        let stagger = Duration::from_millis(500);

        assert_eq!(item_start(started, stagger, 0), started);
        assert_eq!(
            item_start(started, stagger, 3),
            started + Duration::from_millis(1500)
        );

        let huge = item_start(started, stagger, usize::MAX);
        assert_eq!(huge, started + stagger * u32::MAX);
        assert!(item_start(started, Duration::MAX, 2) > started);
    }

    #[tokio::test]
    async fn test_empty_batch_creates_nothing() {
        let (coordinator, log) = coordinator(&[]);
        assert_eq!(coordinator.provider_name(), "scripted");
        assert!(coordinator.download_batch(Vec::new()).is_none());
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_completes_without_handle() {
        let (coordinator, log) = coordinator(&[("x.png", 100, true)]);

        drop(coordinator.download_batch(vec![url("x.png")]));
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(log
            .lock()
            .unwrap()
            .contains(&Event::Notified("All 1 images downloaded successfully!".to_string())));
    }
}
