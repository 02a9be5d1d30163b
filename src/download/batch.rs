use crate::download::provider::DownloadOutcome;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Identifier of a download batch
pub type BatchId = u64;

/// Counters for one group of downloads triggered together
///
/// `remaining` starts at `total` and is decremented once per terminal
/// outcome. The decrement that reaches zero completes the batch, and only
/// that caller receives the [`BatchReport`]. Decrement-and-check is a
/// single atomic operation, so completions may arrive from any thread in
/// any order.
#[derive(Debug)]
pub struct DownloadBatch {
    id: BatchId,
    total: usize,
    remaining: AtomicUsize,
    failed: AtomicUsize,
    had_failure: AtomicBool,
    started_at: DateTime<Utc>,
}

impl DownloadBatch {
    pub fn new(id: BatchId, total: usize) -> Self {
        Self {
            id,
            total,
            remaining: AtomicUsize::new(total),
            failed: AtomicUsize::new(0),
            had_failure: AtomicBool::new(false),
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> BatchId {
        self.id
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::SeqCst)
    }

    pub fn had_failure(&self) -> bool {
        self.had_failure.load(Ordering::SeqCst)
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Records the terminal outcome of one item
    ///
    /// Returns the report when this outcome completes the batch. Outcomes
    /// recorded after completion are ignored.
    pub fn record(&self, outcome: &DownloadOutcome) -> Option<BatchReport> {
        if !outcome.is_success() {
            // Must be visible before the decrement that may complete the batch
            self.failed.fetch_add(1, Ordering::SeqCst);
            self.had_failure.store(true, Ordering::SeqCst);
        }

        let previous = match self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |r| r.checked_sub(1))
        {
            Ok(previous) => previous,
            Err(_) => {
                tracing::warn!("Batch {} received an outcome after completing", self.id);
                return None;
            }
        };

        if previous == 1 {
            Some(self.report())
        } else {
            None
        }
    }

    fn report(&self) -> BatchReport {
        BatchReport {
            id: self.id,
            total: self.total,
            failed: self.failed.load(Ordering::SeqCst),
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Final tally of a completed batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub id: BatchId,
    pub total: usize,
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.total - self.failed
    }

    pub fn had_failure(&self) -> bool {
        self.failed > 0
    }

    /// The aggregate message shown to the user
    pub fn message(&self) -> String {
        if self.had_failure() {
            "Download completed with some errors".to_string()
        } else {
            format!("All {} images downloaded successfully!", self.total)
        }
    }
}
