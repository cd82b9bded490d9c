//! `FetchExecutor`: bounded-concurrency task runner for dispatched batches.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Runs dispatched batch-fetch tasks under a concurrency cap.
///
/// Only ever driven by the single-writer scheduler loop (`try_submit` is
/// always preceded by a capacity check in that same loop iteration), so the
/// in-flight counter never races against itself despite being atomic.
pub struct FetchExecutor {
    max_concurrency: usize,
    in_flight: Arc<AtomicUsize>,
}

impl FetchExecutor {
    /// Create an executor with the given concurrency cap (floored to 1).
    pub fn new(max_concurrency: usize) -> Self {
        Self { max_concurrency: max_concurrency.max(1), in_flight: Arc::new(AtomicUsize::new(0)) }
    }

    /// The configured concurrency cap.
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Current in-flight task count.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// `true` iff there is spare concurrency to submit another task.
    pub fn has_capacity(&self) -> bool {
        self.in_flight() < self.max_concurrency
    }

    /// Start `task` via `tokio::spawn` if there is spare concurrency.
    /// Returns `false` without starting anything if the cap is already hit.
    pub fn try_submit<F>(&self, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if !self.has_capacity() {
            return false;
        }
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.in_flight.clone();
        tokio::spawn(async move {
            task.await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
        });
        true
    }
}
