//! Progress reporting for conversion runs.
//!
//! Workers bump atomic counters; an optional reporter thread polls them and
//! invokes a callback, so the hot path never touches the display.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Point-in-time view of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub total: usize,
    /// Sources whose processing finished (converted, failed or unchanged).
    pub processed: usize,
    pub persisted: usize,
}

/// Callback invoked by the reporter thread.
pub type ProgressCallback = Box<dyn Fn(ProgressSnapshot) + Send + Sync>;

/// Shared progress counters.
#[derive(Debug, Default)]
pub struct ConversionProgress {
    total: AtomicUsize,
    processed: AtomicUsize,
    persisted: AtomicUsize,
    done: AtomicBool,
}

impl ConversionProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_total(&self, total: usize) {
        self.total.store(total, Ordering::SeqCst);
    }

    pub fn source_processed(&self) {
        self.processed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn add_processed(&self, count: usize) {
        self.processed.fetch_add(count, Ordering::SeqCst);
    }

    pub fn output_persisted(&self) {
        self.persisted.fetch_add(1, Ordering::SeqCst);
    }

    pub fn signal_done(&self) {
        self.done.store(true, Ordering::SeqCst);
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total: self.total.load(Ordering::SeqCst),
            processed: self.processed.load(Ordering::SeqCst),
            persisted: self.persisted.load(Ordering::SeqCst),
        }
    }
}

/// Background thread that polls [`ConversionProgress`] and reports it.
pub struct ProgressReporter {
    handle: Option<JoinHandle<()>>,
    progress: Arc<ConversionProgress>,
}

impl ProgressReporter {
    pub fn start(
        progress: Arc<ConversionProgress>,
        callback: ProgressCallback,
        poll_interval: Duration,
    ) -> Self {
        let polled = Arc::clone(&progress);
        let handle = thread::Builder::new()
            .name("ddsforge-progress".to_string())
            .spawn(move || {
                while !polled.is_done() {
                    callback(polled.snapshot());
                    thread::sleep(poll_interval);
                }
                // Final report
                callback(polled.snapshot());
            })
            .ok();

        Self { handle, progress }
    }

    /// Start a reporter with the default 100ms poll interval.
    pub fn start_default(progress: Arc<ConversionProgress>, callback: ProgressCallback) -> Self {
        Self::start(progress, callback, Duration::from_millis(100))
    }

    /// Signal completion and wait for the final report.
    pub fn finish(mut self) {
        self.progress.signal_done();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.progress.signal_done();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
