//! The single writer thread.
//!
//! Owns the [`OutputSink`](super::sink::OutputSink) for the whole run. It is
//! spawned before any worker so finished containers never wait for a sink to
//! exist, and it is the only thread that touches the output.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::error::ConvertError;
use super::progress::ConversionProgress;
use super::queue::{PendingQueue, Popped};
use super::sink::{OutputTarget, SinkError};

/// How long the writer waits on the queue before re-checking it.
pub const POP_WAIT: Duration = Duration::from_millis(50);

/// What the writer did during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterReport {
    pub persisted: u64,
    /// Items that could not be persisted; each was logged.
    pub failed: u64,
    pub bytes_written: u64,
}

/// Handle to the running writer thread.
pub struct WriteCoordinator {
    handle: JoinHandle<Result<WriterReport, SinkError>>,
}

impl WriteCoordinator {
    /// Start the writer thread.
    ///
    /// The sink is opened on the new thread. If that fails, `stop` is raised
    /// so workers wind down, and the error is returned from [`join`](Self::join).
    pub fn spawn(
        target: OutputTarget,
        queue: Arc<PendingQueue>,
        stop: Arc<AtomicBool>,
        progress: Arc<ConversionProgress>,
    ) -> Result<Self, ConvertError> {
        let handle = thread::Builder::new()
            .name("ddsforge-writer".to_string())
            .spawn(move || write_loop(&target, &queue, &stop, &progress))
            .map_err(|source| ConvertError::Spawn {
                name: "writer",
                source,
            })?;
        Ok(Self { handle })
    }

    /// Wait for the writer to drain the closed queue and close the sink.
    pub fn join(self) -> Result<WriterReport, ConvertError> {
        let report = self
            .handle
            .join()
            .map_err(|_| ConvertError::WriterPanicked)??;
        Ok(report)
    }
}

fn write_loop(
    target: &OutputTarget,
    queue: &PendingQueue,
    stop: &AtomicBool,
    progress: &ConversionProgress,
) -> Result<WriterReport, SinkError> {
    let mut sink = match target.open() {
        Ok(sink) => sink,
        Err(e) => {
            error!(output = %target.path().display(), error = %e, "Failed to open output");
            stop.store(true, Ordering::SeqCst);
            let discarded = discard_pending(queue);
            if discarded > 0 {
                warn!(discarded, "Discarded encoded outputs, output could not be opened");
            }
            return Err(e);
        }
    };
    info!(output = %sink.describe(), "Writer started");

    let mut report = WriterReport::default();
    loop {
        match queue.pop_timeout(POP_WAIT) {
            Popped::Item(item) => match sink.persist(&item) {
                Ok(()) => {
                    report.persisted += 1;
                    report.bytes_written += item.len() as u64;
                    progress.output_persisted();
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(path = %item.path, error = %e, "Failed to persist output");
                }
            },
            Popped::Empty => continue,
            Popped::Drained => break,
        }
    }

    debug!(
        persisted = report.persisted,
        failed = report.failed,
        "Queue drained, closing output"
    );
    sink.finish()?;
    Ok(report)
}

/// Consume the queue until the pool closes it, returning how many items
/// were dropped.
fn discard_pending(queue: &PendingQueue) -> usize {
    let mut discarded = 0;
    loop {
        match queue.pop_timeout(POP_WAIT) {
            Popped::Item(_) => discarded += 1,
            Popped::Empty => continue,
            Popped::Drained => return discarded,
        }
    }
}
