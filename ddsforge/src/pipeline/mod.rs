//! The conversion pipeline.
//!
//! ```text
//!  scan ──► checksum filter ──► WorkerPool (N threads) ──► PendingQueue ──► writer ──► sink
//!                                     │                                      │
//!                                     └──► StatsAggregator    ConversionProgress ◄┘
//! ```
//!
//! [`Converter::plan`] resolves the input and output once; [`Converter::run`]
//! spawns the writer, runs the pool to completion, joins the writer and
//! updates the checksum cache.

mod error;
mod progress;
mod queue;
mod sink;
mod stats;
mod worker;
mod writer;

pub use error::ConvertError;
pub use progress::{ConversionProgress, ProgressCallback, ProgressReporter, ProgressSnapshot};
pub use queue::{EncodedOutput, PendingQueue, Popped};
pub use sink::{
    DirectorySink, MemoryZipSink, OutputSink, OutputTarget, SinkError, ZipFileSink,
    CAPACITY_WARNING_RATIO,
};
pub use stats::{RunStats, StatsAggregator};
pub use worker::{encode_frame, prepare_options, EncodedFrame, FrameError, WorkerPool};
pub use writer::{WriteCoordinator, WriterReport, POP_WAIT};

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::backend::BackendRegistry;
use crate::cache::{checksum_sources, ChecksumCache};
use crate::config::ConversionConfig;
use crate::source::{default_output_dir, scan_sources, SourceFile};

/// Inputs and output of a run, resolved before any work starts.
#[derive(Debug, Clone)]
pub struct ConversionPlan {
    pub input: PathBuf,
    pub target: OutputTarget,
    pub sources: Vec<SourceFile>,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub stats: RunStats,
    pub writer: WriterReport,
    pub elapsed: Duration,
    pub target: OutputTarget,
}

impl RunReport {
    /// Number of files written to the output.
    pub fn files_exported(&self) -> u64 {
        self.writer.persisted
    }
}

/// Decide the output target for `input`.
///
/// An explicit output with an archive extension becomes a ZIP (in memory when
/// a memory bound is configured); any other explicit output is a directory.
/// Without an output, a directory named `output_dir_name` next to the input
/// is used.
pub fn resolve_target(
    input: &Path,
    output: Option<&Path>,
    config: &ConversionConfig,
) -> OutputTarget {
    let Some(output) = output else {
        return OutputTarget::Directory(default_output_dir(input, config));
    };

    let is_archive = output
        .extension()
        .map(|ext| config.is_archive_extension(&ext.to_string_lossy()))
        .unwrap_or(false);
    if !is_archive {
        return OutputTarget::Directory(output.to_path_buf());
    }

    let path = output.to_path_buf();
    let prefix = config.archive_prefix.clone();
    match config.memory_archive {
        Some(capacity) => OutputTarget::MemoryArchive {
            path,
            prefix,
            capacity,
        },
        None => OutputTarget::Archive { path, prefix },
    }
}

/// Runs conversions with a fixed configuration and backend set.
pub struct Converter {
    config: ConversionConfig,
    backends: BackendRegistry,
    stop: Arc<AtomicBool>,
}

impl Converter {
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            config,
            backends: BackendRegistry::new(),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that makes workers stop claiming sources when raised.
    ///
    /// Sources already being converted are finished and written.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Replace the backend set.
    pub fn with_backends(mut self, backends: BackendRegistry) -> Self {
        self.backends = backends;
        self
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Scan the input and pick the output. Fails if nothing can be converted.
    pub fn plan(
        &self,
        input: &Path,
        output: Option<&Path>,
    ) -> Result<ConversionPlan, ConvertError> {
        let sources = scan_sources(input, &self.config)?;
        let target = resolve_target(input, output, &self.config);
        info!(
            input = %input.display(),
            output = %target.path().display(),
            sources = sources.len(),
            "Planned conversion"
        );
        Ok(ConversionPlan {
            input: input.to_path_buf(),
            target,
            sources,
        })
    }

    /// Execute a plan, reporting through `progress`.
    pub fn run(
        &self,
        plan: ConversionPlan,
        progress: &Arc<ConversionProgress>,
    ) -> Result<RunReport, ConvertError> {
        let started = Instant::now();
        let ConversionPlan {
            target, sources, ..
        } = plan;
        progress.set_total(sources.len());

        let mut cache = self.open_cache(&target)?;
        let checksums = match cache {
            Some(_) => checksum_sources(&sources),
            None => Vec::new(),
        };

        let mut pending = Vec::with_capacity(sources.len());
        let mut pending_sums = Vec::with_capacity(sources.len());
        let mut unchanged = 0u64;
        for (index, source) in sources.into_iter().enumerate() {
            let checksum = checksums.get(index).cloned().flatten();
            let skip = match (&cache, &checksum) {
                (Some(cache), Some(sum)) => cache.is_unchanged(&source.relative_path(), sum),
                _ => false,
            };
            if skip {
                unchanged += 1;
            } else {
                pending.push(source);
                pending_sums.push(checksum);
            }
        }
        progress.add_processed(unchanged as usize);
        if unchanged > 0 {
            info!(unchanged, "Skipping unchanged sources");
        }

        let queue = Arc::new(PendingQueue::new());
        let stop = Arc::clone(&self.stop);
        let stats = StatsAggregator::new();

        let writer = WriteCoordinator::spawn(
            target.clone(),
            Arc::clone(&queue),
            Arc::clone(&stop),
            Arc::clone(progress),
        )?;
        let pool = WorkerPool::new(
            &self.config,
            &self.backends,
            &queue,
            &stats,
            progress,
            &stop,
        );
        let pool_result = pool.run(&pending);
        let writer_result = writer.join();
        let complete = pool_result?;
        let writer_report = writer_result?;

        if let Some(cache) = cache.as_mut() {
            if writer_report.failed > 0 {
                warn!(
                    failed = writer_report.failed,
                    "Not updating checksum cache after write failures"
                );
            } else {
                for index in complete {
                    if let Some(sum) = &pending_sums[index] {
                        cache.record(pending[index].relative_path(), sum.clone());
                    }
                }
                if let Err(e) = cache.save() {
                    warn!(error = %e, "Failed to save checksum cache");
                }
            }
        }

        let mut totals = stats.snapshot();
        totals.sources_unchanged = unchanged;
        let report = RunReport {
            stats: totals,
            writer: writer_report,
            elapsed: started.elapsed(),
            target,
        };
        info!(
            exported = report.files_exported(),
            skipped_frames = report.stats.frames_skipped,
            failed_sources = report.stats.sources_failed,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Conversion finished"
        );
        Ok(report)
    }

    /// The checksum cache applies to directory outputs only.
    fn open_cache(&self, target: &OutputTarget) -> Result<Option<ChecksumCache>, ConvertError> {
        match target.directory() {
            Some(dir) if self.config.use_cache => Ok(Some(ChecksumCache::load(dir)?)),
            _ => Ok(None),
        }
    }
}
