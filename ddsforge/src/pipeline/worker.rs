//! Conversion workers.
//!
//! Each worker repeatedly claims the next source index, decodes it, and for
//! every frame resolves a format, prepares the pixels, allocates the whole
//! container once and lets a backend fill each level in place. Finished
//! containers are handed to the writer through the [`PendingQueue`].
//!
//! No lock is held while a frame is encoded. Statistics are accumulated per
//! source on the worker's stack and merged once.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use thiserror::Error;
use tracing::{debug, warn};

use super::error::ConvertError;
use super::progress::ConversionProgress;
use super::queue::{EncodedOutput, PendingQueue};
use super::stats::{RunStats, StatsAggregator};
use crate::backend::{BackendError, BackendRegistry};
use crate::config::ConversionConfig;
use crate::dds::{container_size, layer_sizes, write_header, DdsError, SizeParts, TextureFormat};
use crate::frame::{load_texture, prepare_frame, Frame, PrepareOptions};
use crate::resolve::{FormatDecision, FormatResolver};
use crate::source::SourceFile;

/// Why a frame was skipped.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("{backend} backend failed on {format}: {source}")]
    Backend {
        format: TextureFormat,
        backend: &'static str,
        #[source]
        source: BackendError,
    },

    #[error("Failed to write {format} header: {source}")]
    Header {
        format: TextureFormat,
        #[source]
        source: DdsError,
    },
}

impl FrameError {
    pub fn format(&self) -> TextureFormat {
        match self {
            FrameError::Backend { format, .. } | FrameError::Header { format, .. } => *format,
        }
    }
}

/// A complete container and the byte breakdown for statistics.
#[derive(Debug)]
pub struct EncodedFrame {
    pub output: EncodedOutput,
    pub decision: FormatDecision,
    pub header_bytes: usize,
    pub base_bytes: usize,
    pub mip_bytes: usize,
    /// Decoded size of the frame before any resizing.
    pub original_texture_bytes: u64,
}

/// Preparation steps for a frame of `source` stored as `decision`.
pub fn prepare_options(
    decision: &FormatDecision,
    source: &SourceFile,
    config: &ConversionConfig,
) -> PrepareOptions {
    let relative_path = source.relative_path();
    let file_name = source.file_name();
    let patterns = &config.patterns;

    PrepareOptions {
        swizzle: decision.swizzle,
        scale2x: config.scale2x || patterns.wants_scale2x(&relative_path, &file_name),
        filter: config.scale_filter,
        power_of_two: !config.allow_npot,
        binary_alpha: decision.format == TextureFormat::Dxt1,
        mipmaps: config.mipmaps && !patterns.skips_mipmaps(&relative_path, &file_name),
    }
}

/// Turn one decoded frame into a finished container.
pub fn encode_frame(
    mut frame: Frame,
    source: &SourceFile,
    config: &ConversionConfig,
    backends: &BackendRegistry,
) -> Result<EncodedFrame, FrameError> {
    let decision = FormatResolver::new(config).resolve(&frame, source);
    let format = decision.format;
    let original_texture_bytes = frame.original_texture_bytes();

    prepare_frame(&mut frame, &prepare_options(&decision, source, config));
    frame.weights = decision.weights;

    let sizes = layer_sizes(&frame, format);
    let mut data = vec![0u8; container_size(&frame, format, SizeParts::ALL)];
    let header_bytes = write_header(&mut data, &frame, format)
        .map_err(|source| FrameError::Header { format, source })?;

    let backend = backends.get(decision.backend);
    let mut offset = header_bytes;
    let levels = (0..frame.level_count()).filter_map(|index| frame.layer(index));
    for (layer, size) in levels.zip(sizes.iter().copied()) {
        backend
            .encode_layer(&layer, format, decision.weights, &mut data[offset..offset + size])
            .map_err(|source| FrameError::Backend {
                format,
                backend: backend.name(),
                source,
            })?;
        offset += size;
    }

    let base_bytes = sizes.first().copied().unwrap_or(0);
    let output = EncodedOutput::new(source.output_path(frame.name_override.as_deref()), data);
    Ok(EncodedFrame {
        output,
        decision,
        header_bytes,
        base_bytes,
        mip_bytes: offset - header_bytes - base_bytes,
        original_texture_bytes,
    })
}

/// Fixed pool of scoped worker threads feeding one [`PendingQueue`].
pub struct WorkerPool<'a> {
    config: &'a ConversionConfig,
    backends: &'a BackendRegistry,
    queue: &'a PendingQueue,
    stats: &'a StatsAggregator,
    progress: &'a ConversionProgress,
    stop: &'a AtomicBool,
}

impl<'a> WorkerPool<'a> {
    pub fn new(
        config: &'a ConversionConfig,
        backends: &'a BackendRegistry,
        queue: &'a PendingQueue,
        stats: &'a StatsAggregator,
        progress: &'a ConversionProgress,
        stop: &'a AtomicBool,
    ) -> Self {
        Self {
            config,
            backends,
            queue,
            stats,
            progress,
            stop,
        }
    }

    /// Convert every source, then close the queue.
    ///
    /// Returns the indices of sources whose frames were all encoded, sorted.
    /// A panicking worker raises the stop flag and fails the run.
    pub fn run(&self, sources: &[SourceFile]) -> Result<Vec<usize>, ConvertError> {
        let result = self.run_workers(sources);
        self.queue.close();
        result
    }

    fn run_workers(&self, sources: &[SourceFile]) -> Result<Vec<usize>, ConvertError> {
        let next = AtomicUsize::new(0);
        let workers = self.config.worker_count().min(sources.len()).max(1);
        debug!(workers, sources = sources.len(), "Starting worker pool");

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            for id in 0..workers {
                let spawned = thread::Builder::new()
                    .name(format!("ddsforge-worker-{}", id))
                    .spawn_scoped(scope, || self.work(sources, &next));
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(source) => {
                        self.stop.store(true, Ordering::SeqCst);
                        for handle in handles {
                            let _ = handle.join();
                        }
                        return Err(ConvertError::Spawn {
                            name: "worker",
                            source,
                        });
                    }
                }
            }

            let mut complete = Vec::new();
            let mut panicked = false;
            for handle in handles {
                match handle.join() {
                    Ok(indices) => complete.extend(indices),
                    Err(_) => {
                        self.stop.store(true, Ordering::SeqCst);
                        panicked = true;
                    }
                }
            }
            if panicked {
                return Err(ConvertError::WorkerPanicked);
            }
            complete.sort_unstable();
            Ok(complete)
        })
    }

    fn work(&self, sources: &[SourceFile], next: &AtomicUsize) -> Vec<usize> {
        let mut complete = Vec::new();
        while !self.stop.load(Ordering::SeqCst) {
            let index = next.fetch_add(1, Ordering::SeqCst);
            let Some(source) = sources.get(index) else {
                break;
            };

            let mut delta = RunStats::default();
            if self.convert_source(source, &mut delta) {
                complete.push(index);
            }
            self.stats.merge(&delta);
            self.progress.source_processed();
        }
        complete
    }

    /// Returns true when every frame of `source` was encoded.
    fn convert_source(&self, source: &SourceFile, delta: &mut RunStats) -> bool {
        let texture = match load_texture(source) {
            Ok(texture) => texture,
            Err(e) => {
                warn!(source = %source.display(), error = %e, "Skipping source");
                delta.sources_failed += 1;
                return false;
            }
        };
        delta.sources_processed += 1;

        let mut all_encoded = true;
        for frame in texture.frames {
            let source_bytes = frame.source_bytes;
            match encode_frame(frame, source, self.config, self.backends) {
                Ok(encoded) => {
                    delta.frames_encoded += 1;
                    delta.original_file_bytes += source_bytes;
                    delta.original_texture_bytes += encoded.original_texture_bytes;
                    delta.header_bytes += encoded.header_bytes as u64;
                    delta.base_bytes += encoded.base_bytes as u64;
                    delta.mip_bytes += encoded.mip_bytes as u64;
                    debug!(
                        output = %encoded.output.path,
                        format = %encoded.decision.format,
                        backend = %encoded.decision.backend,
                        bytes = encoded.output.len(),
                        "Frame encoded"
                    );
                    self.queue.push(encoded.output);
                }
                Err(e) => {
                    warn!(
                        source = %source.display(),
                        format = %e.format(),
                        error = %e,
                        "Skipping frame"
                    );
                    delta.frames_skipped += 1;
                    all_encoded = false;
                }
            }
        }
        all_encoded
    }
}
