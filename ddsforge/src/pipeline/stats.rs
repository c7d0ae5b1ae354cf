//! Run statistics.
//!
//! Workers accumulate a private [`RunStats`] per source and merge it into the
//! shared [`StatsAggregator`] once the source is done, so the lock is taken
//! once per source rather than once per layer.

use parking_lot::Mutex;

/// Counters and byte sums for a conversion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub sources_processed: u64,
    /// Sources that could not be read or decoded.
    pub sources_failed: u64,
    /// Sources skipped because the checksum cache showed no change.
    pub sources_unchanged: u64,
    pub frames_encoded: u64,
    /// Frames dropped after a resolve or backend failure.
    pub frames_skipped: u64,
    /// Encoded size of the sources whose frames were encoded.
    pub original_file_bytes: u64,
    /// Decoded size of the encoded frames at source resolution.
    pub original_texture_bytes: u64,
    pub header_bytes: u64,
    pub base_bytes: u64,
    pub mip_bytes: u64,
}

impl RunStats {
    pub fn merge(&mut self, other: &RunStats) {
        self.sources_processed += other.sources_processed;
        self.sources_failed += other.sources_failed;
        self.sources_unchanged += other.sources_unchanged;
        self.frames_encoded += other.frames_encoded;
        self.frames_skipped += other.frames_skipped;
        self.original_file_bytes += other.original_file_bytes;
        self.original_texture_bytes += other.original_texture_bytes;
        self.header_bytes += other.header_bytes;
        self.base_bytes += other.base_bytes;
        self.mip_bytes += other.mip_bytes;
    }

    /// Total bytes of all produced containers.
    pub fn output_bytes(&self) -> u64 {
        self.header_bytes + self.base_bytes + self.mip_bytes
    }

    /// Fraction of disk space saved relative to the source files.
    pub fn space_economy(&self) -> Option<f64> {
        economy(self.output_bytes(), self.original_file_bytes)
    }

    /// Fraction of texture memory saved relative to the decoded sources,
    /// counting base levels only.
    pub fn memory_economy(&self) -> Option<f64> {
        economy(self.base_bytes, self.original_texture_bytes)
    }
}

fn economy(produced: u64, original: u64) -> Option<f64> {
    if original == 0 {
        None
    } else {
        Some(1.0 - produced as f64 / original as f64)
    }
}

/// Lock-guarded accumulator shared by all workers.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    inner: Mutex<RunStats>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&self, delta: &RunStats) {
        self.inner.lock().merge(delta);
    }

    pub fn snapshot(&self) -> RunStats {
        *self.inner.lock()
    }
}
