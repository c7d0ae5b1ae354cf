//! Fatal errors for a conversion run.
//!
//! Everything here aborts the run. Per-source and per-frame problems are
//! logged and counted in [`RunStats`](super::RunStats) instead.

use std::io;

use thiserror::Error;

use super::sink::SinkError;
use crate::cache::CacheError;
use crate::source::ScanError;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("Output failed: {0}")]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("Failed to start {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("A conversion worker panicked")]
    WorkerPanicked,

    #[error("The output writer panicked")]
    WriterPanicked,
}
