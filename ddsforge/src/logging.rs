//! Logging setup for ddsforge.
//!
//! - Full log written to `<log dir>/ddsforge.log` (truncated per run)
//! - Warnings and errors also go to stderr so they show above the progress bar
//! - Filter configurable through `RUST_LOG`, default `info`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to prepare log file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to install log subscriber: {0}")]
    Init(String),
}

/// Keeps the background log writer alive. Dropping it flushes the file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
    path: PathBuf,
}

impl LoggingGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Install the global subscriber.
///
/// `console` controls whether warnings are echoed to stderr.
pub fn init_logging(
    log_dir: &Path,
    log_file: &str,
    console: bool,
) -> Result<LoggingGuard, LoggingError> {
    let log_path = prepare_log_file(log_dir, log_file)?;

    let appender = tracing_appender::rolling::never(log_dir, log_file);
    let (file_writer, file_guard) = tracing_appender::non_blocking(appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_timer(LocalTime::rfc_3339())
        .with_thread_names(true);

    let stderr_layer = console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .without_time()
            .with_filter(LevelFilter::WARN)
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
        path: log_path,
    })
}

/// Create the directory and truncate the previous run's log.
fn prepare_log_file(log_dir: &Path, log_file: &str) -> Result<PathBuf, LoggingError> {
    let path = log_dir.join(log_file);
    let io_err = |source| LoggingError::Io {
        path: path.clone(),
        source,
    };
    fs::create_dir_all(log_dir).map_err(io_err)?;
    fs::write(&path, "").map_err(io_err)?;
    Ok(path)
}

/// `~/.ddsforge/logs`, or `logs` when there is no home directory.
pub fn default_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".ddsforge").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

pub fn default_log_file() -> &'static str {
    "ddsforge.log"
}
