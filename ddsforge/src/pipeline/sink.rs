//! Output sinks owned by the writer thread.
//!
//! The target is decided once from configuration:
//!
//! | target          | sink             | persisted as                          |
//! |-----------------|------------------|---------------------------------------|
//! | `Directory`     | `DirectorySink`  | `<dir>/<relative path>`               |
//! | `Archive`       | `ZipFileSink`    | entry `<prefix><relative path>`       |
//! | `MemoryArchive` | `MemoryZipSink`  | same, flushed to disk in one write    |

use std::fs::{self, File};
use std::io::{self, Cursor, Seek, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::queue::EncodedOutput;

/// Usage fraction of the memory archive bound that triggers a warning.
pub const CAPACITY_WARNING_RATIO: f64 = 0.9;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to create output {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Archive error for {path}: {reason}")]
    Archive { path: String, reason: String },
}

/// Where converted containers go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Directory(PathBuf),
    Archive {
        path: PathBuf,
        prefix: String,
    },
    MemoryArchive {
        path: PathBuf,
        prefix: String,
        capacity: usize,
    },
}

impl OutputTarget {
    pub fn is_archive(&self) -> bool {
        !matches!(self, OutputTarget::Directory(_))
    }

    /// Output directory for directory targets.
    pub fn directory(&self) -> Option<&Path> {
        match self {
            OutputTarget::Directory(dir) => Some(dir),
            _ => None,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            OutputTarget::Directory(path)
            | OutputTarget::Archive { path, .. }
            | OutputTarget::MemoryArchive { path, .. } => path,
        }
    }

    /// Open the sink. Failure here is fatal for the run.
    pub fn open(&self) -> Result<Box<dyn OutputSink>, SinkError> {
        match self {
            OutputTarget::Directory(dir) => Ok(Box::new(DirectorySink::create(dir)?)),
            OutputTarget::Archive { path, prefix } => {
                Ok(Box::new(ZipFileSink::create(path, prefix)?))
            }
            OutputTarget::MemoryArchive {
                path,
                prefix,
                capacity,
            } => Ok(Box::new(MemoryZipSink::create(path, prefix, *capacity)?)),
        }
    }
}

/// Persists finished containers.
pub trait OutputSink {
    fn describe(&self) -> String;

    /// Persist one container. Failures are per item.
    fn persist(&mut self, item: &EncodedOutput) -> Result<(), SinkError>;

    /// Flush and close.
    fn finish(self: Box<Self>) -> Result<(), SinkError>;
}

fn create_parent(path: &Path) -> Result<(), SinkError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| SinkError::Create {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

fn archive_err(path: &str, e: impl std::fmt::Display) -> SinkError {
    SinkError::Archive {
        path: path.to_string(),
        reason: e.to_string(),
    }
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// Writes each container to its own file under a root directory.
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn create(root: &Path) -> Result<Self, SinkError> {
        fs::create_dir_all(root).map_err(|source| SinkError::Create {
            path: root.to_path_buf(),
            source,
        })?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }
}

impl OutputSink for DirectorySink {
    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }

    fn persist(&mut self, item: &EncodedOutput) -> Result<(), SinkError> {
        let path = self.root.join(&item.path);
        let write_err = |source| SinkError::Write {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(&path, &item.data).map_err(write_err)
    }

    fn finish(self: Box<Self>) -> Result<(), SinkError> {
        Ok(())
    }
}

fn write_entry<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    prefix: &str,
    item: &EncodedOutput,
) -> Result<(), SinkError> {
    let name = format!("{}{}", prefix, item.path);
    zip.start_file(name.as_str(), entry_options())
        .map_err(|e| archive_err(&name, e))?;
    zip.write_all(&item.data).map_err(|source| SinkError::Write {
        path: name.clone(),
        source,
    })
}

/// Streams entries into a ZIP file on disk.
pub struct ZipFileSink {
    path: PathBuf,
    prefix: String,
    zip: ZipWriter<File>,
}

impl ZipFileSink {
    pub fn create(path: &Path, prefix: &str) -> Result<Self, SinkError> {
        create_parent(path)?;
        let file = File::create(path).map_err(|source| SinkError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            prefix: prefix.to_string(),
            zip: ZipWriter::new(file),
        })
    }
}

impl OutputSink for ZipFileSink {
    fn describe(&self) -> String {
        format!("archive {}", self.path.display())
    }

    fn persist(&mut self, item: &EncodedOutput) -> Result<(), SinkError> {
        write_entry(&mut self.zip, &self.prefix, item)
    }

    fn finish(self: Box<Self>) -> Result<(), SinkError> {
        let path = self.path.display().to_string();
        self.zip.finish().map_err(|e| archive_err(&path, e))?;
        Ok(())
    }
}

/// Builds the ZIP in memory and writes it to disk once at the end.
///
/// `capacity` bounds the expected payload; crossing 90% of it logs a single
/// warning. The bound is advisory and never rejects entries.
pub struct MemoryZipSink {
    path: PathBuf,
    prefix: String,
    capacity: usize,
    used: usize,
    warned: bool,
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl MemoryZipSink {
    /// Checks the destination is writable up front so a bad path fails
    /// before any work is done.
    pub fn create(path: &Path, prefix: &str, capacity: usize) -> Result<Self, SinkError> {
        create_parent(path)?;
        File::create(path).map_err(|source| SinkError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            prefix: prefix.to_string(),
            capacity,
            used: 0,
            warned: false,
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        })
    }

    /// Payload bytes accepted so far.
    pub fn used(&self) -> usize {
        self.used
    }

    pub fn capacity_warned(&self) -> bool {
        self.warned
    }
}

impl OutputSink for MemoryZipSink {
    fn describe(&self) -> String {
        format!(
            "in-memory archive {} ({} MB)",
            self.path.display(),
            self.capacity / (1024 * 1024)
        )
    }

    fn persist(&mut self, item: &EncodedOutput) -> Result<(), SinkError> {
        write_entry(&mut self.zip, &self.prefix, item)?;
        self.used += item.len();

        if !self.warned && self.used as f64 >= self.capacity as f64 * CAPACITY_WARNING_RATIO {
            self.warned = true;
            warn!(
                used = self.used,
                capacity = self.capacity,
                "In-memory archive is above 90% of its capacity"
            );
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<(), SinkError> {
        let path = self.path.display().to_string();
        let cursor = self.zip.finish().map_err(|e| archive_err(&path, e))?;
        let bytes = cursor.into_inner();
        debug!(path = %path, bytes = bytes.len(), "Flushing in-memory archive");
        fs::write(&self.path, &bytes).map_err(|source| SinkError::Write { path, source })
    }
}
