//! Source discovery.
//!
//! Turns the user's input argument into an ordered list of [`SourceFile`]s:
//!
//! | input                         | result                                  |
//! |-------------------------------|-----------------------------------------|
//! | directory                     | recursive walk, image extensions only   |
//! | path containing `*` or `?`    | glob mask                               |
//! | file with archive extension   | every image entry inside the ZIP        |
//! | any other file                | that single file                        |
//!
//! Order is deterministic (sorted) so work indices are reproducible.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ConversionConfig;

/// Extension of every output file.
pub const OUTPUT_EXTENSION: &str = "dds";

/// Errors resolving the input argument.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("No input files found at {}", path.display())]
    NoInput { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to open archive {}: {reason}", path.display())]
    Archive { path: PathBuf, reason: String },

    #[error("Invalid file mask '{pattern}': {reason}")]
    InvalidMask { pattern: String, reason: String },
}

/// Where a source's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    File(PathBuf),
    ArchiveEntry { archive: PathBuf, entry: String },
}

/// A located input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub location: SourceLocation,
    /// Directory relative to the input root, forward slashes, empty or
    /// ending in `/`.
    pub relative_dir: String,
    /// File name without extension.
    pub name: String,
    pub extension: String,
    /// Encoded size in bytes.
    pub size: u64,
}

impl SourceFile {
    /// Describe a file on disk.
    pub fn from_path(path: &Path, relative_dir: impl Into<String>) -> io::Result<Self> {
        let size = fs::metadata(path)?.len();
        let (name, extension) = split_name(&path.file_name().unwrap_or_default().to_string_lossy());
        Ok(Self {
            location: SourceLocation::File(path.to_path_buf()),
            relative_dir: relative_dir.into(),
            name,
            extension,
            size,
        })
    }

    /// File name including extension.
    pub fn file_name(&self) -> String {
        if self.extension.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.name, self.extension)
        }
    }

    /// Path relative to the input root, used for pattern matching and the cache.
    pub fn relative_path(&self) -> String {
        format!("{}{}", self.relative_dir, self.file_name())
    }

    /// Relative output path `<relative dir><name>.dds`.
    pub fn output_path(&self, name_override: Option<&str>) -> String {
        format!(
            "{}{}.{}",
            self.relative_dir,
            name_override.unwrap_or(&self.name),
            OUTPUT_EXTENSION
        )
    }

    /// Human readable location for log messages.
    pub fn display(&self) -> String {
        match &self.location {
            SourceLocation::File(path) => path.display().to_string(),
            SourceLocation::ArchiveEntry { archive, entry } => {
                format!("{}:{}", archive.display(), entry)
            }
        }
    }

    /// Read the whole encoded file.
    pub fn read_bytes(&self) -> io::Result<Vec<u8>> {
        match &self.location {
            SourceLocation::File(path) => fs::read(path),
            SourceLocation::ArchiveEntry { archive, entry } => {
                let file = File::open(archive)?;
                let mut zip = zip::ZipArchive::new(file).map_err(io::Error::other)?;
                let mut entry = zip.by_name(entry).map_err(io::Error::other)?;
                let mut bytes = Vec::with_capacity(entry.size() as usize);
                entry.read_to_end(&mut bytes)?;
                Ok(bytes)
            }
        }
    }
}

/// Split `a.b.tga` into (`a.b`, `tga`).
fn split_name(file_name: &str) -> (String, String) {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => (
            file_name[..idx].to_string(),
            file_name[idx + 1..].to_string(),
        ),
        _ => (file_name.to_string(), String::new()),
    }
}

fn is_mask(input: &Path) -> bool {
    input
        .file_name()
        .map(|n| n.to_string_lossy().contains(['*', '?']))
        .unwrap_or(false)
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Resolve `input` into the list of sources to convert.
pub fn scan_sources(input: &Path, config: &ConversionConfig) -> Result<Vec<SourceFile>, ScanError> {
    let sources = if is_mask(input) {
        scan_mask(input, config)?
    } else if input.is_dir() {
        let mut sources = Vec::new();
        walk_directory(input, "", config, &mut sources)?;
        sources
    } else if input.is_file() {
        if config.is_archive_extension(&extension_of(input)) {
            scan_archive(input, config)?
        } else {
            let source = SourceFile::from_path(input, "").map_err(|source| ScanError::Io {
                path: input.to_path_buf(),
                source,
            })?;
            vec![source]
        }
    } else {
        Vec::new()
    };

    if sources.is_empty() {
        return Err(ScanError::NoInput {
            path: input.to_path_buf(),
        });
    }

    debug!(input = %input.display(), count = sources.len(), "Scanned sources");
    Ok(sources)
}

fn walk_directory(
    dir: &Path,
    relative_dir: &str,
    config: &ConversionConfig,
    out: &mut Vec<SourceFile>,
) -> Result<(), ScanError> {
    let io_err = |source| ScanError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir)
        .map_err(io_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy().to_string();
        if path.is_dir() {
            if relative_dir.is_empty() && file_name == config.output_dir_name {
                continue;
            }
            let child = format!("{}{}/", relative_dir, file_name);
            walk_directory(&path, &child, config, out)?;
        } else if config.is_image_extension(&extension_of(&path)) {
            match SourceFile::from_path(&path, relative_dir) {
                Ok(source) => out.push(source),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable file"),
            }
        }
    }
    Ok(())
}

fn scan_mask(input: &Path, config: &ConversionConfig) -> Result<Vec<SourceFile>, ScanError> {
    let pattern = input.to_string_lossy().to_string();
    let paths = glob::glob(&pattern).map_err(|e| ScanError::InvalidMask {
        pattern: pattern.clone(),
        reason: e.to_string(),
    })?;

    let mut sources = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) if path.is_file() && config.is_image_extension(&extension_of(&path)) => {
                match SourceFile::from_path(&path, "") {
                    Ok(source) => sources.push(source),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Skipping unreadable file")
                    }
                }
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Skipping unreadable mask match"),
        }
    }
    Ok(sources)
}

/// Entry name as a normalized forward-slash relative path, or `None` for
/// absolute names and names that climb out of the archive root.
fn enclosed_entry_name(name: &str) -> Option<String> {
    let name = name.replace('\\', "/");
    if name.starts_with('/') || Path::new(&name).has_root() {
        return None;
    }
    let mut parts: Vec<&str> = Vec::new();
    for part in name.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            part => parts.push(part),
        }
    }
    (!parts.is_empty()).then(|| parts.join("/"))
}

fn scan_archive(input: &Path, config: &ConversionConfig) -> Result<Vec<SourceFile>, ScanError> {
    let archive_err = |reason: String| ScanError::Archive {
        path: input.to_path_buf(),
        reason,
    };

    let file = File::open(input).map_err(|source| ScanError::Io {
        path: input.to_path_buf(),
        source,
    })?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| archive_err(e.to_string()))?;

    let mut sources = Vec::new();
    for i in 0..zip.len() {
        let entry = zip.by_index(i).map_err(|e| archive_err(e.to_string()))?;
        if entry.is_dir() {
            continue;
        }
        let enclosed = entry
            .enclosed_name()
            .and_then(|_| enclosed_entry_name(entry.name()));
        let Some(entry_name) = enclosed else {
            warn!(
                archive = %input.display(),
                entry = entry.name(),
                "Skipping archive entry outside the archive root"
            );
            continue;
        };
        let (relative_dir, file_name) = match entry_name.rfind('/') {
            Some(idx) => (&entry_name[..=idx], &entry_name[idx + 1..]),
            None => ("", entry_name.as_str()),
        };
        let (name, extension) = split_name(file_name);
        if !config.is_image_extension(&extension) {
            continue;
        }
        sources.push(SourceFile {
            location: SourceLocation::ArchiveEntry {
                archive: input.to_path_buf(),
                entry: entry.name().to_string(),
            },
            relative_dir: relative_dir.to_string(),
            name,
            extension,
            size: entry.size(),
        });
    }
    sources.sort_by(|a, b| a.relative_path().cmp(&b.relative_path()));
    Ok(sources)
}

/// Output directory used when none is given: `<output_dir_name>` next to
/// the input (inside it for directories).
pub fn default_output_dir(input: &Path, config: &ConversionConfig) -> PathBuf {
    let base = if input.is_dir() && !is_mask(input) {
        input.to_path_buf()
    } else {
        input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    };
    base.join(&config.output_dir_name)
}
