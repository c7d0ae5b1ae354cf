//! Content checksum cache used to skip unchanged sources on re-runs.
//!
//! Stored as `<output dir>/_filescrc.txt`, one source per line:
//!
//! ```text
//! <sha256 hex>\t<relative path>
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

use crate::source::SourceFile;

/// File name of the cache inside the output directory.
pub const CACHE_FILE_NAME: &str = "_filescrc.txt";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Failed to read cache {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write cache {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Hex SHA-256 of a byte slice.
pub fn checksum_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Checksums of every source, computed in parallel. Unreadable sources get
/// `None` and are never considered unchanged.
pub fn checksum_sources(sources: &[SourceFile]) -> Vec<Option<String>> {
    sources
        .par_iter()
        .map(|source| match source.read_bytes() {
            Ok(bytes) => Some(checksum_bytes(&bytes)),
            Err(e) => {
                warn!(source = %source.display(), error = %e, "Failed to checksum source");
                None
            }
        })
        .collect()
}

/// Relative path → checksum table.
#[derive(Debug, Clone)]
pub struct ChecksumCache {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl ChecksumCache {
    /// Empty cache that will be saved in `output_dir`.
    pub fn new(output_dir: &Path) -> Self {
        Self {
            path: output_dir.join(CACHE_FILE_NAME),
            entries: HashMap::new(),
        }
    }

    /// Load the cache from `output_dir`. A missing file gives an empty cache;
    /// malformed lines are skipped.
    pub fn load(output_dir: &Path) -> Result<Self, CacheError> {
        let mut cache = Self::new(output_dir);
        let content = match fs::read_to_string(&cache.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(cache),
            Err(source) => {
                return Err(CacheError::Read {
                    path: cache.path,
                    source,
                })
            }
        };

        for line in content.lines() {
            match line.split_once('\t') {
                Some((checksum, path)) if !checksum.is_empty() && !path.is_empty() => {
                    cache.entries.insert(path.to_string(), checksum.to_string());
                }
                _ if line.trim().is_empty() => {}
                _ => debug!(line, "Skipping malformed cache line"),
            }
        }
        debug!(path = %cache.path.display(), entries = cache.entries.len(), "Loaded checksum cache");
        Ok(cache)
    }

    /// Write the cache, sorted by path.
    pub fn save(&self) -> Result<(), CacheError> {
        let write_err = |source| CacheError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut lines: Vec<_> = self.entries.iter().collect();
        lines.sort();
        let mut content = String::new();
        for (path, checksum) in lines {
            content.push_str(checksum);
            content.push('\t');
            content.push_str(path);
            content.push('\n');
        }
        fs::write(&self.path, content).map_err(write_err)
    }

    pub fn is_unchanged(&self, relative_path: &str, checksum: &str) -> bool {
        self.entries
            .get(relative_path)
            .is_some_and(|c| c == checksum)
    }

    pub fn record(&mut self, relative_path: impl Into<String>, checksum: impl Into<String>) {
        self.entries.insert(relative_path.into(), checksum.into());
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_checksum_bytes() {
        assert_eq!(
            checksum_bytes(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_missing_cache_is_empty() {
        let dir = TempDir::new().unwrap();
        let cache = ChecksumCache::load(dir.path()).unwrap();
        assert!(cache.is_empty());
        assert_eq!(cache.path(), dir.path().join("_filescrc.txt"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("dds");

        let mut cache = ChecksumCache::new(&out);
        cache.record("walls/b.tga", "bbb");
        cache.record("a.png", "aaa");
        cache.save().unwrap();

        let content = fs::read_to_string(out.join(CACHE_FILE_NAME)).unwrap();
        assert_eq!(content, "aaa\ta.png\nbbb\twalls/b.tga\n");

        let loaded = ChecksumCache::load(&out).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.is_unchanged("a.png", "aaa"));
        assert!(!loaded.is_unchanged("a.png", "zzz"));
        assert!(!loaded.is_unchanged("c.png", "aaa"));
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CACHE_FILE_NAME),
            "garbage\n\nabc\tok.png\n\tno_sum.png\n",
        )
        .unwrap();
        let cache = ChecksumCache::load(dir.path()).unwrap();
        assert_eq!(cache.len(), 1);
        assert!(cache.is_unchanged("ok.png", "abc"));
    }

    #[test]
    fn test_checksum_sources_parallel() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.png");
        fs::write(&a, b"abc").unwrap();
        let sources = vec![
            SourceFile::from_path(&a, "").unwrap(),
            SourceFile {
                location: crate::source::SourceLocation::File(dir.path().join("gone.png")),
                relative_dir: String::new(),
                name: "gone".into(),
                extension: "png".into(),
                size: 0,
            },
        ];
        let sums = checksum_sources(&sources);
        assert_eq!(sums[0].as_deref(), Some(checksum_bytes(b"abc").as_str()));
        assert!(sums[1].is_none());
    }
}
