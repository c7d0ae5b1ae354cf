//! Immutable run configuration shared by the resolver, worker pool and writer.

use super::file::{BackendMode, ConfigFile};
use super::rules::PatternRules;
use crate::dds::TextureFormat;
use crate::frame::ScaleFilter;

/// Everything a conversion run needs to know, built once before workers start.
///
/// Constructed from a [`ConfigFile`] and then adjusted with the `with_*`
/// builders for command-line overrides. Never mutated while a run is active.
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Requested worker threads; 0 means one per available CPU.
    pub threads: usize,
    pub backend: BackendMode,
    /// Format applied to every frame, overriding the heuristic and force lists.
    pub forced_format: Option<TextureFormat>,
    pub swizzled_normals: bool,
    /// Keep non-power-of-two dimensions instead of resizing up.
    pub allow_npot: bool,
    pub mipmaps: bool,
    /// Upscale every frame 2x.
    pub scale2x: bool,
    pub scale_filter: ScaleFilter,
    pub use_cache: bool,
    /// Prefix prepended to entry names in archive outputs.
    pub archive_prefix: String,
    /// Build the archive in memory up to this many bytes.
    pub memory_archive: Option<usize>,
    pub image_extensions: Vec<String>,
    pub archive_extensions: Vec<String>,
    pub output_dir_name: String,
    pub patterns: PatternRules,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self::from_config_file(&ConfigFile::default())
    }
}

impl ConversionConfig {
    pub fn from_config_file(file: &ConfigFile) -> Self {
        Self {
            threads: file.general.threads,
            backend: file.general.backend,
            forced_format: None,
            swizzled_normals: file.general.swizzled_normals,
            allow_npot: false,
            mipmaps: true,
            scale2x: false,
            scale_filter: ScaleFilter::default(),
            use_cache: true,
            archive_prefix: String::new(),
            memory_archive: file.general.memory_archive,
            image_extensions: file.general.image_extensions.clone(),
            archive_extensions: file.general.archive_extensions.clone(),
            output_dir_name: file.general.output_dir_name.clone(),
            patterns: file.patterns.clone(),
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_backend(mut self, backend: BackendMode) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_forced_format(mut self, format: Option<TextureFormat>) -> Self {
        self.forced_format = format;
        self
    }

    pub fn with_allow_npot(mut self, allow: bool) -> Self {
        self.allow_npot = allow;
        self
    }

    pub fn with_mipmaps(mut self, enabled: bool) -> Self {
        self.mipmaps = enabled;
        self
    }

    pub fn with_scale2x(mut self, enabled: bool, filter: ScaleFilter) -> Self {
        self.scale2x = enabled;
        self.scale_filter = filter;
        self
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.use_cache = enabled;
        self
    }

    /// Set the archive entry prefix. A trailing `/` is added when missing.
    pub fn with_archive_prefix(mut self, prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into().replace('\\', "/");
        while prefix.starts_with('/') {
            prefix.remove(0);
        }
        if !prefix.is_empty() && !prefix.ends_with('/') {
            prefix.push('/');
        }
        self.archive_prefix = prefix;
        self
    }

    pub fn with_memory_archive(mut self, capacity: Option<usize>) -> Self {
        self.memory_archive = capacity;
        self
    }

    pub fn with_swizzled_normals(mut self, enabled: bool) -> Self {
        self.swizzled_normals = enabled;
        self
    }

    pub fn with_patterns(mut self, patterns: PatternRules) -> Self {
        self.patterns = patterns;
        self
    }

    /// Resolved worker count, never zero.
    pub fn worker_count(&self) -> usize {
        if self.threads > 0 {
            return self.threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    pub fn is_image_extension(&self, ext: &str) -> bool {
        self.image_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }

    pub fn is_archive_extension(&self, ext: &str) -> bool {
        self.archive_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}
