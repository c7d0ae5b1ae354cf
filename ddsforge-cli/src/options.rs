//! Command-line option types and their mapping onto the library config.

use std::path::PathBuf;

use clap::ValueEnum;
use ddsforge::config::{BackendMode, ConfigFile, ConversionConfig};
use ddsforge::dds::TextureFormat;
use ddsforge::frame::ScaleFilter;

/// Compression backend selection.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum BackendChoice {
    /// ISPC for normal maps, weighted encoder for everything else
    Auto,
    /// ISPC block compressor for every texture
    Ispc,
    /// Channel-weighted block compressor for every texture
    Weighted,
}

impl From<BackendChoice> for BackendMode {
    fn from(choice: BackendChoice) -> Self {
        match choice {
            BackendChoice::Auto => BackendMode::Auto,
            BackendChoice::Ispc => BackendMode::Ispc,
            BackendChoice::Weighted => BackendMode::Weighted,
        }
    }
}

/// Output format forced on every texture.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum FormatChoice {
    /// BC1, opaque or 1-bit alpha
    Dxt1,
    /// BC2 with premultiplied alpha
    Dxt2,
    /// BC2, explicit 4-bit alpha
    Dxt3,
    /// BC3 with premultiplied alpha
    Dxt4,
    /// BC3, interpolated alpha
    Dxt5,
    /// Uncompressed 32-bit BGRA
    Bgra,
    /// BC3 normal map with red moved to alpha
    Xgbr,
}

impl From<FormatChoice> for TextureFormat {
    fn from(choice: FormatChoice) -> Self {
        match choice {
            FormatChoice::Dxt1 => TextureFormat::Dxt1,
            FormatChoice::Dxt2 => TextureFormat::Dxt2,
            FormatChoice::Dxt3 => TextureFormat::Dxt3,
            FormatChoice::Dxt4 => TextureFormat::Dxt4,
            FormatChoice::Dxt5 => TextureFormat::Dxt5,
            FormatChoice::Bgra => TextureFormat::Bgra,
            FormatChoice::Xgbr => TextureFormat::Dxt5Xgbr,
        }
    }
}

/// Resampling filter for --scale2x and power-of-two resizing.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ScalerChoice {
    Box,
    Bilinear,
    Bicubic,
    Catmullrom,
    Lanczos,
}

impl From<ScalerChoice> for ScaleFilter {
    fn from(choice: ScalerChoice) -> Self {
        match choice {
            ScalerChoice::Box => ScaleFilter::Box,
            ScalerChoice::Bilinear => ScaleFilter::Bilinear,
            ScalerChoice::Bicubic => ScaleFilter::Bicubic,
            ScalerChoice::Catmullrom => ScaleFilter::CatmullRom,
            ScalerChoice::Lanczos => ScaleFilter::Lanczos,
        }
    }
}

/// Arguments for a conversion run.
#[derive(Debug, Clone, Default)]
pub struct ConvertArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub nocache: bool,
    pub npot: bool,
    pub nomip: bool,
    pub backend: Option<BackendChoice>,
    pub format: Option<FormatChoice>,
    pub scale2x: bool,
    pub scaler: Option<ScalerChoice>,
    pub archive_path: Option<String>,
    /// Memory archive bound in megabytes; 0 disables it.
    pub memory_archive: Option<usize>,
    pub threads: Option<usize>,
    pub config: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub quiet: bool,
}

/// Apply command-line overrides on top of the config file.
///
/// Flags only ever switch features on or off relative to the file; options
/// that are not given leave the file's value in place.
pub fn build_config(args: &ConvertArgs, file: &ConfigFile) -> ConversionConfig {
    let mut config = ConversionConfig::from_config_file(file);

    if args.nocache {
        config = config.with_cache(false);
    }
    if args.npot {
        config = config.with_allow_npot(true);
    }
    if args.nomip {
        config = config.with_mipmaps(false);
    }
    if let Some(backend) = args.backend {
        config = config.with_backend(backend.into());
    }
    if let Some(format) = args.format {
        config = config.with_forced_format(Some(format.into()));
    }
    if args.scale2x || args.scaler.is_some() {
        let filter = args
            .scaler
            .map(ScaleFilter::from)
            .unwrap_or(config.scale_filter);
        let enabled = args.scale2x || config.scale2x;
        config = config.with_scale2x(enabled, filter);
    }
    if let Some(prefix) = &args.archive_path {
        config = config.with_archive_prefix(prefix.as_str());
    }
    if let Some(megabytes) = args.memory_archive {
        let capacity = (megabytes > 0).then(|| megabytes * 1024 * 1024);
        config = config.with_memory_archive(capacity);
    }
    if let Some(threads) = args.threads {
        config = config.with_threads(threads);
    }
    config
}
