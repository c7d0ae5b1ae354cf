//! ddsforge CLI - batch texture to DDS converter
//!
//! ```text
//! ddsforge <input> [output] [options]
//! ```

mod convert;
mod error;
mod options;
mod summary;

use std::path::PathBuf;

use clap::Parser;

use options::{BackendChoice, ConvertArgs, FormatChoice, ScalerChoice};

#[derive(Debug, Parser)]
#[command(name = "ddsforge")]
#[command(version, about = "Convert textures to DDS (DXT1-5, BGRA, xGBR normal maps)", long_about = None)]
struct Args {
    /// Directory, image file, file mask ("textures/*.tga") or .zip/.pk3 archive
    input: PathBuf,

    /// Output directory or .zip/.pk3 archive [default: <input dir>/dds]
    output: Option<PathBuf>,

    /// Convert every source even if it is unchanged since the last run
    #[arg(long)]
    nocache: bool,

    /// Keep non-power-of-two dimensions instead of resizing up
    #[arg(long)]
    npot: bool,

    /// Do not generate mipmaps
    #[arg(long)]
    nomip: bool,

    /// Compression backend
    #[arg(long, value_enum)]
    backend: Option<BackendChoice>,

    /// Force one output format for every texture
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,

    /// Upscale every texture 2x before compression
    #[arg(long)]
    scale2x: bool,

    /// Resampling filter for upscaling and power-of-two resizing
    #[arg(long, value_enum)]
    scaler: Option<ScalerChoice>,

    /// Path prefix for entries inside archive outputs
    #[arg(long, value_name = "PREFIX")]
    archive_path: Option<String>,

    /// Build archive outputs in memory, expecting at most this many megabytes
    #[arg(long, value_name = "MB")]
    memory_archive: Option<usize>,

    /// Worker threads (default: one per CPU)
    #[arg(long, short = 't')]
    threads: Option<usize>,

    /// Config file [default: ~/.ddsforge/config.ini]
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory for ddsforge.log [default: ~/.ddsforge/logs]
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Print nothing but errors
    #[arg(long, short = 'q')]
    quiet: bool,
}

impl From<Args> for ConvertArgs {
    fn from(args: Args) -> Self {
        ConvertArgs {
            input: args.input,
            output: args.output,
            nocache: args.nocache,
            npot: args.npot,
            nomip: args.nomip,
            backend: args.backend,
            format: args.format,
            scale2x: args.scale2x,
            scaler: args.scaler,
            archive_path: args.archive_path,
            memory_archive: args.memory_archive,
            threads: args.threads,
            config: args.config,
            log_dir: args.log_dir,
            quiet: args.quiet,
        }
    }
}

fn main() {
    let args = Args::parse();
    if let Err(e) = convert::run(args.into()) {
        e.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_full_command_line() {
        let args = Args::try_parse_from([
            "ddsforge",
            "textures",
            "out.pk3",
            "--nocache",
            "--nomip",
            "--backend",
            "weighted",
            "--format",
            "xgbr",
            "--scale2x",
            "--scaler",
            "catmullrom",
            "--archive-path",
            "base/textures",
            "--memory-archive",
            "128",
            "-t",
            "4",
        ])
        .unwrap();

        let convert: ConvertArgs = args.into();
        assert_eq!(convert.input, PathBuf::from("textures"));
        assert_eq!(convert.output, Some(PathBuf::from("out.pk3")));
        assert!(convert.nocache && convert.nomip && convert.scale2x);
        assert!(!convert.npot);
        assert_eq!(convert.backend, Some(BackendChoice::Weighted));
        assert_eq!(convert.format, Some(FormatChoice::Xgbr));
        assert_eq!(convert.scaler, Some(ScalerChoice::Catmullrom));
        assert_eq!(convert.archive_path.as_deref(), Some("base/textures"));
        assert_eq!(convert.memory_archive, Some(128));
        assert_eq!(convert.threads, Some(4));
    }

    #[test]
    fn test_input_is_required() {
        assert!(Args::try_parse_from(["ddsforge"]).is_err());
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Args::try_parse_from(["ddsforge", "in", "--format", "bc7"]).is_err());
    }
}
