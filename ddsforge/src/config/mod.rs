//! Configuration: the INI config file, per-file pattern rules, and the
//! immutable [`ConversionConfig`] handed to every stage of a run.
//!
//! ```text
//! ~/.ddsforge/config.ini ──► ConfigFile ──► ConversionConfig ◄── CLI overrides
//!                                                │
//!                         ┌──────────────────────┼──────────────────┐
//!                         ▼                      ▼                  ▼
//!                   FormatResolver          WorkerPool        WriteCoordinator
//! ```

mod conversion;
mod file;
mod parser;
mod patterns;
mod rules;
mod size;

pub use conversion::ConversionConfig;
pub use file::{
    config_directory, config_file_path, BackendMode, ConfigFile, ConfigFileError,
    GeneralSettings, DEFAULT_ARCHIVE_EXTENSIONS, DEFAULT_IMAGE_EXTENSIONS,
    DEFAULT_OUTPUT_DIR_NAME,
};
pub use patterns::PatternList;
pub use rules::{PatternRules, BACKEND_PRIORITY, FORCE_PRIORITY};
pub use size::{format_size, parse_size, to_megabytes, SizeParseError};
