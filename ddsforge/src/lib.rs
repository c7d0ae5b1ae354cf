//! ddsforge - batch texture to DDS converter
//!
//! Converts directories, file masks and ZIP archives of common image formats
//! into DirectDraw Surface containers (DXT1-5, BGRA and xGBR normal maps) with
//! full mip chains. Work is spread over a fixed worker pool; one writer thread
//! persists the results to a directory, a ZIP file or an in-memory ZIP.
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use ddsforge::config::ConversionConfig;
//! use ddsforge::pipeline::{ConversionProgress, Converter};
//!
//! let converter = Converter::new(ConversionConfig::default());
//! let plan = converter.plan(Path::new("textures"), None)?;
//! let report = converter.run(plan, &Arc::new(ConversionProgress::new()))?;
//! println!("{} files exported", report.files_exported());
//! # Ok::<(), ddsforge::pipeline::ConvertError>(())
//! ```

pub mod backend;
pub mod cache;
pub mod config;
pub mod dds;
pub mod frame;
pub mod logging;
pub mod pipeline;
pub mod resolve;
pub mod source;

/// Version of the library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
