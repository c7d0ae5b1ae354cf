//! CLI error handling with user-friendly messages.
//!
//! Every fatal error ends up here and exits with code 1.

use std::fmt;
use std::process;

use ddsforge::config::ConfigFileError;
use ddsforge::logging::LoggingError;
use ddsforge::pipeline::ConvertError;
use ddsforge::source::ScanError;

#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(LoggingError),
    /// Invalid option or missing config file
    Config(String),
    /// Config file could not be read or parsed
    ConfigFile(ConfigFileError),
    /// The conversion run failed
    Convert(ConvertError),
}

impl CliError {
    /// Print the error with a usage hint and exit with code 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::Convert(ConvertError::Scan(ScanError::NoInput { .. })) = self {
            eprintln!();
            eprintln!("The input must be a directory, an image file, a file mask such as");
            eprintln!("\"textures/*.tga\", or a .zip/.pk3 archive containing images.");
        }

        eprintln!();
        eprintln!("Run 'ddsforge --help' for usage.");
        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "Config file error: {}", e),
            CliError::Convert(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::LoggingInit(e) => Some(e),
            CliError::ConfigFile(e) => Some(e),
            CliError::Convert(e) => Some(e),
            CliError::Config(_) => None,
        }
    }
}

impl From<ConvertError> for CliError {
    fn from(e: ConvertError) -> Self {
        CliError::Convert(e)
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::LoggingInit(e)
    }
}
