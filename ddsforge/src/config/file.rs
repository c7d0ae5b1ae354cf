//! Configuration file handling for ~/.ddsforge/config.ini.
//!
//! Loads user configuration with sensible defaults. Parsing lives in
//! [`super::parser`]; the per-file pattern rules in [`super::rules`].

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::rules::PatternRules;

/// Default image extensions picked up by directory scans.
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] =
    &["bmp", "gif", "jpg", "jpeg", "png", "tga", "tif", "tiff"];

/// Default extensions treated as ZIP archives of images.
pub const DEFAULT_ARCHIVE_EXTENSIONS: &[&str] = &["zip", "pk3"];

/// Default output directory name created next to the input.
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "dds";

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

/// Compressor backend selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendMode {
    /// ISPC for normal maps, weighted encoder otherwise; pattern lists may override.
    #[default]
    Auto,
    /// Always use the ISPC block compressor.
    Ispc,
    /// Always use the channel-weighted block compressor.
    Weighted,
}

impl BackendMode {
    pub fn name(&self) -> &'static str {
        match self {
            BackendMode::Auto => "auto",
            BackendMode::Ispc => "ispc",
            BackendMode::Weighted => "weighted",
        }
    }
}

impl std::str::FromStr for BackendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(BackendMode::Auto),
            "ispc" => Ok(BackendMode::Ispc),
            "weighted" => Ok(BackendMode::Weighted),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

/// `[general]` section.
#[derive(Debug, Clone)]
pub struct GeneralSettings {
    /// Worker threads; 0 means one per available CPU.
    pub threads: usize,
    pub image_extensions: Vec<String>,
    pub archive_extensions: Vec<String>,
    pub output_dir_name: String,
    /// Store detected normal maps as swizzled DXT5 (xGBR).
    pub swizzled_normals: bool,
    pub backend: BackendMode,
    /// Bound in bytes for an in-memory output archive, if enabled.
    pub memory_archive: Option<usize>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            threads: 0,
            image_extensions: DEFAULT_IMAGE_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            archive_extensions: DEFAULT_ARCHIVE_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            output_dir_name: DEFAULT_OUTPUT_DIR_NAME.to_string(),
            swizzled_normals: false,
            backend: BackendMode::Auto,
            memory_archive: None,
        }
    }
}

/// Parsed contents of config.ini.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub general: GeneralSettings,
    pub patterns: PatternRules,
}

impl ConfigFile {
    /// Load configuration from the default path (~/.ddsforge/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Parse configuration from INI text.
    pub fn from_ini_str(content: &str) -> Result<Self, ConfigFileError> {
        let ini = Ini::load_from_str(content).map_err(|e| ConfigFileError::InvalidValue {
            section: String::new(),
            key: String::new(),
            value: String::new(),
            reason: e.to_string(),
        })?;
        super::parser::parse_ini(&ini)
    }
}

/// Get the path to the config directory (~/.ddsforge).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ddsforge")
}

/// Get the path to the config file (~/.ddsforge/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert_eq!(config.general.threads, 0);
        assert_eq!(config.general.output_dir_name, "dds");
        assert_eq!(config.general.backend, BackendMode::Auto);
        assert!(config.general.memory_archive.is_none());
        assert!(config.general.image_extensions.contains(&"tga".to_string()));
        assert!(config.patterns.normal.is_empty());
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config.general.output_dir_name, DEFAULT_OUTPUT_DIR_NAME);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(
            &config_path,
            "[general]\nthreads = 3\nbackend = weighted\n\n[patterns]\nnormal = *_n.*\n",
        )
        .unwrap();

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config.general.threads, 3);
        assert_eq!(config.general.backend, BackendMode::Weighted);
        assert!(config.patterns.normal.matches("wall_n.tga"));
    }

    #[test]
    fn test_backend_mode_from_str() {
        assert_eq!("AUTO".parse::<BackendMode>().unwrap(), BackendMode::Auto);
        assert_eq!("ispc".parse::<BackendMode>().unwrap(), BackendMode::Ispc);
        assert!("nvidia".parse::<BackendMode>().is_err());
    }

    #[test]
    fn test_config_file_path() {
        let path = config_file_path();
        assert!(path.ends_with(".ddsforge/config.ini"));
    }
}
