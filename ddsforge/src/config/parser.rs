//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::Ini;

use super::file::{BackendMode, ConfigFile, ConfigFileError};
use super::patterns::PatternList;
use super::size::parse_size;
use crate::backend::BackendKind;
use crate::dds::TextureFormat;

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_bool(section: &str, key: &str, value: &str) -> Result<bool, ConfigFileError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(section, key, value, "must be true or false")),
    }
}

fn parse_extensions(value: &str) -> Vec<String> {
    value
        .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn parse_patterns(key: &str, value: &str) -> Result<PatternList, ConfigFileError> {
    PatternList::parse(value).map_err(|e| invalid("patterns", key, value, &e.to_string()))
}

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [general] section
    if let Some(section) = ini.section(Some("general")) {
        if let Some(v) = section.get("threads") {
            config.general.threads = v
                .trim()
                .parse()
                .map_err(|_| invalid("general", "threads", v, "must be a non-negative integer"))?;
        }
        if let Some(v) = section.get("image_extensions") {
            let exts = parse_extensions(v);
            if exts.is_empty() {
                return Err(invalid(
                    "general",
                    "image_extensions",
                    v,
                    "must list at least one extension",
                ));
            }
            config.general.image_extensions = exts;
        }
        if let Some(v) = section.get("archive_extensions") {
            config.general.archive_extensions = parse_extensions(v);
        }
        if let Some(v) = section.get("output_dir_name") {
            let v = v.trim();
            if v.is_empty() || v.contains(['/', '\\']) {
                return Err(invalid(
                    "general",
                    "output_dir_name",
                    v,
                    "must be a plain directory name",
                ));
            }
            config.general.output_dir_name = v.to_string();
        }
        if let Some(v) = section.get("swizzled_normals") {
            config.general.swizzled_normals = parse_bool("general", "swizzled_normals", v)?;
        }
        if let Some(v) = section.get("backend") {
            config.general.backend = v
                .parse::<BackendMode>()
                .map_err(|_| invalid("general", "backend", v, "must be one of: auto, ispc, weighted"))?;
        }
        if let Some(v) = section.get("memory_archive") {
            let v = v.trim();
            config.general.memory_archive = if v.is_empty() || v == "0" {
                None
            } else {
                Some(parse_size(v).map_err(|_| {
                    invalid(
                        "general",
                        "memory_archive",
                        v,
                        "expected format like '256MB', '1GB', or '0' to disable",
                    )
                })?)
            };
        }
    }

    // [patterns] section
    if let Some(section) = ini.section(Some("patterns")) {
        if let Some(v) = section.get("normal") {
            config.patterns.normal = parse_patterns("normal", v)?;
        }
        if let Some(v) = section.get("height") {
            config.patterns.height = parse_patterns("height", v)?;
        }
        if let Some(v) = section.get("nomip") {
            config.patterns.nomip = parse_patterns("nomip", v)?;
        }
        if let Some(v) = section.get("scale") {
            config.patterns.scale = parse_patterns("scale", v)?;
        }

        let force_keys = [
            ("force_dxt1", TextureFormat::Dxt1),
            ("force_dxt2", TextureFormat::Dxt2),
            ("force_dxt3", TextureFormat::Dxt3),
            ("force_dxt4", TextureFormat::Dxt4),
            ("force_dxt5", TextureFormat::Dxt5),
            ("force_bgra", TextureFormat::Bgra),
            ("force_xgbr", TextureFormat::Dxt5Xgbr),
        ];
        for (key, format) in force_keys {
            if let Some(v) = section.get(key) {
                config.patterns.set_force(format, parse_patterns(key, v)?);
            }
        }

        let backend_keys = [
            ("backend_ispc", BackendKind::Ispc),
            ("backend_weighted", BackendKind::Weighted),
            ("backend_raw", BackendKind::Raw),
        ];
        for (key, kind) in backend_keys {
            if let Some(v) = section.get(key) {
                config.patterns.set_backend(kind, parse_patterns(key, v)?);
            }
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let ini = Ini::load_from_str(content).unwrap();
        parse_ini(&ini)
    }

    #[test]
    fn test_empty_ini_gives_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.general.threads, 0);
        assert!(!config.general.swizzled_normals);
    }

    #[test]
    fn test_general_section() {
        let config = parse(
            "[general]\n\
             threads = 8\n\
             image_extensions = .TGA png\n\
             archive_extensions = pk3\n\
             output_dir_name = converted\n\
             swizzled_normals = yes\n\
             backend = ispc\n\
             memory_archive = 64MB\n",
        )
        .unwrap();

        assert_eq!(config.general.threads, 8);
        assert_eq!(config.general.image_extensions, vec!["tga", "png"]);
        assert_eq!(config.general.archive_extensions, vec!["pk3"]);
        assert_eq!(config.general.output_dir_name, "converted");
        assert!(config.general.swizzled_normals);
        assert_eq!(config.general.backend, BackendMode::Ispc);
        assert_eq!(config.general.memory_archive, Some(64 * 1024 * 1024));
    }

    #[test]
    fn test_memory_archive_zero_disables() {
        let config = parse("[general]\nmemory_archive = 0\n").unwrap();
        assert!(config.general.memory_archive.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let err = parse("[general]\nthreads = many\n").unwrap_err();
        assert!(err.to_string().contains("general.threads"));

        let err = parse("[general]\nbackend = nvidia\n").unwrap_err();
        assert!(err.to_string().contains("auto, ispc, weighted"));

        assert!(parse("[general]\nswizzled_normals = maybe\n").is_err());
        assert!(parse("[general]\nmemory_archive = lots\n").is_err());
        assert!(parse("[general]\noutput_dir_name = a/b\n").is_err());
        assert!(parse("[general]\nimage_extensions = ;\n").is_err());
    }

    #[test]
    fn test_patterns_section() {
        let config = parse(
            "[patterns]\n\
             normal = *_norm.* *_local.*\n\
             height = *_bump.*\n\
             force_bgra = gfx/*\n\
             force_xgbr = *_nx.*\n\
             backend_raw = ui/*\n",
        )
        .unwrap();

        assert!(config.patterns.is_normal_map("m/a_local.tga", "a_local.tga"));
        assert!(config.patterns.is_height_map("m/a_bump.tga", "a_bump.tga"));
        assert_eq!(
            config.patterns.forced_format("gfx/font.tga", "font.tga"),
            Some(TextureFormat::Bgra)
        );
        assert_eq!(
            config.patterns.forced_format("m/w_nx.png", "w_nx.png"),
            Some(TextureFormat::Dxt5Xgbr)
        );
        assert_eq!(
            config.patterns.forced_backend("ui/btn.png", "btn.png"),
            Some(BackendKind::Raw)
        );
    }

    #[test]
    fn test_invalid_pattern() {
        let err = parse("[patterns]\nnormal = [oops\n").unwrap_err();
        assert!(err.to_string().contains("patterns.normal"));
    }
}
