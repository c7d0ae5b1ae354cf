//! Human-readable byte sizes (e.g. "256MB") for configuration values.

use thiserror::Error;

const KB: usize = 1024;
const MB: usize = 1024 * KB;
const GB: usize = 1024 * MB;

/// Error parsing a size string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid size '{input}' - expected format like '1GB', '256MB', '512KB' or a byte count")]
pub struct SizeParseError {
    input: String,
}

/// Parse a size string into bytes.
///
/// Accepts a bare byte count or a `K`/`KB`, `M`/`MB`, `G`/`GB` suffix,
/// case-insensitive, with optional whitespace between number and suffix.
///
/// ```
/// use ddsforge::config::parse_size;
///
/// assert_eq!(parse_size("4096").unwrap(), 4096);
/// assert_eq!(parse_size("256MB").unwrap(), 256 * 1024 * 1024);
/// assert_eq!(parse_size("1 g").unwrap(), 1024 * 1024 * 1024);
/// ```
pub fn parse_size(s: &str) -> Result<usize, SizeParseError> {
    let err = || SizeParseError {
        input: s.to_string(),
    };

    let trimmed = s.trim();
    let upper = trimmed.to_ascii_uppercase();
    let digits_end = upper
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(upper.len());
    if digits_end == 0 {
        return Err(err());
    }

    let multiplier = match upper[digits_end..].trim() {
        "" | "B" => 1,
        "K" | "KB" => KB,
        "M" | "MB" => MB,
        "G" | "GB" => GB,
        _ => return Err(err()),
    };

    let value: usize = upper[..digits_end].parse().map_err(|_| err())?;
    value.checked_mul(multiplier).ok_or_else(err)
}

/// Format a byte count using the largest unit that divides it exactly.
pub fn format_size(bytes: usize) -> String {
    match bytes {
        b if b >= GB && b % GB == 0 => format!("{}GB", b / GB),
        b if b >= MB && b % MB == 0 => format!("{}MB", b / MB),
        b if b >= KB && b % KB == 0 => format!("{}KB", b / KB),
        b => b.to_string(),
    }
}

/// Convert a byte count to mebibytes for summary output.
pub fn to_megabytes(bytes: u64) -> f64 {
    bytes as f64 / MB as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_bytes() {
        assert_eq!(parse_size("0").unwrap(), 0);
        assert_eq!(parse_size(" 123 ").unwrap(), 123);
        assert_eq!(parse_size("10b").unwrap(), 10);
    }

    #[test]
    fn test_parse_suffixes() {
        assert_eq!(parse_size("2k").unwrap(), 2048);
        assert_eq!(parse_size("2 KB").unwrap(), 2048);
        assert_eq!(parse_size("64M").unwrap(), 64 * MB);
        assert_eq!(parse_size("3gb").unwrap(), 3 * GB);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_size("").is_err());
        assert!(parse_size("MB").is_err());
        assert!(parse_size("12TB").is_err());
        assert!(parse_size("1.5GB").is_err());
    }

    #[test]
    fn test_parse_overflow() {
        let huge = format!("{}GB", usize::MAX);
        assert!(parse_size(&huge).is_err());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512");
        assert_eq!(format_size(4 * KB), "4KB");
        assert_eq!(format_size(256 * MB), "256MB");
        assert_eq!(format_size(2 * GB), "2GB");
        assert_eq!(format_size(MB + 1), (MB + 1).to_string());
    }

    #[test]
    fn test_to_megabytes() {
        assert!((to_megabytes(3 * MB as u64) - 3.0).abs() < f64::EPSILON);
    }
}
