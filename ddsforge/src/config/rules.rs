//! Per-file override rules keyed by file-name patterns.

use super::patterns::PatternList;
use crate::backend::BackendKind;
use crate::dds::TextureFormat;

/// Force-format lists in the order they are consulted. First match wins.
pub const FORCE_PRIORITY: [TextureFormat; 7] = [
    TextureFormat::Dxt1,
    TextureFormat::Dxt2,
    TextureFormat::Dxt3,
    TextureFormat::Dxt4,
    TextureFormat::Dxt5,
    TextureFormat::Bgra,
    TextureFormat::Dxt5Xgbr,
];

/// Backend override lists in the order they are consulted.
pub const BACKEND_PRIORITY: [BackendKind; 3] =
    [BackendKind::Ispc, BackendKind::Weighted, BackendKind::Raw];

/// Classification and override patterns from the `[patterns]` section.
#[derive(Debug, Clone, Default)]
pub struct PatternRules {
    /// Files treated as tangent-space normal maps.
    pub normal: PatternList,
    /// Files treated as height maps (always opaque DXT1).
    pub height: PatternList,
    /// Files that never get a mip chain.
    pub nomip: PatternList,
    /// Files upscaled 2x before compression.
    pub scale: PatternList,
    force: Vec<(TextureFormat, PatternList)>,
    backend: Vec<(BackendKind, PatternList)>,
}

impl PatternRules {
    /// Replace the force list for a format.
    pub fn set_force(&mut self, format: TextureFormat, list: PatternList) {
        self.force.retain(|(f, _)| *f != format);
        if !list.is_empty() {
            self.force.push((format, list));
        }
    }

    /// Replace the override list for a backend.
    pub fn set_backend(&mut self, kind: BackendKind, list: PatternList) {
        self.backend.retain(|(k, _)| *k != kind);
        if !list.is_empty() {
            self.backend.push((kind, list));
        }
    }

    /// The highest-priority forced format whose list matches the file.
    pub fn forced_format(&self, relative_path: &str, file_name: &str) -> Option<TextureFormat> {
        FORCE_PRIORITY.iter().copied().find(|format| {
            self.force
                .iter()
                .any(|(f, list)| f == format && list.matches_any(relative_path, file_name))
        })
    }

    /// The highest-priority backend whose list matches the file.
    pub fn forced_backend(&self, relative_path: &str, file_name: &str) -> Option<BackendKind> {
        BACKEND_PRIORITY.iter().copied().find(|kind| {
            self.backend
                .iter()
                .any(|(k, list)| k == kind && list.matches_any(relative_path, file_name))
        })
    }

    pub fn is_normal_map(&self, relative_path: &str, file_name: &str) -> bool {
        self.normal.matches_any(relative_path, file_name)
    }

    pub fn is_height_map(&self, relative_path: &str, file_name: &str) -> bool {
        self.height.matches_any(relative_path, file_name)
    }

    pub fn skips_mipmaps(&self, relative_path: &str, file_name: &str) -> bool {
        self.nomip.matches_any(relative_path, file_name)
    }

    pub fn wants_scale2x(&self, relative_path: &str, file_name: &str) -> bool {
        self.scale.matches_any(relative_path, file_name)
    }
}
