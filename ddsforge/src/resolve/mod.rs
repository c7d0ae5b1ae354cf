//! Per-frame format and backend selection.
//!
//! The resolver is a pure function of the frame's alpha state, the source's
//! name and the immutable [`ConversionConfig`]:
//!
//! ```text
//!   heuristic ──► forced format / force lists ──► alpha downgrade
//!                                                      │
//!          weights ◄── backend selection ◄── swizzle ◄─┘
//! ```

use crate::backend::BackendKind;
use crate::config::{BackendMode, ConversionConfig};
use crate::dds::TextureFormat;
use crate::frame::{AlphaKind, ChannelWeights, Frame, SwizzleMode};
use crate::source::SourceFile;

/// Everything decided about how one frame is stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormatDecision {
    pub format: TextureFormat,
    pub swizzle: SwizzleMode,
    pub backend: BackendKind,
    pub weights: Option<ChannelWeights>,
}

/// Resolves [`FormatDecision`]s against a fixed configuration.
#[derive(Debug, Clone, Copy)]
pub struct FormatResolver<'a> {
    config: &'a ConversionConfig,
}

impl<'a> FormatResolver<'a> {
    pub fn new(config: &'a ConversionConfig) -> Self {
        Self { config }
    }

    pub fn resolve(&self, frame: &Frame, source: &SourceFile) -> FormatDecision {
        let relative_path = source.relative_path();
        let file_name = source.file_name();
        let patterns = &self.config.patterns;
        let is_normal = patterns.is_normal_map(&relative_path, &file_name);

        let format = self
            .config
            .forced_format
            .or_else(|| patterns.forced_format(&relative_path, &file_name))
            .unwrap_or_else(|| self.default_format(frame, &relative_path, &file_name, is_normal));
        let format = downgrade_for_alpha(format, frame.has_alpha());

        let swizzle = swizzle_for(format);
        let backend = self.select_backend(format, is_normal, &relative_path, &file_name);
        let weights = match backend {
            BackendKind::Weighted if format == TextureFormat::Dxt5Xgbr => {
                Some(ChannelWeights::SWIZZLED_NORMAL)
            }
            BackendKind::Weighted if is_normal => Some(ChannelWeights::NORMAL),
            _ => None,
        };

        FormatDecision {
            format,
            swizzle,
            backend,
            weights,
        }
    }

    fn default_format(
        &self,
        frame: &Frame,
        relative_path: &str,
        file_name: &str,
        is_normal: bool,
    ) -> TextureFormat {
        if self.config.patterns.is_height_map(relative_path, file_name) {
            TextureFormat::Dxt1
        } else if is_normal && self.config.swizzled_normals {
            TextureFormat::Dxt5Xgbr
        } else if frame.alpha == AlphaKind::Gradient {
            TextureFormat::Dxt5
        } else {
            TextureFormat::Dxt1
        }
    }

    fn select_backend(
        &self,
        format: TextureFormat,
        is_normal: bool,
        relative_path: &str,
        file_name: &str,
    ) -> BackendKind {
        if format == TextureFormat::Bgra {
            return BackendKind::Raw;
        }

        match self.config.backend {
            BackendMode::Ispc => BackendKind::Ispc,
            BackendMode::Weighted => BackendKind::Weighted,
            BackendMode::Auto => {
                let heuristic = if is_normal {
                    BackendKind::Ispc
                } else {
                    BackendKind::Weighted
                };
                self.config
                    .patterns
                    .forced_backend(relative_path, file_name)
                    .unwrap_or(heuristic)
            }
        }
    }
}

/// Replace alpha-dependent formats with `Dxt1` for frames without alpha.
///
/// Idempotent: applying it to its own result changes nothing.
pub fn downgrade_for_alpha(format: TextureFormat, has_alpha: bool) -> TextureFormat {
    if format.requires_alpha() && !has_alpha {
        TextureFormat::Dxt1
    } else {
        format
    }
}

/// Channel rewrite a format needs before encoding.
pub fn swizzle_for(format: TextureFormat) -> SwizzleMode {
    match format {
        TextureFormat::Dxt5Xgbr => SwizzleMode::NormalRotate,
        TextureFormat::Dxt2 | TextureFormat::Dxt4 => SwizzleMode::Premultiply,
        _ => SwizzleMode::None,
    }
}

#[cfg(test)]
mod tests;
