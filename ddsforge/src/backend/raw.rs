//! Uncompressed BGRA packing.

use super::{check_request, BackendError, CompressionBackend};
use crate::dds::TextureFormat;
use crate::frame::{ChannelWeights, LayerInput};

/// Reorders RGBA8 into B8G8R8A8. Opaque layers get alpha forced to 255.
#[derive(Debug, Default)]
pub struct RawBackend;

impl RawBackend {
    pub fn new() -> Self {
        Self
    }
}

impl CompressionBackend for RawBackend {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn supports(&self, format: TextureFormat) -> bool {
        format == TextureFormat::Bgra
    }

    fn encode_layer(
        &self,
        layer: &LayerInput<'_>,
        format: TextureFormat,
        _weights: Option<ChannelWeights>,
        dst: &mut [u8],
    ) -> Result<usize, BackendError> {
        let expected = check_request(self, layer, format, dst)?;
        if layer.pixels.len() != expected {
            return Err(BackendError::RegionMismatch {
                backend: self.name(),
                expected,
                actual: layer.pixels.len(),
            });
        }

        for (out, px) in dst.chunks_exact_mut(4).zip(layer.pixels.chunks_exact(4)) {
            out[0] = px[2];
            out[1] = px[1];
            out[2] = px[0];
            out[3] = if layer.has_alpha { px[3] } else { 255 };
        }
        Ok(expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reorders_channels() {
        let pixels = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let layer = LayerInput {
            pixels: &pixels,
            width: 2,
            height: 1,
            has_alpha: true,
        };
        let mut dst = [0u8; 8];
        let written = RawBackend::new()
            .encode_layer(&layer, TextureFormat::Bgra, None, &mut dst)
            .unwrap();
        assert_eq!(written, 8);
        assert_eq!(dst, [3, 2, 1, 4, 7, 6, 5, 8]);
    }

    #[test]
    fn test_opaque_layer_gets_full_alpha() {
        let pixels = [10u8, 20, 30, 0];
        let layer = LayerInput {
            pixels: &pixels,
            width: 1,
            height: 1,
            has_alpha: false,
        };
        let mut dst = [0u8; 4];
        RawBackend::new()
            .encode_layer(&layer, TextureFormat::Bgra, None, &mut dst)
            .unwrap();
        assert_eq!(dst, [30, 20, 10, 255]);
    }

    #[test]
    fn test_short_pixel_buffer() {
        let pixels = [0u8; 4];
        let layer = LayerInput {
            pixels: &pixels,
            width: 2,
            height: 1,
            has_alpha: false,
        };
        let mut dst = [0u8; 8];
        assert!(RawBackend::new()
            .encode_layer(&layer, TextureFormat::Bgra, None, &mut dst)
            .is_err());
    }
}
