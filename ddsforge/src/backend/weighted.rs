//! Channel-weighted block encoder.
//!
//! Slower to tune than the ISPC kernels but honours per-channel weights,
//! which matters for normal maps where one channel carries no signal.

use thiserror::Error;

use super::blocks::{
    encode_color_block, encode_explicit_alpha, encode_interpolated_alpha, extract_block,
    ColorMetric,
};
use super::{check_request, BackendError, CompressionBackend};
use crate::dds::TextureFormat;
use crate::frame::{ChannelWeights, LayerInput};

/// Reasons the weighted encoder refuses a layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncoderFailure {
    #[error("layer has zero width or height")]
    EmptyLayer,

    #[error("pixel buffer holds {actual} bytes, {expected} expected")]
    PixelCountMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Default)]
pub struct WeightedBackend;

impl WeightedBackend {
    pub fn new() -> Self {
        Self
    }
}

impl CompressionBackend for WeightedBackend {
    fn name(&self) -> &'static str {
        "weighted"
    }

    fn supports(&self, format: TextureFormat) -> bool {
        format.is_compressed()
    }

    fn encode_layer(
        &self,
        layer: &LayerInput<'_>,
        format: TextureFormat,
        weights: Option<ChannelWeights>,
        dst: &mut [u8],
    ) -> Result<usize, BackendError> {
        let expected = check_request(self, layer, format, dst)?;
        if layer.width == 0 || layer.height == 0 {
            return Err(EncoderFailure::EmptyLayer.into());
        }
        let pixel_bytes = layer.width as usize * layer.height as usize * 4;
        if layer.pixels.len() != pixel_bytes {
            return Err(EncoderFailure::PixelCountMismatch {
                expected: pixel_bytes,
                actual: layer.pixels.len(),
            }
            .into());
        }

        let metric = ColorMetric::from_weights(weights);
        let block_size = format.bytes_per_block();
        let blocks_wide = layer.width.div_ceil(4);
        let blocks_high = layer.height.div_ceil(4);

        let mut chunks = dst.chunks_exact_mut(block_size);
        for by in 0..blocks_high {
            for bx in 0..blocks_wide {
                let block = extract_block(layer, bx, by);
                let Some(out) = chunks.next() else {
                    return Err(BackendError::RegionMismatch {
                        backend: self.name(),
                        expected,
                        actual: expected,
                    });
                };
                match format {
                    TextureFormat::Dxt1 => {
                        out.copy_from_slice(&encode_color_block(&block, &metric, layer.has_alpha));
                    }
                    TextureFormat::Dxt2 | TextureFormat::Dxt3 => {
                        out[0..8].copy_from_slice(&encode_explicit_alpha(&block));
                        out[8..16].copy_from_slice(&encode_color_block(&block, &metric, false));
                    }
                    _ => {
                        out[0..8].copy_from_slice(&encode_interpolated_alpha(&block));
                        out[8..16].copy_from_slice(&encode_color_block(&block, &metric, false));
                    }
                }
            }
        }

        Ok(expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dds::layer_size;

    fn solid(width: u32, height: u32, px: [u8; 4]) -> Vec<u8> {
        px.iter()
            .copied()
            .cycle()
            .take((width * height * 4) as usize)
            .collect()
    }

    #[test]
    fn test_dxt1_solid_layer() {
        let pixels = solid(8, 8, [255, 0, 0, 255]);
        let layer = LayerInput {
            pixels: &pixels,
            width: 8,
            height: 8,
            has_alpha: false,
        };
        let mut dst = vec![0xAAu8; layer_size(8, 8, TextureFormat::Dxt1)];
        let written = WeightedBackend::new()
            .encode_layer(&layer, TextureFormat::Dxt1, None, &mut dst)
            .unwrap();
        assert_eq!(written, 32);
        for block in dst.chunks(8) {
            assert_eq!(block, &[0x00u8, 0xF8, 0x00, 0xF8, 0, 0, 0, 0]);
        }
    }

    #[test]
    fn test_dxt5_layout() {
        let pixels = solid(4, 4, [0, 0, 255, 128]);
        let layer = LayerInput {
            pixels: &pixels,
            width: 4,
            height: 4,
            has_alpha: true,
        };
        let mut dst = vec![0u8; 16];
        WeightedBackend::new()
            .encode_layer(&layer, TextureFormat::Dxt5, None, &mut dst)
            .unwrap();
        assert_eq!(dst[0], 128);
        assert_eq!(dst[1], 128);
        assert_eq!(u16::from_le_bytes([dst[8], dst[9]]), 0x001F);
    }

    #[test]
    fn test_dxt3_layout() {
        let pixels = solid(4, 4, [0, 0, 0, 255]);
        let layer = LayerInput {
            pixels: &pixels,
            width: 4,
            height: 4,
            has_alpha: true,
        };
        let mut dst = vec![0u8; 16];
        WeightedBackend::new()
            .encode_layer(&layer, TextureFormat::Dxt3, None, &mut dst)
            .unwrap();
        assert!(dst[0..8].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_npot_layer_block_count() {
        let pixels = solid(130, 130, [10, 20, 30, 255]);
        let layer = LayerInput {
            pixels: &pixels,
            width: 130,
            height: 130,
            has_alpha: false,
        };
        let mut dst = vec![0u8; 33 * 33 * 16];
        let written = WeightedBackend::new()
            .encode_layer(&layer, TextureFormat::Dxt5, None, &mut dst)
            .unwrap();
        assert_eq!(written, 33 * 33 * 16);
    }

    #[test]
    fn test_pixel_count_mismatch() {
        let pixels = vec![0u8; 10];
        let layer = LayerInput {
            pixels: &pixels,
            width: 4,
            height: 4,
            has_alpha: false,
        };
        let mut dst = vec![0u8; 8];
        let err = WeightedBackend::new()
            .encode_layer(&layer, TextureFormat::Dxt1, None, &mut dst)
            .unwrap_err();
        assert!(matches!(
            err,
            BackendError::Encoder(EncoderFailure::PixelCountMismatch {
                expected: 64,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_empty_layer() {
        let layer = LayerInput {
            pixels: &[],
            width: 0,
            height: 4,
            has_alpha: false,
        };
        let err = WeightedBackend::new()
            .encode_layer(&layer, TextureFormat::Dxt1, None, &mut [])
            .unwrap_err();
        assert!(matches!(err, BackendError::Encoder(EncoderFailure::EmptyLayer)));
    }
}
