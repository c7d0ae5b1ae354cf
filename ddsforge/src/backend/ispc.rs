//! ISPC block compressor backed by `intel_tex_2`.
//!
//! The kernels only accept block-aligned surfaces, so unaligned levels are
//! padded by edge replication first. They take no channel weights; weights
//! passed in are ignored.
//!
//! The BC1 kernel is opaque-only. DXT1 layers with alpha get every block
//! holding a cutout texel re-encoded in 3-colour + transparent mode.

use std::borrow::Cow;

use intel_tex_2::{bc1, bc3, RgbaSurface};

use super::blocks::{
    encode_color_block, encode_explicit_alpha, extract_block, has_cutout, ColorMetric,
};
use super::{check_request, BackendError, CompressionBackend};
use crate::dds::TextureFormat;
use crate::frame::{ChannelWeights, LayerInput};

/// Layer dimensions or pixel buffer unusable.
pub const CODE_BAD_INPUT: i32 = 1;
/// Kernel produced a different number of bytes than the layer needs.
pub const CODE_OUTPUT_SIZE: i32 = 2;

#[derive(Debug, Default)]
pub struct IspcBackend;

impl IspcBackend {
    pub fn new() -> Self {
        Self
    }

    fn fail(&self, code: i32) -> BackendError {
        BackendError::Code {
            backend: self.name(),
            code,
        }
    }
}

/// Pixels padded up to a multiple of 4 in both dimensions.
fn block_aligned<'a>(layer: &LayerInput<'a>) -> (Cow<'a, [u8]>, u32, u32) {
    let width = layer.width.div_ceil(4) * 4;
    let height = layer.height.div_ceil(4) * 4;
    if (width, height) == (layer.width, layer.height) {
        return (Cow::Borrowed(layer.pixels), width, height);
    }

    let mut padded = vec![0u8; (width * height * 4) as usize];
    for y in 0..height {
        let sy = y.min(layer.height - 1);
        for x in 0..width {
            let sx = x.min(layer.width - 1);
            let src = ((sy * layer.width + sx) * 4) as usize;
            let dst = ((y * width + x) * 4) as usize;
            padded[dst..dst + 4].copy_from_slice(&layer.pixels[src..src + 4]);
        }
    }
    (Cow::Owned(padded), width, height)
}

/// Re-encode BC1 blocks that contain cutout texels.
fn punch_through_cutouts(layer: &LayerInput<'_>, dst: &mut [u8]) {
    let metric = ColorMetric::perceptual();
    let blocks_wide = layer.width.div_ceil(4);
    for (i, out) in dst.chunks_exact_mut(8).enumerate() {
        let i = i as u32;
        let block = extract_block(layer, i % blocks_wide, i / blocks_wide);
        if has_cutout(&block) {
            out.copy_from_slice(&encode_color_block(&block, &metric, true));
        }
    }
}

impl CompressionBackend for IspcBackend {
    fn name(&self) -> &'static str {
        "ispc"
    }

    fn supports(&self, format: TextureFormat) -> bool {
        format.is_compressed()
    }

    fn encode_layer(
        &self,
        layer: &LayerInput<'_>,
        format: TextureFormat,
        _weights: Option<ChannelWeights>,
        dst: &mut [u8],
    ) -> Result<usize, BackendError> {
        let expected = check_request(self, layer, format, dst)?;
        if layer.width == 0
            || layer.height == 0
            || layer.pixels.len() != layer.width as usize * layer.height as usize * 4
        {
            return Err(self.fail(CODE_BAD_INPUT));
        }

        let (pixels, width, height) = block_aligned(layer);
        let surface = RgbaSurface {
            data: &pixels,
            width,
            height,
            stride: width * 4,
        };

        match format {
            TextureFormat::Dxt1 => {
                let encoded = bc1::compress_blocks(&surface);
                if encoded.len() != expected {
                    return Err(self.fail(CODE_OUTPUT_SIZE));
                }
                dst.copy_from_slice(&encoded);
                if layer.has_alpha {
                    punch_through_cutouts(layer, dst);
                }
            }
            TextureFormat::Dxt2 | TextureFormat::Dxt3 => {
                // BC2 = explicit alpha block followed by a BC1 colour block
                let colour = bc1::compress_blocks(&surface);
                if colour.len() * 2 != expected {
                    return Err(self.fail(CODE_OUTPUT_SIZE));
                }
                let blocks_wide = layer.width.div_ceil(4);
                let pairs = dst.chunks_exact_mut(16).zip(colour.chunks_exact(8));
                for (i, (out, colour)) in pairs.enumerate() {
                    let i = i as u32;
                    let block = extract_block(layer, i % blocks_wide, i / blocks_wide);
                    out[0..8].copy_from_slice(&encode_explicit_alpha(&block));
                    out[8..16].copy_from_slice(colour);
                }
            }
            _ => {
                let encoded = bc3::compress_blocks(&surface);
                if encoded.len() != expected {
                    return Err(self.fail(CODE_OUTPUT_SIZE));
                }
                dst.copy_from_slice(&encoded);
            }
        }

        Ok(expected)
    }
}
