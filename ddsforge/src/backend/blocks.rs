//! 4×4 block encoding primitives for BC1, BC2 and BC3.
//!
//! BC1 colour block (8 bytes):
//! - 2 bytes: color0 (RGB565)
//! - 2 bytes: color1 (RGB565)
//! - 4 bytes: 16 2-bit palette indices
//!
//! With color0 > color1 the palette is {c0, c1, 2/3 c0 + 1/3 c1,
//! 1/3 c0 + 2/3 c1}. With color0 <= color1 it is {c0, c1, 1/2 c0 + 1/2 c1,
//! transparent black}, which is how DXT1 stores 1-bit alpha.

use crate::frame::{ChannelWeights, LayerInput};

/// 16 RGBA pixels in row-major order.
pub type Block = [[u8; 4]; 16];

/// Alpha below this is transparent in 3-colour DXT1 blocks.
const DXT1_ALPHA_CUTOFF: u8 = 128;

/// Weighted squared RGB distance used to pick palette entries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMetric {
    weights: [f32; 3],
}

impl ColorMetric {
    /// Green-heavy weighting approximating perceived brightness.
    pub fn perceptual() -> Self {
        Self {
            weights: [3.0, 6.0, 1.0],
        }
    }

    pub fn from_weights(weights: Option<ChannelWeights>) -> Self {
        match weights {
            Some(w) => Self {
                weights: [w.red, w.green, w.blue],
            },
            None => Self::perceptual(),
        }
    }

    pub fn distance(&self, a: &[u8; 4], b: &[u8; 3]) -> f32 {
        (0..3)
            .map(|c| {
                let d = (a[c] as f32 - b[c] as f32) * self.weights[c];
                d * d
            })
            .sum()
    }
}

/// Copy the 4×4 block at block coordinates (`bx`, `by`) out of a layer,
/// replicating edge pixels when the layer is not block aligned.
pub fn extract_block(layer: &LayerInput<'_>, bx: u32, by: u32) -> Block {
    let mut block = [[0u8; 4]; 16];
    let max_x = layer.width - 1;
    let max_y = layer.height - 1;
    for (i, pixel) in block.iter_mut().enumerate() {
        let x = (bx * 4 + (i as u32 % 4)).min(max_x);
        let y = (by * 4 + (i as u32 / 4)).min(max_y);
        let offset = ((y * layer.width + x) * 4) as usize;
        pixel.copy_from_slice(&layer.pixels[offset..offset + 4]);
    }
    block
}

pub fn rgb888_to_rgb565(r: u8, g: u8, b: u8) -> u16 {
    let r5 = (r >> 3) as u16;
    let g6 = (g >> 2) as u16;
    let b5 = (b >> 3) as u16;
    (r5 << 11) | (g6 << 5) | b5
}

/// Expand RGB565, replicating high bits into the low bits.
pub fn rgb565_to_rgb888(color: u16) -> [u8; 3] {
    let r5 = (color >> 11) & 0x1F;
    let g6 = (color >> 5) & 0x3F;
    let b5 = color & 0x1F;
    [
        ((r5 << 3) | (r5 >> 2)) as u8,
        ((g6 << 2) | (g6 >> 4)) as u8,
        ((b5 << 3) | (b5 >> 2)) as u8,
    ]
}

fn mix(a: [u8; 3], b: [u8; 3], wa: u16, wb: u16) -> [u8; 3] {
    let total = wa + wb;
    [
        ((a[0] as u16 * wa + b[0] as u16 * wb) / total) as u8,
        ((a[1] as u16 * wa + b[1] as u16 * wb) / total) as u8,
        ((a[2] as u16 * wa + b[2] as u16 * wb) / total) as u8,
    ]
}

/// Bounding-box endpoints over the selected pixels, as (max, min) RGB565.
fn bounding_endpoints<'a>(pixels: impl Iterator<Item = &'a [u8; 4]>) -> (u16, u16) {
    let mut min = [255u8; 3];
    let mut max = [0u8; 3];
    for pixel in pixels {
        for c in 0..3 {
            min[c] = min[c].min(pixel[c]);
            max[c] = max[c].max(pixel[c]);
        }
    }
    (
        rgb888_to_rgb565(max[0], max[1], max[2]),
        rgb888_to_rgb565(min[0], min[1], min[2]),
    )
}

fn nearest(palette: &[[u8; 3]], pixel: &[u8; 4], metric: &ColorMetric) -> u32 {
    let mut best_index = 0;
    let mut best_dist = f32::MAX;
    for (idx, color) in palette.iter().enumerate() {
        let dist = metric.distance(pixel, color);
        if dist < best_dist {
            best_dist = dist;
            best_index = idx as u32;
        }
    }
    best_index
}

fn pack_color(c0: u16, c1: u16, indices: u32) -> [u8; 8] {
    let mut output = [0u8; 8];
    output[0..2].copy_from_slice(&c0.to_le_bytes());
    output[2..4].copy_from_slice(&c1.to_le_bytes());
    output[4..8].copy_from_slice(&indices.to_le_bytes());
    output
}

/// True when any pixel falls below the DXT1 alpha cutoff.
pub fn has_cutout(block: &Block) -> bool {
    block.iter().any(|p| p[3] < DXT1_ALPHA_CUTOFF)
}

/// Encode the colour half of a block.
///
/// With `punch_through` set and any pixel below the alpha cutoff, the
/// 3-colour + transparent mode is used; otherwise always 4-colour mode.
pub fn encode_color_block(block: &Block, metric: &ColorMetric, punch_through: bool) -> [u8; 8] {
    if punch_through && has_cutout(block) {
        return encode_punch_through(block, metric);
    }

    let (mut c0, mut c1) = bounding_endpoints(block.iter());
    if c0 < c1 {
        std::mem::swap(&mut c0, &mut c1);
    }
    if c0 == c1 {
        return pack_color(c0, c1, 0);
    }

    let e0 = rgb565_to_rgb888(c0);
    let e1 = rgb565_to_rgb888(c1);
    let palette = [e0, e1, mix(e0, e1, 2, 1), mix(e0, e1, 1, 2)];

    let mut indices = 0u32;
    for (i, pixel) in block.iter().enumerate() {
        indices |= nearest(&palette, pixel, metric) << (i * 2);
    }
    pack_color(c0, c1, indices)
}

fn encode_punch_through(block: &Block, metric: &ColorMetric) -> [u8; 8] {
    let opaque = |p: &&[u8; 4]| p[3] >= DXT1_ALPHA_CUTOFF;
    if !block.iter().any(|p| opaque(&p)) {
        return pack_color(0, 0, u32::MAX);
    }

    let (mut c0, mut c1) = bounding_endpoints(block.iter().filter(opaque));
    if c0 > c1 {
        std::mem::swap(&mut c0, &mut c1);
    }

    let e0 = rgb565_to_rgb888(c0);
    let e1 = rgb565_to_rgb888(c1);
    let palette = [e0, e1, mix(e0, e1, 1, 1)];

    let mut indices = 0u32;
    for (i, pixel) in block.iter().enumerate() {
        let index = if pixel[3] < DXT1_ALPHA_CUTOFF {
            3
        } else {
            nearest(&palette, pixel, metric)
        };
        indices |= index << (i * 2);
    }
    pack_color(c0, c1, indices)
}

/// BC2 alpha half: 16 explicit 4-bit values.
pub fn encode_explicit_alpha(block: &Block) -> [u8; 8] {
    let mut bits = 0u64;
    for (i, pixel) in block.iter().enumerate() {
        let nibble = (pixel[3] as u64 * 15 + 127) / 255;
        bits |= nibble << (i * 4);
    }
    bits.to_le_bytes()
}

/// BC3 alpha half: two endpoints and 16 3-bit indices into an 8-entry ramp.
pub fn encode_interpolated_alpha(block: &Block) -> [u8; 8] {
    let (mut min, mut max) = (255u8, 0u8);
    for pixel in block {
        min = min.min(pixel[3]);
        max = max.max(pixel[3]);
    }

    let (a0, a1) = (max as u16, min as u16);
    let palette = [
        max,
        min,
        ((6 * a0 + a1) / 7) as u8,
        ((5 * a0 + 2 * a1) / 7) as u8,
        ((4 * a0 + 3 * a1) / 7) as u8,
        ((3 * a0 + 4 * a1) / 7) as u8,
        ((2 * a0 + 5 * a1) / 7) as u8,
        ((a0 + 6 * a1) / 7) as u8,
    ];

    let mut indices = 0u64;
    for (i, pixel) in block.iter().enumerate() {
        let mut best_index = 0u64;
        let mut best_dist = u32::MAX;
        for (idx, &value) in palette.iter().enumerate() {
            let dist = (pixel[3] as i32 - value as i32).unsigned_abs();
            if dist < best_dist {
                best_dist = dist;
                best_index = idx as u64;
            }
        }
        indices |= best_index << (i * 3);
    }

    let mut output = [0u8; 8];
    output[0] = max;
    output[1] = min;
    output[2..8].copy_from_slice(&indices.to_le_bytes()[0..6]);
    output
}
