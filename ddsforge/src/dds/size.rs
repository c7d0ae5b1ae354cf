//! Exact byte sizes of DDS containers.
//!
//! Buffers are allocated once from these numbers and backends must fill
//! each layer region exactly, so this module is the single source of truth
//! for the container layout:
//!
//! ```text
//! ┌────────┬──────────────┬────────┬────────┬─────┐
//! │ header │ base layer   │ mip 1  │ mip 2  │ ... │
//! │ 128 B  │ layer_size() │        │        │     │
//! └────────┴──────────────┴────────┴────────┴─────┘
//! ```

use super::types::{TextureFormat, HEADER_SIZE};
use crate::frame::Frame;

/// Selects which parts of a container to count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeParts {
    pub header: bool,
    pub base: bool,
    pub mips: bool,
}

impl SizeParts {
    pub const ALL: SizeParts = SizeParts {
        header: true,
        base: true,
        mips: true,
    };
    pub const HEADER: SizeParts = SizeParts {
        header: true,
        base: false,
        mips: false,
    };
    pub const BASE: SizeParts = SizeParts {
        header: false,
        base: true,
        mips: false,
    };
    pub const MIPS: SizeParts = SizeParts {
        header: false,
        base: false,
        mips: true,
    };
}

/// Bytes needed to store one `width`×`height` level in `format`.
pub fn layer_size(width: u32, height: u32, format: TextureFormat) -> usize {
    let block = format.block_dim();
    let blocks_wide = width.div_ceil(block) as usize;
    let blocks_high = height.div_ceil(block) as usize;
    blocks_wide * blocks_high * format.bytes_per_block()
}

/// Size of each stored level of `frame`, base first.
pub fn layer_sizes(frame: &Frame, format: TextureFormat) -> Vec<usize> {
    frame
        .level_dimensions()
        .map(|(w, h)| layer_size(w, h, format))
        .collect()
}

/// Total size of the selected parts of the container for `frame`.
pub fn container_size(frame: &Frame, format: TextureFormat, parts: SizeParts) -> usize {
    let mut total = 0;
    if parts.header {
        total += HEADER_SIZE;
    }
    if parts.base {
        total += layer_size(frame.width(), frame.height(), format);
    }
    if parts.mips {
        total += frame
            .mips
            .iter()
            .map(|m| layer_size(m.width(), m.height(), format))
            .sum::<usize>();
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use proptest::prelude::*;

    fn frame_with_mips(w: u32, h: u32) -> Frame {
        let mut frame = Frame::new(RgbaImage::new(w, h));
        let (mut mw, mut mh) = (w, h);
        while mw > 1 || mh > 1 {
            mw = (mw / 2).max(1);
            mh = (mh / 2).max(1);
            frame.mips.push(RgbaImage::new(mw, mh));
        }
        frame
    }

    #[test]
    fn test_dxt1_128_no_mips() {
        let frame = Frame::new(RgbaImage::new(128, 128));
        assert_eq!(layer_size(128, 128, TextureFormat::Dxt1), 32 * 32 * 8);
        assert_eq!(
            container_size(&frame, TextureFormat::Dxt1, SizeParts::ALL),
            128 + 8192
        );
    }

    #[test]
    fn test_dxt5_130_block_grid() {
        assert_eq!(layer_size(130, 130, TextureFormat::Dxt5), 33 * 33 * 16);
    }

    #[test]
    fn test_small_levels_take_full_block() {
        assert_eq!(layer_size(1, 1, TextureFormat::Dxt1), 8);
        assert_eq!(layer_size(2, 1, TextureFormat::Dxt3), 16);
        assert_eq!(layer_size(1, 1, TextureFormat::Bgra), 4);
    }

    #[test]
    fn test_bgra_is_per_pixel() {
        assert_eq!(layer_size(130, 3, TextureFormat::Bgra), 130 * 3 * 4);
    }

    #[test]
    fn test_parts() {
        let frame = frame_with_mips(16, 16);
        // mips: 8x8, 4x4, 2x2, 1x1
        let mips = 4 * 8 + 8 + 8 + 8;
        assert_eq!(container_size(&frame, TextureFormat::Dxt1, SizeParts::HEADER), 128);
        assert_eq!(container_size(&frame, TextureFormat::Dxt1, SizeParts::BASE), 16 * 8);
        assert_eq!(container_size(&frame, TextureFormat::Dxt1, SizeParts::MIPS), mips);
        assert_eq!(
            container_size(&frame, TextureFormat::Dxt1, SizeParts::ALL),
            128 + 128 + mips
        );
    }

    #[test]
    fn test_layer_sizes_order() {
        let frame = frame_with_mips(8, 4);
        let sizes = layer_sizes(&frame, TextureFormat::Bgra);
        assert_eq!(sizes, vec![8 * 4 * 4, 4 * 2 * 4, 2 * 4, 4]);
    }

    proptest! {
        #[test]
        fn prop_total_is_sum_of_parts(w in 1u32..300, h in 1u32..300, fmt in 0usize..7) {
            let format = TextureFormat::ALL[fmt];
            let frame = frame_with_mips(w, h);
            let total = container_size(&frame, format, SizeParts::ALL);
            let parts = container_size(&frame, format, SizeParts::HEADER)
                + container_size(&frame, format, SizeParts::BASE)
                + container_size(&frame, format, SizeParts::MIPS);
            prop_assert_eq!(total, parts);
            prop_assert_eq!(total, HEADER_SIZE + layer_sizes(&frame, format).iter().sum::<usize>());
        }
    }
}
