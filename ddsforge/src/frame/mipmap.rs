//! Box-filter mip chain generation.

use image::{Rgba, RgbaImage};

/// Mip chain generator.
pub struct MipmapGenerator;

impl MipmapGenerator {
    /// Generate every level below `source` down to 1×1, finest first.
    ///
    /// Each level is half the previous one rounded down, with a 1 pixel
    /// minimum per side, so non-square and odd sizes are handled.
    pub fn generate_chain(source: &RgbaImage) -> Vec<RgbaImage> {
        let mut mips: Vec<RgbaImage> = Vec::new();
        loop {
            let current = mips.last().unwrap_or(source);
            if current.width() <= 1 && current.height() <= 1 {
                break;
            }
            let next = Self::downsample_box_2x(current);
            mips.push(next);
        }
        mips
    }

    /// Downsample by 2× averaging 2×2 blocks. Edge pixels are clamped when a
    /// dimension is odd or already 1.
    fn downsample_box_2x(source: &RgbaImage) -> RgbaImage {
        let (sw, sh) = source.dimensions();
        let new_width = (sw / 2).max(1);
        let new_height = (sh / 2).max(1);

        let mut output = RgbaImage::new(new_width, new_height);

        for y in 0..new_height {
            let y0 = (y * 2).min(sh - 1);
            let y1 = (y * 2 + 1).min(sh - 1);
            for x in 0..new_width {
                let x0 = (x * 2).min(sw - 1);
                let x1 = (x * 2 + 1).min(sw - 1);

                let p00 = source.get_pixel(x0, y0);
                let p10 = source.get_pixel(x1, y0);
                let p01 = source.get_pixel(x0, y1);
                let p11 = source.get_pixel(x1, y1);

                let mut avg = [0u8; 4];
                for (c, out) in avg.iter_mut().enumerate() {
                    let sum = p00[c] as u16 + p10[c] as u16 + p01[c] as u16 + p11[c] as u16;
                    *out = ((sum + 2) / 4) as u8;
                }

                output.put_pixel(x, y, Rgba(avg));
            }
        }

        output
    }
}
