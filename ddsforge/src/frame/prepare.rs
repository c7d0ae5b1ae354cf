//! In-place frame preparation before compression.
//!
//! Steps run in a fixed order:
//!
//! ```text
//! swizzle ─► 2x upscale ─► power-of-two resize ─► binary alpha ─► mip chain
//! ```

use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::fmt;
use std::str::FromStr;

use super::mipmap::MipmapGenerator;
use super::types::{AlphaKind, Frame, SwizzleMode};

/// Alpha values below this become fully transparent when binarized.
pub const BINARY_ALPHA_THRESHOLD: u8 = 180;

/// Resampling filter used for upscaling and power-of-two resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleFilter {
    Box,
    #[default]
    Bilinear,
    Bicubic,
    CatmullRom,
    Lanczos,
}

impl ScaleFilter {
    pub fn name(&self) -> &'static str {
        match self {
            ScaleFilter::Box => "box",
            ScaleFilter::Bilinear => "bilinear",
            ScaleFilter::Bicubic => "bicubic",
            ScaleFilter::CatmullRom => "catmullrom",
            ScaleFilter::Lanczos => "lanczos",
        }
    }

    fn filter_type(&self) -> FilterType {
        match self {
            ScaleFilter::Box => FilterType::Nearest,
            ScaleFilter::Bilinear => FilterType::Triangle,
            // image has a single cubic kernel
            ScaleFilter::Bicubic | ScaleFilter::CatmullRom => FilterType::CatmullRom,
            ScaleFilter::Lanczos => FilterType::Lanczos3,
        }
    }
}

impl fmt::Display for ScaleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScaleFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "box" => Ok(ScaleFilter::Box),
            "bilinear" => Ok(ScaleFilter::Bilinear),
            "bicubic" => Ok(ScaleFilter::Bicubic),
            "catmullrom" => Ok(ScaleFilter::CatmullRom),
            "lanczos" => Ok(ScaleFilter::Lanczos),
            other => Err(format!("unknown scale filter '{}'", other)),
        }
    }
}

/// What to do to a frame before it is compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrepareOptions {
    pub swizzle: SwizzleMode,
    pub scale2x: bool,
    pub filter: ScaleFilter,
    /// Resize up to power-of-two dimensions.
    pub power_of_two: bool,
    /// Threshold alpha to 0/255 (1-bit alpha formats).
    pub binary_alpha: bool,
    pub mipmaps: bool,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            swizzle: SwizzleMode::None,
            scale2x: false,
            filter: ScaleFilter::default(),
            power_of_two: true,
            binary_alpha: false,
            mipmaps: true,
        }
    }
}

/// Run every enabled preparation step on `frame`.
///
/// Any existing mip chain is discarded and regenerated when mipmaps are
/// enabled, so the chain always matches the final base image.
pub fn prepare_frame(frame: &mut Frame, options: &PrepareOptions) {
    frame.mips.clear();

    apply_swizzle(frame, options.swizzle);
    if options.scale2x {
        scale_2x(frame, options.filter);
    }
    if options.power_of_two {
        make_power_of_two(frame, options.filter);
    }
    if options.binary_alpha && frame.has_alpha() {
        make_alpha_binary(frame, BINARY_ALPHA_THRESHOLD);
    }
    if options.mipmaps {
        frame.mips = MipmapGenerator::generate_chain(&frame.image);
    }
}

/// Rewrite channels for the target format.
pub fn apply_swizzle(frame: &mut Frame, mode: SwizzleMode) {
    match mode {
        SwizzleMode::None => {}
        SwizzleMode::Premultiply => {
            if !frame.has_alpha() {
                return;
            }
            for pixel in frame.image.pixels_mut() {
                let a = pixel[3] as u16;
                for c in 0..3 {
                    pixel[c] = ((pixel[c] as u16 * a + 127) / 255) as u8;
                }
            }
        }
        SwizzleMode::NormalRotate => {
            for pixel in frame.image.pixels_mut() {
                let [r, g, b, _] = pixel.0;
                pixel.0 = [0, g, b, r];
            }
            frame.alpha = AlphaKind::classify(&frame.image);
        }
    }
}

/// Upscale 2x with the given filter.
pub fn scale_2x(frame: &mut Frame, filter: ScaleFilter) {
    let (w, h) = frame.image.dimensions();
    frame.image = imageops::resize(&frame.image, w * 2, h * 2, filter.filter_type());
    frame.scale *= 2;
}

/// Resize up to the next power of two in each dimension. No-op when both
/// dimensions already are.
pub fn make_power_of_two(frame: &mut Frame, filter: ScaleFilter) {
    let (w, h) = frame.image.dimensions();
    let (pw, ph) = (w.next_power_of_two(), h.next_power_of_two());
    if (pw, ph) != (w, h) {
        frame.image = imageops::resize(&frame.image, pw, ph, filter.filter_type());
    }
}

/// Snap alpha to 0 or 255 around `threshold`.
///
/// The frame keeps reporting alpha even if every pixel ends up opaque.
pub fn make_alpha_binary(frame: &mut Frame, threshold: u8) {
    binarize_alpha(&mut frame.image, threshold);
    if frame.has_alpha() {
        frame.alpha = AlphaKind::Binary;
    }
}

fn binarize_alpha(image: &mut RgbaImage, threshold: u8) {
    for pixel in image.pixels_mut() {
        pixel[3] = if pixel[3] < threshold { 0 } else { 255 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn frame(w: u32, h: u32, px: [u8; 4]) -> Frame {
        Frame::new(RgbaImage::from_pixel(w, h, Rgba(px)))
    }

    #[test]
    fn test_scale_filter_from_str() {
        assert_eq!("Lanczos".parse::<ScaleFilter>().unwrap(), ScaleFilter::Lanczos);
        assert_eq!("box".parse::<ScaleFilter>().unwrap(), ScaleFilter::Box);
        assert!("super2x".parse::<ScaleFilter>().is_err());
    }

    #[test]
    fn test_premultiply() {
        let mut f = frame(2, 2, [200, 100, 50, 128]);
        apply_swizzle(&mut f, SwizzleMode::Premultiply);
        assert_eq!(f.image.get_pixel(0, 0), &Rgba([100, 50, 25, 128]));
    }

    #[test]
    fn test_premultiply_opaque_is_noop() {
        let mut f = frame(2, 2, [200, 100, 50, 255]);
        apply_swizzle(&mut f, SwizzleMode::Premultiply);
        assert_eq!(f.image.get_pixel(1, 1), &Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn test_normal_rotate_moves_red_to_alpha() {
        let mut f = frame(2, 2, [40, 128, 255, 255]);
        assert!(!f.has_alpha());
        apply_swizzle(&mut f, SwizzleMode::NormalRotate);
        assert_eq!(f.image.get_pixel(0, 0), &Rgba([0, 128, 255, 40]));
        assert_eq!(f.alpha, AlphaKind::Gradient);
    }

    #[test]
    fn test_scale_2x() {
        let mut f = frame(3, 5, [1, 2, 3, 255]);
        scale_2x(&mut f, ScaleFilter::Box);
        assert_eq!(f.image.dimensions(), (6, 10));
        assert_eq!(f.scale, 2);
    }

    #[test]
    fn test_power_of_two() {
        let mut f = frame(130, 64, [1, 2, 3, 255]);
        make_power_of_two(&mut f, ScaleFilter::Bilinear);
        assert_eq!(f.image.dimensions(), (256, 64));

        let mut f = frame(32, 32, [1, 2, 3, 255]);
        make_power_of_two(&mut f, ScaleFilter::Bilinear);
        assert_eq!(f.image.dimensions(), (32, 32));
    }

    #[test]
    fn test_binary_alpha_threshold() {
        let mut f = frame(2, 1, [9, 9, 9, 179]);
        f.image.put_pixel(1, 0, Rgba([9, 9, 9, 180]));
        make_alpha_binary(&mut f, BINARY_ALPHA_THRESHOLD);
        assert_eq!(f.image.get_pixel(0, 0)[3], 0);
        assert_eq!(f.image.get_pixel(1, 0)[3], 255);
        assert_eq!(f.alpha, AlphaKind::Binary);
    }

    #[test]
    fn test_binary_alpha_keeps_alpha_flag() {
        let mut f = frame(2, 2, [9, 9, 9, 200]);
        make_alpha_binary(&mut f, BINARY_ALPHA_THRESHOLD);
        assert!(f.has_alpha());
    }

    #[test]
    fn test_prepare_npot_allowed() {
        let mut f = frame(130, 130, [1, 2, 3, 255]);
        let options = PrepareOptions {
            power_of_two: false,
            mipmaps: false,
            ..Default::default()
        };
        prepare_frame(&mut f, &options);
        assert_eq!(f.image.dimensions(), (130, 130));
        assert!(f.mips.is_empty());
    }

    #[test]
    fn test_prepare_generates_matching_chain() {
        let mut f = frame(6, 3, [1, 2, 3, 255]);
        f.mips.push(RgbaImage::new(99, 99));
        prepare_frame(&mut f, &PrepareOptions::default());
        assert_eq!(f.image.dimensions(), (8, 4));
        let dims: Vec<_> = f.mips.iter().map(|m| m.dimensions()).collect();
        assert_eq!(dims, vec![(4, 2), (2, 1), (1, 1)]);
    }
}
