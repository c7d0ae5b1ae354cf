//! Decoded frames and their per-layer views.

use image::RgbaImage;

/// How a frame uses its alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaKind {
    /// Every pixel is fully opaque.
    None,
    /// Only fully opaque and fully transparent pixels.
    Binary,
    /// Intermediate alpha values present.
    Gradient,
}

impl AlphaKind {
    /// Classify the alpha channel of an RGBA buffer.
    pub fn classify(image: &RgbaImage) -> Self {
        let mut kind = AlphaKind::None;
        for pixel in image.pixels() {
            match pixel[3] {
                255 => {}
                0 => kind = AlphaKind::Binary,
                _ => return AlphaKind::Gradient,
            }
        }
        kind
    }
}

/// Relative importance of the R, G and B channels for colour-distance
/// based block encoders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelWeights {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl ChannelWeights {
    /// Swizzled normal maps: red lives in alpha, so only G and B matter.
    pub const SWIZZLED_NORMAL: ChannelWeights = ChannelWeights {
        red: 0.0,
        green: 0.75,
        blue: 0.25,
    };

    /// Plain normal maps: X and Y carry the signal, Z is derived.
    pub const NORMAL: ChannelWeights = ChannelWeights {
        red: 0.5,
        green: 0.5,
        blue: 0.0,
    };

    pub fn new(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }
}

/// Channel rewrite applied to a frame before compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwizzleMode {
    #[default]
    None,
    /// Multiply colour by alpha (DXT2/DXT4).
    Premultiply,
    /// Move red into alpha and clear red (xGBR normal maps).
    NormalRotate,
}

/// One image of a source texture together with its mip chain.
///
/// `mips` holds the levels below the base image, finest first. Each level is
/// half the previous one rounded down with a 1 pixel minimum.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbaImage,
    /// Alpha of the current pixels. Swizzling can change it.
    pub alpha: AlphaKind,
    /// Whether the decoded source carried alpha, fixed at load time.
    pub source_alpha: bool,
    /// Bytes per pixel of the decoded source (3 or 4).
    pub source_bpp: u8,
    pub mips: Vec<RgbaImage>,
    pub weights: Option<ChannelWeights>,
    /// Output name used instead of the source name (multi-frame sources).
    pub name_override: Option<String>,
    /// Upscale factor applied during preparation (1 or 2).
    pub scale: u32,
    /// This frame's share of the encoded source file size.
    pub source_bytes: u64,
}

impl Frame {
    /// Wrap a decoded image, classifying its alpha channel.
    pub fn new(image: RgbaImage) -> Self {
        let alpha = AlphaKind::classify(&image);
        let source_bpp = if alpha == AlphaKind::None { 3 } else { 4 };
        Self {
            image,
            alpha,
            source_alpha: alpha != AlphaKind::None,
            source_bpp,
            mips: Vec::new(),
            weights: None,
            name_override: None,
            scale: 1,
            source_bytes: 0,
        }
    }

    pub fn with_source_bpp(mut self, bpp: u8) -> Self {
        self.source_bpp = bpp;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name_override = Some(name.into());
        self
    }

    pub fn with_source_bytes(mut self, bytes: u64) -> Self {
        self.source_bytes = bytes;
        self
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn has_alpha(&self) -> bool {
        self.alpha != AlphaKind::None
    }

    /// Number of stored levels including the base image.
    pub fn level_count(&self) -> usize {
        1 + self.mips.len()
    }

    /// Dimensions of every level, base first.
    pub fn level_dimensions(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        std::iter::once(self.image.dimensions()).chain(self.mips.iter().map(|m| m.dimensions()))
    }

    /// View of level `index` (0 = base) for a compression backend.
    pub fn layer(&self, index: usize) -> Option<LayerInput<'_>> {
        let image = if index == 0 {
            &self.image
        } else {
            self.mips.get(index - 1)?
        };
        Some(LayerInput {
            pixels: image.as_raw(),
            width: image.width(),
            height: image.height(),
            has_alpha: self.has_alpha(),
        })
    }

    /// Size of the decoded source texture in memory, before upscaling.
    pub fn original_texture_bytes(&self) -> u64 {
        let scale = u64::from(self.scale.max(1));
        let pixels = u64::from(self.width()) * u64::from(self.height()) / (scale * scale);
        pixels * u64::from(self.source_bpp)
    }
}

/// Borrowed RGBA8 pixels of one level.
#[derive(Debug, Clone, Copy)]
pub struct LayerInput<'a> {
    pub pixels: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub has_alpha: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_classify_opaque() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        assert_eq!(AlphaKind::classify(&img), AlphaKind::None);
    }

    #[test]
    fn test_classify_binary() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        img.put_pixel(1, 1, Rgba([0, 0, 0, 0]));
        assert_eq!(AlphaKind::classify(&img), AlphaKind::Binary);
    }

    #[test]
    fn test_classify_gradient() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        img.put_pixel(3, 3, Rgba([0, 0, 0, 128]));
        assert_eq!(AlphaKind::classify(&img), AlphaKind::Gradient);
    }

    #[test]
    fn test_new_frame_bpp() {
        let opaque = Frame::new(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255])));
        assert_eq!(opaque.source_bpp, 3);
        assert!(!opaque.has_alpha());

        let alpha = Frame::new(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 7])));
        assert_eq!(alpha.source_bpp, 4);
        assert!(alpha.has_alpha());
    }

    #[test]
    fn test_layers() {
        let mut frame = Frame::new(RgbaImage::new(8, 4));
        frame.mips = vec![RgbaImage::new(4, 2), RgbaImage::new(2, 1)];

        assert_eq!(frame.level_count(), 3);
        let dims: Vec<_> = frame.level_dimensions().collect();
        assert_eq!(dims, vec![(8, 4), (4, 2), (2, 1)]);

        let layer = frame.layer(2).unwrap();
        assert_eq!((layer.width, layer.height), (2, 1));
        assert_eq!(layer.pixels.len(), 8);
        assert!(frame.layer(3).is_none());
    }

    #[test]
    fn test_original_texture_bytes_accounts_for_scale() {
        let mut frame = Frame::new(RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 255])));
        assert_eq!(frame.original_texture_bytes(), 8 * 8 * 3);
        frame.scale = 2;
        assert_eq!(frame.original_texture_bytes(), 4 * 4 * 3);
    }
}
