//! Decoding source files into frames.

use std::io::Cursor;

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, ImageFormat};
use thiserror::Error;

use super::types::Frame;
use crate::source::SourceFile;

/// Errors loading a source texture. Always per-item, never fatal.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("{path} contains no frames")]
    Empty { path: String },
}

/// A source file and every frame decoded from it.
#[derive(Debug)]
pub struct SourceTexture<'a> {
    pub source: &'a SourceFile,
    pub frames: Vec<Frame>,
}

/// Read and decode `source`.
///
/// Animated GIFs yield one frame per animation frame, named
/// `<name>_000`, `<name>_001`, ... Everything else yields one frame.
pub fn load_texture(source: &SourceFile) -> Result<SourceTexture<'_>, LoadError> {
    let path = source.display();
    let bytes = source.read_bytes().map_err(|e| LoadError::Read {
        path: path.clone(),
        source: e,
    })?;
    let decode_err = |e| LoadError::Decode {
        path: path.clone(),
        source: e,
    };

    let format = ImageFormat::from_extension(&source.extension);
    let mut frames = if format == Some(ImageFormat::Gif) {
        decode_gif(&bytes, &source.name).map_err(decode_err)?
    } else {
        let image = match format {
            Some(format) => image::load_from_memory_with_format(&bytes, format)
                .or_else(|_| image::load_from_memory(&bytes)),
            None => image::load_from_memory(&bytes),
        }
        .map_err(decode_err)?;
        vec![frame_from_image(image)]
    };

    if frames.is_empty() {
        return Err(LoadError::Empty { path });
    }

    let share = source.size / frames.len() as u64;
    for frame in &mut frames {
        frame.source_bytes = share;
    }

    Ok(SourceTexture { source, frames })
}

fn frame_from_image(image: DynamicImage) -> Frame {
    let bpp = if image.color().has_alpha() { 4 } else { 3 };
    Frame::new(image.into_rgba8()).with_source_bpp(bpp)
}

fn decode_gif(bytes: &[u8], name: &str) -> Result<Vec<Frame>, image::ImageError> {
    let decoder = GifDecoder::new(Cursor::new(bytes))?;
    let decoded = decoder.into_frames().collect_frames()?;
    let multi = decoded.len() > 1;

    Ok(decoded
        .into_iter()
        .enumerate()
        .map(|(index, gif_frame)| {
            let frame = Frame::new(gif_frame.into_buffer());
            if multi {
                frame.with_name(format!("{}_{:03}", name, index))
            } else {
                frame
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::AlphaKind;
    use crate::source::SourceLocation;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::TempDir;

    fn source_for(path: &std::path::Path) -> SourceFile {
        SourceFile::from_path(path, "").unwrap()
    }

    #[test]
    fn test_load_png_opaque() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("opaque.png");
        RgbImage::from_pixel(8, 4, Rgb([1, 2, 3])).save(&path).unwrap();

        let source = source_for(&path);
        let texture = load_texture(&source).unwrap();
        assert_eq!(texture.frames.len(), 1);
        let frame = &texture.frames[0];
        assert_eq!((frame.width(), frame.height()), (8, 4));
        assert_eq!(frame.source_bpp, 3);
        assert_eq!(frame.alpha, AlphaKind::None);
        assert_eq!(frame.source_bytes, source.size);
        assert!(frame.name_override.is_none());
    }

    #[test]
    fn test_load_tga_with_alpha() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alpha.tga");
        RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 64])).save(&path).unwrap();

        let source = source_for(&path);
        let texture = load_texture(&source).unwrap();
        let frame = &texture.frames[0];
        assert_eq!(frame.source_bpp, 4);
        assert_eq!(frame.alpha, AlphaKind::Gradient);
    }

    #[test]
    fn test_wrong_extension_falls_back_to_guess() {
        let dir = TempDir::new().unwrap();
        let png = dir.path().join("real.png");
        RgbImage::new(2, 2).save(&png).unwrap();
        let disguised = dir.path().join("real.tga");
        std::fs::copy(&png, &disguised).unwrap();

        let source = source_for(&disguised);
        let texture = load_texture(&source).unwrap();
        assert_eq!(texture.frames[0].width(), 2);
    }

    #[test]
    fn test_decode_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.png");
        std::fs::write(&path, b"not an image").unwrap();

        let source = source_for(&path);
        let err = load_texture(&source).unwrap_err();
        assert!(matches!(err, LoadError::Decode { .. }));
    }

    #[test]
    fn test_read_failure() {
        let source = SourceFile {
            location: SourceLocation::File("/nonexistent/x.png".into()),
            relative_dir: String::new(),
            name: "x".into(),
            extension: "png".into(),
            size: 0,
        };
        assert!(matches!(
            load_texture(&source).unwrap_err(),
            LoadError::Read { .. }
        ));
    }
}
