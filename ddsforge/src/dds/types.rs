//! DDS format types, flag constants and error definitions.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Magic (4 bytes) plus the 124-byte DDS_HEADER record.
pub const HEADER_SIZE: usize = 128;

/// Size of the DDS_HEADER record excluding the magic.
pub const HEADER_RECORD_SIZE: u32 = 124;

/// Size of the DDS_PIXELFORMAT sub-record.
pub const PIXEL_FORMAT_SIZE: u32 = 32;

pub const DDS_MAGIC: [u8; 4] = *b"DDS ";

// DDS_HEADER.dwFlags
pub const DDSD_CAPS: u32 = 0x1;
pub const DDSD_HEIGHT: u32 = 0x2;
pub const DDSD_WIDTH: u32 = 0x4;
pub const DDSD_PITCH: u32 = 0x8;
pub const DDSD_PIXELFORMAT: u32 = 0x1000;
pub const DDSD_MIPMAPCOUNT: u32 = 0x20000;

// DDS_PIXELFORMAT.dwFlags
pub const DDPF_ALPHAPIXELS: u32 = 0x1;
pub const DDPF_FOURCC: u32 = 0x4;
pub const DDPF_RGB: u32 = 0x40;
pub const DDPF_ALPHAPREMULT: u32 = 0x8000;

// DDS_HEADER.dwCaps
pub const DDSCAPS_COMPLEX: u32 = 0x8;
pub const DDSCAPS_TEXTURE: u32 = 0x1000;
pub const DDSCAPS_MIPMAP: u32 = 0x400000;

/// Output pixel format of a DDS container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// BC1, opaque or 1-bit alpha (8 bytes per 4×4 block)
    Dxt1,
    /// BC2 with premultiplied alpha
    Dxt2,
    /// BC2, explicit 4-bit alpha
    Dxt3,
    /// BC3 with premultiplied alpha
    Dxt4,
    /// BC3, interpolated 8-bit alpha
    Dxt5,
    /// Uncompressed 32-bit B8G8R8A8
    Bgra,
    /// BC3 normal map with red moved into alpha
    Dxt5Xgbr,
}

impl TextureFormat {
    pub const ALL: [TextureFormat; 7] = [
        TextureFormat::Dxt1,
        TextureFormat::Dxt2,
        TextureFormat::Dxt3,
        TextureFormat::Dxt4,
        TextureFormat::Dxt5,
        TextureFormat::Bgra,
        TextureFormat::Dxt5Xgbr,
    ];

    /// Four-character code identifying the format. `Bgra` has none.
    ///
    /// For `Dxt5Xgbr` this is the swizzle tag; see [`Self::container_fourcc`].
    pub fn fourcc(&self) -> [u8; 4] {
        match self {
            TextureFormat::Dxt1 => *b"DXT1",
            TextureFormat::Dxt2 => *b"DXT2",
            TextureFormat::Dxt3 => *b"DXT3",
            TextureFormat::Dxt4 => *b"DXT4",
            TextureFormat::Dxt5 => *b"DXT5",
            TextureFormat::Bgra => [0; 4],
            TextureFormat::Dxt5Xgbr => *b"xGBR",
        }
    }

    /// Four-character code stored in the pixel format's fourcc field.
    pub fn container_fourcc(&self) -> [u8; 4] {
        match self {
            TextureFormat::Dxt5Xgbr => *b"DXT5",
            other => other.fourcc(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TextureFormat::Dxt1 => "DXT1",
            TextureFormat::Dxt2 => "DXT2",
            TextureFormat::Dxt3 => "DXT3",
            TextureFormat::Dxt4 => "DXT4",
            TextureFormat::Dxt5 => "DXT5",
            TextureFormat::Bgra => "BGRA",
            TextureFormat::Dxt5Xgbr => "DXT5 xGBR",
        }
    }

    pub fn is_compressed(&self) -> bool {
        !matches!(self, TextureFormat::Bgra)
    }

    /// Edge length of the pixel block the format is stored in.
    pub fn block_dim(&self) -> u32 {
        if self.is_compressed() {
            4
        } else {
            1
        }
    }

    pub fn bytes_per_block(&self) -> usize {
        match self {
            TextureFormat::Dxt1 => 8,
            TextureFormat::Bgra => 4,
            _ => 16,
        }
    }

    /// Formats that are pointless without an alpha channel and get
    /// downgraded to `Dxt1` for opaque frames.
    pub fn requires_alpha(&self) -> bool {
        matches!(
            self,
            TextureFormat::Dxt2 | TextureFormat::Dxt3 | TextureFormat::Dxt4 | TextureFormat::Dxt5
        )
    }

    pub fn is_premultiplied(&self) -> bool {
        matches!(self, TextureFormat::Dxt2 | TextureFormat::Dxt4)
    }

    pub fn is_swizzled(&self) -> bool {
        matches!(self, TextureFormat::Dxt5Xgbr)
    }
}

impl fmt::Display for TextureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TextureFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dxt1" | "bc1" => Ok(TextureFormat::Dxt1),
            "dxt2" => Ok(TextureFormat::Dxt2),
            "dxt3" | "bc2" => Ok(TextureFormat::Dxt3),
            "dxt4" => Ok(TextureFormat::Dxt4),
            "dxt5" | "bc3" => Ok(TextureFormat::Dxt5),
            "bgra" => Ok(TextureFormat::Bgra),
            "xgbr" => Ok(TextureFormat::Dxt5Xgbr),
            other => Err(format!("unknown texture format '{}'", other)),
        }
    }
}

/// Errors writing DDS containers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DdsError {
    #[error("Buffer too small for DDS header: need {needed} bytes, have {actual}")]
    BufferTooSmall { needed: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourcc() {
        assert_eq!(&TextureFormat::Dxt1.fourcc(), b"DXT1");
        assert_eq!(&TextureFormat::Dxt4.fourcc(), b"DXT4");
        assert_eq!(&TextureFormat::Dxt5Xgbr.fourcc(), b"xGBR");
        assert_eq!(&TextureFormat::Dxt5Xgbr.container_fourcc(), b"DXT5");
        assert_eq!(TextureFormat::Bgra.fourcc(), [0; 4]);
    }

    #[test]
    fn test_block_geometry() {
        assert_eq!(TextureFormat::Dxt1.block_dim(), 4);
        assert_eq!(TextureFormat::Dxt1.bytes_per_block(), 8);
        assert_eq!(TextureFormat::Dxt3.bytes_per_block(), 16);
        assert_eq!(TextureFormat::Dxt5Xgbr.bytes_per_block(), 16);
        assert_eq!(TextureFormat::Bgra.block_dim(), 1);
        assert_eq!(TextureFormat::Bgra.bytes_per_block(), 4);
    }

    #[test]
    fn test_alpha_properties() {
        assert!(!TextureFormat::Dxt1.requires_alpha());
        assert!(TextureFormat::Dxt5.requires_alpha());
        assert!(!TextureFormat::Dxt5Xgbr.requires_alpha());
        assert!(!TextureFormat::Bgra.requires_alpha());
        assert!(TextureFormat::Dxt2.is_premultiplied());
        assert!(TextureFormat::Dxt4.is_premultiplied());
        assert!(!TextureFormat::Dxt5.is_premultiplied());
    }

    #[test]
    fn test_from_str() {
        for format in TextureFormat::ALL {
            let key = match format {
                TextureFormat::Dxt5Xgbr => "xgbr".to_string(),
                other => other.name().to_lowercase(),
            };
            assert_eq!(key.parse::<TextureFormat>().unwrap(), format);
        }
        assert!("dxt9".parse::<TextureFormat>().is_err());
    }

    #[test]
    fn test_error_display() {
        let err = DdsError::BufferTooSmall {
            needed: 128,
            actual: 10,
        };
        assert!(err.to_string().contains("128"));
    }
}
