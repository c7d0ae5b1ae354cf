//! DDS header construction, written in place into a preallocated buffer.

use super::types::*;
use crate::frame::Frame;

/// DDS_PIXELFORMAT sub-record (32 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdsPixelFormat {
    pub size: u32,
    pub flags: u32,
    pub fourcc: [u8; 4],
    /// RGB bit count, or the swizzle tag for xGBR normal maps.
    pub rgb_bit_count: u32,
    pub r_bit_mask: u32,
    pub g_bit_mask: u32,
    pub b_bit_mask: u32,
    pub a_bit_mask: u32,
}

/// DDS file header (magic + 124 byte record).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdsHeader {
    pub flags: u32,
    pub height: u32,
    pub width: u32,
    pub pitch: u32,
    pub mipmap_count: u32,
    pub pixel_format: DdsPixelFormat,
    pub caps: u32,
}

impl DdsHeader {
    /// Build a header for a texture of the given shape.
    ///
    /// `mipmap_count` counts the base level, so a texture without mips has 1.
    /// `has_alpha` reflects the source even when the format cannot store it.
    pub fn new(
        width: u32,
        height: u32,
        mipmap_count: u32,
        format: TextureFormat,
        has_alpha: bool,
    ) -> Self {
        let pixel_format = match format {
            TextureFormat::Bgra => DdsPixelFormat {
                size: PIXEL_FORMAT_SIZE,
                flags: DDPF_RGB | DDPF_ALPHAPIXELS,
                fourcc: [0; 4],
                rgb_bit_count: 32,
                r_bit_mask: 0x00ff_0000,
                g_bit_mask: 0x0000_ff00,
                b_bit_mask: 0x0000_00ff,
                a_bit_mask: 0xff00_0000,
            },
            compressed => {
                let mut flags = DDPF_FOURCC;
                if has_alpha {
                    flags |= DDPF_ALPHAPIXELS;
                }
                if compressed.is_premultiplied() {
                    flags |= DDPF_ALPHAPREMULT;
                }
                // Swizzle-aware readers find the tag in the bit count slot
                let rgb_bit_count = if compressed.is_swizzled() {
                    u32::from_le_bytes(compressed.fourcc())
                } else {
                    0
                };
                DdsPixelFormat {
                    size: PIXEL_FORMAT_SIZE,
                    flags,
                    fourcc: compressed.container_fourcc(),
                    rgb_bit_count,
                    r_bit_mask: 0,
                    g_bit_mask: 0,
                    b_bit_mask: 0,
                    a_bit_mask: 0,
                }
            }
        };

        let pitch = if format.is_compressed() {
            0
        } else {
            width * 4
        };

        DdsHeader {
            flags: DDSD_CAPS | DDSD_HEIGHT | DDSD_WIDTH | DDSD_PIXELFORMAT | DDSD_MIPMAPCOUNT,
            height,
            width,
            pitch,
            mipmap_count,
            pixel_format,
            caps: DDSCAPS_TEXTURE | DDSCAPS_COMPLEX | DDSCAPS_MIPMAP,
        }
    }

    /// Header describing a frame and its current mip chain.
    ///
    /// The alpha flag follows the source, not the swizzled pixels.
    pub fn for_frame(frame: &Frame, format: TextureFormat) -> Self {
        Self::new(
            frame.width(),
            frame.height(),
            frame.level_count() as u32,
            format,
            frame.source_alpha,
        )
    }

    /// Serialize into the first [`HEADER_SIZE`] bytes of `buf`.
    pub fn write_to(&self, buf: &mut [u8]) -> Result<usize, DdsError> {
        if buf.len() < HEADER_SIZE {
            return Err(DdsError::BufferTooSmall {
                needed: HEADER_SIZE,
                actual: buf.len(),
            });
        }

        let out = &mut buf[..HEADER_SIZE];
        out.fill(0);

        let mut put = |offset: usize, value: u32| {
            out[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        };
        put(4, HEADER_RECORD_SIZE);
        put(8, self.flags);
        put(12, self.height);
        put(16, self.width);
        put(20, self.pitch);
        // 24: depth, 32..76: reserved
        put(28, self.mipmap_count);

        let pf = &self.pixel_format;
        put(76, pf.size);
        put(80, pf.flags);
        put(88, pf.rgb_bit_count);
        put(92, pf.r_bit_mask);
        put(96, pf.g_bit_mask);
        put(100, pf.b_bit_mask);
        put(104, pf.a_bit_mask);
        put(108, self.caps);
        // 112..128: caps2-4, reserved2

        out[0..4].copy_from_slice(&DDS_MAGIC);
        out[84..88].copy_from_slice(&pf.fourcc);

        Ok(HEADER_SIZE)
    }

    /// Serialize into a new 128-byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; HEADER_SIZE];
        // Exact-size buffer cannot be too small
        let _ = self.write_to(&mut bytes);
        bytes
    }
}

/// Write the header for `frame` stored as `format` into the start of `buf`.
///
/// Returns the number of bytes written, always [`HEADER_SIZE`].
pub fn write_header(buf: &mut [u8], frame: &Frame, format: TextureFormat) -> Result<usize, DdsError> {
    DdsHeader::for_frame(frame, format).write_to(buf)
}
