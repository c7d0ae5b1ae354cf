//! DDS (DirectDraw Surface) container layout.
//!
//! This module owns the byte-exact header and the size model used to
//! preallocate output buffers. Pixel encoding lives in [`crate::backend`].

mod header;
mod size;
mod types;

pub use header::{write_header, DdsHeader, DdsPixelFormat};
pub use size::{container_size, layer_size, layer_sizes, SizeParts};
pub use types::*;
