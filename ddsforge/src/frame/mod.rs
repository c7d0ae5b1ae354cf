//! Decoded frames and the preparation steps applied before compression.

mod loader;
mod mipmap;
mod prepare;
mod types;

pub use loader::{load_texture, LoadError, SourceTexture};
pub use mipmap::MipmapGenerator;
pub use prepare::{
    apply_swizzle, make_alpha_binary, make_power_of_two, prepare_frame, scale_2x,
    PrepareOptions, ScaleFilter, BINARY_ALPHA_THRESHOLD,
};
pub use types::{AlphaKind, ChannelWeights, Frame, LayerInput, SwizzleMode};
