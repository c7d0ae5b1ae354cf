//! Compression backends.
//!
//! A backend fills one layer region of a preallocated container buffer.
//! The resolver picks a [`BackendKind`]; the [`BackendRegistry`] maps it to
//! an implementation:
//!
//! ```text
//! BackendKind::Ispc     ──► IspcBackend      (intel_tex_2 kernels)
//! BackendKind::Weighted ──► WeightedBackend  (in-crate, channel weighted)
//! BackendKind::Raw      ──► RawBackend       (BGRA packing)
//! ```
//!
//! Every backend rejects formats it does not support and destination
//! regions whose size differs from [`crate::dds::layer_size`], so a wrong
//! sized output can never be produced.

mod blocks;
mod ispc;
mod raw;
mod weighted;

use std::fmt;
use thiserror::Error;

use crate::dds::{layer_size, TextureFormat};
use crate::frame::{ChannelWeights, LayerInput};

pub use blocks::ColorMetric;
pub use ispc::IspcBackend;
pub use raw::RawBackend;
pub use weighted::{EncoderFailure, WeightedBackend};

/// Identifies a backend implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Ispc,
    Weighted,
    Raw,
}

impl BackendKind {
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Ispc => "ispc",
            BackendKind::Weighted => "weighted",
            BackendKind::Raw => "raw",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors from a backend. All of them skip the frame, none abort the run.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{backend} backend does not support {format}")]
    Unsupported {
        backend: &'static str,
        format: TextureFormat,
    },

    #[error("{backend} backend given a {actual} byte region, layer needs {expected}")]
    RegionMismatch {
        backend: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{backend} backend failed with code {code}")]
    Code { backend: &'static str, code: i32 },

    #[error("weighted encoder failed: {0}")]
    Encoder(#[from] EncoderFailure),
}

/// A pluggable layer encoder.
pub trait CompressionBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn supports(&self, format: TextureFormat) -> bool;

    /// Encode one level into `dst`, which must be exactly
    /// `layer_size(layer.width, layer.height, format)` bytes.
    ///
    /// Returns the number of bytes written.
    fn encode_layer(
        &self,
        layer: &LayerInput<'_>,
        format: TextureFormat,
        weights: Option<ChannelWeights>,
        dst: &mut [u8],
    ) -> Result<usize, BackendError>;
}

/// Shared precondition checks for backends.
pub(crate) fn check_request(
    backend: &dyn CompressionBackend,
    layer: &LayerInput<'_>,
    format: TextureFormat,
    dst: &[u8],
) -> Result<usize, BackendError> {
    if !backend.supports(format) {
        return Err(BackendError::Unsupported {
            backend: backend.name(),
            format,
        });
    }
    let expected = layer_size(layer.width, layer.height, format);
    if dst.len() != expected {
        return Err(BackendError::RegionMismatch {
            backend: backend.name(),
            expected,
            actual: dst.len(),
        });
    }
    Ok(expected)
}

/// Lookup from [`BackendKind`] to implementation.
pub struct BackendRegistry {
    ispc: Box<dyn CompressionBackend>,
    weighted: Box<dyn CompressionBackend>,
    raw: Box<dyn CompressionBackend>,
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self {
            ispc: Box::new(IspcBackend::new()),
            weighted: Box::new(WeightedBackend::new()),
            raw: Box::new(RawBackend::new()),
        }
    }

    /// Replace the implementation behind a kind.
    pub fn with_backend(mut self, kind: BackendKind, backend: Box<dyn CompressionBackend>) -> Self {
        match kind {
            BackendKind::Ispc => self.ispc = backend,
            BackendKind::Weighted => self.weighted = backend,
            BackendKind::Raw => self.raw = backend,
        }
        self
    }

    pub fn get(&self, kind: BackendKind) -> &dyn CompressionBackend {
        match kind {
            BackendKind::Ispc => self.ispc.as_ref(),
            BackendKind::Weighted => self.weighted.as_ref(),
            BackendKind::Raw => self.raw.as_ref(),
        }
    }
}
