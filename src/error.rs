//! Errors from pixel buffer construction.

use thiserror::Error;

use crate::limits::LimitExceeded;

/// Why a pixel buffer could not be built.
///
/// No partial buffer is ever returned alongside an error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum BuildError {
    /// The caller passed something unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),

    /// A configured [`ResourceLimits`](crate::ResourceLimits) cap was hit.
    #[error(transparent)]
    LimitExceeded(#[from] LimitExceeded),

    /// The destination allocation could not be satisfied.
    #[error("failed to allocate {bytes} bytes for pixel buffer")]
    AllocationFailure {
        /// Bytes requested, including alignment slack.
        bytes: usize,
    },
}

/// Invalid inputs to the builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum InvalidArgument {
    /// No source bytes, or an empty slice.
    #[error("source bytes are missing")]
    MissingBytes,

    /// Width or height is zero.
    #[error("dimensions {width}x{height} must be positive")]
    ZeroDimensions { width: u32, height: u32 },

    /// Size computation overflowed `usize`.
    #[error("dimensions {width}x{height} overflow the address space")]
    DimensionsOverflow { width: u32, height: u32 },

    /// The `OSType` tag is not a supported pixel format.
    #[error("unsupported pixel format tag {0:#010x}")]
    UnsupportedFormat(u32),

    /// The source holds fewer bytes than the format requires.
    #[error("source holds {actual} bytes, {required} required")]
    InsufficientData { required: usize, actual: usize },

    /// Row alignment must be a non-zero power of two.
    #[error("row alignment {0} is not a power of two")]
    InvalidRowAlignment(usize),

    /// Source stride is smaller than one unpadded row.
    #[error("source stride {stride} is smaller than row size {row_bytes}")]
    SourceStrideTooSmall { stride: usize, row_bytes: usize },

    /// A custom source stride was given for a multi-plane format.
    #[error("source stride is only supported for single-plane formats")]
    SourceStrideOnPlanarFormat,
}
