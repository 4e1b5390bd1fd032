//! Pixel buffer construction from raw bytes.
//!
//! [`PixelBufferBuilder`] validates the inputs, sizes the destination,
//! allocates once, and copies exactly the required source bytes row by row
//! into aligned rows. [`try_create_pixel_buffer`] is the nullable entry point
//! for callers that only need "buffer or nothing".

use alloc::vec::Vec;

use crate::buffer::PixelBuffer;
use crate::error::{BuildError, InvalidArgument};
use crate::format::PixelFormat;
use crate::layout::{BufferLayout, align_offset};
use crate::limits::ResourceLimits;

/// Row alignment used unless configured otherwise, in bytes.
pub const DEFAULT_ROW_ALIGNMENT: usize = 16;

/// Builds [`PixelBuffer`]s of one format.
///
/// The builder is plain configuration: `Copy`, reusable, and safe to share
/// across threads. Every [`build`](Self::build) allocates a fresh buffer.
///
/// # Example
///
/// ```
/// use tensorio::{PixelBufferBuilder, PixelFormat, ResourceLimits};
///
/// let bytes = [0u8; 4 * 3 * 2];
/// let buf = PixelBufferBuilder::new(PixelFormat::Bgra32)
///     .with_row_alignment(64)
///     .with_limits(ResourceLimits::none().with_max_pixels(4096 * 4096))
///     .build(Some(&bytes), 3, 2)
///     .unwrap();
/// assert_eq!(buf.stride(0), 64);
/// assert_eq!(buf.to_packed_bytes(), bytes);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelBufferBuilder {
    format: PixelFormat,
    row_alignment: usize,
    source_stride: Option<usize>,
    limits: ResourceLimits,
}

impl PixelBufferBuilder {
    /// Builder for `format` with default alignment and no limits.
    pub fn new(format: PixelFormat) -> Self {
        Self {
            format,
            row_alignment: DEFAULT_ROW_ALIGNMENT,
            source_stride: None,
            limits: ResourceLimits::none(),
        }
    }

    /// Align destination rows to `bytes` (a power of two; 1 disables padding).
    pub fn with_row_alignment(mut self, bytes: usize) -> Self {
        self.row_alignment = bytes;
        self
    }

    /// Declare that source rows are `stride` bytes apart.
    ///
    /// Only valid for single-plane formats. Without it, the source is read
    /// as tightly packed planes.
    pub fn with_source_stride(mut self, stride: usize) -> Self {
        self.source_stride = Some(stride);
        self
    }

    /// Apply resource limits.
    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Target pixel format.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Configured destination row alignment.
    pub fn row_alignment(&self) -> usize {
        self.row_alignment
    }

    /// Layout the source bytes are expected to follow.
    pub fn source_layout(&self, width: u32, height: u32) -> Result<BufferLayout, InvalidArgument> {
        match self.source_stride {
            Some(stride) => BufferLayout::strided(self.format, width, height, stride),
            None => BufferLayout::packed(self.format, width, height),
        }
    }

    /// Build a buffer by copying `bytes`.
    ///
    /// # Errors
    ///
    /// - [`InvalidArgument`] for absent or empty bytes, zero or overflowing
    ///   dimensions, bad alignment or stride, or too few bytes.
    /// - [`BuildError::LimitExceeded`] if a configured limit is hit.
    /// - [`BuildError::AllocationFailure`] if the allocator refuses.
    pub fn build(
        &self,
        bytes: Option<&[u8]>,
        width: u32,
        height: u32,
    ) -> Result<PixelBuffer, BuildError> {
        let bytes = bytes
            .filter(|b| !b.is_empty())
            .ok_or(InvalidArgument::MissingBytes)?;
        if width == 0 || height == 0 {
            return Err(InvalidArgument::ZeroDimensions { width, height }.into());
        }
        self.limits.check_dimensions(width, height)?;

        let source = self.source_layout(width, height)?;
        let required = source.required_bytes();
        if bytes.len() < required {
            return Err(InvalidArgument::InsufficientData {
                required,
                actual: bytes.len(),
            }
            .into());
        }

        let dest = BufferLayout::aligned(self.format, width, height, self.row_alignment)?;
        let alloc_size = dest
            .total_bytes()
            .checked_add(self.row_alignment - 1)
            .ok_or(InvalidArgument::DimensionsOverflow { width, height })?;
        self.limits.check_memory(alloc_size)?;

        let mut data = Vec::new();
        if data.try_reserve_exact(alloc_size).is_err() {
            tracing::warn!(
                bytes = alloc_size,
                format = %self.format,
                width,
                height,
                "pixel buffer allocation failed"
            );
            return Err(BuildError::AllocationFailure { bytes: alloc_size });
        }
        data.resize(alloc_size, 0);
        let offset = align_offset(data.as_ptr(), self.row_alignment);

        for (src, dst) in source.planes().iter().zip(dest.planes()) {
            for y in 0..src.rows {
                let from = src.row_range(y);
                let to = dst.row_range(y);
                data[offset + to.start..offset + to.end].copy_from_slice(&bytes[from]);
            }
        }

        tracing::debug!(
            format = %self.format,
            width,
            height,
            planes = dest.planes().len(),
            stride = dest.planes()[0].stride,
            copied = dest.packed_bytes(),
            "built pixel buffer"
        );

        Ok(PixelBuffer::from_parts(
            data,
            offset,
            width,
            height,
            self.format,
            dest,
        ))
    }
}

/// Build a buffer from tightly packed `bytes` with default settings.
pub fn create_pixel_buffer(
    bytes: Option<&[u8]>,
    width: u32,
    height: u32,
    format: PixelFormat,
) -> Result<PixelBuffer, BuildError> {
    PixelBufferBuilder::new(format).build(bytes, width, height)
}

/// Build a buffer from tightly packed `bytes`, or return `None`.
///
/// `format` is a CoreVideo `OSType`; unsupported tags yield `None`. Every
/// failure is reported through the return value and logged at debug level.
///
/// ```
/// use tensorio::{PixelFormat, try_create_pixel_buffer};
///
/// let bgra = PixelFormat::Bgra32.os_type();
/// let buf = try_create_pixel_buffer(Some(&[0u8; 4]), 1, 1, bgra).unwrap();
/// assert_eq!(buf.plane(0).row(0), &[0, 0, 0, 0]);
///
/// assert!(try_create_pixel_buffer(None, 10, 10, bgra).is_none());
/// assert!(try_create_pixel_buffer(Some(&[0u8; 30]), 10, 1, bgra).is_none());
/// ```
pub fn try_create_pixel_buffer(
    bytes: Option<&[u8]>,
    width: u32,
    height: u32,
    format: u32,
) -> Option<PixelBuffer> {
    let result = PixelFormat::from_os_type(format)
        .ok_or(BuildError::from(InvalidArgument::UnsupportedFormat(format)))
        .and_then(|format| create_pixel_buffer(bytes, width, height, format));
    log_rejection(result, width, height, format)
}

/// Collapse a build result to `Option`, logging the discarded error.
fn log_rejection(
    result: Result<PixelBuffer, BuildError>,
    width: u32,
    height: u32,
    format: u32,
) -> Option<PixelBuffer> {
    match result {
        Ok(buf) => Some(buf),
        Err(err) => {
            tracing::debug!(%err, width, height, format, "pixel buffer not created");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn counting(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7) as u8).collect()
    }

    #[test]
    fn single_pixel_bgra() {
        let buf = create_pixel_buffer(Some(&[0u8; 4]), 1, 1, PixelFormat::Bgra32).unwrap();
        assert_eq!((buf.width(), buf.height()), (1, 1));
        assert_eq!(buf.format(), PixelFormat::Bgra32);
        assert_eq!(buf.plane(0).row(0), &[0, 0, 0, 0]);
    }

    #[test]
    fn roundtrip_every_format() {
        for format in PixelFormat::ALL {
            for (w, h) in [(1, 1), (3, 5), (16, 2), (7, 7)] {
                let len = crate::required_size(w, h, format).unwrap();
                let bytes = counting(len);
                let buf = create_pixel_buffer(Some(&bytes), w, h, format).unwrap();
                assert_eq!(buf.format(), format);
                assert_eq!((buf.width(), buf.height()), (w, h));
                assert_eq!(buf.to_packed_bytes(), bytes, "{format} {w}x{h}");
            }
        }
    }

    #[test]
    fn rows_are_aligned() {
        let bytes = counting(crate::required_size(5, 3, PixelFormat::Yuv420Planar).unwrap());
        for align in [1, 16, 64] {
            let buf = PixelBufferBuilder::new(PixelFormat::Yuv420Planar)
                .with_row_alignment(align)
                .build(Some(&bytes), 5, 3)
                .unwrap();
            assert!(buf.is_aligned_to(align), "alignment {align}");
            assert_eq!(buf.to_packed_bytes(), bytes);
        }
    }

    #[test]
    fn alignment_one_is_tightly_packed() {
        let bytes = counting(30);
        let buf = PixelBufferBuilder::new(PixelFormat::Rgb24)
            .with_row_alignment(1)
            .build(Some(&bytes), 5, 2)
            .unwrap();
        assert_eq!(buf.stride(0), 15);
        assert_eq!(buf.as_bytes(), bytes.as_slice());
    }

    #[test]
    fn extra_source_bytes_are_ignored() {
        let mut bytes = counting(8);
        bytes.extend_from_slice(&[0xEE; 10]);
        let buf = create_pixel_buffer(Some(&bytes), 2, 1, PixelFormat::Bgra32).unwrap();
        assert_eq!(buf.to_packed_bytes(), &bytes[..8]);
    }

    #[test]
    fn strided_source_drops_padding() {
        // 2x2 BGRA with 12-byte source rows; bytes 8..12 of each row are padding.
        let mut bytes = vec![0xAAu8; 12 + 8];
        bytes[..8].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        bytes[12..20].copy_from_slice(&[9, 10, 11, 12, 13, 14, 15, 16]);
        let buf = PixelBufferBuilder::new(PixelFormat::Bgra32)
            .with_source_stride(12)
            .build(Some(&bytes), 2, 2)
            .unwrap();
        assert_eq!(buf.to_packed_bytes(), (1..=16).collect::<Vec<u8>>());
    }

    #[test]
    fn missing_or_empty_bytes() {
        let builder = PixelBufferBuilder::new(PixelFormat::Bgra32);
        assert_eq!(
            builder.build(None, 10, 10).unwrap_err(),
            InvalidArgument::MissingBytes.into()
        );
        assert_eq!(
            builder.build(Some(&[]), 10, 10).unwrap_err(),
            InvalidArgument::MissingBytes.into()
        );
    }

    #[test]
    fn zero_dimensions() {
        let bytes = [0u8; 64];
        for (w, h) in [(0, 1), (1, 0), (0, 0)] {
            let err = create_pixel_buffer(Some(&bytes), w, h, PixelFormat::Gray8).unwrap_err();
            assert_eq!(
                err,
                InvalidArgument::ZeroDimensions {
                    width: w,
                    height: h
                }
                .into()
            );
        }
    }

    #[test]
    fn insufficient_bytes() {
        let err = create_pixel_buffer(Some(&[0u8; 30]), 10, 1, PixelFormat::Bgra32).unwrap_err();
        assert_eq!(
            err,
            InvalidArgument::InsufficientData {
                required: 40,
                actual: 30
            }
            .into()
        );
    }

    #[test]
    fn insufficient_bytes_for_chroma() {
        // Luma alone is 16 bytes; chroma needs 8 more.
        let err = create_pixel_buffer(Some(&[0u8; 20]), 4, 4, PixelFormat::Nv12FullRange)
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::InvalidArgument(InvalidArgument::InsufficientData { required: 24, .. })
        ));
    }

    #[test]
    fn bad_alignment() {
        let err = PixelBufferBuilder::new(PixelFormat::Gray8)
            .with_row_alignment(12)
            .build(Some(&[0u8; 4]), 2, 2)
            .unwrap_err();
        assert_eq!(err, InvalidArgument::InvalidRowAlignment(12).into());
    }

    #[test]
    fn overflowing_dimensions() {
        let err = create_pixel_buffer(Some(&[0u8; 4]), u32::MAX, u32::MAX, PixelFormat::Bgra32)
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::InvalidArgument(InvalidArgument::DimensionsOverflow { .. })
        ));
    }

    #[test]
    fn limits_reject_before_allocation() {
        let bytes = [0u8; 400];
        let limited = PixelBufferBuilder::new(PixelFormat::Bgra32)
            .with_limits(ResourceLimits::none().with_max_width(8));
        assert!(matches!(
            limited.build(Some(&bytes), 10, 10).unwrap_err(),
            BuildError::LimitExceeded(crate::LimitExceeded::Width { actual: 10, max: 8 })
        ));

        let limited = PixelBufferBuilder::new(PixelFormat::Bgra32)
            .with_limits(ResourceLimits::none().with_max_memory(100));
        assert!(matches!(
            limited.build(Some(&bytes), 10, 10).unwrap_err(),
            BuildError::LimitExceeded(crate::LimitExceeded::Memory { max: 100, .. })
        ));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn allocation_failure_is_reported() {
        // Fits in usize but no allocator can satisfy it.
        let align = 1usize << 62;
        let result = PixelBufferBuilder::new(PixelFormat::Gray8)
            .with_row_alignment(align)
            .build(Some(&[1]), 1, 1);
        assert_eq!(
            result,
            Err(BuildError::AllocationFailure {
                bytes: align + align - 1
            })
        );

        let tag = PixelFormat::Gray8.os_type();
        assert!(log_rejection(result, 1, 1, tag).is_none());
    }

    #[test]
    fn large_row_alignment() {
        let buf = PixelBufferBuilder::new(PixelFormat::Gray8)
            .with_row_alignment(1 << 16)
            .build(Some(&[42u8]), 1, 1)
            .unwrap();
        assert_eq!(buf.stride(0), 1 << 16);
        assert!(buf.is_aligned_to(1 << 16));
        assert_eq!(buf.to_packed_bytes(), [42]);
    }

    #[test]
    fn try_create_maps_errors_to_none() {
        let bgra = PixelFormat::Bgra32.os_type();
        assert!(try_create_pixel_buffer(Some(&[0u8; 4]), 1, 1, bgra).is_some());
        assert!(try_create_pixel_buffer(None, 10, 10, bgra).is_none());
        assert!(try_create_pixel_buffer(Some(&[0u8; 30]), 10, 1, bgra).is_none());
        assert!(try_create_pixel_buffer(Some(&[0u8; 4]), 0, 1, bgra).is_none());
        assert!(try_create_pixel_buffer(Some(&[0u8; 4]), 1, 1, 0xDEAD_BEEF).is_none());
    }

    #[test]
    fn deterministic() {
        let bytes = counting(crate::required_size(9, 4, PixelFormat::Rgb24).unwrap());
        let a = create_pixel_buffer(Some(&bytes), 9, 4, PixelFormat::Rgb24).unwrap();
        let b = create_pixel_buffer(Some(&bytes), 9, 4, PixelFormat::Rgb24).unwrap();
        assert_eq!(a.to_packed_bytes(), b.to_packed_bytes());
        assert_eq!(a.layout(), b.layout());
    }
}
