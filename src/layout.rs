//! Plane and row layout arithmetic.
//!
//! All size math is checked: any overflow surfaces as
//! [`InvalidArgument::DimensionsOverflow`] instead of wrapping.

use crate::error::InvalidArgument;
use crate::format::{MAX_PLANES, PixelFormat};

/// Placement of one plane inside a byte region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaneLayout {
    /// Byte offset of the first row.
    pub offset: usize,
    /// Samples per row.
    pub width: u32,
    /// Number of rows.
    pub rows: u32,
    /// Unpadded bytes per row.
    pub row_bytes: usize,
    /// Bytes between row starts (`>= row_bytes`).
    pub stride: usize,
}

impl PlaneLayout {
    /// Bytes from the plane start to the end of its last row's pixels.
    ///
    /// The last row needs no trailing padding: `(rows - 1) * stride + row_bytes`.
    #[inline]
    pub fn used_bytes(&self) -> usize {
        if self.rows == 0 {
            return 0;
        }
        (self.rows as usize - 1) * self.stride + self.row_bytes
    }

    /// Byte range of row `y` (pixels only) relative to the region start.
    #[inline]
    pub fn row_range(&self, y: u32) -> core::ops::Range<usize> {
        let start = self.offset + y as usize * self.stride;
        start..start + self.row_bytes
    }
}

/// Layout of every plane of an image in one contiguous region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferLayout {
    planes: [PlaneLayout; MAX_PLANES],
    plane_count: usize,
    total: usize,
}

impl BufferLayout {
    /// Tightly packed layout: planes back to back, no row padding.
    ///
    /// This is the layout callers hand to the builder.
    pub fn packed(format: PixelFormat, width: u32, height: u32) -> Result<Self, InvalidArgument> {
        Self::compute(format, width, height, |row_bytes| Some(row_bytes))
    }

    /// Layout whose strides are rounded up to `row_alignment` bytes.
    ///
    /// `row_alignment` must be a power of two.
    pub fn aligned(
        format: PixelFormat,
        width: u32,
        height: u32,
        row_alignment: usize,
    ) -> Result<Self, InvalidArgument> {
        if !row_alignment.is_power_of_two() {
            return Err(InvalidArgument::InvalidRowAlignment(row_alignment));
        }
        Self::compute(format, width, height, |row_bytes| {
            checked_align_up(row_bytes, row_alignment)
        })
    }

    /// Single-plane layout with an explicit stride.
    pub fn strided(
        format: PixelFormat,
        width: u32,
        height: u32,
        stride: usize,
    ) -> Result<Self, InvalidArgument> {
        if format.is_planar() {
            return Err(InvalidArgument::SourceStrideOnPlanarFormat);
        }
        let layout = Self::packed(format, width, height)?;
        let row_bytes = layout.planes[0].row_bytes;
        if stride < row_bytes {
            return Err(InvalidArgument::SourceStrideTooSmall { stride, row_bytes });
        }
        Self::compute(format, width, height, |_| Some(stride))
    }

    fn compute(
        format: PixelFormat,
        width: u32,
        height: u32,
        stride_for: impl Fn(usize) -> Option<usize>,
    ) -> Result<Self, InvalidArgument> {
        if width == 0 || height == 0 {
            return Err(InvalidArgument::ZeroDimensions { width, height });
        }
        let overflow = InvalidArgument::DimensionsOverflow { width, height };

        let mut planes = [PlaneLayout::default(); MAX_PLANES];
        let mut offset = 0usize;
        for (slot, desc) in planes.iter_mut().zip(format.planes()) {
            let row_bytes = desc.row_bytes(width).ok_or(overflow)?;
            let stride = stride_for(row_bytes).ok_or(overflow)?;
            let rows = desc.plane_height(height);
            let len = stride.checked_mul(rows as usize).ok_or(overflow)?;
            *slot = PlaneLayout {
                offset,
                width: desc.plane_width(width),
                rows,
                row_bytes,
                stride,
            };
            offset = offset.checked_add(len).ok_or(overflow)?;
        }

        Ok(Self {
            planes,
            plane_count: format.plane_count(),
            total: offset,
        })
    }

    /// The planes, in storage order.
    #[inline]
    pub fn planes(&self) -> &[PlaneLayout] {
        &self.planes[..self.plane_count]
    }

    /// Bytes spanned when every row, including the last, carries full stride.
    #[inline]
    pub fn total_bytes(&self) -> usize {
        self.total
    }

    /// Minimum bytes a source with this layout must provide.
    ///
    /// Same as [`total_bytes`](Self::total_bytes) except that the final row
    /// of the final plane needs no trailing padding.
    pub fn required_bytes(&self) -> usize {
        match self.planes().last() {
            Some(last) => last.offset + last.used_bytes(),
            None => 0,
        }
    }

    /// Sum of unpadded row bytes over all planes.
    pub fn packed_bytes(&self) -> usize {
        self.planes()
            .iter()
            .map(|p| p.row_bytes * p.rows as usize)
            .sum()
    }
}

/// Bytes a tightly packed source must provide for the given image.
///
/// Returns `None` for zero dimensions or when the size overflows `usize`.
pub fn required_size(width: u32, height: u32, format: PixelFormat) -> Option<usize> {
    BufferLayout::packed(format, width, height)
        .ok()
        .map(|layout| layout.required_bytes())
}

/// Round `val` up to the next multiple of `align` (a power of 2).
fn checked_align_up(val: usize, align: usize) -> Option<usize> {
    Some(val.checked_add(align - 1)? & !(align - 1))
}

/// Byte offset needed to move `ptr` onto an `align` boundary.
pub(crate) fn align_offset(ptr: *const u8, align: usize) -> usize {
    let addr = ptr as usize;
    addr.next_multiple_of(align) - addr
}
