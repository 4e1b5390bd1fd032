//! Owned pixel buffers and borrowed plane views.
//!
//! A [`PixelBuffer`] owns one allocation holding every plane of an image.
//! Rows start on the alignment chosen at construction, measured from the
//! real memory address, so planes can be handed to SIMD or platform code
//! that expects aligned rows.

use alloc::vec::Vec;
use core::fmt;

use imgref::ImgRef;
use rgb::alt::BGRA;
use rgb::{Gray, Rgb, Rgba};

use crate::builder::PixelBufferBuilder;
use crate::error::{BuildError, InvalidArgument};
use crate::format::PixelFormat;
use crate::layout::{BufferLayout, PlaneLayout, align_offset};

// ---------------------------------------------------------------------------
// PlaneSlice (borrowed, immutable)
// ---------------------------------------------------------------------------

/// Borrowed view of one plane.
///
/// All rows share the same stride. The last row may be shorter than a full
/// stride.
#[non_exhaustive]
pub struct PlaneSlice<'a> {
    data: &'a [u8],
    width: u32,
    rows: u32,
    row_bytes: usize,
    stride: usize,
    format: PixelFormat,
}

impl<'a> PlaneSlice<'a> {
    /// Samples per row.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Byte stride between row starts.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Unpadded bytes per row.
    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.row_bytes
    }

    /// Format of the buffer this plane belongs to.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// The plane's bytes, padding included.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Pixel bytes for row `y` (no padding).
    ///
    /// # Panics
    ///
    /// Panics if `y >= rows`.
    #[inline]
    pub fn row(&self, y: u32) -> &'a [u8] {
        assert!(
            y < self.rows,
            "row index {y} out of bounds (rows: {})",
            self.rows
        );
        let start = y as usize * self.stride;
        &self.data[start..start + self.row_bytes]
    }

    /// Iterate rows top to bottom, without padding.
    pub fn iter_rows(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        (0..self.rows).map(move |y| self.row(y))
    }
}

impl fmt::Debug for PlaneSlice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PlaneSlice({}x{}, stride {}, {})",
            self.width, self.rows, self.stride, self.format
        )
    }
}

// ---------------------------------------------------------------------------
// PlaneSliceMut (borrowed, mutable)
// ---------------------------------------------------------------------------

/// Mutable borrowed view of one plane.
///
/// Only reachable through `&mut PixelBuffer`, so writes happen under
/// exclusive ownership.
#[non_exhaustive]
pub struct PlaneSliceMut<'a> {
    data: &'a mut [u8],
    width: u32,
    rows: u32,
    row_bytes: usize,
    stride: usize,
    format: PixelFormat,
}

impl PlaneSliceMut<'_> {
    /// Samples per row.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Byte stride between row starts.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Pixel bytes for row `y` (immutable, no padding).
    ///
    /// # Panics
    ///
    /// Panics if `y >= rows`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        assert!(
            y < self.rows,
            "row index {y} out of bounds (rows: {})",
            self.rows
        );
        let start = y as usize * self.stride;
        &self.data[start..start + self.row_bytes]
    }

    /// Mutable pixel bytes for row `y` (no padding).
    ///
    /// # Panics
    ///
    /// Panics if `y >= rows`.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        assert!(
            y < self.rows,
            "row index {y} out of bounds (rows: {})",
            self.rows
        );
        let start = y as usize * self.stride;
        &mut self.data[start..start + self.row_bytes]
    }
}

impl fmt::Debug for PlaneSliceMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PlaneSliceMut({}x{}, stride {}, {})",
            self.width, self.rows, self.stride, self.format
        )
    }
}

// ---------------------------------------------------------------------------
// PixelBuffer (owned)
// ---------------------------------------------------------------------------

/// Owned, format-tagged pixel buffer.
///
/// Created by [`PixelBufferBuilder`](crate::PixelBufferBuilder) (copies the
/// source) or [`from_vec`](Self::from_vec) (takes ownership without copying).
/// Dropped with its single owner.
#[non_exhaustive]
pub struct PixelBuffer {
    data: Vec<u8>,
    /// Byte offset from `data` start to the first aligned row.
    offset: usize,
    width: u32,
    height: u32,
    format: PixelFormat,
    layout: BufferLayout,
}

impl PixelBuffer {
    pub(crate) fn from_parts(
        data: Vec<u8>,
        offset: usize,
        width: u32,
        height: u32,
        format: PixelFormat,
        layout: BufferLayout,
    ) -> Self {
        debug_assert!(offset + layout.total_bytes() <= data.len());
        Self {
            data,
            offset,
            width,
            height,
            format,
            layout,
        }
    }

    /// Wrap an existing `Vec<u8>` holding tightly packed planes.
    ///
    /// No bytes are copied; the buffer takes ownership of the vec.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument::InsufficientData`] if the vec is too small,
    /// or a dimension error for zero or overflowing sizes.
    pub fn from_vec(
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self, BuildError> {
        let layout = BufferLayout::packed(format, width, height)?;
        let required = layout.total_bytes();
        if data.len() < required {
            return Err(InvalidArgument::InsufficientData {
                required,
                actual: data.len(),
            }
            .into());
        }
        Ok(Self::from_parts(data, 0, width, height, format, layout))
    }

    /// Copy a typed `imgref` image into a new buffer.
    ///
    /// Padding in the source stride is dropped; the result uses the default
    /// row alignment.
    pub fn from_imgref<'a, P>(img: ImgRef<'a, P>) -> Result<Self, BuildError>
    where
        PlaneSlice<'a>: From<ImgRef<'a, P>>,
    {
        let src = PlaneSlice::from(img);
        PixelBufferBuilder::new(src.format)
            .with_source_stride(src.stride)
            .build(Some(src.data), src.width, src.rows)
    }

    /// Consume the buffer and return the backing `Vec<u8>`.
    ///
    /// The vec includes any leading alignment slack; see
    /// [`as_bytes`](Self::as_bytes) for where the image starts.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel format tag.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Number of planes.
    #[inline]
    pub fn plane_count(&self) -> usize {
        self.layout.planes().len()
    }

    /// Byte stride of plane `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= plane_count()`.
    #[inline]
    pub fn stride(&self, index: usize) -> usize {
        self.plane_layout(index).stride
    }

    /// Layout of every plane relative to [`as_bytes`](Self::as_bytes).
    #[inline]
    pub fn layout(&self) -> &BufferLayout {
        &self.layout
    }

    /// The whole image region, every plane and row padding included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[self.offset..self.offset + self.layout.total_bytes()]
    }

    /// Borrow plane `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= plane_count()`.
    pub fn plane(&self, index: usize) -> PlaneSlice<'_> {
        let p = self.plane_layout(index);
        let start = self.offset + p.offset;
        PlaneSlice {
            data: &self.data[start..start + p.used_bytes()],
            width: p.width,
            rows: p.rows,
            row_bytes: p.row_bytes,
            stride: p.stride,
            format: self.format,
        }
    }

    /// Mutably borrow plane `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= plane_count()`.
    pub fn plane_mut(&mut self, index: usize) -> PlaneSliceMut<'_> {
        let p = self.plane_layout(index);
        let start = self.offset + p.offset;
        PlaneSliceMut {
            data: &mut self.data[start..start + p.used_bytes()],
            width: p.width,
            rows: p.rows,
            row_bytes: p.row_bytes,
            stride: p.stride,
            format: self.format,
        }
    }

    /// Pixel bytes with row padding removed, planes in storage order.
    ///
    /// For a buffer built from packed bytes this returns exactly those bytes.
    pub fn to_packed_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.layout.packed_bytes());
        for index in 0..self.plane_count() {
            for row in self.plane(index).iter_rows() {
                out.extend_from_slice(row);
            }
        }
        out
    }

    /// Whether plane rows start on `align`-byte memory boundaries.
    ///
    /// Always `false` for `align == 0`.
    pub fn is_aligned_to(&self, align: usize) -> bool {
        if align == 0 {
            return false;
        }
        let base = self.as_bytes().as_ptr();
        self.layout
            .planes()
            .iter()
            .all(|p| align_offset(base.wrapping_add(p.offset), align) == 0 && p.stride % align == 0)
    }

    fn plane_layout(&self, index: usize) -> PlaneLayout {
        let planes = self.layout.planes();
        assert!(
            index < planes.len(),
            "plane index {index} out of bounds (planes: {})",
            planes.len()
        );
        planes[index]
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PixelBuffer({}x{}, {})",
            self.width, self.height, self.format
        )
    }
}

/// Buffers are equal when they hold the same image; row padding and
/// alignment are ignored.
impl PartialEq for PixelBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.format == other.format
            && (0..self.plane_count()).all(|i| self.plane(i).iter_rows().eq(other.plane(i).iter_rows()))
    }
}

impl Eq for PixelBuffer {}

// ---------------------------------------------------------------------------
// ImgRef → PlaneSlice (zero-copy From impls)
// ---------------------------------------------------------------------------

macro_rules! impl_from_imgref {
    ($pixel:ty, $format:expr) => {
        impl<'a> From<ImgRef<'a, $pixel>> for PlaneSlice<'a> {
            fn from(img: ImgRef<'a, $pixel>) -> Self {
                use rgb::ComponentBytes;
                let size = core::mem::size_of::<$pixel>();
                let width = img.width();
                let height = img.height();
                let row_bytes = width * size;
                let stride = img.stride() * size;
                let bytes = img.into_buf().as_bytes();
                let used = height.saturating_sub(1) * stride + row_bytes;
                PlaneSlice {
                    data: &bytes[..used.min(bytes.len())],
                    width: width as u32,
                    rows: height as u32,
                    row_bytes,
                    stride,
                    format: $format,
                }
            }
        }
    };
}

impl_from_imgref!(BGRA<u8>, PixelFormat::Bgra32);
impl_from_imgref!(Rgba<u8>, PixelFormat::Rgba32);
impl_from_imgref!(Rgb<u8>, PixelFormat::Rgb24);
impl_from_imgref!(Gray<u8>, PixelFormat::Gray8);

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
