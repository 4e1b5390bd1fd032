//! Pixel format tags.
//!
//! [`PixelFormat`] values are CoreVideo `OSType` codes, so a tag can be
//! handed to platform consumers unchanged. Each format is described by one
//! to three [`PlaneDescriptor`]s.

use core::fmt;

/// Maximum number of planes any supported format uses.
pub const MAX_PLANES: usize = 3;

/// Pack a four-character code into a big-endian `u32`.
pub const fn fourcc(code: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*code)
}

// ---------------------------------------------------------------------------
// PlaneDescriptor
// ---------------------------------------------------------------------------

/// Geometry of one plane relative to the image size.
///
/// A plane is `ceil(width / 2^x_shift)` samples wide and
/// `ceil(height / 2^y_shift)` rows tall, each sample taking
/// `bytes_per_sample` bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlaneDescriptor {
    /// Bytes per stored sample (a pixel for packed formats).
    pub bytes_per_sample: usize,
    /// Horizontal subsampling as a power of two.
    pub x_shift: u8,
    /// Vertical subsampling as a power of two.
    pub y_shift: u8,
}

impl PlaneDescriptor {
    /// Full-resolution plane.
    pub const fn full(bytes_per_sample: usize) -> Self {
        Self {
            bytes_per_sample,
            x_shift: 0,
            y_shift: 0,
        }
    }

    /// Plane subsampled by two in both directions (4:2:0 chroma).
    pub const fn half(bytes_per_sample: usize) -> Self {
        Self {
            bytes_per_sample,
            x_shift: 1,
            y_shift: 1,
        }
    }

    /// Samples per row for an image `width` pixels wide.
    #[inline]
    pub const fn plane_width(self, width: u32) -> u32 {
        subsampled(width, self.x_shift)
    }

    /// Rows in this plane for an image `height` pixels tall.
    #[inline]
    pub const fn plane_height(self, height: u32) -> u32 {
        subsampled(height, self.y_shift)
    }

    /// Unpadded bytes in one row, or `None` on overflow.
    #[inline]
    pub const fn row_bytes(self, width: u32) -> Option<usize> {
        (self.plane_width(width) as usize).checked_mul(self.bytes_per_sample)
    }
}

const fn subsampled(len: u32, shift: u8) -> u32 {
    let round = (1u64 << shift) - 1;
    ((len as u64 + round) >> shift) as u32
}

// ---------------------------------------------------------------------------
// PixelFormat
// ---------------------------------------------------------------------------

/// Supported pixel formats, tagged with their CoreVideo `OSType`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u32)]
pub enum PixelFormat {
    /// 32-bit alpha, red, green, blue (`kCVPixelFormatType_32ARGB`).
    Argb32 = 0x0000_0020,
    /// 32-bit blue, green, red, alpha (`kCVPixelFormatType_32BGRA`).
    Bgra32 = fourcc(b"BGRA"),
    /// 32-bit red, green, blue, alpha (`kCVPixelFormatType_32RGBA`).
    Rgba32 = fourcc(b"RGBA"),
    /// 32-bit alpha, blue, green, red (`kCVPixelFormatType_32ABGR`).
    Abgr32 = fourcc(b"ABGR"),
    /// 24-bit red, green, blue (`kCVPixelFormatType_24RGB`).
    Rgb24 = 0x0000_0018,
    /// 24-bit blue, green, red (`kCVPixelFormatType_24BGR`).
    Bgr24 = fourcc(b"24BG"),
    /// 8-bit single component (`kCVPixelFormatType_OneComponent8`).
    Gray8 = fourcc(b"L008"),
    /// Planar Y, Cb, Cr 4:2:0 (`kCVPixelFormatType_420YpCbCr8Planar`).
    Yuv420Planar = fourcc(b"y420"),
    /// Bi-planar Y + interleaved CbCr 4:2:0, video range
    /// (`kCVPixelFormatType_420YpCbCr8BiPlanarVideoRange`).
    Nv12VideoRange = fourcc(b"420v"),
    /// Bi-planar Y + interleaved CbCr 4:2:0, full range
    /// (`kCVPixelFormatType_420YpCbCr8BiPlanarFullRange`).
    Nv12FullRange = fourcc(b"420f"),
}

const PACKED_1: &[PlaneDescriptor] = &[PlaneDescriptor::full(1)];
const PACKED_3: &[PlaneDescriptor] = &[PlaneDescriptor::full(3)];
const PACKED_4: &[PlaneDescriptor] = &[PlaneDescriptor::full(4)];
const PLANAR_420: &[PlaneDescriptor] = &[
    PlaneDescriptor::full(1),
    PlaneDescriptor::half(1),
    PlaneDescriptor::half(1),
];
const BIPLANAR_420: &[PlaneDescriptor] = &[PlaneDescriptor::full(1), PlaneDescriptor::half(2)];

impl PixelFormat {
    /// Every supported format.
    pub const ALL: [PixelFormat; 10] = [
        Self::Argb32,
        Self::Bgra32,
        Self::Rgba32,
        Self::Abgr32,
        Self::Rgb24,
        Self::Bgr24,
        Self::Gray8,
        Self::Yuv420Planar,
        Self::Nv12VideoRange,
        Self::Nv12FullRange,
    ];

    /// Look up a format by its `OSType`. Returns `None` for unsupported tags.
    pub const fn from_os_type(tag: u32) -> Option<Self> {
        let mut i = 0;
        while i < Self::ALL.len() {
            if Self::ALL[i] as u32 == tag {
                return Some(Self::ALL[i]);
            }
            i += 1;
        }
        None
    }

    /// The CoreVideo `OSType` for this format.
    #[inline]
    pub const fn os_type(self) -> u32 {
        self as u32
    }

    /// Plane geometry, in storage order.
    pub const fn planes(self) -> &'static [PlaneDescriptor] {
        match self {
            Self::Argb32 | Self::Bgra32 | Self::Rgba32 | Self::Abgr32 => PACKED_4,
            Self::Rgb24 | Self::Bgr24 => PACKED_3,
            Self::Gray8 => PACKED_1,
            Self::Yuv420Planar => PLANAR_420,
            Self::Nv12VideoRange | Self::Nv12FullRange => BIPLANAR_420,
        }
    }

    /// Number of planes.
    #[inline]
    pub const fn plane_count(self) -> usize {
        self.planes().len()
    }

    /// Whether samples are split across more than one plane.
    #[inline]
    pub const fn is_planar(self) -> bool {
        self.plane_count() > 1
    }

    /// Bytes per pixel for packed formats; `None` for planar ones.
    pub const fn bytes_per_pixel(self) -> Option<usize> {
        if self.is_planar() {
            None
        } else {
            Some(self.planes()[0].bytes_per_sample)
        }
    }

    /// Whether the format carries an alpha channel.
    pub const fn has_alpha(self) -> bool {
        matches!(
            self,
            Self::Argb32 | Self::Bgra32 | Self::Rgba32 | Self::Abgr32
        )
    }

    /// Whether the format is YCbCr.
    pub const fn is_yuv(self) -> bool {
        matches!(
            self,
            Self::Yuv420Planar | Self::Nv12VideoRange | Self::Nv12FullRange
        )
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.os_type().to_be_bytes();
        if code.iter().all(|b| b.is_ascii_graphic()) {
            write!(
                f,
                "'{}{}{}{}'",
                code[0] as char, code[1] as char, code[2] as char, code[3] as char
            )
        } else {
            write!(f, "{:#010x}", self.os_type())
        }
    }
}

impl TryFrom<u32> for PixelFormat {
    type Error = u32;

    fn try_from(tag: u32) -> Result<Self, u32> {
        Self::from_os_type(tag).ok_or(tag)
    }
}
