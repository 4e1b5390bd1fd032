//! Image inputs handed to a model's image layer.
//!
//! An [`ImageInput`] says how its bytes are encoded, where they live, and how
//! the image is oriented. Raw pixel encodings convert straight into a
//! [`PixelBuffer`]. JPEG, PNG and file inputs are decoded to RGBA when the
//! `decode` feature is enabled; assets always need the host to resolve them.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use thiserror::Error;

use crate::buffer::PixelBuffer;
use crate::builder::PixelBufferBuilder;
use crate::error::BuildError;
use crate::format::PixelFormat;
use crate::limits::ResourceLimits;
use crate::orientation::ImageOrientation;

/// How the data of an [`ImageInput`] is encoded.
///
/// The numeric codes are stable and shared with callers that pass the
/// encoding as an integer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ImageEncoding {
    #[default]
    Unknown = 0,
    /// Raw 32-bit pixels, A R G B byte order.
    Argb = 1,
    /// Raw 32-bit pixels, B G R A byte order.
    Bgra = 2,
    Jpeg = 3,
    Png = 4,
    /// Path to an image file on disk.
    File = 5,
    /// Name of an image bundled with the application.
    Asset = 6,
}

impl ImageEncoding {
    /// From a numeric code. Unrecognised codes are [`Unknown`](Self::Unknown).
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Argb,
            2 => Self::Bgra,
            3 => Self::Jpeg,
            4 => Self::Png,
            5 => Self::File,
            6 => Self::Asset,
            _ => Self::Unknown,
        }
    }

    /// Numeric code, as passed across the bridge.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Detect a compressed encoding from magic bytes.
    pub fn detect(data: &[u8]) -> Option<Self> {
        // JPEG: FF D8 FF
        if data.len() >= 3 && data[..3] == [0xFF, 0xD8, 0xFF] {
            return Some(Self::Jpeg);
        }
        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.len() >= 8 && data[..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
            return Some(Self::Png);
        }
        None
    }

    /// Pixel format of a raw encoding, `None` for everything else.
    pub fn pixel_format(self) -> Option<PixelFormat> {
        match self {
            Self::Argb => Some(PixelFormat::Argb32),
            Self::Bgra => Some(PixelFormat::Bgra32),
            _ => None,
        }
    }

    /// Whether the data is uncompressed pixels.
    pub fn is_raw(self) -> bool {
        self.pixel_format().is_some()
    }

    /// Whether the data must be decoded before use.
    pub fn needs_decoder(self) -> bool {
        matches!(self, Self::Jpeg | Self::Png | Self::File | Self::Asset)
    }
}

impl fmt::Display for ImageEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "unknown",
            Self::Argb => "ARGB",
            Self::Bgra => "BGRA",
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::File => "file",
            Self::Asset => "asset",
        })
    }
}

/// Where the image data lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// In-memory bytes.
    Bytes(Vec<u8>),
    /// A file path or asset name.
    Path(String),
}

/// Whether `path` names a file rather than a bundled asset.
///
/// Absolute paths and `file:/` URLs are files.
pub fn is_absolute_path(path: &str) -> bool {
    path.starts_with("file:/") || path.starts_with('/')
}

/// Why an [`ImageInput`] could not become a pixel buffer.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum InputError {
    /// The input is compressed or names an image the crate cannot open.
    ///
    /// Returned for JPEG, PNG and file inputs without the `decode` feature,
    /// and for assets always.
    #[error("{0} input must be decoded before it can become a pixel buffer")]
    RequiresDecoder(ImageEncoding),

    /// The decoder rejected the data or the file could not be read.
    #[error("failed to decode {encoding} input: {message}")]
    Decode {
        encoding: ImageEncoding,
        message: String,
    },

    #[error("image encoding is unknown")]
    UnknownEncoding,

    /// Raw inputs need an explicit width and height.
    #[error("raw {0} input has no dimensions")]
    MissingDimensions(ImageEncoding),

    /// A raw encoding was paired with a path instead of bytes.
    #[error("raw {0} input must carry bytes, not a path")]
    NotPixelData(ImageEncoding),

    #[error(transparent)]
    Build(#[from] BuildError),
}

/// An image destined for a model's image layer.
///
/// ```
/// use tensorio::{ImageEncoding, ImageInput, ImageOrientation, PixelFormat};
///
/// let input = ImageInput::raw(ImageEncoding::Bgra, vec![0u8; 2 * 2 * 4], 2, 2)
///     .with_orientation(ImageOrientation::Right);
/// let buf = input.to_pixel_buffer().unwrap();
/// assert_eq!(buf.format(), PixelFormat::Bgra32);
/// assert_eq!(input.display_dimensions(), Some((2, 2)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageInput {
    encoding: ImageEncoding,
    source: ImageSource,
    width: Option<u32>,
    height: Option<u32>,
    orientation: ImageOrientation,
}

impl ImageInput {
    /// Uncompressed pixels with explicit dimensions.
    pub fn raw(encoding: ImageEncoding, bytes: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            encoding,
            source: ImageSource::Bytes(bytes),
            width: Some(width),
            height: Some(height),
            orientation: ImageOrientation::Up,
        }
    }

    /// Compressed bytes, encoding detected from the magic number.
    ///
    /// Unrecognised data is tagged [`ImageEncoding::Unknown`].
    pub fn encoded(bytes: Vec<u8>) -> Self {
        Self {
            encoding: ImageEncoding::detect(&bytes).unwrap_or_default(),
            source: ImageSource::Bytes(bytes),
            width: None,
            height: None,
            orientation: ImageOrientation::Up,
        }
    }

    /// An image file on disk. `path` may be absolute or a `file:` URL.
    pub fn file(path: impl Into<String>) -> Self {
        Self::named(ImageEncoding::File, path.into())
    }

    /// An image bundled with the host application, by name.
    ///
    /// Assets never convert to pixel buffers here; the host resolves them.
    pub fn asset(name: impl Into<String>) -> Self {
        Self::named(ImageEncoding::Asset, name.into())
    }

    /// A file for absolute paths and `file:/` URLs, otherwise an asset.
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        if is_absolute_path(&path) {
            Self::named(ImageEncoding::File, path)
        } else {
            Self::named(ImageEncoding::Asset, path)
        }
    }

    fn named(encoding: ImageEncoding, path: String) -> Self {
        Self {
            encoding,
            source: ImageSource::Path(path),
            width: None,
            height: None,
            orientation: ImageOrientation::Up,
        }
    }

    /// Record how the stored pixels are oriented. Defaults to
    /// [`ImageOrientation::Up`].
    pub fn with_orientation(mut self, orientation: ImageOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// How the data is encoded.
    pub fn encoding(&self) -> ImageEncoding {
        self.encoding
    }

    /// The bytes or path holding the image.
    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    /// Stored width in pixels; known only for raw inputs.
    pub fn width(&self) -> Option<u32> {
        self.width
    }

    /// Stored height in pixels; known only for raw inputs.
    pub fn height(&self) -> Option<u32> {
        self.height
    }

    /// Orientation of the stored pixels.
    pub fn orientation(&self) -> ImageOrientation {
        self.orientation
    }

    /// Upright dimensions after applying the orientation, when known.
    pub fn display_dimensions(&self) -> Option<(u32, u32)> {
        Some(
            self.orientation
                .display_dimensions(self.width?, self.height?),
        )
    }

    /// Convert the input into a pixel buffer.
    ///
    /// Raw ARGB and BGRA inputs keep their format. Decoded inputs become
    /// [`PixelFormat::Rgba32`].
    pub fn to_pixel_buffer(&self) -> Result<PixelBuffer, InputError> {
        self.to_pixel_buffer_with_limits(ResourceLimits::none())
    }

    /// Like [`to_pixel_buffer`](Self::to_pixel_buffer), enforcing `limits`.
    ///
    /// The stored pixels are copied as-is; orientation is metadata only.
    pub fn to_pixel_buffer_with_limits(
        &self,
        limits: ResourceLimits,
    ) -> Result<PixelBuffer, InputError> {
        match self.encoding {
            ImageEncoding::Unknown => Err(InputError::UnknownEncoding),
            ImageEncoding::Argb | ImageEncoding::Bgra => self.build_raw(limits),
            #[cfg(feature = "decode")]
            ImageEncoding::Jpeg | ImageEncoding::Png | ImageEncoding::File => {
                match &self.source {
                    ImageSource::Bytes(bytes) => {
                        crate::decode::decode_bytes(bytes, self.encoding, limits)
                    }
                    ImageSource::Path(path) => crate::decode::decode_file(path, limits),
                }
            }
            encoding => Err(InputError::RequiresDecoder(encoding)),
        }
    }

    fn build_raw(&self, limits: ResourceLimits) -> Result<PixelBuffer, InputError> {
        let format = self
            .encoding
            .pixel_format()
            .ok_or(InputError::RequiresDecoder(self.encoding))?;
        let ImageSource::Bytes(bytes) = &self.source else {
            return Err(InputError::NotPixelData(self.encoding));
        };
        let (Some(width), Some(height)) = (self.width, self.height) else {
            return Err(InputError::MissingDimensions(self.encoding));
        };

        let buf = PixelBufferBuilder::new(format)
            .with_limits(limits)
            .build(Some(bytes), width, height)?;
        Ok(buf)
    }
}
