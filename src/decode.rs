//! Decoding of compressed and file-backed image inputs.
//!
//! Decoded images are expanded to 8-bit RGBA and copied into an
//! [`PixelFormat::Rgba32`] buffer through the regular builder, so resource
//! limits apply both while decoding and while building.

use alloc::string::{String, ToString};
use std::io::Cursor;

use image::ImageFormat;
use image::io::{Limits, Reader};

use crate::buffer::PixelBuffer;
use crate::builder::PixelBufferBuilder;
use crate::format::PixelFormat;
use crate::input::{ImageEncoding, InputError};
use crate::limits::ResourceLimits;

/// Decode in-memory `bytes` tagged as `encoding`.
///
/// JPEG and PNG use their own decoder; anything else is sniffed.
pub(crate) fn decode_bytes(
    bytes: &[u8],
    encoding: ImageEncoding,
    limits: ResourceLimits,
) -> Result<PixelBuffer, InputError> {
    let mut reader = match encoding {
        ImageEncoding::Jpeg => Reader::with_format(Cursor::new(bytes), ImageFormat::Jpeg),
        ImageEncoding::Png => Reader::with_format(Cursor::new(bytes), ImageFormat::Png),
        _ => Reader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| decode_error(encoding, e))?,
    };
    reader.limits(decoder_limits(limits));
    let image = reader.decode().map_err(|e| decode_error(encoding, e))?;
    build_rgba(image, encoding, limits)
}

/// Decode the image file at `path`, which may be a `file:` URL.
pub(crate) fn decode_file(path: &str, limits: ResourceLimits) -> Result<PixelBuffer, InputError> {
    let encoding = ImageEncoding::File;
    let mut reader = Reader::open(file_path(path))
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| decode_error(encoding, e))?;
    reader.limits(decoder_limits(limits));
    let image = reader.decode().map_err(|e| decode_error(encoding, e))?;
    build_rgba(image, encoding, limits)
}

/// Strip a `file:` or `file://` scheme, leaving the absolute path.
fn file_path(path: &str) -> &str {
    path.strip_prefix("file://")
        .or_else(|| path.strip_prefix("file:"))
        .unwrap_or(path)
}

fn decoder_limits(limits: ResourceLimits) -> Limits {
    let mut decoder = Limits::no_limits();
    decoder.max_image_width = limits.max_width;
    decoder.max_image_height = limits.max_height;
    decoder.max_alloc = limits.max_memory_bytes.map(|b| b as u64);
    decoder
}

fn build_rgba(
    image: image::DynamicImage,
    encoding: ImageEncoding,
    limits: ResourceLimits,
) -> Result<PixelBuffer, InputError> {
    let rgba = image.into_rgba8();
    let (width, height) = rgba.dimensions();
    tracing::debug!(%encoding, width, height, "decoded image input");
    let buf = PixelBufferBuilder::new(PixelFormat::Rgba32)
        .with_limits(limits)
        .build(Some(rgba.as_raw()), width, height)?;
    Ok(buf)
}

fn decode_error(encoding: ImageEncoding, err: impl ToString) -> InputError {
    let message: String = err.to_string();
    tracing::debug!(%encoding, %message, "image input failed to decode");
    InputError::Decode { encoding, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use image::{ImageOutputFormat, RgbaImage};

    fn png(width: u32, height: u32) -> (RgbaImage, Vec<u8>) {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([x as u8 * 40, y as u8 * 40, 200, 255 - x as u8])
        });
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Png)
            .unwrap();
        (img, out)
    }

    #[test]
    fn file_urls_become_paths() {
        assert_eq!(file_path("file:///tmp/cat.png"), "/tmp/cat.png");
        assert_eq!(file_path("file:/tmp/cat.png"), "/tmp/cat.png");
        assert_eq!(file_path("/tmp/cat.png"), "/tmp/cat.png");
    }

    #[test]
    fn png_decodes_losslessly() {
        let (img, bytes) = png(5, 3);
        let buf = decode_bytes(&bytes, ImageEncoding::Png, ResourceLimits::none()).unwrap();
        assert_eq!(buf.format(), PixelFormat::Rgba32);
        assert_eq!((buf.width(), buf.height()), (5, 3));
        assert_eq!(buf.to_packed_bytes(), img.as_raw().as_slice());
    }

    #[test]
    fn limits_apply_to_decoded_images() {
        let (_, bytes) = png(5, 3);
        let err = decode_bytes(
            &bytes,
            ImageEncoding::Png,
            ResourceLimits::none().with_max_width(4),
        )
        .unwrap_err();
        assert!(matches!(err, InputError::Decode { .. } | InputError::Build(_)));

        let err = decode_bytes(
            &bytes,
            ImageEncoding::Png,
            ResourceLimits::none().with_max_pixels(10),
        )
        .unwrap_err();
        assert!(matches!(err, InputError::Build(_)));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode_bytes(&[0xFF, 0xD8, 0xFF, 0x00], ImageEncoding::Jpeg, ResourceLimits::none())
            .unwrap_err();
        assert!(matches!(
            err,
            InputError::Decode {
                encoding: ImageEncoding::Jpeg,
                ..
            }
        ));
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let err = decode_file("/nonexistent/tensorio/cat.png", ResourceLimits::none()).unwrap_err();
        assert!(matches!(
            err,
            InputError::Decode {
                encoding: ImageEncoding::File,
                ..
            }
        ));
    }
}
