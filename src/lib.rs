//! Native image-input plumbing for TensorFlow Lite model runners.
//!
//! The core is the pixel buffer builder: a flat byte array plus width, height
//! and a CoreVideo pixel-format tag becomes an owned, row-aligned
//! [`PixelBuffer`], or nothing.
//!
//! - [`try_create_pixel_buffer`] / [`create_pixel_buffer`]: nullable and
//!   error-carrying construction
//! - [`PixelBufferBuilder`]: row alignment, source stride, [`ResourceLimits`]
//! - [`PixelFormat`]: supported `OSType` tags and their plane geometry
//! - [`PixelBuffer`] / [`PlaneSlice`]: the owned buffer and its row views
//! - [`ImageInput`] / [`ImageEncoding`] / [`ImageOrientation`]: image-layer inputs
//! - [`top_n`]: label selection for classifier outputs
//!
//! Construction is pure and synchronous, so buffers can be built from any
//! number of threads at once.
//!
//! # Features
//!
//! - `std`: links the standard library.
//! - `decode`: decodes JPEG, PNG and file [`ImageInput`]s with the `image`
//!   crate. Implies `std`.

#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod buffer;
mod builder;
mod classification;
#[cfg(feature = "decode")]
mod decode;
mod error;
mod format;
mod input;
mod layout;
mod limits;
mod orientation;

pub use buffer::{PixelBuffer, PlaneSlice, PlaneSliceMut};
pub use builder::{
    DEFAULT_ROW_ALIGNMENT, PixelBufferBuilder, create_pixel_buffer, try_create_pixel_buffer,
};
pub use classification::top_n;
pub use error::{BuildError, InvalidArgument};
pub use format::{MAX_PLANES, PixelFormat, PlaneDescriptor, fourcc};
pub use input::{ImageEncoding, ImageInput, ImageSource, InputError, is_absolute_path};
pub use layout::{BufferLayout, PlaneLayout, required_size};
pub use limits::{LimitExceeded, ResourceLimits};
pub use orientation::ImageOrientation;

// Re-exports for typed-pixel interop.
pub use imgref::{Img, ImgRef, ImgVec};
pub use rgb;
pub use rgb::alt::BGRA as Bgra;
pub use rgb::{Gray, Rgb, Rgba};
