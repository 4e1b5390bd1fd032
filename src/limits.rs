//! Caps on what a single pixel buffer build may allocate.
//!
//! Dimensions are checked before any size arithmetic; the allocation size is
//! checked right before memory is reserved. Nothing is allocated for a
//! rejected build.

use core::fmt;

/// Optional caps on image size and allocation.
///
/// `None` means unlimited. Inputs that arrive from a camera or an untrusted
/// caller can carry arbitrary dimensions, so model runners typically cap
/// them at the largest frame they expect.
///
/// # Example
///
/// ```
/// use tensorio::ResourceLimits;
///
/// const CAMERA: ResourceLimits = ResourceLimits::none()
///     .with_max_width(4032)
///     .with_max_height(4032)
///     .with_max_memory(64 << 20);
///
/// assert!(CAMERA.check_dimensions(1920, 1080).is_ok());
/// assert!(CAMERA.check_dimensions(8000, 10).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ResourceLimits {
    /// Maximum width × height.
    pub max_pixels: Option<u64>,
    /// Maximum destination allocation, alignment slack included.
    pub max_memory_bytes: Option<usize>,
    /// Maximum image width in pixels.
    pub max_width: Option<u32>,
    /// Maximum image height in pixels.
    pub max_height: Option<u32>,
}

impl ResourceLimits {
    /// No caps.
    pub const fn none() -> Self {
        Self {
            max_pixels: None,
            max_memory_bytes: None,
            max_width: None,
            max_height: None,
        }
    }

    /// Cap width × height.
    pub const fn with_max_pixels(mut self, pixels: u64) -> Self {
        self.max_pixels = Some(pixels);
        self
    }

    /// Cap the destination allocation in bytes.
    pub const fn with_max_memory(mut self, bytes: usize) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    /// Cap image width in pixels.
    pub const fn with_max_width(mut self, width: u32) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Cap image height in pixels.
    pub const fn with_max_height(mut self, height: u32) -> Self {
        self.max_height = Some(height);
        self
    }

    /// Whether any cap is set.
    pub const fn has_any(&self) -> bool {
        self.max_pixels.is_some()
            || self.max_memory_bytes.is_some()
            || self.max_width.is_some()
            || self.max_height.is_some()
    }

    /// Check width, then height, then pixel count.
    pub fn check_dimensions(&self, width: u32, height: u32) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_width
            && width > max
        {
            return Err(LimitExceeded::Width { actual: width, max });
        }
        if let Some(max) = self.max_height
            && height > max
        {
            return Err(LimitExceeded::Height { actual: height, max });
        }
        let pixels = u64::from(width) * u64::from(height);
        match self.max_pixels {
            Some(max) if pixels > max => Err(LimitExceeded::Pixels { actual: pixels, max }),
            _ => Ok(()),
        }
    }

    /// Check an allocation of `bytes`.
    pub fn check_memory(&self, bytes: usize) -> Result<(), LimitExceeded> {
        match self.max_memory_bytes {
            Some(max) if bytes > max => Err(LimitExceeded::Memory { actual: bytes, max }),
            _ => Ok(()),
        }
    }
}

/// Which cap a build ran into, with the offending value and the cap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LimitExceeded {
    /// Width exceeded `max_width`.
    Width {
        /// Requested width.
        actual: u32,
        /// Configured cap.
        max: u32,
    },
    /// Height exceeded `max_height`.
    Height {
        /// Requested height.
        actual: u32,
        /// Configured cap.
        max: u32,
    },
    /// Width × height exceeded `max_pixels`.
    Pixels {
        /// Requested pixel count.
        actual: u64,
        /// Configured cap.
        max: u64,
    },
    /// The destination allocation exceeded `max_memory_bytes`.
    Memory {
        /// Bytes that would have been allocated.
        actual: usize,
        /// Configured cap.
        max: usize,
    },
}

impl fmt::Display for LimitExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Width { actual, max } => write!(f, "width {actual} exceeds limit {max}"),
            Self::Height { actual, max } => write!(f, "height {actual} exceeds limit {max}"),
            Self::Pixels { actual, max } => write!(f, "{actual} pixels exceed limit {max}"),
            Self::Memory { actual, max } => {
                write!(f, "allocation of {actual} bytes exceeds limit {max}")
            }
        }
    }
}

impl core::error::Error for LimitExceeded {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn none_is_unlimited() {
        let limits = ResourceLimits::none();
        assert!(!limits.has_any());
        assert_eq!(limits, ResourceLimits::default());
        assert!(limits.check_dimensions(u32::MAX, u32::MAX).is_ok());
        assert!(limits.check_memory(usize::MAX).is_ok());
    }

    #[test]
    fn model_input_sized_caps() {
        let limits = ResourceLimits::none()
            .with_max_width(224)
            .with_max_height(224);
        assert!(limits.has_any());
        assert!(limits.check_dimensions(224, 224).is_ok());
        assert_eq!(
            limits.check_dimensions(225, 224),
            Err(LimitExceeded::Width {
                actual: 225,
                max: 224
            })
        );
        assert_eq!(
            limits.check_dimensions(1, 300),
            Err(LimitExceeded::Height {
                actual: 300,
                max: 224
            })
        );
    }

    #[test]
    fn width_is_reported_before_pixels() {
        let limits = ResourceLimits::none()
            .with_max_width(100)
            .with_max_pixels(10);
        assert!(matches!(
            limits.check_dimensions(101, 1),
            Err(LimitExceeded::Width { .. })
        ));
    }

    #[test]
    fn pixel_count_does_not_overflow() {
        let limits = ResourceLimits::none().with_max_pixels(u64::from(u32::MAX));
        assert_eq!(
            limits.check_dimensions(u32::MAX, 2),
            Err(LimitExceeded::Pixels {
                actual: u64::from(u32::MAX) * 2,
                max: u64::from(u32::MAX)
            })
        );
        assert!(limits.check_dimensions(u32::MAX, 1).is_ok());
    }

    #[test]
    fn memory_cap_is_inclusive() {
        let limits = ResourceLimits::none().with_max_memory(4096);
        assert!(limits.check_memory(4096).is_ok());
        assert_eq!(
            limits.check_memory(4097),
            Err(LimitExceeded::Memory {
                actual: 4097,
                max: 4096
            })
        );
    }

    #[test]
    fn messages() {
        let err = LimitExceeded::Width {
            actual: 5000,
            max: 4096,
        };
        assert_eq!(err.to_string(), "width 5000 exceeds limit 4096");
        let err = LimitExceeded::Pixels { actual: 9, max: 4 };
        assert_eq!(err.to_string(), "9 pixels exceed limit 4");
        let err = LimitExceeded::Memory {
            actual: 2048,
            max: 1024,
        };
        assert_eq!(err.to_string(), "allocation of 2048 bytes exceeds limit 1024");
    }
}
