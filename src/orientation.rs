//! Orientation of an input image relative to its stored pixels.

/// How stored pixels must be transformed to appear upright.
///
/// Discriminants are the EXIF Orientation tag values (TIFF tag 274), which is
/// also how camera frames and decoded photos report it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ImageOrientation {
    /// Stored upright.
    #[default]
    Up = 1,
    /// Mirrored left-right.
    UpMirrored = 2,
    /// Rotated 180 degrees.
    Down = 3,
    /// Mirrored top-bottom.
    DownMirrored = 4,
    /// Mirrored along the main diagonal.
    LeftMirrored = 5,
    /// Needs a 90 degree clockwise turn.
    Right = 6,
    /// Mirrored along the anti-diagonal.
    RightMirrored = 7,
    /// Needs a 90 degree counter-clockwise turn.
    Left = 8,
}

impl ImageOrientation {
    /// Every orientation, in EXIF order.
    pub const ALL: [ImageOrientation; 8] = [
        Self::Up,
        Self::UpMirrored,
        Self::Down,
        Self::DownMirrored,
        Self::LeftMirrored,
        Self::Right,
        Self::RightMirrored,
        Self::Left,
    ];

    /// From an EXIF value (1-8). Anything else reads as [`Up`](Self::Up).
    pub fn from_exif(value: u16) -> Self {
        match value {
            2 => Self::UpMirrored,
            3 => Self::Down,
            4 => Self::DownMirrored,
            5 => Self::LeftMirrored,
            6 => Self::Right,
            7 => Self::RightMirrored,
            8 => Self::Left,
            _ => Self::Up,
        }
    }

    /// EXIF value (1-8).
    pub fn exif_value(self) -> u16 {
        self as u16
    }

    /// True for the quarter-turn orientations (EXIF 5-8).
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Self::LeftMirrored | Self::Right | Self::RightMirrored | Self::Left
        )
    }

    /// Upright width and height for an image stored as `width` x `height`.
    pub fn display_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }

    pub fn is_mirrored(self) -> bool {
        matches!(
            self,
            Self::UpMirrored | Self::DownMirrored | Self::LeftMirrored | Self::RightMirrored
        )
    }

    pub fn is_identity(self) -> bool {
        self == Self::Up
    }
}
