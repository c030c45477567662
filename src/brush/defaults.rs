//! Property values shown before the host has reported anything
//!
//! Once a refresh succeeds these are only used again for a new session.

/// Default values for the brush property snapshot
pub struct PropertyDefaults;

impl PropertyDefaults {
    /// Brush diameter in pixels
    pub const SIZE: i32 = 15;

    /// Opacity percentage
    pub const OPACITY: i32 = 100;

    /// Flow percentage
    pub const FLOW: i32 = 100;

    /// Tip angle in degrees
    pub const ANGLE: i32 = 0;

    /// Hardness percentage (0 = soft edge)
    pub const HARDNESS: i32 = 0;

    /// Spacing as a percentage of the diameter
    pub const SPACING: i32 = 25;

    /// All shape dynamics jitter and minimum values
    pub const SHAPE_DYNAMICS: i32 = 0;
}
