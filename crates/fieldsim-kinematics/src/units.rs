//! Unit and angle conversions shared by the drive models and the renderer.
//!
//! Field coordinates are inches with the origin at the field center, `+y`
//! pointing away from the driver and headings measured in degrees clockwise
//! from `+y` (compass style). Pixel coordinates put the origin at the top-left
//! corner of the canvas with `y` growing downward.

use core::f64::consts::PI;
use libm::{fmax, fmin};

/// Canvas scale multiplier.
pub const SCALE: f64 = 4.0;
/// Canvas width in pixels.
pub const CANVAS_WIDTH_PX: f64 = 144.0 * SCALE;
/// Canvas height in pixels.
pub const CANVAS_HEIGHT_PX: f64 = 144.0 * SCALE;
/// Field width factor used by the pixel scale.
pub const FIELD_WIDTH_IN: f64 = 1.5;
/// Pixel density constant.
pub const K_PX: f64 = 96.0;
/// Distance from the field center to each wall, in inches.
pub const FIELD_HALF_EXTENT_IN: f64 = 72.0;
/// Inches per foot.
pub const INCHES_PER_FOOT: f64 = 12.0;

/// Inches to pixels (a length, not a coordinate).
pub fn to_px(inches: f64) -> f64 {
    inches / ((CANVAS_WIDTH_PX / SCALE) / (FIELD_WIDTH_IN * SCALE)) * K_PX
}

/// Field x coordinate (inches) to canvas x coordinate (pixels).
pub fn to_pxx(inches: f64) -> f64 {
    to_px(inches + FIELD_HALF_EXTENT_IN)
}

/// Field y coordinate (inches) to canvas y coordinate (pixels).
pub fn to_pxy(inches: f64) -> f64 {
    to_px(FIELD_HALF_EXTENT_IN - inches)
}

/// Pixels to inches (a length, not a coordinate).
pub fn to_in(px: f64) -> f64 {
    px * ((CANVAS_WIDTH_PX / SCALE) / (FIELD_WIDTH_IN * SCALE)) / K_PX
}

/// Degrees to radians.
pub fn to_rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Radians to degrees.
pub fn to_deg(rad: f64) -> f64 {
    rad * 180.0 / PI
}

/// Compass heading (degrees) to the canvas rotation angle (radians) that
/// points a chassis drawn along `+x` in the heading direction.
pub fn to_inertial_rad(deg: f64) -> f64 {
    (deg - 90.0) * (PI / 180.0)
}

/// Feet to inches.
pub fn ft_to_in(feet: f64) -> f64 {
    feet * INCHES_PER_FOOT
}

/// Reduce an angle in degrees to `[0, 360)`.
pub fn reduce_0_360(angle: f64) -> f64 {
    ((angle % 360.0) + 360.0) % 360.0
}

/// Clamp `value` to `[min, max]`.
///
/// Unlike [`f64::clamp`] this never panics: when `min > max` the result is
/// `min`, which keeps an oversized chassis pinned to one wall instead of
/// aborting the frame.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    fmax(min, fmin(max, value))
}
