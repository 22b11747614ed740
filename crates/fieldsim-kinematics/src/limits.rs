//! Chassis geometry, drive limits and the rate limiter that tracks wheel
//! velocities toward their targets.

use core::fmt;
use libm::fabs;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::KinematicsError;

/// Physical footprint and wheel layout of a chassis, in inches.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chassis {
    /// Footprint extent along the field x axis (in).
    pub width: f64,
    /// Footprint extent along the field y axis (in).
    pub height: f64,
    /// Distance between the left and right wheel contact lines (in).
    pub track_width: f64,
    /// Distance between the front and rear axles (in). Unused by tank drive.
    #[cfg_attr(feature = "serde", serde(default))]
    pub wheel_base: f64,
}

impl Chassis {
    /// Construct a chassis description.
    ///
    /// # Arguments
    ///
    /// * `width`: Footprint extent along the field x axis in inches.
    /// * `height`: Footprint extent along the field y axis in inches.
    /// * `track_width`: Left-to-right wheel spacing in inches.
    /// * `wheel_base`: Front-to-rear axle spacing in inches.
    pub const fn new(width: f64, height: f64, track_width: f64, wheel_base: f64) -> Self {
        Chassis {
            width,
            height,
            track_width,
            wheel_base,
        }
    }

    /// Checks that every dimension is a positive, finite number.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidDimension)` naming the first
    /// offending dimension.
    pub fn validate(&self) -> Result<(), KinematicsError> {
        self.validate_differential()?;
        check_dimension(self.wheel_base, "wheel base must be positive")
    }

    /// Like [`Chassis::validate`] but ignores the wheel base, which a
    /// two-sided drivetrain never reads.
    pub fn validate_differential(&self) -> Result<(), KinematicsError> {
        check_dimension(self.width, "width must be positive")?;
        check_dimension(self.height, "height must be positive")?;
        check_dimension(self.track_width, "track width must be positive")
    }
}

fn check_dimension(value: f64, msg: &'static str) -> Result<(), KinematicsError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(KinematicsError::InvalidDimension(msg));
    }
    Ok(())
}

impl fmt::Display for Chassis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}x{:.1} in (track {:.1} in, base {:.1} in)",
            self.width, self.height, self.track_width, self.wheel_base
        )
    }
}

/// Speed and rate limits applied to every wheel.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveLimits {
    /// Wheel speed at full command (ft/s).
    pub max_speed: f64,
    /// Largest change per second while a wheel speeds up (ft/s²).
    pub max_accel: f64,
    /// Largest change per second while a wheel slows down (ft/s²).
    pub max_decel: f64,
}

impl DriveLimits {
    /// Construct drive limits.
    ///
    /// # Arguments
    ///
    /// * `max_speed`: Wheel speed at full command (ft/s).
    /// * `max_accel`: Rate limit while speeding up (ft/s²).
    /// * `max_decel`: Rate limit while slowing down (ft/s²).
    pub const fn new(max_speed: f64, max_accel: f64, max_decel: f64) -> Self {
        DriveLimits {
            max_speed,
            max_accel,
            max_decel,
        }
    }

    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidLimit)` if any limit is negative
    /// or not finite.
    pub fn validate(&self) -> Result<(), KinematicsError> {
        check_limit(self.max_speed, "max speed must be finite and non-negative")?;
        check_limit(self.max_accel, "max accel must be finite and non-negative")?;
        check_limit(self.max_decel, "max decel must be finite and non-negative")
    }

    /// Nudge `max_accel` by `delta` ft/s², never going below zero.
    ///
    /// Returns the new value.
    pub fn adjust_max_accel(&mut self, delta: f64) -> f64 {
        let next = self.max_accel + delta;
        self.max_accel = if next.is_finite() && next > 0.0 {
            next
        } else {
            0.0
        };
        self.max_accel
    }

    /// Per-step bound for a wheel moving from `current` toward `target`,
    /// choosing the accel or decel rate by whether the speed magnitude grows.
    pub fn directional_step(&self, current: f64, target: f64, dt: f64) -> f64 {
        let rate = if fabs(target) > fabs(current) {
            self.max_accel
        } else {
            self.max_decel
        };
        rate * dt
    }
}

fn check_limit(value: f64, msg: &'static str) -> Result<(), KinematicsError> {
    if !value.is_finite() || value < 0.0 {
        return Err(KinematicsError::InvalidLimit(msg));
    }
    Ok(())
}

impl fmt::Display for DriveLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(v: {:.2} ft/s, a: {:.2} ft/s², d: {:.2} ft/s²)",
            self.max_speed, self.max_accel, self.max_decel
        )
    }
}

/// Move `current` toward `target` by at most `max_delta`, landing exactly on
/// `target` when it is within reach.
///
/// # Arguments
///
/// * `current`: The value now.
/// * `target`: The value being tracked.
/// * `max_delta`: Largest allowed change this step; expected non-negative.
///
/// # Returns
///
/// The next value, never overshooting `target`.
pub fn move_towards(current: f64, target: f64, max_delta: f64) -> f64 {
    let diff = target - current;
    if fabs(diff) <= max_delta {
        return target;
    }
    if diff > 0.0 {
        current + max_delta
    } else {
        current - max_delta
    }
}
