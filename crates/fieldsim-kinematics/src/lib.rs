#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for 2D tank and mecanum drivetrain motion on a bounded field."]
#![doc = ""]
#![doc = "Each drivetrain turns normalized wheel commands into rate-limited wheel velocities,"]
#![doc = "integrates them into a pose, resolves the move against an obstacle collider one axis"]
#![doc = "at a time and keeps the chassis inside the field walls."]

extern crate alloc;

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod collision;
pub mod error;
pub mod limits;
pub mod mecanum;
pub mod robot;
pub mod tank;
pub mod trajectory;
pub mod units;

pub use collision::{Collider, OpenField, Point, Rect};
pub use error::KinematicsError;
pub use limits::{Chassis, DriveLimits, move_towards};
pub use mecanum::{MecanumCommand, MecanumDrive, MecanumWheels};
pub use robot::{DriveCommand, Robot, WheelTelemetry};
pub use tank::{TankCommand, TankDrive, TankWheels};
pub use trajectory::{PathFollower, Trajectory};

/// A field pose `(x, y, heading)` in inches and degrees.
///
/// The origin is the field center. Heading 0° points along `+y` and grows
/// clockwise (90° points along `+x`); it is kept in `[0, 360)`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// Field x position (in).
    pub x: f64,
    /// Field y position (in).
    pub y: f64,
    /// Heading (deg).
    #[cfg_attr(feature = "serde", serde(default))]
    pub heading: f64,
}

impl Pose {
    /// Construct a new pose.
    ///
    /// # Arguments
    ///
    /// * `x`: Field x position in inches, positive toward the right wall.
    /// * `y`: Field y position in inches, positive away from the driver.
    /// * `heading`: Compass heading in degrees.
    pub const fn new(x: f64, y: f64, heading: f64) -> Self {
        Pose { x, y, heading }
    }

    /// Whether every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.heading.is_finite()
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Pose { x, y, heading } = self;
        write!(f, "(x: {x:.2} in, y: {y:.2} in, θ: {heading:.2}°)")
    }
}

/// Robot-frame chassis velocities derived from the wheel state.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChassisSpeeds {
    /// Speed along the heading (in/s).
    pub forward: f64,
    /// Speed to the robot's right (in/s). Always zero for tank drive.
    pub right: f64,
    /// Heading rate (rad/s), positive when the heading grows.
    pub omega: f64,
}

impl ChassisSpeeds {
    /// Construct chassis speeds.
    ///
    /// # Arguments
    ///
    /// * `forward`: Speed along the heading (in/s).
    /// * `right`: Speed to the robot's right (in/s).
    /// * `omega`: Heading rate (rad/s).
    pub const fn new(forward: f64, right: f64, omega: f64) -> Self {
        ChassisSpeeds {
            forward,
            right,
            omega,
        }
    }
}

impl fmt::Display for ChassisSpeeds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ChassisSpeeds {
            forward,
            right,
            omega,
        } = self;
        write!(f, "({forward:.2}, {right:.2}) in/s, ω: {omega:.2} rad/s")
    }
}

/// Common contract of the drivetrain models.
///
/// One `update_pose` call is one simulation tick: wheel velocities track the
/// command under the rate limits, then the pose integrates them over `dt`.
pub trait Drivetrain {
    /// Normalized command consumed per tick.
    type Command: Copy;
    /// Wheel velocity state (ft/s) kept between ticks.
    type Wheels: Copy;

    /// Advance one tick.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidTimeDelta)` if `dt` is negative or
    /// not finite.
    fn update_pose<C>(
        &mut self,
        command: Self::Command,
        collider: &C,
        dt: f64,
    ) -> Result<Pose, KinematicsError>
    where
        C: Collider + ?Sized;

    /// Current pose.
    fn pose(&self) -> Pose;

    /// Place the robot directly, clamped to the field. Wheel state is kept.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidPose)` and keeps the current pose
    /// if any component of `pose` is NaN or infinite.
    fn set_pose(&mut self, pose: Pose) -> Result<(), KinematicsError>;

    /// Current wheel velocities (ft/s).
    fn wheels(&self) -> Self::Wheels;

    /// Robot-frame velocities implied by the current wheel state.
    fn chassis_speeds(&self) -> ChassisSpeeds;

    /// Chassis geometry.
    fn chassis(&self) -> &Chassis;

    /// Drive limits.
    fn limits(&self) -> &DriveLimits;

    /// Drive limits, for runtime tuning.
    fn limits_mut(&mut self) -> &mut DriveLimits;
}

/// Clamp a raw command to `[-1, 1]`. A NaN command counts as zero.
pub fn clamp_command(command: f64) -> f64 {
    if command.is_nan() {
        return 0.0;
    }
    units::clamp(command, -1.0, 1.0)
}

pub(crate) fn check_dt(dt: f64) -> Result<(), KinematicsError> {
    if !dt.is_finite() || dt < 0.0 {
        return Err(KinematicsError::InvalidTimeDelta(
            "must be finite and non-negative",
        ));
    }
    Ok(())
}

pub(crate) fn check_pose(pose: &Pose) -> Result<(), KinematicsError> {
    if !pose.is_finite() {
        return Err(KinematicsError::InvalidPose(
            "components must be finite",
        ));
    }
    Ok(())
}
