//! Differential ("tank") drive: two wheel groups whose speed difference turns
//! the chassis.

use core::fmt;
use libm::{cos, sin};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::collision::{Collider, Point, Rect, clamp_pose, resolve};
use crate::units::{ft_to_in, reduce_0_360, to_deg, to_rad};
use crate::{
    Chassis, ChassisSpeeds, DriveLimits, Drivetrain, KinematicsError, Pose, check_dt, check_pose,
    clamp_command, move_towards,
};

/// Normalized left/right command, each in `[-1, 1]` (clamped on use).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TankCommand {
    /// Left side command.
    pub left: f64,
    /// Right side command.
    pub right: f64,
}

impl TankCommand {
    /// Construct a command.
    ///
    /// # Arguments
    ///
    /// * `left`: Left side command in `[-1, 1]`.
    /// * `right`: Right side command in `[-1, 1]`.
    pub const fn new(left: f64, right: f64) -> Self {
        TankCommand { left, right }
    }
}

/// Left and right wheel velocities (ft/s).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TankWheels {
    /// Left wheel velocity (ft/s).
    pub left: f64,
    /// Right wheel velocity (ft/s).
    pub right: f64,
}

impl fmt::Display for TankWheels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(vL: {:.2} ft/s, vR: {:.2} ft/s)", self.left, self.right)
    }
}

/// Tank drive model.
///
/// Both wheels are rate limited by `max_accel` whether they speed up or slow
/// down; `max_decel` is not consulted.
#[derive(Debug, Clone, PartialEq)]
pub struct TankDrive {
    chassis: Chassis,
    limits: DriveLimits,
    pose: Pose,
    wheels: TankWheels,
}

impl TankDrive {
    /// Build a tank drive at rest at `start` (clamped to the field).
    ///
    /// # Arguments
    ///
    /// * `start`: Initial pose; position is clamped and heading reduced.
    /// * `chassis`: Footprint and track width. The wheel base is ignored.
    /// * `limits`: Speed and accel limits; `max_decel` is not consulted.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidDimension)` for a non-positive
    /// width, height or track width and `Err(KinematicsError::InvalidLimit)`
    /// for negative or non-finite limits.
    /// Returns `Err(KinematicsError::InvalidPose)` for a non-finite `start`.
    pub fn new(
        start: Pose,
        chassis: Chassis,
        limits: DriveLimits,
    ) -> Result<Self, KinematicsError> {
        chassis.validate_differential()?;
        limits.validate()?;
        check_pose(&start)?;
        Ok(TankDrive {
            chassis,
            limits,
            pose: clamp_pose(start, &chassis),
            wheels: TankWheels::default(),
        })
    }

    /// Drive one tick with split left/right commands.
    ///
    /// # Arguments
    ///
    /// * `left_cmd`: Left side command, clamped to `[-1, 1]`.
    /// * `right_cmd`: Right side command, clamped to `[-1, 1]`.
    /// * `collider`: Obstacle query for the collision gate.
    /// * `dt`: Elapsed time since the previous tick (s).
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidTimeDelta)` if `dt` is negative or
    /// not finite.
    pub fn tank_drive<C>(
        &mut self,
        left_cmd: f64,
        right_cmd: f64,
        collider: &C,
        dt: f64,
    ) -> Result<Pose, KinematicsError>
    where
        C: Collider + ?Sized,
    {
        check_dt(dt)?;

        let target_left = clamp_command(left_cmd) * self.limits.max_speed;
        let target_right = clamp_command(right_cmd) * self.limits.max_speed;

        let dv_max = self.limits.max_accel * dt;
        self.wheels.left = move_towards(self.wheels.left, target_left, dv_max);
        self.wheels.right = move_towards(self.wheels.right, target_right, dv_max);

        let speeds = self.chassis_speeds();
        let theta = to_rad(self.pose.heading);

        let current = Point::new(self.pose.x, self.pose.y);
        let candidate = Point::new(
            current.x + speeds.forward * sin(theta) * dt,
            current.y + speeds.forward * cos(theta) * dt,
        );

        let (width, height) = (self.chassis.width, self.chassis.height);
        let footprint = |p: Point| Rect::from_footprint(p.x, p.y, width, height);
        let resolved = resolve(current, candidate, footprint, collider);

        let heading = reduce_0_360(to_deg(theta + speeds.omega * dt));
        self.pose = clamp_pose(Pose::new(resolved.x, resolved.y, heading), &self.chassis);
        Ok(self.pose)
    }
}

impl Drivetrain for TankDrive {
    type Command = TankCommand;
    type Wheels = TankWheels;

    fn update_pose<C>(
        &mut self,
        command: TankCommand,
        collider: &C,
        dt: f64,
    ) -> Result<Pose, KinematicsError>
    where
        C: Collider + ?Sized,
    {
        self.tank_drive(command.left, command.right, collider, dt)
    }

    fn pose(&self) -> Pose {
        self.pose
    }

    fn set_pose(&mut self, pose: Pose) -> Result<(), KinematicsError> {
        check_pose(&pose)?;
        self.pose = clamp_pose(pose, &self.chassis);
        Ok(())
    }

    fn wheels(&self) -> TankWheels {
        self.wheels
    }

    fn chassis_speeds(&self) -> ChassisSpeeds {
        let v_left = ft_to_in(self.wheels.left);
        let v_right = ft_to_in(self.wheels.right);
        ChassisSpeeds {
            forward: (v_right + v_left) / 2.0,
            right: 0.0,
            omega: (v_left - v_right) / self.chassis.track_width,
        }
    }

    fn chassis(&self) -> &Chassis {
        &self.chassis
    }

    fn limits(&self) -> &DriveLimits {
        &self.limits
    }

    fn limits_mut(&mut self) -> &mut DriveLimits {
        &mut self.limits
    }
}
