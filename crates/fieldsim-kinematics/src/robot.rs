//! Tagged wrapper so callers can hold either drivetrain and drive it with a
//! matching command.

use crate::collision::Collider;
use crate::mecanum::{MecanumCommand, MecanumDrive, MecanumWheels};
use crate::tank::{TankCommand, TankDrive, TankWheels};
use crate::{Chassis, ChassisSpeeds, DriveLimits, Drivetrain, KinematicsError, Pose};

/// A robot of either drivetrain variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Robot {
    /// Differential drive.
    Tank(TankDrive),
    /// Mecanum drive.
    Mecanum(MecanumDrive),
}

/// A command for either drivetrain variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriveCommand {
    /// Left/right command for a tank drive.
    Tank(TankCommand),
    /// Per-wheel command for a mecanum drive.
    Mecanum(MecanumCommand),
}

/// Wheel state of either drivetrain variant, for telemetry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelTelemetry {
    /// Tank wheel velocities.
    Tank(TankWheels),
    /// Mecanum wheel velocities.
    Mecanum(MecanumWheels),
}

impl DriveCommand {
    /// Variant name.
    pub fn kind(&self) -> &'static str {
        match self {
            DriveCommand::Tank(_) => "tank",
            DriveCommand::Mecanum(_) => "mecanum",
        }
    }
}

impl Robot {
    /// Variant name.
    pub fn kind(&self) -> &'static str {
        match self {
            Robot::Tank(_) => "tank",
            Robot::Mecanum(_) => "mecanum",
        }
    }

    /// Advance one tick.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::CommandMismatch)` if `command` is for the
    /// other variant, or any error of the underlying model.
    pub fn update_pose<C>(
        &mut self,
        command: DriveCommand,
        collider: &C,
        dt: f64,
    ) -> Result<Pose, KinematicsError>
    where
        C: Collider + ?Sized,
    {
        match (self, command) {
            (Robot::Tank(tank), DriveCommand::Tank(cmd)) => tank.update_pose(cmd, collider, dt),
            (Robot::Mecanum(mecanum), DriveCommand::Mecanum(cmd)) => {
                mecanum.update_pose(cmd, collider, dt)
            }
            (robot, command) => Err(KinematicsError::CommandMismatch {
                drive: robot.kind(),
                command: command.kind(),
            }),
        }
    }

    /// Current pose.
    pub fn pose(&self) -> Pose {
        match self {
            Robot::Tank(tank) => tank.pose(),
            Robot::Mecanum(mecanum) => mecanum.pose(),
        }
    }

    /// Place the robot directly, clamped to the field.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidPose)` if `pose` is not finite.
    pub fn set_pose(&mut self, pose: Pose) -> Result<(), KinematicsError> {
        match self {
            Robot::Tank(tank) => tank.set_pose(pose),
            Robot::Mecanum(mecanum) => mecanum.set_pose(pose),
        }
    }

    /// Wheel velocities (ft/s).
    pub fn wheels(&self) -> WheelTelemetry {
        match self {
            Robot::Tank(tank) => WheelTelemetry::Tank(tank.wheels()),
            Robot::Mecanum(mecanum) => WheelTelemetry::Mecanum(mecanum.wheels()),
        }
    }

    /// Robot-frame velocities.
    pub fn chassis_speeds(&self) -> ChassisSpeeds {
        match self {
            Robot::Tank(tank) => tank.chassis_speeds(),
            Robot::Mecanum(mecanum) => mecanum.chassis_speeds(),
        }
    }

    /// Chassis geometry.
    pub fn chassis(&self) -> &Chassis {
        match self {
            Robot::Tank(tank) => tank.chassis(),
            Robot::Mecanum(mecanum) => mecanum.chassis(),
        }
    }

    /// Drive limits.
    pub fn limits(&self) -> &DriveLimits {
        match self {
            Robot::Tank(tank) => tank.limits(),
            Robot::Mecanum(mecanum) => mecanum.limits(),
        }
    }

    /// Drive limits, for runtime tuning.
    pub fn limits_mut(&mut self) -> &mut DriveLimits {
        match self {
            Robot::Tank(tank) => tank.limits_mut(),
            Robot::Mecanum(mecanum) => mecanum.limits_mut(),
        }
    }
}

impl From<TankDrive> for Robot {
    fn from(tank: TankDrive) -> Self {
        Robot::Tank(tank)
    }
}

impl From<MecanumDrive> for Robot {
    fn from(mecanum: MecanumDrive) -> Self {
        Robot::Mecanum(mecanum)
    }
}
