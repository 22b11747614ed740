//! Four-wheel mecanum drive: forward, strafe and turn through a fixed mixing
//! matrix.

use core::fmt;
use libm::{cos, sin};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::collision::{Collider, Point, Rect, clamp_pose, resolve};
use crate::trajectory::PathFollower;
use crate::units::{ft_to_in, reduce_0_360, to_deg, to_rad};
use crate::{
    Chassis, ChassisSpeeds, DriveLimits, Drivetrain, KinematicsError, Pose, check_dt, check_pose,
    clamp_command, move_towards,
};

/// Normalized per-wheel commands, each in `[-1, 1]` (clamped on use).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MecanumCommand {
    /// Front-left command.
    pub front_left: f64,
    /// Front-right command.
    pub front_right: f64,
    /// Rear-left command.
    pub rear_left: f64,
    /// Rear-right command.
    pub rear_right: f64,
}

impl MecanumCommand {
    /// Construct a command.
    ///
    /// # Arguments
    ///
    /// * `front_left`: Front-left wheel command in `[-1, 1]`.
    /// * `front_right`: Front-right wheel command in `[-1, 1]`.
    /// * `rear_left`: Rear-left wheel command in `[-1, 1]`.
    /// * `rear_right`: Rear-right wheel command in `[-1, 1]`.
    pub const fn new(front_left: f64, front_right: f64, rear_left: f64, rear_right: f64) -> Self {
        MecanumCommand {
            front_left,
            front_right,
            rear_left,
            rear_right,
        }
    }

    /// Mix robot-frame intents into wheel commands.
    ///
    /// The result is the inverse of the model's mixing matrix, unnormalized.
    ///
    /// # Arguments
    ///
    /// * `forward`: Drive along the heading.
    /// * `right`: Strafe to the robot's right.
    /// * `turn`: Grow the heading.
    pub fn mix(forward: f64, right: f64, turn: f64) -> Self {
        MecanumCommand {
            front_left: forward - right - turn,
            front_right: forward + right + turn,
            rear_left: forward + right - turn,
            rear_right: forward - right + turn,
        }
    }
}

/// Wheel velocities (ft/s).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MecanumWheels {
    /// Front-left (ft/s).
    pub front_left: f64,
    /// Front-right (ft/s).
    pub front_right: f64,
    /// Rear-left (ft/s).
    pub rear_left: f64,
    /// Rear-right (ft/s).
    pub rear_right: f64,
}

impl fmt::Display for MecanumWheels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(FL: {:.2}, FR: {:.2}, RL: {:.2}, RR: {:.2} ft/s)",
            self.front_left, self.front_right, self.rear_left, self.rear_right
        )
    }
}

/// Mecanum drive model.
///
/// Each wheel is rate limited by `max_accel` while its speed magnitude grows
/// and by `max_decel` otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct MecanumDrive {
    chassis: Chassis,
    limits: DriveLimits,
    pose: Pose,
    wheels: MecanumWheels,
}

impl MecanumDrive {
    /// Build a mecanum drive at rest at `start` (clamped to the field).
    ///
    /// # Arguments
    ///
    /// * `start`: Initial pose; position is clamped and heading reduced.
    /// * `chassis`: Footprint and wheel layout. Every dimension is used.
    /// * `limits`: Speed and rate limits shared by all four wheels.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidDimension)` unless every chassis
    /// dimension is positive, which also keeps the turn-rate divisor
    /// `wheel_base/2 + track_width/2` away from zero.
    /// Returns `Err(KinematicsError::InvalidLimit)` for negative or
    /// non-finite limits.
    /// Returns `Err(KinematicsError::InvalidPose)` for a non-finite `start`.
    pub fn new(
        start: Pose,
        chassis: Chassis,
        limits: DriveLimits,
    ) -> Result<Self, KinematicsError> {
        chassis.validate()?;
        limits.validate()?;
        check_pose(&start)?;
        Ok(MecanumDrive {
            chassis,
            limits,
            pose: clamp_pose(start, &chassis),
            wheels: MecanumWheels::default(),
        })
    }

    /// Drive one tick with per-wheel commands.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidTimeDelta)` if `dt` is negative or
    /// not finite.
    pub fn mecanum_drive<C>(
        &mut self,
        command: MecanumCommand,
        collider: &C,
        dt: f64,
    ) -> Result<Pose, KinematicsError>
    where
        C: Collider + ?Sized,
    {
        check_dt(dt)?;

        let limits = self.limits;
        let track = |current: f64, cmd: f64| {
            let target = clamp_command(cmd) * limits.max_speed;
            let step = limits.directional_step(current, target, dt);
            move_towards(current, target, step)
        };

        self.wheels = MecanumWheels {
            front_left: track(self.wheels.front_left, command.front_left),
            front_right: track(self.wheels.front_right, command.front_right),
            rear_left: track(self.wheels.rear_left, command.rear_left),
            rear_right: track(self.wheels.rear_right, command.rear_right),
        };

        let speeds = self.chassis_speeds();
        let theta = to_rad(self.pose.heading);

        // robot frame -> field frame
        let (forward_x, forward_y) = (sin(theta), cos(theta));
        let (right_x, right_y) = (cos(theta), -sin(theta));
        let vx = speeds.forward * forward_x + speeds.right * right_x;
        let vy = speeds.forward * forward_y + speeds.right * right_y;

        let current = Point::new(self.pose.x, self.pose.y);
        let candidate = Point::new(current.x + vx * dt, current.y + vy * dt);

        let (width, height) = (self.chassis.width, self.chassis.height);
        let footprint = |p: Point| Rect::from_footprint(p.x, p.y, width, height);
        let resolved = resolve(current, candidate, footprint, collider);

        let heading = reduce_0_360(to_deg(theta + speeds.omega * dt));
        self.pose = clamp_pose(Pose::new(resolved.x, resolved.y, heading), &self.chassis);
        Ok(self.pose)
    }

    /// Replay a scripted path: advance `follower` by `dt` and snap the pose to
    /// its current sample.
    ///
    /// Wheel state, drive limits and obstacles are all bypassed. Returns
    /// `Ok(None)` and leaves the pose alone when the trajectory is empty.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidTimeDelta)` if `dt` is negative or
    /// not finite.
    pub fn path_follow(
        &mut self,
        follower: &mut PathFollower,
        dt: f64,
    ) -> Result<Option<Pose>, KinematicsError> {
        check_dt(dt)?;
        let Some(snap) = follower.advance(dt) else {
            return Ok(None);
        };
        self.pose = clamp_pose(snap, &self.chassis);
        Ok(Some(self.pose))
    }
}

impl Drivetrain for MecanumDrive {
    type Command = MecanumCommand;
    type Wheels = MecanumWheels;

    fn update_pose<C>(
        &mut self,
        command: MecanumCommand,
        collider: &C,
        dt: f64,
    ) -> Result<Pose, KinematicsError>
    where
        C: Collider + ?Sized,
    {
        self.mecanum_drive(command, collider, dt)
    }

    fn pose(&self) -> Pose {
        self.pose
    }

    fn set_pose(&mut self, pose: Pose) -> Result<(), KinematicsError> {
        check_pose(&pose)?;
        self.pose = clamp_pose(pose, &self.chassis);
        Ok(())
    }

    fn wheels(&self) -> MecanumWheels {
        self.wheels
    }

    fn chassis_speeds(&self) -> ChassisSpeeds {
        let fl = ft_to_in(self.wheels.front_left);
        let fr = ft_to_in(self.wheels.front_right);
        let rl = ft_to_in(self.wheels.rear_left);
        let rr = ft_to_in(self.wheels.rear_right);

        let r = self.chassis.wheel_base / 2.0 + self.chassis.track_width / 2.0;
        ChassisSpeeds {
            forward: (fl + fr + rl + rr) / 4.0,
            right: (-fl + fr + rl - rr) / 4.0,
            omega: (-fl + fr - rl + rr) / (4.0 * r),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OpenField, Trajectory};

    const EPSILON: f64 = 1e-9;
    const CHASSIS: Chassis = Chassis::new(14.0, 14.0, 14.0, 14.0);
    const LIMITS: DriveLimits = DriveLimits::new(6.0, 15.0, 15.0);
    const FULL_FORWARD: MecanumCommand = MecanumCommand::new(1.0, 1.0, 1.0, 1.0);

    fn robot() -> MecanumDrive {
        MecanumDrive::new(Pose::default(), CHASSIS, LIMITS).unwrap()
    }

    fn drive(mecanum: &mut MecanumDrive, command: MecanumCommand, dt: f64) -> Pose {
        mecanum.mecanum_drive(command, &OpenField, dt).unwrap()
    }

    fn follower(samples: Vec<Pose>, total_time: f64) -> PathFollower {
        let trajectory = Trajectory::new(samples, total_time).unwrap();
        PathFollower::new(trajectory)
    }

    #[test]
    fn test_constructor_rejects_zero_wheel_base() {
        let chassis = Chassis::new(14.0, 14.0, 14.0, 0.0);
        let result = MecanumDrive::new(Pose::default(), chassis, LIMITS);
        assert_eq!(
            result.unwrap_err(),
            KinematicsError::InvalidDimension("wheel base must be positive")
        );
    }

    #[test]
    fn test_constructor_rejects_non_finite_start() {
        let start = Pose::new(0.0, f64::NAN, 0.0);
        let result = MecanumDrive::new(start, CHASSIS, LIMITS);
        assert!(matches!(result, Err(KinematicsError::InvalidPose(_))));
    }

    #[test]
    fn test_strafe_only_is_pure_lateral() {
        let mut mecanum = robot();
        let strafe = MecanumCommand::new(1.0, -1.0, -1.0, 1.0);
        let pose = drive(&mut mecanum, strafe, 0.1);
        let speeds = mecanum.chassis_speeds();
        assert!(speeds.forward.abs() < EPSILON);
        assert!(speeds.omega.abs() < EPSILON);
        assert!(speeds.right < 0.0);
        // 1.5 ft/s after one rate-limited step, to the robot's left
        assert!((speeds.right + 18.0).abs() < EPSILON);
        assert!((pose.x + 1.8).abs() < EPSILON);
        assert!(pose.y.abs() < EPSILON);
        assert!(pose.heading.abs() < EPSILON);
    }

    #[test]
    fn test_forward_at_heading_zero() {
        let mut mecanum = robot();
        let pose = drive(&mut mecanum, FULL_FORWARD, 1.0);
        assert!((pose.y - 65.0).abs() < EPSILON);
        assert!(pose.x.abs() < EPSILON);
    }

    #[test]
    fn test_strafe_right_rotates_with_heading() {
        let mut mecanum = robot();
        mecanum.set_pose(Pose::new(0.0, 0.0, 90.0)).unwrap();
        // strafing right while facing +x moves toward -y
        let strafe = MecanumCommand::mix(0.0, 1.0, 0.0);
        let pose = drive(&mut mecanum, strafe, 0.1);
        assert!((pose.y + 1.8).abs() < EPSILON);
        assert!(pose.x.abs() < EPSILON);
    }

    #[test]
    fn test_turn_rate_uses_half_base_plus_half_track() {
        let mut mecanum = robot();
        let turn = MecanumCommand::mix(0.0, 0.0, 0.5);
        drive(&mut mecanum, turn, 1.0);
        // each wheel at 3 ft/s = 36 in/s, r = 14 in
        let speeds = mecanum.chassis_speeds();
        assert!((speeds.omega - 144.0 / 56.0).abs() < EPSILON);
        assert!(speeds.forward.abs() < EPSILON);
        assert!(speeds.right.abs() < EPSILON);
        let expected = (144.0_f64 / 56.0).to_degrees();
        assert!((mecanum.pose().heading - expected).abs() < 1e-6);
    }

    #[test]
    fn test_mix_inverts_model() {
        let mut mecanum = robot();
        let mixed = MecanumCommand::mix(0.25, -0.125, 0.0625);
        drive(&mut mecanum, mixed, 1.0);
        let speeds = mecanum.chassis_speeds();
        // 6 ft/s full scale = 72 in/s
        assert!((speeds.forward - 18.0).abs() < EPSILON);
        assert!((speeds.right + 9.0).abs() < EPSILON);
        assert!((speeds.omega - 4.5 / 14.0).abs() < EPSILON);
    }

    #[test]
    fn test_accel_and_decel_rates_differ() {
        let limits = DriveLimits::new(6.0, 10.0, 40.0);
        let mut mecanum = MecanumDrive::new(Pose::default(), CHASSIS, limits).unwrap();
        drive(&mut mecanum, FULL_FORWARD, 0.5);
        assert!((mecanum.wheels().front_left - 5.0).abs() < EPSILON);
        drive(&mut mecanum, MecanumCommand::default(), 0.1);
        assert!((mecanum.wheels().front_left - 1.0).abs() < EPSILON);
        assert!((mecanum.wheels().rear_right - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_zero_command_converges_and_stops() {
        let mut mecanum = robot();
        let stop = MecanumCommand::default();
        let moving = MecanumCommand::mix(0.5, 0.3, 0.2);
        drive(&mut mecanum, moving, 0.5);
        for _ in 0..20 {
            drive(&mut mecanum, stop, 0.25);
        }
        assert_eq!(mecanum.wheels(), MecanumWheels::default());
        let rest = mecanum.pose();
        assert_eq!(drive(&mut mecanum, stop, 0.25), rest);
    }

    #[test]
    fn test_blocked_axis_keeps_prior_value() {
        let mut mecanum = robot();
        // diagonal: forward and strafe right at heading 0
        let diagonal = MecanumCommand::mix(0.5, 0.5, 0.0);
        drive(&mut mecanum, diagonal, 1.0);
        let before = mecanum.pose();
        // wall just above the chassis across the whole field
        let top = Rect::from_footprint(before.x, before.y, 14.0, 14.0).y;
        let wall = [Rect::new(0.0, 0.0, 576.0, top - 1.0)];
        let after = mecanum.mecanum_drive(diagonal, &wall[..], 0.1).unwrap();
        assert_eq!(after.y, before.y);
        assert!(after.x > before.x);
    }

    #[test]
    fn test_non_finite_dt_leaves_state_alone() {
        let mut mecanum = robot();
        drive(&mut mecanum, FULL_FORWARD, 0.1);
        let pose = mecanum.pose();
        let wheels = mecanum.wheels();
        for dt in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN, -0.1] {
            let result = mecanum.mecanum_drive(FULL_FORWARD, &OpenField, dt);
            assert!(matches!(result, Err(KinematicsError::InvalidTimeDelta(_))));
            assert_eq!(mecanum.pose(), pose);
            assert_eq!(mecanum.wheels(), wheels);
        }
        let mut path = follower(vec![Pose::new(10.0, 10.0, 0.0)], 1.0);
        assert!(mecanum.path_follow(&mut path, f64::INFINITY).is_err());
        assert_eq!(mecanum.pose(), pose);
    }

    #[test]
    fn test_set_pose_rejects_non_finite() {
        let mut mecanum = robot();
        mecanum.set_pose(Pose::new(5.0, 5.0, 10.0)).unwrap();
        let bad = [
            Pose::new(f64::NAN, 0.0, 0.0),
            Pose::new(0.0, f64::INFINITY, 0.0),
            Pose::new(0.0, 0.0, f64::NAN),
        ];
        for pose in bad {
            let result = mecanum.set_pose(pose);
            assert!(matches!(result, Err(KinematicsError::InvalidPose(_))));
            assert_eq!(mecanum.pose(), Pose::new(5.0, 5.0, 10.0));
        }
    }

    #[test]
    fn test_path_follow_snaps_to_samples() {
        let mut mecanum = robot();
        let samples = vec![
            Pose::new(0.0, 0.0, 0.0),
            Pose::new(10.0, 0.0, 90.0),
            Pose::new(20.0, 0.0, 180.0),
        ];
        let mut path = follower(samples, 2.0);
        // 0.5 / 2.0 * 2 = 0.5 -> index 0
        let first = mecanum.path_follow(&mut path, 0.5).unwrap();
        assert_eq!(first, Some(Pose::new(0.0, 0.0, 0.0)));
        // 1.0 / 2.0 * 2 = 1.0 -> index 1
        let second = mecanum.path_follow(&mut path, 0.5).unwrap();
        assert_eq!(second, Some(Pose::new(10.0, 0.0, 90.0)));
        // elapsed clamps at total time
        let last = mecanum.path_follow(&mut path, 5.0).unwrap();
        assert_eq!(last, Some(Pose::new(20.0, 0.0, 180.0)));
        assert_eq!(mecanum.pose(), Pose::new(20.0, 0.0, 180.0));
        // wheel state untouched
        assert_eq!(mecanum.wheels(), MecanumWheels::default());
    }

    #[test]
    fn test_path_follow_ignores_obstacles_but_clamps() {
        let mut mecanum = robot();
        let mut path = follower(vec![Pose::new(90.0, -90.0, 400.0)], 1.0);
        let pose = mecanum.path_follow(&mut path, 0.1).unwrap().unwrap();
        assert_eq!(pose, Pose::new(65.0, -65.0, 40.0));
    }

    #[test]
    fn test_path_follow_empty_is_noop() {
        let mut mecanum = robot();
        mecanum.set_pose(Pose::new(5.0, 5.0, 10.0)).unwrap();
        let mut path = follower(Vec::new(), 1.0);
        assert_eq!(mecanum.path_follow(&mut path, 0.1).unwrap(), None);
        assert_eq!(mecanum.pose(), Pose::new(5.0, 5.0, 10.0));
    }
}
