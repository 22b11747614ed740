use anyhow::{Context, Result};
use fieldsim_kinematics::{
    DriveCommand, Drivetrain, MecanumDrive, PathFollower, Pose, Robot, TankDrive, Trajectory,
};
use tracing::{debug, info, warn};

use crate::config::{DrivetrainKind, SimConfig};
use crate::field::{Field, FieldSet};
use crate::input::{self, Debouncer, InputSnapshot, MenuAction};

/// Step applied to `max_accel` by one menu press (ft/s²).
const ACCEL_STEP: f64 = 1.0;

/// Lets a tick through only once a full frame interval has elapsed.
#[derive(Debug, Clone)]
pub struct FrameGate {
    interval: f64,
    last_frame: f64,
}

impl FrameGate {
    pub fn new(fps: f64) -> Self {
        FrameGate {
            interval: 1.0 / fps,
            last_frame: 0.0,
        }
    }

    /// Returns the elapsed time (s) to integrate over when a tick is due.
    pub fn poll(&mut self, now: f64) -> Option<f64> {
        let elapsed = now - self.last_frame;
        if elapsed >= self.interval {
            self.last_frame = now;
            Some(elapsed)
        } else {
            None
        }
    }
}

/// Driving from input, or replaying the scripted path.
#[derive(Debug, Clone)]
pub enum Mode {
    Manual,
    PathFollow {
        follower: PathFollower,
        reported_done: bool,
    },
}

pub struct Simulator {
    tank: Robot,
    mecanum: Robot,
    active: DrivetrainKind,
    fields: FieldSet,
    path: Option<Trajectory>,
    mode: Mode,
    debouncer: Debouncer,
    deadzone: f64,
    show_telemetry: bool,
}

impl Simulator {
    pub fn from_config(config: &SimConfig) -> Result<Self> {
        let tank = &config.tank;
        let tank = TankDrive::new(tank.start, tank.chassis, tank.limits)
            .context("invalid tank robot configuration")?;
        let mecanum = &config.mecanum;
        let mecanum = MecanumDrive::new(mecanum.start, mecanum.chassis, mecanum.limits)
            .context("invalid mecanum robot configuration")?;
        let fields = config.fields.iter().map(Field::from).collect();
        let fields = FieldSet::new(fields)?;
        let path = config
            .path
            .as_ref()
            .map(|p| Trajectory::linear(&p.waypoints, p.total_time, p.resolution))
            .transpose()
            .context("invalid path configuration")?;

        info!(
            tank = %tank.chassis(),
            mecanum = %mecanum.chassis(),
            active = ?config.sim.drivetrain,
            field = fields.current().name(),
            path_samples = path.as_ref().map_or(0, Trajectory::len),
            "Simulator ready"
        );

        Ok(Simulator {
            tank: tank.into(),
            mecanum: mecanum.into(),
            active: config.sim.drivetrain,
            fields,
            path,
            mode: Mode::Manual,
            debouncer: Debouncer::default(),
            deadzone: config.sim.deadband,
            show_telemetry: true,
        })
    }

    /// Run one simulation tick: menu input first, then motion.
    pub fn tick(&mut self, snapshot: &InputSnapshot, dt: f64) -> Result<Pose> {
        for action in input::menu_actions(&mut self.debouncer, snapshot) {
            self.apply(action);
        }

        let field = self.fields.current();
        let pose = match (&mut self.mode, self.active) {
            (
                Mode::PathFollow {
                    follower,
                    reported_done,
                },
                DrivetrainKind::Mecanum,
            ) => Self::replay(&mut self.mecanum, follower, reported_done, dt)?,
            (_, DrivetrainKind::Mecanum) => {
                let command = input::mecanum_command(snapshot, self.deadzone);
                let command = DriveCommand::Mecanum(command);
                self.mecanum.update_pose(command, field, dt)?
            }
            (_, DrivetrainKind::Tank) => {
                let command = input::tank_command(snapshot, self.deadzone);
                let command = DriveCommand::Tank(command);
                self.tank.update_pose(command, field, dt)?
            }
        };
        let drivetrain = self.robot().kind();
        debug!(%pose, dt, drivetrain, "Tick");
        Ok(pose)
    }

    fn replay(
        robot: &mut Robot,
        follower: &mut PathFollower,
        reported_done: &mut bool,
        dt: f64,
    ) -> Result<Pose> {
        let Robot::Mecanum(mecanum) = robot else {
            return Ok(robot.pose());
        };
        let pose = match mecanum.path_follow(follower, dt)? {
            Some(pose) => pose,
            None => mecanum.pose(),
        };
        if follower.is_finished() && !*reported_done {
            info!(elapsed = follower.elapsed(), "Path complete");
            *reported_done = true;
        }
        Ok(pose)
    }

    fn apply(&mut self, action: MenuAction) {
        match action {
            MenuAction::DecreaseAccel | MenuAction::IncreaseAccel => {
                let delta = if action == MenuAction::IncreaseAccel {
                    ACCEL_STEP
                } else {
                    -ACCEL_STEP
                };
                let accel = self.robot_mut().limits_mut().adjust_max_accel(delta);
                let drivetrain = self.robot().kind();
                info!(max_accel = accel, drivetrain, "Max accel changed");
            }
            MenuAction::ToggleTelemetry => {
                self.show_telemetry = !self.show_telemetry;
                info!(visible = self.show_telemetry, "Telemetry toggled");
            }
            MenuAction::NextField => {
                self.fields.cycle();
            }
            MenuAction::SwitchDrivetrain => {
                self.active = self.active.other();
                self.mode = Mode::Manual;
                info!(drivetrain = ?self.active, "Drivetrain switched");
            }
            MenuAction::TogglePathFollow => self.toggle_path_follow(),
        }
    }

    fn toggle_path_follow(&mut self) {
        if matches!(self.mode, Mode::PathFollow { .. }) {
            self.mode = Mode::Manual;
            info!("Path follow stopped");
            return;
        }
        if self.active != DrivetrainKind::Mecanum {
            warn!("Path follow is only available on the mecanum drive");
            return;
        }
        match &self.path {
            Some(trajectory) => {
                let (samples, total_time) = (trajectory.len(), trajectory.total_time());
                info!(samples, total_time, "Path follow started");
                self.mode = Mode::PathFollow {
                    follower: PathFollower::new(trajectory.clone()),
                    reported_done: false,
                };
            }
            None => warn!("No path configured"),
        }
    }

    pub fn robot(&self) -> &Robot {
        match self.active {
            DrivetrainKind::Tank => &self.tank,
            DrivetrainKind::Mecanum => &self.mecanum,
        }
    }

    fn robot_mut(&mut self) -> &mut Robot {
        match self.active {
            DrivetrainKind::Tank => &mut self.tank,
            DrivetrainKind::Mecanum => &mut self.mecanum,
        }
    }

    pub fn active(&self) -> DrivetrainKind {
        self.active
    }

    pub fn field(&self) -> &Field {
        self.fields.current()
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn show_telemetry(&self) -> bool {
        self.show_telemetry
    }
}
