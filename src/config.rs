use std::path::{Path, PathBuf};

use ::config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use anyhow::{Context, Result, ensure};
use fieldsim_kinematics::{Chassis, DriveLimits, Pose, Rect};
use serde::Deserialize;
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_VAR: &str = "FIELDSIM_CONFIG";
const ENV_PREFIX: &str = "FIELDSIM";

/// Which drivetrain the simulator drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrivetrainKind {
    Tank,
    #[default]
    Mecanum,
}

impl DrivetrainKind {
    pub fn other(self) -> Self {
        match self {
            DrivetrainKind::Tank => DrivetrainKind::Mecanum,
            DrivetrainKind::Mecanum => DrivetrainKind::Tank,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimSettings {
    #[serde(default = "default_fps")]
    pub fps: f64,
    #[serde(default)]
    pub drivetrain: DrivetrainKind,
    /// Gamepad axis magnitude below which input reads as zero.
    #[serde(default = "default_deadband")]
    pub deadband: f64,
}

impl Default for SimSettings {
    fn default() -> Self {
        SimSettings {
            fps: default_fps(),
            drivetrain: DrivetrainKind::default(),
            deadband: default_deadband(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RobotConfig {
    #[serde(default)]
    pub start: Pose,
    pub chassis: Chassis,
    pub limits: DriveLimits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(default)]
    pub image: Option<PathBuf>,
    /// Obstacle rectangles in canvas pixels.
    #[serde(default)]
    pub obstacles: Vec<Rect>,
}

/// Scripted path for the mecanum path-follow mode.
#[derive(Debug, Clone, Deserialize)]
pub struct PathConfig {
    pub total_time: f64,
    #[serde(default = "default_path_resolution")]
    pub resolution: usize,
    pub waypoints: Vec<Pose>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub sim: SimSettings,
    pub tank: RobotConfig,
    pub mecanum: RobotConfig,
    pub fields: Vec<FieldConfig>,
    #[serde(default)]
    pub path: Option<PathConfig>,
}

fn default_fps() -> f64 {
    60.0
}

fn default_deadband() -> f64 {
    0.15
}

fn default_path_resolution() -> usize {
    120
}

impl SimConfig {
    /// Checks settings the kinematics constructors do not cover.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.sim.fps.is_finite() && self.sim.fps > 0.0,
            "sim.fps must be positive, got {}",
            self.sim.fps
        );
        ensure!(
            (0.0..1.0).contains(&self.sim.deadband),
            "sim.deadband must be in [0, 1), got {}",
            self.sim.deadband
        );
        ensure!(
            !self.fields.is_empty(),
            "at least one field must be configured"
        );
        for field in &self.fields {
            for obstacle in &field.obstacles {
                ensure!(
                    obstacle.w >= 0.0 && obstacle.h >= 0.0,
                    "field '{}' has an obstacle with negative size: {}",
                    field.name,
                    obstacle
                );
            }
        }
        Ok(())
    }
}

/// Load the simulator configuration from `FIELDSIM_CONFIG` or the default
/// path, with `FIELDSIM_*` environment overrides on top.
pub fn load_config() -> Result<SimConfig> {
    let path = std::env::var_os(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    load_from(&path)
}

pub fn load_from(path: &Path) -> Result<SimConfig> {
    info!("Attempting to load configuration from {}", path.display());

    let file = File::from(path).format(FileFormat::Toml).required(true);
    let config = finish(Config::builder().add_source(file))
        .with_context(|| format!("loading {}", path.display()))?;
    info!(
        fields = config.fields.len(),
        drivetrain = ?config.sim.drivetrain,
        fps = config.sim.fps,
        "Successfully loaded configuration"
    );
    Ok(config)
}

/// Parse a TOML document directly, without environment overrides.
#[cfg(test)]
pub fn from_toml_str(toml: &str) -> Result<SimConfig> {
    let config = Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?
        .try_deserialize::<SimConfig>()?;
    config.validate()?;
    Ok(config)
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<SimConfig> {
    let config = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("reading configuration sources")?
        .try_deserialize::<SimConfig>()
        .context("deserializing configuration")?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [tank]
        chassis = { width = 14.0, height = 14.0, track_width = 14.0 }
        limits = { max_speed = 6.0, max_accel = 15.0, max_decel = 15.0 }

        [mecanum]
        start = { x = 10.0, y = -5.0 }
        chassis = { width = 14.0, height = 14.0, track_width = 14.0, wheel_base = 14.0 }
        limits = { max_speed = 6.0, max_accel = 15.0, max_decel = 20.0 }

        [[fields]]
        name = "Empty"
    "#;

    #[test]
    fn test_minimal_config_fills_defaults() {
        let config = from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.sim.fps, 60.0);
        assert_eq!(config.sim.deadband, 0.15);
        assert_eq!(config.sim.drivetrain, DrivetrainKind::Mecanum);
        assert_eq!(config.tank.start, Pose::default());
        assert_eq!(config.tank.chassis.wheel_base, 0.0);
        assert_eq!(config.mecanum.start, Pose::new(10.0, -5.0, 0.0));
        assert_eq!(config.mecanum.limits.max_decel, 20.0);
        assert_eq!(config.fields.len(), 1);
        assert!(config.fields[0].image.is_none());
        assert!(config.fields[0].obstacles.is_empty());
        assert!(config.path.is_none());
    }

    #[test]
    fn test_shipped_default_config_parses() {
        let toml = include_str!("../config/default.toml");
        let config = from_toml_str(toml).unwrap();
        assert_eq!(config.fields.len(), 3);
        assert_eq!(config.fields[0].obstacles.len(), 2);
        let first = Rect::new(195.0, 462.0, 190.0, 25.0);
        assert_eq!(config.fields[0].obstacles[0], first);
        let path = config.path.expect("default config ships a path");
        assert_eq!(path.waypoints.len(), 4);
        assert_eq!(path.resolution, 180);
    }

    #[test]
    fn test_rejects_empty_field_list() {
        let mut config = from_toml_str(MINIMAL).unwrap();
        config.fields.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at least one field"));

        let without_fields = &MINIMAL[..MINIMAL.find("[[fields]]").unwrap()];
        assert!(from_toml_str(without_fields).is_err());
    }

    #[test]
    fn test_rejects_bad_deadband() {
        let toml = format!("[sim]\ndeadband = 1.5\n{}", MINIMAL);
        assert!(from_toml_str(&toml).is_err());
    }

    #[test]
    fn test_drivetrain_kind_parses_lowercase() {
        let toml = format!("[sim]\ndrivetrain = \"tank\"\n{}", MINIMAL);
        let config = from_toml_str(&toml).unwrap();
        assert_eq!(config.sim.drivetrain, DrivetrainKind::Tank);
        assert_eq!(config.sim.drivetrain.other(), DrivetrainKind::Mecanum);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = Path::new("config/does-not-exist.toml");
        let err = load_from(path).unwrap_err();
        // one error value carrying the path, logged once by the caller
        let message = format!("{err:#}");
        assert!(message.contains("loading config/does-not-exist.toml"));
    }
}
