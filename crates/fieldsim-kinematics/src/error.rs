//! Error types for the kinematics library.
//!
//! Everything here is raised at construction time or on a malformed call;
//! a well-formed update step never fails.

use core::fmt;

/// Errors that can occur while building or stepping a drivetrain model.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// A chassis dimension (width, height, track width or wheel base) was not
    /// a positive, finite number of inches.
    InvalidDimension(&'static str),
    /// A drive limit was negative or not finite.
    InvalidLimit(&'static str),
    /// The time delta passed to an update was negative, NaN or infinite.
    InvalidTimeDelta(&'static str),
    /// A pose handed to a drivetrain had a NaN or infinite component.
    InvalidPose(&'static str),
    /// A trajectory was built with a negative or non-finite duration.
    InvalidTrajectoryTime(&'static str),
    /// A drive command was fed to a drivetrain of the other variant.
    CommandMismatch {
        /// Variant of the drivetrain receiving the command.
        drive: &'static str,
        /// Variant the command was built for.
        command: &'static str,
    },
}

impl fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KinematicsError::InvalidDimension(msg) => {
                write!(f, "Invalid chassis dimension: {}", msg)
            }
            KinematicsError::InvalidLimit(msg) => write!(f, "Invalid drive limit: {}", msg),
            KinematicsError::InvalidTimeDelta(msg) => write!(f, "Invalid time delta: {}", msg),
            KinematicsError::InvalidPose(msg) => write!(f, "Invalid pose: {}", msg),
            KinematicsError::InvalidTrajectoryTime(msg) => {
                write!(f, "Invalid trajectory time: {}", msg)
            }
            KinematicsError::CommandMismatch { drive, command } => {
                write!(f, "Cannot feed a {command} command to a {drive} drivetrain")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for KinematicsError {}
