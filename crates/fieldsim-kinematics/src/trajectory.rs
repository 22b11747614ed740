//! Scripted paths replayed by snapping the pose, independent of the velocity
//! model.

use alloc::vec::Vec;
use libm::{floor, fmax, fmin};

use crate::units::reduce_0_360;
use crate::{KinematicsError, Pose, check_pose};

/// Evenly timed pose samples spanning `total_time` seconds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectory {
    samples: Vec<Pose>,
    total_time: f64,
}

impl Trajectory {
    /// Wrap pre-computed samples.
    ///
    /// # Arguments
    ///
    /// * `samples`: Poses in replay order, evenly spaced in time.
    /// * `total_time`: Seconds from the first sample to the last.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidTrajectoryTime)` if `total_time`
    /// is negative or not finite, and `Err(KinematicsError::InvalidPose)` if
    /// any sample has a non-finite component.
    pub fn new(samples: Vec<Pose>, total_time: f64) -> Result<Self, KinematicsError> {
        if !total_time.is_finite() || total_time < 0.0 {
            return Err(KinematicsError::InvalidTrajectoryTime(
                "must be finite and non-negative",
            ));
        }
        samples.iter().try_for_each(check_pose)?;
        Ok(Trajectory {
            samples,
            total_time,
        })
    }

    /// Sample a polyline through `waypoints` at `resolution` evenly spaced
    /// points, each segment taking the same share of `total_time`.
    ///
    /// Headings are interpolated along the shorter arc. `resolution` is raised
    /// to the waypoint count so every waypoint appears as a sample.
    ///
    /// # Arguments
    ///
    /// * `waypoints`: Poses the path passes through, in order.
    /// * `total_time`: Duration of the whole path (s).
    /// * `resolution`: Number of samples to generate.
    ///
    /// # Errors
    ///
    /// Same as [`Trajectory::new`].
    pub fn linear(
        waypoints: &[Pose],
        total_time: f64,
        resolution: usize,
    ) -> Result<Self, KinematicsError> {
        let samples = match waypoints {
            [] => Vec::new(),
            [only] => alloc::vec![*only],
            _ => {
                let count = resolution.max(waypoints.len());
                let segments = (waypoints.len() - 1) as f64;
                (0..count)
                    .map(|i| {
                        let s = i as f64 / (count - 1) as f64 * segments;
                        let seg = (floor(s) as usize).min(waypoints.len() - 2);
                        lerp_pose(waypoints[seg], waypoints[seg + 1], s - seg as f64)
                    })
                    .collect()
            }
        };
        Self::new(samples, total_time)
    }

    /// Samples in replay order.
    pub fn samples(&self) -> &[Pose] {
        &self.samples
    }

    /// Duration of the whole path (s).
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// `true` if there is nothing to replay.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample at `elapsed` seconds: index `floor(elapsed / total_time * (N - 1))`
    /// with `elapsed` capped at `total_time`. A zero-length path always
    /// yields its last sample.
    pub fn sample_at(&self, elapsed: f64) -> Option<Pose> {
        let last = self.samples.len().checked_sub(1)?;
        let normalized = if self.total_time > 0.0 {
            fmax(fmin(elapsed, self.total_time), 0.0) / self.total_time
        } else {
            1.0
        };
        let idx = (floor(normalized * last as f64) as usize).min(last);
        Some(self.samples[idx])
    }
}

fn lerp_pose(a: Pose, b: Pose, t: f64) -> Pose {
    let mut sweep = reduce_0_360(b.heading - a.heading);
    if sweep > 180.0 {
        sweep -= 360.0;
    }
    Pose {
        x: a.x + (b.x - a.x) * t,
        y: a.y + (b.y - a.y) * t,
        heading: reduce_0_360(a.heading + sweep * t),
    }
}

/// Replay cursor over a [`Trajectory`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathFollower {
    trajectory: Trajectory,
    elapsed: f64,
}

impl PathFollower {
    /// Start at the beginning of `trajectory`.
    ///
    /// # Arguments
    ///
    /// * `trajectory`: The samples to replay.
    pub fn new(trajectory: Trajectory) -> Self {
        PathFollower {
            trajectory,
            elapsed: 0.0,
        }
    }

    /// Advance the path clock by `dt` and return the snapped sample, or
    /// `None` for an empty trajectory (the clock does not move).
    pub fn advance(&mut self, dt: f64) -> Option<Pose> {
        if self.trajectory.is_empty() {
            return None;
        }
        self.elapsed += dt;
        if self.elapsed > self.trajectory.total_time() {
            self.elapsed = self.trajectory.total_time();
        }
        self.trajectory.sample_at(self.elapsed)
    }

    /// Path time consumed so far (s).
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// `true` once the clock has reached the end of the path.
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.trajectory.total_time()
    }

    /// Rewind to the start.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    /// The trajectory being replayed.
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_rejects_bad_total_time() {
        assert!(matches!(
            Trajectory::new(vec![Pose::default()], -1.0),
            Err(KinematicsError::InvalidTrajectoryTime(_))
        ));
        for total_time in [f64::NAN, f64::INFINITY] {
            assert!(Trajectory::new(vec![Pose::default()], total_time).is_err());
        }
    }

    #[test]
    fn test_rejects_non_finite_samples() {
        let samples = vec![Pose::default(), Pose::new(1.0, f64::NAN, 0.0)];
        assert!(matches!(
            Trajectory::new(samples, 1.0),
            Err(KinematicsError::InvalidPose(_))
        ));
        let waypoints = [Pose::default(), Pose::new(f64::INFINITY, 0.0, 0.0)];
        assert!(Trajectory::linear(&waypoints, 1.0, 4).is_err());
    }

    #[test]
    fn test_sample_index_floor() {
        let samples: Vec<Pose> = (0..5).map(|i| Pose::new(i as f64, 0.0, 0.0)).collect();
        let trajectory = Trajectory::new(samples, 4.0).unwrap();
        assert_eq!(trajectory.sample_at(0.0).unwrap().x, 0.0);
        assert_eq!(trajectory.sample_at(0.99).unwrap().x, 0.0);
        assert_eq!(trajectory.sample_at(1.0).unwrap().x, 1.0);
        assert_eq!(trajectory.sample_at(3.5).unwrap().x, 3.0);
        assert_eq!(trajectory.sample_at(4.0).unwrap().x, 4.0);
        assert_eq!(trajectory.sample_at(10.0).unwrap().x, 4.0);
    }

    #[test]
    fn test_zero_duration_snaps_to_end() {
        let samples = vec![Pose::new(1.0, 0.0, 0.0), Pose::new(2.0, 0.0, 0.0)];
        let trajectory = Trajectory::new(samples, 0.0).unwrap();
        assert_eq!(trajectory.sample_at(0.0), Some(Pose::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_empty_trajectory() {
        let mut follower = PathFollower::new(Trajectory::default());
        assert_eq!(follower.advance(1.0), None);
        assert_eq!(follower.elapsed(), 0.0);
    }

    #[test]
    fn test_follower_clock_clamps() {
        let samples = vec![Pose::new(0.0, 0.0, 0.0), Pose::new(1.0, 0.0, 0.0)];
        let trajectory = Trajectory::new(samples, 1.0).unwrap();
        let mut follower = PathFollower::new(trajectory);
        follower.advance(0.4);
        assert!(!follower.is_finished());
        follower.advance(3.0);
        assert_eq!(follower.elapsed(), 1.0);
        assert!(follower.is_finished());
        follower.reset();
        assert_eq!(follower.elapsed(), 0.0);
    }

    #[test]
    fn test_linear_hits_every_waypoint() {
        let waypoints = [
            Pose::new(0.0, 0.0, 0.0),
            Pose::new(10.0, 0.0, 90.0),
            Pose::new(10.0, 20.0, 90.0),
        ];
        let trajectory = Trajectory::linear(&waypoints, 3.0, 5).unwrap();
        assert_eq!(trajectory.len(), 5);
        let s = trajectory.samples();
        assert_eq!(s[0], waypoints[0]);
        assert_eq!(s[2], waypoints[1]);
        assert_eq!(s[4], waypoints[2]);
        assert!((s[1].x - 5.0).abs() < EPSILON);
        assert!((s[1].heading - 45.0).abs() < EPSILON);
        assert!((s[3].y - 10.0).abs() < EPSILON);
    }

    #[test]
    fn test_linear_heading_takes_short_arc() {
        let waypoints = [Pose::new(0.0, 0.0, 350.0), Pose::new(0.0, 0.0, 10.0)];
        let trajectory = Trajectory::linear(&waypoints, 1.0, 3).unwrap();
        assert!(trajectory.samples()[1].heading.abs() < EPSILON);
    }

    #[test]
    fn test_linear_degenerate_inputs() {
        assert!(Trajectory::linear(&[], 1.0, 10).unwrap().is_empty());
        let only = Pose::new(1.0, 2.0, 3.0);
        let single = Trajectory::linear(&[only], 1.0, 10).unwrap();
        assert_eq!(single.samples(), &[only]);
        // resolution below the waypoint count still keeps every waypoint
        let waypoints = [
            Pose::default(),
            Pose::new(1.0, 0.0, 0.0),
            Pose::new(2.0, 0.0, 0.0),
        ];
        let coarse = Trajectory::linear(&waypoints, 1.0, 0).unwrap();
        assert_eq!(coarse.samples(), &waypoints);
    }
}
