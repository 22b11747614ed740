//! Obstacle queries, the axis-decomposed collision gate and field clamping.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::units::{FIELD_HALF_EXTENT_IN, clamp, reduce_0_360, to_px, to_pxx, to_pxy};
use crate::{Chassis, Pose};

/// Axis-aligned rectangle in canvas pixel space, `(x, y)` being the top-left
/// corner.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge (px).
    pub x: f64,
    /// Top edge (px).
    pub y: f64,
    /// Width (px).
    pub w: f64,
    /// Height (px).
    pub h: f64,
}

impl Rect {
    /// Construct a rectangle from its top-left corner and size.
    ///
    /// # Arguments
    ///
    /// * `x`: Left edge in pixels.
    /// * `y`: Top edge in pixels.
    /// * `w`: Width in pixels.
    /// * `h`: Height in pixels.
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Rect { x, y, w, h }
    }

    /// Pixel-space box covering a `width` x `height` inch footprint centered
    /// on field position `(x, y)`.
    ///
    /// # Arguments
    ///
    /// * `x`: Field x of the footprint center in inches.
    /// * `y`: Field y of the footprint center in inches.
    /// * `width`: Footprint extent along field x in inches.
    /// * `height`: Footprint extent along field y in inches.
    pub fn from_footprint(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x: to_pxx(x - width / 2.0),
            y: to_pxy(y + height / 2.0),
            w: to_px(width),
            h: to_px(height),
        }
    }

    /// AABB overlap test. Edges that merely touch do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.x + self.w <= other.x
            || other.x + other.w <= self.x
            || self.y + self.h <= other.y
            || other.y + other.h <= self.y)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Rect { x, y, w, h } = self;
        write!(f, "[{x:.1}, {y:.1} {w:.1}x{h:.1} px]")
    }
}

/// Answers whether a robot bounding box would hit something.
///
/// Implementations must be pure; the collision gate may query the same
/// collider up to three times per step.
pub trait Collider {
    /// `true` if `bbox` overlaps any obstacle.
    fn collides(&self, bbox: &Rect) -> bool;
}

impl<F> Collider for F
where
    F: Fn(&Rect) -> bool,
{
    fn collides(&self, bbox: &Rect) -> bool {
        self(bbox)
    }
}

impl Collider for [Rect] {
    fn collides(&self, bbox: &Rect) -> bool {
        self.iter().any(|obstacle| obstacle.overlaps(bbox))
    }
}

/// A field with no obstacles.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenField;

impl Collider for OpenField {
    fn collides(&self, _bbox: &Rect) -> bool {
        false
    }
}

/// A field position in inches.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Field x (in).
    pub x: f64,
    /// Field y (in).
    pub y: f64,
}

impl Point {
    /// Construct a point.
    ///
    /// # Arguments
    ///
    /// * `x`: Field x (in).
    /// * `y`: Field y (in).
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Resolve a candidate move against `collider`, one axis at a time.
///
/// The full move is accepted when its box is clear. Otherwise the x-only and
/// y-only moves are tested independently from `current`, and an axis whose
/// partial move is blocked keeps its current value. This lets a robot slide
/// along an obstacle edge. It is not a contact solver: a blocked robot stops
/// where it was, it is never pushed flush against the obstacle.
///
/// # Arguments
///
/// * `current`: Position before the move (in).
/// * `candidate`: Position the integrated velocities would reach (in).
/// * `bounding_box`: Maps a position to the robot's pixel-space box there.
/// * `collider`: The obstacle query.
///
/// # Returns
///
/// The accepted position. Blocked axes keep their `current` value.
pub fn resolve<B, C>(current: Point, candidate: Point, bounding_box: B, collider: &C) -> Point
where
    B: Fn(Point) -> Rect,
    C: Collider + ?Sized,
{
    if !collider.collides(&bounding_box(candidate)) {
        return candidate;
    }

    let mut resolved = current;
    if !collider.collides(&bounding_box(Point::new(candidate.x, current.y))) {
        resolved.x = candidate.x;
    }
    if !collider.collides(&bounding_box(Point::new(current.x, candidate.y))) {
        resolved.y = candidate.y;
    }
    resolved
}

/// Keep the whole chassis footprint inside the field walls.
pub fn clamp_to_field(point: Point, chassis: &Chassis) -> Point {
    let max_x = FIELD_HALF_EXTENT_IN - chassis.width / 2.0;
    let max_y = FIELD_HALF_EXTENT_IN - chassis.height / 2.0;
    Point {
        x: clamp(point.x, -max_x, max_x),
        y: clamp(point.y, -max_y, max_y),
    }
}

/// Clamp position to the field and reduce heading to `[0, 360)`.
pub fn clamp_pose(pose: Pose, chassis: &Chassis) -> Pose {
    let p = clamp_to_field(Point::new(pose.x, pose.y), chassis);
    Pose::new(p.x, p.y, reduce_0_360(pose.heading))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    const EPSILON: f64 = 1e-9;
    const CHASSIS: Chassis = Chassis::new(14.0, 14.0, 14.0, 14.0);

    fn footprint(p: Point) -> Rect {
        Rect::from_footprint(p.x, p.y, CHASSIS.width, CHASSIS.height)
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 5.0, 5.0)));
        assert!(!a.overlaps(&Rect::new(0.0, 10.0, 5.0, 5.0)));
        assert!(!a.overlaps(&Rect::new(-5.0, -5.0, 5.0, 5.0)));
        assert!(a.overlaps(&Rect::new(9.9, 9.9, 5.0, 5.0)));
        assert!(a.overlaps(&Rect::new(2.0, 2.0, 1.0, 1.0)));
    }

    #[test]
    fn test_footprint_box() {
        let bbox = Rect::from_footprint(0.0, 0.0, 14.0, 14.0);
        assert!((bbox.x - 260.0).abs() < EPSILON);
        assert!((bbox.y - 260.0).abs() < EPSILON);
        assert!((bbox.w - 56.0).abs() < EPSILON);
        assert!((bbox.h - 56.0).abs() < EPSILON);
    }

    #[test]
    fn test_clear_move_is_accepted_with_one_query() {
        let queries = Cell::new(0);
        let collider = |_: &Rect| {
            queries.set(queries.get() + 1);
            false
        };
        let candidate = Point::new(3.0, 4.0);
        let out = resolve(Point::new(0.0, 0.0), candidate, footprint, &collider);
        assert_eq!(out, candidate);
        assert_eq!(queries.get(), 1);
    }

    #[test]
    fn test_blocked_y_slides_along_x() {
        // wall above the robot spanning the whole field width
        let wall = [Rect::new(0.0, 0.0, 576.0, 250.0)];
        let current = Point::new(0.0, 0.0);
        let candidate = Point::new(2.0, 4.0);
        let out = resolve(current, candidate, footprint, &wall[..]);
        assert_eq!(out, Point::new(2.0, 0.0));
    }

    #[test]
    fn test_blocked_x_slides_along_y() {
        // wall to the right of the robot spanning the whole field height
        let wall = [Rect::new(320.0, 0.0, 100.0, 576.0)];
        let candidate = Point::new(3.0, -5.0);
        let out = resolve(Point::new(0.0, 0.0), candidate, footprint, &wall[..]);
        assert_eq!(out, Point::new(0.0, -5.0));
    }

    #[test]
    fn test_corner_block_keeps_both_axes() {
        // only the diagonal move hits this block
        let block = [Rect::new(318.0, 230.0, 20.0, 20.0)];
        let current = Point::new(0.0, 0.0);
        let candidate = Point::new(3.0, 3.0);
        assert!(block[..].collides(&footprint(candidate)));
        let out = resolve(current, candidate, footprint, &block[..]);
        // both partial moves are clear, so both axes advance
        assert_eq!(out, Point::new(3.0, 3.0));
    }

    #[test]
    fn test_fully_blocked_stays_put() {
        let everything = |_: &Rect| true;
        let current = Point::new(1.0, 2.0);
        let out = resolve(current, Point::new(5.0, 6.0), footprint, &everything);
        assert_eq!(out, current);
    }

    #[test]
    fn test_open_field_never_collides() {
        assert!(!OpenField.collides(&Rect::new(0.0, 0.0, 576.0, 576.0)));
    }

    #[test]
    fn test_clamp_to_field() {
        let out = clamp_to_field(Point::new(100.0, -100.0), &CHASSIS);
        assert_eq!(out, Point::new(65.0, -65.0));
    }

    #[test]
    fn test_clamp_pose_is_idempotent_in_range() {
        let poses = [
            Pose::new(0.0, 0.0, 0.0),
            Pose::new(65.0, -65.0, 359.5),
            Pose::new(-12.25, 40.0, 181.0),
        ];
        for pose in poses {
            assert_eq!(clamp_pose(pose, &CHASSIS), pose);
            assert_eq!(clamp_pose(clamp_pose(pose, &CHASSIS), &CHASSIS), pose);
        }
        let wrapped = clamp_pose(Pose::new(0.0, 0.0, -90.0), &CHASSIS);
        assert_eq!(wrapped.heading, 270.0);
    }
}
