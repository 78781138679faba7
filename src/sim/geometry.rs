//! Line segment geometry shared by wall hitboxes and drawn lines
//!
//! Collision against a segment uses the distance-sum test: a point P touches
//! segment AB when `|PA| + |PB| <= |AB| + radius`. This is an ellipse-shaped
//! band around the segment rather than a true point-to-segment distance, and
//! bounce timing depends on exactly that slack.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An immutable line segment in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: Vec2,
    pub end: Vec2,
}

impl LineSegment {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    /// Segment length
    #[inline]
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Midpoint of the segment
    #[inline]
    pub fn midpoint(&self) -> Vec2 {
        self.start.lerp(self.end, 0.5)
    }

    /// True if the segment has no extent (no usable normal)
    pub fn is_degenerate(&self) -> bool {
        self.start.distance_squared(self.end) < f32::EPSILON
    }

    /// Distance-sum collision test against a probe point (usually a ball's
    /// next position)
    pub fn touches(&self, point: Vec2, radius: f32) -> bool {
        point.distance(self.start) + point.distance(self.end) <= self.length() + radius
    }

    /// Unit normal on the side of `position`.
    ///
    /// Candidates are `(-dy, dx)` and `(dy, -dx)`; the one whose offset from
    /// the midpoint lands strictly closer to `position` wins, ties go to the
    /// first.
    pub fn normal_toward(&self, position: Vec2) -> Vec2 {
        let d = self.end - self.start;
        let n1 = Vec2::new(-d.y, d.x).normalize_or_zero();
        let n2 = Vec2::new(d.y, -d.x).normalize_or_zero();

        let mid = self.midpoint();
        if (mid + n2).distance(position) < (mid + n1).distance(position) {
            n2
        } else {
            n1
        }
    }
}

/// Reflect a velocity about a unit normal: v' = v - 2(v·n)n
#[inline]
pub fn reflect(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Reflect a velocity off a segment, picking the normal facing `position`
pub fn reflect_off_segment(velocity: Vec2, position: Vec2, segment: &LineSegment) -> Vec2 {
    reflect(velocity, segment.normal_toward(position))
}
