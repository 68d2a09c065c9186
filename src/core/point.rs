//! Cursor Positions
//!
//! Integer pixel coordinates. Distances are compared squared so that
//! threshold checks stay exact.

use std::fmt;
use serde::{Serialize, Deserialize};

/// A pixel position in circuit space.
///
/// Coordinates are signed: the pointer can leave the image on any side.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl Point {
    /// Origin
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance (exact, no overflow for i32 inputs).
    #[inline]
    pub fn distance_squared(self, other: Self) -> i128 {
        let dx = self.x as i128 - other.x as i128;
        let dy = self.y as i128 - other.y as i128;
        dx * dx + dy * dy
    }

    /// Euclidean distance. Prefer `distance_squared` for comparisons.
    #[inline]
    pub fn distance(self, other: Self) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }

    /// Whether `other` lies strictly farther than `threshold` pixels away.
    #[inline]
    pub fn is_farther_than(self, other: Self, threshold: u32) -> bool {
        let t = threshold as i128;
        self.distance_squared(other) > t * t
    }

    /// Offset by a delta.
    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Point::new(0, 0);
        let b = Point::new(3, 4);
        assert_eq!(a.distance_squared(b), 25);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let a = Point::new(10, 10);
        assert!(!a.is_farther_than(Point::new(410, 10), 400));
        assert!(a.is_farther_than(Point::new(411, 10), 400));
        // 240^2 + 320^2 = 400^2 exactly
        assert!(!a.is_farther_than(Point::new(250, 330), 400));
    }

    #[test]
    fn test_extreme_coordinates_do_not_overflow() {
        let a = Point::new(i32::MIN, i32::MIN);
        let b = Point::new(i32::MAX, i32::MAX);
        assert!(a.is_farther_than(b, 400));
    }
}
