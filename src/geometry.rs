//! Basic 2D geometry shared by maps and plans.
use derive_more::{Add, Display, Sub};
use std::ops::Mul;

/// A position in map coordinates.
///
/// For grid maps, `i` is the row and `j` the column. For roadmaps, `(i, j)` is the coordinate pair
/// stored on the node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Add, Sub, Display)]
#[display("({i:.2}, {j:.2})")]
pub struct Point {
    /// First coordinate (row for grids)
    pub i: f64,
    /// Second coordinate (column for grids)
    pub j: f64,
}

impl Point {
    /// Create a new point
    pub const fn new(i: f64, j: f64) -> Self {
        Self { i, j }
    }

    /// Linearly interpolate between `self` and `other`.
    ///
    /// `alpha == 0` gives `self` and `alpha == 1` gives `other`.
    pub fn lerp(self, other: Point, alpha: f64) -> Point {
        self + (other - self) * alpha
    }

    /// Euclidean distance to another point
    pub fn dist_to(self, other: Point) -> f64 {
        let d = other - self;
        d.i.hypot(d.j)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.i * rhs, self.j * rhs)
    }
}
