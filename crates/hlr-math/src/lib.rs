#![warn(missing_docs)]

//! Math types for the hidden-line-removal engine.
//!
//! Thin wrappers around nalgebra providing domain-specific types for
//! orthographic projection geometry: points, vectors, line segments,
//! and primary-axis snapping.

use nalgebra::Vector3;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// One of the three primary coordinate axes.
///
/// The projection direction is snapped to whichever axis carries its
/// dominant component; clipping and overlap solving flatten geometry
/// along that axis rather than performing a change of basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// The X axis.
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

impl Axis {
    /// Snap a direction vector to the axis of its largest absolute component.
    pub fn dominant(v: &Vec3) -> Axis {
        let (ax, ay, az) = (v.x.abs(), v.y.abs(), v.z.abs());
        if ax >= ay && ax >= az {
            Axis::X
        } else if ay >= az {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    /// Component index into an `[x, y, z]` triple.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Unit vector along this axis.
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::x(),
            Axis::Y => Vec3::y(),
            Axis::Z => Vec3::z(),
        }
    }

    /// The component of a point along this axis.
    pub fn of_point(self, p: &Point3) -> f64 {
        p.coords[self.index()]
    }

    /// The component of a vector along this axis.
    pub fn of_vec(self, v: &Vec3) -> f64 {
        v[self.index()]
    }

    /// Copy of `p` with this axis' component zeroed.
    pub fn flatten_point(self, p: &Point3) -> Point3 {
        let mut q = *p;
        q.coords[self.index()] = 0.0;
        q
    }

    /// The remaining two axes, in `[x, y, z]` order.
    pub fn others(self) -> [Axis; 2] {
        match self {
            Axis::X => [Axis::Y, Axis::Z],
            Axis::Y => [Axis::X, Axis::Z],
            Axis::Z => [Axis::X, Axis::Y],
        }
    }
}

/// A directed line segment in 3D, parametrized by `t` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment3 {
    /// Start point (`t = 0`).
    pub start: Point3,
    /// End point (`t = 1`).
    pub end: Point3,
}

impl Segment3 {
    /// Create a segment from its endpoints.
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    /// Point at parameter `t` via `start + t * (end - start)`.
    pub fn point_at(&self, t: f64) -> Point3 {
        self.start + (self.end - self.start) * t
    }

    /// Direction vector `end - start` (not normalized).
    pub fn direction(&self) -> Vec3 {
        self.end - self.start
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        self.direction().norm()
    }

    /// Squared length, avoiding the square root.
    pub fn length_squared(&self) -> f64 {
        self.direction().norm_squared()
    }

    /// Midpoint of the segment.
    pub fn midpoint(&self) -> Point3 {
        self.point_at(0.5)
    }

    /// Sub-segment between parameters `t0` and `t1`.
    pub fn slice(&self, t0: f64, t1: f64) -> Segment3 {
        Segment3::new(self.point_at(t0), self.point_at(t1))
    }

    /// Parameter of the projection of `p` onto the segment's carrier line.
    ///
    /// Returns 0 for a zero-length segment.
    pub fn project_param(&self, p: &Point3) -> f64 {
        let d = self.direction();
        let len_sq = d.norm_squared();
        if len_sq <= f64::EPSILON {
            return 0.0;
        }
        (p - self.start).dot(&d) / len_sq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_dominant_axis() {
        assert_eq!(Axis::dominant(&Vec3::new(0.0, 1.0, 0.0)), Axis::Y);
        assert_eq!(Axis::dominant(&Vec3::new(-3.0, 1.0, 2.0)), Axis::X);
        assert_eq!(Axis::dominant(&Vec3::new(0.1, 0.2, -0.9)), Axis::Z);
    }

    #[test]
    fn test_dominant_axis_tie_prefers_earlier() {
        assert_eq!(Axis::dominant(&Vec3::new(1.0, 1.0, 1.0)), Axis::X);
        assert_eq!(Axis::dominant(&Vec3::new(0.0, 1.0, 1.0)), Axis::Y);
    }

    #[test]
    fn test_flatten_point() {
        let p = Point3::new(1.0, 2.0, 3.0);
        let q = Axis::Y.flatten_point(&p);
        assert_relative_eq!(q.x, 1.0);
        assert_relative_eq!(q.y, 0.0);
        assert_relative_eq!(q.z, 3.0);
    }

    #[test]
    fn test_segment_param() {
        let seg = Segment3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(seg.point_at(0.5).x, 1.0);
        assert_relative_eq!(seg.project_param(&Point3::new(0.5, 3.0, 0.0)), 0.25);
        assert_relative_eq!(seg.length(), 2.0);
    }

    #[test]
    fn test_segment_slice() {
        let seg = Segment3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 0.0, 8.0));
        let sub = seg.slice(0.25, 0.75);
        assert_relative_eq!(sub.start.x, 1.0);
        assert_relative_eq!(sub.end.z, 6.0);
    }

    #[test]
    fn test_zero_length_project_param() {
        let seg = Segment3::new(Point3::origin(), Point3::origin());
        assert_relative_eq!(seg.project_param(&Point3::new(1.0, 1.0, 1.0)), 0.0);
    }
}
