//! Mesh triangles with derived plane data.

use crate::aabb::Aabb3;
use hlr_math::{Point3, Vec3};

/// A 3D triangle with its derived (unit) plane normal.
#[derive(Debug, Clone, Copy)]
pub struct Triangle3 {
    /// First vertex.
    pub a: Point3,
    /// Second vertex.
    pub b: Point3,
    /// Third vertex.
    pub c: Point3,
    /// Unit face normal. Zero vector for degenerate triangles.
    pub normal: Vec3,
}

impl Triangle3 {
    /// Create a triangle and compute its unit normal.
    ///
    /// A degenerate (zero-area) triangle gets a zero normal rather than
    /// NaN components, so downstream predicates can reject it cleanly.
    pub fn new(a: Point3, b: Point3, c: Point3) -> Self {
        let cross = (b - a).cross(&(c - a));
        let norm = cross.norm();
        let normal = if norm > f64::EPSILON {
            cross / norm
        } else {
            Vec3::zeros()
        };
        Self { a, b, c, normal }
    }

    /// Vertices in order.
    pub fn vertices(&self) -> [Point3; 3] {
        [self.a, self.b, self.c]
    }

    /// Triangle area.
    pub fn area(&self) -> f64 {
        (self.b - self.a).cross(&(self.c - self.a)).norm() / 2.0
    }

    /// Bounding box of the three vertices.
    pub fn aabb(&self) -> Aabb3 {
        let mut aabb = Aabb3::empty();
        aabb.include_point(&self.a);
        aabb.include_point(&self.b);
        aabb.include_point(&self.c);
        aabb
    }

    /// Signed distance of a point to the triangle's supporting plane.
    ///
    /// Positive on the side the normal points toward. Meaningless for
    /// degenerate triangles (zero normal yields zero distance).
    pub fn plane_distance(&self, p: &Point3) -> f64 {
        self.normal.dot(&(p - self.a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tri(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Triangle3 {
        Triangle3::new(
            Point3::new(a[0], a[1], a[2]),
            Point3::new(b[0], b[1], b[2]),
            Point3::new(c[0], c[1], c[2]),
        )
    }

    #[test]
    fn test_normal_and_area() {
        let t = tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        assert_relative_eq!(t.normal.z, 1.0);
        assert_relative_eq!(t.area(), 0.5);
    }

    #[test]
    fn test_degenerate_normal_is_zero() {
        let t = tri([0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]);
        assert_relative_eq!(t.normal.norm(), 0.0);
        assert_relative_eq!(t.area(), 0.0);
    }

    #[test]
    fn test_plane_distance() {
        let t = tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        assert_relative_eq!(t.plane_distance(&Point3::new(0.3, 0.3, 2.0)), 2.0);
        assert_relative_eq!(t.plane_distance(&Point3::new(5.0, -3.0, 0.0)), 0.0);
    }

}
