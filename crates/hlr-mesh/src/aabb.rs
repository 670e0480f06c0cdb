//! Axis-aligned bounding boxes.
//!
//! Used as the broadphase filter for occlusion queries and triangle-pair
//! intersection tests: only geometry with overlapping AABBs needs the
//! exact (and much more expensive) narrowphase treatment.

use hlr_math::{Axis, Point3, Segment3};

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Bounding box of a segment's two endpoints.
    pub fn of_segment(seg: &Segment3) -> Self {
        let mut aabb = Self::empty();
        aabb.include_point(&seg.start);
        aabb.include_point(&seg.end);
        aabb
    }

    /// Expand this AABB to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Expand this AABB to include another AABB.
    pub fn include(&mut self, other: &Aabb3) {
        self.include_point(&other.min);
        self.include_point(&other.max);
    }

    /// Test if two AABBs overlap (touching counts as overlap).
    pub fn overlaps(&self, other: &Aabb3) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Expand the AABB by a tolerance in all directions.
    pub fn expand(&mut self, tol: f64) {
        self.min.x -= tol;
        self.min.y -= tol;
        self.min.z -= tol;
        self.max.x += tol;
        self.max.y += tol;
        self.max.z += tol;
    }

    /// Stretch one side of the box to infinity along `axis`.
    ///
    /// `toward_positive` selects which side moves. Occlusion queries use
    /// this to build the conservative shape covering everything that could
    /// lie between the viewer and an edge.
    pub fn extend_to_infinity(&mut self, axis: Axis, toward_positive: bool) {
        if toward_positive {
            self.max.coords[axis.index()] = f64::INFINITY;
        } else {
            self.min.coords[axis.index()] = f64::NEG_INFINITY;
        }
    }

    /// Center of the box.
    pub fn center(&self) -> Point3 {
        Point3::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            (self.min.z + self.max.z) / 2.0,
        )
    }

    /// True if no point was ever included.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_include() {
        let mut aabb = Aabb3::empty();
        assert!(aabb.is_empty());
        aabb.include_point(&Point3::new(1.0, 2.0, 3.0));
        aabb.include_point(&Point3::new(-1.0, 0.0, 5.0));
        assert!(!aabb.is_empty());
        assert_eq!(aabb.min.x, -1.0);
        assert_eq!(aabb.max.z, 5.0);
    }

    #[test]
    fn test_overlaps_touching() {
        let a = Aabb3::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb3::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        let c = Aabb3::new(Point3::new(1.1, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_extend_to_infinity() {
        let mut aabb = Aabb3::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        aabb.extend_to_infinity(Axis::Y, false);
        assert_eq!(aabb.min.y, f64::NEG_INFINITY);
        assert_eq!(aabb.max.y, 1.0);
        // A box far below now overlaps.
        let below = Aabb3::new(Point3::new(0.0, -100.0, 0.0), Point3::new(1.0, -99.0, 1.0));
        assert!(aabb.overlaps(&below));
    }

    #[test]
    fn test_of_segment() {
        let seg = Segment3::new(Point3::new(0.0, 5.0, -1.0), Point3::new(2.0, 1.0, 3.0));
        let aabb = Aabb3::of_segment(&seg);
        assert_eq!(aabb.min.y, 1.0);
        assert_eq!(aabb.max.y, 5.0);
    }
}
