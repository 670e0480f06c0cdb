//! Projected overlap solver.
//!
//! Given a segment already clipped to beneath a triangle's plane, find
//! the portion whose orthographic projection falls inside the triangle's
//! projected silhouette. Both are flattened by zeroing the dominant
//! projection-axis coordinate; the triangle's silhouette is then swept
//! against the plane through the flattened line to get its span along
//! the line, and the two 1D spans are intersected.

use crate::predicates::AREA_EPS;
use hlr_math::{Axis, Point3, Segment3};
use hlr_mesh::Triangle3;

/// On-plane band for the silhouette sweep.
const SWEEP_EPS: f64 = 1e-9;

/// Compute the sub-segment of `seg` whose projection along `axis` lies
/// inside `tri`'s projected silhouette, or `None` if the projections are
/// disjoint or the triangle projects to (near) zero area.
pub fn projected_overlap(seg: &Segment3, tri: &Triangle3, axis: Axis) -> Option<Segment3> {
    let flat_start = axis.flatten_point(&seg.start);
    let flat_end = axis.flatten_point(&seg.end);
    let fa = axis.flatten_point(&tri.a);
    let fb = axis.flatten_point(&tri.b);
    let fc = axis.flatten_point(&tri.c);

    // Flattened-to-zero-area triangles cannot occlude anything.
    if (fb - fa).cross(&(fc - fa)).norm() / 2.0 < AREA_EPS {
        return None;
    }

    let d = flat_end - flat_start;
    let len = d.norm();
    if len < SWEEP_EPS {
        return None;
    }
    let dir = d / len;

    // Plane containing the flattened line, orthogonal to the flattened
    // geometry's plane. Both dir and the axis are unit and perpendicular,
    // so the cross product is unit too.
    let plane_normal = dir.cross(&axis.unit());

    // Sweep the triangle's three flattened edges against that plane,
    // collecting crossing points and on-plane vertices.
    let verts = [fa, fb, fc];
    let dists: Vec<f64> = verts
        .iter()
        .map(|v| plane_normal.dot(&(v - flat_start)))
        .collect();

    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    let mut found = false;
    let mut record = |p: &Point3| {
        let s = dir.dot(&(p - flat_start));
        lo = lo.min(s);
        hi = hi.max(s);
        found = true;
    };

    for i in 0..3 {
        if dists[i].abs() <= SWEEP_EPS {
            record(&verts[i]);
        }
        let j = (i + 1) % 3;
        if (dists[i] > SWEEP_EPS && dists[j] < -SWEEP_EPS)
            || (dists[i] < -SWEEP_EPS && dists[j] > SWEEP_EPS)
        {
            let s = dists[i] / (dists[i] - dists[j]);
            record(&(verts[i] + (verts[j] - verts[i]) * s));
        }
    }

    if !found {
        // Triangle entirely on one side of the line's plane.
        return None;
    }

    // Intersect the triangle's span with the segment's own span [0, len]
    // in the common 1D coordinate along dir.
    let lo = lo.max(0.0);
    let hi = hi.min(len);
    if hi - lo <= SWEEP_EPS {
        return None;
    }

    // Map back to the unflattened segment: flattening is affine along the
    // segment, so the 1D fractions carry over directly.
    Some(seg.slice(lo / len, hi / len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Triangle covering x in [0, 2], y in [0, 2] below the diagonal,
    /// sitting at z = 1; tested segments sit below it at z = 0.
    fn occluder() -> Triangle3 {
        Triangle3::new(
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(2.0, 0.0, 1.0),
            Point3::new(0.0, 2.0, 1.0),
        )
    }

    #[test]
    fn test_segment_fully_inside_silhouette() {
        let seg = Segment3::new(Point3::new(0.2, 0.5, 0.0), Point3::new(0.8, 0.5, 0.0));
        let ov = projected_overlap(&seg, &occluder(), Axis::Z).unwrap();
        assert_relative_eq!(ov.start.x, 0.2, epsilon = 1e-9);
        assert_relative_eq!(ov.end.x, 0.8, epsilon = 1e-9);
    }

    #[test]
    fn test_segment_partially_inside() {
        let seg = Segment3::new(Point3::new(-1.0, 0.5, 0.0), Point3::new(1.0, 0.5, 0.0));
        let ov = projected_overlap(&seg, &occluder(), Axis::Z).unwrap();
        assert_relative_eq!(ov.start.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(ov.end.x, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_segment_outside_silhouette() {
        let seg = Segment3::new(Point3::new(0.0, 3.0, 0.0), Point3::new(2.0, 3.0, 0.0));
        assert!(projected_overlap(&seg, &occluder(), Axis::Z).is_none());
    }

    #[test]
    fn test_edge_on_triangle_rejected() {
        // Vertical triangle flattens to zero area under Z.
        let tri = Triangle3::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 0.0, 1.0),
        );
        let seg = Segment3::new(Point3::new(0.0, 0.0, -1.0), Point3::new(1.0, 0.0, -1.0));
        assert!(projected_overlap(&seg, &tri, Axis::Z).is_none());
    }

    #[test]
    fn test_segment_along_silhouette_boundary() {
        // The segment projects exactly onto one silhouette edge: the
        // sweep's on-plane vertex handling must still find the full span.
        let seg = Segment3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0));
        let ov = projected_overlap(&seg, &occluder(), Axis::Z).unwrap();
        assert_relative_eq!(ov.start.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(ov.end.x, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_touching_at_single_point_rejected() {
        // Segment grazing the silhouette at one vertex only.
        let seg = Segment3::new(Point3::new(-1.0, 2.0, 0.0), Point3::new(1.0, 2.0, 0.0));
        assert!(projected_overlap(&seg, &occluder(), Axis::Z).is_none());
    }

    #[test]
    fn test_overlap_preserves_depth_interpolation() {
        // Sloped segment: the returned sub-segment must interpolate the
        // original (unflattened) z coordinates.
        let seg = Segment3::new(Point3::new(-2.0, 0.5, 0.0), Point3::new(2.0, 0.5, 0.4));
        let ov = projected_overlap(&seg, &occluder(), Axis::Z).unwrap();
        assert_relative_eq!(ov.start.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(ov.start.z, 0.2, epsilon = 1e-9);
    }
}
