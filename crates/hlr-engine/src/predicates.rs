//! Degeneracy and coincidence predicates.
//!
//! Pure functions with fixed tolerance bands. These decide which geometry
//! is excluded from occlusion testing; a wrong answer here shows up as a
//! missing or spurious line in the drawing, so the bands are deliberately
//! conservative.

use hlr_math::{Segment3, Vec3};
use hlr_mesh::Triangle3;

/// Tolerance band on normalized dot products for parallelism tests.
pub const PARALLEL_EPS: f64 = 1e-6;

/// Minimum triangle area treated as non-degenerate.
pub const AREA_EPS: f64 = 1e-12;

/// Squared-distance band for point coincidence.
pub const COINCIDENT_EPS_SQ: f64 = 1e-12;

/// True if an edge is degenerate under the projection: its direction is
/// (near) parallel to the projection vector, so it projects to a point.
pub fn edge_degenerate_under(seg: &Segment3, view: &Vec3) -> bool {
    let d = seg.direction();
    let len = d.norm() * view.norm();
    if len <= f64::EPSILON {
        return true;
    }
    d.dot(view).abs() / len > 1.0 - PARALLEL_EPS
}

/// True if a triangle is degenerate under the projection: its plane normal
/// is (near) perpendicular to the projection vector, so it projects to
/// zero area. Zero-area triangles (zero normal) are degenerate outright.
pub fn triangle_degenerate_under(tri: &Triangle3, view: &Vec3) -> bool {
    let n = tri.normal;
    if n.norm_squared() < 0.5 {
        // Triangle3 stores a unit normal or zero for degenerate faces.
        return true;
    }
    let v = view.norm();
    if v <= f64::EPSILON {
        return true;
    }
    n.dot(view).abs() / v < PARALLEL_EPS
}

/// True iff both endpoints of `seg` coincide with two of the triangle's
/// vertices, in either order.
pub fn is_boundary_edge(tri: &Triangle3, seg: &Segment3) -> bool {
    let verts = tri.vertices();
    let mut start_match = None;
    for (i, v) in verts.iter().enumerate() {
        if (v - seg.start).norm_squared() < COINCIDENT_EPS_SQ {
            start_match = Some(i);
            break;
        }
    }
    let Some(start_idx) = start_match else {
        return false;
    };
    verts
        .iter()
        .enumerate()
        .any(|(i, v)| i != start_idx && (v - seg.end).norm_squared() < COINCIDENT_EPS_SQ)
}
