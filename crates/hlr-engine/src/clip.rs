//! Clip a segment to the half-space beneath a triangle's plane.
//!
//! "Beneath" is measured along the projection axis: the portion of the
//! edge farther from the viewer than the triangle's supporting plane is
//! the only portion the triangle can occlude.

use crate::predicates::PARALLEL_EPS;
use hlr_math::{Segment3, Vec3};
use hlr_mesh::Triangle3;

/// Minimum clipped length worth testing for overlap.
pub const MIN_CLIP_LENGTH: f64 = 1e-6;

/// Compute the sub-segment of `seg` on or below `tri`'s supporting plane,
/// measured along `axis_dir` (the snapped projection axis, unit length,
/// pointing from the viewer into the scene).
///
/// Returns `None` when the segment lies entirely above the plane (the
/// triangle cannot occlude it) or when the triangle is edge-on to the
/// axis so "beneath" is ill-defined.
pub fn clip_below_plane(seg: &Segment3, tri: &Triangle3, axis_dir: &Vec3) -> Option<Segment3> {
    let denom = tri.normal.dot(axis_dir);
    if denom.abs() < PARALLEL_EPS {
        return None;
    }

    // Displacement along +axis_dir from the plane to each endpoint:
    // positive means deeper than the plane.
    let d0 = tri.plane_distance(&seg.start) / denom;
    let d1 = tri.plane_distance(&seg.end) / denom;

    if d0 >= 0.0 && d1 >= 0.0 {
        return Some(*seg);
    }
    if d0 < 0.0 && d1 < 0.0 {
        return None;
    }

    // One endpoint above, one below: interpolate the crossing.
    let t = d0 / (d0 - d1);
    let crossing = seg.point_at(t);
    let clipped = if d0 >= 0.0 {
        Segment3::new(seg.start, crossing)
    } else {
        Segment3::new(crossing, seg.end)
    };

    if clipped.length() < MIN_CLIP_LENGTH {
        return None;
    }
    Some(clipped)
}
