//! Hidden-line removal for triangulated surfaces under orthographic
//! projection.
//!
//! The input is a triangle mesh, a spatial index over it, and a
//! projection direction. The output is the set of candidate edges
//! (sharp features, mesh boundaries, and optionally self-intersection
//! curves) with their occluded portions removed, as 3D segments.
//!
//! The projection direction is snapped to the dominant primary axis, so
//! occlusion is resolved in an axis-aligned frame. Per edge, every
//! spatially-relevant triangle contributes a hidden interval on the
//! edge's `[0, 1]` parametrization; the complement of the merged
//! intervals is the visible output.
//!
//! The computation is resumable: [`HiddenLineTask`] runs in bounded time
//! slices and can be cancelled between them, so a single-threaded host
//! (a UI thread, a wasm worker) stays responsive. [`generate`] is the
//! blocking convenience wrapper over the same machinery.

#![warn(missing_docs)]

pub mod clip;
pub mod edge_set;
pub mod engine;
pub mod error;
pub mod interval;
pub mod overlap;
pub mod predicates;
pub mod self_intersect;
pub mod topology;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use hlr_math::Vec3;
use hlr_mesh::{extract_feature_edges, SpatialIndex, TriangleMesh, DEFAULT_FEATURE_ANGLE};

pub use edge_set::EdgeSet;
pub use engine::{CancelToken, GenerateFuture, HiddenLineTask, TaskStatus};
pub use error::{HlrError, Result};
pub use interval::{HiddenIntervals, Interval};
pub use topology::{filter_segments, TopologyFilterSettings};

/// Default wall-clock budget of one resumption slice, in milliseconds.
pub const DEFAULT_TIME_SLICE_MILLIS: u64 = 30;

/// Options for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerateOptions {
    /// Dihedral angle (degrees) above which a shared edge counts as a
    /// feature.
    pub feature_angle_threshold_degrees: f64,
    /// Also scan for triangle-triangle crossing curves and resolve them
    /// as candidate edges.
    pub include_self_intersection_edges: bool,
    /// Sort the output deterministically in the projection plane.
    pub sort_output_by_axis: bool,
    /// Wall-clock budget of one resumption slice.
    pub time_slice_millis: u64,
    /// Output denoising thresholds.
    pub topology_filter: TopologyFilterSettings,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            feature_angle_threshold_degrees: DEFAULT_FEATURE_ANGLE,
            include_self_intersection_edges: false,
            sort_output_by_axis: false,
            time_slice_millis: DEFAULT_TIME_SLICE_MILLIS,
            topology_filter: TopologyFilterSettings::default(),
        }
    }
}

impl GenerateOptions {
    /// Reject option combinations the engine cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.time_slice_millis == 0 {
            return Err(HlrError::InvalidOptions(
                "timeSliceMillis must be at least 1".into(),
            ));
        }
        if !(0.0..=180.0).contains(&self.feature_angle_threshold_degrees) {
            return Err(HlrError::InvalidOptions(format!(
                "featureAngleThresholdDegrees must be in [0, 180], got {}",
                self.feature_angle_threshold_degrees
            )));
        }
        Ok(())
    }
}

/// Run hidden-line generation to completion with default options.
pub fn generate<I: SpatialIndex>(
    mesh: &TriangleMesh,
    index: &I,
    projection: Vec3,
) -> Result<EdgeSet> {
    generate_with_options(mesh, index, projection, &GenerateOptions::default())
}

/// Run hidden-line generation to completion.
///
/// Extracts candidate feature edges, then drives a [`HiddenLineTask`]
/// until it finishes, one time slice at a time. Hosts that need to
/// interleave work should drive the task (or a [`GenerateFuture`])
/// themselves instead.
pub fn generate_with_options<I: SpatialIndex>(
    mesh: &TriangleMesh,
    index: &I,
    projection: Vec3,
    options: &GenerateOptions,
) -> Result<EdgeSet> {
    let edges = extract_feature_edges(mesh, options.feature_angle_threshold_degrees);
    let mut task = HiddenLineTask::new(mesh, index, projection, edges, options.clone())?;
    let budget = Duration::from_millis(options.time_slice_millis);
    loop {
        if let TaskStatus::Done(set) = task.resume(budget)? {
            return Ok(set);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hlr_math::Axis;
    use hlr_mesh::Bvh;

    /// An axis-aligned cube with `min` corner and edge length `size`,
    /// 8 shared vertices and 12 triangles.
    fn cube_buffers(min: f64, size: f64, base: u32) -> (Vec<f32>, Vec<u32>) {
        let lo = min as f32;
        let hi = (min + size) as f32;
        #[rustfmt::skip]
        let positions = vec![
            lo, lo, lo,  hi, lo, lo,  hi, lo, hi,  lo, lo, hi, // y = lo
            lo, hi, lo,  hi, hi, lo,  hi, hi, hi,  lo, hi, hi, // y = hi
        ];
        #[rustfmt::skip]
        let indices: Vec<u32> = [
            0, 1, 2,  0, 2, 3, // y = lo
            4, 5, 6,  4, 6, 7, // y = hi
            0, 1, 5,  0, 5, 4, // z = lo
            3, 2, 6,  3, 6, 7, // z = hi
            0, 3, 7,  0, 7, 4, // x = lo
            1, 2, 6,  1, 6, 5, // x = hi
        ]
        .iter()
        .map(|i| i + base)
        .collect();
        (positions, indices)
    }

    fn cube_mesh() -> TriangleMesh {
        let (positions, indices) = cube_buffers(0.0, 1.0, 0);
        TriangleMesh::new(positions, indices)
    }

    #[test]
    fn test_cube_top_face_visible_bottom_face_hidden() {
        let mesh = cube_mesh();
        let bvh = Bvh::build(&mesh);
        let set = generate(&mesh, &bvh, Vec3::new(0.0, 1.0, 0.0)).unwrap();

        // Projection (0, 1, 0) places the viewer above the cube: the four
        // y=1 face edges survive, the y=0 face is occluded, and the four
        // y-parallel edges project to points.
        assert_eq!(set.len(), 4);
        for seg in set.iter() {
            assert_relative_eq!(seg.start.y, 1.0, epsilon = 1e-9);
            assert_relative_eq!(seg.end.y, 1.0, epsilon = 1e-9);
            assert_relative_eq!(seg.length(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_nested_cube_fully_hidden() {
        let (mut positions, mut indices) = cube_buffers(0.0, 1.0, 0);
        let (inner_pos, inner_idx) = cube_buffers(0.25, 0.5, 8);
        positions.extend(inner_pos);
        indices.extend(inner_idx);
        let mesh = TriangleMesh::new(positions, indices);
        let bvh = Bvh::build(&mesh);

        let set = generate(&mesh, &bvh, Vec3::new(0.0, 1.0, 0.0)).unwrap();

        // The inner cube contributes nothing; the outer drawing is the
        // same as for the outer cube alone.
        assert_eq!(set.len(), 4);
        for seg in set.iter() {
            assert_relative_eq!(seg.start.y, 1.0, epsilon = 1e-9);
            assert_relative_eq!(seg.end.y, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_negative_view_direction_flips_visible_face() {
        let mesh = cube_mesh();
        let bvh = Bvh::build(&mesh);
        let set = generate(&mesh, &bvh, Vec3::new(0.0, -1.0, 0.0)).unwrap();

        // Projection (0, -1, 0) places the viewer below the cube, so the
        // y=0 face is the near face.
        assert_eq!(set.len(), 4);
        for seg in set.iter() {
            assert_relative_eq!(seg.start.y, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_single_triangle_never_occludes_itself() {
        let mesh = TriangleMesh::new(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            Vec::new(),
        );
        let bvh = Bvh::build(&mesh);
        let set = generate(&mesh, &bvh, Vec3::new(0.0, 0.0, 1.0)).unwrap();
        assert_eq!(set.len(), 3);
        let total: f64 = set.iter().map(|s| s.length()).sum();
        assert_relative_eq!(total, 2.0 + 2.0_f64.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn test_sorted_output_is_reproducible() {
        let mesh = cube_mesh();
        let bvh = Bvh::build(&mesh);
        let options = GenerateOptions {
            sort_output_by_axis: true,
            ..Default::default()
        };
        let a = generate_with_options(&mesh, &bvh, Vec3::new(0.0, 1.0, 0.0), &options).unwrap();
        let b = generate_with_options(&mesh, &bvh, Vec3::new(0.0, 1.0, 0.0), &options).unwrap();
        assert_eq!(
            a.to_coordinate_buffer(Axis::Y, 0.0),
            b.to_coordinate_buffer(Axis::Y, 0.0)
        );
    }

    /// Plate A fills z=0 over `[-2, 2]^2`; plate B stands in y=0 over
    /// x in `[0.5, 1.5]`, z in `[-1, 1]`, piercing A.
    fn crossing_plates() -> TriangleMesh {
        #[rustfmt::skip]
        let positions: Vec<f32> = vec![
            -2.0, -2.0, 0.0,  2.0, -2.0, 0.0,  2.0, 2.0, 0.0,
            -2.0, -2.0, 0.0,  2.0,  2.0, 0.0, -2.0, 2.0, 0.0,
             0.5, 0.0, -1.0,  1.5,  0.0, -1.0,  1.5, 0.0, 1.0,
             0.5, 0.0, -1.0,  1.5,  0.0,  1.0,  0.5, 0.0, 1.0,
        ];
        TriangleMesh::new(positions, Vec::new())
    }

    #[test]
    fn test_piercing_plate_draws_intersection_curve() {
        let mesh = crossing_plates();
        let bvh = Bvh::build(&mesh);
        let options = GenerateOptions {
            include_self_intersection_edges: true,
            ..Default::default()
        };

        // Viewer at +z: plate A's 4 boundary edges, plate B's near edge
        // (z = 1), and the intersection segment at y = z = 0.
        let set =
            generate_with_options(&mesh, &bvh, Vec3::new(0.0, 0.0, 1.0), &options).unwrap();
        assert_eq!(set.len(), 6);
        let crossing = set
            .iter()
            .find(|s| s.start.z.abs() < 1e-9 && s.midpoint().y.abs() < 1e-9 && s.length() < 2.0)
            .expect("intersection segment present");
        assert_relative_eq!(crossing.length(), 1.0, epsilon = 1e-6);

        // Without the scan the crossing is not drawn.
        let plain = generate(&mesh, &bvh, Vec3::new(0.0, 0.0, 1.0)).unwrap();
        assert_eq!(plain.len(), 5);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let bad = GenerateOptions {
            time_slice_millis: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = GenerateOptions {
            feature_angle_threshold_degrees: 270.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_options_deserialize_camel_case() {
        let options: GenerateOptions = serde_json::from_str(
            r#"{"featureAngleThresholdDegrees": 45.0, "sortOutputByAxis": true}"#,
        )
        .unwrap();
        assert_relative_eq!(options.feature_angle_threshold_degrees, 45.0);
        assert!(options.sort_output_by_axis);
        assert_eq!(options.time_slice_millis, DEFAULT_TIME_SLICE_MILLIS);
    }
}
