//! Topological cleanup of the output line set.
//!
//! Occlusion resolution of tessellated surfaces tends to leave noise:
//! tiny fragments where intervals almost met, stray slivers from
//! near-tangent faces, and dense clusters along curved silhouettes. This
//! pass builds an adjacency graph over segment endpoints via spatial
//! hashing, labels connected components, and drops segments that are
//! short, disconnected, or locally over-dense, unless they look like
//! deliberate geometry (axis-aligned, long, or part of a
//! tangent-continuous chain).
//!
//! This is a heuristic denoising step, not a correctness-preserving
//! transformation; thresholds are configuration, not derived invariants.

use std::collections::HashMap;

use hlr_math::{Axis, Segment3, Vec3};
use serde::{Deserialize, Serialize};

/// Tunable thresholds for the topology filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TopologyFilterSettings {
    /// Disable the whole pass.
    pub enabled: bool,
    /// Spatial hash cell size for endpoint matching.
    pub cell_size: f64,
    /// Maximum endpoint distance treated as a connection.
    pub join_tolerance: f64,
    /// Maximum angle (degrees) between connected segments still
    /// considered tangent-continuous.
    pub tangent_angle_degrees: f64,
    /// Maximum angle (degrees) from a primary axis for a segment to
    /// count as axis-aligned.
    pub axis_angle_degrees: f64,
    /// Segments shorter than this are stray candidates.
    pub min_stray_length: f64,
    /// Connections required for a short segment to survive pass 1.
    pub min_connections: usize,
    /// Components smaller than this are dropped in pass 2.
    pub min_component_size: usize,
    /// Bucket size for the midpoint density check.
    pub density_cell_size: f64,
    /// Maximum segments per density bucket before pass 3 starts
    /// dropping.
    pub density_cap: usize,
    /// Segments at least this long always survive the density check.
    pub long_length: f64,
}

impl Default for TopologyFilterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            cell_size: 0.1,
            join_tolerance: 1e-4,
            tangent_angle_degrees: 10.0,
            axis_angle_degrees: 1.0,
            min_stray_length: 0.05,
            min_connections: 2,
            min_component_size: 3,
            density_cell_size: 0.25,
            density_cap: 12,
            long_length: 0.5,
        }
    }
}

/// Per-segment connectivity computed from the endpoint spatial hash.
struct Connectivity {
    /// Adjacent segment indices (shared endpoint within tolerance).
    neighbors: Vec<Vec<usize>>,
    /// Whether each segment has at least one tangent-continuous
    /// connection.
    tangent: Vec<bool>,
}

/// Apply the three filtering passes in order and return the survivors.
pub fn filter_segments(
    segments: Vec<Segment3>,
    settings: &TopologyFilterSettings,
) -> Vec<Segment3> {
    if !settings.enabled || segments.is_empty() {
        return segments;
    }

    let n = segments.len();
    let lengths: Vec<f64> = segments.iter().map(|s| s.length()).collect();
    let axis_aligned: Vec<bool> = segments
        .iter()
        .map(|s| is_axis_aligned(s, settings.axis_angle_degrees))
        .collect();
    let conn = build_connectivity(&segments, settings);

    let mut keep = vec![true; n];

    // Pass 1: stray fragments. Short, poorly connected, off-axis
    // segments go, unless part of a tangent-continuous chain.
    for i in 0..n {
        if !axis_aligned[i]
            && !conn.tangent[i]
            && lengths[i] < settings.min_stray_length
            && conn.neighbors[i].len() < settings.min_connections
        {
            keep[i] = false;
        }
    }

    // Pass 2: small components, computed over pass-1 survivors. A
    // component survives undersized only if something in it looks
    // deliberate.
    let components = label_components(&conn, &keep);
    let mut comp_size: HashMap<usize, usize> = HashMap::new();
    let mut comp_flagged: HashMap<usize, bool> = HashMap::new();
    for i in 0..n {
        if !keep[i] {
            continue;
        }
        let c = components[i];
        *comp_size.entry(c).or_insert(0) += 1;
        let flagged = comp_flagged.entry(c).or_insert(false);
        *flagged |= axis_aligned[i] || conn.tangent[i];
    }
    for i in 0..n {
        if !keep[i] {
            continue;
        }
        let c = components[i];
        if comp_size[&c] < settings.min_component_size && !comp_flagged[&c] {
            keep[i] = false;
        }
    }

    // Pass 3: locally dense clusters, bucketed by midpoint.
    let mut density: HashMap<(i64, i64, i64), usize> = HashMap::new();
    let inv = 1.0 / settings.density_cell_size;
    let bucket = |seg: &Segment3| {
        let m = seg.midpoint();
        (
            (m.x * inv).floor() as i64,
            (m.y * inv).floor() as i64,
            (m.z * inv).floor() as i64,
        )
    };
    for i in 0..n {
        if keep[i] {
            *density.entry(bucket(&segments[i])).or_insert(0) += 1;
        }
    }
    for i in 0..n {
        if keep[i]
            && density[&bucket(&segments[i])] > settings.density_cap
            && !axis_aligned[i]
            && !conn.tangent[i]
            && lengths[i] < settings.long_length
        {
            keep[i] = false;
        }
    }

    segments
        .into_iter()
        .zip(keep)
        .filter_map(|(seg, k)| k.then_some(seg))
        .collect()
}

fn is_axis_aligned(seg: &Segment3, angle_degrees: f64) -> bool {
    let d = seg.direction();
    let len = d.norm();
    if len <= f64::EPSILON {
        return false;
    }
    let cos_tol = angle_degrees.to_radians().cos();
    [Axis::X, Axis::Y, Axis::Z]
        .iter()
        .any(|a| (d.dot(&a.unit()).abs() / len) > cos_tol)
}

/// Connect segments whose endpoints coincide within tolerance, searching
/// the endpoint's own hash cell and its 26 neighbors.
fn build_connectivity(segments: &[Segment3], settings: &TopologyFilterSettings) -> Connectivity {
    let inv = 1.0 / settings.cell_size;
    let cell = |p: &hlr_math::Point3| {
        (
            (p.x * inv).floor() as i64,
            (p.y * inv).floor() as i64,
            (p.z * inv).floor() as i64,
        )
    };

    // endpoint id = segment index * 2 + end
    let mut grid: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();
    let endpoint = |id: usize| {
        let seg = &segments[id / 2];
        if id % 2 == 0 {
            seg.start
        } else {
            seg.end
        }
    };
    for id in 0..segments.len() * 2 {
        grid.entry(cell(&endpoint(id))).or_default().push(id);
    }

    let tol_sq = settings.join_tolerance * settings.join_tolerance;
    let cos_tangent = settings.tangent_angle_degrees.to_radians().cos();

    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); segments.len()];
    let mut tangent = vec![false; segments.len()];

    for id in 0..segments.len() * 2 {
        let i = id / 2;
        let p = endpoint(id);
        let (cx, cy, cz) = cell(&p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(ids) = grid.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for &other in ids {
                        let j = other / 2;
                        if j == i {
                            continue;
                        }
                        if (endpoint(other) - p).norm_squared() >= tol_sq {
                            continue;
                        }
                        if !neighbors[i].contains(&j) {
                            neighbors[i].push(j);
                        }
                        if directions_parallel(&segments[i], &segments[j], cos_tangent) {
                            tangent[i] = true;
                            tangent[j] = true;
                        }
                    }
                }
            }
        }
    }

    Connectivity { neighbors, tangent }
}

fn directions_parallel(a: &Segment3, b: &Segment3, cos_tol: f64) -> bool {
    let da: Vec3 = a.direction();
    let db: Vec3 = b.direction();
    let norm = da.norm() * db.norm();
    if norm <= f64::EPSILON {
        return false;
    }
    // Orientation-insensitive: a chain may alternate segment direction.
    da.dot(&db).abs() / norm > cos_tol
}

/// Depth-first connected-component labeling over kept segments.
fn label_components(conn: &Connectivity, keep: &[bool]) -> Vec<usize> {
    let n = keep.len();
    let mut label = vec![usize::MAX; n];
    let mut next = 0;
    let mut stack = Vec::new();
    for start in 0..n {
        if !keep[start] || label[start] != usize::MAX {
            continue;
        }
        stack.push(start);
        label[start] = next;
        while let Some(i) = stack.pop() {
            for &j in &conn.neighbors[i] {
                if keep[j] && label[j] == usize::MAX {
                    label[j] = next;
                    stack.push(j);
                }
            }
        }
        next += 1;
    }
    label
}
