//! Feature-edge extraction.
//!
//! Walks the mesh's edge adjacency and keeps edges worth drawing: mesh
//! boundaries (one adjacent face) and sharp edges whose dihedral angle
//! exceeds a threshold. These become the candidate edges the hidden-line
//! engine resolves for visibility.

use std::collections::HashMap;

use crate::mesh::TriangleMesh;
use hlr_math::Segment3;

/// Default dihedral angle threshold for sharp edges, in degrees.
pub const DEFAULT_FEATURE_ANGLE: f64 = 30.0;

/// Cell size for welding positionally-coincident vertices of non-indexed
/// meshes.
const WELD_TOLERANCE: f64 = 1e-6;

/// An edge under consideration for visibility resolution.
///
/// Carries the indices of the triangle(s) it derives from so the engine
/// can exclude them from occlusion testing; it holds no other link back
/// to the mesh.
#[derive(Debug, Clone, Copy)]
pub struct CandidateEdge {
    /// Edge geometry.
    pub seg: Segment3,
    /// First source triangle.
    pub tri0: u32,
    /// Second source triangle, if any.
    pub tri1: Option<u32>,
}

impl CandidateEdge {
    /// Create a candidate edge.
    pub fn new(seg: Segment3, tri0: u32, tri1: Option<u32>) -> Self {
        Self { seg, tri0, tri1 }
    }

    /// True if triangle `tri` is one of the edge's source triangles.
    pub fn derives_from(&self, tri: u32) -> bool {
        self.tri0 == tri || self.tri1 == Some(tri)
    }
}

/// Extract boundary and sharp feature edges from a mesh.
///
/// An edge is kept if it has a single adjacent triangle (mesh boundary)
/// or if the dihedral angle between its two adjacent faces exceeds
/// `angle_threshold_degrees`. Non-indexed meshes are welded by position
/// first so adjacency is recovered across duplicated vertices.
pub fn extract_feature_edges(
    mesh: &TriangleMesh,
    angle_threshold_degrees: f64,
) -> Vec<CandidateEdge> {
    let vertex_keys = weld_vertices(mesh);
    let cos_threshold = angle_threshold_degrees.to_radians().cos();

    // Map canonical (lo, hi) vertex-key pair -> adjacent triangles.
    let mut edge_tris: HashMap<(u32, u32), (u32, Option<u32>)> = HashMap::new();
    for t in 0..mesh.num_triangles() {
        let [i0, i1, i2] = mesh.triangle_indices(t);
        let keys = [
            vertex_keys[i0 as usize],
            vertex_keys[i1 as usize],
            vertex_keys[i2 as usize],
        ];
        for e in 0..3 {
            let (a, b) = (keys[e], keys[(e + 1) % 3]);
            if a == b {
                continue;
            }
            let key = if a < b { (a, b) } else { (b, a) };
            edge_tris
                .entry(key)
                .and_modify(|entry| {
                    if entry.1.is_none() && entry.0 != t as u32 {
                        entry.1 = Some(t as u32);
                    }
                })
                .or_insert((t as u32, None));
        }
    }

    let mut edges = Vec::new();
    for (&(ka, kb), &(tri0, tri1)) in &edge_tris {
        let keep = match tri1 {
            None => true,
            Some(tri1) => {
                let n0 = mesh.triangle(tri0 as usize).normal;
                let n1 = mesh.triangle(tri1 as usize).normal;
                n0.dot(&n1) < cos_threshold
            }
        };
        if !keep {
            continue;
        }
        let seg = Segment3::new(mesh.vertex(ka as usize), mesh.vertex(kb as usize));
        if seg.length_squared() <= WELD_TOLERANCE * WELD_TOLERANCE {
            continue;
        }
        edges.push(CandidateEdge::new(seg, tri0, tri1));
    }

    // HashMap iteration order is unstable; sort for deterministic output.
    edges.sort_by(|a, b| {
        (a.tri0, a.tri1).cmp(&(b.tri0, b.tri1)).then_with(|| {
            let ka = [a.seg.start.x, a.seg.start.y, a.seg.start.z, a.seg.end.x];
            let kb = [b.seg.start.x, b.seg.start.y, b.seg.start.z, b.seg.end.x];
            ka.iter()
                .zip(&kb)
                .map(|(x, y)| x.total_cmp(y))
                .find(|o| o.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    });
    edges
}

/// Assign each vertex a representative key, welding positionally-equal
/// vertices. For indexed meshes the index already identifies vertices;
/// non-indexed meshes are keyed on a quantized position grid.
fn weld_vertices(mesh: &TriangleMesh) -> Vec<u32> {
    let n = mesh.num_vertices();
    if !mesh.indices.is_empty() {
        return (0..n as u32).collect();
    }

    let inv = 1.0 / WELD_TOLERANCE;
    let mut cells: HashMap<(i64, i64, i64), u32> = HashMap::new();
    let mut keys = Vec::with_capacity(n);
    for i in 0..n {
        let p = mesh.vertex(i);
        let cell = (
            (p.x * inv).round() as i64,
            (p.y * inv).round() as i64,
            (p.z * inv).round() as i64,
        );
        let key = *cells.entry(cell).or_insert(i as u32);
        keys.push(key);
    }
    keys
}
