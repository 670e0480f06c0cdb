//! Self-intersection candidate edges.
//!
//! Where two triangles of the mesh genuinely cross each other in 3D,
//! the drawing needs a line along their intersection even though it is
//! not an edge of either triangle. This pass finds those segments with
//! a broadphase AABB query followed by a triangle-triangle interval
//! intersection, skipping coplanar-adjacency cases.

use crate::predicates::{is_boundary_edge, PARALLEL_EPS};
use hlr_math::{Point3, Segment3};
use hlr_mesh::{CandidateEdge, SpatialIndex, Traversal, Triangle3, TriangleMesh};

/// Distance band for sign classification against a triangle plane.
const PLANE_EPS: f64 = 1e-9;

/// Minimum length of an accepted intersection segment.
const MIN_SEGMENT_LENGTH: f64 = 1e-6;

/// Resumable scan over all triangle pairs with overlapping bounds.
///
/// One [`step`](Self::step) processes one outer triangle; the scan is a
/// valid suspension point after every step, which is how the engine
/// time-slices it.
#[derive(Debug, Default)]
pub struct SelfIntersectionScan {
    cursor: usize,
    found: Vec<CandidateEdge>,
}

impl SelfIntersectionScan {
    /// Start a scan at the first triangle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the next triangle to process.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// True once every triangle has been processed.
    pub fn is_done(&self, mesh: &TriangleMesh) -> bool {
        self.cursor >= mesh.num_triangles()
    }

    /// Process the next triangle: test it against every spatially-close
    /// triangle with a higher index (each unordered pair once).
    pub fn step<I: SpatialIndex>(&mut self, mesh: &TriangleMesh, index: &I) {
        let t = self.cursor;
        self.cursor += 1;
        if t >= mesh.num_triangles() {
            return;
        }

        let tri = mesh.triangle(t);
        if tri.normal.norm_squared() < 0.5 {
            return;
        }
        let mut query = tri.aabb();
        query.expand(PLANE_EPS);

        let found = &mut self.found;
        index.traverse(&|aabb| aabb.overlaps(&query), &mut |j, other| {
            if (j as usize) <= t {
                return Traversal::Continue;
            }
            // Near-parallel planes either miss or meet in coplanar
            // adjacency; neither produces a crossing edge.
            if other.normal.norm_squared() < 0.5
                || tri.normal.dot(&other.normal).abs() > 1.0 - PARALLEL_EPS
            {
                return Traversal::Continue;
            }
            if let Some(seg) = tri_tri_intersection(&tri, other) {
                if seg.length() >= MIN_SEGMENT_LENGTH
                    && !is_boundary_edge(&tri, &seg)
                    && !is_boundary_edge(other, &seg)
                {
                    found.push(CandidateEdge::new(seg, t as u32, Some(j)));
                }
            }
            Traversal::Continue
        });
    }

    /// Finish the scan, consolidating collinear sub-segments.
    ///
    /// A crossing that spans several triangle pairs produces one raw
    /// segment per pair, all on the same carrier line; merging them
    /// yields one candidate edge per physical crossing.
    pub fn finish(self) -> Vec<CandidateEdge> {
        consolidate_collinear(self.found)
    }
}

/// Compute the bounded intersection segment of two triangles, if their
/// interiors genuinely cross. Coplanar overlap and single-point contact
/// yield `None`.
pub fn tri_tri_intersection(t1: &Triangle3, t2: &Triangle3) -> Option<Segment3> {
    let span1 = plane_crossing_span(t1, t2)?;
    let span2 = plane_crossing_span(t2, t1)?;

    // Common 1D coordinate along the intersection line's direction.
    let line_dir = t1.normal.cross(&t2.normal);
    if line_dir.norm_squared() < PLANE_EPS * PLANE_EPS {
        return None;
    }

    let project = |p: &Point3| line_dir.dot(&p.coords);
    let mut i1 = [(project(&span1.0), span1.0), (project(&span1.1), span1.1)];
    let mut i2 = [(project(&span2.0), span2.0), (project(&span2.1), span2.1)];
    if i1[0].0 > i1[1].0 {
        i1.swap(0, 1);
    }
    if i2[0].0 > i2[1].0 {
        i2.swap(0, 1);
    }

    let (lo_s, lo_p) = if i1[0].0 > i2[0].0 { i1[0] } else { i2[0] };
    let (hi_s, hi_p) = if i1[1].0 < i2[1].0 { i1[1] } else { i2[1] };
    if hi_s <= lo_s {
        return None;
    }
    Some(Segment3::new(lo_p, hi_p))
}

/// The segment where `tri` crosses the supporting plane of `other`, or
/// `None` if `tri` lies entirely on one side (or in the plane).
fn plane_crossing_span(tri: &Triangle3, other: &Triangle3) -> Option<(Point3, Point3)> {
    let verts = tri.vertices();
    let dists = [
        other.plane_distance(&verts[0]),
        other.plane_distance(&verts[1]),
        other.plane_distance(&verts[2]),
    ];

    let mut points: Vec<Point3> = Vec::with_capacity(2);
    for i in 0..3 {
        if dists[i].abs() <= PLANE_EPS {
            points.push(verts[i]);
        }
        let j = (i + 1) % 3;
        if (dists[i] > PLANE_EPS && dists[j] < -PLANE_EPS)
            || (dists[i] < -PLANE_EPS && dists[j] > PLANE_EPS)
        {
            let s = dists[i] / (dists[i] - dists[j]);
            points.push(verts[i] + (verts[j] - verts[i]) * s);
        }
    }

    // Dedup near-coincident points (a vertex exactly in the plane shows
    // up once as on-plane, not again as a crossing).
    points.dedup_by(|a, b| (*a - *b).norm_squared() < PLANE_EPS * PLANE_EPS);
    if points.len() < 2 {
        return None;
    }
    Some((points[0], points[1]))
}

/// Merge candidate edges lying on the same carrier line whose spans
/// overlap or touch.
fn consolidate_collinear(mut edges: Vec<CandidateEdge>) -> Vec<CandidateEdge> {
    let mut merged = true;
    while merged {
        merged = false;
        let mut out: Vec<CandidateEdge> = Vec::with_capacity(edges.len());
        'outer: for edge in edges.drain(..) {
            for kept in &mut out {
                if let Some(combined) = merge_collinear(kept, &edge) {
                    kept.seg = combined;
                    merged = true;
                    continue 'outer;
                }
            }
            out.push(edge);
        }
        edges = out;
    }
    edges
}

/// Combined span of two collinear touching/overlapping segments, or
/// `None` if they are not collinear or not contiguous.
fn merge_collinear(a: &CandidateEdge, b: &CandidateEdge) -> Option<Segment3> {
    let da = a.seg.direction();
    let db = b.seg.direction();
    let la = da.norm();
    let lb = db.norm();
    if la < MIN_SEGMENT_LENGTH || lb < MIN_SEGMENT_LENGTH {
        return None;
    }
    if da.dot(&db).abs() / (la * lb) < 1.0 - PARALLEL_EPS {
        return None;
    }
    // b's endpoints must lie on a's carrier line.
    for p in [&b.seg.start, &b.seg.end] {
        let t = a.seg.project_param(p);
        if (a.seg.point_at(t) - p).norm() > MIN_SEGMENT_LENGTH {
            return None;
        }
    }
    // Contiguity in a's parametrization (tolerance in absolute distance).
    let gap_t = MIN_SEGMENT_LENGTH / la;
    let (mut t0, mut t1) = (
        a.seg.project_param(&b.seg.start),
        a.seg.project_param(&b.seg.end),
    );
    if t0 > t1 {
        std::mem::swap(&mut t0, &mut t1);
    }
    if t1 < -gap_t || t0 > 1.0 + gap_t {
        return None;
    }
    let lo = t0.min(0.0);
    let hi = t1.max(1.0);
    Some(a.seg.slice(lo, hi))
}
