//! The hidden-line engine: a resumable occlusion-resolution task.
//!
//! The whole computation is an explicit state machine driven by
//! [`HiddenLineTask::resume`]: each call runs until a wall-clock budget
//! elapses, suspending only at well-defined boundaries (after one mesh
//! triangle in the self-intersection scan, after one candidate edge in
//! occlusion resolution), so a host can interleave other work between
//! resumptions. Cancellation is polled at the same boundaries.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use hlr_math::{Axis, Point3, Segment3, Vec3};
use hlr_mesh::{Aabb3, CandidateEdge, SpatialIndex, Traversal, TriangleMesh};

use crate::clip::{clip_below_plane, MIN_CLIP_LENGTH};
use crate::edge_set::EdgeSet;
use crate::error::{HlrError, Result};
use crate::interval::HiddenIntervals;
use crate::overlap::projected_overlap;
use crate::predicates::{
    edge_degenerate_under, is_boundary_edge, triangle_degenerate_under, AREA_EPS,
};
use crate::self_intersect::SelfIntersectionScan;
use crate::topology::filter_segments;
use crate::GenerateOptions;

/// Band for "edge lies exactly on the triangle's plane".
const ON_PLANE_EPS: f64 = 1e-9;

/// Cooperative cancellation signal, checked at suspension points.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a fresh, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The task observes it at its next resumption
    /// boundary and surfaces [`HlrError::Cancelled`].
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// True if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Outcome of one resumption slice.
#[derive(Debug)]
pub enum TaskStatus {
    /// More work remains; fractional completion in `[0, 1]`.
    InProgress(f32),
    /// The run finished; the final edge set.
    Done(EdgeSet),
}

#[derive(Debug)]
enum Phase {
    Scan(SelfIntersectionScan),
    Resolve,
    Finished,
}

/// Resumable hidden-line generation over one mesh, spatial index, and
/// projection direction.
#[derive(Debug)]
pub struct HiddenLineTask<'a, I: SpatialIndex> {
    mesh: &'a TriangleMesh,
    index: &'a I,
    view: Vec3,
    axis: Axis,
    /// Unit vector along the snapped axis, oriented viewer-to-scene.
    axis_dir: Vec3,
    options: GenerateOptions,
    cancel: CancelToken,
    edges: Vec<CandidateEdge>,
    phase: Phase,
    edge_cursor: usize,
    scratch: HiddenIntervals,
    visible: Vec<Segment3>,
}

impl<'a, I: SpatialIndex> HiddenLineTask<'a, I> {
    /// Set up a run. Fails fast on malformed input: empty mesh, indices
    /// out of bounds, zero projection vector, or invalid options.
    ///
    /// `projection` points from the scene toward the viewer; it is
    /// snapped to its dominant primary axis.
    pub fn new(
        mesh: &'a TriangleMesh,
        index: &'a I,
        projection: Vec3,
        edges: Vec<CandidateEdge>,
        options: GenerateOptions,
    ) -> Result<Self> {
        options.validate()?;
        if mesh.is_empty() {
            return Err(HlrError::EmptyMesh);
        }
        if let Some(&bad) = mesh
            .indices
            .iter()
            .find(|&&i| i as usize >= mesh.num_vertices())
        {
            return Err(HlrError::IndexOutOfBounds(bad, mesh.num_vertices()));
        }
        let norm = projection.norm();
        if norm <= f64::EPSILON {
            return Err(HlrError::InvalidProjection);
        }
        let view = projection / norm;

        let axis = Axis::dominant(&view);
        // The projection vector points at the viewer; the traversal axis
        // runs the other way, into the scene.
        let sign = if axis.of_vec(&view) >= 0.0 { -1.0 } else { 1.0 };
        let axis_dir = axis.unit() * sign;

        let phase = if options.include_self_intersection_edges {
            Phase::Scan(SelfIntersectionScan::new())
        } else {
            Phase::Resolve
        };

        Ok(Self {
            mesh,
            index,
            view,
            axis,
            axis_dir,
            options,
            cancel: CancelToken::new(),
            edges,
            phase,
            edge_cursor: 0,
            scratch: HiddenIntervals::new(),
            visible: Vec::new(),
        })
    }

    /// The snapped projection axis.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Token that cancels this run when triggered.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Fractional completion in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        let scan_share = if self.options.include_self_intersection_edges {
            0.5
        } else {
            0.0
        };
        match &self.phase {
            Phase::Scan(scan) => {
                scan_share * scan.cursor() as f32 / self.mesh.num_triangles().max(1) as f32
            }
            Phase::Resolve => {
                scan_share
                    + (1.0 - scan_share) * self.edge_cursor as f32
                        / self.edges.len().max(1) as f32
            }
            Phase::Finished => 1.0,
        }
    }

    /// Run until `budget` elapses or the computation completes.
    ///
    /// Returns [`TaskStatus::Done`] exactly once; resuming a finished
    /// task yields an empty result. A pending cancellation surfaces as
    /// [`HlrError::Cancelled`] instead of a partial edge set.
    ///
    /// The budget is measured on the `std` monotonic clock. On targets
    /// without one (`wasm32-unknown-unknown`) drive [`Self::resume_with`]
    /// with a host clock instead.
    pub fn resume(&mut self, budget: Duration) -> Result<TaskStatus> {
        let deadline = Instant::now() + budget;
        self.resume_with(|| Instant::now() >= deadline)
    }

    /// Run until `out_of_time` reports the slice budget spent, or the
    /// computation completes.
    ///
    /// The predicate is polled after every unit of work (one scanned
    /// triangle, one resolved edge), so the host chooses the clock. A
    /// predicate that always returns true slices by single work units.
    pub fn resume_with(&mut self, mut out_of_time: impl FnMut() -> bool) -> Result<TaskStatus> {
        loop {
            if self.cancel.is_cancelled() {
                return Err(HlrError::Cancelled);
            }
            match &mut self.phase {
                Phase::Scan(scan) => {
                    if scan.is_done(self.mesh) {
                        let scan = match std::mem::replace(&mut self.phase, Phase::Resolve) {
                            Phase::Scan(scan) => scan,
                            _ => unreachable!(),
                        };
                        self.edges.extend(scan.finish());
                    } else {
                        scan.step(self.mesh, self.index);
                    }
                }
                Phase::Resolve => {
                    if self.edge_cursor >= self.edges.len() {
                        let set = self.finish();
                        self.phase = Phase::Finished;
                        return Ok(TaskStatus::Done(set));
                    }
                    let edge = self.edges[self.edge_cursor];
                    self.edge_cursor += 1;
                    self.resolve_edge(&edge);
                }
                Phase::Finished => return Ok(TaskStatus::Done(EdgeSet::new())),
            }
            if out_of_time() {
                return Ok(TaskStatus::InProgress(self.progress()));
            }
        }
    }

    /// Resolve one candidate edge against the whole mesh and append its
    /// visible pieces.
    fn resolve_edge(&mut self, edge: &CandidateEdge) {
        let seg = edge.seg;
        if edge_degenerate_under(&seg, &self.view) {
            return;
        }
        // Edges born from sliver triangles carry unreliable geometry.
        if self.mesh.triangle(edge.tri0 as usize).area() < AREA_EPS {
            return;
        }
        if let Some(tri1) = edge.tri1 {
            if self.mesh.triangle(tri1 as usize).area() < AREA_EPS {
                return;
            }
        }

        let index = self.index;
        let view = self.view;
        let axis = self.axis;
        let axis_dir = self.axis_dir;
        let sign = axis.of_vec(&axis_dir);

        // Conservative query shape: everything between the viewer and the
        // edge could occlude it.
        let mut query = Aabb3::of_segment(&seg);
        query.expand(ON_PLANE_EPS);
        query.extend_to_infinity(axis, sign < 0.0);

        let depth = move |p: &Point3| axis.of_point(p) * sign;
        let edge_max_depth = depth(&seg.start).max(depth(&seg.end));

        let scratch = &mut self.scratch;
        scratch.clear();

        index.traverse(&|aabb| aabb.overlaps(&query), &mut |i, tri| {
            if edge.derives_from(i) {
                return Traversal::Continue;
            }
            let tri_min_depth = depth(&tri.a).min(depth(&tri.b)).min(depth(&tri.c));
            if tri_min_depth >= edge_max_depth - ON_PLANE_EPS {
                // Entirely on the far side: cannot occlude.
                return Traversal::Continue;
            }
            if triangle_degenerate_under(tri, &view) {
                return Traversal::Continue;
            }
            if is_boundary_edge(tri, &seg) {
                return Traversal::Continue;
            }
            if tri.plane_distance(&seg.start).abs() < ON_PLANE_EPS
                && tri.plane_distance(&seg.end).abs() < ON_PLANE_EPS
            {
                // The edge lies in this triangle's plane.
                return Traversal::Continue;
            }

            let Some(clipped) = clip_below_plane(&seg, tri, &axis_dir) else {
                return Traversal::Continue;
            };
            if clipped.length() < MIN_CLIP_LENGTH {
                return Traversal::Continue;
            }
            let Some(overlap) = projected_overlap(&clipped, tri, axis) else {
                return Traversal::Continue;
            };

            if scratch.insert(&seg, &overlap) {
                scratch.compress();
                if scratch.is_full() {
                    // Fully hidden; no further triangle can matter.
                    return Traversal::Stop;
                }
            }
            Traversal::Continue
        });

        self.scratch.visible_segments(&seg, &mut self.visible);
    }

    /// Post-process and package the output.
    fn finish(&mut self) -> EdgeSet {
        let segments = std::mem::take(&mut self.visible);
        let mut set = EdgeSet {
            segments: filter_segments(segments, &self.options.topology_filter),
        };
        if self.options.sort_output_by_axis {
            set.sort_by_axis(self.axis);
        }
        set
    }
}

/// Future adapter: each poll resumes the task for one time slice, then
/// yields cooperatively by waking itself.
///
/// Slices on the `std` monotonic clock; hosts without one drive
/// [`HiddenLineTask::resume_with`] directly.
pub struct GenerateFuture<'a, I: SpatialIndex> {
    task: HiddenLineTask<'a, I>,
    budget: Duration,
}

impl<'a, I: SpatialIndex> GenerateFuture<'a, I> {
    /// Wrap a task, slicing it by its configured time budget.
    pub fn new(task: HiddenLineTask<'a, I>) -> Self {
        let budget = Duration::from_millis(task.options.time_slice_millis);
        Self { task, budget }
    }

    /// Token that cancels the underlying task; the future then resolves
    /// to [`HlrError::Cancelled`].
    pub fn cancel_token(&self) -> CancelToken {
        self.task.cancel_token()
    }
}

impl<'a, I: SpatialIndex> Future for GenerateFuture<'a, I> {
    type Output = Result<EdgeSet>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match this.task.resume(this.budget) {
            Ok(TaskStatus::Done(set)) => Poll::Ready(Ok(set)),
            Ok(TaskStatus::InProgress(_)) => {
                cx.waker().wake_by_ref();
                Poll::Pending
            }
            Err(e) => Poll::Ready(Err(e)),
        }
    }
}
