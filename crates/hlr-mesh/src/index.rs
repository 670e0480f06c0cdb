//! The spatial index traversal contract.
//!
//! The hidden-line engine never depends on how a spatial index is built,
//! only on this query shape: descend into bounding volumes admitted by a
//! caller predicate, hand each reachable triangle to a callback, and stop
//! the whole query as soon as the callback signals it is done.

use crate::aabb::Aabb3;
use crate::triangle::Triangle3;

/// Flow control returned by a traversal callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Keep visiting triangles.
    Continue,
    /// The query is fully resolved; terminate the whole traversal.
    Stop,
}

/// Query contract for a spatial index over mesh triangles.
pub trait SpatialIndex {
    /// Visit every triangle inside bounding volumes admitted by `admit`.
    ///
    /// `visit` receives the triangle's mesh index and its geometry; it may
    /// return [`Traversal::Stop`] to terminate the query early. Volumes
    /// for which `admit` returns false are pruned along with everything
    /// beneath them.
    fn traverse(
        &self,
        admit: &dyn Fn(&Aabb3) -> bool,
        visit: &mut dyn FnMut(u32, &Triangle3) -> Traversal,
    );
}
