#![warn(missing_docs)]

//! Triangle mesh, spatial index, and feature-edge extraction for the
//! hidden-line-removal engine.
//!
//! This crate provides the geometry inputs the engine consumes:
//!
//! - [`TriangleMesh`]: flat vertex/index buffers as produced by tessellators
//! - [`Triangle3`]: a mesh triangle with its derived plane
//! - [`Bvh`]: an SAH-built bounding volume hierarchy implementing the
//!   [`SpatialIndex`] traversal contract
//! - [`extract_feature_edges`]: dihedral-angle feature edge detection,
//!   the usual source of candidate edges for hidden-line resolution

pub mod aabb;
pub mod bvh;
pub mod feature;
pub mod index;
pub mod mesh;
pub mod triangle;

pub use aabb::Aabb3;
pub use bvh::Bvh;
pub use feature::{extract_feature_edges, CandidateEdge, DEFAULT_FEATURE_ANGLE};
pub use index::{SpatialIndex, Traversal};
pub use mesh::TriangleMesh;
pub use triangle::Triangle3;
