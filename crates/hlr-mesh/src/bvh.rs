//! Bounding volume hierarchy over mesh triangles.
//!
//! Uses Surface Area Heuristic (SAH) for construction. This is the stock
//! [`SpatialIndex`] implementation; the engine accepts any index honoring
//! the traversal contract.

use crate::aabb::Aabb3;
use crate::index::{SpatialIndex, Traversal};
use crate::mesh::TriangleMesh;
use crate::triangle::Triangle3;
use hlr_math::Point3;

/// A BVH node - either a leaf containing triangles or an internal node
/// with two children.
#[derive(Debug, Clone)]
enum BvhNode {
    /// Leaf node containing triangle indices.
    Leaf {
        /// Axis-aligned bounding box of this node.
        aabb: Aabb3,
        /// Mesh triangle indices contained in this leaf.
        tris: Vec<u32>,
    },
    /// Internal node with two children.
    Internal {
        /// Axis-aligned bounding box of this node.
        aabb: Aabb3,
        /// Left child node.
        left: Box<BvhNode>,
        /// Right child node.
        right: Box<BvhNode>,
    },
}

/// Bounding volume hierarchy for accelerated triangle queries.
#[derive(Debug, Clone)]
pub struct Bvh {
    root: Option<BvhNode>,
    triangles: Vec<Triangle3>,
}

impl Bvh {
    /// Build a BVH over all triangles of a mesh using SAH construction.
    pub fn build(mesh: &TriangleMesh) -> Self {
        let triangles: Vec<Triangle3> = mesh.triangles().collect();

        let mut tri_data: Vec<(u32, Aabb3, Point3)> = triangles
            .iter()
            .enumerate()
            .map(|(i, tri)| {
                let aabb = tri.aabb();
                (i as u32, aabb, aabb.center())
            })
            .collect();

        let root = if tri_data.is_empty() {
            None
        } else {
            Some(build_node(&mut tri_data))
        };

        Self { root, triangles }
    }

    /// Number of triangles held by the index.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Bounding box of the whole mesh, if non-empty.
    pub fn bounds(&self) -> Option<Aabb3> {
        self.root.as_ref().map(node_aabb)
    }

    fn visit_node(
        &self,
        node: &BvhNode,
        admit: &dyn Fn(&Aabb3) -> bool,
        visit: &mut dyn FnMut(u32, &Triangle3) -> Traversal,
    ) -> Traversal {
        match node {
            BvhNode::Leaf { aabb, tris } => {
                if !admit(aabb) {
                    return Traversal::Continue;
                }
                for &t in tris {
                    if visit(t, &self.triangles[t as usize]) == Traversal::Stop {
                        return Traversal::Stop;
                    }
                }
                Traversal::Continue
            }
            BvhNode::Internal { aabb, left, right } => {
                if !admit(aabb) {
                    return Traversal::Continue;
                }
                if self.visit_node(left, admit, visit) == Traversal::Stop {
                    return Traversal::Stop;
                }
                self.visit_node(right, admit, visit)
            }
        }
    }
}

impl SpatialIndex for Bvh {
    fn traverse(
        &self,
        admit: &dyn Fn(&Aabb3) -> bool,
        visit: &mut dyn FnMut(u32, &Triangle3) -> Traversal,
    ) {
        if let Some(ref root) = self.root {
            self.visit_node(root, admit, visit);
        }
    }
}

/// Get the AABB of a node.
fn node_aabb(node: &BvhNode) -> Aabb3 {
    match node {
        BvhNode::Leaf { aabb, .. } => *aabb,
        BvhNode::Internal { aabb, .. } => *aabb,
    }
}

/// Build a BVH node recursively using SAH.
fn build_node(tri_data: &mut [(u32, Aabb3, Point3)]) -> BvhNode {
    // Compute bounds of all triangles
    let mut bounds = Aabb3::empty();
    for (_, aabb, _) in tri_data.iter() {
        bounds.include(aabb);
    }

    // Base case: small number of triangles -> leaf
    if tri_data.len() <= 4 {
        return BvhNode::Leaf {
            aabb: bounds,
            tris: tri_data.iter().map(|(id, _, _)| *id).collect(),
        };
    }

    // Find best split using SAH
    let (best_axis, best_pos) = find_best_split(tri_data, &bounds);

    // Partition triangles
    let mid = partition_tris(tri_data, best_axis, best_pos);

    // Fallback if partition fails
    let mid = if mid == 0 || mid == tri_data.len() {
        tri_data.len() / 2
    } else {
        mid
    };

    let (left_data, right_data) = tri_data.split_at_mut(mid);

    BvhNode::Internal {
        aabb: bounds,
        left: Box::new(build_node(left_data)),
        right: Box::new(build_node(right_data)),
    }
}

/// Find the best split axis and position using SAH.
fn find_best_split(tri_data: &[(u32, Aabb3, Point3)], bounds: &Aabb3) -> (usize, f64) {
    const NUM_BUCKETS: usize = 12;

    let extent = bounds.max - bounds.min;

    let mut best_cost = f64::INFINITY;
    let mut best_axis = 0;
    let mut best_pos = 0.0;

    // Try each axis
    for axis in 0..3 {
        let axis_extent = extent[axis];
        if axis_extent < 1e-10 {
            continue;
        }
        let axis_min = bounds.min.coords[axis];

        // Initialize buckets
        let mut bucket_counts = [0usize; NUM_BUCKETS];
        let mut bucket_bounds = [Aabb3::empty(); NUM_BUCKETS];

        // Assign triangles to buckets by centroid
        for (_, aabb, centroid) in tri_data {
            let c = centroid.coords[axis];
            let b = ((c - axis_min) / axis_extent * NUM_BUCKETS as f64) as usize;
            let b = b.min(NUM_BUCKETS - 1);

            bucket_counts[b] += 1;
            bucket_bounds[b].include(aabb);
        }

        // Sweep to find best split
        for split in 1..NUM_BUCKETS {
            let mut left_count = 0;
            let mut left_bounds = Aabb3::empty();
            for i in 0..split {
                left_count += bucket_counts[i];
                if bucket_counts[i] > 0 {
                    left_bounds.include(&bucket_bounds[i]);
                }
            }

            let mut right_count = 0;
            let mut right_bounds = Aabb3::empty();
            for i in split..NUM_BUCKETS {
                right_count += bucket_counts[i];
                if bucket_counts[i] > 0 {
                    right_bounds.include(&bucket_bounds[i]);
                }
            }

            if left_count == 0 || right_count == 0 {
                continue;
            }

            // SAH cost: traversal + P(left) * N_left + P(right) * N_right
            let total_area = surface_area(bounds);
            let cost = 0.125
                + surface_area(&left_bounds) / total_area * left_count as f64
                + surface_area(&right_bounds) / total_area * right_count as f64;

            if cost < best_cost {
                best_cost = cost;
                best_axis = axis;
                best_pos = axis_min + (split as f64 / NUM_BUCKETS as f64) * axis_extent;
            }
        }
    }

    (best_axis, best_pos)
}

/// Partition triangles by centroid along an axis.
fn partition_tris(tri_data: &mut [(u32, Aabb3, Point3)], axis: usize, pos: f64) -> usize {
    let mut left = 0;
    let mut right = tri_data.len();

    while left < right {
        if tri_data[left].2.coords[axis] < pos {
            left += 1;
        } else {
            right -= 1;
            tri_data.swap(left, right);
        }
    }

    left
}

/// Compute surface area of an AABB.
fn surface_area(aabb: &Aabb3) -> f64 {
    if aabb.is_empty() {
        return 0.0;
    }
    let d = aabb.max - aabb.min;
    2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A 4x4 grid of triangles in the z=0 plane (32 triangles).
    fn grid_mesh() -> TriangleMesh {
        let mut positions = Vec::new();
        for i in 0..4 {
            for j in 0..4 {
                let (x, y) = (i as f32, j as f32);
                positions.extend_from_slice(&[
                    x, y, 0.0, x + 1.0, y, 0.0, x + 1.0, y + 1.0, 0.0, //
                    x, y, 0.0, x + 1.0, y + 1.0, 0.0, x, y + 1.0, 0.0,
                ]);
            }
        }
        TriangleMesh::new(positions, Vec::new())
    }

    #[test]
    fn test_build_and_bounds() {
        let bvh = Bvh::build(&grid_mesh());
        assert_eq!(bvh.num_triangles(), 32);
        let bounds = bvh.bounds().unwrap();
        assert_eq!(bounds.min.x, 0.0);
        assert_eq!(bounds.max.y, 4.0);
    }

    #[test]
    fn test_traverse_visits_admitted_region_only() {
        let bvh = Bvh::build(&grid_mesh());
        let query = Aabb3::new(Point3::new(0.25, 0.25, -1.0), Point3::new(0.75, 0.75, 1.0));
        let mut visited = Vec::new();
        bvh.traverse(&|aabb| aabb.overlaps(&query), &mut |i, _| {
            visited.push(i);
            Traversal::Continue
        });
        // The two triangles of cell (0,0) must be among the visits; far
        // cells must be pruned.
        assert!(visited.contains(&0));
        assert!(visited.contains(&1));
        assert!(visited.len() < 32);
    }

    #[test]
    fn test_traverse_early_exit() {
        let bvh = Bvh::build(&grid_mesh());
        let mut count = 0;
        bvh.traverse(&|_| true, &mut |_, _| {
            count += 1;
            if count == 3 {
                Traversal::Stop
            } else {
                Traversal::Continue
            }
        });
        assert_eq!(count, 3);
    }

    #[test]
    fn test_empty_mesh() {
        let bvh = Bvh::build(&TriangleMesh::default());
        assert!(bvh.bounds().is_none());
        let mut visited = 0;
        bvh.traverse(&|_| true, &mut |_, _| {
            visited += 1;
            Traversal::Continue
        });
        assert_eq!(visited, 0);
    }
}
