//! Triangle mesh buffers.

use crate::triangle::Triangle3;
use hlr_math::Point3;

/// A triangle mesh as flat vertex/index buffers.
///
/// Positions are `f32` triples `[x0, y0, z0, x1, y1, z1, ...]`, the layout
/// tessellators and GPU pipelines exchange. The index buffer may be empty,
/// in which case every three consecutive positions form one triangle.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Flat array of vertex positions.
    pub positions: Vec<f32>,
    /// Flat array of triangle indices. Empty for non-indexed meshes.
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    /// Create a mesh from raw buffers.
    pub fn new(positions: Vec<f32>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    /// Number of vertices in the position buffer.
    pub fn num_vertices(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        if self.indices.is_empty() {
            self.num_vertices() / 3
        } else {
            self.indices.len() / 3
        }
    }

    /// True if the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.num_triangles() == 0
    }

    /// Vertex position by vertex index.
    pub fn vertex(&self, i: usize) -> Point3 {
        Point3::new(
            self.positions[i * 3] as f64,
            self.positions[i * 3 + 1] as f64,
            self.positions[i * 3 + 2] as f64,
        )
    }

    /// The three vertex indices of triangle `t`.
    pub fn triangle_indices(&self, t: usize) -> [u32; 3] {
        if self.indices.is_empty() {
            [(t * 3) as u32, (t * 3 + 1) as u32, (t * 3 + 2) as u32]
        } else {
            [
                self.indices[t * 3],
                self.indices[t * 3 + 1],
                self.indices[t * 3 + 2],
            ]
        }
    }

    /// Triangle `t` with its derived plane.
    pub fn triangle(&self, t: usize) -> Triangle3 {
        let [i0, i1, i2] = self.triangle_indices(t);
        Triangle3::new(
            self.vertex(i0 as usize),
            self.vertex(i1 as usize),
            self.vertex(i2 as usize),
        )
    }

    /// Iterate over all triangles.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle3> + '_ {
        (0..self.num_triangles()).map(|t| self.triangle(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_indexed_mesh() {
        let mesh = TriangleMesh::new(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0],
            vec![0, 1, 2, 1, 3, 2],
        );
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_triangles(), 2);
        let t = mesh.triangle(1);
        assert_relative_eq!(t.a.x, 1.0);
        assert_relative_eq!(t.b.y, 1.0);
    }

    #[test]
    fn test_non_indexed_mesh() {
        let mesh = TriangleMesh::new(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            Vec::new(),
        );
        assert_eq!(mesh.num_triangles(), 1);
        assert_eq!(mesh.triangle_indices(0), [0, 1, 2]);
        assert_relative_eq!(mesh.triangle(0).area(), 0.5);
    }

    #[test]
    fn test_empty_mesh() {
        assert!(TriangleMesh::default().is_empty());
    }
}
