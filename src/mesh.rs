use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::{
    error::{ReliefError, Result},
    types::{Point, Value, Vector},
    wrap::PointTransform,
};

/// Flat-shaded triangle soup for a relief shape.
///
/// Vertices are stored flat — every group of three consecutive vertices forms
/// one triangle. Call [`create_triangles`](ReliefMesh::create_triangles) then
/// [`create_normals`](ReliefMesh::create_normals) after populating vertices.
///
/// This is the hand-over format between a shape constructor (which produces
/// the planar relief) and the wrap stage (which bends every vertex).
#[derive(Clone, Default)]
pub struct ReliefMesh {
    /// Flat list of vertex positions.
    pub vertices: Vec<Point>,

    /// Triangle index triples into `vertices`.
    pub tris: Vec<[usize; 3]>,

    /// Per-vertex face normals.
    pub normals: Vec<[Value; 3]>,
}

impl ReliefMesh {
    /// Creates an empty mesh with no vertices, triangles, or normals.
    pub fn new_empty() -> Self {
        Self::default()
    }

    /// Creates a mesh from a flat vertex soup and groups it into triangles.
    ///
    /// Vertex count must be a multiple of 3.
    pub fn from_vertices(vertices: Vec<Point>) -> Result<Self> {
        let mut mesh = Self {
            vertices,
            ..Default::default()
        };
        mesh.create_triangles()?;
        mesh.create_normals();
        Ok(mesh)
    }

    /// Adds a triangle defined by three vertex indices.
    ///
    /// Returns [`ReliefError::InvalidIndex`] if any index is out of bounds.
    pub fn triangle_from_verts(&mut self, a: usize, b: usize, c: usize) -> Result<()> {
        if self.vertices.len() <= a.max(b.max(c)) {
            return Err(ReliefError::InvalidIndex);
        }
        self.tris.push([a, b, c]);
        Ok(())
    }

    /// Computes the face normal for triangle `tri`.
    ///
    /// Returns the zero vector if the triangle is degenerate.
    pub fn tri_normal(&self, tri: usize) -> Vector {
        let va = self.vertices[self.tris[tri][0]];
        let vb = self.vertices[self.tris[tri][1]];
        let vc = self.vertices[self.tris[tri][2]];

        let cross = (vb - va).cross(&(vc - vb));

        let nrm = cross.norm();
        if nrm == 0.0 {
            Vector::new(0.0, 0.0, 0.0)
        } else {
            cross / nrm
        }
    }

    /// Generates triangles by grouping every three consecutive vertices.
    ///
    /// Vertex count must be a multiple of 3.
    pub fn create_triangles(&mut self) -> Result<()> {
        if self.vertices.len() % 3 != 0 {
            return Err(ReliefError::InvalidIndex);
        }
        self.tris.clear();
        let mut v = 0;
        while v < self.vertices.len() {
            self.tris.push([v, v + 1, v + 2]);
            v += 3;
        }
        Ok(())
    }

    /// Computes and stores face normals, one per vertex (three per triangle).
    ///
    /// Replaces any previously stored normals.
    /// Must be called after [`create_triangles`](ReliefMesh::create_triangles).
    pub fn create_normals(&mut self) {
        self.normals.clear();
        for tri in 0..self.tris.len() {
            let normal = self.tri_normal(tri);
            let n = [normal.x, normal.y, normal.z];
            // One face normal per vertex of the triangle (flat shading).
            self.normals.push(n);
            self.normals.push(n);
            self.normals.push(n);
        }
    }

    /// Applies `transform` to every vertex, in parallel.
    ///
    /// Each vertex is mapped independently, so the result does not depend on
    /// traversal order. A bend invalidates face normals, so any stored
    /// normals are recomputed afterwards.
    pub fn remap(&mut self, transform: &impl PointTransform) {
        self.vertices = self
            .vertices
            .par_iter()
            .map(|&p| transform.apply(p))
            .collect();
        if !self.normals.is_empty() {
            self.create_normals();
        }
    }

    /// Moves the mesh into flat GPU-ready buffers:
    /// `(positions, normals, indices)`.
    pub fn into_buffers(self) -> (Vec<[Value; 3]>, Vec<[Value; 3]>, Vec<u32>) {
        let positions: Vec<[Value; 3]> = self.vertices.iter().map(|p| [p.x, p.y, p.z]).collect();
        let indices: Vec<u32> = self
            .tris
            .iter()
            .flat_map(|t| t.iter().map(|&i| i as u32))
            .collect();
        (positions, self.normals, indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wrap::CylinderWrap;

    fn unit_triangle() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn triangles_group_in_threes() {
        let mesh = ReliefMesh::from_vertices(unit_triangle()).unwrap();
        assert_eq!(mesh.tris, vec![[0, 1, 2]]);
        assert_eq!(mesh.normals.len(), 3);
    }

    #[test]
    fn ragged_vertex_count_is_rejected() {
        let mut verts = unit_triangle();
        verts.pop();
        assert!(ReliefMesh::from_vertices(verts).is_err());
    }

    #[test]
    fn flat_triangle_normal_points_up() {
        let mesh = ReliefMesh::from_vertices(unit_triangle()).unwrap();
        let n = mesh.tri_normal(0);
        assert!((n - Vector::new(0.0, 0.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn degenerate_triangle_normal_is_zero() {
        let p = Point::new(1.0, 1.0, 1.0);
        let mesh = ReliefMesh::from_vertices(vec![p, p, p]).unwrap();
        assert_eq!(mesh.tri_normal(0), Vector::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn remap_applies_transform_per_vertex() {
        let mut mesh = ReliefMesh::from_vertices(unit_triangle()).unwrap();
        let wrap = CylinderWrap::default();
        mesh.remap(&wrap);

        assert_eq!(mesh.vertices.len(), 3);
        for (out, original) in mesh.vertices.iter().zip(unit_triangle()) {
            let expected = wrap.apply(original);
            assert!((*out - expected).norm() < 1e-6);
        }
        // Normals were rebuilt to match the bent geometry.
        assert_eq!(mesh.normals.len(), 3);
    }

    #[test]
    fn out_of_bounds_triangle_index() {
        let mut mesh = ReliefMesh::from_vertices(unit_triangle()).unwrap();
        assert!(mesh.triangle_from_verts(0, 1, 3).is_err());
    }
}
