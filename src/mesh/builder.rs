//! Builder for polygon surface meshes.

use bevy::math::DVec3;

use super::SurfaceMesh;

/// Builder for creating [`SurfaceMesh`] instances.
///
/// # Example
/// ```
/// use bevy::math::DVec3;
/// use bevy_texture_layers::mesh::{MeshGeometry, SurfaceMeshBuilder};
///
/// let mesh = SurfaceMeshBuilder::new()
///     .with_vertex(DVec3::new(0.0, 0.0, 0.0))
///     .with_vertex(DVec3::new(1.0, 0.0, 0.0))
///     .with_vertex(DVec3::new(1.0, 1.0, 0.0))
///     .with_vertex(DVec3::new(0.0, 1.0, 0.0))
///     .with_face(&[0, 1, 2, 3])
///     .build()
///     .unwrap();
/// assert_eq!(mesh.face_count(), 1);
/// ```
#[derive(Default)]
pub struct SurfaceMeshBuilder {
    vertices: Vec<DVec3>,
    faces: Vec<Vec<usize>>,
}

impl SurfaceMeshBuilder {
    /// Create a new empty mesh builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    pub fn with_vertex(mut self, position: impl Into<DVec3>) -> Self {
        self.push_vertex(position.into());
        self
    }

    /// Add a vertex (mutable version for loops).
    pub fn push_vertex(&mut self, position: DVec3) -> usize {
        self.vertices.push(position);
        self.vertices.len() - 1
    }

    pub fn with_face(mut self, vertices: &[usize]) -> Self {
        self.push_face(vertices);
        self
    }

    pub fn push_face(&mut self, vertices: &[usize]) {
        self.faces.push(vertices.to_vec());
    }

    pub fn push_triangle(&mut self, a: usize, b: usize, c: usize) {
        self.faces.push(vec![a, b, c]);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Build the final mesh.
    ///
    /// Returns `None` if there are no faces, or if a face is degenerate or
    /// references a missing vertex.
    pub fn build(self) -> Option<SurfaceMesh> {
        if self.faces.is_empty() {
            return None;
        }
        SurfaceMesh::new(self.vertices, self.faces)
    }
}
