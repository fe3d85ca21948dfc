//! Geometry the mappings read: vertex positions, faces and bounds.
//!
//! The mesh data structures themselves belong to the host application; this
//! module defines the [`MeshGeometry`] contract mappings consume, a simple
//! polygon mesh implementing it, and the triangulated [`RenderMesh`] that
//! rendering triangles are built from.

mod attributes;
mod builder;
mod render;

pub use attributes::ATTRIBUTE_SURFACE_SCALARS;
pub use builder::SurfaceMeshBuilder;
pub use render::RenderMesh;

use std::fmt;

use bevy::math::{DVec3, Vec3};
use bevy::mesh::{Mesh, PrimitiveTopology};
use bevy::prelude::*;

/// Axis-aligned bounds of an object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Reflect)]
pub struct BoundingBox {
    pub min: DVec3,
    pub max: DVec3,
}

impl BoundingBox {
    pub const fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Bounds of a point set. An empty set yields a zero-size box at the origin.
    pub fn from_points(points: &[DVec3]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        points.iter().fold(Self::new(*first, *first), |b, p| {
            Self::new(b.min.min(*p), b.max.max(*p))
        })
    }

    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    pub fn corners(&self) -> [DVec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            DVec3::new(a.x, a.y, a.z),
            DVec3::new(b.x, a.y, a.z),
            DVec3::new(a.x, b.y, a.z),
            DVec3::new(b.x, b.y, a.z),
            DVec3::new(a.x, a.y, b.z),
            DVec3::new(b.x, a.y, b.z),
            DVec3::new(a.x, b.y, b.z),
            DVec3::new(b.x, b.y, b.z),
        ]
    }
}

/// Read-only geometry of a textured object.
pub trait MeshGeometry: fmt::Debug + Send + Sync {
    fn vertices(&self) -> &[DVec3];

    fn face_count(&self) -> usize;

    /// Vertex indices of one face, in winding order.
    fn face(&self, index: usize) -> &[usize];

    fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(self.vertices())
    }
}

/// A polygon mesh whose faces may have different vertex counts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceMesh {
    vertices: Vec<DVec3>,
    faces: Vec<Vec<usize>>,
}

impl SurfaceMesh {
    /// Creates a mesh, returning `None` if a face has fewer than three
    /// vertices or references a missing one.
    pub fn new(vertices: Vec<DVec3>, faces: Vec<Vec<usize>>) -> Option<Self> {
        let valid = faces
            .iter()
            .all(|f| f.len() >= 3 && f.iter().all(|&v| v < vertices.len()));
        valid.then_some(Self { vertices, faces })
    }

    /// Reads positions and triangle indices from a Bevy triangle-list mesh.
    ///
    /// Non-indexed meshes are read as consecutive vertex triples.
    pub fn from_mesh(mesh: &Mesh) -> Option<Self> {
        if mesh.primitive_topology() != PrimitiveTopology::TriangleList {
            return None;
        }
        let positions = mesh.attribute(Mesh::ATTRIBUTE_POSITION)?.as_float3()?;
        let vertices: Vec<DVec3> = positions
            .iter()
            .map(|p| Vec3::from(*p).as_dvec3())
            .collect();

        let faces = match mesh.indices() {
            Some(indices) => indices
                .iter()
                .collect::<Vec<_>>()
                .chunks_exact(3)
                .map(<[usize]>::to_vec)
                .collect(),
            None => (0..vertices.len() / 3)
                .map(|i| vec![3 * i, 3 * i + 1, 3 * i + 2])
                .collect(),
        };
        Self::new(vertices, faces)
    }

    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    /// Vertex counts of every face, the layout face-vertex stores follow.
    pub fn face_vertex_counts(&self) -> Vec<usize> {
        self.faces.iter().map(Vec::len).collect()
    }
}

impl MeshGeometry for SurfaceMesh {
    fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn face(&self, index: usize) -> &[usize] {
        &self.faces[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::asset::RenderAssetUsages;
    use bevy::mesh::Indices;

    #[test]
    fn test_bounds() {
        let b = BoundingBox::from_points(&[
            DVec3::new(1.0, -2.0, 0.0),
            DVec3::new(-1.0, 4.0, 3.0),
            DVec3::new(0.0, 0.0, -1.0),
        ]);
        assert_eq!(b.min, DVec3::new(-1.0, -2.0, -1.0));
        assert_eq!(b.max, DVec3::new(1.0, 4.0, 3.0));
        assert_eq!(b.size(), DVec3::new(2.0, 6.0, 4.0));
        assert_eq!(b.center(), DVec3::new(0.0, 1.0, 1.0));
        assert_eq!(BoundingBox::from_points(&[]), BoundingBox::default());
    }

    #[test]
    fn test_invalid_faces_rejected() {
        let v = vec![DVec3::ZERO, DVec3::X, DVec3::Y];
        assert!(SurfaceMesh::new(v.clone(), vec![vec![0, 1]]).is_none());
        assert!(SurfaceMesh::new(v.clone(), vec![vec![0, 1, 3]]).is_none());
        assert!(SurfaceMesh::new(v, vec![vec![0, 1, 2]]).is_some());
    }

    #[test]
    fn test_from_bevy_mesh() {
        let mut mesh = Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::default(),
        );
        mesh.insert_attribute(
            Mesh::ATTRIBUTE_POSITION,
            vec![[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        );
        mesh.insert_indices(Indices::U32(vec![0, 1, 2, 0, 2, 3]));

        let surface = SurfaceMesh::from_mesh(&mesh).unwrap();
        assert_eq!(surface.vertices().len(), 4);
        assert_eq!(surface.face_count(), 2);
        assert_eq!(surface.face(1), &[0, 2, 3]);
        assert_eq!(surface.bounds().max, DVec3::new(1.0, 1.0, 0.0));
    }
}
