//! Triangulated meshes ready for rendering.

use bevy::math::DVec3;

use super::MeshGeometry;
use crate::mapping::TextureMapping;
use crate::param::{FaceVertexValues, ParameterValue};
use crate::triangle::{RenderingTriangle, TriangleSource};

/// A fan-triangulated mesh with smooth vertex normals and the parameter
/// stores of the mapping that will render it.
///
/// Face-vertex stores are converted so that every triangle owns exactly
/// three corner values.
#[derive(Clone, Debug)]
pub struct RenderMesh {
    vertices: Vec<DVec3>,
    normals: Vec<DVec3>,
    triangles: Vec<[usize; 3]>,
    params: Vec<ParameterValue>,
}

impl RenderMesh {
    /// Triangulates `geometry`. `params` must line up with the parameter
    /// list of the mapping that will render the mesh.
    pub fn new(geometry: &dyn MeshGeometry, params: &[ParameterValue]) -> Self {
        let vertices = geometry.vertices().to_vec();
        let mut triangles = Vec::new();
        // (source face, corner indices within it) for every triangle
        let mut corners = Vec::new();

        for f in 0..geometry.face_count() {
            let face = geometry.face(f);
            for i in 1..face.len().saturating_sub(1) {
                triangles.push([face[0], face[i], face[i + 1]]);
                corners.push((f, [0, i, i + 1]));
            }
        }

        let params = params
            .iter()
            .map(|p| match p {
                ParameterValue::FaceVertex(fv) => {
                    ParameterValue::FaceVertex(FaceVertexValues::triangles(
                        corners
                            .iter()
                            .map(|&(f, c)| c.map(|corner| fv.value(f, corner)))
                            .collect(),
                    ))
                }
                other => other.clone(),
            })
            .collect();

        let normals = smooth_normals(&vertices, &triangles);
        Self {
            vertices,
            normals,
            triangles,
            params,
        }
    }

    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    pub fn normals(&self) -> &[DVec3] {
        &self.normals
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn params(&self) -> &[ParameterValue] {
        &self.params
    }

    /// Everything a mapping needs to precompute one rendering triangle.
    pub fn source(&self, triangle: usize) -> TriangleSource<'_> {
        let indices = self.triangles[triangle];
        TriangleSource {
            face: triangle,
            indices,
            vertices: indices.map(|i| self.vertices[i]),
            normals: indices.map(|i| self.normals[i]),
            params: &self.params,
        }
    }

    pub fn position(&self, triangle: usize, u: f64, v: f64, w: f64) -> DVec3 {
        let [a, b, c] = self.triangles[triangle];
        self.vertices[a] * u + self.vertices[b] * v + self.vertices[c] * w
    }

    /// Fills `out` with every parameter's value at barycentric `(u, v, w)`.
    pub fn sample_params(&self, triangle: usize, u: f64, v: f64, w: f64, out: &mut Vec<f64>) {
        let indices = self.triangles[triangle];
        out.clear();
        out.extend(
            self.params
                .iter()
                .map(|p| p.value_at(triangle, indices, u, v, w)),
        );
    }

    /// Every parameter's surface average.
    pub fn average_params(&self) -> Vec<f64> {
        self.params.iter().map(ParameterValue::average).collect()
    }

    /// Precomputes one rendering triangle per mesh triangle.
    pub fn map_triangles<'m>(
        &self,
        mapping: &'m dyn TextureMapping,
    ) -> Vec<Box<dyn RenderingTriangle + 'm>> {
        (0..self.triangle_count())
            .map(|t| mapping.map_triangle(&self.source(t)))
            .collect()
    }
}

fn smooth_normals(vertices: &[DVec3], triangles: &[[usize; 3]]) -> Vec<DVec3> {
    let mut normals = vec![DVec3::ZERO; vertices.len()];
    for &[a, b, c] in triangles {
        let n = (vertices[b] - vertices[a]).cross(vertices[c] - vertices[a]);
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }
    normals.iter_mut().for_each(|n| *n = n.normalize_or_zero());
    normals
}
