//! Baking evaluated surface properties into per-vertex GPU data.

use bevy::math::{Vec2, Vec4};
use bevy::mesh::Mesh;
use bevy::render::render_resource::ShaderType;
use bytemuck::{Pod, Zeroable};

use crate::mapping::TextureMapping;
use crate::mesh::{ATTRIBUTE_SURFACE_SCALARS, RenderMesh};
use crate::surface::{Rgb, SurfaceSpec};
use crate::triangle::{BarycentricSample, RenderingTriangle};

/// GPU-side representation of one baked surface sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, ShaderType, Pod, Zeroable)]
#[repr(C)]
pub struct SurfaceSampleGpu {
    /// Diffuse color; alpha is the mean opacity.
    pub diffuse: Vec4,

    pub specular: Vec4,

    pub emissive: Vec4,

    pub roughness: f32,

    pub cloudiness: f32,

    pub _padding: Vec2,
}

fn rgba(color: Rgb, alpha: f32) -> Vec4 {
    Vec4::new(color.red, color.green, color.blue, alpha)
}

impl From<&SurfaceSpec> for SurfaceSampleGpu {
    fn from(spec: &SurfaceSpec) -> Self {
        Self {
            diffuse: rgba(spec.diffuse, 1.0 - spec.transparent.average()),
            specular: rgba(spec.specular, 1.0),
            emissive: rgba(spec.emissive, 1.0),
            roughness: spec.roughness as f32,
            cloudiness: spec.cloudiness as f32,
            _padding: Vec2::ZERO,
        }
    }
}

/// Evaluates `mapping` at every vertex of `mesh` through its rendering
/// triangles, viewed from the front.
///
/// Each vertex is sampled at the first triangle that uses it; vertices no
/// triangle references bake as [`SurfaceSpec::NONE`].
pub fn bake_vertex_samples(
    mesh: &RenderMesh,
    mapping: &dyn TextureMapping,
    size: f64,
    time: f64,
) -> Vec<SurfaceSampleGpu> {
    let mut specs = vec![SurfaceSpec::NONE; mesh.vertices().len()];
    let mut baked = vec![false; specs.len()];
    let mut params = Vec::new();

    for (t, triangle) in mesh.map_triangles(mapping).iter().enumerate() {
        for (corner, &vertex) in mesh.triangles()[t].iter().enumerate() {
            if baked[vertex] {
                continue;
            }
            let mut weights = [0.0; 3];
            weights[corner] = 1.0;
            let [u, v, w] = weights;
            mesh.sample_params(t, u, v, w, &mut params);
            triangle.spec(
                &mut specs[vertex],
                &BarycentricSample::new(1.0, u, v, w, size, time, &params),
            );
            baked[vertex] = true;
        }
    }
    specs.iter().map(SurfaceSampleGpu::from).collect()
}

/// Views baked samples as raw bytes for a GPU buffer.
pub fn as_bytes(samples: &[SurfaceSampleGpu]) -> &[u8] {
    bytemuck::cast_slice(samples)
}

/// Extension trait for writing baked surface samples into a Bevy mesh.
pub trait MeshSurfaceExt {
    /// Stores diffuse color and opacity in [`Mesh::ATTRIBUTE_COLOR`] and
    /// roughness and cloudiness in [`ATTRIBUTE_SURFACE_SCALARS`].
    ///
    /// # Panics
    /// Panics if `samples.len()` doesn't match the vertex count.
    fn with_baked_surface(self, samples: &[SurfaceSampleGpu]) -> Self;
}

impl MeshSurfaceExt for Mesh {
    fn with_baked_surface(mut self, samples: &[SurfaceSampleGpu]) -> Self {
        let vertex_count = self
            .attribute(Mesh::ATTRIBUTE_POSITION)
            .map(|a| a.len())
            .unwrap_or(0);

        assert_eq!(
            samples.len(),
            vertex_count,
            "Sample count ({}) must match vertex count ({})",
            samples.len(),
            vertex_count
        );

        let colors: Vec<[f32; 4]> = samples.iter().map(|s| s.diffuse.to_array()).collect();
        let scalars: Vec<[f32; 2]> = samples
            .iter()
            .map(|s| [s.roughness, s.cloudiness])
            .collect();

        self.insert_attribute(Mesh::ATTRIBUTE_COLOR, colors);
        self.insert_attribute(ATTRIBUTE_SURFACE_SCALARS, scalars);
        self
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bevy::asset::RenderAssetUsages;
    use bevy::math::DVec3;
    use bevy::mesh::{Indices, PrimitiveTopology};

    use super::*;
    use crate::assign::{TextureAssignment, TexturingSettings};
    use crate::mapping::tests_support::triangle_mesh;
    use crate::mesh::{MeshGeometry, SurfaceMesh};
    use crate::texture::testing::GradientTexture;
    use crate::texture::{Texture, UniformTexture};

    #[test]
    fn test_gpu_layout() {
        assert_eq!(std::mem::size_of::<SurfaceSampleGpu>(), 64);
        let samples = [SurfaceSampleGpu::default(); 3];
        assert_eq!(as_bytes(&samples).len(), 192);
    }

    #[test]
    fn test_conversion() {
        let spec = SurfaceSpec {
            diffuse: Rgb::new(0.2, 0.4, 0.6),
            transparent: Rgb::new(0.1, 0.2, 0.3),
            roughness: 0.25,
            ..SurfaceSpec::NONE
        };
        let gpu = SurfaceSampleGpu::from(&spec);
        assert!((gpu.diffuse.w - 0.8).abs() < 1e-6);
        assert!((gpu.diffuse.y - 0.4).abs() < 1e-6);
        assert_eq!(gpu.roughness, 0.25);
    }

    #[test]
    fn test_bake_solid_gradient() {
        let texture: Arc<dyn Texture> = Arc::new(GradientTexture::solid());
        let assignment =
            TextureAssignment::assign(texture, triangle_mesh(), &TexturingSettings::default());
        let mesh = assignment.render_mesh();
        let samples = bake_vertex_samples(&mesh, assignment.mapping(), 0.0, 0.0);
        assert_eq!(samples.len(), 3);
        // diffuse reports the texture-space point, which is the vertex itself
        assert!((samples[1].diffuse.x - 2.0).abs() < 1e-6);
        assert!((samples[2].diffuse.y - 4.0).abs() < 1e-6);
        assert!((samples[0].roughness - 0.5).abs() < 1e-6);
        assert!((samples[0].diffuse.w - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_bake_into_bevy_mesh() {
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
        mesh.insert_attribute(
            Mesh::ATTRIBUTE_POSITION,
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
        );
        mesh.insert_indices(Indices::U32(vec![0, 1, 2, 2, 1, 3]));
        let geometry = Arc::new(SurfaceMesh::from_mesh(&mesh).unwrap());
        assert_eq!(geometry.vertices()[3], DVec3::new(1.0, 1.0, 0.0));

        let texture: Arc<dyn Texture> =
            Arc::new(UniformTexture::colored("teal", Rgb::new(0.0, 0.5, 0.5)));
        let assignment =
            TextureAssignment::assign(texture, geometry, &TexturingSettings::default());
        let samples = bake_vertex_samples(&assignment.render_mesh(), assignment.mapping(), 0.0, 0.0);
        let mesh = mesh.with_baked_surface(&samples);

        let colors = mesh.attribute(Mesh::ATTRIBUTE_COLOR).unwrap();
        assert_eq!(colors.len(), 4);
        assert!(mesh.attribute(ATTRIBUTE_SURFACE_SCALARS).is_some());
        assert!(samples.iter().all(|s| (s.diffuse.y - 0.5).abs() < 1e-6));
    }
}
