//! Custom vertex attributes for baked surface properties.

use bevy::mesh::MeshVertexAttribute;
use bevy::render::render_resource::VertexFormat;

/// Vertex attribute holding baked `(roughness, cloudiness)` per vertex.
///
/// Baked diffuse color and opacity go into [`Mesh::ATTRIBUTE_COLOR`];
/// this attribute carries the two scalar properties alongside it.
///
/// [`Mesh::ATTRIBUTE_COLOR`]: bevy::mesh::Mesh::ATTRIBUTE_COLOR
pub const ATTRIBUTE_SURFACE_SCALARS: MeshVertexAttribute =
    MeshVertexAttribute::new("SurfaceScalars", 988540930, VertexFormat::Float32x2);
