//! # bevy_texture_layers
//!
//! Surface properties for textured objects: coordinate mappings that carry
//! surface positions into a texture's native space, per-triangle
//! precomputation for fast rendering, and front-to-back compositing of
//! layered textures.
//!
//! ## Features
//!
//! - Uniform, projection, linear 3D, spherical, cylindrical and UV mappings
//! - Constant, per-vertex and per-face-vertex parameter stores
//! - Rendering triangles evaluated at barycentric coordinates
//! - Layer stacks with blend, overlay-blend-bumps and overlay-add-bumps modes
//! - Versioned binary persistence of mappings and parameter stores
//! - Baking evaluated properties into Bevy mesh attributes
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use bevy::prelude::*;
//! use bevy_texture_layers::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(TextureLayersPlugin)
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(mut meshes: ResMut<Assets<Mesh>>, settings: Res<TexturingSettings>) {
//!     let mesh = Mesh::from(Cuboid::default());
//!     let object: Arc<dyn MeshGeometry> = Arc::new(SurfaceMesh::from_mesh(&mesh).unwrap());
//!
//!     // Two layers: half-covering red paint over blue
//!     let mut assignment = TextureAssignment::assign(
//!         Arc::new(LayeredTexture::default()),
//!         object,
//!         &settings,
//!     );
//!     assignment.edit_layers(|layers| {
//!         layers.add_layer(Arc::new(UniformTexture::colored("blue", Rgb::new(0.0, 0.0, 1.0))), &settings);
//!         layers.add_layer(Arc::new(UniformTexture::colored("red", Rgb::new(1.0, 0.0, 0.0))), &settings);
//!     });
//!
//!     let samples = bake_vertex_samples(&assignment.render_mesh(), assignment.mapping(), 0.0, 0.0);
//!     meshes.add(mesh.with_baked_surface(&samples));
//! }
//! ```

pub mod assign;
pub mod bake;
pub mod mapping;
pub mod mesh;
pub mod param;
pub mod persist;
mod plugin;
pub mod surface;
pub mod texture;
pub mod triangle;

pub use plugin::TextureLayersPlugin;

pub mod prelude {
    pub use crate::assign::{TextureAssignment, TexturingSettings, create_mapping, default_mapping};
    pub use crate::bake::{MeshSurfaceExt, SurfaceSampleGpu, bake_vertex_samples};
    pub use crate::mapping::{
        BlendMode, CylindricalMapping, FaceSide, LayeredMapping, Linear3DMapping, MappingKind,
        MappingRegistry, Orientation, ProjectionMapping, SampleContext, SphericalMapping,
        TextureMapping, UniformMapping, UvMapping,
    };
    pub use crate::mesh::{
        ATTRIBUTE_SURFACE_SCALARS, MeshGeometry, RenderMesh, SurfaceMesh, SurfaceMeshBuilder,
    };
    pub use crate::param::{ParamId, ParameterValue, TextureParameter};
    pub use crate::persist::{PersistError, TextureRegistry};
    pub use crate::plugin::TextureLayersPlugin;
    pub use crate::surface::{Rgb, SurfaceSpec};
    pub use crate::texture::{LayeredTexture, Texture, TextureDomain, UniformTexture};
    pub use crate::triangle::{BarycentricSample, RenderingTriangle};
}
