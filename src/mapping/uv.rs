//! Explicit, surface-authored texture coordinates.

use std::sync::{Arc, OnceLock};

use bevy::math::{DVec2, DVec3};

use super::{
    FaceSide, MappingCore, MappingKind, SampleContext, TextureMapping, bound_channels,
    default_values, delegate_core, vertex_channels,
};
use crate::mesh::MeshGeometry;
use crate::param::{
    FaceVertexValues, ParamKind, ParameterValue, TextureParameter, UNASSIGNED_COORDINATE,
};
use crate::persist::{DataReader, DataWriter, PersistError, TextureRegistry, read_version};
use crate::surface::{Rgb, SurfaceSpec};
use crate::texture::Texture;
use crate::triangle::{RenderingTriangle, TriangleSource, UvTriangle};

const RECORD: &str = "uv mapping";
const VERSION: i16 = 0;

/// Reads `(u, v)` from two coordinate parameters the mesh carries.
///
/// Where the coordinates are unassigned the vertex's `(x, y)` position is
/// used instead.
#[derive(Clone, Debug)]
pub struct UvMapping {
    core: MappingCore,
    coord_params: OnceLock<[TextureParameter; 2]>,
}

impl UvMapping {
    pub fn new(object: Arc<dyn MeshGeometry>, texture: Arc<dyn Texture>) -> Self {
        Self {
            core: MappingCore::new(object, texture),
            coord_params: OnceLock::new(),
        }
    }

    fn coord_params(&self) -> &[TextureParameter; 2] {
        self.coord_params.get_or_init(|| {
            [
                TextureParameter::coordinate("U", ParamKind::XCoordinate),
                TextureParameter::coordinate("V", ParamKind::YCoordinate),
            ]
        })
    }

    /// Per-vertex `U` and `V` stores for the given coordinates.
    pub fn vertex_coordinates(coords: &[DVec2]) -> [ParameterValue; 2] {
        [
            ParameterValue::Vertex(coords.iter().map(|c| c.x).collect()),
            ParameterValue::Vertex(coords.iter().map(|c| c.y).collect()),
        ]
    }

    /// Per-face-vertex `U` and `V` stores, for meshes with UV seams.
    pub fn face_vertex_coordinates(faces: &[Vec<DVec2>]) -> [ParameterValue; 2] {
        [
            ParameterValue::FaceVertex(FaceVertexValues::from_faces(
                faces.iter().map(|f| f.iter().map(|c| c.x).collect::<Vec<_>>()),
            )),
            ParameterValue::FaceVertex(FaceVertexValues::from_faces(
                faces.iter().map(|f| f.iter().map(|c| c.y).collect::<Vec<_>>()),
            )),
        ]
    }

    fn coord_at(&self, pos: DVec3, params: &[f64]) -> DVec2 {
        bound_channels::<2>(params, self.param_offset())
            .map(DVec2::from_array)
            .unwrap_or(pos.truncate())
    }

    fn texture_point(uv: DVec2, ctx: &SampleContext<'_>) -> (DVec3, DVec3) {
        (uv.extend(0.0), DVec3::new(ctx.size, ctx.size, 0.0))
    }

    pub fn read(
        input: &mut DataReader<'_>,
        object: Arc<dyn MeshGeometry>,
        texture: Arc<dyn Texture>,
    ) -> Result<Self, PersistError> {
        read_version(input, RECORD, 0, VERSION)?;
        let mut mapping = Self::new(object, texture);
        mapping.core.side = FaceSide::from_int(input.read_int()?)?;
        Ok(mapping)
    }
}

impl TextureMapping for UvMapping {
    delegate_core!();

    fn kind(&self) -> MappingKind {
        MappingKind::Uv
    }

    fn parameters(&self) -> Vec<TextureParameter> {
        let mut params = self.core.texture.parameters();
        params.extend(self.coord_params().iter().cloned());
        params
    }

    /// Without triangle context there is no coordinate gradient to carry a
    /// bump into world space, so the bump is reported as zero. Use
    /// [`map_triangle`](TextureMapping::map_triangle) for bumped UV textures.
    fn evaluate_spec(&self, spec: &mut SurfaceSpec, pos: DVec3, ctx: &SampleContext<'_>) {
        let (point, size) = Self::texture_point(self.coord_at(pos, ctx.params), ctx);
        self.core
            .texture
            .spec(spec, &ctx.texture_sample(point, size));
        spec.bump = DVec3::ZERO;
    }

    fn evaluate_transparency(&self, trans: &mut Rgb, pos: DVec3, ctx: &SampleContext<'_>) {
        let (point, size) = Self::texture_point(self.coord_at(pos, ctx.params), ctx);
        self.core
            .texture
            .transparency(trans, &ctx.texture_sample(point, size));
    }

    fn displacement(&self, pos: DVec3, ctx: &SampleContext<'_>) -> f64 {
        let (point, size) = Self::texture_point(self.coord_at(pos, ctx.params), ctx);
        self.core
            .texture
            .displacement(&ctx.texture_sample(point, size))
    }

    fn map_triangle<'a>(&'a self, source: &TriangleSource<'_>) -> Box<dyn RenderingTriangle + 'a> {
        let offset = self.param_offset();
        let u = source.corner_values(offset);
        let v = source.corner_values(offset + 1);
        let coords = [0, 1, 2].map(|c| {
            if u[c] == UNASSIGNED_COORDINATE {
                source.vertices[c].truncate()
            } else {
                DVec2::new(u[c], v[c])
            }
        });
        Box::new(UvTriangle::new(self, source.vertices, coords))
    }

    /// Planar `(x, y)` coordinates normalized to the object's bounds.
    fn initial_parameter_values(&self) -> Vec<ParameterValue> {
        let bounds = self.core.object.bounds();
        let size = bounds.size().truncate();
        let extent = DVec2::new(
            if size.x > 0.0 { size.x } else { 1.0 },
            if size.y > 0.0 { size.y } else { 1.0 },
        );
        let mut values = default_values(&self.core.texture.parameters());
        values.extend(vertex_channels(self.core.object.as_ref(), |p| {
            ((p - bounds.min).truncate() / extent).to_array()
        }));
        values
    }

    fn duplicate_for(
        &self,
        object: Arc<dyn MeshGeometry>,
        texture: Arc<dyn Texture>,
    ) -> Box<dyn TextureMapping> {
        Box::new(Self {
            core: self.core.duplicate_for(object, texture),
            coord_params: self.coord_params.clone(),
        })
    }

    fn write(&self, out: &mut DataWriter<'_>, _textures: &TextureRegistry) -> Result<(), PersistError> {
        out.write_short(VERSION)?;
        out.write_int(self.core.side.to_int())
    }
}
