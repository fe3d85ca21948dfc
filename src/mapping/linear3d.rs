//! Affine mapping into a solid texture's volume.

use std::sync::{Arc, OnceLock};

use bevy::math::DVec3;

use super::frame::LinearFrame;
use super::{
    FaceSide, MappingCore, MappingKind, Orientation, SampleContext, TextureMapping,
    bound_channels, bound_corners, default_values, delegate_core, vertex_channels,
};
use crate::mesh::MeshGeometry;
use crate::param::{ParamKind, ParameterValue, TextureParameter};
use crate::persist::{DataReader, DataWriter, PersistError, TextureRegistry, read_version};
use crate::surface::{Component, Rgb, SurfaceSpec};
use crate::texture::Texture;
use crate::triangle::{
    CoordinateSampler, CoordinateTriangle, RenderingTriangle, TriangleKind, TriangleSource,
    UvwTriangle,
};

const RECORD: &str = "linear3d mapping";
const VERSION: i16 = 1;

/// Maps positions through a rotated, scaled and offset frame into a solid
/// texture.
#[derive(Clone, Debug)]
pub struct Linear3DMapping {
    core: MappingCore,
    orientation: Orientation,
    scale: DVec3,
    center: DVec3,
    scale_to_object: bool,
    bind_to_surface: bool,
    coord_params: OnceLock<[TextureParameter; 3]>,
    frame: LinearFrame,
    transformed: bool,
}

impl Linear3DMapping {
    pub fn new(object: Arc<dyn MeshGeometry>, texture: Arc<dyn Texture>) -> Self {
        let mut mapping = Self {
            core: MappingCore::new(object, texture),
            orientation: Orientation::IDENTITY,
            scale: DVec3::ONE,
            center: DVec3::ZERO,
            scale_to_object: false,
            bind_to_surface: false,
            coord_params: OnceLock::new(),
            frame: LinearFrame {
                axes: [DVec3::X, DVec3::Y, DVec3::Z],
                offset: DVec3::ZERO,
            },
            transformed: false,
        };
        mapping.update_frame();
        mapping
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
        self.update_frame();
    }

    pub fn scale(&self) -> DVec3 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: DVec3) {
        self.scale = scale;
        self.update_frame();
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }

    pub fn set_center(&mut self, center: DVec3) {
        self.center = center;
        self.update_frame();
    }

    pub fn scale_to_object(&self) -> bool {
        self.scale_to_object
    }

    pub fn set_scale_to_object(&mut self, scale_to_object: bool) {
        self.scale_to_object = scale_to_object;
        self.update_frame();
    }

    pub fn bind_to_surface(&self) -> bool {
        self.bind_to_surface
    }

    pub fn set_bind_to_surface(&mut self, bind: bool) {
        self.bind_to_surface = bind;
    }

    /// Whether the frame differs from the identity, in which case bump
    /// gradients need re-expressing in world space.
    pub fn is_transformed(&self) -> bool {
        self.transformed
    }

    pub fn update_frame(&mut self) {
        let bounds = self.core.object.bounds();
        self.frame = LinearFrame::new(
            &self.orientation.basis(),
            self.scale,
            self.center,
            self.scale_to_object.then_some(&bounds),
        );
        self.transformed = !self.frame.is_identity();
    }

    pub fn transform(&self, pos: DVec3) -> DVec3 {
        self.frame.apply(pos)
    }

    fn coord_params(&self) -> &[TextureParameter; 3] {
        self.coord_params.get_or_init(|| {
            [
                TextureParameter::coordinate("X", ParamKind::XCoordinate),
                TextureParameter::coordinate("Y", ParamKind::YCoordinate),
                TextureParameter::coordinate("Z", ParamKind::ZCoordinate),
            ]
        })
    }

    pub fn read(
        input: &mut DataReader<'_>,
        object: Arc<dyn MeshGeometry>,
        texture: Arc<dyn Texture>,
    ) -> Result<Self, PersistError> {
        let version = read_version(input, RECORD, 0, VERSION)?;
        let mut mapping = Self::new(object, texture);
        mapping.orientation = Orientation::read(input)?;
        mapping.scale = read_dvec3(input)?;
        mapping.center = read_dvec3(input)?;
        mapping.scale_to_object = input.read_bool()?;
        if version >= 1 {
            mapping.bind_to_surface = input.read_bool()?;
        }
        mapping.core.side = FaceSide::from_int(input.read_int()?)?;
        mapping.update_frame();
        Ok(mapping)
    }
}

fn read_dvec3(input: &mut DataReader<'_>) -> Result<DVec3, PersistError> {
    Ok(DVec3::new(
        input.read_double()?,
        input.read_double()?,
        input.read_double()?,
    ))
}

impl CoordinateSampler for Linear3DMapping {
    type Coord = DVec3;

    const KIND: TriangleKind = TriangleKind::Linear3D;

    fn position_coord(&self, pos: DVec3, params: &[f64]) -> DVec3 {
        if self.bind_to_surface {
            if let Some(xyz) = bound_channels::<3>(params, self.param_offset()) {
                return DVec3::from_array(xyz);
            }
        }
        self.frame.apply(pos)
    }

    fn sample_spec(&self, spec: &mut SurfaceSpec, coord: DVec3, ctx: &SampleContext<'_>) {
        let texture = &self.core.texture;
        texture.spec(
            spec,
            &ctx.texture_sample(coord, self.frame.footprint(ctx.size)),
        );
        if self.transformed && texture.has_component(Component::Bump) {
            spec.bump = self.frame.gradient_to_world(spec.bump);
        }
    }

    fn sample_transparency(&self, trans: &mut Rgb, coord: DVec3, ctx: &SampleContext<'_>) {
        self.core.texture.transparency(
            trans,
            &ctx.texture_sample(coord, self.frame.footprint(ctx.size)),
        );
    }

    fn sample_displacement(&self, coord: DVec3, ctx: &SampleContext<'_>) -> f64 {
        self.core
            .texture
            .displacement(&ctx.texture_sample(coord, self.frame.footprint(ctx.size)))
    }
}

impl TextureMapping for Linear3DMapping {
    delegate_core!();

    fn kind(&self) -> MappingKind {
        MappingKind::Linear3D
    }

    fn parameters(&self) -> Vec<TextureParameter> {
        let mut params = self.core.texture.parameters();
        if self.bind_to_surface {
            params.extend(self.coord_params().iter().cloned());
        }
        params
    }

    fn evaluate_spec(&self, spec: &mut SurfaceSpec, pos: DVec3, ctx: &SampleContext<'_>) {
        self.sample_spec(spec, self.position_coord(pos, ctx.params), ctx);
    }

    fn evaluate_transparency(&self, trans: &mut Rgb, pos: DVec3, ctx: &SampleContext<'_>) {
        self.sample_transparency(trans, self.position_coord(pos, ctx.params), ctx);
    }

    fn displacement(&self, pos: DVec3, ctx: &SampleContext<'_>) -> f64 {
        self.sample_displacement(self.position_coord(pos, ctx.params), ctx)
    }

    fn map_triangle<'a>(&'a self, source: &TriangleSource<'_>) -> Box<dyn RenderingTriangle + 'a> {
        if self.bind_to_surface {
            if let Some(corners) = bound_corners::<3>(source, self.param_offset()) {
                return Box::new(UvwTriangle::new(
                    self,
                    source.vertices,
                    corners.map(DVec3::from_array),
                ));
            }
        }
        Box::new(CoordinateTriangle::from_positions(self, source))
    }

    fn initial_parameter_values(&self) -> Vec<ParameterValue> {
        let mut values = default_values(&self.core.texture.parameters());
        if self.bind_to_surface {
            values.extend(vertex_channels(self.core.object.as_ref(), |p| {
                self.frame.apply(p).to_array()
            }));
        }
        values
    }

    fn duplicate_for(
        &self,
        object: Arc<dyn MeshGeometry>,
        texture: Arc<dyn Texture>,
    ) -> Box<dyn TextureMapping> {
        let mut copy = Self {
            core: self.core.duplicate_for(object, texture),
            ..self.clone()
        };
        copy.update_frame();
        Box::new(copy)
    }

    fn write(&self, out: &mut DataWriter<'_>, _textures: &TextureRegistry) -> Result<(), PersistError> {
        out.write_short(VERSION)?;
        self.orientation.write(out)?;
        for v in self.scale.to_array().into_iter().chain(self.center.to_array()) {
            out.write_double(v)?;
        }
        out.write_bool(self.scale_to_object)?;
        out.write_bool(self.bind_to_surface)?;
        out.write_int(self.core.side.to_int())
    }
}
