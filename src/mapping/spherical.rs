//! Spherical mapping: azimuth and inclination about an object-local center.

use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;

use bevy::math::{DVec2, DVec3};

use super::frame::{AngularFrame, azimuth, azimuth_gradient};
use super::{
    FaceSide, MappingCore, MappingKind, Orientation, SampleContext, TextureMapping,
    bound_channels, bound_corners, default_values, delegate_core, vertex_channels,
};
use crate::mesh::MeshGeometry;
use crate::param::{ParameterValue, TextureParameter};
use crate::persist::{DataReader, DataWriter, PersistError, TextureRegistry, read_version};
use crate::surface::{Component, Rgb, SurfaceSpec};
use crate::texture::Texture;
use crate::triangle::{
    CoordinateSampler, CoordinateTriangle, RenderingTriangle, TriangleKind, TriangleSource,
};

const RECORD: &str = "spherical mapping";
const VERSION: i16 = 0;

/// Radii below this are treated as lying on the polar axis.
const AXIS_EPSILON: f64 = 1e-10;

/// Wraps a planar texture around a sphere.
///
/// `u` follows the azimuth θ about the local y axis, `v` the inclination φ
/// from +y, both in degrees divided by `scale`. The default scale of
/// `(360, 180)` wraps the texture's unit square once around the sphere.
#[derive(Clone, Debug)]
pub struct SphericalMapping {
    core: MappingCore,
    frame: AngularFrame,
}

impl SphericalMapping {
    pub const DEFAULT_SCALE: DVec2 = DVec2::new(360.0, 180.0);

    /// Centers the sphere on the object's bounds.
    pub fn new(object: Arc<dyn MeshGeometry>, texture: Arc<dyn Texture>) -> Self {
        let center = object.bounds().center();
        Self {
            core: MappingCore::new(object, texture),
            frame: AngularFrame::new(center, Self::DEFAULT_SCALE),
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.frame.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.frame.set_orientation(orientation);
    }

    pub fn center(&self) -> DVec3 {
        self.frame.center
    }

    pub fn set_center(&mut self, center: DVec3) {
        self.frame.center = center;
    }

    pub fn scale(&self) -> DVec2 {
        self.frame.scale
    }

    pub fn set_scale(&mut self, scale: DVec2) {
        self.frame.scale = scale;
    }

    pub fn offset(&self) -> DVec2 {
        self.frame.offset
    }

    pub fn set_offset(&mut self, offset: DVec2) {
        self.frame.offset = offset;
    }

    pub fn bind_to_surface(&self) -> bool {
        self.frame.bind_to_surface
    }

    pub fn set_bind_to_surface(&mut self, bind: bool) {
        self.frame.bind_to_surface = bind;
    }

    /// Azimuth θ and inclination φ of a local point, in radians.
    ///
    /// Points on the polar axis get θ = ±π/2 by the sign of `z` and the
    /// origin gets φ = π/2, so neither is ever NaN.
    pub fn angles(local: DVec3) -> (f64, f64) {
        let theta = azimuth(local.x, local.z);
        let r2 = local.length();
        let phi = if r2 > 0.0 {
            (local.y / r2).clamp(-1.0, 1.0).acos()
        } else {
            FRAC_PI_2
        };
        (theta, phi)
    }

    /// Texture coordinates of a local point.
    pub fn local_to_texture(&self, local: DVec3) -> DVec2 {
        let (theta, phi) = Self::angles(local);
        DVec2::new(theta.to_degrees(), phi.to_degrees()) / self.frame.scale - self.frame.offset
    }

    /// Approximates the metric distortion at `local`: one world unit spans
    /// `1 / r1` radians of azimuth and `1 / r2` radians of inclination.
    fn footprint(&self, local: DVec3, size: f64) -> DVec3 {
        let r1 = (local.x * local.x + local.z * local.z).sqrt().max(AXIS_EPSILON);
        let r2 = local.length().max(AXIS_EPSILON);
        DVec3::new(
            size.to_degrees() / (r1 * self.frame.scale.x),
            size.to_degrees() / (r2 * self.frame.scale.y),
            0.0,
        )
    }

    fn bump_to_world(&self, local: DVec3, g: DVec3) -> DVec3 {
        let r1_sq = local.x * local.x + local.z * local.z;
        let r2_sq = local.length_squared();
        if r1_sq < AXIS_EPSILON * AXIS_EPSILON {
            return DVec3::ZERO;
        }
        let d_theta = azimuth_gradient(local);
        let d_phi = -(DVec3::Y * r2_sq - local * local.y) / (r1_sq.sqrt() * r2_sq);
        let du = d_theta * (1.0f64.to_degrees() / self.frame.scale.x);
        let dv = d_phi * (1.0f64.to_degrees() / self.frame.scale.y);
        self.frame.gradient_to_world(du * g.x + dv * g.y)
    }

    pub fn read(
        input: &mut DataReader<'_>,
        object: Arc<dyn MeshGeometry>,
        texture: Arc<dyn Texture>,
    ) -> Result<Self, PersistError> {
        read_version(input, RECORD, 0, VERSION)?;
        let frame = AngularFrame::read(input)?;
        let mut mapping = Self {
            core: MappingCore::new(object, texture),
            frame,
        };
        mapping.core.side = FaceSide::from_int(input.read_int()?)?;
        Ok(mapping)
    }
}

impl CoordinateSampler for SphericalMapping {
    type Coord = DVec3;

    const KIND: TriangleKind = TriangleKind::Nonlinear;

    fn position_coord(&self, pos: DVec3, params: &[f64]) -> DVec3 {
        if self.frame.bind_to_surface {
            if let Some(xyz) = bound_channels::<3>(params, self.param_offset()) {
                return DVec3::from_array(xyz);
            }
        }
        self.frame.to_local(pos)
    }

    fn sample_spec(&self, spec: &mut SurfaceSpec, local: DVec3, ctx: &SampleContext<'_>) {
        let point = self.local_to_texture(local).extend(0.0);
        let texture = &self.core.texture;
        texture.spec(
            spec,
            &ctx.texture_sample(point, self.footprint(local, ctx.size)),
        );
        if texture.has_component(Component::Bump) {
            spec.bump = self.bump_to_world(local, spec.bump);
        }
    }

    fn sample_transparency(&self, trans: &mut Rgb, local: DVec3, ctx: &SampleContext<'_>) {
        let point = self.local_to_texture(local).extend(0.0);
        self.core.texture.transparency(
            trans,
            &ctx.texture_sample(point, self.footprint(local, ctx.size)),
        );
    }

    fn sample_displacement(&self, local: DVec3, ctx: &SampleContext<'_>) -> f64 {
        let point = self.local_to_texture(local).extend(0.0);
        self.core
            .texture
            .displacement(&ctx.texture_sample(point, self.footprint(local, ctx.size)))
    }
}

impl TextureMapping for SphericalMapping {
    delegate_core!();

    fn kind(&self) -> MappingKind {
        MappingKind::Spherical
    }

    fn parameters(&self) -> Vec<TextureParameter> {
        let mut params = self.core.texture.parameters();
        if self.frame.bind_to_surface {
            params.extend(self.frame.coord_params().iter().cloned());
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
        if self.frame.bind_to_surface {
            if let Some(corners) = bound_corners::<3>(source, self.param_offset()) {
                return Box::new(CoordinateTriangle::with_coords(
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
        if self.frame.bind_to_surface {
            values.extend(vertex_channels(self.core.object.as_ref(), |p| {
                self.frame.to_local(p).to_array()
            }));
        }
        values
    }

    fn duplicate_for(
        &self,
        object: Arc<dyn MeshGeometry>,
        texture: Arc<dyn Texture>,
    ) -> Box<dyn TextureMapping> {
        Box::new(Self {
            core: self.core.duplicate_for(object, texture),
            frame: self.frame.clone(),
        })
    }

    fn write(&self, out: &mut DataWriter<'_>, _textures: &TextureRegistry) -> Result<(), PersistError> {
        out.write_short(VERSION)?;
        self.frame.write(out)?;
        out.write_int(self.core.side.to_int())
    }
}
