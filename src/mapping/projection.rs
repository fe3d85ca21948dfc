//! Planar projection onto a rotated plane.

use std::sync::{Arc, OnceLock};

use bevy::math::{DVec2, DVec3};

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
    UvTriangle,
};

const RECORD: &str = "projection mapping";
const VERSION: i16 = 1;

/// Projects positions onto the `(x, y)` axes of an oriented frame.
///
/// With `scale_to_object` the object's bounds span `[0, 1 / scale]` along
/// each axis before the center offset is subtracted. With
/// `bind_to_surface` the mapping exposes `U`/`V` coordinate parameters and
/// reads coordinates from them wherever they have been assigned.
#[derive(Clone, Debug)]
pub struct ProjectionMapping {
    core: MappingCore,
    orientation: Orientation,
    scale: DVec2,
    center: DVec2,
    scale_to_object: bool,
    bind_to_surface: bool,
    coord_params: OnceLock<[TextureParameter; 2]>,
    frame: LinearFrame,
}

impl ProjectionMapping {
    pub fn new(object: Arc<dyn MeshGeometry>, texture: Arc<dyn Texture>) -> Self {
        let mut mapping = Self {
            core: MappingCore::new(object, texture),
            orientation: Orientation::IDENTITY,
            scale: DVec2::ONE,
            center: DVec2::ZERO,
            scale_to_object: true,
            bind_to_surface: false,
            coord_params: OnceLock::new(),
            frame: LinearFrame {
                axes: [DVec3::X, DVec3::Y, DVec3::Z],
                offset: DVec3::ZERO,
            },
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

    pub fn scale(&self) -> DVec2 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: DVec2) {
        self.scale = scale;
        self.update_frame();
    }

    pub fn center(&self) -> DVec2 {
        self.center
    }

    pub fn set_center(&mut self, center: DVec2) {
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

    /// Recomputes the projection axes, e.g. after the object's geometry changed.
    pub fn update_frame(&mut self) {
        let bounds = self.core.object.bounds();
        self.frame = LinearFrame::new(
            &self.orientation.basis(),
            self.scale.extend(1.0),
            self.center.extend(0.0),
            self.scale_to_object.then_some(&bounds),
        );
    }

    /// Texture coordinates of a world-space position.
    pub fn project(&self, pos: DVec3) -> DVec2 {
        self.frame.apply(pos).truncate()
    }

    fn coord_params(&self) -> &[TextureParameter; 2] {
        self.coord_params.get_or_init(|| {
            [
                TextureParameter::coordinate("U", ParamKind::XCoordinate),
                TextureParameter::coordinate("V", ParamKind::YCoordinate),
            ]
        })
    }

    fn texture_point(&self, uv: DVec2, ctx: &SampleContext<'_>) -> (DVec3, DVec3) {
        let mut size = self.frame.footprint(ctx.size);
        size.z = 0.0;
        (uv.extend(0.0), size)
    }

    pub fn read(
        input: &mut DataReader<'_>,
        object: Arc<dyn MeshGeometry>,
        texture: Arc<dyn Texture>,
    ) -> Result<Self, PersistError> {
        let version = read_version(input, RECORD, 0, VERSION)?;
        let mut mapping = Self::new(object, texture);
        mapping.orientation = Orientation::read(input)?;
        mapping.scale = DVec2::new(input.read_double()?, input.read_double()?);
        mapping.center = DVec2::new(input.read_double()?, input.read_double()?);
        mapping.scale_to_object = input.read_bool()?;
        if version >= 1 {
            mapping.bind_to_surface = input.read_bool()?;
        }
        mapping.core.side = FaceSide::from_int(input.read_int()?)?;
        mapping.update_frame();
        Ok(mapping)
    }
}

impl CoordinateSampler for ProjectionMapping {
    type Coord = DVec2;

    const KIND: TriangleKind = TriangleKind::Linear2D;

    fn position_coord(&self, pos: DVec3, params: &[f64]) -> DVec2 {
        if self.bind_to_surface {
            if let Some(uv) = bound_channels::<2>(params, self.param_offset()) {
                return DVec2::from_array(uv);
            }
        }
        self.project(pos)
    }

    fn sample_spec(&self, spec: &mut SurfaceSpec, uv: DVec2, ctx: &SampleContext<'_>) {
        let (point, size) = self.texture_point(uv, ctx);
        let texture = &self.core.texture;
        texture.spec(spec, &ctx.texture_sample(point, size));
        if texture.has_component(Component::Bump) {
            let g = spec.bump;
            spec.bump = self.frame.gradient_to_world(DVec3::new(g.x, g.y, 0.0));
        }
    }

    fn sample_transparency(&self, trans: &mut Rgb, uv: DVec2, ctx: &SampleContext<'_>) {
        let (point, size) = self.texture_point(uv, ctx);
        self.core
            .texture
            .transparency(trans, &ctx.texture_sample(point, size));
    }

    fn sample_displacement(&self, uv: DVec2, ctx: &SampleContext<'_>) -> f64 {
        let (point, size) = self.texture_point(uv, ctx);
        self.core
            .texture
            .displacement(&ctx.texture_sample(point, size))
    }
}

impl TextureMapping for ProjectionMapping {
    delegate_core!();

    fn kind(&self) -> MappingKind {
        MappingKind::Projection
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
            if let Some(corners) = bound_corners::<2>(source, self.param_offset()) {
                return Box::new(UvTriangle::new(
                    self,
                    source.vertices,
                    corners.map(DVec2::from_array),
                ));
            }
        }
        Box::new(CoordinateTriangle::from_positions(self, source))
    }

    fn initial_parameter_values(&self) -> Vec<ParameterValue> {
        let mut values = default_values(&self.core.texture.parameters());
        if self.bind_to_surface {
            values.extend(vertex_channels(self.core.object.as_ref(), |p| {
                self.project(p).to_array()
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
        out.write_double(self.scale.x)?;
        out.write_double(self.scale.y)?;
        out.write_double(self.center.x)?;
        out.write_double(self.center.y)?;
        out.write_bool(self.scale_to_object)?;
        out.write_bool(self.bind_to_surface)?;
        out.write_int(self.core.side.to_int())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::tests_support::{back, cube_mesh, front, triangle_mesh};
    use crate::mesh::RenderMesh;
    use crate::param::UNASSIGNED_COORDINATE;
    use crate::texture::testing::GradientTexture;
    use crate::triangle::BarycentricSample;

    fn gradient() -> Arc<dyn Texture> {
        Arc::new(GradientTexture::planar())
    }

    #[test]
    fn test_projects_onto_plane() {
        let mut m = ProjectionMapping::new(cube_mesh(), gradient());
        m.set_scale_to_object(false);
        m.set_scale(DVec2::new(2.0, 4.0));
        m.set_center(DVec2::new(0.5, 0.0));
        let uv = m.project(DVec3::new(3.0, 4.0, 7.0));
        assert!(uv.abs_diff_eq(DVec2::new(1.0, 1.0), 1e-12));

        let mut spec = SurfaceSpec::NONE;
        m.spec(&mut spec, DVec3::new(3.0, 4.0, 7.0), &front(&[1.0]));
        assert!((spec.diffuse.red - 1.0).abs() < 1e-6);
        assert!((spec.diffuse.green - 1.0).abs() < 1e-6);
        assert_eq!(spec.diffuse.blue, 0.0);
    }

    #[test]
    fn test_scale_to_object() {
        let m = ProjectionMapping::new(cube_mesh(), gradient());
        assert!(m.project(DVec3::ZERO).abs_diff_eq(DVec2::ZERO, 1e-12));
        assert!(m.project(DVec3::ONE).abs_diff_eq(DVec2::ONE, 1e-12));
    }

    #[test]
    fn test_bump_is_reprojected() {
        let texture: Arc<dyn Texture> =
            Arc::new(GradientTexture::planar().with_bump(DVec3::new(1.0, 0.0, 0.0)));
        let mut m = ProjectionMapping::new(cube_mesh(), texture);
        m.set_scale_to_object(false);
        m.set_orientation(Orientation::new(0.0, 90.0, 0.0));
        let mut spec = SurfaceSpec::NONE;
        m.spec(&mut spec, DVec3::ZERO, &front(&[1.0]));
        // the texture's x axis now runs along world -z
        assert!(spec.bump.abs_diff_eq(-DVec3::Z, 1e-12));
    }

    #[test]
    fn test_face_gate() {
        let mut m = ProjectionMapping::new(cube_mesh(), gradient());
        m.set_applies_to(FaceSide::Back);
        let mut spec = SurfaceSpec::NONE;
        m.spec(&mut spec, DVec3::new(0.3, 0.7, 0.1), &front(&[1.0]));
        assert!(spec.is_none());
        m.spec(&mut spec, DVec3::new(0.3, 0.7, 0.1), &back(&[1.0]));
        assert!(!spec.is_none());
    }

    #[test]
    fn test_bound_parameters() {
        let mut m = ProjectionMapping::new(cube_mesh(), gradient());
        assert_eq!(m.parameter_count(), 1);
        m.set_bind_to_surface(true);
        let params = m.parameters();
        assert_eq!(params.len(), 3);
        assert_eq!(m.param_offset(), 1);
        assert_eq!(params[1].kind, ParamKind::XCoordinate);
        assert_eq!(params[1].default, UNASSIGNED_COORDINATE);
        // identifiers are minted once
        assert_eq!(m.parameters()[2].id, params[2].id);

        let mut spec = SurfaceSpec::NONE;
        m.spec(&mut spec, DVec3::ZERO, &front(&[1.0, 0.25, 0.75]));
        assert!((spec.diffuse.red - 0.25).abs() < 1e-6);
        assert!((spec.diffuse.green - 0.75).abs() < 1e-6);

        // unassigned channel falls back to the projected position
        m.spec(&mut spec, DVec3::ONE, &front(&[1.0, UNASSIGNED_COORDINATE, 0.0]));
        assert!((spec.diffuse.red - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_triangles() {
        let mut m = ProjectionMapping::new(triangle_mesh(), gradient());
        m.set_scale_to_object(false);
        let mesh = RenderMesh::new(m.object().as_ref(), &m.initial_parameter_values());
        let tri = m.map_triangle(&mesh.source(0));
        assert_eq!(tri.kind(), TriangleKind::Linear2D);
        drop(tri);

        m.set_bind_to_surface(true);
        let values = m.initial_parameter_values();
        assert_eq!(values.len(), 3);
        let mesh = RenderMesh::new(m.object().as_ref(), &values);
        let tri = m.map_triangle(&mesh.source(0));
        assert_eq!(tri.kind(), TriangleKind::UvMapped);

        let params = [1.0, 1.0 / 3.0 * 2.0, 4.0 / 3.0];
        let sample = BarycentricSample::new(1.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0, 0.1, 0.0, &params);
        let mut spec = SurfaceSpec::NONE;
        tri.spec(&mut spec, &sample);
        // centroid of (0,0) (2,0) (0,4)
        assert!((spec.diffuse.red - 2.0 / 3.0).abs() < 1e-6);
        assert!((spec.diffuse.green - 4.0 / 3.0).abs() < 1e-6);
        // footprint follows the coordinate gradients
        assert!((spec.specular.red - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_round_trip() {
        let mut m = ProjectionMapping::new(cube_mesh(), gradient());
        m.set_orientation(Orientation::new(10.0, 20.0, 30.0));
        m.set_scale(DVec2::new(2.0, 3.0));
        m.set_center(DVec2::new(0.1, 0.2));
        m.set_bind_to_surface(true);
        m.set_applies_to(FaceSide::Front);

        let mut bytes = Vec::new();
        m.write(&mut DataWriter::new(&mut bytes), &TextureRegistry::new())
            .unwrap();
        let mut slice = bytes.as_slice();
        let read = ProjectionMapping::read(
            &mut DataReader::new(&mut slice),
            m.object().clone(),
            m.texture().clone(),
        )
        .unwrap();
        assert_eq!(read.orientation(), m.orientation());
        assert_eq!(read.scale(), m.scale());
        assert!(read.bind_to_surface());
        assert_eq!(read.applies_to(), FaceSide::Front);
        let p = DVec3::new(0.3, 0.6, 0.9);
        assert!(read.project(p).abs_diff_eq(m.project(p), 1e-12));
    }

    #[test]
    fn test_reads_version_zero() {
        let mut bytes = Vec::new();
        let mut out = DataWriter::new(&mut bytes);
        out.write_short(0).unwrap();
        for v in [0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0] {
            out.write_double(v).unwrap();
        }
        out.write_bool(false).unwrap();
        out.write_int(2).unwrap();
        let mut slice = bytes.as_slice();
        let read =
            ProjectionMapping::read(&mut DataReader::new(&mut slice), cube_mesh(), gradient())
                .unwrap();
        assert!(!read.bind_to_surface());
        assert!(!read.scale_to_object());
        assert_eq!(read.applies_to(), FaceSide::Both);
    }
}
