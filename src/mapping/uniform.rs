//! Pass-through mapping for textures without spatial variation.

use std::sync::Arc;

use bevy::math::DVec3;

use super::{FaceSide, MappingCore, MappingKind, SampleContext, TextureMapping, delegate_core};
use crate::mesh::MeshGeometry;
use crate::persist::{DataReader, DataWriter, PersistError, TextureRegistry, read_version};
use crate::surface::{Rgb, SurfaceSpec};
use crate::texture::Texture;
use crate::triangle::{
    CoordinateSampler, CoordinateTriangle, RenderingTriangle, TriangleKind, TriangleSource,
};

const RECORD: &str = "uniform mapping";
const VERSION: i16 = 0;

#[derive(Clone, Debug)]
pub struct UniformMapping {
    core: MappingCore,
}

impl UniformMapping {
    pub fn new(object: Arc<dyn MeshGeometry>, texture: Arc<dyn Texture>) -> Self {
        Self {
            core: MappingCore::new(object, texture),
        }
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

impl CoordinateSampler for UniformMapping {
    type Coord = ();

    const KIND: TriangleKind = TriangleKind::Uniform;

    fn position_coord(&self, _pos: DVec3, _params: &[f64]) -> Self::Coord {}

    fn sample_spec(&self, spec: &mut SurfaceSpec, _coord: (), ctx: &SampleContext<'_>) {
        self.core
            .texture
            .spec(spec, &ctx.texture_sample(DVec3::ZERO, DVec3::ZERO));
    }

    fn sample_transparency(&self, trans: &mut Rgb, _coord: (), ctx: &SampleContext<'_>) {
        self.core
            .texture
            .transparency(trans, &ctx.texture_sample(DVec3::ZERO, DVec3::ZERO));
    }

    fn sample_displacement(&self, _coord: (), ctx: &SampleContext<'_>) -> f64 {
        self.core
            .texture
            .displacement(&ctx.texture_sample(DVec3::ZERO, DVec3::ZERO))
    }
}

impl TextureMapping for UniformMapping {
    delegate_core!();

    fn kind(&self) -> MappingKind {
        MappingKind::Uniform
    }

    fn evaluate_spec(&self, spec: &mut SurfaceSpec, _pos: DVec3, ctx: &SampleContext<'_>) {
        self.sample_spec(spec, (), ctx);
    }

    fn evaluate_transparency(&self, trans: &mut Rgb, _pos: DVec3, ctx: &SampleContext<'_>) {
        self.sample_transparency(trans, (), ctx);
    }

    fn displacement(&self, _pos: DVec3, ctx: &SampleContext<'_>) -> f64 {
        self.sample_displacement((), ctx)
    }

    fn map_triangle<'a>(&'a self, source: &TriangleSource<'_>) -> Box<dyn RenderingTriangle + 'a> {
        Box::new(CoordinateTriangle::from_positions(self, source))
    }

    fn duplicate_for(
        &self,
        object: Arc<dyn MeshGeometry>,
        texture: Arc<dyn Texture>,
    ) -> Box<dyn TextureMapping> {
        Box::new(Self {
            core: self.core.duplicate_for(object, texture),
        })
    }

    fn write(&self, out: &mut DataWriter<'_>, _textures: &TextureRegistry) -> Result<(), PersistError> {
        out.write_short(VERSION)?;
        out.write_int(self.core.side.to_int())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::tests_support::{back, front, triangle_mesh};
    use crate::texture::UniformTexture;

    fn mapping() -> UniformMapping {
        let texture = UniformTexture::colored("red", Rgb::new(1.0, 0.0, 0.0)).with_roughness(0.4);
        UniformMapping::new(triangle_mesh(), Arc::new(texture))
    }

    #[test]
    fn test_pass_through() {
        let m = mapping();
        let mut spec = SurfaceSpec::NONE;
        m.spec(&mut spec, DVec3::new(5.0, -3.0, 2.0), &front(&[]));
        assert_eq!(spec.diffuse, Rgb::new(1.0, 0.0, 0.0));
        assert!((spec.roughness - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_face_gate() {
        let mut m = mapping();
        m.set_applies_to(FaceSide::Front);
        let mut spec = SurfaceSpec::NONE;
        spec.diffuse = Rgb::WHITE;
        m.spec(&mut spec, DVec3::ZERO, &back(&[]));
        assert!(spec.is_none());

        let mut trans = Rgb::BLACK;
        m.transparency(&mut trans, DVec3::ZERO, &back(&[]));
        assert_eq!(trans, Rgb::WHITE);
    }

    #[test]
    fn test_triangle_is_trivial() {
        let m = mapping();
        let mesh = crate::mesh::RenderMesh::new(m.object().as_ref(), &[]);
        let tri = m.map_triangle(&mesh.source(0));
        assert_eq!(tri.kind(), TriangleKind::Uniform);
    }

    #[test]
    fn test_round_trip() {
        let mut m = mapping();
        m.set_applies_to(FaceSide::Back);
        let mut bytes = Vec::new();
        m.write(&mut DataWriter::new(&mut bytes), &TextureRegistry::new())
            .unwrap();
        let mut slice = bytes.as_slice();
        let read = UniformMapping::read(
            &mut DataReader::new(&mut slice),
            m.object().clone(),
            m.texture().clone(),
        )
        .unwrap();
        assert_eq!(read.applies_to(), FaceSide::Back);
        assert_ne!(read.handle(), m.handle());
    }
}
