//! A texture with no spatial variation.

use bevy::math::DVec3;

use super::{Texture, TextureDomain, TextureSample};
use crate::persist::{DataReader, DataWriter, PersistError, read_version};
use crate::surface::{Component, Rgb, SurfaceSpec};

const KIND: &str = "uniform texture";
const VERSION: i16 = 0;

/// A single set of surface properties applied everywhere.
#[derive(Clone, Debug, PartialEq)]
pub struct UniformTexture {
    pub name: String,
    pub diffuse: Rgb,
    pub specular: Rgb,
    pub transparent: Rgb,
    pub emissive: Rgb,
    pub hilight: Rgb,
    pub roughness: f64,
    pub cloudiness: f64,
}

impl Default for UniformTexture {
    fn default() -> Self {
        Self {
            name: "Uniform".into(),
            diffuse: Rgb::WHITE,
            specular: Rgb::BLACK,
            transparent: Rgb::BLACK,
            emissive: Rgb::BLACK,
            hilight: Rgb::BLACK,
            roughness: 0.2,
            cloudiness: 0.0,
        }
    }
}

impl UniformTexture {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// An opaque, diffuse-only texture of one color.
    pub fn colored(name: impl Into<String>, diffuse: Rgb) -> Self {
        Self::new(name).with_diffuse(diffuse)
    }

    pub fn with_diffuse(mut self, diffuse: Rgb) -> Self {
        self.diffuse = diffuse;
        self
    }

    pub fn with_specular(mut self, specular: Rgb) -> Self {
        self.specular = specular;
        self
    }

    pub fn with_transparent(mut self, transparent: Rgb) -> Self {
        self.transparent = transparent;
        self
    }

    pub fn with_emissive(mut self, emissive: Rgb) -> Self {
        self.emissive = emissive;
        self
    }

    pub fn with_hilight(mut self, hilight: Rgb) -> Self {
        self.hilight = hilight;
        self
    }

    pub fn with_roughness(mut self, roughness: f64) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn with_cloudiness(mut self, cloudiness: f64) -> Self {
        self.cloudiness = cloudiness;
        self
    }

    fn fill(&self, spec: &mut SurfaceSpec) {
        *spec = SurfaceSpec {
            diffuse: self.diffuse,
            specular: self.specular,
            transparent: self.transparent,
            emissive: self.emissive,
            hilight: self.hilight,
            roughness: self.roughness,
            cloudiness: self.cloudiness,
            bump: DVec3::ZERO,
        };
    }

    pub fn read(input: &mut DataReader<'_>) -> Result<Self, PersistError> {
        read_version(input, KIND, 0, VERSION)?;
        let name = input.read_utf()?;
        let mut color = || -> Result<Rgb, PersistError> {
            Ok(Rgb::new(
                input.read_float()?,
                input.read_float()?,
                input.read_float()?,
            ))
        };
        Ok(Self {
            name,
            diffuse: color()?,
            specular: color()?,
            transparent: color()?,
            emissive: color()?,
            hilight: color()?,
            roughness: input.read_double()?,
            cloudiness: input.read_double()?,
        })
    }
}

impl Texture for UniformTexture {
    fn name(&self) -> &str {
        &self.name
    }

    fn domain(&self) -> TextureDomain {
        TextureDomain::Uniform
    }

    fn type_tag(&self) -> &'static str {
        "uniform"
    }

    fn has_component(&self, component: Component) -> bool {
        match component {
            Component::Diffuse => true,
            Component::Specular => self.specular != Rgb::BLACK,
            Component::Transparent => self.transparent != Rgb::BLACK,
            Component::Emissive => self.emissive != Rgb::BLACK,
            Component::Hilight => self.hilight != Rgb::BLACK,
            Component::Bump | Component::Displacement => false,
        }
    }

    fn spec(&self, spec: &mut SurfaceSpec, _sample: &TextureSample<'_>) {
        self.fill(spec);
    }

    fn transparency(&self, trans: &mut Rgb, _sample: &TextureSample<'_>) {
        *trans = self.transparent;
    }

    fn average_spec(&self, spec: &mut SurfaceSpec, _time: f64, _params: &[f64]) {
        self.fill(spec);
    }

    fn write(&self, out: &mut DataWriter<'_>) -> Result<(), PersistError> {
        out.write_short(VERSION)?;
        out.write_utf(&self.name)?;
        for color in [
            self.diffuse,
            self.specular,
            self.transparent,
            self.emissive,
            self.hilight,
        ] {
            out.write_float(color.red)?;
            out.write_float(color.green)?;
            out.write_float(color.blue)?;
        }
        out.write_double(self.roughness)?;
        out.write_double(self.cloudiness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_ignores_position() {
        let tex = UniformTexture::colored("red", Rgb::new(1.0, 0.0, 0.0)).with_roughness(0.4);
        let mut a = SurfaceSpec::NONE;
        let mut b = SurfaceSpec::NONE;
        tex.spec(&mut a, &TextureSample::new(DVec3::ZERO, DVec3::ONE, 1.0, 0.0, &[]));
        tex.spec(&mut b, &TextureSample::new(DVec3::splat(9.0), DVec3::ONE, -1.0, 3.0, &[]));
        assert_eq!(a, b);
        assert_eq!(a.diffuse, Rgb::new(1.0, 0.0, 0.0));
        assert_eq!(a.transparent, Rgb::BLACK);
        assert_eq!(a.roughness, 0.4);
    }

    #[test]
    fn test_components() {
        let tex = UniformTexture::new("plain");
        assert!(tex.has_component(Component::Diffuse));
        assert!(!tex.has_component(Component::Transparent));
        assert!(!tex.has_component(Component::Bump));
        let glass = tex.with_transparent(Rgb::splat(0.8));
        assert!(glass.has_component(Component::Transparent));
    }

    #[test]
    fn test_round_trip() {
        let tex = UniformTexture::colored("glow", Rgb::new(0.1, 0.2, 0.3))
            .with_emissive(Rgb::new(1.0, 0.5, 0.0))
            .with_cloudiness(0.25);
        let mut bytes = Vec::new();
        tex.write(&mut DataWriter::new(&mut bytes)).unwrap();
        let mut slice = bytes.as_slice();
        let read = UniformTexture::read(&mut DataReader::new(&mut slice)).unwrap();
        assert_eq!(read, tex);
    }
}
