//! Leaf textures for unit tests.
//!
//! Both report their texture-space point as the diffuse color and their
//! footprint as the specular color, so tests can see exactly what a mapping
//! passed in.

use bevy::math::DVec3;

use super::{Texture, TextureDomain, TextureSample};
use crate::param::TextureParameter;
use crate::persist::{DataWriter, PersistError};
use crate::surface::{Component, Rgb, SurfaceSpec};

#[derive(Debug)]
pub(crate) struct GradientTexture {
    pub domain: TextureDomain,
    pub bump: DVec3,
    pub transparent: Rgb,
    pub roughness: f64,
    pub gain: TextureParameter,
}

impl GradientTexture {
    pub fn planar() -> Self {
        Self::new(TextureDomain::Planar)
    }

    pub fn solid() -> Self {
        Self::new(TextureDomain::Solid)
    }

    fn new(domain: TextureDomain) -> Self {
        Self {
            domain,
            bump: DVec3::ZERO,
            transparent: Rgb::BLACK,
            roughness: 0.5,
            gain: TextureParameter::new("gain", 0.0, 10.0, 1.0),
        }
    }

    pub fn with_bump(mut self, bump: DVec3) -> Self {
        self.bump = bump;
        self
    }

    pub fn with_transparent(mut self, transparent: Rgb) -> Self {
        self.transparent = transparent;
        self
    }

    fn gain(params: &[f64]) -> f64 {
        params.first().copied().unwrap_or(1.0)
    }

    fn point(&self, sample: &TextureSample<'_>) -> DVec3 {
        match self.domain {
            TextureDomain::Planar => sample.point.truncate().extend(0.0),
            _ => sample.point,
        }
    }
}

impl Texture for GradientTexture {
    fn name(&self) -> &str {
        "gradient"
    }

    fn domain(&self) -> TextureDomain {
        self.domain
    }

    fn type_tag(&self) -> &'static str {
        "test-gradient"
    }

    fn parameters(&self) -> Vec<TextureParameter> {
        vec![self.gain.clone()]
    }

    fn parameter_count(&self) -> usize {
        1
    }

    fn has_component(&self, component: Component) -> bool {
        match component {
            Component::Bump => self.bump != DVec3::ZERO,
            Component::Transparent => self.transparent != Rgb::BLACK,
            _ => true,
        }
    }

    fn spec(&self, spec: &mut SurfaceSpec, sample: &TextureSample<'_>) {
        let p = self.point(sample) * Self::gain(sample.params);
        *spec = SurfaceSpec {
            diffuse: Rgb::new(p.x as f32, p.y as f32, p.z as f32),
            specular: Rgb::new(
                sample.size.x as f32,
                sample.size.y as f32,
                sample.size.z as f32,
            ),
            transparent: self.transparent,
            emissive: Rgb::BLACK,
            hilight: Rgb::BLACK,
            roughness: self.roughness,
            cloudiness: 0.0,
            bump: self.bump,
        };
    }

    fn displacement(&self, sample: &TextureSample<'_>) -> f64 {
        let p = self.point(sample);
        (p.x + p.y + p.z) * Self::gain(sample.params)
    }

    fn average_spec(&self, spec: &mut SurfaceSpec, _time: f64, params: &[f64]) {
        let g = Self::gain(params) as f32 * 0.5;
        *spec = SurfaceSpec {
            diffuse: Rgb::splat(g),
            transparent: self.transparent,
            roughness: self.roughness,
            ..SurfaceSpec::NONE
        };
    }

    fn write(&self, out: &mut DataWriter<'_>) -> Result<(), PersistError> {
        out.write_short(0)
    }
}
